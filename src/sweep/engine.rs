use super::vswr::{round_step_size, vswr};
use super::{
    Band, EdgeProfile, Measurement, Mode, Port, PowerSensor, Selection, SweepResult, Synthesizer,
};
use crate::config::{
    COARSE_STEPS, EDGE_VSWR_MAX, FINE_SETTLE_MS, FINE_STEPS, POSITION_SAMPLES,
    POSITION_SETTLE_MS, VSWR_MAX,
};
use crate::rtos::Kernel;
use crate::shared::Shared;

pub struct SweepEngine<'k, S, P> {
    kernel: &'k Kernel,
    synth: S,
    sensor: P,
}

impl<'k, S, P> SweepEngine<'k, S, P>
where
    S: Synthesizer,
    P: PowerSensor,
{
    pub fn new(kernel: &'k Kernel, synth: S, sensor: P) -> Self {
        Self {
            kernel,
            synth,
            sensor,
        }
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut S {
        &mut self.synth
    }

    pub fn sensor(&self) -> &P {
        &self.sensor
    }

    /// One forward/reverse reading at the current frequency.
    pub async fn sample(&mut self) -> u16 {
        let fwd = self.sensor.sample(Port::Forward).await;
        let rev = self.sensor.sample(Port::Reverse).await;
        vswr(fwd, rev)
    }

    /// Tune to `hz`, sleep `settle_ms` and take one reading.
    pub async fn sample_at(&mut self, hz: u32, settle_ms: u16) -> Result<u16, S::Error> {
        self.synth.set_freq(hz)?;
        self.kernel.sleep(settle_ms).await;
        Ok(self.sample().await)
    }

    /// Tune to `hz`, settle once, then average `samples` readings.
    pub async fn average_at(&mut self, hz: u32, samples: u8, settle_ms: u16) -> Result<u16, S::Error> {
        self.synth.set_freq(hz)?;
        self.kernel.sleep(settle_ms).await;

        let n = samples.max(1);
        let mut sum: u32 = 0;
        for _ in 0..n {
            sum += u32::from(self.sample().await);
        }
        Ok((sum / u32::from(n)) as u16)
    }

    /// Coarse scan of the whole sweep range followed by a fine scan of one
    /// coarse step either side of the coarse minimum.
    pub async fn find_minimum(&mut self, band: &Band) -> Result<SweepResult, S::Error> {
        let mut best = SweepResult {
            hz: band.sweep_start,
            vswr: VSWR_MAX,
        };

        // No settle time: noisy, but enough to locate the dip.
        let span = band.sweep_stop.saturating_sub(band.sweep_start);
        let coarse = round_step_size(span / COARSE_STEPS);
        self.scan(band.sweep_start, band.sweep_stop, coarse, 0, &mut best)
            .await?;
        debug!("coarse min {} Hz vswr {}", best.hz, best.vswr);

        let start = best.hz.saturating_sub(coarse);
        let stop = best.hz.saturating_add(coarse);
        let fine = round_step_size((stop - start) / FINE_STEPS);
        self.scan(start, stop, fine, FINE_SETTLE_MS, &mut best).await?;
        debug!("fine min {} Hz vswr {}", best.hz, best.vswr);

        Ok(best)
    }

    /// Averaged reading at a single frequency.
    pub async fn measure_position(&mut self, hz: u32) -> Result<SweepResult, S::Error> {
        let vswr = self
            .average_at(hz, POSITION_SAMPLES, POSITION_SETTLE_MS)
            .await?;
        Ok(SweepResult { hz, vswr })
    }

    pub async fn measure_edges(&mut self, band: &Band) -> Result<EdgeProfile, S::Error> {
        let mut points = [band.start, band.mid(), band.stop];
        for point in points.iter_mut() {
            let vswr = self
                .average_at(*point, POSITION_SAMPLES, POSITION_SETTLE_MS)
                .await?;
            *point = u32::from(vswr.min(EDGE_VSWR_MAX));
        }
        let [low, mid, high] = points.map(|v| v as u16);
        Ok(EdgeProfile { low, mid, high })
    }

    /// Run the measurement for `selection`.
    pub async fn measure(&mut self, selection: Selection) -> Result<Measurement, S::Error> {
        let band = selection.band();
        let measurement = match selection.mode {
            Mode::SwrMin => Measurement::Single(self.find_minimum(band).await?),
            Mode::BandStart => Measurement::Single(self.measure_position(band.start).await?),
            Mode::BandStop => Measurement::Single(self.measure_position(band.stop).await?),
            Mode::BandMid => Measurement::Single(self.measure_position(band.mid()).await?),
            Mode::BandEdge => Measurement::Edges(self.measure_edges(band).await?),
        };
        Ok(measurement)
    }

    /// Measure and publish the result screen to the shared display buffer.
    pub async fn run(
        &mut self,
        selection: Selection,
        shared: &Shared,
    ) -> Result<Measurement, S::Error> {
        let measurement = self.measure(selection).await?;
        shared.publish(&measurement.screen());
        Ok(measurement)
    }

    async fn scan(
        &mut self,
        start: u32,
        stop: u32,
        step: u32,
        settle_ms: u16,
        best: &mut SweepResult,
    ) -> Result<(), S::Error> {
        let mut hz = start;
        while hz < stop {
            let vswr = self.sample_at(hz, settle_ms).await?;
            if vswr < best.vswr {
                *best = SweepResult { hz, vswr };
            }
            hz = match hz.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(())
    }
}
