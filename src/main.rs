#![cfg_attr(target_arch = "avr", no_std, no_main, feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use core::cell::RefCell;
    use core::pin::pin;

    use avr_device::atmega32u4::Peripherals;
    use critical_section::Mutex;
    use embedded_hal::digital::v2::OutputPin;
    use panic_halt as _;

    use vswr_analyzer::application::{sweep_task, Controller};
    use vswr_analyzer::drivers::{Ad9850, AdcReader, ButtonHandler, Hd44780, SerialConsole};
    use vswr_analyzer::hal::{board, Adc, Pins, TickTimer, Uart};
    use vswr_analyzer::logger::{self, Level};
    use vswr_analyzer::rtos::{Executor, Kernel, SuspensionChannel};
    use vswr_analyzer::shared::Shared;
    use vswr_analyzer::sweep::SweepEngine;
    use vswr_analyzer::{error, info};

    static KERNEL: Kernel = Kernel::new();
    static SHARED: Shared = Shared::new();
    static ADC_DONE: SuspensionChannel = SuspensionChannel::new();

    static CONSOLE: Mutex<RefCell<Option<SerialConsole<Uart>>>> = Mutex::new(RefCell::new(None));

    #[avr_device::interrupt(atmega32u4)]
    fn TIMER0_COMPA() {
        KERNEL.tick();
    }

    #[avr_device::interrupt(atmega32u4)]
    fn ADC() {
        ADC_DONE.notify(&KERNEL);
    }

    /// Log sink. The console is taken out of its slot while writing so the
    /// slow serial output runs with interrupts enabled.
    fn console_sink(level: Level, line: &str) {
        let console = critical_section::with(|cs| CONSOLE.borrow_ref_mut(cs).take());
        if let Some(mut console) = console {
            let _ = console.log(level, line);
            critical_section::with(|cs| *CONSOLE.borrow_ref_mut(cs) = Some(console));
        }
    }

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();
        let pins = Pins::new(dp.PORTB, dp.PORTC, dp.PORTD, dp.PORTF);

        // Pro Micro RX/TX LEDs off
        let mut rx_led: board::RxLed = pins.pb0.into_output();
        let mut tx_led: board::TxLed = pins.pd5.into_output();
        let _ = rx_led.set_high();
        let _ = tx_led.set_high();

        critical_section::with(|cs| {
            *CONSOLE.borrow_ref_mut(cs) = Some(SerialConsole::new(Uart::new(dp.USART1)));
        });
        logger::set_sink(console_sink);
        info!("vswr analyzer {}", env!("CARGO_PKG_VERSION"));

        let rs: board::LcdRs = pins.pb4.into_output();
        let en: board::LcdE = pins.pb5.into_output();
        let d4: board::LcdD4 = pins.pb1.into_output();
        let d5: board::LcdD5 = pins.pb3.into_output();
        let d6: board::LcdD6 = pins.pb2.into_output();
        let d7: board::LcdD7 = pins.pb6.into_output();
        let lcd = Hd44780::new(&KERNEL, rs, en, d4, d5, d6, d7);

        let mode: board::ModeButton = pins.pf5.into_input();
        let band: board::BandButton = pins.pf4.into_input();
        let buttons = ButtonHandler::new(mode, band);
        let controller = Controller::new(&KERNEL, &SHARED, lcd, buttons);

        let data: board::DdsData = pins.pd0.into_output();
        let w_clk: board::DdsWClk = pins.pc6.into_output();
        let fq_ud: board::DdsFqUd = pins.pd4.into_output();
        let reset: board::DdsReset = pins.pd1.into_output();
        let dds = match Ad9850::new(data, w_clk, fq_ud, reset) {
            Ok(dds) => dds,
            Err(never) => match never {},
        };
        let _forward: board::ForwardIn = pins.pf6.into_input();
        let _reverse: board::ReverseIn = pins.pf7.into_input();
        let sensor = AdcReader::new(&KERNEL, &ADC_DONE, Adc::new(dp.ADC));
        let engine = SweepEngine::new(&KERNEL, dds, sensor);

        let mut control = pin!(controller.run());
        let mut sweep = pin!(sweep_task(&KERNEL, &SHARED, engine));

        let mut executor = Executor::new(&KERNEL);
        if let Err(e) = executor.create(control.as_mut()) {
            error!("control task: {}", e);
            panic!();
        }
        if let Err(e) = executor.create(sweep.as_mut()) {
            error!("sweep task: {}", e);
            panic!();
        }

        // Idle sleep mode, woken by the next timer or ADC interrupt
        unsafe { dp.CPU.smcr.write(|w| w.bits(1)) };
        let mut timer = TickTimer::new(dp.TC0);
        timer.start();
        unsafe { avr_device::interrupt::enable() };

        executor.start(avr_device::asm::sleep)
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
