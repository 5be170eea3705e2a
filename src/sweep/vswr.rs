//! Integer VSWR arithmetic

use crate::config::VSWR_MAX;

/// VSWR x1000 from forward/reverse detector readings.
///
/// `fwd == rev` (total reflection) and the physically impossible `rev > fwd`
/// both report [`VSWR_MAX`], as does any ratio too large for 16 bits.
pub fn vswr(fwd: u16, rev: u16) -> u16 {
    if fwd <= rev {
        return VSWR_MAX;
    }
    let (fwd, rev) = (u32::from(fwd), u32::from(rev));
    let ratio = 1000 * (fwd + rev) / (fwd - rev);
    u16::try_from(ratio).unwrap_or(VSWR_MAX)
}

/// Round a step size up to the next value of the form {1, 2, 5} x 10^n.
///
/// A zero step becomes 1 Hz so a sweep always advances.
pub fn round_step_size(step: u32) -> u32 {
    let mut step = step.max(1);
    let mut base: u32 = 1;
    while step / 10 > 0 {
        let remainder = step % 10;
        base = base.saturating_mul(10);
        step /= 10;
        if remainder != 0 {
            step += 1;
        }
    }

    // 600 -> 1000
    if step > 5 {
        return base.saturating_mul(10);
    }
    // 201 -> 500
    if step > 2 {
        return base.saturating_mul(5);
    }
    // 200 -> 200, 100 -> 100
    base.saturating_mul(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 1000, 3000)]
    #[case(1000, 0, 1000)]
    #[case(1023, 1, 1001)]
    #[case(1000, 1000, VSWR_MAX)]
    #[case(500, 900, VSWR_MAX)]
    #[case(0, 0, VSWR_MAX)]
    // 1000 * 2047 / 1 overflows 16 bits
    #[case(1024, 1023, VSWR_MAX)]
    fn vswr_from_samples(#[case] fwd: u16, #[case] rev: u16, #[case] expected: u16) {
        assert_eq!(vswr(fwd, rev), expected);
    }

    #[rstest]
    #[case(23, 50)]
    #[case(201, 500)]
    #[case(600, 1000)]
    #[case(200, 200)]
    #[case(100, 100)]
    #[case(1, 1)]
    #[case(3, 5)]
    #[case(10, 10)]
    #[case(11, 20)]
    #[case(99, 100)]
    #[case(20_000, 20_000)]
    #[case(30_000, 50_000)]
    #[case(0, 1)]
    fn step_rounds_up_to_nice_value(#[case] raw: u32, #[case] expected: u32) {
        assert_eq!(round_step_size(raw), expected);
    }

    #[test]
    fn step_rounding_is_positive_and_monotonic() {
        let mut prev = 0;
        for raw in 1..200_000u32 {
            let step = round_step_size(raw);
            assert!(step > 0);
            assert!(step >= raw, "{} -> {}", raw, step);
            assert!(step >= prev, "{} -> {} after {}", raw, step, prev);
            prev = step;
        }
        assert!(round_step_size(u32::MAX) > 0);
    }
}
