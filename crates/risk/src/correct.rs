use tracing::debug;

use common::{Direction, Error, Rejection, Result, Signal};

use crate::sizer::RiskSizer;

/// Slack on the half-decade tie so `log10` noise cannot tip a price that
/// already matches the reference into the next decade.
const TIE_EPSILON: f64 = 1e-9;

/// Rescale a signal's prices to the magnitude of the live market price and
/// size it.
///
/// Providers routinely drop leading zeros or decimal points ("28390" for
/// 0.02839). The power of ten that brings the lowest entry closest to
/// `reference_price` in log space is applied to every level. Entries end up
/// ascending and targets ordered in the trade's direction. Calling it again
/// with the same reference changes nothing.
pub fn correct(signal: &Signal, reference_price: f64, sizer: &RiskSizer) -> Result<Signal> {
    if !(reference_price.is_finite() && reference_price > 0.0) {
        return Err(Error::InvalidReferencePrice(reference_price));
    }
    let first = signal
        .entries
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or(Rejection::MissingEntries)?;
    if !(first.is_finite() && first > 0.0) {
        return Err(Rejection::NonPositivePrice(first).into());
    }

    let exponent = decade_shift(reference_price.log10() - first.log10());
    let scale = |price: f64| scale(price, exponent);

    let mut corrected = signal.clone();
    corrected.entries = signal.entries.iter().copied().map(scale).collect();
    corrected.entries.sort_by(f64::total_cmp);
    corrected.targets = signal.targets.iter().copied().map(scale).collect();
    corrected.sl = signal.sl.map(scale);

    match corrected.direction() {
        Direction::Long => corrected.targets.sort_by(f64::total_cmp),
        Direction::Short => corrected.targets.sort_by(|a, b| b.total_cmp(a)),
    }
    corrected.fraction = sizer.fraction(&corrected);

    debug!(
        coin = %corrected.coin,
        tag = %corrected.tag,
        exponent,
        fraction = corrected.fraction,
        "Corrected signal"
    );
    Ok(corrected)
}

/// Nearest whole number of decades, with half-decade ties rounded toward
/// zero so a second call sees a gap of at most half a decade and stays put.
fn decade_shift(gap: f64) -> i32 {
    let decades = (gap.abs() - 0.5 - TIE_EPSILON).ceil().max(0.0);
    (decades.copysign(gap)) as i32
}

/// Shift by `10^exponent`. Dividing for negative exponents keeps results
/// like 28390 → 0.02839 exact to the last digit.
fn scale(price: f64, exponent: i32) -> f64 {
    match exponent {
        0 => price,
        e if e > 0 => price * 10f64.powi(e),
        e => price / 10f64.powi(-e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn rescales_thousands_to_fractions() {
        let s = Signal::new(
            "BLZ",
            vec![28390.0],
            vec![28500.0, 28615.0, 28730.0, 28950.0, 29525.0],
            Some(26970.0),
            "BFP",
        );
        let c = correct(&s, 0.0283, &RiskSizer::default()).unwrap();
        assert!(close(c.entries[0], 0.02839));
        let want = [0.0285, 0.028615, 0.02873, 0.02895, 0.029525];
        for (got, want) in c.targets.iter().zip(want) {
            assert!(close(*got, want), "{got} vs {want}");
        }
        assert!(close(c.sl.unwrap(), 0.02697));
        assert!((c.fraction - 0.009496478).abs() < 1e-9, "{}", c.fraction);
    }

    #[test]
    fn rescales_small_prices_up() {
        let s = Signal::new(
            "BTC",
            vec![37.1, 36.3],
            vec![38.0, 39.0, 41.4, 42.2],
            Some(34.4),
            "VIPBB",
        )
        .with_leverage(25)
        .with_risk_factor(0.5);
        let c = correct(&s, 36000.0, &RiskSizer::default()).unwrap();
        assert_eq!(c.entries, vec![36300.0, 37100.0]);
        assert_eq!(c.targets, vec![38000.0, 39000.0, 41400.0, 42200.0]);
        assert_eq!(c.sl, Some(34400.0));
        assert!((c.fraction - 0.0036210526).abs() < 1e-9, "{}", c.fraction);
    }

    #[test]
    fn short_targets_run_downwards() {
        let s = Signal::new(
            "ETH",
            vec![2750.0, 2700.0, 2720.0],
            vec![2400.0, 2600.0, 2500.0],
            Some(2850.0),
            "T",
        );
        let c = correct(&s, 2690.0, &RiskSizer::default()).unwrap();
        assert_eq!(c.entries, vec![2700.0, 2720.0, 2750.0]);
        assert_eq!(c.targets, vec![2600.0, 2500.0, 2400.0]);
    }

    #[test]
    fn second_call_is_a_no_op() {
        let s = Signal::new("BLZ", vec![28390.0], vec![28500.0], Some(26970.0), "BFP");
        let sizer = RiskSizer::default();
        let once = correct(&s, 0.0283, &sizer).unwrap();
        let twice = correct(&once, 0.0283, &sizer).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn half_decade_gap_keeps_current_scale() {
        let sizer = RiskSizer::default();
        for (entry, reference) in [
            (1.0, 10f64.sqrt()),
            (100.0, 100.0 * 10f64.sqrt()),
            (1.0, 1.0 / 10f64.sqrt()),
        ] {
            let s = Signal::new("BTC", vec![entry], vec![entry * 1.1], Some(entry * 0.9), "T");
            let once = correct(&s, reference, &sizer).unwrap();
            assert_eq!(once.entries, vec![entry], "{entry} @ {reference}");
            let twice = correct(&once, reference, &sizer).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn decade_shift_rounds_ties_toward_zero() {
        assert_eq!(decade_shift(0.0), 0);
        assert_eq!(decade_shift(0.5), 0);
        assert_eq!(decade_shift(-0.5), 0);
        assert_eq!(decade_shift(0.51), 1);
        assert_eq!(decade_shift(1.5), 1);
        assert_eq!(decade_shift(-1.5), -1);
        assert_eq!(decade_shift(2.996), 3);
        assert_eq!(decade_shift(-6.0013), -6);
    }

    #[test]
    fn bad_reference_price_is_an_error() {
        let s = Signal::new("BTC", vec![100.0], vec![110.0], None, "T");
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                correct(&s, price, &RiskSizer::default()),
                Err(Error::InvalidReferencePrice(_))
            ));
        }
    }

    #[test]
    fn missing_stop_leaves_fraction_zero() {
        let s = Signal::new("BTC", vec![100.0], vec![110.0], None, "T");
        let c = correct(&s, 101.0, &RiskSizer::default()).unwrap();
        assert_eq!(c.fraction, 0.0);
        assert_eq!(c.entries, vec![100.0]);
    }
}
