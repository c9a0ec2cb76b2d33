use common::{Direction, Rejection, Signal};

/// Largest accepted rise of a target or stop above the nearest entry, as a
/// fraction of that entry. Beyond this the level is a misparse.
pub const MAX_PRICE_DEVIATION: f64 = 1.0;

/// Smallest accepted ratio of a level below the nearest entry to that entry.
/// A fall to a tenth or less is a dropped decimal, not a trade.
pub const MIN_PRICE_RATIO: f64 = 0.1;

/// Fields pulled out of a message before any cross-field check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub coin: Option<String>,
    /// In text order.
    pub entries: Vec<f64>,
    /// In text order.
    pub targets: Vec<f64>,
    pub sl: Option<f64>,
    /// Direction written in the message, if any.
    pub stated: Option<Direction>,
    /// A target carried a fill glyph.
    pub partial_fill: bool,
}

/// Check a candidate and build the signal it describes.
pub fn validate(candidate: Candidate, tag: &str) -> Result<Signal, Rejection> {
    let coin = candidate.coin.ok_or(Rejection::MissingCoin)?;
    if candidate.entries.is_empty() {
        return Err(Rejection::MissingEntries);
    }
    if candidate.targets.is_empty() {
        return Err(Rejection::MissingTargets);
    }
    if candidate.partial_fill {
        return Err(Rejection::PartialFill);
    }

    let levels = candidate
        .entries
        .iter()
        .chain(&candidate.targets)
        .chain(candidate.sl.as_ref());
    if let Some(bad) = levels.copied().find(|p| !(p.is_finite() && *p > 0.0)) {
        return Err(Rejection::NonPositivePrice(bad));
    }

    let low = candidate.entries.iter().copied().fold(f64::INFINITY, f64::min);
    let high = candidate.entries.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let direction = match candidate.sl {
        Some(sl) if sl < low => Direction::Long,
        Some(sl) if sl > high => Direction::Short,
        Some(_) => return Err(Rejection::StopInsideEntryZone),
        None if candidate.targets.iter().all(|t| *t > high) => Direction::Long,
        None if candidate.targets.iter().all(|t| *t < low) => Direction::Short,
        None => return Err(Rejection::TargetsInsideEntryZone),
    };
    let beyond_zone = match direction {
        Direction::Long => candidate.targets.iter().all(|t| *t > high),
        Direction::Short => candidate.targets.iter().all(|t| *t < low),
    };
    if !beyond_zone {
        return Err(Rejection::TargetsInsideEntryZone);
    }
    if candidate.stated.is_some_and(|stated| stated != direction) {
        return Err(Rejection::DirectionMismatch);
    }

    for &price in candidate.targets.iter().chain(candidate.sl.as_ref()) {
        let entry = nearest(&candidate.entries, price);
        let ratio = price / entry;
        if ratio - 1.0 >= MAX_PRICE_DEVIATION || ratio <= MIN_PRICE_RATIO {
            return Err(Rejection::ImplausibleMove { price, entry });
        }
    }

    Ok(Signal::new(
        coin,
        candidate.entries,
        candidate.targets,
        candidate.sl,
        tag,
    ))
}

fn nearest(entries: &[f64], price: f64) -> f64 {
    entries
        .iter()
        .copied()
        .min_by(|a, b| (a - price).abs().total_cmp(&(b - price).abs()))
        .unwrap_or(price)
}
