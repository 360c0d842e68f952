use crate::domain::PriceSample;

/// Fills missing daily prices from the nearest known neighbors.
///
/// For each gap: both neighbors known -> their unweighted average, rounded
/// to 2 decimals; one neighbor known -> that value; neither -> stays `None`.
/// Known samples pass through unchanged. Fills are computed strictly from
/// the originally-known samples, so a filled value never feeds another gap.
pub fn fill_gaps(samples: &[PriceSample]) -> Vec<PriceSample> {
    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| match sample.market_price {
            Some(_) => *sample,
            None => PriceSample {
                date: sample.date,
                market_price: best_guess(samples, index),
            },
        })
        .collect()
}

fn best_guess(samples: &[PriceSample], index: usize) -> Option<f64> {
    let prev = samples[..index]
        .iter()
        .rev()
        .find_map(|sample| sample.market_price);
    let next = samples[index + 1..]
        .iter()
        .find_map(|sample| sample.market_price);

    match (prev, next) {
        (Some(prev), Some(next)) => Some(round2((prev + next) / 2.0)),
        (Some(prev), None) => Some(prev),
        (None, Some(next)) => Some(next),
        (None, None) => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
