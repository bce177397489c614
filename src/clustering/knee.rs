use crate::error::KneeError;

/// Bends smaller than this (in normalized units) are treated as no bend.
const MIN_BEND: f64 = 1e-9;

/// Pick the K at the knee of a decreasing cost curve.
///
/// Both axes are scaled to 0..=1 and every point is compared with the chord
/// joining the first and last point. The knee is the point lying farthest
/// below that chord; the lowest K wins ties.
///
/// ```
/// use okpalette::clustering::select_knee;
///
/// let ks = [1, 2, 3, 4, 5, 6];
/// let costs = [100.0, 80.0, 60.0, 40.0, 38.0, 36.0];
/// assert_eq!(select_knee(&ks, &costs), Ok(4));
/// ```
pub fn select_knee(ks: &[usize], costs: &[f64]) -> Result<usize, KneeError> {
    if ks.len() != costs.len() {
        return Err(KneeError::LengthMismatch {
            ks: ks.len(),
            costs: costs.len(),
        });
    }
    if ks.len() < 3 {
        return Err(KneeError::TooFewPoints { len: ks.len() });
    }

    let degenerate = || KneeError::Degenerate {
        costs: costs.to_vec(),
    };

    let (x_first, x_last) = (ks[0] as f64, ks[ks.len() - 1] as f64);
    let x_span = x_last - x_first;
    let y_min = costs.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = costs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_span = y_max - y_min;
    if costs.iter().any(|c| !c.is_finite()) || !(x_span > 0.0 && y_span > 0.0) {
        return Err(degenerate());
    }

    let y_first = (costs[0] - y_min) / y_span;
    let y_last = (costs[costs.len() - 1] - y_min) / y_span;

    let mut knee: Option<(usize, f64)> = None;
    for (&k, &cost) in ks.iter().zip(costs) {
        let x = (k as f64 - x_first) / x_span;
        let y = (cost - y_min) / y_span;
        let chord = y_first + (y_last - y_first) * x;
        let bend = chord - y;
        if knee.map_or(true, |(_, best)| bend > best) {
            knee = Some((k, bend));
        }
    }

    match knee {
        Some((k, bend)) if bend > MIN_BEND => Ok(k),
        _ => Err(KneeError::NoBend {
            ks: ks.to_vec(),
            costs: costs.to_vec(),
        }),
    }
}
