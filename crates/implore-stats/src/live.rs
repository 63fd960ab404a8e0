//! Live-point counts for nested sampling runs
//!
//! Each dead point records the likelihood contour at which it was born and
//! the one at which it died. The number of live points at each death is the
//! running total of births minus deaths up to that contour.

use crate::error::{StatsError, StatsResult};

/// Number of live points at each death contour
///
/// `death` must be sorted ascending. A birth counts against the first death
/// contour at or above it; births above every death add a final entry.
pub fn compute_nlive(death: &[f64], birth: &[f64]) -> StatsResult<Vec<i64>> {
    if death.windows(2).any(|pair| !(pair[0] <= pair[1])) {
        return Err(StatsError::Unsorted);
    }
    if death.iter().chain(birth).any(|v| v.is_nan()) {
        return Err(StatsError::NonFinite("birth/death contours"));
    }

    let mut delta = vec![0i64; death.len() + 1];
    for &b in birth {
        delta[death.partition_point(|&d| d < b)] += 1;
    }
    for d in delta.iter_mut().take(death.len()) {
        *d -= 1;
    }

    // The trailing slot only exists when something was born above every death
    if delta[death.len()] == 0 {
        delta.pop();
    }

    Ok(delta
        .iter()
        .scan(0i64, |live, &d| {
            *live += d;
            Some(*live)
        })
        .collect())
}
