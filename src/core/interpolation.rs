/// One-dimensional linear interpolation over ordered `(x, y)` observations.
use interp::{interp, InterpMode};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do with a query that lies outside the observed x range.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Propagate the nearest observation. No extrapolation takes place, so results for
    /// queries beyond the data are only as good as the outermost simulated case.
    #[default]
    Propagate,
    /// Extend the line through the two outermost distinct observations.
    Extrapolate,
    /// Fail with `Interpolation1dError::OutsideRange`.
    Reject,
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum Interpolation1dError {
    #[error("No interpolation points were supplied")]
    NoPoints,
    #[error("Query {query} is outside the observed range [{min}, {max}]")]
    OutsideRange { query: f64, min: f64, max: f64 },
    #[error("Query must be a finite number, got {0}")]
    NonFiniteQuery(f64),
}

/// Linearly interpolate `points`, sorted ascending by x, at `query`.
///
/// Repeated x values are allowed. A query that hits an observed x exactly returns the y of the
/// last observation with that x, without averaging.
pub fn interpolate_1d(
    points: &[(f64, f64)],
    query: f64,
    policy: BoundaryPolicy,
) -> Result<f64, Interpolation1dError> {
    debug_assert!(points.windows(2).all(|pair| pair[0].0 <= pair[1].0));

    if !query.is_finite() {
        return Err(Interpolation1dError::NonFiniteQuery(query));
    }
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Err(Interpolation1dError::NoPoints);
    };

    if query < first.0 || query > last.0 {
        match policy {
            BoundaryPolicy::Reject => {
                return Err(Interpolation1dError::OutsideRange {
                    query,
                    min: first.0,
                    max: last.0,
                })
            }
            // backfill takes the first observation at the lowest x
            BoundaryPolicy::Propagate if query < first.0 => return Ok(first.1),
            BoundaryPolicy::Propagate => return Ok(last.1),
            BoundaryPolicy::Extrapolate => {}
        }
    }

    // repeated x values keep their last observation
    let (xs, ys): (Vec<f64>, Vec<f64>) = points
        .iter()
        .copied()
        .coalesce(|previous, next| {
            if previous.0 == next.0 {
                Ok(next)
            } else {
                Err((previous, next))
            }
        })
        .unzip();

    if let Some(index) = xs.iter().position(|x| *x == query) {
        return Ok(ys[index]);
    }
    if xs.len() == 1 {
        return Ok(ys[0]);
    }

    Ok(interp(&xs, &ys, query, &InterpMode::Extrapolate))
}
