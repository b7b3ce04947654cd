use crate::eta::config::DiminishingParams;
use crate::eta::types::ImpactEntry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combined {
    /// Sum of weighted impacts before trip-length dampening.
    pub raw_sum: f64,
    /// Sum of fully scaled contributions, the input to the saturating curve.
    pub scaled_sum: f64,
    pub combined: f64,
}

/// Saturating merge `s / (1 + k*s)`; stays below `1/k` for any positive `s`.
///
/// The denominator is held at `min_denominator` or above so a sum near
/// `-1/k` cannot blow up.
pub fn diminishing_returns(sum: f64, params: &DiminishingParams) -> f64 {
    let denominator = (1.0 + params.k * sum).max(params.min_denominator);
    sum / denominator
}

pub fn combine_impacts(entries: &[ImpactEntry], params: &DiminishingParams) -> Combined {
    let raw_sum: f64 = entries.iter().map(ImpactEntry::weighted_impact).sum();
    let scaled_sum: f64 = entries.iter().map(ImpactEntry::contribution).sum();
    Combined {
        raw_sum,
        scaled_sum,
        combined: diminishing_returns(scaled_sum, params),
    }
}
