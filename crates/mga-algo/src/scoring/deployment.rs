use super::{Deployment, TrackedComponents, Weights};

/// Value over capacity limit for every tracked component.
///
/// Components without a positive limit are taken as-is (limit 1); missing
/// values count as zero.
pub fn relative_deployment(values: &Deployment, tracked: &TrackedComponents) -> Deployment {
    tracked
        .components()
        .into_iter()
        .map(|id| {
            let value = values.get(id).copied().unwrap_or(0.0);
            let limit = tracked
                .capacity_limit(id)
                .filter(|l| l.is_finite() && *l > 0.0)
                .unwrap_or(1.0);
            (id.clone(), value / limit)
        })
        .collect()
}

/// Divide every weight by the largest one. All-zero weights stay zero.
pub fn normalize_by_max(weights: &Weights) -> Weights {
    let max = weights.values().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return weights.clone();
    }
    weights
        .iter()
        .map(|(id, w)| (id.clone(), w / max))
        .collect()
}
