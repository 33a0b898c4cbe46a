use super::{Deployment, TrackedComponents, Weights};

/// Mean of every tracked component over the history (missing = 0).
pub fn average_deployment(history: &[Deployment], tracked: &TrackedComponents) -> Deployment {
    tracked
        .components()
        .into_iter()
        .map(|id| {
            let samples = samples(history, id);
            let mean = if samples.is_empty() {
                0.0
            } else {
                samples.iter().sum::<f64>() / samples.len() as f64
            };
            (id.clone(), mean)
        })
        .collect()
}

/// Median of every tracked component over the history (missing = 0).
///
/// Even-length histories take the mean of the two middle values.
pub fn median_deployment(history: &[Deployment], tracked: &TrackedComponents) -> Deployment {
    tracked
        .components()
        .into_iter()
        .map(|id| {
            let mut samples = samples(history, id);
            samples.sort_by(f64::total_cmp);
            let n = samples.len();
            let median = match n {
                0 => 0.0,
                _ if n % 2 == 1 => samples[n / 2],
                _ => (samples[n / 2 - 1] + samples[n / 2]) / 2.0,
            };
            (id.clone(), median)
        })
        .collect()
}

/// `1 / max(|latest - center| / center, clip_min)`, or 0 where the center
/// is 0 so that components never deployed so far stay attractive.
pub fn evolving_weights(latest: &Deployment, center: &Deployment, clip_min: f64) -> Weights {
    center
        .iter()
        .map(|(id, &m)| {
            if m == 0.0 {
                return (id.clone(), 0.0);
            }
            let x = latest.get(id).copied().unwrap_or(0.0);
            let change = ((x - m).abs() / m.abs()).max(clip_min);
            (id.clone(), 1.0 / change)
        })
        .collect()
}

fn samples(history: &[Deployment], id: &mga_core::ComponentId) -> Vec<f64> {
    history
        .iter()
        .map(|deployment| deployment.get(id).copied().unwrap_or(0.0))
        .collect()
}
