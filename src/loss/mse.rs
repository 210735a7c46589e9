pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((expected - predicted)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        MseLoss::sum_squared(predicted, expected) / predicted.len() as f64
    }

    /// Σ (expected - predicted)²
    pub fn sum_squared(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| (e - p).powi(2))
            .sum()
    }

    /// Per-output error signal: expected - predicted.
    /// This is the negative gradient of ½Σ(e - p)² with respect to the output.
    pub fn residual(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| e - p)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_points_towards_target() {
        assert_eq!(MseLoss::residual(&[0.25, 0.75], &[1.0, 0.0]), vec![0.75, -0.75]);
    }

    #[test]
    fn sum_and_mean() {
        let p = [0.5, 0.5];
        let e = [1.0, 0.0];
        assert_eq!(MseLoss::sum_squared(&p, &e), 0.5);
        assert_eq!(MseLoss::loss(&p, &e), 0.25);
    }
}
