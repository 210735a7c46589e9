/// Logistic sigmoid, `1 / (1 + e^-x)`. Maps any real into `(0, 1)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_of_zero_is_half() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_is_symmetric_about_half() {
        for &x in &[-30.0, -5.5, -1.0, -1e-3, 0.25, 2.0, 7.75, 30.0] {
            assert_abs_diff_eq!(sigmoid(x) + sigmoid(-x), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn sigmoid_is_monotonic() {
        let xs: Vec<f64> = (-200..=200).map(|i| i as f64 * 0.1).collect();
        for w in xs.windows(2) {
            assert!(sigmoid(w[0]) < sigmoid(w[1]), "sigmoid not increasing at {}", w[0]);
        }
    }
}
