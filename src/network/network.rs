use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activation::activation::sigmoid;
use crate::errors::NnError;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;

/// Input → hidden → output network with sigmoid activations on both layers.
///
/// Shapes are fixed at construction:
/// - `w_in_hidden` : `hidden_size × input_size`
/// - `b_hidden`    : `hidden_size`
/// - `w_hidden_out`: `output_size × hidden_size`
/// - `b_out`       : `output_size`
///
/// The serialized form is a keyed document with exactly these four arrays,
/// under the names `W_in_hidden`, `b_hidden`, `W_hidden_out` and `b_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkParameters", into = "NetworkParameters")]
pub struct NeuralNetwork {
    w_in_hidden: Matrix,
    b_hidden: Vec<f64>,
    w_hidden_out: Matrix,
    b_out: Vec<f64>,
}

/// On-disk layout; converted into `NeuralNetwork` only after shape checks.
#[derive(Serialize, Deserialize)]
pub struct NetworkParameters {
    #[serde(rename = "W_in_hidden")]
    pub w_in_hidden: Matrix,
    pub b_hidden: Vec<f64>,
    #[serde(rename = "W_hidden_out")]
    pub w_hidden_out: Matrix,
    pub b_out: Vec<f64>,
}

impl TryFrom<NetworkParameters> for NeuralNetwork {
    type Error = NnError;

    fn try_from(p: NetworkParameters) -> Result<Self, Self::Error> {
        NeuralNetwork::from_parameters(p.w_in_hidden, p.b_hidden, p.w_hidden_out, p.b_out)
    }
}

impl From<NeuralNetwork> for NetworkParameters {
    fn from(n: NeuralNetwork) -> Self {
        NetworkParameters {
            w_in_hidden: n.w_in_hidden,
            b_hidden: n.b_hidden,
            w_hidden_out: n.w_hidden_out,
            b_out: n.b_out,
        }
    }
}

fn positive(name: &'static str, value: usize) -> Result<usize, NnError> {
    if value == 0 {
        return Err(NnError::InvalidSize { name, value });
    }
    Ok(value)
}

fn expect_len(what: &'static str, expected: usize, actual: usize) -> Result<(), NnError> {
    if expected != actual {
        return Err(NnError::DimensionMismatch { what, expected, actual });
    }
    Ok(())
}

fn standard_normal_vec<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f64> {
    (0..len).map(|_| rng.sample(StandardNormal)).collect()
}

impl NeuralNetwork {
    /// Allocates a network and draws every weight and bias from N(0, 1).
    ///
    /// Fails with `NnError::InvalidSize` if any size is zero.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        hidden_size: usize,
        rng: &mut R,
    ) -> Result<NeuralNetwork, NnError> {
        positive("input_size", input_size)?;
        positive("output_size", output_size)?;
        positive("hidden_size", hidden_size)?;

        let w_in_hidden = Matrix::standard_normal(hidden_size, input_size, rng);
        let b_hidden = standard_normal_vec(hidden_size, rng);
        let w_hidden_out = Matrix::standard_normal(output_size, hidden_size, rng);
        let b_out = standard_normal_vec(output_size, rng);

        Ok(NeuralNetwork {
            w_in_hidden,
            b_hidden,
            w_hidden_out,
            b_out,
        })
    }

    /// Builds a network from explicit parameters after checking that the four
    /// arrays describe one consistent, non-empty shape.
    pub fn from_parameters(
        w_in_hidden: Matrix,
        b_hidden: Vec<f64>,
        w_hidden_out: Matrix,
        b_out: Vec<f64>,
    ) -> Result<NeuralNetwork, NnError> {
        w_in_hidden.check_shape()?;
        w_hidden_out.check_shape()?;

        let hidden_size = positive("hidden_size", w_in_hidden.rows)?;
        positive("input_size", w_in_hidden.cols)?;
        let output_size = positive("output_size", w_hidden_out.rows)?;

        expect_len("b_hidden", hidden_size, b_hidden.len())?;
        expect_len("W_hidden_out columns", hidden_size, w_hidden_out.cols)?;
        expect_len("b_out", output_size, b_out.len())?;

        Ok(NeuralNetwork {
            w_in_hidden,
            b_hidden,
            w_hidden_out,
            b_out,
        })
    }

    pub fn input_size(&self) -> usize {
        self.w_in_hidden.cols
    }

    pub fn hidden_size(&self) -> usize {
        self.w_in_hidden.rows
    }

    pub fn output_size(&self) -> usize {
        self.w_hidden_out.rows
    }

    pub fn w_in_hidden(&self) -> &Matrix {
        &self.w_in_hidden
    }

    pub fn b_hidden(&self) -> &[f64] {
        &self.b_hidden
    }

    pub fn w_hidden_out(&self) -> &Matrix {
        &self.w_hidden_out
    }

    pub fn b_out(&self) -> &[f64] {
        &self.b_out
    }

    /// True while every weight and bias is a finite number.
    pub fn is_finite(&self) -> bool {
        self.w_in_hidden.is_finite()
            && self.w_hidden_out.is_finite()
            && self.b_hidden.iter().all(|x| x.is_finite())
            && self.b_out.iter().all(|x| x.is_finite())
    }

    fn forward_hidden(&self, input: &[f64]) -> Vec<f64> {
        layer_forward(&self.w_in_hidden, &self.b_hidden, input)
    }

    fn forward_output(&self, hidden: &[f64]) -> Vec<f64> {
        layer_forward(&self.w_hidden_out, &self.b_out, hidden)
    }

    /// Confidence vector of length `output_size`, each entry in `(0, 1)`.
    /// The entries are independent sigmoids and do not sum to one.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>, NnError> {
        expect_len("input", self.input_size(), input.len())?;
        Ok(self.forward_output(&self.forward_hidden(input)))
    }

    /// Index of the largest confidence; the first index wins a tie.
    pub fn classify(&self, input: &[f64]) -> Result<usize, NnError> {
        Ok(argmax(&self.predict(input)?))
    }

    /// One online training step on a single `(input, target)` pair.
    ///
    /// The hidden error is scaled by the hidden unit's own sigmoid derivative
    /// only; the output error is the raw residual `target - output`. Both
    /// deltas are computed before any parameter changes, so the hidden delta
    /// always sees the pre-update output weights.
    pub fn train(&mut self, input: &[f64], target: &[f64], optimizer: &Sgd) -> Result<(), NnError> {
        expect_len("input", self.input_size(), input.len())?;
        expect_len("target", self.output_size(), target.len())?;

        let hidden = self.forward_hidden(input);
        let output = self.forward_output(&hidden);

        let out_delta = MseLoss::residual(&output, target);
        let hidden_delta: Vec<f64> = hidden
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let mut sum = 0.0;
                for (row, &d) in self.w_hidden_out.data.iter().zip(&out_delta) {
                    sum += row[i] * d * h * (1.0 - h);
                }
                sum
            })
            .collect();

        optimizer.step(&mut self.w_hidden_out, &mut self.b_out, &out_delta, &hidden);
        optimizer.step(&mut self.w_in_hidden, &mut self.b_hidden, &hidden_delta, input);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, NnError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<NeuralNetwork, NnError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the network parameters to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), NnError> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        debug!(path = %path.display(), "saved network");
        Ok(())
    }

    /// Loads a network previously written by `save_json`, re-checking shapes.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NeuralNetwork, NnError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let network: NeuralNetwork = serde_json::from_reader(reader)?;
        debug!(
            path = %path.display(),
            input = network.input_size(),
            hidden = network.hidden_size(),
            output = network.output_size(),
            "loaded network"
        );
        Ok(network)
    }
}

/// `sigmoid(W x + b)`; the bias is added after the weighted sum.
fn layer_forward(weights: &Matrix, biases: &[f64], input: &[f64]) -> Vec<f64> {
    weights
        .mul_vec(input)
        .into_iter()
        .zip(biases)
        .map(|(z, b)| sigmoid(z + b))
        .collect()
}

/// Index of the maximum element using strict `>`, so the first maximum wins.
/// Returns 0 for an empty slice.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_network() -> NeuralNetwork {
        NeuralNetwork::from_parameters(
            Matrix::from_data(vec![vec![0.1, -0.2], vec![0.3, 0.05], vec![-0.15, 0.2]]).unwrap(),
            vec![0.0, 0.1, -0.1],
            Matrix::from_data(vec![vec![0.2, -0.1, 0.05], vec![-0.05, 0.1, 0.15]]).unwrap(),
            vec![0.05, -0.05],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_zero_sizes() {
        let mut rng = StdRng::seed_from_u64(0);
        for (i, o, h) in [(0, 2, 3), (2, 0, 3), (2, 2, 0)] {
            let err = NeuralNetwork::new(i, o, h, &mut rng).unwrap_err();
            assert!(matches!(err, NnError::InvalidSize { value: 0, .. }));
        }
    }

    #[test]
    fn same_seed_gives_same_parameters() {
        let a = NeuralNetwork::new(4, 3, 5, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = NeuralNetwork::new(4, 3, 5, &mut StdRng::seed_from_u64(11)).unwrap();
        let c = NeuralNetwork::new(4, 3, 5, &mut StdRng::seed_from_u64(12)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn from_parameters_checks_shapes() {
        let err = NeuralNetwork::from_parameters(
            Matrix::zeros(3, 2),
            vec![0.0; 2],
            Matrix::zeros(2, 3),
            vec![0.0; 2],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NnError::DimensionMismatch { what: "b_hidden", expected: 3, actual: 2 }
        ));

        let err = NeuralNetwork::from_parameters(
            Matrix::zeros(3, 2),
            vec![0.0; 3],
            Matrix::zeros(2, 4),
            vec![0.0; 2],
        )
        .unwrap_err();
        assert!(matches!(err, NnError::DimensionMismatch { expected: 3, actual: 4, .. }));

        let err = NeuralNetwork::from_parameters(
            Matrix::zeros(3, 0),
            vec![0.0; 3],
            Matrix::zeros(2, 3),
            vec![0.0; 2],
        )
        .unwrap_err();
        assert!(matches!(err, NnError::InvalidSize { name: "input_size", .. }));
    }

    #[test]
    fn from_parameters_rejects_matrix_whose_rows_disagree_with_its_shape() {
        let lying = Matrix { rows: 1, cols: 3, data: vec![vec![0.5]] };
        let err = NeuralNetwork::from_parameters(
            Matrix::zeros(3, 2),
            vec![0.0; 3],
            lying,
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, NnError::RaggedMatrix { row: 0, expected: 3, actual: 1 }));

        let missing_rows = Matrix { rows: 3, cols: 2, data: vec![vec![0.0, 0.0]] };
        let err = NeuralNetwork::from_parameters(
            missing_rows,
            vec![0.0; 3],
            Matrix::zeros(1, 3),
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, NnError::DimensionMismatch { what: "matrix rows", .. }));
    }

    #[test]
    fn predict_matches_hand_computation() {
        let net = small_network();
        let input = [1.0, 0.5];
        let h: Vec<f64> = (0..3)
            .map(|i| {
                let row = &net.w_in_hidden.data[i];
                sigmoid(row[0] * input[0] + row[1] * input[1] + net.b_hidden[i])
            })
            .collect();
        let expected: Vec<f64> = (0..2)
            .map(|i| {
                let row = &net.w_hidden_out.data[i];
                sigmoid(row[0] * h[0] + row[1] * h[1] + row[2] * h[2] + net.b_out[i])
            })
            .collect();
        assert_eq!(net.predict(&input).unwrap(), expected);
    }

    #[test]
    fn predict_rejects_wrong_input_length() {
        let net = small_network();
        let err = net.predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            NnError::DimensionMismatch { what: "input", expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn train_rejects_wrong_lengths_without_mutating() {
        let mut net = small_network();
        let before = net.clone();
        assert!(net.train(&[1.0], &[1.0, 0.0], &Sgd::default()).is_err());
        assert!(net.train(&[1.0, 0.0], &[1.0], &Sgd::default()).is_err());
        assert_eq!(net, before);
    }

    #[test]
    fn argmax_keeps_first_of_equal_maxima() {
        assert_eq!(argmax(&[0.2, 0.7, 0.7, 0.1]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.2, 0.9]), 2);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn serialized_keys_are_the_four_parameter_names() {
        let net = small_network();
        let value: serde_json::Value = serde_json::from_str(&net.to_json().unwrap()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["W_hidden_out", "W_in_hidden", "b_hidden", "b_out"]);
        assert_eq!(value["W_in_hidden"].as_array().unwrap().len(), 3);
        assert_eq!(value["W_hidden_out"][0].as_array().unwrap().len(), 3);
    }

    #[test]
    fn deserialization_rejects_inconsistent_shapes() {
        let json = r#"{"W_in_hidden":[[1.0,2.0]],"b_hidden":[0.0,1.0],"W_hidden_out":[[1.0]],"b_out":[0.0]}"#;
        assert!(NeuralNetwork::from_json(json).is_err());
        let ragged = r#"{"W_in_hidden":[[1.0,2.0],[1.0]],"b_hidden":[0.0,1.0],"W_hidden_out":[[1.0,1.0]],"b_out":[0.0]}"#;
        assert!(NeuralNetwork::from_json(ragged).is_err());
    }
}
