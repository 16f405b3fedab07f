use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::activation::{relu, relu_backward};
use crate::error::{NetError, Result};
use crate::loss::softmax_cross_entropy;
use crate::params::{Gradients, Parameters, DEFAULT_WEIGHT_SCALE};
use crate::utils::check_labels;

/// Two-layer fully-connected classifier: affine, ReLU, affine, softmax.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoLayerNet {
    pub params: Parameters,
}

/// Result of [`TwoLayerNet::evaluate`], depending on whether labels were given.
#[derive(Debug, Clone)]
pub enum LossOutput {
    Scores(Array2<f64>),
    Loss { loss: f64, grads: Gradients },
}

/// Intermediate values of one forward pass, kept for backprop.
struct ForwardCache {
    preactivation: Array2<f64>,
    hidden: Array2<f64>,
    scores: Array2<f64>,
}

impl TwoLayerNet {
    /// Create a network with weights drawn from `N(0, scale^2)` using the thread RNG.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        scale: f64,
    ) -> Result<Self> {
        Self::with_rng(input_size, hidden_size, output_size, scale, &mut rand::rng())
    }

    /// Same as [`TwoLayerNet::new`] with the default scale of `1e-4`.
    pub fn with_default_scale(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
    ) -> Result<Self> {
        Self::new(input_size, hidden_size, output_size, DEFAULT_WEIGHT_SCALE)
    }

    pub fn with_rng<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        scale: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let params = Parameters::new(input_size, hidden_size, output_size, scale, rng)?;
        Ok(TwoLayerNet { params })
    }

    pub fn from_parameters(params: Parameters) -> Result<Self> {
        params.check_shapes()?;
        Ok(TwoLayerNet { params })
    }

    pub fn input_size(&self) -> usize {
        self.params.input_size()
    }

    pub fn num_classes(&self) -> usize {
        self.params.output_size()
    }

    fn forward(&self, x: &Array2<f64>) -> Result<ForwardCache> {
        self.params.check_shapes()?;
        if x.ncols() != self.input_size() {
            return Err(NetError::DimensionMismatch(format!(
                "input has {} features, model expects {}",
                x.ncols(),
                self.input_size()
            )));
        }
        let p = &self.params;
        let preactivation = x.dot(&p.w1) + &p.b1;
        let hidden = relu(&preactivation);
        let scores = hidden.dot(&p.w2) + &p.b2;
        Ok(ForwardCache {
            preactivation,
            hidden,
            scores,
        })
    }

    /// Class scores of shape `(N, C)` for a batch of shape `(N, D)`.
    pub fn scores(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        Ok(self.forward(x)?.scores)
    }

    /// Softmax cross-entropy loss with L2 penalty `0.5 * reg * (|W1|^2 + |W2|^2)`,
    /// and its gradient with respect to every parameter.
    pub fn loss(&self, x: &Array2<f64>, y: &Array1<usize>, reg: f64) -> Result<(f64, Gradients)> {
        check_labels(x, y, self.num_classes())?;
        let cache = self.forward(x)?;
        let p = &self.params;

        let (data_loss, dscores) = softmax_cross_entropy(&cache.scores, y);
        let loss = data_loss + 0.5 * reg * p.weight_sq_norm();

        let dw2 = cache.hidden.t().dot(&dscores) + reg * &p.w2;
        let db2 = dscores.sum_axis(Axis(0));

        let mut dhidden = dscores.dot(&p.w2.t());
        relu_backward(&mut dhidden, &cache.preactivation);

        let dw1 = x.t().dot(&dhidden) + reg * &p.w1;
        let db1 = dhidden.sum_axis(Axis(0));

        Ok((
            loss,
            Gradients {
                w1: dw1,
                b1: db1,
                w2: dw2,
                b2: db2,
            },
        ))
    }

    /// Scores when `y` is `None`, loss and gradients otherwise.
    pub fn evaluate(
        &self,
        x: &Array2<f64>,
        y: Option<&Array1<usize>>,
        reg: f64,
    ) -> Result<LossOutput> {
        match y {
            None => self.scores(x).map(LossOutput::Scores),
            Some(y) => {
                let (loss, grads) = self.loss(x, y, reg)?;
                Ok(LossOutput::Loss { loss, grads })
            }
        }
    }

    /// Index of the highest score per row; ties go to the lowest index.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let scores = self.scores(x)?;
        Ok(scores.map_axis(Axis(1), |row| {
            let mut best = 0;
            for (class, &score) in row.iter().enumerate() {
                if score > row[best] {
                    best = class;
                }
            }
            best
        }))
    }

    /// Fraction of rows whose prediction equals the label. An empty set scores 0.
    pub fn accuracy(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<f64> {
        if y.len() != x.nrows() {
            return Err(NetError::DimensionMismatch(format!(
                "{} labels for {} rows",
                y.len(),
                x.nrows()
            )));
        }
        if y.is_empty() {
            return Ok(0.0);
        }
        let predicted = self.predict(x)?;
        let correct = predicted.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }
}
