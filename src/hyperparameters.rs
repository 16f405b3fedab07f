use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

/// Hyperparameters for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Initial SGD step size
    pub learning_rate: f64,

    /// Factor applied to the learning rate at every epoch boundary, in (0, 1]
    pub learning_rate_decay: f64,

    /// L2 regularization strength
    pub reg: f64,

    /// Number of minibatch updates
    pub num_iters: usize,

    /// Rows sampled (with replacement) per update
    pub batch_size: usize,

    /// Log progress every 100 iterations at info level
    pub verbose: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 1e-3,
            learning_rate_decay: 0.95,
            reg: 1e-5,
            num_iters: 100,
            batch_size: 200,
            verbose: false,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(NetError::InvalidHyperparameter(format!(
                "learning_rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.learning_rate_decay > 0.0 && self.learning_rate_decay <= 1.0) {
            return Err(NetError::InvalidHyperparameter(format!(
                "learning_rate_decay must be in (0, 1], got {}",
                self.learning_rate_decay
            )));
        }
        if !self.reg.is_finite() || self.reg < 0.0 {
            return Err(NetError::InvalidHyperparameter(format!(
                "reg must be finite and >= 0, got {}",
                self.reg
            )));
        }
        if self.batch_size == 0 {
            return Err(NetError::InvalidHyperparameter("batch_size must be positive".into()));
        }
        Ok(())
    }
}
