use crate::error::Result;
use crate::params::{Gradients, Parameters};

/// Vanilla stochastic gradient descent with multiplicative learning-rate decay.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// `param -= learning_rate * grad` for each of the four arrays.
    ///
    /// Nothing is updated unless every gradient has its parameter's shape.
    pub fn step(&self, params: &mut Parameters, grads: &Gradients) -> Result<()> {
        params.check_shapes()?;
        grads.check_matches(params)?;
        let lr = self.learning_rate;
        params.w1.scaled_add(-lr, &grads.w1);
        params.b1.scaled_add(-lr, &grads.b1);
        params.w2.scaled_add(-lr, &grads.w2);
        params.b2.scaled_add(-lr, &grads.b2);
        Ok(())
    }

    pub fn decay(&mut self, factor: f64) {
        self.learning_rate *= factor;
    }
}
