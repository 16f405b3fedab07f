use ndarray::{Array1, Array2};
use rand::Rng;
use tracing::{debug, info, trace};

use crate::error::{NetError, Result};
use crate::hyperparameters::TrainConfig;
use crate::model::TwoLayerNet;
use crate::optimizer::Sgd;
use crate::utils::{check_labels, gather_batch, sample_indices};

/// Metrics recorded during one call to [`TwoLayerNet::train`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainHistory {
    /// Minibatch loss, one entry per iteration
    pub loss_history: Vec<f64>,
    /// Accuracy on the current minibatch, one entry per epoch
    pub train_acc_history: Vec<f64>,
    /// Accuracy on the full validation set, one entry per epoch
    pub val_acc_history: Vec<f64>,
}

impl TrainHistory {
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

impl TwoLayerNet {
    /// Train with minibatch SGD using the thread RNG.
    pub fn train(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        x_val: &Array2<f64>,
        y_val: &Array1<usize>,
        config: &TrainConfig,
    ) -> Result<TrainHistory> {
        self.train_with_rng(x, y, x_val, y_val, config, &mut rand::rng())
    }

    /// Train with minibatch SGD, updating the parameters in place.
    ///
    /// Every iteration samples `batch_size` rows with replacement, takes one
    /// gradient step and records the minibatch loss. At every multiple of the
    /// epoch length (`max(1, N / batch_size)`, iteration 0 included) the
    /// minibatch and validation accuracies are recorded and the learning rate
    /// is decayed.
    pub fn train_with_rng<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        x_val: &Array2<f64>,
        y_val: &Array1<usize>,
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<TrainHistory> {
        config.validate()?;
        self.params.check_shapes()?;
        self.check_features(x, "training")?;
        self.check_features(x_val, "validation")?;
        check_labels(x, y, self.num_classes())?;
        check_labels(x_val, y_val, self.num_classes())?;
        let num_train = x.nrows();
        if num_train == 0 {
            return Err(NetError::EmptyDataset("training set has no rows"));
        }

        let iterations_per_epoch = (num_train / config.batch_size).max(1);
        let mut sgd = Sgd::new(config.learning_rate);
        let mut history = TrainHistory {
            loss_history: Vec::with_capacity(config.num_iters),
            ..Default::default()
        };

        debug!(
            num_train,
            num_iters = config.num_iters,
            batch_size = config.batch_size,
            iterations_per_epoch,
            "starting training run"
        );

        for it in 0..config.num_iters {
            let indices = sample_indices(num_train, config.batch_size, rng);
            let (x_batch, y_batch) = gather_batch(x, y, &indices);

            let (loss, grads) = self.loss(&x_batch, &y_batch, config.reg)?;
            history.loss_history.push(loss);
            sgd.step(&mut self.params, &grads)?;

            if config.verbose && it % 100 == 0 {
                info!("iteration {} / {}: loss {}", it, config.num_iters, loss);
            } else {
                trace!(iteration = it, loss, "minibatch step");
            }

            if it % iterations_per_epoch == 0 {
                let train_acc = self.accuracy(&x_batch, &y_batch)?;
                let val_acc = self.accuracy(x_val, y_val)?;
                history.train_acc_history.push(train_acc);
                history.val_acc_history.push(val_acc);
                debug!(
                    epoch = it / iterations_per_epoch,
                    train_acc,
                    val_acc,
                    learning_rate = sgd.learning_rate,
                    "epoch checkpoint"
                );
                sgd.decay(config.learning_rate_decay);
            }
        }

        Ok(history)
    }

    fn check_features(&self, x: &Array2<f64>, set: &str) -> Result<()> {
        if x.ncols() != self.input_size() {
            return Err(NetError::DimensionMismatch(format!(
                "{set} set has {} features, model expects {}",
                x.ncols(),
                self.input_size()
            )));
        }
        Ok(())
    }
}
