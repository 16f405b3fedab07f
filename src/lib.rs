mod activation;
mod error;
mod hyperparameters;
mod loss;
mod model;
mod optimizer;
mod params;
mod search;
mod trainer;
mod utils;

pub use activation::{relu, relu_backward};
pub use error::{NetError, Result};
pub use hyperparameters::TrainConfig;
pub use loss::{softmax, softmax_cross_entropy};
pub use model::{LossOutput, TwoLayerNet};
pub use optimizer::Sgd;
pub use params::{Gradients, Parameters, DEFAULT_WEIGHT_SCALE};
pub use search::{
    tune, tune_with_rng, AccuracyPair, BestSoFar, FileResultsLog, GridResults, ResultsLog,
    SearchConfig, SearchOutcome,
};
pub use trainer::TrainHistory;
