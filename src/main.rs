use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use twonet::{tune_with_rng, FileResultsLog, SearchConfig};

const FEATURES: usize = 16;
const CLASSES: usize = 3;

/// Gaussian blobs around one random center per class.
fn blobs(rows: usize, centers: &Array2<f64>, rng: &mut StdRng) -> (Array2<f64>, Array1<usize>) {
    let y = Array1::from_shape_fn(rows, |_| rng.random_range(0..CLASSES));
    let x = Array2::from_shape_fn((rows, FEATURES), |(row, col)| {
        centers[[y[row], col]] + rng.sample::<f64, _>(StandardNormal)
    });
    (x, y)
}

fn main() -> twonet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SearchConfig::from_json_path(path)?,
        None => SearchConfig {
            learning_rates: vec![1e-2, 5e-2, 1e-1],
            reg_strengths: vec![1e-4, 1e-2],
            iteration_counts: vec![200, 500],
            hidden_size: 32,
            num_classes: CLASSES,
            batch_size: 64,
            ..Default::default()
        },
    };
    let log_path = args.next().unwrap_or_else(|| "tuning_results.txt".to_string());

    let mut rng = StdRng::seed_from_u64(0);
    let centers = Array2::from_shape_fn((CLASSES, FEATURES), |_| {
        2.0 * rng.sample::<f64, _>(StandardNormal)
    });
    let (x_train, y_train) = blobs(1000, &centers, &mut rng);
    let (x_val, y_val) = blobs(200, &centers, &mut rng);

    let mut log = FileResultsLog::create(&log_path)?;
    let outcome = tune_with_rng(&config, &x_train, &y_train, &x_val, &y_val, &mut log, &mut rng)?;

    info!(
        learning_rate = outcome.best.learning_rate,
        reg = outcome.best.reg,
        num_iters = outcome.best.num_iters,
        val_accuracy = outcome.best.val_accuracy,
        log = %log_path,
        "best model"
    );
    Ok(())
}
