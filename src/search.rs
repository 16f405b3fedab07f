//! Exhaustive grid search over learning rate, regularization strength and
//! iteration count.
//!
//! Every grid cell trains a fresh [`TwoLayerNet`]; the model with the highest
//! validation accuracy is kept. Improvements are reported to a [`ResultsLog`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{NetError, Result};
use crate::hyperparameters::TrainConfig;
use crate::model::TwoLayerNet;
use crate::params::DEFAULT_WEIGHT_SCALE;

/// Grid and fixed architecture for [`tune`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub learning_rates: Vec<f64>,
    pub reg_strengths: Vec<f64>,
    pub iteration_counts: Vec<usize>,
    pub hidden_size: usize,
    pub num_classes: usize,
    pub batch_size: usize,
    pub learning_rate_decay: f64,
    pub weight_scale: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            learning_rates: vec![1e-4, 5e-4, 1e-3],
            reg_strengths: vec![0.25, 0.5, 0.75],
            iteration_counts: vec![1000, 2000],
            hidden_size: 50,
            num_classes: 10,
            batch_size: 200,
            learning_rate_decay: 0.95,
            weight_scale: DEFAULT_WEIGHT_SCALE,
        }
    }
}

impl SearchConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: SearchConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.learning_rates.is_empty()
            || self.reg_strengths.is_empty()
            || self.iteration_counts.is_empty()
        {
            return Err(NetError::InvalidHyperparameter(
                "learning_rates, reg_strengths and iteration_counts must all be non-empty".into(),
            ));
        }
        if self.hidden_size == 0 {
            return Err(NetError::InvalidDimension {
                name: "hidden_size",
                value: 0,
            });
        }
        if self.num_classes == 0 {
            return Err(NetError::InvalidDimension {
                name: "num_classes",
                value: 0,
            });
        }
        for (learning_rate, reg, num_iters) in self.combinations() {
            self.train_config(learning_rate, reg, num_iters).validate()?;
        }
        Ok(())
    }

    /// Grid cells in search order: learning rate outer, reg middle, iterations inner.
    pub fn combinations(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.learning_rates.iter().flat_map(move |&lr| {
            self.reg_strengths.iter().flat_map(move |&reg| {
                self.iteration_counts.iter().map(move |&iters| (lr, reg, iters))
            })
        })
    }

    fn train_config(&self, learning_rate: f64, reg: f64, num_iters: usize) -> TrainConfig {
        TrainConfig {
            learning_rate,
            learning_rate_decay: self.learning_rate_decay,
            reg,
            num_iters,
            batch_size: self.batch_size,
            verbose: false,
        }
    }
}

/// Train and validation accuracy of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyPair {
    pub train_accuracy: f64,
    pub val_accuracy: f64,
}

/// The best grid cell seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestSoFar {
    pub learning_rate: f64,
    pub reg: f64,
    pub num_iters: usize,
    pub val_accuracy: f64,
}

/// Accuracies keyed by `(learning_rate, reg)` in first-insertion order.
///
/// Inserting an existing key overwrites its value in place, so later
/// iteration counts replace earlier ones for the same pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridResults {
    entries: Vec<((f64, f64), AccuracyPair)>,
}

impl GridResults {
    pub fn insert(&mut self, learning_rate: f64, reg: f64, accuracy: AccuracyPair) {
        let key = (learning_rate, reg);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, value)) => *value = accuracy,
            None => self.entries.push((key, accuracy)),
        }
    }

    pub fn get(&self, learning_rate: f64, reg: f64) -> Option<&AccuracyPair> {
        self.entries
            .iter()
            .find(|(k, _)| *k == (learning_rate, reg))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, &AccuracyPair)> + '_ {
        self.entries.iter().map(|((lr, reg), acc)| (*lr, *reg, acc))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest recorded validation accuracy, `None` when empty.
    pub fn best_val_accuracy(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|(_, acc)| acc.val_accuracy)
            .fold(None, |best, v| match best {
                Some(b) if b >= v => Some(b),
                _ => Some(v),
            })
    }
}

/// Receives every improvement of the best grid cell.
pub trait ResultsLog {
    fn record(&mut self, best: &BestSoFar) -> Result<()>;
}

impl ResultsLog for Vec<BestSoFar> {
    fn record(&mut self, best: &BestSoFar) -> Result<()> {
        self.push(*best);
        Ok(())
    }
}

/// Newline-delimited text log of improving grid cells.
pub struct FileResultsLog {
    writer: BufWriter<File>,
}

impl FileResultsLog {
    /// Creates the file, truncating anything left from a previous search.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(FileResultsLog {
            writer: BufWriter::new(file),
        })
    }
}

impl ResultsLog for FileResultsLog {
    fn record(&mut self, best: &BestSoFar) -> Result<()> {
        writeln!(
            self.writer,
            "lr {:e} reg {:e} num_iters {} val_accuracy {:.6}",
            best.learning_rate, best.reg, best.num_iters, best.val_accuracy
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

/// What [`tune`] hands back: the retained model and the bookkeeping behind it.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub model: TwoLayerNet,
    pub best: BestSoFar,
    pub results: GridResults,
}

/// Grid search using the thread RNG.
pub fn tune<L: ResultsLog>(
    config: &SearchConfig,
    x_train: &Array2<f64>,
    y_train: &Array1<usize>,
    x_val: &Array2<f64>,
    y_val: &Array1<usize>,
    log: &mut L,
) -> Result<SearchOutcome> {
    tune_with_rng(config, x_train, y_train, x_val, y_val, log, &mut rand::rng())
}

/// Trains one model per grid cell and keeps the one with the best validation accuracy.
///
/// A strictly greater accuracy is needed to replace the current best, so the
/// first cell wins ties. Any error aborts the whole sweep.
pub fn tune_with_rng<L: ResultsLog, R: Rng>(
    config: &SearchConfig,
    x_train: &Array2<f64>,
    y_train: &Array1<usize>,
    x_val: &Array2<f64>,
    y_val: &Array1<usize>,
    log: &mut L,
    rng: &mut R,
) -> Result<SearchOutcome> {
    config.validate()?;
    let input_size = x_train.ncols();

    let mut results = GridResults::default();
    let mut best: Option<(BestSoFar, TwoLayerNet)> = None;
    let search_start = Instant::now();

    for (learning_rate, reg, num_iters) in config.combinations() {
        let cell_start = Instant::now();
        let mut model = TwoLayerNet::with_rng(
            input_size,
            config.hidden_size,
            config.num_classes,
            config.weight_scale,
            rng,
        )?;
        let train_config = config.train_config(learning_rate, reg, num_iters);
        model.train_with_rng(x_train, y_train, x_val, y_val, &train_config, rng)?;

        let accuracy = AccuracyPair {
            train_accuracy: model.accuracy(x_train, y_train)?,
            val_accuracy: model.accuracy(x_val, y_val)?,
        };
        results.insert(learning_rate, reg, accuracy);
        info!(
            learning_rate,
            reg,
            num_iters,
            train_accuracy = accuracy.train_accuracy,
            val_accuracy = accuracy.val_accuracy,
            elapsed_secs = cell_start.elapsed().as_secs_f64(),
            "grid cell finished"
        );

        let improved = match &best {
            Some((current, _)) => accuracy.val_accuracy > current.val_accuracy,
            None => true,
        };
        if improved {
            let candidate = BestSoFar {
                learning_rate,
                reg,
                num_iters,
                val_accuracy: accuracy.val_accuracy,
            };
            info!(?candidate, "new best model");
            log.record(&candidate)?;
            best = Some((candidate, model));
        }
    }

    // validate() guarantees at least one grid cell
    let (best, model) =
        best.ok_or_else(|| NetError::InvalidHyperparameter("empty search grid".into()))?;
    info!(
        ?best,
        cells = results.len(),
        elapsed_secs = search_start.elapsed().as_secs_f64(),
        "search finished"
    );

    Ok(SearchOutcome { model, best, results })
}
