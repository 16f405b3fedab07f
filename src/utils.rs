use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::error::{NetError, Result};

/// Draws `batch_size` row indices from `0..num_rows`, uniformly and with replacement.
pub fn sample_indices<R: Rng>(num_rows: usize, batch_size: usize, rng: &mut R) -> Vec<usize> {
    (0..batch_size).map(|_| rng.random_range(0..num_rows)).collect()
}

/// Gathers the rows at `indices` from a feature matrix and its labels.
pub fn gather_batch(
    x: &Array2<f64>,
    y: &Array1<usize>,
    indices: &[usize],
) -> (Array2<f64>, Array1<usize>) {
    (x.select(Axis(0), indices), y.select(Axis(0), indices))
}

/// Checks that `y` has one label per row of `x` and every label is below `num_classes`.
pub fn check_labels(x: &Array2<f64>, y: &Array1<usize>, num_classes: usize) -> Result<()> {
    if y.len() != x.nrows() {
        return Err(NetError::DimensionMismatch(format!(
            "{} labels for {} rows",
            y.len(),
            x.nrows()
        )));
    }
    if let Some((row, &label)) = y.iter().enumerate().find(|(_, label)| **label >= num_classes) {
        return Err(NetError::DimensionMismatch(format!(
            "label {label} at row {row} is outside [0, {num_classes})"
        )));
    }
    Ok(())
}
