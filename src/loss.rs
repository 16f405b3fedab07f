use ndarray::{Array1, Array2, Axis};

/// Row-wise softmax with the per-row maximum subtracted before exponentiating.
pub fn softmax(scores: &Array2<f64>) -> Array2<f64> {
    let row_max = scores.map_axis(Axis(1), |row| {
        row.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x))
    });
    let exp = (scores - &row_max.insert_axis(Axis(1))).mapv(f64::exp);
    let row_sum = exp.sum_axis(Axis(1));
    exp / &row_sum.insert_axis(Axis(1))
}

/// Softmax cross-entropy over a batch.
///
/// Returns the mean data loss and `dloss/dscores`. Labels must already be
/// checked against the score width.
pub fn softmax_cross_entropy(scores: &Array2<f64>, labels: &Array1<usize>) -> (f64, Array2<f64>) {
    let n = scores.nrows() as f64;
    let probs = softmax(scores);

    let data_loss = labels
        .iter()
        .enumerate()
        .map(|(row, &label)| -probs[[row, label]].ln())
        .sum::<f64>()
        / n;

    let mut dscores = probs;
    for (row, &label) in labels.iter().enumerate() {
        dscores[[row, label]] -= 1.0;
    }
    dscores /= n;

    (data_loss, dscores)
}
