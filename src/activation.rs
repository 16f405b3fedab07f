use ndarray::{Array2, Zip};

/// Elementwise `max(x, 0)`.
pub fn relu(preactivation: &Array2<f64>) -> Array2<f64> {
    preactivation.mapv(|x| if x > 0.0 { x } else { 0.0 })
}

/// Zeroes every gradient entry whose pre-activation was `<= 0`.
///
/// Ties at exactly zero are closed, matching [`relu`].
pub fn relu_backward(grad: &mut Array2<f64>, preactivation: &Array2<f64>) {
    Zip::from(grad)
        .and(preactivation)
        .for_each(|g, &p| {
            if p <= 0.0 {
                *g = 0.0;
            }
        });
}
