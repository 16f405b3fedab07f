use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{NetError, Result};

/// Default standard deviation for weight initialization.
pub const DEFAULT_WEIGHT_SCALE: f64 = 1e-4;

/// The four parameter arrays of a two-layer network.
///
/// Shapes are fixed at construction: `w1` is `(D, H)`, `b1` is `(H)`,
/// `w2` is `(H, C)`, `b2` is `(C)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub w1: Array2<f64>,
    pub b1: Array1<f64>,
    pub w2: Array2<f64>,
    pub b2: Array1<f64>,
}

/// Gradients of the loss with respect to each [`Parameters`] array.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub w1: Array2<f64>,
    pub b1: Array1<f64>,
    pub w2: Array2<f64>,
    pub b2: Array1<f64>,
}

impl Parameters {
    /// Draws `w1` and `w2` from `N(0, scale^2)` and zeroes both biases.
    ///
    /// # Arguments
    ///
    /// * `input_size` - Feature dimension D
    /// * `hidden_size` - Hidden width H
    /// * `output_size` - Number of classes C
    /// * `scale` - Standard deviation of the weight draw
    /// * `rng` - Source of randomness
    pub fn new<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        scale: f64,
        rng: &mut R,
    ) -> Result<Self> {
        check_positive("input_size", input_size)?;
        check_positive("hidden_size", hidden_size)?;
        check_positive("output_size", output_size)?;
        if !scale.is_finite() {
            return Err(NetError::InvalidHyperparameter(format!(
                "weight scale must be finite, got {scale}"
            )));
        }

        let w1 = Array2::from_shape_fn((input_size, hidden_size), |_| {
            scale * rng.sample::<f64, _>(StandardNormal)
        });
        let w2 = Array2::from_shape_fn((hidden_size, output_size), |_| {
            scale * rng.sample::<f64, _>(StandardNormal)
        });

        Ok(Parameters {
            w1,
            b1: Array1::zeros(hidden_size),
            w2,
            b2: Array1::zeros(output_size),
        })
    }

    /// Wraps explicit arrays after checking they describe a consistent network.
    pub fn from_arrays(
        w1: Array2<f64>,
        b1: Array1<f64>,
        w2: Array2<f64>,
        b2: Array1<f64>,
    ) -> Result<Self> {
        let params = Parameters { w1, b1, w2, b2 };
        params.check_shapes()?;
        Ok(params)
    }

    /// Checks that the four arrays still describe one `D -> H -> C` network.
    ///
    /// The fields are public, so a caller can swap in an array of another
    /// shape after construction; every entry point re-checks before use.
    pub fn check_shapes(&self) -> Result<()> {
        let (d, h) = self.w1.dim();
        let c = self.w2.ncols();
        check_positive("input_size", d)?;
        check_positive("hidden_size", h)?;
        check_positive("output_size", c)?;
        if self.b1.len() != h || self.w2.nrows() != h || self.b2.len() != c {
            return Err(NetError::DimensionMismatch(format!(
                "inconsistent parameter shapes: w1 {:?}, b1 {}, w2 {:?}, b2 {}",
                self.w1.dim(),
                self.b1.len(),
                self.w2.dim(),
                self.b2.len()
            )));
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.w1.nrows()
    }

    pub fn hidden_size(&self) -> usize {
        self.w1.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.w2.ncols()
    }

    /// Total number of scalars across all four arrays.
    pub fn parameter_count(&self) -> usize {
        self.w1.len() + self.b1.len() + self.w2.len() + self.b2.len()
    }

    /// Sum of squared weights, biases excluded.
    pub fn weight_sq_norm(&self) -> f64 {
        (&self.w1 * &self.w1).sum() + (&self.w2 * &self.w2).sum()
    }
}

impl Gradients {
    /// Checks that every gradient array has the shape of its parameter.
    pub fn check_matches(&self, params: &Parameters) -> Result<()> {
        if self.w1.dim() != params.w1.dim()
            || self.b1.len() != params.b1.len()
            || self.w2.dim() != params.w2.dim()
            || self.b2.len() != params.b2.len()
        {
            return Err(NetError::DimensionMismatch(format!(
                "gradient shapes w1 {:?}, b1 {}, w2 {:?}, b2 {} do not match parameters \
                 w1 {:?}, b1 {}, w2 {:?}, b2 {}",
                self.w1.dim(),
                self.b1.len(),
                self.w2.dim(),
                self.b2.len(),
                params.w1.dim(),
                params.b1.len(),
                params.w2.dim(),
                params.b2.len()
            )));
        }
        Ok(())
    }
}

fn check_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(NetError::InvalidDimension { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shapes_and_zero_biases() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = Parameters::new(4, 3, 2, DEFAULT_WEIGHT_SCALE, &mut rng).unwrap();

        assert_eq!(params.w1.dim(), (4, 3));
        assert_eq!(params.b1.len(), 3);
        assert_eq!(params.w2.dim(), (3, 2));
        assert_eq!(params.b2.len(), 2);
        assert!(params.b1.iter().all(|&b| b == 0.0));
        assert!(params.b2.iter().all(|&b| b == 0.0));
        assert_eq!(params.parameter_count(), 4 * 3 + 3 + 3 * 2 + 2);
    }

    #[test]
    fn test_weights_follow_scale() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = Parameters::new(50, 40, 10, 1e-4, &mut rng).unwrap();
        let max = params.w1.iter().fold(0.0f64, |m, w| m.max(w.abs()));
        assert!(max > 0.0);
        assert!(max < 1e-3, "weights too large for scale 1e-4: {max}");
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let cases = [
            (0, 3, 2, "input_size"),
            (4, 0, 2, "hidden_size"),
            (4, 3, 0, "output_size"),
        ];
        for (d, h, c, name) in cases {
            match Parameters::new(d, h, c, 1e-4, &mut rng) {
                Err(NetError::InvalidDimension { name: got, value: 0 }) => assert_eq!(got, name),
                other => panic!("expected InvalidDimension for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_arrays_rejects_inconsistent_shapes() {
        let result = Parameters::from_arrays(
            Array2::zeros((4, 3)),
            Array1::zeros(2),
            Array2::zeros((3, 2)),
            Array1::zeros(2),
        );
        assert!(matches!(result, Err(NetError::DimensionMismatch(_))));
    }

    #[test]
    fn test_check_shapes_catches_replaced_bias() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut params = Parameters::new(4, 3, 2, 1e-2, &mut rng).unwrap();
        assert!(params.check_shapes().is_ok());

        params.b2 = Array1::zeros(5);
        assert!(matches!(params.check_shapes(), Err(NetError::DimensionMismatch(_))));
    }

    #[test]
    fn test_gradient_shapes_must_match() {
        let mut rng = StdRng::seed_from_u64(4);
        let params = Parameters::new(4, 3, 2, 1e-2, &mut rng).unwrap();
        let grads = Gradients {
            w1: Array2::zeros((4, 3)),
            b1: Array1::zeros(3),
            w2: Array2::zeros((3, 2)),
            b2: Array1::zeros(2),
        };
        assert!(grads.check_matches(&params).is_ok());

        let wrong = Gradients {
            w2: Array2::zeros((2, 3)),
            ..grads
        };
        assert!(matches!(wrong.check_matches(&params), Err(NetError::DimensionMismatch(_))));
    }
}
