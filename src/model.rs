/// A parametric family of prediction functions.
///
/// `parameterize` turns one parameter vector into a concrete prediction
/// function over the independent variable. The model is treated as pure:
/// the solver calls `parameterize` once per cost or Jacobian evaluation and
/// then applies the predictor to every sample.
pub trait ParametricModel {
    /// The prediction function produced for one parameter vector.
    type Predictor: Fn(f64) -> f64;

    /// Build the prediction function for this parameter vector.
    fn parameterize(&self, params: &[f64]) -> Self::Predictor;
}

/// Any closure from a parameter slice to a prediction closure is a model,
/// so callers can write e.g.
/// `|p: &[f64]| { let (a, b) = (p[0], p[1]); move |x: f64| a * x + b }`.
impl<F, P> ParametricModel for F
where
    F: Fn(&[f64]) -> P,
    P: Fn(f64) -> f64,
{
    type Predictor = P;

    fn parameterize(&self, params: &[f64]) -> P {
        self(params)
    }
}
