use std::time::Duration;

use super::*;


pub(crate) fn assert_nearly_eq(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {actual} to be within {tolerance} of {expected}"
    );
}

/// Noiseless samples of `y = slope * x + intercept`.
fn line_data() -> Dataset {
    Dataset::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 3.0, 5.0, 7.0])
}

fn line_model() -> impl Fn(&[f64]) -> Box<dyn Fn(f64) -> f64> {
    |p: &[f64]| {
        let (slope, intercept) = (p[0], p[1]);
        Box::new(move |x: f64| slope * x + intercept)
    }
}

#[test]
fn fits_noiseless_line() {
    // True parameters are [2, 1].
    let line = |p: &[f64]| {
        let (slope, intercept) = (p[0], p[1]);
        move |x: f64| slope * x + intercept
    };
    let outcome = fit(&line_data(), &line, Options::new([0.0, 0.0])).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 2.0, 1e-4);
    assert_nearly_eq(outcome.parameter_values[1], 1.0, 1e-4);
    assert!(outcome.parameter_error < 1e-6);
    assert!(outcome.iterations < 100);
}

#[test]
fn recovers_exponential_decay() {
    let xs: Vec<f64> = (0..20).map(|i| f64::from(i) * 0.5).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * (-0.5 * x).exp()).collect();
    let data = Dataset::new(xs, ys);
    let model = |p: &[f64]| {
        let (amplitude, rate) = (p[0], p[1]);
        move |x: f64| amplitude * (-rate * x).exp()
    };

    let options = Options::new([1.5, 0.3]).with_max_iterations(200);
    let outcome = fit(&data, &model, options).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 2.0, 1e-2);
    assert_nearly_eq(outcome.parameter_values[1], 0.5, 1e-2);
    assert!(outcome.parameter_error < 1e-4);
}

/// A model implemented as a concrete type rather than a closure.
struct Polynomial;

impl ParametricModel for Polynomial {
    type Predictor = Box<dyn Fn(f64) -> f64>;

    fn parameterize(&self, params: &[f64]) -> Self::Predictor {
        let coefficients = params.to_vec();
        Box::new(move |x| {
            coefficients
                .iter()
                .rev()
                .fold(0.0, |acc, &c| acc * x + c)
        })
    }
}

#[test]
fn fits_concrete_model_type() {
    // y = 0.5 - x + 2x², which is linear in its coefficients.
    let xs: Vec<f64> = (0..7).map(f64::from).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| 0.5 - x + 2.0 * x * x).collect();
    let data = Dataset::new(xs, ys);

    let outcome = fit(&data, &Polynomial, Options::new([0.0, 0.0, 0.0])).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 0.5, 1e-3);
    assert_nearly_eq(outcome.parameter_values[1], -1.0, 1e-3);
    assert_nearly_eq(outcome.parameter_values[2], 2.0, 1e-3);
}

#[test]
fn is_deterministic() {
    let xs: Vec<f64> = (0..20).map(|i| f64::from(i) * 0.5).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * (-0.5 * x).exp()).collect();
    let data = Dataset::new(xs, ys);
    let model = |p: &[f64]| {
        let (amplitude, rate) = (p[0], p[1]);
        move |x: f64| amplitude * (-rate * x).exp()
    };

    let first = fit(&data, &model, Options::new([1.0, 0.1])).unwrap();
    let second = fit(&data, &model, Options::new([1.0, 0.1])).unwrap();
    // Bit-identical, not merely close: there is no randomness anywhere.
    assert_eq!(first, second);
}

#[test]
fn central_difference_converges() {
    let options = Options::new([0.0, 0.0]).with_central_difference(true);
    let outcome = fit(&line_data(), &line_model(), options).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 2.0, 1e-4);
    assert_nearly_eq(outcome.parameter_values[1], 1.0, 1e-4);
}

#[test]
fn weighted_fit_converges() {
    // Uniformly rescaling the weights moves the cost, not the optimum.
    let options =
        Options::new([0.0, 0.0]).with_weights(Weights::PerPoint(vec![0.5, 0.5, 0.5, 0.5]));
    let outcome = fit(&line_data(), &line_model(), options).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 2.0, 1e-4);
    assert_nearly_eq(outcome.parameter_values[1], 1.0, 1e-4);
}

#[test]
fn per_parameter_gradient_steps_converge() {
    let options = Options::new([0.0, 0.0])
        .with_gradient_difference(GradientStep::PerParameter(vec![0.01, 0.1]));
    let outcome = fit(&line_data(), &line_model(), options).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 2.0, 1e-4);
    assert_nearly_eq(outcome.parameter_values[1], 1.0, 1e-4);
}

#[test]
fn respects_bounds() {
    // The unconstrained best slope is 2; cap it at 1.5.
    let options = Options::new([0.0, 0.0])
        .with_min_values(vec![-10.0, -10.0])
        .with_max_values(vec![1.5, 10.0]);
    let outcome = fit(&line_data(), &line_model(), options).unwrap();
    assert!(outcome.parameter_values[0] <= 1.5);
    assert!(outcome.parameter_values[0] >= -10.0);
    assert!(outcome.parameter_values[1] <= 10.0);
    assert!(outcome.parameter_values[1] >= -10.0);
}

#[test]
fn already_converged_start_returns_immediately() {
    let outcome = fit(&line_data(), &line_model(), Options::new([2.0, 1.0])).unwrap();
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.parameter_values, vec![2.0, 1.0]);
    assert!(outcome.parameter_error <= 1e-7);
}

#[test]
fn divergence_returns_best_so_far() {
    // This model is only finite at the starting parameters, so the first
    // update produces a NaN cost. The fit should stop silently and hand
    // back the initial point rather than raise an error.
    let data = line_data();
    let model = |p: &[f64]| {
        let p0 = p[0];
        move |x: f64| {
            if p0.abs() > f64::EPSILON {
                f64::NAN
            } else {
                x
            }
        }
    };

    let outcome = fit(&data, &model, Options::new([0.0])).unwrap();
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.parameter_values, vec![0.0]);
    // Residuals against y = x are [1, 2, 3, 4].
    assert_nearly_eq(outcome.parameter_error, 30.0, 1e-9);
}

#[test]
fn timeout_raises() {
    let xs: Vec<f64> = (0..20).map(|i| f64::from(i) * 0.5).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * (-0.5 * x).exp()).collect();
    let data = Dataset::new(xs, ys);
    let model = |p: &[f64]| {
        let (amplitude, rate) = (p[0], p[1]);
        move |x: f64| amplitude * (-rate * x).exp()
    };

    let options = Options::new([1.0, 0.1]).with_timeout(Duration::ZERO);
    let error = fit(&data, &model, options).unwrap_err();
    assert!(matches!(error, Error::Timeout { .. }));
}

#[test]
fn observer_sees_every_iteration() {
    let mut seen = Vec::new();
    let outcome = fit_with_observer(
        &line_data(),
        &line_model(),
        Options::new([0.0, 0.0]),
        |stats| {
            seen.push((stats.iteration, stats.error, stats.optimal_error, stats.damping));
        },
    )
    .unwrap();

    assert_eq!(seen.len(), outcome.iterations);
    for (index, &(iteration, _, _, damping)) in seen.iter().enumerate() {
        assert_eq!(iteration, index + 1);
        assert!((1e-7..=1e7).contains(&damping));
    }
    // The best error never regresses.
    for pair in seen.windows(2) {
        assert!(pair[1].2 <= pair[0].2);
    }
}

#[test]
fn rejects_non_positive_damping() {
    let options = Options::new([0.0, 0.0]).with_damping(-1.0);
    let error = fit(&line_data(), &line_model(), options).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        config_error,
        ConfigError::NonPositiveDamping { damping: -1.0 }
    );
    assert!(config_error.to_string().contains("damping"));
}

#[test]
fn rejects_single_point_series() {
    let data = Dataset::new(vec![1.0], vec![1.0]);
    let error = fit(&data, &line_model(), Options::new([0.0, 0.0])).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(config_error, ConfigError::NotEnoughPoints { points: 1 });
}

#[test]
fn rejects_x_y_length_mismatch() {
    let data = Dataset::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0]);
    let error = fit(&data, &line_model(), Options::new([0.0, 0.0])).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        config_error,
        ConfigError::RaggedSeries {
            expected: 3,
            actual: 4
        }
    );
}

#[test]
fn rejects_series_count_mismatch() {
    let data = Dataset::with_series(
        vec![vec![1.0, 2.0, 3.0]],
        vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
    );
    let error = fit(&data, &line_model(), Options::new([0.0, 0.0])).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(config_error, ConfigError::SeriesCountMismatch { x: 1, y: 2 });
}

#[test]
fn rejects_empty_initial_values() {
    let error = fit(&line_data(), &line_model(), Options::new(Vec::new())).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(config_error, ConfigError::MissingInitialValues);
}

#[test]
fn rejects_misized_bounds() {
    let options = Options::new([0.0, 0.0]).with_min_values(vec![0.0]);
    let error = fit(&line_data(), &line_model(), options).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        config_error,
        ConfigError::BoundsSize {
            min: 1,
            max: 2,
            parameters: 2
        }
    );
}

#[test]
fn rejects_misized_gradient_steps() {
    let options =
        Options::new([0.0, 0.0]).with_gradient_difference(GradientStep::PerParameter(vec![0.1]));
    let error = fit(&line_data(), &line_model(), options).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        config_error,
        ConfigError::GradientStepSize {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn rejects_misized_weights() {
    let options = Options::new([0.0, 0.0]).with_weights(Weights::PerPoint(vec![1.0, 1.0, 1.0]));
    let error = fit(&line_data(), &line_model(), options).unwrap_err();
    let Error::Config(config_error) = error else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        config_error,
        ConfigError::WeightsSize {
            expected: 4,
            actual: 3
        }
    );
}

#[test]
fn multi_series_data_fits() {
    // Two coordinate series share the parameters: the model must explain
    // y = 3x + 2 at both of each point's coordinates.
    let x0: Vec<f64> = (0..6).map(f64::from).collect();
    let x1: Vec<f64> = (0..6).map(|i| f64::from(i) + 0.25).collect();
    let y0: Vec<f64> = x0.iter().map(|&x| 3.0 * x + 2.0).collect();
    let y1: Vec<f64> = x1.iter().map(|&x| 3.0 * x + 2.0).collect();
    let data = Dataset::with_series(vec![x0, x1], vec![y0, y1]);

    let outcome = fit(&data, &line_model(), Options::new([0.0, 0.0])).unwrap();
    assert_nearly_eq(outcome.parameter_values[0], 3.0, 1e-4);
    assert_nearly_eq(outcome.parameter_values[1], 2.0, 1e-4);
}

#[test]
fn zero_gradient_step_freezes_parameter() {
    // A zero finite-difference step means "no sensitivity information";
    // that parameter must stay exactly where it started.
    let options = Options::new([0.0, 0.0])
        .with_gradient_difference(GradientStep::PerParameter(vec![0.1, 0.0]));
    let outcome = fit(&line_data(), &line_model(), options).unwrap();
    assert!(outcome.parameter_values[1].abs() < f64::EPSILON);
}
