use econ_trends::domain::statistics::{
    correlation, geometric_mean, linear_regression, mean, variance, StatsError,
};

const EPS: f64 = 1e-9;

#[test]
fn test_constant_series() {
    let xs = [4.2; 10];
    assert!((mean(&xs).unwrap() - 4.2).abs() < EPS);
    assert!(variance(&xs).unwrap().abs() < EPS);
}

#[test]
fn test_correlation_properties() {
    let x = [1.0, 3.0, 2.0, 5.0, 4.0];
    let y = [2.0, 1.0, 4.0, 3.0, 6.0];

    assert!((correlation(&x, &x).unwrap() - 1.0).abs() < EPS);
    assert!((correlation(&x, &y).unwrap() - correlation(&y, &x).unwrap()).abs() < EPS);

    let r = correlation(&x, &y).unwrap();
    assert!((-1.0..=1.0).contains(&r));

    let negated: Vec<f64> = x.iter().map(|v| -v).collect();
    assert!((correlation(&x, &negated).unwrap() + 1.0).abs() < EPS);
}

#[test]
fn test_regression_recovers_exact_line() {
    let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let y: Vec<f64> = x.iter().map(|v| 3.5 - 0.25 * v).collect();
    let fit = linear_regression(&x, &y).unwrap();
    assert!((fit.intercept - 3.5).abs() < 1e-9);
    assert!((fit.slope + 0.25).abs() < 1e-9);
}

#[test]
fn test_gdp_example() {
    let x = [2020.0, 2021.0, 2022.0];
    let y = [21.0, 21.5, 22.3];
    let fit = linear_regression(&x, &y).unwrap();
    assert!((fit.slope - 0.65).abs() < 1e-6);

    let expected = [20.95, 21.60, 22.25];
    for (xi, want) in x.iter().zip(&expected) {
        assert!((fit.predict(*xi) - want).abs() < 1e-6);
    }
    let residual_sum: f64 = x.iter().zip(&y).map(|(xi, yi)| yi - fit.predict(*xi)).sum();
    assert!(residual_sum.abs() < 1e-6);
}

#[test]
fn test_constant_float_series_has_zero_variance() {
    let ramp: Vec<f64> = (1..=7).map(|i| i as f64).collect();
    assert!(matches!(
        correlation(&[0.7; 7], &ramp),
        Err(StatsError::ZeroVariance { .. })
    ));
    assert!(matches!(
        linear_regression(&[0.1; 3], &[1.0, 2.0, 3.0]),
        Err(StatsError::ZeroVariance { .. })
    ));
}

#[test]
fn test_degenerate_inputs_are_typed_failures() {
    assert_eq!(mean(&[]), Err(StatsError::EmptyInput));
    assert!(matches!(
        geometric_mean(&[1.0, 0.0, 2.0]),
        Err(StatsError::Domain { .. })
    ));
    assert!(matches!(
        correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
        Err(StatsError::ZeroVariance { .. })
    ));
    assert!(matches!(
        linear_regression(&[2.0, 2.0], &[1.0, 5.0]),
        Err(StatsError::ZeroVariance { .. })
    ));
    assert!(matches!(
        correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]),
        Err(StatsError::LengthMismatch { .. })
    ));
}
