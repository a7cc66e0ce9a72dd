//! 基礎敘述統計：平均數、幾何平均、變異數、相關係數與最小平方法迴歸。
//!
//! 所有退化輸入（空序列、零變異、非正值）都回傳 `StatsError`，不會默默產生 NaN 或無限大。

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("input sequence is empty")]
    EmptyInput,

    #[error("sequences have different lengths ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("series '{series}' has zero variance")]
    ZeroVariance { series: &'static str },

    #[error("value {value} is outside the domain of {operation}")]
    Domain {
        operation: &'static str,
        value: f64,
    },

    #[error("rolling window must be at least 1")]
    InvalidWindow,
}

pub type StatsResult<T> = std::result::Result<T, StatsError>;

/// 線性迴歸結果 `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// NaN 與無限大一律視為定義域錯誤
fn ensure_finite(operation: &'static str, data: &[f64]) -> StatsResult<()> {
    match data.iter().find(|v| !v.is_finite()) {
        Some(&bad) => Err(StatsError::Domain {
            operation,
            value: bad,
        }),
        None => Ok(()),
    }
}

pub fn mean(data: &[f64]) -> StatsResult<f64> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    ensure_finite("mean", data)?;
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// 以 exp(mean(ln x)) 計算，避免連乘溢位
pub fn geometric_mean(data: &[f64]) -> StatsResult<f64> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    if let Some(&bad) = data.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(StatsError::Domain {
            operation: "geometric_mean",
            value: bad,
        });
    }
    let log_sum: f64 = data.iter().map(|v| v.ln()).sum();
    Ok((log_sum / data.len() as f64).exp())
}

/// 母體變異數（除以 n）
pub fn variance(data: &[f64]) -> StatsResult<f64> {
    let m = mean(data)?;
    Ok(data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> StatsResult<f64> {
    Ok(variance(data)?.sqrt())
}

fn check_pair(x: &[f64], y: &[f64]) -> StatsResult<()> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    ensure_finite("correlation", x)?;
    ensure_finite("correlation", y)?;
    Ok(())
}

/// 全部相同，或離均差平方和相對於資料量級只剩捨入誤差
fn has_zero_variance(data: &[f64], centered_sq: f64) -> bool {
    if data.iter().all(|v| *v == data[0]) {
        return true;
    }
    let scale: f64 = data.iter().map(|v| v * v).sum();
    centered_sq <= f64::EPSILON * scale
}

/// 回傳 (Σ(x-x̄)(y-ȳ), Σ(x-x̄)², Σ(y-ȳ)², x̄, ȳ)
fn centered_sums(x: &[f64], y: &[f64]) -> StatsResult<(f64, f64, f64, f64, f64)> {
    check_pair(x, y)?;
    let xm = mean(x)?;
    let ym = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - xm;
        let dy = b - ym;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Ok((sxy, sxx, syy, xm, ym))
}

/// Pearson 相關係數
pub fn correlation(x: &[f64], y: &[f64]) -> StatsResult<f64> {
    let (sxy, sxx, syy, _, _) = centered_sums(x, y)?;
    if has_zero_variance(x, sxx) {
        return Err(StatsError::ZeroVariance { series: "x" });
    }
    if has_zero_variance(y, syy) {
        return Err(StatsError::ZeroVariance { series: "y" });
    }
    // 浮點誤差可能讓 |r| 略大於 1
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// 普通最小平方法 (OLS)
pub fn linear_regression(x: &[f64], y: &[f64]) -> StatsResult<LinearFit> {
    let (sxy, sxx, _, xm, ym) = centered_sums(x, y)?;
    if has_zero_variance(x, sxx) {
        return Err(StatsError::ZeroVariance { series: "x" });
    }
    let slope = sxy / sxx;
    Ok(LinearFit {
        intercept: ym - slope * xm,
        slope,
    })
}

/// 尾端移動平均，前段資料不足時使用現有筆數 (min_periods = 1)
pub fn rolling_mean(data: &[f64], window: usize) -> StatsResult<Vec<f64>> {
    if window == 0 {
        return Err(StatsError::InvalidWindow);
    }
    // 每個視窗各自加總，避免累積誤差
    (0..data.len())
        .map(|i| mean(&data[(i + 1).saturating_sub(window)..=i]))
        .collect()
}

/// 兩兩相關矩陣；零變異的組合為 `None`
pub fn correlation_matrix(columns: &[&[f64]]) -> StatsResult<Vec<Vec<Option<f64>>>> {
    let k = columns.len();
    let mut matrix = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let cell = match correlation(columns[i], columns[j]) {
                Ok(r) => Some(if i == j { 1.0 } else { r }),
                Err(StatsError::ZeroVariance { .. }) => None,
                Err(e) => return Err(e),
            };
            matrix[i][j] = cell;
            matrix[j][i] = cell;
        }
    }
    Ok(matrix)
}

/// (最後一筆 - 第一筆) / 第一筆 × 100
pub fn growth_rate_pct(data: &[f64]) -> StatsResult<f64> {
    let (first, last) = match (data.first(), data.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(StatsError::EmptyInput),
    };
    if first == 0.0 {
        return Err(StatsError::Domain {
            operation: "growth_rate_pct",
            value: first,
        });
    }
    Ok((last - first) / first * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_mean_empty_fails() {
        assert_eq!(mean(&[]), Err(StatsError::EmptyInput));
        assert_eq!(variance(&[]), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_constant_sequence() {
        let data = vec![4.2; 7];
        assert!((mean(&data).unwrap() - 4.2).abs() < EPS);
        assert!(variance(&data).unwrap().abs() < EPS);
        assert!((geometric_mean(&data).unwrap() - 4.2).abs() < EPS);
    }

    #[test]
    fn test_population_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data).unwrap() - 5.0).abs() < EPS);
        assert!((variance(&data).unwrap() - 4.0).abs() < EPS);
        assert!((std_dev(&data).unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_geometric_mean() {
        assert!((geometric_mean(&[1.0, 4.0, 16.0]).unwrap() - 4.0).abs() < 1e-9);
        assert!(matches!(
            geometric_mean(&[1.0, 0.0, 3.0]),
            Err(StatsError::Domain { value, .. }) if value == 0.0
        ));
        assert!(matches!(
            geometric_mean(&[2.0, -1.0]),
            Err(StatsError::Domain { .. })
        ));
        assert_eq!(geometric_mean(&[]), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_self_correlation_is_one() {
        let x = [1.0, 3.0, 2.0, 8.0, 5.5];
        assert!((correlation(&x, &x).unwrap() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_correlation_is_symmetric() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 7.0];
        let xy = correlation(&x, &y).unwrap();
        let yx = correlation(&y, &x).unwrap();
        assert_eq!(xy, yx);
        assert!(xy > 0.0 && xy < 1.0);
    }

    #[test]
    fn test_correlation_negative() {
        let x = [1.0, 2.0, 3.0];
        let y = [6.0, 4.0, 2.0];
        assert!((correlation(&x, &y).unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn test_correlation_degenerate_inputs() {
        assert_eq!(
            correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::ZeroVariance { series: "x" })
        );
        assert_eq!(
            correlation(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]),
            Err(StatsError::ZeroVariance { series: "y" })
        );
        assert_eq!(
            correlation(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { left: 2, right: 1 })
        );
        assert_eq!(correlation(&[], &[]), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_regression_recovers_exact_coefficients() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| -3.25 + 1.75 * v).collect();
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.intercept + 3.25).abs() < 1e-9);
        assert!((fit.slope - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_regression_on_years() {
        let x = [2020.0, 2021.0, 2022.0];
        let y = [21.0, 21.5, 22.3];
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 0.65).abs() < 1e-9);
        assert!((fit.intercept - (21.6 - 0.65 * 2021.0)).abs() < 1e-6);

        let residuals: Vec<f64> = x
            .iter()
            .zip(y.iter())
            .map(|(xi, yi)| yi - fit.predict(*xi))
            .collect();
        assert!(residuals.iter().sum::<f64>().abs() < 1e-6);
        // 預測值 20.95 / 21.60 / 22.25，最大殘差在 2021
        let worst = residuals.iter().fold(0.0f64, |m, r| m.max(r.abs()));
        assert!((worst - 0.10).abs() < 1e-6);
        assert!((residuals[1] + 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_near_constant_float_series_is_zero_variance() {
        assert_eq!(
            correlation(&[0.1; 3], &[1.0, 2.0, 3.0]),
            Err(StatsError::ZeroVariance { series: "x" })
        );
        assert_eq!(
            linear_regression(&[0.1; 3], &[1.0, 2.0, 3.0]),
            Err(StatsError::ZeroVariance { series: "x" })
        );
        let ramp: Vec<f64> = (1..=7).map(|i| i as f64).collect();
        assert_eq!(
            correlation(&ramp, &[0.7; 7]),
            Err(StatsError::ZeroVariance { series: "y" })
        );
        // 數值很大但有真實變化時仍可計算
        assert!(correlation(&[2020.0, 2021.0, 2022.0], &[1.0, 2.0, 4.0]).is_ok());
    }

    #[test]
    fn test_non_finite_input_is_domain_error() {
        assert!(matches!(
            mean(&[1.0, f64::NAN]),
            Err(StatsError::Domain { operation: "mean", .. })
        ));
        assert!(matches!(
            correlation(&[1.0, 2.0, 3.0], &[1.0, f64::INFINITY, 2.0]),
            Err(StatsError::Domain { .. })
        ));
        assert!(matches!(
            linear_regression(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(StatsError::Domain { .. })
        ));
    }

    #[test]
    fn test_regression_constant_x() {
        assert_eq!(
            linear_regression(&[3.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::ZeroVariance { series: "x" })
        );
    }

    #[test]
    fn test_rolling_mean_min_periods() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(out, vec![1.0, 1.5, 2.0, 3.0, 4.0]);

        let identity = rolling_mean(&[7.0, 8.0], 1).unwrap();
        assert_eq!(identity, vec![7.0, 8.0]);

        // 長序列上 window = 1 仍逐值相同
        let prices: Vec<f64> = (0..200).map(|i| 4.0 + (i % 17) as f64 * 0.01 + 0.64).collect();
        assert_eq!(rolling_mean(&prices, 1).unwrap(), prices);

        assert_eq!(rolling_mean(&[1.0], 0), Err(StatsError::InvalidWindow));
        assert!(rolling_mean(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_correlation_matrix() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [1.0, 1.0, 1.0, 1.0];
        let m = correlation_matrix(&[&a, &b, &c]).unwrap();
        assert_eq!(m[0][0], Some(1.0));
        assert!((m[0][1].unwrap() - 1.0).abs() < EPS);
        assert_eq!(m[0][1], m[1][0]);
        assert_eq!(m[2][2], None);
        assert_eq!(m[0][2], None);
    }

    #[test]
    fn test_growth_rate() {
        assert!((growth_rate_pct(&[20.0, 21.0, 25.0]).unwrap() - 25.0).abs() < EPS);
        assert_eq!(growth_rate_pct(&[]), Err(StatsError::EmptyInput));
        assert!(matches!(
            growth_rate_pct(&[0.0, 1.0]),
            Err(StatsError::Domain { .. })
        ));
    }
}
