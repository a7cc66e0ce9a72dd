//! 合成（虛擬）月度總經資料。
//!
//! 每個指標是「封閉形式趨勢曲線 + 常態雜訊」。亂數產生器由呼叫端傳入，
//! 同一個種子永遠產生同一份資料。

use crate::domain::model::{round_to, EconomicDataset, EconomicRecord};
use crate::utils::error::{Result, TrendsError};
use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_START_YEAR: i32 = 2020;
pub const DEFAULT_END_YEAR: i32 = 2025;

/// 該月最後一天
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d - Duration::days(1))
}

/// 下一個月底
pub fn next_month_end(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    month_end(year, month)
}

fn noise<R: Rng + ?Sized>(rng: &mut R, std_dev: f64, n: usize) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, std_dev).map_err(|e| TrendsError::ProcessingError {
        message: format!("invalid noise distribution (std_dev = {}): {}", std_dev, e),
    })?;
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        values.push(normal.sample(&mut *rng));
    }
    Ok(values)
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// 產生 start_year 一月到 end_year 十二月的月底資料
pub fn generate_monthly<R: Rng + ?Sized>(
    rng: &mut R,
    start_year: i32,
    end_year: i32,
) -> Result<EconomicDataset> {
    if start_year > end_year {
        return Err(TrendsError::InvalidConfigValueError {
            field: "dataset.start_year".to_string(),
            value: start_year.to_string(),
            reason: format!("must not be after end_year ({})", end_year),
        });
    }

    let mut dates = Vec::new();
    for year in start_year..=end_year {
        for month in 1..=12 {
            let date = month_end(year, month).ok_or_else(|| TrendsError::ProcessingError {
                message: format!("no calendar date for {}-{:02}", year, month),
            })?;
            dates.push(date);
        }
    }
    let n = dates.len();
    tracing::debug!("Generating {} synthetic months ({}..={})", n, start_year, end_year);

    // 雜訊抽取順序固定：GDP、通膨、失業率、S&P 500（利率沒有雜訊）
    let gdp_noise = noise(rng, 0.1, n)?;
    let inflation_noise = noise(rng, 0.15, n)?;
    let unemployment_noise = noise(rng, 0.2, n)?;
    let sp_noise = noise(rng, 40.0, n)?;

    let records = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let m = i as f64;

            let gdp_base = 21.0 + (m / 12.0) * 0.8 + (m / 24.0).sin() * 0.3;

            // 2021-2022 通膨高峰，之後緩降
            let inflation_base = 1.8 + 0.8 * ((m - 24.0) / 18.0).tanh() + 0.3 * (m / 6.0).sin();

            let unemployment_base = 8.5 - 4.0 * logistic((m - 6.0) / 12.0);

            let rate_base = 0.25 + 0.05 * ((m - 30.0) / 10.0).tanh() + 0.02 * (m / 10.0).sin();

            let sp_base = 3200.0 + m * 5.0 + (m / 3.0).sin() * 40.0;

            EconomicRecord {
                date,
                gdp_trillion_usd: round_to(gdp_base + gdp_noise[i], 2),
                inflation_pct: round_to((inflation_base + inflation_noise[i]).clamp(0.5, 8.0), 2),
                unemployment_pct: round_to(
                    (unemployment_base + unemployment_noise[i]).clamp(2.5, 12.0),
                    2,
                ),
                interest_rate_pct: round_to((rate_base * 4.0).clamp(0.0, 6.0), 2),
                sp500_index: round_to(sp_base + sp_noise[i], 0),
            }
        })
        .collect();

    Ok(EconomicDataset::new(records))
}
