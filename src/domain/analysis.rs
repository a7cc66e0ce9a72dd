use crate::domain::model::AnnualObservation;
use crate::domain::statistics::{self, LinearFit};
use crate::utils::error::{Result, TrendsError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// 年度資料的統計摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub observations: Vec<AnnualObservation>,
    pub gdp_growth_pct: f64,
    pub corr_inflation_interest: f64,
    pub corr_gdp_unemployment: f64,
    pub regression: LinearFit,
    pub predicted_gdp: Vec<f64>,
}

/// 解析年度 CSV：略過標題列，依欄位位置讀取 Year,GDP,Inflation,Unemployment,InterestRate
pub fn parse_annual_csv(data: &[u8]) -> Result<Vec<AnnualObservation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let field = |col: usize| {
            record.get(col).ok_or_else(|| TrendsError::ValidationError {
                message: format!("row {} has {} columns, expected 5", line + 2, record.len()),
            })
        };

        let raw_year = field(0)?;
        let year: i32 = raw_year.parse().map_err(|_| TrendsError::ValidationError {
            message: format!("row {} column 1: '{}' is not a whole year", line + 2, raw_year),
        })?;

        let mut values = [0.0f64; 4];
        for (offset, slot) in values.iter_mut().enumerate() {
            let col = offset + 1;
            let raw = field(col)?;
            let value: f64 = raw.parse().map_err(|_| TrendsError::ValidationError {
                message: format!("row {} column {}: '{}' is not a number", line + 2, col + 1, raw),
            })?;
            // NaN / inf 會讓後續統計失去意義
            if !value.is_finite() {
                return Err(TrendsError::ValidationError {
                    message: format!("row {} column {}: '{}' is not finite", line + 2, col + 1, raw),
                });
            }
            *slot = value;
        }
        rows.push(AnnualObservation {
            year,
            gdp: values[0],
            inflation: values[1],
            unemployment: values[2],
            interest_rate: values[3],
        });
    }
    Ok(rows)
}

pub fn analyze(observations: &[AnnualObservation]) -> Result<AnalysisSummary> {
    if observations.len() < 2 {
        return Err(TrendsError::ProcessingError {
            message: format!(
                "need at least 2 yearly observations, got {}",
                observations.len()
            ),
        });
    }

    let year: Vec<f64> = observations.iter().map(|o| o.year as f64).collect();
    let gdp: Vec<f64> = observations.iter().map(|o| o.gdp).collect();
    let inflation: Vec<f64> = observations.iter().map(|o| o.inflation).collect();
    let unemployment: Vec<f64> = observations.iter().map(|o| o.unemployment).collect();
    let interest_rate: Vec<f64> = observations.iter().map(|o| o.interest_rate).collect();

    let regression = statistics::linear_regression(&year, &gdp)?;
    let predicted_gdp = year.iter().map(|x| regression.predict(*x)).collect();

    Ok(AnalysisSummary {
        observations: observations.to_vec(),
        gdp_growth_pct: statistics::growth_rate_pct(&gdp)?,
        corr_inflation_interest: statistics::correlation(&inflation, &interest_rate)?,
        corr_gdp_unemployment: statistics::correlation(&gdp, &unemployment)?,
        regression,
        predicted_gdp,
    })
}

impl AnalysisSummary {
    pub fn first_year(&self) -> Option<i32> {
        self.observations.first().map(|o| o.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.observations.last().map(|o| o.year)
    }

    pub fn equation(&self) -> String {
        format!(
            "GDP = {:.2} + {:.2} x Year",
            self.regression.intercept, self.regression.slope
        )
    }

    /// 終端機輸出的摘要區塊
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "===== US Economic Trend Analysis ({}-{}) =====",
            self.first_year().unwrap_or_default(),
            self.last_year().unwrap_or_default()
        );
        let _ = writeln!(out, "Total GDP Growth          : {:.2}%", self.gdp_growth_pct);
        let _ = writeln!(
            out,
            "Correlation (Inflation vs Interest Rate): {:.3}",
            self.corr_inflation_interest
        );
        let _ = writeln!(
            out,
            "Correlation (GDP vs Unemployment)      : {:.3}",
            self.corr_gdp_unemployment
        );
        let _ = writeln!(out, "Linear Regression Equation (GDP)       : {}", self.equation());
        out
    }
}
