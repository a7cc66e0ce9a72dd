use crate::domain::model::{EconomicDataset, Indicator};
use crate::domain::statistics::{self, LinearFit, StatsError};
use crate::domain::synthetic::next_month_end;
use crate::utils::error::{Result, TrendsError};
use crate::utils::validation::{validate_range, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 滾動表只顯示最後幾列
pub const ROLLING_TAIL_ROWS: usize = 12;

/// 使用者在儀表板側欄的選擇
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    pub year_min: i32,
    pub year_max: i32,
    pub indicators: Vec<Indicator>,
    pub rolling_window: usize,
    pub show_correlation: bool,
    pub projection_months: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            year_min: 2023,
            year_max: 2025,
            indicators: vec![Indicator::Gdp, Indicator::Inflation, Indicator::Sp500],
            rolling_window: 3,
            show_correlation: true,
            projection_months: 6,
        }
    }
}

impl Validate for DashboardOptions {
    fn validate(&self) -> Result<()> {
        if self.year_min > self.year_max {
            return Err(TrendsError::InvalidConfigValueError {
                field: "dashboard.year_min".to_string(),
                value: self.year_min.to_string(),
                reason: format!("must not be after year_max ({})", self.year_max),
            });
        }
        if self.indicators.is_empty() {
            return Err(TrendsError::InvalidConfigValueError {
                field: "dashboard.indicators".to_string(),
                value: String::new(),
                reason: "select at least one indicator".to_string(),
            });
        }
        validate_range("dashboard.rolling_window", self.rolling_window, 1, 12)?;
        validate_range("dashboard.projection_months", self.projection_months, 0, 24)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub avg_gdp: f64,
    pub avg_inflation: f64,
    pub avg_unemployment: f64,
    pub avg_interest_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingTable {
    pub indicators: Vec<Indicator>,
    pub rows: Vec<RollingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub indicators: Vec<Indicator>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Indicator, b: Indicator) -> Option<f64> {
        let i = self.indicators.iter().position(|x| *x == a)?;
        let j = self.indicators.iter().position(|x| *x == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub date: NaiveDate,
    pub month_index: usize,
    pub gdp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fit: LinearFit,
    pub points: Vec<ProjectedPoint>,
    pub last_actual: f64,
    pub projected_end: f64,
    pub pct_change: f64,
}

/// 儀表板的所有計算結果，交給渲染層使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub options: DashboardOptions,
    pub metrics: HeadlineMetrics,
    pub rolling: RollingTable,
    pub correlation: Option<CorrelationMatrix>,
    pub projection: Option<Projection>,
    pub filtered: EconomicDataset,
}

pub fn build_view(dataset: &EconomicDataset, options: &DashboardOptions) -> Result<DashboardView> {
    options.validate()?;

    let years = dataset.years();
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        if options.year_min < *first || options.year_max > *last {
            return Err(TrendsError::InvalidConfigValueError {
                field: "dashboard.year_range".to_string(),
                value: format!("{}-{}", options.year_min, options.year_max),
                reason: format!("dataset covers {}-{}", first, last),
            });
        }
    }

    let filtered = dataset.filter_years(options.year_min, options.year_max);
    if filtered.is_empty() {
        return Err(StatsError::EmptyInput.into());
    }
    tracing::debug!(
        "Dashboard range {}-{}: {} rows",
        options.year_min,
        options.year_max,
        filtered.len()
    );

    let metrics = HeadlineMetrics {
        avg_gdp: statistics::mean(&filtered.column(Indicator::Gdp))?,
        avg_inflation: statistics::mean(&filtered.column(Indicator::Inflation))?,
        avg_unemployment: statistics::mean(&filtered.column(Indicator::Unemployment))?,
        avg_interest_rate: statistics::mean(&filtered.column(Indicator::InterestRate))?,
    };

    let rolling = rolling_table(&filtered, &options.indicators, options.rolling_window)?;

    let correlation = if options.show_correlation {
        Some(correlation_for(&filtered)?)
    } else {
        None
    };

    let projection = if options.projection_months > 0 {
        Some(project_gdp(&filtered, options.projection_months)?)
    } else {
        None
    };

    Ok(DashboardView {
        options: options.clone(),
        metrics,
        rolling,
        correlation,
        projection,
        filtered,
    })
}

fn rolling_table(
    filtered: &EconomicDataset,
    indicators: &[Indicator],
    window: usize,
) -> Result<RollingTable> {
    let series = indicators
        .iter()
        .map(|ind| statistics::rolling_mean(&filtered.column(*ind), window))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let start = filtered.len().saturating_sub(ROLLING_TAIL_ROWS);
    let rows = (start..filtered.len())
        .map(|i| RollingRow {
            date: filtered.records[i].date,
            values: series.iter().map(|s| s[i]).collect(),
        })
        .collect();

    Ok(RollingTable {
        indicators: indicators.to_vec(),
        rows,
    })
}

/// 固定使用全部五個指標
pub fn correlation_for(filtered: &EconomicDataset) -> Result<CorrelationMatrix> {
    let columns: Vec<Vec<f64>> = Indicator::ALL
        .iter()
        .map(|ind| filtered.column(*ind))
        .collect();
    let refs: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
    Ok(CorrelationMatrix {
        indicators: Indicator::ALL.to_vec(),
        values: statistics::correlation_matrix(&refs)?,
    })
}

/// 以月序號為 X 對 GDP 做 OLS，往後推估 `months` 個月
pub fn project_gdp(filtered: &EconomicDataset, months: usize) -> Result<Projection> {
    let gdp = filtered.column(Indicator::Gdp);
    let x: Vec<f64> = (0..gdp.len()).map(|i| i as f64).collect();
    let fit = statistics::linear_regression(&x, &gdp)?;

    let last = filtered.records.last().ok_or(StatsError::EmptyInput)?;
    let mut date = last.date;
    let mut points = Vec::with_capacity(months);
    for step in 0..months {
        date = next_month_end(date).ok_or_else(|| TrendsError::ProcessingError {
            message: format!("cannot advance past {}", date),
        })?;
        let month_index = gdp.len() + step;
        points.push(ProjectedPoint {
            date,
            month_index,
            gdp: fit.predict(month_index as f64),
        });
    }

    let last_actual = last.gdp_trillion_usd;
    let projected_end = points.last().map(|p| p.gdp).unwrap_or(last_actual);
    let pct_change = statistics::growth_rate_pct(&[last_actual, projected_end])?;

    Ok(Projection {
        fit,
        points,
        last_actual,
        projected_end,
        pct_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthetic::generate_monthly;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset() -> EconomicDataset {
        generate_monthly(&mut StdRng::seed_from_u64(42), 2020, 2025).unwrap()
    }

    #[test]
    fn test_default_view() {
        let ds = dataset();
        let view = build_view(&ds, &DashboardOptions::default()).unwrap();

        assert_eq!(view.filtered.len(), 36);
        assert_eq!(view.rolling.rows.len(), ROLLING_TAIL_ROWS);
        assert_eq!(view.rolling.indicators.len(), 3);
        assert_eq!(
            view.rolling.rows.last().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );

        let corr = view.correlation.as_ref().unwrap();
        assert_eq!(corr.values.len(), 5);
        assert_eq!(corr.get(Indicator::Gdp, Indicator::Gdp), Some(1.0));

        let proj = view.projection.as_ref().unwrap();
        assert_eq!(proj.points.len(), 6);
        assert_eq!(proj.points[0].month_index, 36);
        assert_eq!(
            proj.points[0].date,
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        assert_eq!(
            proj.points[5].date,
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
        );
        // 合成 GDP 呈上升趨勢
        assert!(proj.fit.slope > 0.0);
    }

    #[test]
    fn test_headline_metrics_match_mean() {
        let ds = dataset();
        let view = build_view(&ds, &DashboardOptions::default()).unwrap();
        let expected = statistics::mean(&view.filtered.column(Indicator::Inflation)).unwrap();
        assert_eq!(view.metrics.avg_inflation, expected);
    }

    #[test]
    fn test_rolling_window_one_is_identity() {
        let ds = dataset();
        let options = DashboardOptions {
            rolling_window: 1,
            indicators: vec![Indicator::Unemployment],
            ..DashboardOptions::default()
        };
        let view = build_view(&ds, &options).unwrap();
        let raw = view.filtered.column(Indicator::Unemployment);
        let tail = &raw[raw.len() - ROLLING_TAIL_ROWS..];
        let rolled: Vec<f64> = view.rolling.rows.iter().map(|r| r.values[0]).collect();
        assert_eq!(rolled, tail);
    }

    #[test]
    fn test_optional_sections_disabled() {
        let ds = dataset();
        let options = DashboardOptions {
            show_correlation: false,
            projection_months: 0,
            ..DashboardOptions::default()
        };
        let view = build_view(&ds, &options).unwrap();
        assert!(view.correlation.is_none());
        assert!(view.projection.is_none());
    }

    #[test]
    fn test_projection_percent_change() {
        let ds = dataset();
        let filtered = ds.filter_years(2024, 2024);
        let proj = project_gdp(&filtered, 12).unwrap();
        let expected = (proj.projected_end - proj.last_actual) / proj.last_actual * 100.0;
        assert!((proj.pct_change - expected).abs() < 1e-9);
        assert_eq!(proj.projected_end, proj.points[11].gdp);
    }

    #[test]
    fn test_invalid_options() {
        let ds = dataset();
        let bad_window = DashboardOptions {
            rolling_window: 13,
            ..DashboardOptions::default()
        };
        assert!(build_view(&ds, &bad_window).is_err());

        let bad_range = DashboardOptions {
            year_min: 2019,
            ..DashboardOptions::default()
        };
        assert!(build_view(&ds, &bad_range).is_err());

        let no_indicators = DashboardOptions {
            indicators: vec![],
            ..DashboardOptions::default()
        };
        assert!(build_view(&ds, &no_indicators).is_err());
    }

    #[test]
    fn test_empty_dataset_is_typed_failure() {
        let err = build_view(&EconomicDataset::default(), &DashboardOptions::default()).unwrap_err();
        assert!(matches!(err, TrendsError::StatsError(StatsError::EmptyInput)));
    }
}
