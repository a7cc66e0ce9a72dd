use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 儀表板與報告使用的五個總經指標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Gdp,
    Inflation,
    Unemployment,
    InterestRate,
    Sp500,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::Gdp,
        Indicator::Inflation,
        Indicator::Unemployment,
        Indicator::InterestRate,
        Indicator::Sp500,
    ];

    /// CSV 欄位名稱
    pub fn column_name(&self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP_trillion_USD",
            Indicator::Inflation => "Inflation_pct",
            Indicator::Unemployment => "Unemployment_pct",
            Indicator::InterestRate => "InterestRate_pct",
            Indicator::Sp500 => "SP500_index",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP (Trillion USD)",
            Indicator::Inflation => "Inflation (%)",
            Indicator::Unemployment => "Unemployment (%)",
            Indicator::InterestRate => "Interest Rate (%)",
            Indicator::Sp500 => "S&P 500 Index",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP",
            Indicator::Inflation => "Inflation",
            Indicator::Unemployment => "Unemployment",
            Indicator::InterestRate => "Interest Rate",
            Indicator::Sp500 => "S&P 500",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "gdp" | "gdp_trillion_usd" => Ok(Indicator::Gdp),
            "inflation" | "inflation_pct" => Ok(Indicator::Inflation),
            "unemployment" | "unemployment_pct" => Ok(Indicator::Unemployment),
            "interest_rate" | "interestrate" | "interestrate_pct" => Ok(Indicator::InterestRate),
            "sp500" | "s&p500" | "s&p_500" | "sp500_index" => Ok(Indicator::Sp500),
            _ => Err(format!(
                "unknown indicator '{}' (expected one of gdp, inflation, unemployment, interest_rate, sp500)",
                s
            )),
        }
    }
}

/// 單月觀測值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicRecord {
    pub date: NaiveDate,
    pub gdp_trillion_usd: f64,
    pub inflation_pct: f64,
    pub unemployment_pct: f64,
    pub interest_rate_pct: f64,
    pub sp500_index: f64,
}

impl EconomicRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month_label(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn value(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Gdp => self.gdp_trillion_usd,
            Indicator::Inflation => self.inflation_pct,
            Indicator::Unemployment => self.unemployment_pct,
            Indicator::InterestRate => self.interest_rate_pct,
            Indicator::Sp500 => self.sp500_index,
        }
    }
}

/// 匯出 CSV 的列格式
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "GDP_trillion_USD")]
    gdp: f64,
    #[serde(rename = "Inflation_pct")]
    inflation: f64,
    #[serde(rename = "Unemployment_pct")]
    unemployment: f64,
    #[serde(rename = "InterestRate_pct")]
    interest_rate: f64,
    #[serde(rename = "SP500_index")]
    sp500: f64,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: &'a str,
}

/// 依時間排序的月資料集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicDataset {
    pub records: Vec<EconomicRecord>,
}

impl EconomicDataset {
    pub fn new(records: Vec<EconomicRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 資料集中出現的年份（遞增、不重複）
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year()).collect();
        years.dedup();
        years
    }

    /// 保留 min..=max 年份內的資料
    pub fn filter_years(&self, min: i32, max: i32) -> EconomicDataset {
        EconomicDataset::new(
            self.records
                .iter()
                .filter(|r| (min..=max).contains(&r.year()))
                .cloned()
                .collect(),
        )
    }

    pub fn column(&self, indicator: Indicator) -> Vec<f64> {
        self.records.iter().map(|r| r.value(indicator)).collect()
    }

    /// 每年各指標的平均，作為年度分析的輸入
    pub fn annual_means(&self) -> Vec<AnnualObservation> {
        self.years()
            .into_iter()
            .filter_map(|year| {
                let rows: Vec<&EconomicRecord> =
                    self.records.iter().filter(|r| r.year() == year).collect();
                if rows.is_empty() {
                    return None;
                }
                let avg = |indicator: Indicator| {
                    let sum: f64 = rows.iter().map(|r| r.value(indicator)).sum();
                    round_to(sum / rows.len() as f64, 2)
                };
                Some(AnnualObservation {
                    year,
                    gdp: avg(Indicator::Gdp),
                    inflation: avg(Indicator::Inflation),
                    unemployment: avg(Indicator::Unemployment),
                    interest_rate: avg(Indicator::InterestRate),
                })
            })
            .collect()
    }

    pub fn to_csv(&self) -> crate::utils::error::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &self.records {
            let month = record.month_label();
            writer.serialize(RecordRow {
                date: record.date,
                gdp: record.gdp_trillion_usd,
                inflation: record.inflation_pct,
                unemployment: record.unemployment_pct,
                interest_rate: record.interest_rate_pct,
                sp500: record.sp500_index,
                year: record.year(),
                month: &month,
            })?;
        }
        csv_into_string(writer)
    }
}

/// 年度觀測值：`Year,GDP,Inflation,Unemployment,InterestRate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualObservation {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "GDP")]
    pub gdp: f64,
    #[serde(rename = "Inflation")]
    pub inflation: f64,
    #[serde(rename = "Unemployment")]
    pub unemployment: f64,
    #[serde(rename = "InterestRate")]
    pub interest_rate: f64,
}

impl AnnualObservation {
    pub fn to_csv(rows: &[AnnualObservation]) -> crate::utils::error::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        csv_into_string(writer)
    }
}

fn csv_into_string(writer: csv::Writer<Vec<u8>>) -> crate::utils::error::Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::utils::error::TrendsError::ProcessingError {
            message: format!("CSV flush failed: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| crate::utils::error::TrendsError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, gdp: f64) -> EconomicRecord {
        EconomicRecord {
            date: NaiveDate::from_ymd_opt(y, m, 28).unwrap(),
            gdp_trillion_usd: gdp,
            inflation_pct: 2.0,
            unemployment_pct: 5.0,
            interest_rate_pct: 1.0,
            sp500_index: 3000.0,
        }
    }

    #[test]
    fn test_indicator_parsing() {
        assert_eq!("gdp".parse::<Indicator>().unwrap(), Indicator::Gdp);
        assert_eq!(
            "InterestRate_pct".parse::<Indicator>().unwrap(),
            Indicator::InterestRate
        );
        assert_eq!("interest-rate".parse::<Indicator>().unwrap(), Indicator::InterestRate);
        assert_eq!("SP500_index".parse::<Indicator>().unwrap(), Indicator::Sp500);
        assert!("bitcoin".parse::<Indicator>().is_err());
    }

    #[test]
    fn test_filter_and_years() {
        let ds = EconomicDataset::new(vec![
            record(2020, 1, 21.0),
            record(2021, 1, 22.0),
            record(2022, 1, 23.0),
        ]);
        assert_eq!(ds.years(), vec![2020, 2021, 2022]);
        let filtered = ds.filter_years(2021, 2022);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.column(Indicator::Gdp), vec![22.0, 23.0]);
        assert!(ds.filter_years(2030, 2031).is_empty());
    }

    #[test]
    fn test_annual_means() {
        let ds = EconomicDataset::new(vec![
            record(2020, 1, 21.0),
            record(2020, 2, 22.0),
            record(2021, 1, 23.0),
        ]);
        let annual = ds.annual_means();
        assert_eq!(annual.len(), 2);
        assert_eq!(annual[0].year, 2020);
        assert_eq!(annual[0].gdp, 21.5);
        assert_eq!(annual[1].gdp, 23.0);
    }

    #[test]
    fn test_dataset_csv_header() {
        let ds = EconomicDataset::new(vec![record(2020, 1, 21.0)]);
        let csv = ds.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,GDP_trillion_USD,Inflation_pct,Unemployment_pct,InterestRate_pct,SP500_index,Year,Month"
        );
        assert!(lines.next().unwrap().starts_with("2020-01-28,21.0,"));
    }
}
