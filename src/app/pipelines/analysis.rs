use crate::app::pipelines::write_artifacts;
use crate::config::toml_config::TrendsConfig;
use crate::domain::analysis::{analyze, parse_annual_csv, AnalysisSummary};
use crate::domain::model::AnnualObservation;
use crate::domain::ports::{Pipeline, Storage};
use crate::render::charts;
use crate::utils::archive::Artifact;
use crate::utils::error::Result;

/// 年度 CSV → 成長率、相關係數、GDP 迴歸、趨勢圖
pub struct AnalysisPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) config: TrendsConfig,
}

impl<S: Storage> AnalysisPipeline<S> {
    pub fn new(storage: S, config: TrendsConfig) -> Self {
        Self { storage, config }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub summary: AnalysisSummary,
    pub chart_svg: String,
    pub summary_json: String,
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for AnalysisPipeline<S> {
    type Extracted = Vec<AnnualObservation>;
    type Transformed = AnalysisOutput;

    fn name(&self) -> &str {
        "analysis"
    }

    async fn extract(&self) -> Result<Vec<AnnualObservation>> {
        let input = &self.config.analysis.input;
        tracing::info!("📥 Reading yearly data from {}", input);
        let data = self.storage.read_file(input).await?;
        let rows = parse_annual_csv(&data)?;
        tracing::debug!("{} yearly rows parsed", rows.len());
        Ok(rows)
    }

    async fn transform(&self, data: Vec<AnnualObservation>) -> Result<AnalysisOutput> {
        let summary = analyze(&data)?;

        let text = summary.render_text();
        println!("{}", text);
        for line in text.lines() {
            tracing::debug!("{}", line);
        }

        let chart_svg = charts::gdp_trend_svg(&summary)?;
        let summary_json = serde_json::to_string_pretty(&summary)?;

        Ok(AnalysisOutput {
            summary,
            chart_svg,
            summary_json,
        })
    }

    async fn load(&self, result: AnalysisOutput) -> Result<String> {
        let analysis = &self.config.analysis;
        let artifacts = vec![
            Artifact::new(analysis.chart.clone(), result.chart_svg),
            Artifact::new(analysis.summary.clone(), result.summary_json),
        ];
        write_artifacts(
            &self.storage,
            self.name(),
            &artifacts,
            self.config.output.archive,
        )
        .await?;

        tracing::info!("📉 Trend: {}", result.summary.equation());
        Ok(analysis.chart.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::test_support::MockStorage;
    use crate::core::TrendEngine;
    use crate::utils::error::TrendsError;

    const ANNUAL: &str = "Year,GDP,Inflation,Unemployment,InterestRate
2020,21.0,1.2,8.1,0.25
2021,21.5,4.7,5.4,0.25
2022,22.3,8.0,3.6,1.75
2023,23.0,4.1,3.6,5.00
";

    #[tokio::test]
    async fn test_analysis_writes_chart_and_summary() {
        let storage = MockStorage::new();
        storage
            .put_file("data/dummy_data_usa.csv", ANNUAL.as_bytes())
            .await;

        let engine = TrendEngine::new(AnalysisPipeline::new(
            storage.clone(),
            TrendsConfig::default(),
        ));
        let output = engine.run().await.unwrap();
        assert_eq!(output, "results/us_gdp_trend.svg");

        let svg = String::from_utf8(storage.get_file(&output).await.unwrap()).unwrap();
        assert!(svg.contains("<svg"));

        let json = storage
            .get_file("results/us_gdp_analysis.json")
            .await
            .unwrap();
        let summary: AnalysisSummary = serde_json::from_slice(&json).unwrap();
        assert_eq!(summary.observations.len(), 4);
        assert_eq!(summary.predicted_gdp.len(), 4);
        assert!(summary.regression.slope > 0.0);
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let engine = TrendEngine::new(AnalysisPipeline::new(
            MockStorage::new(),
            TrendsConfig::default(),
        ));
        assert!(matches!(
            engine.run().await,
            Err(TrendsError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_single_row_rejected() {
        let storage = MockStorage::new();
        storage
            .put_file(
                "data/dummy_data_usa.csv",
                b"Year,GDP,Inflation,Unemployment,InterestRate\n2020,21.0,1.2,8.1,0.25\n",
            )
            .await;
        let engine = TrendEngine::new(AnalysisPipeline::new(storage, TrendsConfig::default()));
        assert!(matches!(
            engine.run().await,
            Err(TrendsError::ProcessingError { .. })
        ));
    }
}
