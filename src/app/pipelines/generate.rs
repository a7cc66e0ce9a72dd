use crate::app::pipelines::write_artifacts;
use crate::config::toml_config::TrendsConfig;
use crate::domain::model::{AnnualObservation, EconomicDataset};
use crate::domain::ports::{Pipeline, Storage};
use crate::domain::synthetic::generate_monthly;
use crate::utils::archive::Artifact;
use crate::utils::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 產生合成月資料，輸出月 CSV 與年度平均 CSV
pub struct GeneratePipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) config: TrendsConfig,
}

impl<S: Storage> GeneratePipeline<S> {
    pub fn new(storage: S, config: TrendsConfig) -> Self {
        Self { storage, config }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    pub monthly_csv: String,
    pub annual_csv: String,
    pub rows: usize,
    pub years: usize,
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for GeneratePipeline<S> {
    type Extracted = EconomicDataset;
    type Transformed = GeneratedFiles;

    fn name(&self) -> &str {
        "generate"
    }

    async fn extract(&self) -> Result<EconomicDataset> {
        let dataset = &self.config.dataset;
        tracing::info!(
            "🎲 Generating monthly data {}-{} (seed {})",
            dataset.start_year,
            dataset.end_year,
            dataset.seed
        );
        let mut rng = StdRng::seed_from_u64(dataset.seed);
        generate_monthly(&mut rng, dataset.start_year, dataset.end_year)
    }

    async fn transform(&self, data: EconomicDataset) -> Result<GeneratedFiles> {
        let annual = data.annual_means();
        tracing::debug!("{} monthly rows -> {} yearly rows", data.len(), annual.len());

        Ok(GeneratedFiles {
            monthly_csv: data.to_csv()?,
            annual_csv: AnnualObservation::to_csv(&annual)?,
            rows: data.len(),
            years: annual.len(),
        })
    }

    async fn load(&self, result: GeneratedFiles) -> Result<String> {
        let dataset = &self.config.dataset;
        let artifacts = vec![
            Artifact::new(dataset.monthly_csv.clone(), result.monthly_csv),
            Artifact::new(dataset.annual_csv.clone(), result.annual_csv),
        ];
        write_artifacts(
            &self.storage,
            self.name(),
            &artifacts,
            self.config.output.archive,
        )
        .await?;

        tracing::info!(
            "✅ Dataset ready: {} months, {} years",
            result.rows,
            result.years
        );
        Ok(dataset.monthly_csv.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::archive_path;
    use crate::app::pipelines::test_support::MockStorage;
    use crate::core::TrendEngine;
    use crate::domain::analysis::parse_annual_csv;

    #[tokio::test]
    async fn test_generate_writes_both_csv_files() {
        let storage = MockStorage::new();
        let engine = TrendEngine::new(GeneratePipeline::new(
            storage.clone(),
            TrendsConfig::default(),
        ));

        let output = engine.run().await.unwrap();
        assert_eq!(output, "data/us_economic_monthly.csv");

        let monthly = String::from_utf8(storage.get_file(&output).await.unwrap()).unwrap();
        let mut lines = monthly.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,GDP_trillion_USD,Inflation_pct,Unemployment_pct,InterestRate_pct,SP500_index,Year,Month"
        );
        assert_eq!(lines.count(), 72);

        let annual = storage.get_file("data/dummy_data_usa.csv").await.unwrap();
        let rows = parse_annual_csv(&annual).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[5].year, 2025);

        assert!(storage.get_file(&archive_path("generate")).await.is_none());
    }

    #[tokio::test]
    async fn test_same_seed_same_output() {
        let first = MockStorage::new();
        let second = MockStorage::new();
        for storage in [&first, &second] {
            TrendEngine::new(GeneratePipeline::new(storage.clone(), TrendsConfig::default()))
                .run()
                .await
                .unwrap();
        }
        assert_eq!(
            first.get_file("data/us_economic_monthly.csv").await,
            second.get_file("data/us_economic_monthly.csv").await
        );
    }

    #[tokio::test]
    async fn test_archive_enabled() {
        let storage = MockStorage::new();
        let mut config = TrendsConfig::default();
        config.output.archive = true;
        TrendEngine::new(GeneratePipeline::new(storage.clone(), config))
            .run()
            .await
            .unwrap();
        assert!(storage.get_file(&archive_path("generate")).await.is_some());
    }

    #[tokio::test]
    async fn test_invalid_year_range() {
        let mut config = TrendsConfig::default();
        config.dataset.start_year = 2026;
        let pipeline = GeneratePipeline::new(MockStorage::new(), config);
        assert!(pipeline.extract().await.is_err());
    }
}
