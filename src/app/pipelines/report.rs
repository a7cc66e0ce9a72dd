use crate::app::pipelines::write_artifacts;
use crate::config::toml_config::TrendsConfig;
use crate::domain::analysis::AnalysisSummary;
use crate::domain::ports::{Pipeline, Storage};
use crate::render::pdf;
use crate::utils::archive::Artifact;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// 讀取最近一次分析結果並排版成 PDF
pub struct ReportPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) config: TrendsConfig,
    generated_on: NaiveDate,
}

impl<S: Storage> ReportPipeline<S> {
    pub fn new(storage: S, config: TrendsConfig) -> Self {
        Self::with_date(storage, config, chrono::Local::now().date_naive())
    }

    /// 固定報告日期
    pub fn with_date(storage: S, config: TrendsConfig, generated_on: NaiveDate) -> Self {
        Self {
            storage,
            config,
            generated_on,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ReportPipeline<S> {
    type Extracted = Option<AnalysisSummary>;
    type Transformed = Vec<u8>;

    fn name(&self) -> &str {
        "report"
    }

    async fn extract(&self) -> Result<Option<AnalysisSummary>> {
        let path = &self.config.analysis.summary;
        if !self.storage.exists(path).await {
            tracing::warn!("⚠️ {} not found, report will omit Figure 1", path);
            return Ok(None);
        }
        let data = self.storage.read_file(path).await?;
        let summary: AnalysisSummary = serde_json::from_slice(&data)?;
        Ok(Some(summary))
    }

    async fn transform(&self, data: Option<AnalysisSummary>) -> Result<Vec<u8>> {
        tracing::info!("📝 Building PDF report ({})", self.generated_on);
        pdf::render_report(&self.config.report.title, self.generated_on, data.as_ref())
    }

    async fn load(&self, result: Vec<u8>) -> Result<String> {
        let output = &self.config.report.output;
        let artifacts = vec![Artifact::new(output.clone(), result)];
        write_artifacts(
            &self.storage,
            self.name(),
            &artifacts,
            self.config.output.archive,
        )
        .await?;
        Ok(output.clone())
    }
}
