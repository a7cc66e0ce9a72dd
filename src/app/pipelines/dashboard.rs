use crate::app::pipelines::write_artifacts;
use crate::config::toml_config::TrendsConfig;
use crate::domain::dashboard::{build_view, DashboardView};
use crate::domain::model::EconomicDataset;
use crate::domain::ports::{Pipeline, Storage};
use crate::domain::synthetic::generate_monthly;
use crate::render::html;
use crate::utils::archive::Artifact;
use crate::utils::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 依儀表板選項產生靜態 HTML 與篩選後的 CSV
pub struct DashboardPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) config: TrendsConfig,
}

impl<S: Storage> DashboardPipeline<S> {
    pub fn new(storage: S, config: TrendsConfig) -> Self {
        Self { storage, config }
    }

    /// HTML 裡的下載連結，與 HTML 放在同一目錄時只需檔名
    fn csv_link(&self) -> String {
        let path = &self.config.dashboard.filtered_csv;
        std::path::Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path)
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDashboard {
    pub view: DashboardView,
    pub html: String,
    pub filtered_csv: String,
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for DashboardPipeline<S> {
    type Extracted = EconomicDataset;
    type Transformed = RenderedDashboard;

    fn name(&self) -> &str {
        "dashboard"
    }

    async fn extract(&self) -> Result<EconomicDataset> {
        let dataset = &self.config.dataset;
        let mut rng = StdRng::seed_from_u64(dataset.seed);
        generate_monthly(&mut rng, dataset.start_year, dataset.end_year)
    }

    async fn transform(&self, data: EconomicDataset) -> Result<RenderedDashboard> {
        let options = &self.config.dashboard.options;
        tracing::info!(
            "📊 Building dashboard for {}-{} ({} indicators, window {})",
            options.year_min,
            options.year_max,
            options.indicators.len(),
            options.rolling_window
        );

        let view = build_view(&data, options)?;
        if let Some(summary) = html::projection_summary(&view) {
            tracing::info!("📈 Projection: {}", summary);
        }

        let html = html::render_dashboard(&view, &self.csv_link(), self.config.dataset.seed)?;
        let filtered_csv = view.filtered.to_csv()?;

        Ok(RenderedDashboard {
            view,
            html,
            filtered_csv,
        })
    }

    async fn load(&self, result: RenderedDashboard) -> Result<String> {
        let dashboard = &self.config.dashboard;
        let artifacts = vec![
            Artifact::new(dashboard.html.clone(), result.html),
            Artifact::new(dashboard.filtered_csv.clone(), result.filtered_csv),
        ];
        write_artifacts(
            &self.storage,
            self.name(),
            &artifacts,
            self.config.output.archive,
        )
        .await?;

        tracing::debug!("{} filtered rows exported", result.view.filtered.len());
        Ok(dashboard.html.clone())
    }
}
