pub mod analysis;
pub mod dashboard;
pub mod generate;
pub mod report;

pub use analysis::AnalysisPipeline;
pub use dashboard::DashboardPipeline;
pub use generate::GeneratePipeline;
pub use report::ReportPipeline;

use crate::domain::ports::Storage;
use crate::utils::archive::{self, Artifact};
use crate::utils::error::Result;

/// 寫出所有產出檔；`archive_enabled` 為 true 時另外打包成 results/<name>_artifacts.zip
pub(crate) async fn write_artifacts<S: Storage>(
    storage: &S,
    name: &str,
    artifacts: &[Artifact],
    archive_enabled: bool,
) -> Result<()> {
    for artifact in artifacts {
        storage.write_file(&artifact.path, &artifact.data).await?;
        tracing::info!("📁 Saved {}", artifact.path);
    }

    if archive_enabled {
        let zip_data = archive::bundle(artifacts)?;
        let zip_path = archive_path(name);
        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        storage.write_file(&zip_path, &zip_data).await?;
        tracing::info!("📦 Archived {} files into {}", artifacts.len(), zip_path);
    }
    Ok(())
}

pub fn archive_path(name: &str) -> String {
    format!("results/{}_artifacts.zip", name)
}
