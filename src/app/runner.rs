use crate::adapters::LocalStorage;
use crate::app::pipelines::{AnalysisPipeline, DashboardPipeline, GeneratePipeline, ReportPipeline};
use crate::config::toml_config::TrendsConfig;
use crate::core::TrendEngine;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    Dashboard,
    Analyze,
    Report,
}

impl Stage {
    /// `all` 的執行順序：先有資料，再分析，報告需要分析結果
    pub const FULL_SEQUENCE: [Stage; 4] = [
        Stage::Generate,
        Stage::Analyze,
        Stage::Report,
        Stage::Dashboard,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "generate",
            Stage::Dashboard => "dashboard",
            Stage::Analyze => "analyze",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// 以 `output.root` 為根目錄執行單一階段，回傳主要輸出路徑
pub async fn run_stage(stage: Stage, config: &TrendsConfig, monitor: bool) -> Result<String> {
    let storage = LocalStorage::new(config.output.root.as_str());
    let config = config.clone();

    match stage {
        Stage::Generate => {
            TrendEngine::new_with_monitoring(GeneratePipeline::new(storage, config), monitor)
                .run()
                .await
        }
        Stage::Dashboard => {
            TrendEngine::new_with_monitoring(DashboardPipeline::new(storage, config), monitor)
                .run()
                .await
        }
        Stage::Analyze => {
            TrendEngine::new_with_monitoring(AnalysisPipeline::new(storage, config), monitor)
                .run()
                .await
        }
        Stage::Report => {
            TrendEngine::new_with_monitoring(ReportPipeline::new(storage, config), monitor)
                .run()
                .await
        }
    }
}

/// 依序執行，遇到第一個錯誤即停止
pub async fn run_stages(
    stages: &[Stage],
    config: &TrendsConfig,
    monitor: bool,
) -> Result<Vec<String>> {
    let mut outputs = Vec::with_capacity(stages.len());
    for stage in stages {
        tracing::debug!("Running stage {}", stage);
        outputs.push(run_stage(*stage, config, monitor).await?);
    }
    Ok(outputs)
}
