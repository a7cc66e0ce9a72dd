pub mod pipelines;
pub mod runner;

pub use pipelines::{AnalysisPipeline, DashboardPipeline, GeneratePipeline, ReportPipeline};
pub use runner::{run_stage, run_stages, Stage};
