use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// 依序執行 pipeline 的 extract → transform → load
pub struct TrendEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> TrendEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        let started = Instant::now();
        tracing::info!("🚀 Starting {} pipeline", name);

        tracing::debug!("[{}] extract", name);
        let extracted = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        tracing::debug!("[{}] transform", name);
        let transformed = self.pipeline.transform(extracted).await?;
        self.monitor.log_stats("Transform");

        tracing::debug!("[{}] load", name);
        let output_path = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!(
            "✅ {} pipeline finished in {:?}: {}",
            name,
            started.elapsed(),
            output_path
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TrendsError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        type Extracted = Vec<f64>;
        type Transformed = f64;

        fn name(&self) -> &str {
            "counting"
        }

        async fn extract(&self) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 2.0, 3.0])
        }

        async fn transform(&self, data: Vec<f64>) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(TrendsError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(crate::domain::statistics::mean(&data)?)
        }

        async fn load(&self, result: f64) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("mean={}", result))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = TrendEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });
        let out = engine.run().await.unwrap();
        assert_eq!(out, "mean=2");
        assert_eq!(engine.pipeline().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_engine_stops_on_error() {
        let engine = TrendEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: true,
        });
        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline().calls.load(Ordering::SeqCst), 2);
    }
}
