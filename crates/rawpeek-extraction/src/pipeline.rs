use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use rawpeek_core::config::ToolConfig;
use rawpeek_core::error::{Result, StrategyError};
use rawpeek_core::extraction::{
    ExtractionAttempt, ExtractionPipeline, ExtractionStrategy, PipelineResult, RawInput,
};
use rawpeek_core::scratch::ScratchSpace;

use crate::strategies::default_strategies;
use crate::validator::validate;

/// Runs strategies strictly one after another and keeps the first valid output.
///
/// Each strategy gets exactly one try per run; falling through to the next
/// strategy is the only retry. Later strategies are never started once one
/// has succeeded.
pub struct FallbackPipeline {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl FallbackPipeline {
    pub fn new(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(default_strategies(config))
    }

    async fn attempt(
        strategy: &dyn ExtractionStrategy,
        raw: &RawInput,
        scratch: &ScratchSpace,
    ) -> ExtractionAttempt {
        let name = strategy.name();
        let candidate = strategy.candidate_path(raw, scratch);
        let started = Instant::now();

        info!(strategy = name, candidate = %candidate.display(), "Trying extraction strategy");

        let outcome = match strategy.execute(raw, &candidate, scratch).await {
            Ok(()) => Self::read_candidate(strategy, &candidate).await,
            Err(e) => Err(e),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(bytes) => {
                info!(strategy = name, bytes = bytes.len(), elapsed_ms, "Extraction strategy succeeded");
                ExtractionAttempt::succeeded(name, bytes)
            }
            Err(e) => {
                warn!(strategy = name, error = %e, elapsed_ms, "Extraction strategy failed");
                ExtractionAttempt::failed(name, e.to_string())
            }
        }
    }

    async fn read_candidate(
        strategy: &dyn ExtractionStrategy,
        candidate: &Path,
    ) -> std::result::Result<Vec<u8>, StrategyError> {
        // Reasons stay free of scratch paths so identical inputs give identical attempts.
        if !validate(candidate).await {
            warn!(candidate = %candidate.display(), "Candidate missing or empty");
            return Err(StrategyError::EmptyOutput(
                "no usable output: candidate missing or empty".to_string(),
            ));
        }

        let bytes = strategy.collect(candidate).await?;
        if bytes.is_empty() {
            warn!(candidate = %candidate.display(), "Candidate empty when read");
            return Err(StrategyError::EmptyOutput(
                "candidate was empty when read".to_string(),
            ));
        }
        Ok(bytes)
    }
}

#[async_trait]
impl ExtractionPipeline for FallbackPipeline {
    async fn run(&self, raw_path: &Path, scratch: &ScratchSpace) -> Result<PipelineResult> {
        let raw = RawInput::open(raw_path).await?;

        info!(
            raw = %raw.path().display(),
            raw_bytes = raw.size(),
            strategies = self.strategies.len(),
            "Starting preview extraction"
        );

        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let attempt = Self::attempt(strategy.as_ref(), &raw, scratch).await;
            if attempt.succeeded {
                return Ok(PipelineResult::Success {
                    strategy_name: attempt.strategy_name,
                    image_bytes: attempt.produced_bytes.unwrap_or_default(),
                });
            }
            attempts.push(attempt);
        }

        warn!(attempts = attempts.len(), "Every extraction strategy failed");
        Ok(PipelineResult::Failure { attempts })
    }

    fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }
}
