//! Pluggable multi-strategy context slicing engine: assembles bounded,
//! token-budgeted repository context slices for downstream LLM consumers.
//!
//! The pipeline is `plan_slice` (run strategies, gather candidates) →
//! `select` (budget-constrained knapsack) → `package` (xml/markdown/json).
//! `slice` wires all three together for callers who just want an answer.

pub mod backend;
pub mod codemap;
pub mod config;
pub mod error;
pub mod fs_scan;
pub mod graph;
pub mod keywords;
pub mod model;
pub mod packager;
pub mod pathfilter;
pub mod planner;
pub mod procutil;
pub mod registry;
pub mod scoring;
pub mod selector;
pub mod strategies;
pub mod tokens;
pub mod xml_builder;

pub use backend::{FsRepoBackend, InMemoryRepoBackend, RepoBackend};
pub use config::SlicerConfig;
pub use error::{SlicerError, Warning, WarningKind};
pub use model::{SliceCandidate, SlicePlan, SliceRequest, SliceResult};
pub use packager::{package, OutputFormat};
pub use planner::plan_slice;
pub use registry::StrategyRegistry;
pub use selector::select;

use std::sync::Arc;

/// Runs the full pipeline end to end: validate, plan, select, package. The
/// only place `SlicerError::InvalidRequest` can originate — everything
/// downstream degrades to a `Warning` instead of aborting.
pub async fn slice(
    request: &SliceRequest,
    backend: Arc<dyn RepoBackend>,
    config: &SlicerConfig,
    format: OutputFormat,
) -> error::Result<(SliceResult, String)> {
    request.validate().map_err(SlicerError::InvalidRequest)?;

    let registry = StrategyRegistry::default();
    let plan = plan_slice(request, backend, config, &registry).await;
    let result = select(&plan, config);
    let rendered = package(&result, format)?;
    Ok((result, rendered))
}
