//! Strategy plugins: seven named strategies plus an optional forest
//! sidecar, each exposing `name`, `defaultWeight`, an optional
//! `defaultBudgetCap`, `isAvailable`, and `execute`.

mod ast;
mod common;
mod config_strategy;
mod diff;
mod forest;
mod graph_strategy;
mod keyword;
mod skeleton;
mod symbols;

pub use ast::AstStrategy;
pub use config_strategy::ConfigStrategy;
pub use diff::DiffStrategy;
pub use forest::ForestStrategy;
pub use graph_strategy::GraphStrategy;
pub use keyword::KeywordStrategy;
pub use skeleton::SkeletonStrategy;
pub use symbols::SymbolsStrategy;

use crate::backend::RepoBackend;
use crate::config::SlicerConfig;
use crate::error::Warning;
use crate::model::{Sidecar, SliceCandidate, SliceRequest};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Everything a strategy needs, including the cross-strategy mutable seed
/// set: strategies run sequentially specifically so this can stay
/// unsynchronized.
pub struct StrategyContext<'a> {
    pub request: &'a SliceRequest,
    pub backend: Arc<dyn RepoBackend>,
    pub repo_root: &'a Path,
    pub keywords: &'a [String],
    pub config: &'a SlicerConfig,
    pub budget_tokens: usize,
    pub matched_files: &'a mut HashSet<String>,
}

#[derive(Default)]
pub struct StrategyOutcome {
    pub candidates: Vec<SliceCandidate>,
    pub warnings: Vec<Warning>,
    pub sidecar: Option<Sidecar>,
}

#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn default_weight(&self) -> f64;
    fn default_budget_cap(&self) -> Option<f64> {
        None
    }
    async fn is_available(&self, ctx: &StrategyContext<'_>) -> bool;
    /// Must never panic: failures are reported as warnings in the returned
    /// outcome.
    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome;
}

/// Fixed execution order so seed propagation is well-defined.
pub const STRATEGY_ORDER: &[&str] = &[
    "skeleton", "keyword", "ast", "symbols", "graph", "config", "diff", "forest",
];
