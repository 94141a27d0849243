//! Strategy registry: name → factory, fixed execution order, and
//! availability/allow-list resolution.

use crate::error::{Warning, WarningKind};
use crate::strategies::{
    AstStrategy, ConfigStrategy, DiffStrategy, ForestStrategy, GraphStrategy, KeywordStrategy,
    SkeletonStrategy, Strategy, StrategyContext, STRATEGY_ORDER,
};
use std::sync::Arc;

pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            strategies: vec![
                Arc::new(SkeletonStrategy),
                Arc::new(KeywordStrategy),
                Arc::new(AstStrategy),
                Arc::new(crate::strategies::SymbolsStrategy),
                Arc::new(GraphStrategy),
                Arc::new(ConfigStrategy),
                Arc::new(DiffStrategy),
                Arc::new(ForestStrategy),
            ],
        }
    }
}

impl StrategyRegistry {
    /// Resolves the strategies to run for this request: filtered by the
    /// request's allow-list (if any), checked for availability in parallel,
    /// and returned in the fixed execution order. Unavailable or
    /// unknown requested strategies produce a warning rather than an error.
    pub async fn resolve(
        &self,
        allow_list: Option<&[String]>,
        ctx: &StrategyContext<'_>,
    ) -> (Vec<Arc<dyn Strategy>>, Vec<Warning>) {
        let mut warnings = Vec::new();

        let candidates: Vec<Arc<dyn Strategy>> = match allow_list {
            None => self.strategies.clone(),
            Some(names) => {
                let mut picked = Vec::new();
                for name in names {
                    match self.strategies.iter().find(|s| s.name() == name) {
                        Some(s) => picked.push(s.clone()),
                        None => warnings.push(Warning::new(
                            WarningKind::StrategyFailure,
                            format!("unknown strategy requested: {name}"),
                        )),
                    }
                }
                picked
            }
        };

        let availability = futures::future::join_all(
            candidates.iter().map(|s| s.is_available(ctx)),
        )
        .await;

        let mut available: Vec<Arc<dyn Strategy>> = Vec::new();
        for (strategy, is_available) in candidates.into_iter().zip(availability) {
            if is_available {
                available.push(strategy);
            } else if strategy.name() != "forest" {
                warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("strategy unavailable, dropped: {}", strategy.name()),
                ));
            }
            // forest's absence is routine (no `forest` executable on PATH)
            // and not surfaced as a warning.
        }

        available.sort_by_key(|s| {
            STRATEGY_ORDER
                .iter()
                .position(|name| *name == s.name())
                .unwrap_or(usize::MAX)
        });

        (available, warnings)
    }
}
