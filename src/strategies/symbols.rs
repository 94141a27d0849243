//! Symbols strategy: batch-extracts codemaps for files already in the
//! shared seed set; discovers no new paths.

use super::common::{codemap_alternate, effective_limits, path_allowed, reference_alternate};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::backend::StructureScope;
use crate::error::{Warning, WarningKind};
use crate::model::{Representation, SliceCandidate};
use crate::scoring::score_candidate;
use async_trait::async_trait;
use std::collections::HashMap;

pub struct SymbolsStrategy;

#[async_trait]
impl Strategy for SymbolsStrategy {
    fn name(&self) -> &'static str {
        "symbols"
    }

    fn default_weight(&self) -> f64 {
        0.55
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        let limits = effective_limits(ctx, "symbols");
        let weight = ctx.config.weight("symbols");

        let mut paths: Vec<String> = ctx
            .matched_files
            .iter()
            .filter(|p| path_allowed(p, ctx.request))
            .cloned()
            .collect();
        paths.sort();
        paths.truncate(limits.max_items);

        if paths.is_empty() {
            return outcome;
        }

        let structures = match ctx
            .backend
            .get_structure(&paths, ctx.repo_root, StructureScope::Full)
            .await
        {
            Ok(s) => s,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("symbols: get_structure failed: {err}"),
                ));
                return outcome;
            }
        };
        let by_path: HashMap<&str, _> = structures.iter().map(|c| (c.path.as_str(), c)).collect();

        for path in &paths {
            let Some(cm) = by_path.get(path.as_str()) else {
                continue;
            };
            let codemap_alt = codemap_alternate(cm);
            let score = score_candidate(weight, 1, codemap_alt.tokens, ctx.budget_tokens);
            outcome.candidates.push(SliceCandidate::new(
                "symbols",
                path,
                Representation::Codemap,
                codemap_alt.payload.clone(),
                codemap_alt.tokens,
                score,
                "structural outline of a previously matched file",
                "symbols",
                vec![reference_alternate(path)],
            ));
        }

        outcome
    }
}
