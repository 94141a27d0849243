//! AST strategy: re-queries the same keyword search at zero context
//! and surfaces the matches as codemaps rather than snippets.

use super::common::{codemap_alternate, effective_limits, path_allowed, reference_alternate};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::backend::{SearchOptions, StructureScope};
use crate::error::{Warning, WarningKind};
use crate::model::{Representation, SliceCandidate};
use crate::scoring::score_candidate;
use async_trait::async_trait;
use std::collections::HashMap;

const TOP_KEYWORDS: usize = 10;

pub struct AstStrategy;

#[async_trait]
impl Strategy for AstStrategy {
    fn name(&self) -> &'static str {
        "ast"
    }

    fn default_weight(&self) -> f64 {
        0.50
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        if ctx.keywords.is_empty() {
            outcome.warnings.push(Warning::new(
                WarningKind::StrategyFailure,
                "ast: no keywords extracted from task",
            ));
            return outcome;
        }

        let limits = effective_limits(ctx, "ast");
        let weight = ctx.config.weight("ast");
        let keywords: Vec<String> = ctx.keywords.iter().take(TOP_KEYWORDS).cloned().collect();

        let opts = SearchOptions {
            context_lines: 0,
            max_results: limits.max_items.saturating_mul(4).min(500),
        };
        let matches = match ctx.backend.search(&keywords, ctx.repo_root, opts).await {
            Ok(m) => m,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("ast: search failed: {err}"),
                ));
                return outcome;
            }
        };

        let mut hit_counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for m in matches {
            if !path_allowed(&m.path, ctx.request) {
                continue;
            }
            if let Some(count) = hit_counts.get_mut(&m.path) {
                *count += 1;
            } else {
                order.push(m.path.clone());
                hit_counts.insert(m.path, 1);
            }
        }
        order.truncate(limits.max_items);

        if order.is_empty() {
            return outcome;
        }

        let structures = match ctx
            .backend
            .get_structure(&order, ctx.repo_root, StructureScope::Full)
            .await
        {
            Ok(s) => s,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("ast: get_structure failed: {err}"),
                ));
                return outcome;
            }
        };
        let by_path: HashMap<&str, _> = structures.iter().map(|c| (c.path.as_str(), c)).collect();

        for path in &order {
            let Some(cm) = by_path.get(path.as_str()) else {
                continue;
            };
            let codemap_alt = codemap_alternate(cm);
            let hit_count = hit_counts[path];
            let score = score_candidate(weight, hit_count, codemap_alt.tokens, ctx.budget_tokens);
            outcome.candidates.push(SliceCandidate::new(
                "ast",
                path,
                Representation::Codemap,
                codemap_alt.payload.clone(),
                codemap_alt.tokens,
                score,
                format!("{hit_count} keyword hit(s), structural match"),
                "ast",
                vec![reference_alternate(path)],
            ));
        }

        outcome
    }
}
