//! Keyword strategy: the backend's own search, turned into snippet
//! candidates with per-file hit counts.

use super::common::{effective_limits, path_allowed, reference_alternate};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::backend::SearchOptions;
use crate::error::{Warning, WarningKind};
use crate::model::{Representation, SliceCandidate};
use crate::scoring::score_candidate;
use crate::tokens::estimate_tokens;
use async_trait::async_trait;
use std::collections::HashMap;

const TOP_KEYWORDS: usize = 10;

pub struct KeywordStrategy;

#[async_trait]
impl Strategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn default_weight(&self) -> f64 {
        0.80
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        if ctx.keywords.is_empty() {
            outcome.warnings.push(Warning::new(
                WarningKind::StrategyFailure,
                "keyword: no keywords extracted from task",
            ));
            return outcome;
        }

        let limits = effective_limits(ctx, "keyword");
        let weight = ctx.config.weight("keyword");
        let keywords: Vec<String> = ctx.keywords.iter().take(TOP_KEYWORDS).cloned().collect();

        let opts = SearchOptions {
            context_lines: ctx.config.keyword_context_lines,
            max_results: limits.max_items.saturating_mul(4).min(500),
        };

        let matches = match ctx.backend.search(&keywords, ctx.repo_root, opts).await {
            Ok(m) => m,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("keyword: search failed: {err}"),
                ));
                return outcome;
            }
        };

        let mut hits: HashMap<String, (usize, String)> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for m in matches {
            if !path_allowed(&m.path, ctx.request) {
                continue;
            }
            match hits.get_mut(&m.path) {
                Some(entry) => entry.0 += 1,
                None => {
                    order.push(m.path.clone());
                    hits.insert(m.path.clone(), (1, m.snippet));
                }
            }
        }
        order.truncate(limits.max_items);

        for path in order {
            let (hit_count, snippet) = hits.remove(&path).expect("path was just inserted above");
            let tokens = estimate_tokens(&snippet);
            let score = score_candidate(weight, hit_count, tokens, ctx.budget_tokens);
            outcome.candidates.push(SliceCandidate::new(
                "keyword",
                &path,
                Representation::Snippet,
                snippet,
                tokens,
                score,
                format!("{hit_count} keyword hit(s)"),
                "keyword",
                vec![reference_alternate(&path)],
            ));
            ctx.matched_files.insert(path);
        }

        outcome
    }
}
