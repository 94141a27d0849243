//! Config strategy: presence-checks the fixed `CONFIG_FILES` list and
//! inlines each hit, truncating to a first-200-line snippet past the token
//! cap. Named `config_strategy` to avoid clashing with the crate's own
//! [`crate::config`] module.

use super::common::{effective_limits, full_alternate, path_allowed, read_file_capped, reference_alternate};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::config::CONFIG_FILES;
use crate::model::{Representation, SliceCandidate};
use crate::scoring::score_candidate;
use crate::tokens::estimate_tokens;
use async_trait::async_trait;

const SNIPPET_LINE_CAP: usize = 200;

pub struct ConfigStrategy;

#[async_trait]
impl Strategy for ConfigStrategy {
    fn name(&self) -> &'static str {
        "config"
    }

    fn default_weight(&self) -> f64 {
        0.45
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        let limits = effective_limits(ctx, "config");
        let weight = ctx.config.weight("config");
        let max_bytes = ctx.config.token_estimator.max_file_bytes;

        for name in CONFIG_FILES {
            if !path_allowed(name, ctx.request) {
                continue;
            }
            let Some(content) = read_file_capped(ctx.repo_root, name, max_bytes).await else {
                continue;
            };

            let full_alt = full_alternate(&content);
            let (representation, payload, tokens) = if full_alt.tokens <= limits.max_tokens {
                (Representation::Full, full_alt.payload.clone(), full_alt.tokens)
            } else {
                let snippet: String = content
                    .lines()
                    .take(SNIPPET_LINE_CAP)
                    .collect::<Vec<_>>()
                    .join("\n");
                let snippet_tokens = estimate_tokens(&snippet);
                (Representation::Snippet, snippet, snippet_tokens)
            };

            let mut alternates = vec![full_alt];
            alternates.push(reference_alternate(name));

            let score = score_candidate(weight, 1, tokens, ctx.budget_tokens);
            outcome.candidates.push(SliceCandidate::new(
                "config",
                name,
                representation,
                payload,
                tokens,
                score,
                "recognized configuration file",
                "config",
                alternates,
            ));
        }

        outcome
    }
}
