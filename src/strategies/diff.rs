//! Diff strategy: full candidates for every file `git diff` reports
//! changed, staged or not.

use super::common::{effective_limits, full_alternate, path_allowed, read_file_capped, reference_alternate};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::error::{Warning, WarningKind};
use crate::model::{Representation, SliceCandidate};
use crate::procutil::get_git_diff_paths;
use crate::scoring::score_candidate;
use async_trait::async_trait;

pub struct DiffStrategy;

#[async_trait]
impl Strategy for DiffStrategy {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn default_weight(&self) -> f64 {
        0.60
    }

    fn default_budget_cap(&self) -> Option<f64> {
        Some(0.10)
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        let limits = effective_limits(ctx, "diff");
        let weight = ctx.config.weight("diff");

        let mut paths: Vec<String> = get_git_diff_paths(ctx.repo_root)
            .await
            .into_iter()
            .filter(|p| path_allowed(p, ctx.request))
            .collect();
        paths.sort();
        paths.truncate(limits.max_items);

        if paths.is_empty() {
            // Silently skip outside a git repo ("missing git →
            // diff skipped"); warn only when a repo exists but is clean.
            if ctx.repo_root.join(".git").exists() {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    "diff: no pending changes detected",
                ));
            }
            return outcome;
        }

        for path in paths {
            let Some(content) = read_file_capped(
                ctx.repo_root,
                &path,
                ctx.config.token_estimator.max_file_bytes,
            )
            .await
            else {
                continue;
            };
            let full_alt = full_alternate(&content);
            let score = score_candidate(weight, 1, full_alt.tokens, ctx.budget_tokens);
            outcome.candidates.push(SliceCandidate::new(
                "diff",
                &path,
                Representation::Full,
                full_alt.payload.clone(),
                full_alt.tokens,
                score,
                "modified in the working tree",
                "diff",
                vec![reference_alternate(&path)],
            ));
        }

        outcome
    }
}
