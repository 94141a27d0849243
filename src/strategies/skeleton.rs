//! Skeleton strategy: entry-point files, upgraded to a `full`
//! alternate when small enough to read in one shot.

use super::common::{
    codemap_alternate, effective_limits, full_alternate, path_allowed, read_file_capped,
    reference_alternate,
};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::backend::StructureScope;
use crate::config::{SKELETON_DIRS, SKELETON_PATTERNS};
use crate::error::{Warning, WarningKind};
use crate::model::{Representation, SliceCandidate};
use crate::scoring::score_candidate;
use async_trait::async_trait;
use std::collections::HashMap;

/// Above this size a skeleton file stays a codemap rather than inlining the
/// whole thing.
const FULL_INLINE_TOKEN_CAP: usize = 2000;

pub struct SkeletonStrategy;

fn is_skeleton_path(path: &str) -> bool {
    let basename = path.rsplit('/').next().unwrap_or(path).to_lowercase();
    let pattern_hit = SKELETON_PATTERNS
        .iter()
        .any(|p| basename.starts_with(&p.to_lowercase()));
    if !pattern_hit {
        return false;
    }
    let lower_path = path.to_lowercase();
    lower_path
        .split('/')
        .any(|segment| SKELETON_DIRS.contains(&segment))
}

#[async_trait]
impl Strategy for SkeletonStrategy {
    fn name(&self) -> &'static str {
        "skeleton"
    }

    fn default_weight(&self) -> f64 {
        0.90
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        let files = match ctx.backend.list_files(ctx.repo_root).await {
            Ok(f) => f,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("skeleton: list_files failed: {err}"),
                ));
                return outcome;
            }
        };

        let limits = effective_limits(ctx, "skeleton");
        let weight = ctx.config.weight("skeleton");

        let mut selected: Vec<String> = files
            .into_iter()
            .filter(|p| path_allowed(p, ctx.request))
            .filter(|p| is_skeleton_path(p))
            .collect();
        selected.sort();
        selected.truncate(limits.max_items);

        if selected.is_empty() {
            return outcome;
        }

        let structures = match ctx
            .backend
            .get_structure(&selected, ctx.repo_root, StructureScope::Full)
            .await
        {
            Ok(s) => s,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("skeleton: get_structure failed: {err}"),
                ));
                return outcome;
            }
        };
        let by_path: HashMap<&str, _> = structures.iter().map(|c| (c.path.as_str(), c)).collect();

        for path in &selected {
            let Some(cm) = by_path.get(path.as_str()) else {
                continue;
            };
            let codemap_alt = codemap_alternate(cm);
            let mut representation = Representation::Codemap;
            let mut payload = codemap_alt.payload.clone();
            let mut tokens = codemap_alt.tokens;
            let mut alternates = Vec::new();

            if let Some(content) = read_file_capped(
                ctx.repo_root,
                path,
                ctx.config.token_estimator.max_file_bytes,
            )
            .await
            {
                let full_alt = full_alternate(&content);
                if full_alt.tokens <= FULL_INLINE_TOKEN_CAP {
                    representation = Representation::Full;
                    payload = full_alt.payload.clone();
                    tokens = full_alt.tokens;
                }
                alternates.push(full_alt);
            }
            alternates.push(codemap_alt);
            alternates.push(reference_alternate(path));

            let score = score_candidate(weight, 1, tokens, ctx.budget_tokens);
            outcome.candidates.push(SliceCandidate::new(
                "skeleton",
                path,
                representation,
                payload,
                tokens,
                score,
                "entry-point skeleton file",
                "skeleton",
                alternates,
            ));
            ctx.matched_files.insert(path.clone());
        }

        outcome
    }
}
