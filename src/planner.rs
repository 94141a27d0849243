//! Planner: runs the resolved strategies in fixed order against a
//! shared seed set and assembles a `SlicePlan`.

use crate::backend::{RepoBackend, TreeOptions};
use crate::config::SlicerConfig;
use crate::error::{Warning, WarningKind};
use crate::keywords::extract_keywords;
use crate::model::{SlicePlan, SliceRequest};
use crate::registry::StrategyRegistry;
use crate::strategies::StrategyContext;
use std::collections::HashSet;
use std::sync::Arc;

pub async fn plan_slice(
    request: &SliceRequest,
    backend: Arc<dyn RepoBackend>,
    config: &SlicerConfig,
    registry: &StrategyRegistry,
) -> SlicePlan {
    tracing::info!(budget_tokens = request.budget_tokens, "planner_start");
    let keywords = extract_keywords(&request.task);
    let mut matched_files: HashSet<String> = HashSet::new();
    let mut plan = SlicePlan {
        budget_tokens: request.budget_tokens,
        max_results: request.max_results,
        warning_threshold: request.warning_threshold(),
        ..SlicePlan::default()
    };

    // A throwaway context is enough to resolve availability: `is_available`
    // implementations don't touch `matched_files`.
    let mut probe_matched_files = matched_files.clone();
    let probe_ctx = StrategyContext {
        request,
        backend: backend.clone(),
        repo_root: &request.repo_root,
        keywords: &keywords,
        config,
        budget_tokens: request.budget_tokens,
        matched_files: &mut probe_matched_files,
    };
    let (strategies, resolve_warnings) = registry
        .resolve(request.strategies.as_deref(), &probe_ctx)
        .await;
    plan.warnings.extend(resolve_warnings);

    for strategy in &strategies {
        let mut ctx = StrategyContext {
            request,
            backend: backend.clone(),
            repo_root: &request.repo_root,
            keywords: &keywords,
            config,
            budget_tokens: request.budget_tokens,
            matched_files: &mut matched_files,
        };
        let outcome = strategy.execute(&mut ctx).await;
        tracing::debug!(
            strategy = strategy.name(),
            candidates = outcome.candidates.len(),
            tokens = outcome.candidates.iter().map(|c| c.tokens).sum::<usize>(),
            "strategy_executed"
        );

        for candidate in outcome.candidates {
            plan.push_candidate(candidate);
        }
        plan.warnings.extend(outcome.warnings);
        if let Some(sidecar) = outcome.sidecar {
            plan.sidecars.push(sidecar);
        }
    }

    if request.include_tree {
        match backend
            .get_tree(&request.repo_root, TreeOptions::default())
            .await
        {
            Ok(tree) => plan.tree = Some((tree.content, tree.tokens)),
            Err(err) => plan.warnings.push(Warning::new(
                WarningKind::StrategyFailure,
                format!("directory tree unavailable: {err}"),
            )),
        }
    }

    let candidate_tokens: usize = plan.candidates.iter().map(|c| c.tokens).sum();
    let sidecar_tokens: usize = plan.sidecars.iter().map(|s| s.tokens).sum();
    let tree_tokens = plan.tree.as_ref().map(|(_, t)| *t).unwrap_or(0);
    plan.total_tokens = candidate_tokens + sidecar_tokens + tree_tokens;

    tracing::info!(
        candidates = plan.candidates.len(),
        total_tokens = plan.total_tokens,
        warnings = plan.warnings.len(),
        "planner_end"
    );
    plan
}
