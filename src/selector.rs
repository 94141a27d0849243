//! Selector: the knapsack-style budget walk that turns a `SlicePlan`
//! into a `SliceResult`.

use crate::config::SlicerConfig;
use crate::error::{Warning, WarningKind};
use crate::model::{SliceCandidate, SlicePlan, SliceResult};
use std::collections::HashMap;

/// Reference minimum: the token cost of the smallest possible alternate, a
/// bare path reference.
const MIN_ALTERNATE_TOKENS: usize = 20;

fn candidate_sort_key(c: &SliceCandidate) -> (i64, usize, String) {
    // Negate and scale the score so an ascending sort yields descending
    // score, then ascending tokens, then ascending path (CANDIDATE_SORT).
    (-(c.score * 1_000_000.0) as i64, c.tokens, c.path.clone())
}

pub fn select(plan: &SlicePlan, config: &SlicerConfig) -> SliceResult {
    tracing::info!(
        budget_tokens = plan.budget_tokens,
        candidates = plan.candidates.len(),
        "selector_start"
    );
    let budget_tokens = plan.budget_tokens;
    let mut warnings = plan.warnings.clone();

    let mut sidecars = plan.sidecars.clone();
    let tree_tokens = plan.tree.as_ref().map(|(_, t)| *t).unwrap_or(0);
    let mut reserved = tree_tokens + sidecars.iter().map(|s| s.tokens).sum::<usize>();

    if reserved > budget_tokens {
        warnings.push(Warning::new(
            WarningKind::BudgetExceeded,
            "mandatory sidecar/tree tokens exceed the budget; dropping sidecars",
        ));
        while reserved > budget_tokens {
            let Some(dropped) = sidecars.pop() else {
                break;
            };
            reserved -= dropped.tokens;
        }
    }

    if budget_tokens == 0 && reserved == 0 {
        warnings.push(Warning::new(
            WarningKind::BudgetExceeded,
            "budget is zero; no candidates can be selected",
        ));
    }

    let mut remaining = budget_tokens.saturating_sub(reserved);

    // Per-strategy remaining cap, in tokens; lazily initialized from
    // `STRATEGY_BUDGET_CAPS`, defaulting to the full remaining budget for
    // strategies the table doesn't mention.
    let mut strategy_caps: HashMap<String, usize> = HashMap::new();

    let mut sorted: Vec<SliceCandidate> = plan.candidates.clone();
    sorted.sort_by_key(candidate_sort_key);

    let mut selected: Vec<SliceCandidate> = Vec::new();

    for mut candidate in sorted {
        // `max_results == 0` means "no cap" rather than "select nothing".
        let at_result_cap = plan.max_results != 0 && selected.len() >= plan.max_results;
        if at_result_cap || remaining < MIN_ALTERNATE_TOKENS {
            break;
        }

        let cap_remaining = *strategy_caps.entry(candidate.strategy.clone()).or_insert_with(|| {
            match config.budget_cap_fraction(&candidate.strategy) {
                Some(fraction) => (budget_tokens as f64 * fraction).floor() as usize,
                None => remaining,
            }
        });
        let limit = remaining.min(cap_remaining);

        if candidate.tokens > limit {
            if let Some(alt) = candidate.best_fit_alternate(limit).cloned() {
                tracing::debug!(
                    path = %candidate.path,
                    from = ?candidate.representation,
                    to = ?alt.representation,
                    "candidate_downgraded"
                );
                candidate.apply_alternate(&alt);
            } else {
                tracing::debug!(path = %candidate.path, "candidate_dropped");
                continue;
            }
        }

        if candidate.tokens > remaining || candidate.tokens > cap_remaining {
            tracing::debug!(path = %candidate.path, "candidate_dropped");
            continue;
        }

        remaining -= candidate.tokens;
        *strategy_caps.get_mut(&candidate.strategy).unwrap() -= candidate.tokens;
        selected.push(candidate);
    }

    let consumed = budget_tokens - remaining;
    if budget_tokens > 0 && (consumed as f64 / budget_tokens as f64) >= plan.warning_threshold {
        warnings.push(Warning::new(
            WarningKind::NearBudget,
            format!(
                "selection used {consumed}/{budget_tokens} tokens, at or above the {:.0}% warning threshold",
                plan.warning_threshold * 100.0
            ),
        ));
    }

    let total_tokens = selected.iter().map(|c| c.tokens).sum::<usize>()
        + sidecars.iter().map(|s| s.tokens).sum::<usize>()
        + tree_tokens;

    tracing::info!(selected = selected.len(), total_tokens, "selector_end");
    SliceResult {
        selected,
        sidecars,
        tree: plan.tree.clone(),
        total_tokens,
        budget_tokens,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alternate, Representation};

    fn candidate(strategy: &str, path: &str, tokens: usize, score: f64) -> SliceCandidate {
        SliceCandidate::new(
            strategy,
            path,
            Representation::Full,
            "x".repeat(tokens * 4),
            tokens,
            score,
            "test",
            "test",
            vec![Alternate {
                representation: Representation::Reference,
                tokens: 5,
                payload: path.to_string(),
            }],
        )
    }

    #[test]
    fn selects_highest_score_first_within_budget() {
        let mut plan = SlicePlan {
            budget_tokens: 100,
            max_results: 10,
            warning_threshold: 0.9,
            ..SlicePlan::default()
        };
        plan.push_candidate(candidate("keyword", "a.rs", 60, 0.9));
        plan.push_candidate(candidate("keyword", "b.rs", 60, 0.5));
        let config = SlicerConfig::default();
        let result = select(&plan, &config);
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].path, "a.rs");
    }

    #[test]
    fn downgrades_to_reference_when_over_budget() {
        let mut plan = SlicePlan {
            budget_tokens: 10,
            max_results: 10,
            warning_threshold: 0.9,
            ..SlicePlan::default()
        };
        plan.push_candidate(candidate("keyword", "a.rs", 60, 0.9));
        let config = SlicerConfig::default();
        let result = select(&plan, &config);
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].representation, Representation::Reference);
    }

    #[test]
    fn respects_strategy_budget_cap() {
        let mut plan = SlicePlan {
            budget_tokens: 1000,
            max_results: 10,
            warning_threshold: 0.9,
            ..SlicePlan::default()
        };
        // diff's cap is 10% of budget == 100 tokens; this candidate alone
        // exceeds it and has no alternate small enough other than reference.
        plan.push_candidate(candidate("diff", "a.rs", 500, 0.9));
        let config = SlicerConfig::default();
        let result = select(&plan, &config);
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].representation, Representation::Reference);
    }
}
