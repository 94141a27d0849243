//! Graph strategy: BFS over the import graph seeded from files
//! matched by earlier strategies, scoring neighbors down by depth.

use super::common::{ancestor_dirs, codemap_alternate, effective_limits, path_allowed, reference_alternate};
use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::backend::StructureScope;
use crate::error::{Warning, WarningKind};
use crate::graph::{bfs_walk, build_import_graph};
use crate::model::{Representation, SliceCandidate};
use crate::pathfilter::is_code_path;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Above this many code files, graph analysis is restricted to seed
/// directories and their ancestors.
const LARGE_REPO_THRESHOLD: usize = 500;

pub struct GraphStrategy;

#[async_trait]
impl Strategy for GraphStrategy {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn default_weight(&self) -> f64 {
        0.50
    }

    fn default_budget_cap(&self) -> Option<f64> {
        Some(0.15)
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        let seeds: Vec<String> = ctx.matched_files.iter().cloned().collect();
        if seeds.is_empty() {
            return outcome;
        }

        let limits = effective_limits(ctx, "graph");
        let weight = ctx.config.weight("graph");

        let all_files = match ctx.backend.list_files(ctx.repo_root).await {
            Ok(f) => f,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("graph: list_files failed: {err}"),
                ));
                return outcome;
            }
        };

        let code_files: Vec<String> = all_files
            .into_iter()
            .filter(|p| is_code_path(p) && path_allowed(p, ctx.request))
            .collect();

        let analysis_files: Vec<String> = if code_files.len() > LARGE_REPO_THRESHOLD {
            let seed_dirs: HashSet<String> = seeds.iter().flat_map(|s| ancestor_dirs(s)).collect();
            code_files
                .into_iter()
                .filter(|p| {
                    ancestor_dirs(p)
                        .iter()
                        .any(|dir| seed_dirs.contains(dir))
                })
                .collect()
        } else {
            code_files
        };

        let structures = match ctx
            .backend
            .get_structure(&analysis_files, ctx.repo_root, StructureScope::ImportsOnly)
            .await
        {
            Ok(s) => s,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("graph: get_structure failed: {err}"),
                ));
                return outcome;
            }
        };

        let import_graph = build_import_graph(&structures, ctx.repo_root);
        let depths = bfs_walk(&import_graph, &seeds, limits.graph_depth);

        let seed_set: HashSet<&str> = seeds.iter().map(|s| s.as_str()).collect();
        let mut discovered: Vec<(String, usize)> = depths
            .into_iter()
            .filter(|(path, depth)| *depth > 0 && !seed_set.contains(path.as_str()))
            .collect();
        discovered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        discovered.truncate(limits.max_items);

        if discovered.is_empty() {
            return outcome;
        }

        let paths: Vec<String> = discovered.iter().map(|(p, _)| p.clone()).collect();
        let full_structures = match ctx
            .backend
            .get_structure(&paths, ctx.repo_root, StructureScope::Full)
            .await
        {
            Ok(s) => s,
            Err(err) => {
                outcome.warnings.push(Warning::new(
                    WarningKind::StrategyFailure,
                    format!("graph: get_structure (full) failed: {err}"),
                ));
                return outcome;
            }
        };
        let by_path: HashMap<&str, _> = full_structures
            .iter()
            .map(|c| (c.path.as_str(), c))
            .collect();

        for (path, depth) in discovered {
            let Some(cm) = by_path.get(path.as_str()) else {
                continue;
            };
            let codemap_alt = codemap_alternate(cm);
            let score = (weight - 0.08 * depth as f64).max(0.05);
            outcome.candidates.push(SliceCandidate::new(
                "graph",
                &path,
                Representation::Codemap,
                codemap_alt.payload.clone(),
                codemap_alt.tokens,
                score,
                format!("import-graph neighbor at depth {depth}"),
                "graph",
                vec![reference_alternate(&path)],
            ));
            ctx.matched_files.insert(path);
        }

        outcome
    }
}
