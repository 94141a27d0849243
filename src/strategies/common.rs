//! Shared helpers for strategy plugins: the alternate-ladder builders every
//! strategy uses to satisfy "always append a reference alternate" and
//! a capped direct file read for strategies that need full content.

use super::StrategyContext;
use crate::codemap::{format_codemap_compact, Codemap};
use crate::config::IntensityLimits;
use crate::model::{Alternate, Representation, SliceRequest};
use crate::pathfilter::is_path_included;
use crate::tokens::estimate_tokens;
use std::path::Path;

pub fn reference_alternate(path: &str) -> Alternate {
    Alternate {
        representation: Representation::Reference,
        tokens: estimate_tokens(path),
        payload: path.to_string(),
    }
}

pub fn full_alternate(content: &str) -> Alternate {
    Alternate {
        representation: Representation::Full,
        tokens: estimate_tokens(content),
        payload: content.to_string(),
    }
}

pub fn codemap_alternate(codemap: &Codemap) -> Alternate {
    let payload = format_codemap_compact(codemap);
    Alternate {
        representation: Representation::Codemap,
        tokens: estimate_tokens(&payload),
        payload,
    }
}

pub fn path_allowed(path: &str, request: &SliceRequest) -> bool {
    is_path_included(path, &request.include, &request.exclude)
}

/// Resolves a strategy's effective `(max_items, max_tokens, graph_depth)`
/// limits: the intensity-derived defaults from `SlicerConfig`, narrowed by
/// any per-request `strategyCaps` override on either field.
/// A request cap can only tighten a limit, never loosen it.
pub fn effective_limits(ctx: &StrategyContext<'_>, name: &str) -> IntensityLimits {
    let mut limits = ctx.config.limits(name, ctx.request.intensity_for(name));
    if let Some(cap) = ctx.request.strategy_caps.get(name) {
        if let Some(max_items) = cap.max_items {
            limits.max_items = limits.max_items.min(max_items);
        }
        if let Some(max_tokens) = cap.max_tokens {
            limits.max_tokens = limits.max_tokens.min(max_tokens);
        }
    }
    limits
}

/// Reads `repo_root/path` directly off disk, same as this lineage's scanner
/// (the backend covers discovery/search/structure, not raw
/// candidate payloads). Returns `None` on any I/O error or when the file
/// exceeds the configured size cap, matching the engine's never-throw
/// discipline.
pub async fn read_file_capped(repo_root: &Path, path: &str, max_bytes: u64) -> Option<String> {
    let abs = repo_root.join(path);
    let meta = tokio::fs::metadata(&abs).await.ok()?;
    if meta.len() > max_bytes {
        return None;
    }
    tokio::fs::read_to_string(&abs).await.ok()
}

/// All ancestor directory prefixes of `path` (excluding the file itself),
/// used by the `graph` strategy to restrict analysis to seed neighborhoods
/// when the repository exceeds 500 code files.
pub fn ancestor_dirs(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let segments: Vec<&str> = path.split('/').collect();
    for i in 1..segments.len() {
        out.push(segments[..i].join("/"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryRepoBackend;
    use crate::config::SlicerConfig;
    use crate::model::{SliceRequest, StrategyCap};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn ancestor_dirs_excludes_file_itself() {
        assert_eq!(ancestor_dirs("src/a/b.rs"), vec!["src", "src/a"]);
        assert_eq!(ancestor_dirs("lib.rs"), Vec::<String>::new());
    }

    #[test]
    fn strategy_cap_tightens_but_never_loosens_config_limits() {
        let config = SlicerConfig::default();
        let mut request = SliceRequest {
            task: "task".to_string(),
            ..SliceRequest::default()
        };
        request.strategy_caps.insert(
            "skeleton".to_string(),
            StrategyCap {
                max_items: Some(1),
                max_tokens: Some(usize::MAX),
            },
        );
        let keywords: Vec<String> = Vec::new();
        let mut matched = HashSet::new();
        let backend: Arc<dyn crate::backend::RepoBackend> =
            Arc::new(InMemoryRepoBackend::new(Default::default()));
        let ctx = StrategyContext {
            request: &request,
            backend,
            repo_root: &request.repo_root,
            keywords: &keywords,
            config: &config,
            budget_tokens: 1000,
            matched_files: &mut matched,
        };

        let uncapped = config.limits("skeleton", request.intensity_for("skeleton"));
        let capped = effective_limits(&ctx, "skeleton");
        assert_eq!(capped.max_items, 1, "an explicit cap below the default must win");
        assert_eq!(
            capped.max_tokens, uncapped.max_tokens,
            "a cap above the default must not loosen the configured limit"
        );
    }
}
