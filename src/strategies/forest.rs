//! Forest strategy: an optional external-tool sidecar, not a
//! candidate — available only when the `forest` executable is on `PATH`.

use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::error::{Warning, WarningKind};
use crate::model::Sidecar;
use crate::procutil::{exec, on_path};
use crate::tokens::estimate_tokens;
use async_trait::async_trait;
use std::time::Duration;

/// Below this allotted slice, invoking the tool isn't worth it.
const MIN_SLICE_TOKENS: usize = 500;
/// Below this response size, the sidecar is discarded as noise.
const MIN_RESPONSE_TOKENS: usize = 100;
const DEFAULT_CAP_FRACTION: f64 = 0.25;

pub struct ForestStrategy;

#[async_trait]
impl Strategy for ForestStrategy {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn default_weight(&self) -> f64 {
        0.70
    }

    fn default_budget_cap(&self) -> Option<f64> {
        Some(DEFAULT_CAP_FRACTION)
    }

    async fn is_available(&self, _ctx: &StrategyContext<'_>) -> bool {
        on_path("forest")
    }

    async fn execute(&self, ctx: &mut StrategyContext<'_>) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::default();

        let cap_fraction = ctx
            .config
            .budget_cap_fraction("forest")
            .unwrap_or(DEFAULT_CAP_FRACTION);
        let slice_budget = (ctx.budget_tokens as f64 * cap_fraction) as usize;
        if slice_budget < MIN_SLICE_TOKENS {
            outcome.warnings.push(Warning::new(
                WarningKind::StrategyFailure,
                "forest: allotted budget slice below the 500-token minimum",
            ));
            return outcome;
        }

        let project_name = ctx
            .repo_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repo".to_string());
        let tag = format!("project:{project_name}");
        let query = ctx.keywords.join(",");
        let budget_arg = slice_budget.to_string();
        let args = ["context", "--tag", &tag, "--query", &query, "--budget", &budget_arg];

        let output = exec("forest", &args, ctx.repo_root, Duration::from_secs(10)).await;
        if output.exit_code != 0 {
            outcome.warnings.push(Warning::new(
                WarningKind::StrategyFailure,
                format!("forest: exited with code {}", output.exit_code),
            ));
            return outcome;
        }

        let tokens = estimate_tokens(&output.stdout);
        if tokens < MIN_RESPONSE_TOKENS {
            outcome.warnings.push(Warning::new(
                WarningKind::StrategyFailure,
                "forest: response below the 100-token minimum, discarded",
            ));
            return outcome;
        }

        outcome.sidecar = Some(Sidecar {
            name: "forest".to_string(),
            payload: output.stdout,
            tokens,
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryRepoBackend;
    use crate::config::SlicerConfig;
    use crate::model::SliceRequest;
    use std::collections::HashSet;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;

    /// Writes a fake `forest` executable into a tempdir and prepends it to
    /// `PATH` for the duration of the test (restored on drop).
    struct FakePath {
        _dir: tempfile::TempDir,
        original: Option<std::ffi::OsString>,
    }

    impl FakePath {
        fn install(script: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let bin_path = dir.path().join("forest");
            std::fs::write(&bin_path, script).unwrap();
            let mut perms = std::fs::metadata(&bin_path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&bin_path, perms).unwrap();

            let original = std::env::var_os("PATH");
            let mut new_path = dir.path().as_os_str().to_owned();
            if let Some(existing) = &original {
                new_path.push(":");
                new_path.push(existing);
            }
            std::env::set_var("PATH", &new_path);
            Self { _dir: dir, original }
        }
    }

    impl Drop for FakePath {
        fn drop(&mut self) {
            match &self.original {
                Some(v) => std::env::set_var("PATH", v),
                None => std::env::remove_var("PATH"),
            }
        }
    }

    #[tokio::test]
    async fn emits_sidecar_when_tool_returns_enough_tokens() {
        let body = "x".repeat(800);
        let script = format!("#!/bin/sh\nprintf '%s' '{body}'\n");
        let _fake_path = FakePath::install(&script);

        let request = SliceRequest {
            task: "context".to_string(),
            repo_root: std::env::temp_dir(),
            budget_tokens: 10_000,
            ..SliceRequest::default()
        };
        let config = SlicerConfig::default();
        let backend: Arc<dyn crate::backend::RepoBackend> =
            Arc::new(InMemoryRepoBackend::new(Default::default()));
        let keywords = vec!["auth".to_string()];
        let mut matched = HashSet::new();
        let mut ctx = StrategyContext {
            request: &request,
            backend,
            repo_root: &request.repo_root,
            keywords: &keywords,
            config: &config,
            budget_tokens: request.budget_tokens,
            matched_files: &mut matched,
        };

        let strategy = ForestStrategy;
        assert!(strategy.is_available(&ctx).await);
        let outcome = strategy.execute(&mut ctx).await;
        let sidecar = outcome.sidecar.expect("expected a forest sidecar");
        assert_eq!(sidecar.name, "forest");
        assert!(sidecar.tokens >= 100);
    }

    #[tokio::test]
    async fn skips_when_slice_budget_too_small() {
        let _fake_path = FakePath::install("#!/bin/sh\nprintf 'irrelevant'\n");

        let request = SliceRequest {
            task: "context".to_string(),
            repo_root: std::env::temp_dir(),
            budget_tokens: 100,
            ..SliceRequest::default()
        };
        let config = SlicerConfig::default();
        let backend: Arc<dyn crate::backend::RepoBackend> =
            Arc::new(InMemoryRepoBackend::new(Default::default()));
        let keywords = vec![];
        let mut matched = HashSet::new();
        let mut ctx = StrategyContext {
            request: &request,
            backend,
            repo_root: &request.repo_root,
            keywords: &keywords,
            config: &config,
            budget_tokens: request.budget_tokens,
            matched_files: &mut matched,
        };

        let strategy = ForestStrategy;
        let outcome = strategy.execute(&mut ctx).await;
        assert!(outcome.sidecar.is_none());
        assert_eq!(outcome.warnings.len(), 1);
    }
}
