//! End-to-end coverage of the `plan_slice` → `select` → `package` pipeline
//! against an in-memory backend backed by real tempdir fixtures (so direct
//! file reads and backend search/structure queries see identical content).

use context_slicer::{
    plan_slice, select, slice, InMemoryRepoBackend, OutputFormat, RepoBackend, SlicerConfig,
    SliceRequest, StrategyRegistry,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

fn write_fixture(files: &[(&str, &str)]) -> (tempfile::TempDir, HashMap<String, String>) {
    let dir = tempfile::tempdir().unwrap();
    let mut contents = HashMap::new();
    for (path, body) in files {
        let abs = dir.path().join(path);
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&abs, body).unwrap();
        contents.insert(path.to_string(), body.to_string());
    }
    (dir, contents)
}

fn request(repo_root: PathBuf, task: &str, budget_tokens: usize) -> SliceRequest {
    SliceRequest {
        task: task.to_string(),
        repo_root,
        budget_tokens,
        max_results: 50,
        ..SliceRequest::default()
    }
}

/// Scenario: a minimal single-file repo produces a full skeleton
/// candidate sized to the file itself, with no warnings.
#[tokio::test]
async fn minimal_single_file_repo_yields_full_skeleton_candidate() {
    let body = "export function main() {\n  return 1;\n}\n".repeat(3);
    let (dir, files) = write_fixture(&[("src/index.ts", &body)]);
    let mut req = request(dir.path().to_path_buf(), "fix bug", 2000);
    req.strategies = Some(vec!["skeleton".to_string()]);

    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();
    let registry = StrategyRegistry::default();

    let plan = plan_slice(&req, backend, &config, &registry).await;
    assert!(plan.warnings.is_empty());
    assert_eq!(plan.candidates.len(), 1);
    assert_eq!(plan.candidates[0].path, "src/index.ts");
    assert_eq!(
        plan.candidates[0].representation,
        context_slicer::model::Representation::Full
    );

    let result = select(&plan, &config);
    assert!(result.warnings.is_empty());
    assert_eq!(result.total_tokens, plan.candidates[0].tokens);
}

/// Scenario: a large candidate gets downgraded to fit a tight budget.
#[tokio::test]
async fn budget_squeeze_downgrades_representation() {
    let body = "function entry() {\n".to_string() + &"  doWork();\n".repeat(400) + "}\n";
    let (dir, files) = write_fixture(&[("src/main.ts", &body)]);
    let mut req = request(dir.path().to_path_buf(), "inspect startup", 300);
    req.strategies = Some(vec!["skeleton".to_string()]);

    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();
    let registry = StrategyRegistry::default();

    let plan = plan_slice(&req, backend, &config, &registry).await;
    assert_eq!(plan.candidates.len(), 1);
    assert!(plan.candidates[0].tokens > 300, "fixture must exceed the budget to exercise downgrade");

    let result = select(&plan, &config);
    assert_eq!(result.selected.len(), 1);
    assert_ne!(
        result.selected[0].representation,
        context_slicer::model::Representation::Full
    );
    assert!(result.total_tokens <= 300);
}

/// Scenario: an exclude glob keeps matching files out of every
/// strategy's candidates.
#[tokio::test]
async fn exclude_filter_drops_test_files() {
    let (dir, files) = write_fixture(&[
        ("src/index.ts", "export function main() {}\n"),
        ("src/index.test.ts", "test('main', () => {});\n"),
    ]);
    let mut req = request(dir.path().to_path_buf(), "fix bug", 2000);
    req.exclude = vec!["**/*.test.*".to_string()];
    req.strategies = Some(vec!["skeleton".to_string(), "keyword".to_string()]);

    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();
    let registry = StrategyRegistry::default();

    let plan = plan_slice(&req, backend, &config, &registry).await;
    assert!(plan.candidates.iter().all(|c| !c.path.contains(".test.")));
}

/// Scenario: crossing the warning threshold surfaces a near_budget
/// warning; staying comfortably under it does not.
#[tokio::test]
async fn near_budget_warning_only_past_threshold() {
    use context_slicer::model::{Alternate, Representation, SliceCandidate, SlicePlan};
    use context_slicer::{Warning, WarningKind};

    let make_plan = |budget: usize, tokens: usize| {
        let mut plan = SlicePlan {
            budget_tokens: budget,
            max_results: 10,
            warning_threshold: 0.9,
            ..SlicePlan::default()
        };
        plan.push_candidate(SliceCandidate::new(
            "keyword",
            "src/a.rs",
            Representation::Full,
            "x".repeat(tokens * 4),
            tokens,
            0.8,
            "test",
            "test",
            vec![Alternate {
                representation: Representation::Reference,
                tokens: 5,
                payload: "src/a.rs".to_string(),
            }],
        ));
        plan
    };

    let config = SlicerConfig::default();

    let near = select(&make_plan(1000, 950), &config);
    assert!(near
        .warnings
        .iter()
        .any(|w: &Warning| w.kind == WarningKind::NearBudget));

    let comfortable = select(&make_plan(1000, 800), &config);
    assert!(!comfortable
        .warnings
        .iter()
        .any(|w: &Warning| w.kind == WarningKind::NearBudget));
}

/// Boundary behaviors: empty task is rejected; zero budget selects
/// nothing but is not an error.
#[tokio::test]
async fn empty_task_is_invalid_request() {
    let (dir, files) = write_fixture(&[("src/index.ts", "export function main() {}\n")]);
    let req = request(dir.path().to_path_buf(), "   ", 1000);
    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();

    let outcome = slice(&req, backend, &config, OutputFormat::Json).await;
    assert!(matches!(
        outcome,
        Err(context_slicer::SlicerError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn zero_budget_selects_nothing_with_warning() {
    let (dir, files) = write_fixture(&[("src/index.ts", "export function main() {}\n")]);
    let req = request(dir.path().to_path_buf(), "fix bug", 0);
    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();

    let (result, _rendered) = slice(&req, backend, &config, OutputFormat::Json)
        .await
        .expect("budget=0 is a valid request");
    assert!(result.selected.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == context_slicer::WarningKind::BudgetExceeded));
}

/// Boundary behavior: a task with no keywords after stopword removal
/// skips `ast` and `keyword` with warnings but leaves other strategies free
/// to run.
#[tokio::test]
async fn no_keywords_skips_keyword_and_ast_with_warnings() {
    let (dir, files) = write_fixture(&[("src/index.ts", "export function main() {}\n")]);
    let mut req = request(dir.path().to_path_buf(), "the of in", 2000);
    req.strategies = Some(vec!["skeleton".to_string(), "keyword".to_string(), "ast".to_string()]);

    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();
    let registry = StrategyRegistry::default();

    let plan = plan_slice(&req, backend, &config, &registry).await;
    assert!(plan
        .candidates
        .iter()
        .any(|c| c.strategy == "skeleton" && c.path == "src/index.ts"));
    assert!(plan.warnings.iter().any(|w| w.message.contains("keyword")));
    assert!(plan.warnings.iter().any(|w| w.message.contains("ast")));
}

/// Packager: every output format renders a non-empty result for the
/// same plan.
#[tokio::test]
async fn packaging_every_format_succeeds_for_a_small_plan() {
    let (dir, files) = write_fixture(&[("src/index.ts", "export function main() {}\n")]);
    let req = request(dir.path().to_path_buf(), "fix bug", 2000);
    let backend: Arc<dyn RepoBackend> = Arc::new(InMemoryRepoBackend::new(files));
    let config = SlicerConfig::default();

    for format in [OutputFormat::Xml, OutputFormat::Markdown, OutputFormat::Json] {
        let (_, rendered) = slice(&req, backend.clone(), &config, format)
            .await
            .unwrap();
        assert!(!rendered.is_empty());
    }
}
