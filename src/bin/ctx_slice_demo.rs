//! Minimal smoke-test harness for the slicer engine: wires `FsRepoBackend`
//! against a real directory and prints the packaged result. Not a CLI front
//! end — the real one is an external collaborator this crate doesn't
//! ship.

use context_slicer::{slice, FsRepoBackend, OutputFormat, RepoBackend, SlicerConfig, SliceRequest};
use std::path::PathBuf;
use std::sync::Arc;

fn usage() -> ! {
    eprintln!(
        "usage: ctx-slice-demo --repo <path> --task <text> [--budget <tokens>] [--format xml|markdown|json]"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut repo_root: Option<PathBuf> = None;
    let mut task: Option<String> = None;
    let mut budget_tokens: usize = 8_000;
    let mut format = OutputFormat::Markdown;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--repo" => repo_root = args.next().map(PathBuf::from),
            "--task" => task = args.next(),
            "--budget" => {
                budget_tokens = args
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(budget_tokens)
            }
            "--format" => {
                format = args
                    .next()
                    .and_then(|v| OutputFormat::parse(&v).ok())
                    .unwrap_or(format)
            }
            _ => usage(),
        }
    }

    let Some(repo_root) = repo_root else { usage() };
    let Some(task) = task else { usage() };

    let request = SliceRequest {
        task,
        repo_root,
        budget_tokens,
        include_tree: true,
        max_results: 50,
        ..SliceRequest::default()
    };

    let backend: Arc<dyn RepoBackend> = Arc::new(FsRepoBackend::default());
    let config = SlicerConfig::default();

    match slice(&request, backend, &config, format).await {
        Ok((result, rendered)) => {
            for warning in &result.warnings {
                eprintln!("warning: {}", warning.message);
            }
            println!("{rendered}");
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
