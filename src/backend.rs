//! The `RepoBackend` contract and two concrete implementations: a real
//! filesystem-backed one for standalone use, and a deterministic in-memory
//! one for tests ("the backend interface is the main seam for
//! testing").
//!
//! Direct file *reads* for candidate payloads are not part of this
//! contract — they're component-A file I/O the strategies perform
//! themselves against `repo_root`, same as this lineage's scanner reading
//! files directly off disk. The backend only covers discovery, search,
//! structure extraction, and tree rendering.

use crate::codemap::{Codemap, CodemapAdapter};
use crate::fs_scan::{scan_workspace, ScanOptions};
use crate::tokens::estimate_tokens;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub path: String,
    pub line: usize,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub context_lines: usize,
    pub max_results: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureScope {
    Full,
    ImportsOnly,
}

#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_entries: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { max_entries: 2000 }
    }
}

#[derive(Debug, Clone)]
pub struct TreeResult {
    pub content: String,
    pub tokens: usize,
}

#[async_trait]
pub trait RepoBackend: Send + Sync {
    async fn list_files(&self, root: &Path) -> anyhow::Result<Vec<String>>;

    async fn search(
        &self,
        keywords: &[String],
        root: &Path,
        opts: SearchOptions,
    ) -> anyhow::Result<Vec<SearchMatch>>;

    async fn get_structure(
        &self,
        paths: &[String],
        root: &Path,
        scope: StructureScope,
    ) -> anyhow::Result<Vec<Codemap>>;

    async fn get_tree(&self, root: &Path, opts: TreeOptions) -> anyhow::Result<TreeResult>;
}

/// Real-filesystem backend, grounded on this lineage's `ignore`-based
/// scanner.
pub struct FsRepoBackend {
    adapter: Arc<CodemapAdapter>,
}

impl FsRepoBackend {
    pub fn new(adapter: Arc<CodemapAdapter>) -> Self {
        Self { adapter }
    }
}

impl Default for FsRepoBackend {
    fn default() -> Self {
        Self::new(Arc::new(CodemapAdapter::heuristic()))
    }
}

#[async_trait]
impl RepoBackend for FsRepoBackend {
    async fn list_files(&self, root: &Path) -> anyhow::Result<Vec<String>> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let opts = ScanOptions {
                repo_root: root.clone(),
                target: PathBuf::from("."),
                max_file_bytes: 1_000_000,
                exclude_dir_names: vec![],
            };
            let entries = scan_workspace(&opts)?;
            Ok(entries
                .into_iter()
                .map(|e| e.rel_path.to_string_lossy().replace('\\', "/"))
                .collect())
        })
        .await?
    }

    async fn search(
        &self,
        keywords: &[String],
        root: &Path,
        opts: SearchOptions,
    ) -> anyhow::Result<Vec<SearchMatch>> {
        let root = root.to_path_buf();
        let keywords = keywords.to_vec();
        tokio::task::spawn_blocking(move || {
            let scan_opts = ScanOptions {
                repo_root: root.clone(),
                target: PathBuf::from("."),
                max_file_bytes: 1_000_000,
                exclude_dir_names: vec![],
            };
            let entries = scan_workspace(&scan_opts)?;
            let mut out = Vec::new();
            'files: for entry in entries {
                let Ok(content) = std::fs::read_to_string(&entry.abs_path) else {
                    continue;
                };
                let rel = entry.rel_path.to_string_lossy().replace('\\', "/");
                let lines: Vec<&str> = content.lines().collect();
                for (idx, line) in lines.iter().enumerate() {
                    let lower = line.to_lowercase();
                    if keywords.iter().any(|k| lower.contains(k.as_str())) {
                        let start = idx.saturating_sub(opts.context_lines);
                        let end = (idx + opts.context_lines + 1).min(lines.len());
                        let snippet = lines[start..end].join("\n");
                        out.push(SearchMatch {
                            path: rel.clone(),
                            line: idx + 1,
                            snippet,
                        });
                        if out.len() >= opts.max_results {
                            break 'files;
                        }
                    }
                }
            }
            Ok(out)
        })
        .await?
    }

    async fn get_structure(
        &self,
        paths: &[String],
        root: &Path,
        _scope: StructureScope,
    ) -> anyhow::Result<Vec<Codemap>> {
        let root = root.to_path_buf();
        let paths = paths.to_vec();
        let adapter = self.adapter.clone();
        tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            for path in paths {
                let abs = root.join(&path);
                let Ok(content) = std::fs::read_to_string(&abs) else {
                    continue;
                };
                if let Some(cm) = adapter.extract_codemap(&path, Some(&content)) {
                    out.push(cm);
                }
            }
            Ok(out)
        })
        .await?
    }

    async fn get_tree(&self, root: &Path, opts: TreeOptions) -> anyhow::Result<TreeResult> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let scan_opts = ScanOptions {
                repo_root: root.clone(),
                target: PathBuf::from("."),
                max_file_bytes: 1_000_000,
                exclude_dir_names: vec![],
            };
            let mut entries = scan_workspace(&scan_opts)?;
            entries.truncate(opts.max_entries);
            let mut content = String::new();
            for e in entries {
                content.push_str(&e.rel_path.to_string_lossy().replace('\\', "/"));
                content.push('\n');
            }
            let tokens = estimate_tokens(&content);
            Ok(TreeResult { content, tokens })
        })
        .await?
    }
}

/// Deterministic in-memory backend for tests: a fixed map of
/// repo-relative path -> content, queried without touching the filesystem.
pub struct InMemoryRepoBackend {
    files: HashMap<String, String>,
    adapter: CodemapAdapter,
}

impl InMemoryRepoBackend {
    pub fn new(files: HashMap<String, String>) -> Self {
        Self {
            files,
            adapter: CodemapAdapter::heuristic(),
        }
    }
}

#[async_trait]
impl RepoBackend for InMemoryRepoBackend {
    async fn list_files(&self, _root: &Path) -> anyhow::Result<Vec<String>> {
        let mut paths: Vec<String> = self.files.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }

    async fn search(
        &self,
        keywords: &[String],
        _root: &Path,
        opts: SearchOptions,
    ) -> anyhow::Result<Vec<SearchMatch>> {
        let mut out = Vec::new();
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort();
        for path in paths {
            let content = &self.files[path];
            let lines: Vec<&str> = content.lines().collect();
            for (idx, line) in lines.iter().enumerate() {
                let lower = line.to_lowercase();
                if keywords.iter().any(|k| lower.contains(k.as_str())) {
                    let start = idx.saturating_sub(opts.context_lines);
                    let end = (idx + opts.context_lines + 1).min(lines.len());
                    out.push(SearchMatch {
                        path: path.clone(),
                        line: idx + 1,
                        snippet: lines[start..end].join("\n"),
                    });
                    if out.len() >= opts.max_results {
                        return Ok(out);
                    }
                }
            }
        }
        Ok(out)
    }

    async fn get_structure(
        &self,
        paths: &[String],
        _root: &Path,
        _scope: StructureScope,
    ) -> anyhow::Result<Vec<Codemap>> {
        let mut out = Vec::new();
        for path in paths {
            if let Some(content) = self.files.get(path) {
                if let Some(cm) = self.adapter.extract_codemap(path, Some(content)) {
                    out.push(cm);
                }
            }
        }
        Ok(out)
    }

    async fn get_tree(&self, _root: &Path, opts: TreeOptions) -> anyhow::Result<TreeResult> {
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort();
        paths.truncate(opts.max_entries);
        let mut content = String::new();
        for p in paths {
            content.push_str(p);
            content.push('\n');
        }
        let tokens = estimate_tokens(&content);
        Ok(TreeResult { content, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> InMemoryRepoBackend {
        let mut files = HashMap::new();
        files.insert(
            "src/auth.rs".to_string(),
            "fn authenticate_user() {}\n".to_string(),
        );
        files.insert("src/index.rs".to_string(), "fn main() {}\n".to_string());
        InMemoryRepoBackend::new(files)
    }

    #[tokio::test]
    async fn list_files_is_sorted() {
        let backend = fixture();
        let files = backend.list_files(Path::new(".")).await.unwrap();
        assert_eq!(files, vec!["src/auth.rs", "src/index.rs"]);
    }

    #[tokio::test]
    async fn search_finds_keyword_hits() {
        let backend = fixture();
        let opts = SearchOptions {
            context_lines: 1,
            max_results: 10,
        };
        let matches = backend
            .search(&["authenticate".to_string()], Path::new("."), opts)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "src/auth.rs");
    }

    #[tokio::test]
    async fn get_structure_extracts_codemaps() {
        let backend = fixture();
        let cms = backend
            .get_structure(
                &["src/auth.rs".to_string()],
                Path::new("."),
                StructureScope::Full,
            )
            .await
            .unwrap();
        assert_eq!(cms.len(), 1);
        assert_eq!(cms[0].functions[0].name, "authenticate_user");
    }
}
