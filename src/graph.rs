//! Import-graph builder: resolves codemap `imports` into a directed
//! file-to-file graph, and a deterministic BFS walk over it.

use crate::codemap::Codemap;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

const RESOLVABLE_EXTENSIONS: &[&str] = &["ts", "js", "tsx", "jsx", "py", "go", "rs"];

#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    /// Adjacency list keyed by repo-relative path ('/'-separated).
    pub edges: HashMap<String, Vec<String>>,
}

impl ImportGraph {
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let list = self.edges.entry(from.to_string()).or_default();
        if !list.iter().any(|p| p == to) {
            list.push(to.to_string());
        }
    }
}

fn normalize_rel(path: &Path, repo_root: &Path) -> Option<String> {
    let rel = path.strip_prefix(repo_root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Resolves a relative specifier against the importing file's directory,
/// trying each of the known source extensions; bare (non-relative)
/// specifiers are dropped.
fn resolve_relative(repo_root: &Path, from_file_abs: &Path, spec: &str) -> Option<String> {
    let spec = spec.trim();
    if !(spec.starts_with('.') || spec.starts_with('/')) {
        return None;
    }
    let base_dir = from_file_abs.parent()?;
    let joined = if spec.starts_with('/') {
        repo_root.join(spec.trim_start_matches('/'))
    } else {
        base_dir.join(spec)
    };

    let mut candidates = vec![joined.clone()];
    for ext in RESOLVABLE_EXTENSIONS {
        candidates.push(with_appended_ext(&joined, ext));
        candidates.push(joined.join(format!("index.{ext}")));
        candidates.push(joined.join(format!("mod.{ext}")));
    }

    for cand in candidates {
        if cand.is_file() {
            return normalize_rel(&cand, repo_root);
        }
    }
    None
}

fn with_appended_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Builds a directed graph of file-to-file imports from a set of codemaps
/// Unresolved edges (bare specifiers, dangling relative imports) are
/// discarded silently.
pub fn build_import_graph(codemaps: &[Codemap], repo_root: &Path) -> ImportGraph {
    let mut graph = ImportGraph::default();
    for cm in codemaps {
        let from_abs = repo_root.join(&cm.path);
        for spec in &cm.imports {
            if let Some(target) = resolve_relative(repo_root, &from_abs, spec) {
                graph.add_edge(&cm.path, &target);
            }
        }
    }
    graph
}

/// Standard BFS from `seeds`, depth 0 for seeds, capped at `max_depth`.
/// Visits each node once; ties broken by insertion order
/// 7).
pub fn bfs_walk(
    graph: &ImportGraph,
    seeds: &[String],
    max_depth: usize,
) -> HashMap<String, usize> {
    let mut depths: HashMap<String, usize> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();

    for seed in seeds {
        if visited.insert(seed.clone()) {
            depths.insert(seed.clone(), 0);
            queue.push_back((seed.clone(), 0));
        }
    }

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let Some(neighbors) = graph.edges.get(&node) else {
            continue;
        };
        for next in neighbors {
            if visited.insert(next.clone()) {
                depths.insert(next.clone(), depth + 1);
                queue.push_back((next.clone(), depth + 1));
            }
        }
    }

    depths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from_pairs(pairs: &[(&str, &str)]) -> ImportGraph {
        let mut g = ImportGraph::default();
        for (a, b) in pairs {
            g.add_edge(a, b);
        }
        g
    }

    #[test]
    fn bfs_seeds_are_depth_zero() {
        let g = graph_from_pairs(&[("a", "b"), ("b", "c")]);
        let depths = bfs_walk(&g, &["a".to_string()], 5);
        assert_eq!(depths["a"], 0);
        assert_eq!(depths["b"], 1);
        assert_eq!(depths["c"], 2);
    }

    #[test]
    fn bfs_respects_max_depth() {
        let g = graph_from_pairs(&[("a", "b"), ("b", "c")]);
        let depths = bfs_walk(&g, &["a".to_string()], 1);
        assert_eq!(depths.get("c"), None);
    }

    #[test]
    fn bfs_visits_each_node_once() {
        let g = graph_from_pairs(&[("a", "b"), ("a", "c"), ("b", "c")]);
        let depths = bfs_walk(&g, &["a".to_string()], 5);
        assert_eq!(depths["c"], 1);
    }
}
