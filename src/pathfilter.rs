//! Path filtering: `isPathIncluded` and `isCodePath`.
//!
//! Glob matching reuses the `glob` crate's `Pattern`, which natively
//! supports `?`, `*`, and the recursive `**` the spec calls for — the same
//! crate this lineage already reaches for when matching workspace-member
//! globs.

use crate::config::CODE_EXTENSIONS;
use glob::Pattern;

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn matches_any(path: &str, globs: &[String]) -> bool {
    globs.iter().any(|g| {
        Pattern::new(g)
            .map(|p| p.matches(path))
            .unwrap_or(false)
    })
}

/// True iff `path` matches at least one `include` glob (or `include` is
/// empty) and matches no `exclude` glob.
pub fn is_path_included(path: &str, include: &[String], exclude: &[String]) -> bool {
    let path = normalize(path);
    let included = include.is_empty() || matches_any(&path, include);
    if !included {
        return false;
    }
    !matches_any(&path, exclude)
}

pub fn is_code_path(path: &str) -> bool {
    let path = normalize(path);
    match path.rsplit_once('.') {
        Some((_, ext)) => CODE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_include_means_everything_included() {
        assert!(is_path_included("src/main.rs", &[], &[]));
    }

    #[test]
    fn exclude_wins_over_include() {
        let include = vec!["**/*.rs".to_string()];
        let exclude = vec!["**/*.test.*".to_string()];
        assert!(is_path_included("src/main.rs", &include, &exclude));
        assert!(!is_path_included(
            "src/main.test.rs",
            &include,
            &exclude
        ));
    }

    #[test]
    fn double_star_crosses_directories() {
        let include = vec!["src/**/*.rs".to_string()];
        assert!(is_path_included(
            "src/a/b/c.rs",
            &include,
            &[]
        ));
    }

    #[test]
    fn code_path_extensions() {
        assert!(is_code_path("src/main.rs"));
        assert!(is_code_path("lib/index.tsx"));
        assert!(!is_code_path("README.md"));
        assert!(!is_code_path("Makefile"));
    }
}
