//! Codemap adapter: language detection, a thin wrapper over an
//! injected `CodemapExtractor`, and deterministic compact formatting.
//!
//! The extractor itself — "given a file path and optional content, returns a
//! structured outline of classes/functions/types" — is a collaborator,
//! callers may supply a tree-sitter-backed one for full AST fidelity.
//! [`HeuristicCodemapExtractor`] is the crate's own dependency-light default,
//! grounded in this lineage's regex-based universal-skeleton fallback, so the
//! engine produces real codemaps standalone.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Go => "go",
        }
    }
}

/// Returns a language tag from extension, or `None` for unsupported /
/// unrecognized extensions.
pub fn detect_language(path: &str) -> Option<Language> {
    let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase())?;
    Some(match ext.as_str() {
        "ts" | "tsx" => Language::TypeScript,
        "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
        "py" => Language::Python,
        "rs" => Language::Rust,
        "go" => Language::Go,
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Codemap {
    pub path: String,
    pub language: String,
    pub classes: Vec<Symbol>,
    pub functions: Vec<Symbol>,
    pub types: Vec<Symbol>,
    /// Raw module specifiers, as written in the source — resolved into
    /// graph edges by [`crate::graph`].
    pub imports: Vec<String>,
}

/// The external collaborator contract: pure per-file, deterministic,
/// must not throw (panic) — failures are `None`.
pub trait CodemapExtractor: Send + Sync {
    fn extract(&self, path: &str, content: Option<&str>) -> Option<Codemap>;
}

/// Thin adapter wrapping an injected extractor with language
/// detection and compact formatting. `extract_codemap` never panics: any
/// extractor failure becomes `None`, matching the contract.
pub struct CodemapAdapter {
    extractor: Box<dyn CodemapExtractor>,
}

impl CodemapAdapter {
    pub fn new(extractor: Box<dyn CodemapExtractor>) -> Self {
        Self { extractor }
    }

    pub fn heuristic() -> Self {
        Self::new(Box::new(HeuristicCodemapExtractor))
    }

    pub fn detect_language(&self, path: &str) -> Option<Language> {
        detect_language(path)
    }

    pub fn extract_codemap(&self, path: &str, content: Option<&str>) -> Option<Codemap> {
        if detect_language(path).is_none() {
            return None;
        }
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.extractor.extract(path, content)
        }))
        .unwrap_or(None)
    }
}

/// Deterministic, stable-across-runs plain-text rendering
/// invariant 4: idempotent on identical input).
pub fn format_codemap_compact(codemap: &Codemap) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} ({})\n", codemap.path, codemap.language));
    if !codemap.imports.is_empty() {
        out.push_str("imports:\n");
        for imp in &codemap.imports {
            out.push_str(&format!("  {imp}\n"));
        }
    }
    if !codemap.classes.is_empty() {
        out.push_str("classes:\n");
        for s in &codemap.classes {
            out.push_str(&format!("  {} (L{})\n", s.name, s.line));
        }
    }
    if !codemap.types.is_empty() {
        out.push_str("types:\n");
        for s in &codemap.types {
            out.push_str(&format!("  {} (L{})\n", s.name, s.line));
        }
    }
    if !codemap.functions.is_empty() {
        out.push_str("functions:\n");
        for s in &codemap.functions {
            out.push_str(&format!("  {} (L{})\n", s.name, s.line));
        }
    }
    out
}

struct LangPatterns {
    class_re: &'static Regex,
    func_re: &'static Regex,
    type_re: &'static Regex,
    import_re: &'static Regex,
}

fn rust_patterns() -> LangPatterns {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    static FUNC: OnceLock<Regex> = OnceLock::new();
    static TYPE: OnceLock<Regex> = OnceLock::new();
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    LangPatterns {
        class_re: CLASS.get_or_init(|| Regex::new(r"^\s*(?:pub\s+)?struct\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        func_re: FUNC.get_or_init(|| Regex::new(r"^\s*(?:pub\s+)?(?:async\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        type_re: TYPE.get_or_init(|| Regex::new(r"^\s*(?:pub\s+)?(?:enum|trait|type)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        import_re: IMPORT.get_or_init(|| Regex::new(r"^\s*use\s+([A-Za-z0-9_:{}, ]+?);").unwrap()),
    }
}

fn ts_js_patterns() -> LangPatterns {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    static FUNC: OnceLock<Regex> = OnceLock::new();
    static TYPE: OnceLock<Regex> = OnceLock::new();
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    LangPatterns {
        class_re: CLASS.get_or_init(|| Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()),
        func_re: FUNC.get_or_init(|| Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()),
        type_re: TYPE.get_or_init(|| Regex::new(r"^\s*(?:export\s+)?(?:interface|type|enum)\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()),
        import_re: IMPORT.get_or_init(|| Regex::new(r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#).unwrap()),
    }
}

fn python_patterns() -> LangPatterns {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    static FUNC: OnceLock<Regex> = OnceLock::new();
    static TYPE: OnceLock<Regex> = OnceLock::new();
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    LangPatterns {
        class_re: CLASS.get_or_init(|| Regex::new(r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        func_re: FUNC.get_or_init(|| Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        type_re: TYPE.get_or_init(|| Regex::new(r"\x00NEVER_MATCHES\x00").unwrap()),
        import_re: IMPORT.get_or_init(|| {
            Regex::new(r"^\s*(?:from\s+([A-Za-z0-9_.]+)\s+import|import\s+([A-Za-z0-9_.]+))").unwrap()
        }),
    }
}

fn go_patterns() -> LangPatterns {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    static FUNC: OnceLock<Regex> = OnceLock::new();
    static TYPE: OnceLock<Regex> = OnceLock::new();
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    LangPatterns {
        class_re: CLASS.get_or_init(|| Regex::new(r"\x00NEVER_MATCHES\x00").unwrap()),
        func_re: FUNC.get_or_init(|| Regex::new(r"^\s*func\s+(?:\([^)]*\)\s*)?([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        type_re: TYPE.get_or_init(|| Regex::new(r"^\s*type\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()),
        import_re: IMPORT.get_or_init(|| Regex::new(r#"^\s*"([^"]+)"\s*$"#).unwrap()),
    }
}

fn patterns_for(language: Language) -> LangPatterns {
    match language {
        Language::Rust => rust_patterns(),
        Language::TypeScript | Language::JavaScript => ts_js_patterns(),
        Language::Python => python_patterns(),
        Language::Go => go_patterns(),
    }
}

/// Regex-driven best-effort extraction. Not AST-grade, but deterministic and
/// dependency-light; callers who need exact parsing supply their own
/// [`CodemapExtractor`].
pub struct HeuristicCodemapExtractor;

impl CodemapExtractor for HeuristicCodemapExtractor {
    fn extract(&self, path: &str, content: Option<&str>) -> Option<Codemap> {
        let language = detect_language(path)?;
        let content = content?;
        let patterns = patterns_for(language);

        let mut classes = Vec::new();
        let mut functions = Vec::new();
        let mut types = Vec::new();
        let mut imports = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let lineno = idx + 1;
            if let Some(c) = patterns.class_re.captures(line) {
                classes.push(Symbol {
                    name: c[1].to_string(),
                    line: lineno,
                });
                continue;
            }
            if let Some(c) = patterns.func_re.captures(line) {
                functions.push(Symbol {
                    name: c[1].to_string(),
                    line: lineno,
                });
                continue;
            }
            if let Some(c) = patterns.type_re.captures(line) {
                types.push(Symbol {
                    name: c[1].to_string(),
                    line: lineno,
                });
                continue;
            }
            if let Some(c) = patterns.import_re.captures(line) {
                let spec = c
                    .iter()
                    .skip(1)
                    .find_map(|m| m.map(|m| m.as_str().to_string()));
                if let Some(spec) = spec {
                    imports.push(spec);
                }
            }
        }

        Some(Codemap {
            path: path.to_string(),
            language: language.tag().to_string(),
            classes,
            functions,
            types,
            imports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_languages() {
        assert_eq!(detect_language("a/b.rs"), Some(Language::Rust));
        assert_eq!(detect_language("a/b.tsx"), Some(Language::TypeScript));
        assert_eq!(detect_language("a/b.md"), None);
    }

    #[test]
    fn extracts_rust_functions_and_imports() {
        let extractor = HeuristicCodemapExtractor;
        let src = "use crate::foo::Bar;\npub fn run() {}\nstruct State;\n";
        let cm = extractor.extract("x.rs", Some(src)).unwrap();
        assert_eq!(cm.functions.len(), 1);
        assert_eq!(cm.functions[0].name, "run");
        assert_eq!(cm.classes[0].name, "State");
        assert!(!cm.imports.is_empty());
    }

    #[test]
    fn format_is_idempotent() {
        let extractor = HeuristicCodemapExtractor;
        let src = "function hello() {}\n";
        let cm = extractor.extract("x.js", Some(src)).unwrap();
        let a = format_codemap_compact(&cm);
        let b = format_codemap_compact(&cm);
        assert_eq!(a, b);
    }

    #[test]
    fn unsupported_extension_returns_none() {
        let extractor = HeuristicCodemapExtractor;
        assert!(extractor.extract("README.md", Some("# hi")).is_none());
    }
}
