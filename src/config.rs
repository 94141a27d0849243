//! Engine-internal tunables: strategy constants and intensity tables.
//!
//! Distinct from the project-wide configuration-file loader (out of
//! scope): this only resolves the slicer's own knobs, not a caller's whole
//! settings tree.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Lite,
    Standard,
    Deep,
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Standard
    }
}

/// Per-strategy (max_items, max_tokens) limits for one intensity level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntensityLimits {
    pub max_items: usize,
    pub max_tokens: usize,
    /// BFS depth cap; only meaningful for the `graph` strategy.
    pub graph_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenEstimatorConfig {
    pub chars_per_token: usize,
    pub max_file_bytes: u64,
}

impl Default for TokenEstimatorConfig {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            max_file_bytes: 512 * 1024,
        }
    }
}

/// `SKELETON_PATTERNS`: basenames recognized as entry points.
pub const SKELETON_PATTERNS: &[&str] = &["index.", "main.", "mod.", "lib."];

/// `SKELETON_DIRS`: path fragments that mark a directory as source-bearing.
pub const SKELETON_DIRS: &[&str] = &["src", "lib", "pkg", "cmd"];

/// `CONFIG_FILES`: manifests, lockfiles, and build/env templates.
pub const CONFIG_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "Cargo.toml",
    "Cargo.lock",
    "go.mod",
    "go.sum",
    "pyproject.toml",
    "requirements.txt",
    "Pipfile",
    "tsconfig.json",
    "jsconfig.json",
    "webpack.config.js",
    "vite.config.ts",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    ".env.example",
    ".env.template",
];

/// `isCodePath` extension set.
pub const CODE_EXTENSIONS: &[&str] = &[
    "ts", "js", "tsx", "jsx", "py", "rs", "go", "cpp", "c", "h", "hpp", "java", "rb", "php",
    "swift", "kt",
];

fn default_weights() -> HashMap<String, f64> {
    [
        ("skeleton", 0.90),
        ("keyword", 0.80),
        ("ast", 0.50),
        ("symbols", 0.55),
        ("graph", 0.50),
        ("config", 0.45),
        ("diff", 0.60),
        ("forest", 0.70),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// `STRATEGY_BUDGET_CAPS`: fractional caps of the global budget. Strategies
/// absent from this map get the full remaining budget as their cap (open
/// question, resolved that way — see DESIGN.md).
fn default_budget_caps() -> HashMap<String, f64> {
    [("forest", 0.25), ("diff", 0.10), ("graph", 0.15)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn default_intensity_table() -> HashMap<String, [IntensityLimits; 3]> {
    let mk = |items: [usize; 3], tokens: [usize; 3], depth: [usize; 3]| {
        [
            IntensityLimits {
                max_items: items[0],
                max_tokens: tokens[0],
                graph_depth: depth[0],
            },
            IntensityLimits {
                max_items: items[1],
                max_tokens: tokens[1],
                graph_depth: depth[1],
            },
            IntensityLimits {
                max_items: items[2],
                max_tokens: tokens[2],
                graph_depth: depth[2],
            },
        ]
    };
    let mut m = HashMap::new();
    m.insert(
        "ast".to_string(),
        mk([6, 12, 24], [usize::MAX; 3], [0, 0, 0]),
    );
    m.insert(
        "graph".to_string(),
        mk([6, 12, 20], [usize::MAX; 3], [1, 2, 3]),
    );
    m.insert(
        "symbols".to_string(),
        mk([6, 14, 24], [usize::MAX; 3], [0, 0, 0]),
    );
    m.insert(
        "skeleton".to_string(),
        mk([8, 16, 30], [usize::MAX; 3], [0, 0, 0]),
    );
    m.insert(
        "diff".to_string(),
        mk([6, 12, 20], [usize::MAX; 3], [0, 0, 0]),
    );
    m.insert(
        "config".to_string(),
        mk([usize::MAX; 3], [800, 1400, 2400], [0, 0, 0]),
    );
    m
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    pub token_estimator: TokenEstimatorConfig,
    pub strategy_weights: HashMap<String, f64>,
    pub strategy_budget_caps: HashMap<String, f64>,
    pub intensity_table: HashMap<String, [IntensityLimits; 3]>,
    /// ±N lines of context the `keyword` strategy attaches around each hit.
    pub keyword_context_lines: usize,
    /// Warning threshold default when a request omits one.
    pub default_warning_threshold: f64,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            token_estimator: TokenEstimatorConfig::default(),
            strategy_weights: default_weights(),
            strategy_budget_caps: default_budget_caps(),
            intensity_table: default_intensity_table(),
            keyword_context_lines: 3,
            default_warning_threshold: 0.9,
        }
    }
}

impl SlicerConfig {
    pub fn weight(&self, strategy: &str) -> f64 {
        self.strategy_weights.get(strategy).copied().unwrap_or(0.5)
    }

    pub fn budget_cap_fraction(&self, strategy: &str) -> Option<f64> {
        self.strategy_budget_caps.get(strategy).copied()
    }

    pub fn limits(&self, strategy: &str, intensity: Intensity) -> IntensityLimits {
        let idx = match intensity {
            Intensity::Lite => 0,
            Intensity::Standard => 1,
            Intensity::Deep => 2,
        };
        self.intensity_table
            .get(strategy)
            .map(|table| table[idx])
            .unwrap_or(IntensityLimits {
                max_items: 12,
                max_tokens: usize::MAX,
                graph_depth: 2,
            })
    }

    /// Reads an optional TOML file of overrides; any failure (missing file,
    /// bad syntax) falls back to defaults rather than failing the caller,
    /// mirroring this lineage's `load_config`.
    pub fn load(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&text).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "slicer_config_parse_failed");
            Self::default()
        })
    }
}
