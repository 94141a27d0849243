//! The slicer's data model: `SliceRequest`, `SliceCandidate`, `SlicePlan`,
//! `SliceResult`, and the invariants that tie them together.

use crate::config::Intensity;
use crate::error::Warning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCap {
    pub max_items: Option<usize>,
    pub max_tokens: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SliceRequest {
    pub task: String,
    pub repo_root: PathBuf,
    pub budget_tokens: usize,
    pub warning_threshold: Option<f64>,
    pub intensity: Intensity,
    pub strategy_intensity: HashMap<String, Intensity>,
    pub strategy_caps: HashMap<String, StrategyCap>,
    /// `None` means "all available strategies run".
    pub strategies: Option<Vec<String>>,
    pub include_tree: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Cap on the number of emitted candidates after selection. `0` means
    /// unbounded, so `SliceRequest::default()` doesn't silently select
    /// nothing.
    pub max_results: usize,
}

impl SliceRequest {
    pub fn intensity_for(&self, strategy: &str) -> Intensity {
        self.strategy_intensity
            .get(strategy)
            .copied()
            .unwrap_or(self.intensity)
    }

    pub fn warning_threshold(&self) -> f64 {
        self.warning_threshold.unwrap_or(0.9)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.task.trim().is_empty() {
            return Err("task must not be empty".to_string());
        }
        // budgetTokens == 0 is a valid request: it
        // yields an empty selection plus a budget_exceeded warning, not a
        // rejected request.
        if let Some(t) = self.warning_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err("warningThreshold must be in [0, 1]".to_string());
            }
        }
        Ok(())
    }
}

impl Default for StrategyCap {
    fn default() -> Self {
        Self {
            max_items: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    Full,
    Snippet,
    Codemap,
    Reference,
}

impl Representation {
    /// Decreasing order of information content, used to order `alternates`.
    pub fn rank(self) -> u8 {
        match self {
            Representation::Full => 0,
            Representation::Snippet => 1,
            Representation::Codemap => 2,
            Representation::Reference => 3,
        }
    }
}

/// One entry in a candidate's downgrade ladder: a
/// representation, its pre-computed token cost, and its rendered payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternate {
    pub representation: Representation,
    pub tokens: usize,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceCandidate {
    pub id: String,
    pub path: String,
    pub strategy: String,
    pub representation: Representation,
    pub score: f64,
    pub tokens: usize,
    pub reason: String,
    pub source: String,
    pub payload: String,
    /// Ordered most-detailed to least-detailed, always ending in `reference`.
    pub alternates: Vec<Alternate>,
}

impl SliceCandidate {
    pub fn new(
        strategy: &str,
        path: &str,
        representation: Representation,
        payload: String,
        tokens: usize,
        score: f64,
        reason: impl Into<String>,
        source: impl Into<String>,
        mut alternates: Vec<Alternate>,
    ) -> Self {
        alternates.sort_by_key(|a| a.representation.rank());
        Self {
            id: format!("{strategy}:{path}"),
            path: path.to_string(),
            strategy: strategy.to_string(),
            representation,
            score: score.max(0.0),
            tokens,
            reason: reason.into(),
            source: source.into(),
            payload,
            alternates,
        }
    }

    /// Finds the best alternate whose tokens fit within `limit`, scanning
    /// from most- to least-detailed, skipping the currently-chosen
    /// representation (downgrade step).
    pub fn best_fit_alternate(&self, limit: usize) -> Option<&Alternate> {
        self.alternates
            .iter()
            .filter(|a| a.representation != self.representation)
            .find(|a| a.tokens <= limit)
    }

    pub fn apply_alternate(&mut self, alt: &Alternate) {
        self.representation = alt.representation;
        self.tokens = alt.tokens;
        self.payload = alt.payload.clone();
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategyTotal {
    pub tokens: usize,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct Sidecar {
    pub name: String,
    pub payload: String,
    pub tokens: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SlicePlan {
    pub candidates: Vec<SliceCandidate>,
    pub strategy_totals: HashMap<String, StrategyTotal>,
    pub warnings: Vec<Warning>,
    /// Stable insertion order matters for the packager and for selector
    /// reverse-order dropping.
    pub sidecars: Vec<Sidecar>,
    pub tree: Option<(String, usize)>,
    pub total_tokens: usize,
    pub budget_tokens: usize,
    pub max_results: usize,
    pub warning_threshold: f64,
}

impl SlicePlan {
    /// Rejects `(strategy, path)` duplicates; returns `true`
    /// if the candidate was newly added.
    pub fn push_candidate(&mut self, candidate: SliceCandidate) -> bool {
        if self
            .candidates
            .iter()
            .any(|c| c.strategy == candidate.strategy && c.path == candidate.path)
        {
            return false;
        }
        let total = self
            .strategy_totals
            .entry(candidate.strategy.clone())
            .or_default();
        total.tokens += candidate.tokens;
        total.count += 1;
        self.candidates.push(candidate);
        true
    }
}

#[derive(Debug, Clone)]
pub struct SliceResult {
    pub selected: Vec<SliceCandidate>,
    pub sidecars: Vec<Sidecar>,
    pub tree: Option<(String, usize)>,
    pub total_tokens: usize,
    pub budget_tokens: usize,
    pub warnings: Vec<Warning>,
}
