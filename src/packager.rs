//! Packager: the three output formats a `SliceResult` can be
//! rendered to. An unrecognized format tag is the one place in the pipeline
//! that produces a fatal error rather than a warning.

use crate::error::{Result, SlicerError};
use crate::model::SliceResult;
use crate::xml_builder::build_context_xml;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "xml" => Ok(OutputFormat::Xml),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(SlicerError::UnknownFormat(other.to_string())),
        }
    }
}

pub fn package(result: &SliceResult, format: OutputFormat) -> Result<String> {
    tracing::info!(?format, selected = result.selected.len(), "packager_render");
    match format {
        OutputFormat::Xml => build_context_xml(result).map_err(SlicerError::Internal),
        OutputFormat::Markdown => Ok(package_markdown(result)),
        OutputFormat::Json => package_json(result),
    }
}

fn package_markdown(result: &SliceResult) -> String {
    let mut out = String::new();

    if let Some((tree, tokens)) = &result.tree {
        out.push_str(&format!("## Repository tree ({tokens} tokens)\n\n```\n{tree}\n```\n\n"));
    }

    for sidecar in &result.sidecars {
        out.push_str(&format!(
            "## Sidecar: {} ({} tokens)\n\n```\n{}\n```\n\n",
            sidecar.name, sidecar.tokens, sidecar.payload
        ));
    }

    for candidate in &result.selected {
        let representation = format!("{:?}", candidate.representation).to_lowercase();
        out.push_str(&format!(
            "## {} — {} / {} ({} tokens, score {:.3})\n\n```\n{}\n```\n\n",
            candidate.path, candidate.strategy, representation, candidate.tokens, candidate.score, candidate.payload
        ));
    }

    out
}

#[derive(Serialize)]
struct JsonCandidate<'a> {
    path: &'a str,
    strategy: &'a str,
    representation: String,
    score: f64,
    tokens: usize,
    reason: &'a str,
    payload: &'a str,
}

#[derive(Serialize)]
struct JsonSidecar<'a> {
    name: &'a str,
    tokens: usize,
    payload: &'a str,
}

#[derive(Serialize)]
struct JsonTree<'a> {
    content: &'a str,
    tokens: usize,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    tree: Option<JsonTree<'a>>,
    sidecars: Vec<JsonSidecar<'a>>,
    selected: Vec<JsonCandidate<'a>>,
    total_tokens: usize,
    budget_tokens: usize,
}

fn package_json(result: &SliceResult) -> Result<String> {
    let output = JsonOutput {
        tree: result
            .tree
            .as_ref()
            .map(|(content, tokens)| JsonTree { content, tokens: *tokens }),
        sidecars: result
            .sidecars
            .iter()
            .map(|s| JsonSidecar {
                name: &s.name,
                tokens: s.tokens,
                payload: &s.payload,
            })
            .collect(),
        selected: result
            .selected
            .iter()
            .map(|c| JsonCandidate {
                path: &c.path,
                strategy: &c.strategy,
                representation: format!("{:?}", c.representation).to_lowercase(),
                score: c.score,
                tokens: c.tokens,
                reason: &c.reason,
                payload: &c.payload,
            })
            .collect(),
        total_tokens: result.total_tokens,
        budget_tokens: result.budget_tokens,
    };
    serde_json::to_string_pretty(&output).map_err(|err| SlicerError::Internal(err.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Representation, SliceCandidate};

    fn sample_result() -> SliceResult {
        SliceResult {
            selected: vec![SliceCandidate::new(
                "config",
                "Cargo.toml",
                Representation::Full,
                "[package]\nname = \"x\"\n".to_string(),
                10,
                0.4,
                "recognized configuration file",
                "config",
                vec![],
            )],
            sidecars: vec![],
            tree: None,
            total_tokens: 10,
            budget_tokens: 1000,
            warnings: vec![],
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(OutputFormat::parse("yaml").is_err());
    }

    #[test]
    fn markdown_contains_fenced_candidate() {
        let md = package_markdown(&sample_result());
        assert!(md.contains("Cargo.toml"));
        assert!(md.contains("```"));
    }

    #[test]
    fn json_round_trips_through_serde() {
        let json = package_json(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["selected"][0]["path"], "Cargo.toml");
    }
}
