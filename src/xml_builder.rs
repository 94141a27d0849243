//! XML rendering for the `xml` output format: a repository tree
//! block, sidecar blocks, then one tagged block per selected candidate.

use crate::model::SliceResult;
use anyhow::Result;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

fn crunch_text_for_cdata(input: &str) -> String {
    let mut trimmed = String::with_capacity(input.len());
    for part in input.split_inclusive('\n') {
        if let Some(line) = part.strip_suffix('\n') {
            trimmed.push_str(line.trim_end_matches([' ', '\t', '\r']));
            trimmed.push('\n');
        } else {
            trimmed.push_str(part.trim_end_matches([' ', '\t', '\r']));
        }
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_nl = false;
    for ch in trimmed.chars() {
        if ch == '\n' {
            if prev_nl {
                continue;
            }
            prev_nl = true;
            out.push('\n');
        } else {
            prev_nl = false;
            out.push(ch);
        }
    }

    out.trim_end().to_string()
}

pub fn build_context_xml(result: &SliceResult) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let root = BytesStart::new("context_slice");
    writer.write_event(Event::Start(root))?;

    if let Some((tree, tokens)) = &result.tree {
        let mut tree_el = BytesStart::new("repository_tree");
        tree_el.push_attribute(("tokens", tokens.to_string().as_str()));
        writer.write_event(Event::Start(tree_el))?;
        let text = crunch_text_for_cdata(tree);
        writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("repository_tree")))?;
    }

    for sidecar in &result.sidecars {
        let mut el = BytesStart::new("sidecar");
        el.push_attribute(("name", sidecar.name.as_str()));
        el.push_attribute(("tokens", sidecar.tokens.to_string().as_str()));
        writer.write_event(Event::Start(el))?;
        let text = crunch_text_for_cdata(&sidecar.payload);
        writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("sidecar")))?;
    }

    for candidate in &result.selected {
        let mut el = BytesStart::new("file");
        el.push_attribute(("path", candidate.path.as_str()));
        el.push_attribute(("strategy", candidate.strategy.as_str()));
        let representation = format!("{:?}", candidate.representation).to_lowercase();
        el.push_attribute(("representation", representation.as_str()));
        let score = format!("{:.4}", candidate.score);
        el.push_attribute(("score", score.as_str()));
        let tokens = candidate.tokens.to_string();
        el.push_attribute(("tokens", tokens.as_str()));
        writer.write_event(Event::Start(el))?;
        let text = crunch_text_for_cdata(&candidate.payload);
        writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("file")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("context_slice")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Representation, SliceCandidate};

    #[test]
    fn renders_candidate_attributes() {
        let result = SliceResult {
            selected: vec![SliceCandidate::new(
                "keyword",
                "src/lib.rs",
                Representation::Snippet,
                "fn run() {}".to_string(),
                5,
                0.75,
                "hit",
                "keyword",
                vec![],
            )],
            sidecars: vec![],
            tree: None,
            total_tokens: 5,
            budget_tokens: 100,
            warnings: vec![],
        };
        let xml = build_context_xml(&result).unwrap();
        assert!(xml.contains(r#"path="src/lib.rs""#));
        assert!(xml.contains(r#"strategy="keyword""#));
        assert!(xml.contains(r#"representation="snippet""#));
    }
}
