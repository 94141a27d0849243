//! Keyword extraction: tokenize the task text, drop stopwords and
//! short tokens, de-duplicate preserving first occurrence, cap at 20.

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "else", "for", "to", "of", "in", "on",
    "at", "by", "with", "from", "into", "that", "this", "these", "those", "is", "are", "was",
    "were", "be", "been", "being", "it", "its", "as", "not", "can", "will", "would", "should",
    "could", "do", "does", "did", "has", "have", "had", "you", "your", "we", "our", "i", "me",
    "my", "they", "them", "their", "how", "what", "when", "where", "why", "which", "who", "all",
    "any", "some", "about", "also", "just", "so", "up", "out", "now", "please", "need", "want",
];

const MAX_KEYWORDS: usize = 20;
const MIN_LEN: usize = 3;

pub fn extract_keywords(task: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for raw in task.split(|c: char| !c.is_alphanumeric()) {
        if out.len() >= MAX_KEYWORDS {
            break;
        }
        if raw.is_empty() {
            continue;
        }
        let lower = raw.to_lowercase();
        if lower.len() < MIN_LEN {
            continue;
        }
        if STOPWORDS.contains(&lower.as_str()) {
            continue;
        }
        if seen.insert(lower.clone()) {
            out.push(lower);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_short_tokens() {
        let kws = extract_keywords("fix the bug in authentication for my app");
        assert_eq!(kws, vec!["fix", "bug", "authentication", "app"]);
    }

    #[test]
    fn dedupes_preserving_first_occurrence() {
        let kws = extract_keywords("login login session login");
        assert_eq!(kws, vec!["login", "session"]);
    }

    #[test]
    fn caps_at_twenty() {
        let task: String = (0..30).map(|i| format!("word{i:02} ")).collect();
        let kws = extract_keywords(&task);
        assert_eq!(kws.len(), 20);
    }

    #[test]
    fn empty_task_yields_no_keywords() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("to of in").is_empty());
    }
}
