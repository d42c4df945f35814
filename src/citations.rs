use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::Source;

static CITATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// Maximum number of characters shown in a citation preview.
pub const PREVIEW_LEN: usize = 200;

/// One piece of an assistant message after citation scanning. Plain segments
/// carry the original text verbatim; citation segments carry the resolved
/// source details for interactive display.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Plain(String),
    Citation(Citation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    /// The digits as they appeared between the brackets.
    pub label: String,
    /// 1-based position into the current source list.
    pub ordinal: usize,
    pub page: Option<u32>,
    pub similarity: f32,
    pub preview: String,
}

impl Citation {
    pub fn page_label(&self) -> String {
        match self.page {
            Some(page) => page.to_string(),
            None => "?".to_string(),
        }
    }

    /// Similarity as a percentage, one decimal place.
    pub fn similarity_percent(&self) -> String {
        format!("{:.1}", self.similarity * 100.0)
    }
}

/// Split assistant text into plain and citation segments.
///
/// Bracketed digits `[n]` resolve 1-based against `sources` in insertion
/// order. An ordinal with no matching source is kept as literal text, never
/// dropped. Pure and idempotent: concatenating the segments reproduces the
/// input exactly outside resolved markers.
pub fn render(text: &str, sources: &[Source]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in CITATION_RE.captures_iter(text) {
        let marker = caps.get(0).expect("regex match has a whole-match group");
        let digits = &caps[1];

        if marker.start() > last {
            segments.push(Segment::Plain(text[last..marker.start()].to_string()));
        }

        // Oversized or zero ordinals fall through to the literal branch.
        let ordinal = digits.parse::<usize>().ok();
        let resolved = ordinal
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| sources.get(index));

        match (ordinal, resolved) {
            (Some(n), Some(source)) => segments.push(Segment::Citation(Citation {
                label: digits.to_string(),
                ordinal: n,
                page: source.metadata.page,
                similarity: source.similarity,
                preview: preview(&source.content),
            })),
            _ => segments.push(Segment::Plain(marker.as_str().to_string())),
        }

        last = marker.end();
    }

    if last < text.len() {
        segments.push(Segment::Plain(text[last..].to_string()));
    }

    segments
}

/// 1-based position of a source by `id` within the current list. Used to
/// label the sources panel consistently with inline citation numbering.
pub fn citation_ordinal(sources: &[Source], source_id: i64) -> Option<usize> {
    sources.iter().position(|s| s.id == source_id).map(|i| i + 1)
}

fn preview(content: &str) -> String {
    let mut out: String = content.chars().take(PREVIEW_LEN).collect();
    if content.chars().nth(PREVIEW_LEN).is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceMetadata;

    fn source(id: i64, content: &str, page: Option<u32>, similarity: f32) -> Source {
        Source {
            id,
            content: content.to_string(),
            metadata: SourceMetadata {
                page,
                origin: None,
            },
            similarity,
        }
    }

    #[test]
    fn test_resolved_and_unresolved_markers() {
        let sources = vec![source(5, "Fat-soluble vitamins are stored in fatty tissues.", Some(45), 0.87)];
        let segments = render("Vitamin D helps. [1] Also check [9].", &sources);

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::Plain("Vitamin D helps. ".to_string()));
        match &segments[1] {
            Segment::Citation(c) => {
                assert_eq!(c.label, "1");
                assert_eq!(c.ordinal, 1);
                assert_eq!(c.page, Some(45));
                assert_eq!(c.similarity, 0.87);
                assert_eq!(c.preview, "Fat-soluble vitamins are stored in fatty tissues.");
            }
            other => panic!("expected citation, got {:?}", other),
        }
        assert_eq!(segments[2], Segment::Plain(" Also check ".to_string()));
        assert_eq!(segments[3], Segment::Plain("[9]".to_string()));
        assert_eq!(segments[4], Segment::Plain(".".to_string()));
    }

    #[test]
    fn test_no_markers_is_single_plain_segment() {
        let segments = render("No citations here.", &[]);
        assert_eq!(segments, vec![Segment::Plain("No citations here.".to_string())]);
    }

    #[test]
    fn test_empty_text() {
        assert!(render("", &[]).is_empty());
    }

    #[test]
    fn test_zero_and_oversized_ordinals_stay_literal() {
        let sources = vec![source(1, "a", None, 0.9)];
        let segments = render("[0] and [99999999999999999999999]", &sources);
        assert_eq!(segments[0], Segment::Plain("[0]".to_string()));
        assert_eq!(
            segments[2],
            Segment::Plain("[99999999999999999999999]".to_string())
        );
    }

    #[test]
    fn test_idempotent() {
        let sources = vec![
            source(1, "first", Some(1), 0.9),
            source(2, "second", Some(2), 0.8),
        ];
        let text = "A [1] b [2] c [3]";
        assert_eq!(render(text, &sources), render(text, &sources));
    }

    #[test]
    fn test_segments_reassemble_original_text() {
        let sources = vec![source(1, "first", Some(1), 0.9)];
        let text = "Start [1] middle [4] end.";
        let rebuilt: String = render(text, &sources)
            .iter()
            .map(|segment| match segment {
                Segment::Plain(s) => s.clone(),
                Segment::Citation(c) => format!("[{}]", c.label),
            })
            .collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_preview_truncates_at_200_chars() {
        let long = "x".repeat(250);
        let sources = vec![source(1, &long, None, 0.5)];
        let segments = render("[1]", &sources);
        match &segments[0] {
            Segment::Citation(c) => {
                assert_eq!(c.preview.len(), PREVIEW_LEN + 3);
                assert!(c.preview.ends_with("..."));
            }
            other => panic!("expected citation, got {:?}", other),
        }

        let exact = "y".repeat(PREVIEW_LEN);
        let sources = vec![source(1, &exact, None, 0.5)];
        match &render("[1]", &sources)[0] {
            Segment::Citation(c) => assert_eq!(c.preview, exact),
            other => panic!("expected citation, got {:?}", other),
        }
    }

    #[test]
    fn test_similarity_percent_rounds_to_one_decimal() {
        let c = Citation {
            label: "1".to_string(),
            ordinal: 1,
            page: None,
            similarity: 0.8765,
            preview: String::new(),
        };
        assert_eq!(c.similarity_percent(), "87.7");
        assert_eq!(c.page_label(), "?");
    }

    #[test]
    fn test_citation_ordinal_lookup() {
        let sources = vec![
            source(5, "a", None, 0.9),
            source(2, "b", None, 0.8),
        ];
        assert_eq!(citation_ordinal(&sources, 5), Some(1));
        assert_eq!(citation_ordinal(&sources, 2), Some(2));
        assert_eq!(citation_ordinal(&sources, 7), None);
    }
}
