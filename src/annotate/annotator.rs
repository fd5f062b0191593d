//! Rewrites the search tool's own HTML report into the results document
//!
//! Lines are classified by position first and content second:
//!
//! | lines       | treatment                                           |
//! |-------------|-----------------------------------------------------|
//! | 1..=5       | dropped                                             |
//! | 6..=15      | reference block, moved to the end of the document   |
//! | 16..        | database summary, up to and including "total letters" |
//! | after that  | body scan                                           |
//!
//! The body scan never fails: anything it does not recognise is copied
//! through unchanged.

use super::resolver::{HyperlinkResolver, RetrievableIds};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

const PREAMBLE_END: usize = 5;
const REFERENCE_END: usize = 15;

lazy_static! {
    static ref DROPPED: Regex = Regex::new(r"^</BODY>|^</HTML>|^</PRE>").unwrap();
    static ref SCRIPT_INCLUDE: Regex =
        Regex::new(r#"^<script src="blastResult.js"></script>"#).unwrap();
    static ref ANCHOR_AFTER_ID: Regex = Regex::new(r"^>(.+)(<a.*></a>)(.*)").unwrap();
    static ref ANCHOR_BEFORE_ID: Regex = Regex::new(r"^>(<a.*></a>)(.*)").unwrap();
    static ref NEW_QUERY: Regex = Regex::new(r"^(?:<b>)?Query=(?:</b>)?\s*(.*)").unwrap();
    static ref DATABASE_LINE: Regex = Regex::new(r"^  Database: ").unwrap();
}

/// The finished results document.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedDocument {
    pub html: String,
    pub retrievable_ids: RetrievableIds,
}

impl AnnotatedDocument {
    pub fn retrievable_count(&self) -> usize {
        self.retrievable_ids.len()
    }
}

/// What the body is currently wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Nothing,
    Query,
    Summary,
}

impl Open {
    fn closing_tags(self) -> &'static str {
        match self {
            Open::Nothing => "",
            Open::Query => "</pre></div>\n",
            Open::Summary => "</pre>\n",
        }
    }
}

pub struct LineAnnotator<'a> {
    resolver: &'a HyperlinkResolver,
}

impl<'a> LineAnnotator<'a> {
    pub fn new(resolver: &'a HyperlinkResolver) -> Self {
        Self { resolver }
    }

    pub fn annotate(&self, report: &str, databases: &[String]) -> AnnotatedDocument {
        let lines: Vec<&str> = report.lines().collect();
        self.annotate_lines(&lines, databases)
    }

    pub fn annotate_lines(&self, lines: &[&str], databases: &[String]) -> AnnotatedDocument {
        let mut ids = RetrievableIds::new();
        let mut reference: Vec<&str> = Vec::new();
        let mut summary: Vec<&str> = Vec::new();
        let mut summary_done = false;
        let mut alignments_done = false;
        let mut open = Open::Nothing;
        let mut queries = 0usize;
        let mut body = String::new();

        for (index, &raw) in lines.iter().enumerate() {
            let line_number = index + 1;

            if line_number <= PREAMBLE_END {
                continue;
            }
            if line_number <= REFERENCE_END {
                reference.push(raw);
                continue;
            }
            if !summary_done {
                summary.push(raw);
                summary_done = raw.contains("total letters");
                continue;
            }

            if DROPPED.is_match(raw) {
                continue;
            }
            let line = SCRIPT_INCLUDE.replace(raw, "");

            if line.starts_with('>') {
                let line = relocate_anchor(&line);
                let coordinates = hit_coordinates(lines, index);
                body.push_str(&self.resolver.resolve(&line, databases, coordinates, &mut ids));
                body.push('\n');
                continue;
            }

            if let Some(captures) = NEW_QUERY.captures(&line) {
                let query = captures.get(1).map_or("", |m| m.as_str().trim());
                body.push_str(open.closing_tags());
                body.push_str(&format!(
                    "<div class=\"resultn\" id=\"{}\">\n<h3>Query= {}</h3><pre>\n",
                    query, query
                ));
                open = Open::Query;
                queries += 1;
                continue;
            }

            if !alignments_done && DATABASE_LINE.is_match(&line) {
                body.push_str(open.closing_tags());
                body.push_str(&format!("<pre>{}\n\n", summary.join("\n")));
                open = Open::Summary;
                alignments_done = true;
            }

            body.push_str(&line);
            body.push('\n');
        }

        body.push_str(open.closing_tags());

        debug!(
            "Annotated {} queries, {} retrievable hit(s)",
            queries,
            ids.len()
        );

        let mut html = String::from("<h2>Results</h2>");
        if !ids.is_empty() {
            let path = format!(
                "/get_sequence/?id={}&db={}",
                ids.as_slice().join(" "),
                databases.join(" ")
            );
            html.push_str(&format!(
                "<a href='{}'>FASTA of {} retrievable hit(s)</a>",
                self.resolver.urls().absolute(&path),
                ids.len()
            ));
        }
        html.push_str("<br/><br/>");
        html.push_str(&body);
        html.push_str("<br/>");
        html.push_str(&format!("<pre>{}</pre>", reference.join("\n").trim()));

        AnnotatedDocument {
            html,
            retrievable_ids: ids,
        }
    }
}

/// Move an identifier anchor the tool injected to the end of the header, in
/// either of the two shapes it writes.
fn relocate_anchor(line: &str) -> String {
    let moved = ANCHOR_AFTER_ID.replace(line, ">${1}${3}${2}");
    ANCHOR_BEFORE_ID.replace(&moved, ">${2}${1}").into_owned()
}

/// Smallest and largest subject coordinate in the alignments following the
/// header at `header`. The window ends at the next header or at the
/// statistics block, or at the end of input when neither appears.
pub fn hit_coordinates(lines: &[&str], header: usize) -> Option<(i64, i64)> {
    let window = lines.get(header + 1..)?;
    let end = window
        .iter()
        .position(|l| l.starts_with('>') || l.contains("Lambda"))
        .unwrap_or(window.len());

    window[..end]
        .iter()
        .filter(|l| l.contains("Sbjct"))
        .flat_map(|l| {
            let tokens: Vec<&str> = l.split_whitespace().collect();
            let first = tokens.get(1).and_then(|t| t.parse::<i64>().ok());
            let last = tokens.last().and_then(|t| t.parse::<i64>().ok());
            [first, last]
        })
        .flatten()
        .fold(None, |span, c| match span {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::url::RelativeUrl;

    #[test]
    fn test_relocate_anchor_after_id() {
        assert_eq!(
            relocate_anchor(">lcl|A1<a name=A1></a> some protein"),
            ">lcl|A1 some protein<a name=A1></a>"
        );
    }

    #[test]
    fn test_relocate_anchor_before_id() {
        assert_eq!(
            relocate_anchor("><a name=A1></a>lcl|A1 some protein"),
            ">lcl|A1 some protein<a name=A1></a>"
        );
        assert_eq!(relocate_anchor(">lcl|A1 plain"), ">lcl|A1 plain");
    }

    #[test]
    fn test_hit_coordinates_window() {
        let lines = vec![
            ">lcl|A1",
            "Query  1    ACGT  4",
            "Sbjct  300  ACGT  297",
            "Sbjct  120  ACGT  123",
            ">lcl|B2",
            "Sbjct  1    ACGT  9999",
        ];
        assert_eq!(hit_coordinates(&lines, 0), Some((120, 300)));
        assert_eq!(hit_coordinates(&lines, 4), Some((1, 9999)));
    }

    #[test]
    fn test_hit_coordinates_stop_at_statistics() {
        let lines = vec![">lcl|A1", "Sbjct  5  AC  6", "Lambda  K  H", "Sbjct  1  AC  900"];
        assert_eq!(hit_coordinates(&lines, 0), Some((5, 6)));
    }

    #[test]
    fn test_hit_coordinates_none_and_end_of_input() {
        let lines = vec![">lcl|A1", "no alignment lines"];
        assert_eq!(hit_coordinates(&lines, 0), None);
        assert_eq!(hit_coordinates(&lines, 1), None);
        assert_eq!(hit_coordinates(&lines, 5), None);
    }

    fn annotate(body: &[&str]) -> AnnotatedDocument {
        let resolver = HyperlinkResolver::new(RelativeUrl);
        let mut lines: Vec<String> = (1..=15).map(|n| format!("ref {}", n)).collect();
        lines.extend(body.iter().map(|l| l.to_string()));
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        LineAnnotator::new(&resolver).annotate_lines(&refs, &["nt".to_string()])
    }

    #[test]
    fn test_query_after_summary_closes_summary() {
        let doc = annotate(&[
            "  12 total letters",
            "Query= q1",
            "  Database: nt",
            "Query= q2",
            "tail",
        ]);
        assert!(doc.html.contains(
            "<pre>  12 total letters\n\n  Database: nt\n</pre>\n<div class=\"resultn\" id=\"q2\">"
        ));
        assert!(doc.html.contains("tail\n</pre></div>\n<br/>"));
        assert_eq!(doc.html.matches("<pre>").count(), doc.html.matches("</pre>").count());
    }

    #[test]
    fn test_short_input_only_reference() {
        let resolver = HyperlinkResolver::new(RelativeUrl);
        let annotator = LineAnnotator::new(&resolver);
        let lines: Vec<String> = (1..=8).map(|n| format!("line {}", n)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

        let doc = annotator.annotate_lines(&refs, &[]);
        assert_eq!(
            doc.html,
            "<h2>Results</h2><br/><br/><br/><pre>line 6\nline 7\nline 8</pre>"
        );
        assert_eq!(doc.retrievable_count(), 0);
    }
}
