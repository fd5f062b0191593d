//! Hyperlinks for hit header lines
//!
//! Resolution tries, in order: every registered rule's whole-line
//! replacement, every registered rule's link target, then the standard
//! same-site retrieval link. A header nothing can link is returned as it was.

use crate::core::database::LOCAL_ID_PREFIX;
use crate::utils::url::UrlBuilder;
use serde::Serialize;
use tracing::{debug, warn};

/// What a rule gets to see about one hit header.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Header text after the leading `>`.
    pub sequence_id: &'a str,
    /// Database names the search ran against.
    pub databases: &'a [String],
    /// Smallest and largest subject coordinate among the hit's alignments.
    pub hit_coordinates: Option<(i64, i64)>,
}

impl LinkContext<'_> {
    /// `min..max` of the hit coordinates.
    pub fn coordinate_span(&self) -> Option<String> {
        self.hit_coordinates
            .map(|(start, stop)| format!("{}..{}", start, stop))
    }
}

/// Identifiers that can be fetched from the searched databases, in the order
/// they were linked. Re-linking the same header appends it again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetrievableIds {
    ids: Vec<String>,
}

impl RetrievableIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ids
    }
}

/// Source-specific linking for hit headers.
///
/// Both hooks default to "not applicable", so a rule only implements the one
/// it needs.
pub trait LinkRule: Send + Sync {
    fn name(&self) -> &str;

    /// A complete replacement for the header line.
    fn whole_line(
        &self,
        _ctx: &LinkContext<'_>,
        _urls: &dyn UrlBuilder,
        _ids: &mut RetrievableIds,
    ) -> Option<String> {
        None
    }

    /// Site-relative target for the standard anchor.
    fn link(&self, _ctx: &LinkContext<'_>, _ids: &mut RetrievableIds) -> Option<String> {
        None
    }
}

/// Same-site retrieval link for identifiers with the local prefix. The
/// bare identifier is recorded as retrievable.
pub fn standard_link(ctx: &LinkContext<'_>, ids: &mut RetrievableIds) -> Option<String> {
    let id = ctx
        .sequence_id
        .strip_prefix(LOCAL_ID_PREFIX)?
        .split(char::is_whitespace)
        .next()
        .unwrap_or_default();

    ids.push(id);
    Some(format!(
        "/get_sequence/?id={}&db={}",
        id,
        ctx.databases.join(" ")
    ))
}

pub struct HyperlinkResolver {
    rules: Vec<Box<dyn LinkRule>>,
    urls: Box<dyn UrlBuilder>,
}

impl HyperlinkResolver {
    pub fn new(urls: impl UrlBuilder + 'static) -> Self {
        Self {
            rules: Vec::new(),
            urls: Box::new(urls),
        }
    }

    /// Register a rule. Rules are consulted in registration order.
    pub fn with_rule(mut self, rule: impl LinkRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn urls(&self) -> &dyn UrlBuilder {
        self.urls.as_ref()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Linked replacement for a `>` header line, or the line itself when no
    /// link applies.
    pub fn resolve(
        &self,
        line: &str,
        databases: &[String],
        hit_coordinates: Option<(i64, i64)>,
        ids: &mut RetrievableIds,
    ) -> String {
        let sequence_id = line.strip_prefix('>').unwrap_or(line);
        let ctx = LinkContext {
            sequence_id,
            databases,
            hit_coordinates,
        };

        for rule in &self.rules {
            if let Some(replacement) = rule
                .whole_line(&ctx, self.urls(), ids)
                .filter(|l| !l.is_empty())
            {
                debug!("{} rewrote header for {}", rule.name(), sequence_id);
                return replacement;
            }
        }

        let link = self
            .rules
            .iter()
            .find_map(|rule| {
                rule.link(&ctx, ids).map(|link| {
                    debug!("{} linked {}", rule.name(), sequence_id);
                    link
                })
            })
            .or_else(|| standard_link(&ctx, ids));

        match link {
            Some(link) => {
                debug!("Added link for {}: {}", sequence_id, link);
                format!(
                    "><a href='{}' target='_blank'>{}</a> ",
                    self.urls.absolute(&link),
                    sequence_id
                )
            }
            None => {
                warn!("Unable to parse sequence id `{}'", sequence_id);
                line.to_string()
            }
        }
    }
}
