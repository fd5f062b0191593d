//! Hyperlink annotation of the search tool's human-readable report

pub mod annotator;
pub mod resolver;
pub mod rules;

pub use annotator::{hit_coordinates, AnnotatedDocument, LineAnnotator};
pub use resolver::{standard_link, HyperlinkResolver, LinkContext, LinkRule, RetrievableIds};
pub use rules::GenomeBrowserRule;

use crate::core::config::LinksConfig;
use crate::utils::url::UrlBuilder;

/// Resolver with the standard link plus whatever the configuration enables.
pub fn resolver_from_config(urls: impl UrlBuilder + 'static, links: &LinksConfig) -> HyperlinkResolver {
    let resolver = HyperlinkResolver::new(urls);
    if links.genome_browser {
        resolver.with_rule(GenomeBrowserRule::new(
            links.browser_base_url.clone(),
            links.uniprot_sinv.clone(),
        ))
    } else {
        resolver
    }
}
