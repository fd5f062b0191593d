//! Genome browser links for the ant and bee genome databases

use super::resolver::{standard_link, LinkContext, LinkRule, RetrievableIds};
use crate::blast::links::sinv_uniprot_url;
use crate::utils::url::UrlBuilder;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// How the browser landmark is derived from a matched identifier.
#[derive(Debug, Clone, Copy)]
enum Landmark {
    /// First capture, suffixed with the hit's coordinate span.
    Span,
    /// Atta cephalotes gene models: first capture minus `EP_000`.
    AcepGene,
    /// Numbered gene model: `<prefix><capture>-RA`.
    Gene(&'static str),
    /// Fire ant gene models, located through their scaffold.
    Sinv,
}

struct Track {
    pattern: Regex,
    track: &'static str,
    landmark: Landmark,
}

fn track(pattern: &str, track: &'static str, landmark: Landmark) -> Track {
    Track {
        pattern: Regex::new(pattern).unwrap(),
        track,
        landmark,
    }
}

lazy_static! {
    static ref TRACKS: Vec<Track> = vec![
        track(r"^lcl\|(PB.*-RA) ", "pbarbatus_1", Landmark::Span),
        track(r"^lcl\|pbar_(scf\d*) ", "pbarbatus_1", Landmark::Span),
        track(r"lcl\|SI2.2.0", "sinvicta_1", Landmark::Sinv),
        track(r"^lcl\|(Si_gnF.scaffold\d*) ", "sinvicta_1", Landmark::Span),
        track(r"^lcl\|(LH\d*-RA) ", "lhumile_1", Landmark::Span),
        track(r"^lcl\|(scf\d*) ", "lhumile_1", Landmark::Span),
        track(r"^lcl\|(ACEP_\d*-RA) ", "acephalotes_1", Landmark::AcepGene),
        track(r"^lcl\|Acep_(scaffold\d*) ", "acephalotes_1", Landmark::Span),
        track(r"^lcl\|Cflo_(\d*)--", "cfloridanus_1", Landmark::Gene("CFLO")),
        track(
            r"^lcl\|Cflo_gn3.3_((scaffold\d*)|(C\d*)) ",
            "cfloridanus_1",
            Landmark::Span
        ),
        track(r"^lcl\|Hsal_(\d*)--", "hsaltator_1", Landmark::Gene("HSAL")),
        track(
            r"^lcl\|Hsal_gn3.3_((scaffold\d*)|(C\d*)) ",
            "hsaltator_1",
            Landmark::Span
        ),
    ];
    static ref SINV_LOCUS: Regex = Regex::new(r"locus=(Si_gnF.scaffold\d*)\[").unwrap();
}

/// Rewrites hit headers from the hosted hymenopteran genomes so they link
/// both to sequence retrieval and to the matching genome browser track.
#[derive(Debug, Clone)]
pub struct GenomeBrowserRule {
    base_url: String,
    uniprot_sinv: BTreeMap<String, String>,
}

impl GenomeBrowserRule {
    pub fn new(base_url: impl Into<String>, uniprot_sinv: BTreeMap<String, String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            uniprot_sinv,
        }
    }

    fn browser_url(&self, track: &str, landmark: &str) -> String {
        format!("{}/{}/?name={}", self.base_url, track, landmark)
    }

    fn landmark(&self, track: &Track, captures: &Captures<'_>, ctx: &LinkContext<'_>) -> Option<String> {
        let first = || captures.get(1).map(|m| m.as_str());

        match track.landmark {
            Landmark::Span => {
                let name = first()?;
                Some(match ctx.coordinate_span() {
                    Some(span) => format!("{}:{}", name, span),
                    None => name.to_string(),
                })
            }
            Landmark::AcepGene => Some(first()?.replace("EP_000", "")),
            Landmark::Gene(prefix) => Some(format!("{}{}-RA", prefix, first()?)),
            Landmark::Sinv => SINV_LOCUS
                .captures(ctx.sequence_id)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }
}

impl LinkRule for GenomeBrowserRule {
    fn name(&self) -> &str {
        "genome-browser"
    }

    fn whole_line(
        &self,
        ctx: &LinkContext<'_>,
        urls: &dyn UrlBuilder,
        ids: &mut RetrievableIds,
    ) -> Option<String> {
        let (track, landmark) = TRACKS.iter().find_map(|track| {
            let captures = track.pattern.captures(ctx.sequence_id)?;
            Some((track, self.landmark(track, &captures, ctx)?))
        })?;

        let retrieval = standard_link(ctx, ids)?;
        let mut line = format!(
            "><a href='{}'>{}</a> [<a href='{}'>Genome Browser</a>]",
            urls.absolute(&retrieval),
            ctx.sequence_id,
            self.browser_url(track.track, &landmark)
        );

        if let Landmark::Sinv = track.landmark {
            if let Some(uniprot) = sinv_uniprot_url(ctx.sequence_id, &self.uniprot_sinv) {
                line.push_str(&format!(" [<a href='{}'>Uniprot</a>]", uniprot));
            }
        }

        Some(line)
    }
}
