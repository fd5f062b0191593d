//! Outbound links shown next to each hit

use super::report::Hit;
use crate::core::database::Database;
use crate::utils::url::{encode_component, UrlBuilder};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

const ENSEMBL_SPECIES: [&str; 4] = [
    "Apis_mellifera",
    "Atta_cephalotes",
    "Solenopsis_invicta",
    "Nasonia_vitripennis",
];

/// Species directory to Hymenopterabase assembly name.
const HYMENOPTERABASE_ASSEMBLIES: [(&str, &str); 13] = [
    ("Apis_mellifera", "Amel_4.5"),
    ("Lasioglossum_albipes", "Lalb_v2"),
    ("Bombus_impatiens", "Bimp_2.0_NCBI"),
    ("Bombus_terrestris", "Bter_1.0"),
    ("Nasonia_vitripennis", "Nvit_2.0"),
    ("Acromyrmex_echinatior", "Aech_2.0"),
    ("Atta_cephalotes", "Acep_1.0"),
    ("Camponotus_floridanus", "Cflo_3.3"),
    ("Cardiocondyle_obscurior", "Cobs_1.4"),
    ("Harpeganthos_saltator", "Hsal_3.3"),
    ("Linepithema_humile", "Lhum_1.0"),
    ("Pogonymex_barbatus", "Pbar_1.0"),
    ("Solenopsis_invicta", "Sinv_1."),
];

lazy_static! {
    static ref NCBI_ID: Regex = Regex::new(r"gi\|(\d+)\|").unwrap();
    static ref UNIPROT_ID: Regex = Regex::new(r"sp\|(\w+)\|").unwrap();
    static ref SINV_ID: Regex = Regex::new(r"SI2.2.0_(\d*)").unwrap();
    static ref SCAFFOLD: Regex = Regex::new(r"[^\s\\]*[a-z][0-9]{1,100}").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitLink {
    pub order: u32,
    pub title: String,
    pub url: String,
    pub class: Option<String>,
    pub icon: Option<String>,
}

impl HitLink {
    fn external(order: u32, title: &str, url: String) -> Self {
        Self {
            order,
            title: title.to_string(),
            url,
            class: None,
            icon: Some("fa-external-link".to_string()),
        }
    }
}

/// Everything a link generator may look at.
pub struct LinkInputs<'a> {
    pub hit: &'a Hit,
    /// Databases the search ran against, in submission order.
    pub databases: &'a [Database],
    pub urls: &'a dyn UrlBuilder,
    /// SINV_<n> key to UniProt accession.
    pub uniprot_sinv: &'a BTreeMap<String, String>,
}

/// All applicable links for a hit, sorted by `order`.
pub fn hit_links(inputs: &LinkInputs<'_>) -> Vec<HitLink> {
    let mut links: Vec<HitLink> = [
        sequence_viewer(inputs),
        fasta_download(inputs),
        hymenoptera_base(inputs),
        ensembl(inputs),
        uniprot_sinv(inputs),
        ncbi(inputs),
        uniprot(inputs),
    ]
    .into_iter()
    .flatten()
    .collect();

    links.sort_by_key(|link| link.order);
    links
}

fn retrieval_path(inputs: &LinkInputs<'_>) -> String {
    let ids: Vec<&str> = inputs.databases.iter().map(|db| db.id.as_str()).collect();
    format!(
        "get_sequence/?sequence_ids={}&database_ids={}",
        encode_component(&inputs.hit.accession),
        encode_component(&ids.join(" "))
    )
}

fn sequence_viewer(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    Some(HitLink {
        order: 0,
        title: "Sequence".to_string(),
        url: inputs.urls.absolute(&retrieval_path(inputs)),
        class: Some("view-sequence".to_string()),
        icon: Some("fa-eye".to_string()),
    })
}

fn fasta_download(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    Some(HitLink {
        order: 1,
        title: "FASTA".to_string(),
        url: inputs
            .urls
            .absolute(&format!("{}&download=fasta", retrieval_path(inputs))),
        class: Some("download".to_string()),
        icon: Some("fa-download".to_string()),
    })
}

/// Species, scaffold name and subject span used by the genome browsers.
fn genome_location<'a>(inputs: &'a LinkInputs<'_>) -> Option<(&'a str, &'a str, i64, i64)> {
    let species = inputs.databases.first()?.species()?;
    let scaffold = SCAFFOLD.find(&inputs.hit.definition)?.as_str();
    let (start, stop) = inputs.hit.subject_span()?;
    Some((species, scaffold, start, stop))
}

fn hymenoptera_base(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    let (species, scaffold, start, stop) = genome_location(inputs)?;
    let (_, assembly) = HYMENOPTERABASE_ASSEMBLIES
        .iter()
        .find(|(name, _)| *name == species)?;

    Some(HitLink::external(
        2,
        "Hymenopterabase",
        format!(
            "http://hymenopteragenome.org:8080/{}/jbrowse/?loc={}:{}..{}",
            assembly, scaffold, start, stop
        ),
    ))
}

fn ensembl(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    let (species, scaffold, start, stop) = genome_location(inputs)?;
    if !ENSEMBL_SPECIES.contains(&species) {
        return None;
    }

    Some(HitLink::external(
        2,
        "Ensembl",
        format!(
            "http://metazoa.ensembl.org/{}/Location/View?r={}:{}-{}",
            species, scaffold, start, stop
        ),
    ))
}

/// UniProt page for a fire ant `SI2.2.0_<n>` identifier, if the accession
/// table knows it.
pub fn sinv_uniprot_url(id: &str, table: &BTreeMap<String, String>) -> Option<String> {
    let number = SINV_ID.captures(id)?.get(1)?.as_str();
    let accession = table.get(&format!("SINV_{}", number))?;
    Some(format!("http://www.uniprot.org/uniprot/{}", accession))
}

fn uniprot_sinv(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    let url = sinv_uniprot_url(&inputs.hit.id, inputs.uniprot_sinv)?;
    Some(HitLink::external(3, "UniProt", url))
}

fn ncbi(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    let gi = NCBI_ID.captures(&inputs.hit.id)?.get(1)?.as_str();
    let kind = inputs.databases.first()?.kind.as_str();
    Some(HitLink::external(
        3,
        "NCBI",
        format!(
            "http://www.ncbi.nlm.nih.gov/{}/{}",
            kind,
            encode_component(gi)
        ),
    ))
}

fn uniprot(inputs: &LinkInputs<'_>) -> Option<HitLink> {
    let accession = UNIPROT_ID.captures(&inputs.hit.id)?.get(1)?.as_str();
    Some(HitLink::external(
        3,
        "UniProt",
        format!(
            "http://www.uniprot.org/uniprot/{}",
            encode_component(accession)
        ),
    ))
}
