//! Typed BLAST report built from the flattened `-outfmt 5` tree
//!
//! The mapping is positional: BLAST+ writes its elements in a fixed order and
//! every position used below is listed in [`layout`] together with the element
//! name expected there. Any drift (missing slot, wrong element, non-numeric
//! text in a numeric field) aborts the whole build with
//! [`SeqServerError::Schema`]; a partially populated report is never returned.

use super::flatten::{flatten_children, FlatNode};
use super::stats;
use super::xml::{parse_xml, XmlNode};
use crate::{Result, SeqServerError};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Definition line BLAST+ prints when a sequence has none.
pub const NO_DEFINITION: &str = "No definition line";

/// Fixed element positions of the BLAST XML schema.
pub mod layout {
    /// `(position, element name)` within the enclosing flattened sequence.
    pub type Field = (usize, &'static str);

    pub const PROGRAM: Field = (0, "BlastOutput_program");
    pub const VERSION: Field = (1, "BlastOutput_version");
    pub const TARGET_DB: Field = (3, "BlastOutput_db");
    pub const PARAMETERS: Field = (7, "BlastOutput_param");
    pub const ITERATIONS: Field = (8, "BlastOutput_iterations");

    pub const ITERATION_NUM: Field = (0, "Iteration_iter-num");
    pub const QUERY_DEF: Field = (2, "Iteration_query-def");
    pub const QUERY_LEN: Field = (3, "Iteration_query-len");
    pub const ITERATION_HITS: Field = (4, "Iteration_hits");
    pub const ITERATION_STAT: Field = (5, "Iteration_stat");

    pub const HIT_NUM: Field = (0, "Hit_num");
    pub const HIT_ID: Field = (1, "Hit_id");
    pub const HIT_DEF: Field = (2, "Hit_def");
    pub const HIT_ACCESSION: Field = (3, "Hit_accession");
    pub const HIT_LEN: Field = (4, "Hit_len");
    pub const HIT_HSPS: Field = (5, "Hit_hsps");

    pub const HSP_FIELDS: [&str; 17] = [
        "Hsp_num",
        "Hsp_bit-score",
        "Hsp_score",
        "Hsp_evalue",
        "Hsp_query-from",
        "Hsp_query-to",
        "Hsp_hit-from",
        "Hsp_hit-to",
        "Hsp_query-frame",
        "Hsp_hit-frame",
        "Hsp_identity",
        "Hsp_positive",
        "Hsp_gaps",
        "Hsp_align-len",
        "Hsp_qseq",
        "Hsp_hseq",
        "Hsp_midline",
    ];

    /// HSP positions coerced to integers.
    pub const HSP_INTEGER_FIELDS: [usize; 12] = [0, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
    /// HSP positions coerced to reals.
    pub const HSP_REAL_FIELDS: [usize; 2] = [1, 3];

    pub const HSP_QSEQ: usize = 14;
    pub const HSP_HSEQ: usize = 15;
    pub const HSP_MIDLINE: usize = 16;

    pub fn hsp(index: usize) -> Field {
        (index, HSP_FIELDS[index])
    }
}

use layout::Field;

/// Number of search statistics BLAST+ reports per query.
pub const STAT_KEYS: [&str; 7] = [
    "db-num",
    "db-len",
    "hsp-len",
    "eff-space",
    "kappa",
    "lambda",
    "entropy",
];

/// One completed search.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub program: String,
    pub version: String,
    pub databases: Vec<String>,
    pub parameters: BTreeMap<String, String>,
    pub queries: Vec<Query>,
}

/// Results for one input sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    pub number: usize,
    pub id: String,
    pub meta: String,
    pub length: u64,
    pub hits: Vec<Hit>,
    pub stats: QueryStats,
}

/// A database sequence aligned against a query.
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub number: usize,
    pub id: String,
    pub definition: String,
    pub accession: String,
    pub length: u64,
    pub hsps: Vec<Hsp>,
}

/// A single local alignment.
///
/// Coordinates are 1-based and inclusive; start > end encodes the reverse
/// strand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hsp {
    pub number: i64,
    pub bit_score: f64,
    pub score: i64,
    pub evalue: f64,
    pub query_start: i64,
    pub query_end: i64,
    pub subject_start: i64,
    pub subject_end: i64,
    pub query_frame: i64,
    pub subject_frame: i64,
    pub identity: i64,
    pub positives: i64,
    pub gaps: i64,
    pub length: i64,
    pub qseq: String,
    pub hseq: String,
    pub midline: String,
}

/// The seven per-query search statistics, in report order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStats {
    entries: IndexMap<String, String>,
}

/// Parse a BLAST XML document into a [`Report`].
///
/// `databases` is the list of database names submitted for the search; when
/// empty, the names are taken from `<BlastOutput_db>`.
pub fn parse_report(xml: &str, databases: &[String]) -> Result<Report> {
    let root = parse_xml(xml)?;
    Report::from_tree(&root, databases)
}

impl Report {
    pub fn from_tree(root: &XmlNode, databases: &[String]) -> Result<Self> {
        if root.name != "BlastOutput" {
            return Err(SeqServerError::Schema(format!(
                "expected <BlastOutput> root element, found <{}>",
                root.name
            )));
        }
        Self::from_flattened(&flatten_children(root), databases)
    }

    pub fn from_flattened(items: &[FlatNode], databases: &[String]) -> Result<Self> {
        let top = Fields::new("BlastOutput".to_string(), items);

        let program = top.text(layout::PROGRAM)?.trim().to_string();
        let version = top.text(layout::VERSION)?.trim().to_string();
        let target_db = top.text(layout::TARGET_DB)?;
        let parameters = collect_parameters(top.sequence(layout::PARAMETERS)?);

        let queries = top
            .sequence(layout::ITERATIONS)?
            .iter()
            .filter(|node| !is_blank_text(node))
            .enumerate()
            .map(|(position, node)| build_query(position + 1, node))
            .collect::<Result<Vec<_>>>()?;

        let databases = if databases.is_empty() {
            target_db.split_whitespace().map(str::to_string).collect()
        } else {
            databases.to_vec()
        };

        Ok(Self {
            program,
            version,
            databases,
            parameters,
            queries,
        })
    }

    pub fn program_kind(&self) -> Option<stats::Program> {
        self.program.parse().ok()
    }

    pub fn hit_count(&self) -> usize {
        self.queries.iter().map(|q| q.hits.len()).sum()
    }
}

impl Query {
    /// Re-order hits by ascending derived e-value. The sort is stable, so
    /// hits with equal e-values keep their reported order.
    pub fn sort_hits_by_evalue(&mut self) {
        self.hits.sort_by(|a, b| a.evalue().total_cmp(&b.evalue()));
    }

    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }
}

impl Hit {
    /// Smallest e-value among this hit's HSPs.
    pub fn evalue(&self) -> f64 {
        stats::evalue(self)
    }

    /// Sum of this hit's HSP bit scores.
    pub fn score(&self) -> f64 {
        stats::score(self)
    }

    /// Smallest subject start and largest subject end over all HSPs.
    pub fn subject_span(&self) -> Option<(i64, i64)> {
        let start = self.hsps.iter().map(|h| h.subject_start).min()?;
        let end = self.hsps.iter().map(|h| h.subject_end).max()?;
        Some((start, end))
    }
}

impl QueryStats {
    /// Statistics for a query whose report carried no statistics block: the
    /// usual seven keys, all blank.
    pub fn empty() -> Self {
        Self {
            entries: STAT_KEYS
                .iter()
                .map(|k| (k.to_string(), String::new()))
                .collect(),
        }
    }

    fn from_block(context: &str, block: &[FlatNode]) -> Result<Self> {
        let Some(statistics) = block.iter().find(|n| n.tag == "Statistics") else {
            return Ok(Self::empty());
        };
        let items = statistics.items().unwrap_or_default();

        let entries: IndexMap<String, String> = items
            .iter()
            .filter(|n| !n.is_text_leaf())
            .map(|n| {
                let key = n.tag.strip_prefix("Statistics_").unwrap_or(&n.tag);
                (key.to_string(), n.text().unwrap_or_default().trim().to_string())
            })
            .collect();

        if entries.len() != STAT_KEYS.len() {
            return Err(SeqServerError::Schema(format!(
                "{}: expected {} search statistics, found {}",
                context,
                STAT_KEYS.len(),
                entries.len()
            )));
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Numeric value of a statistic, if present and numeric.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any statistic carries a value.
    pub fn is_populated(&self) -> bool {
        self.entries.values().any(|v| !v.is_empty())
    }
}

/// Positional accessor over one flattened sequence.
struct Fields<'a> {
    context: String,
    items: &'a [FlatNode],
}

impl<'a> Fields<'a> {
    fn new(context: String, items: &'a [FlatNode]) -> Self {
        Self { context, items }
    }

    fn violation(&self, message: String) -> SeqServerError {
        SeqServerError::Schema(format!("{}: {}", self.context, message))
    }

    fn node(&self, (index, tag): Field) -> Result<&'a FlatNode> {
        let node = self.items.get(index).ok_or_else(|| {
            self.violation(format!(
                "expected <{}> at position {}, found only {} elements",
                tag,
                index,
                self.items.len()
            ))
        })?;

        if node.tag != tag {
            return Err(self.violation(format!(
                "expected <{}> at position {}, found <{}>",
                tag, index, node.tag
            )));
        }
        Ok(node)
    }

    fn text(&self, field: Field) -> Result<&'a str> {
        let node = self.node(field)?;
        if node.items().is_some() {
            return Err(self.violation(format!("<{}> should hold text", field.1)));
        }
        Ok(node.text().unwrap_or_default())
    }

    fn sequence(&self, field: Field) -> Result<&'a [FlatNode]> {
        self.node(field)?
            .items()
            .ok_or_else(|| self.violation(format!("<{}> should hold child elements", field.1)))
    }

    /// Like [`Fields::sequence`], but a missing slot or a different element
    /// in it means the block is absent.
    fn optional_sequence(&self, field: Field) -> Result<Option<&'a [FlatNode]>> {
        match self.items.get(field.0) {
            Some(node) if node.tag == field.1 => self.sequence(field).map(Some),
            _ => Ok(None),
        }
    }

    fn number<T>(&self, field: Field) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.text(field)?.trim();
        text.parse::<T>().map_err(|e| {
            self.violation(format!("<{}> value {:?} is not numeric: {}", field.1, text, e))
        })
    }
}

fn is_blank_text(node: &FlatNode) -> bool {
    node.is_text_leaf() && node.text().map_or(true, |t| t.trim().is_empty())
}

fn collect_parameters(block: &[FlatNode]) -> BTreeMap<String, String> {
    block
        .iter()
        .filter(|n| n.tag == "Parameters")
        .filter_map(FlatNode::items)
        .flatten()
        .filter(|n| !n.is_text_leaf())
        .map(|n| {
            let key = n.tag.strip_prefix("Parameters_").unwrap_or(&n.tag);
            (key.to_string(), n.text().unwrap_or_default().trim().to_string())
        })
        .collect()
}

fn split_definition(number: usize, definition: &str) -> (String, String) {
    let definition = definition.trim();
    if definition.is_empty() || definition == NO_DEFINITION {
        return (format!("Query_{}", number), String::new());
    }

    let mut words = definition.split_whitespace();
    let id = words.next().unwrap_or_default().to_string();
    let meta = words.collect::<Vec<_>>().join(" ");
    (id, meta)
}

fn build_query(position: usize, node: &FlatNode) -> Result<Query> {
    let context = format!("Iteration {}", position);
    let items = match (node.tag.as_str(), node.items()) {
        ("Iteration", Some(items)) => items,
        _ => {
            return Err(SeqServerError::Schema(format!(
                "{}: expected <Iteration>, found <{}>",
                context, node.tag
            )))
        }
    };
    let fields = Fields::new(context, items);

    let number: usize = fields.number(layout::ITERATION_NUM)?;
    let (id, meta) = split_definition(number, fields.text(layout::QUERY_DEF)?);

    let length: u64 = fields.number(layout::QUERY_LEN)?;
    if length == 0 {
        return Err(fields.violation("query length must be positive".to_string()));
    }

    let hits_block = fields.sequence(layout::ITERATION_HITS)?;
    let hits = if hits_block.iter().all(is_blank_text) {
        Vec::new()
    } else {
        hits_block
            .iter()
            .enumerate()
            .map(|(position, hit)| build_hit(number, position + 1, hit))
            .collect::<Result<Vec<_>>>()?
    };

    let stats = match fields.optional_sequence(layout::ITERATION_STAT)? {
        Some(block) => QueryStats::from_block(&fields.context, block)?,
        None => QueryStats::empty(),
    };

    let mut query = Query {
        number,
        id,
        meta,
        length,
        hits,
        stats,
    };
    query.sort_hits_by_evalue();
    Ok(query)
}

fn build_hit(query: usize, position: usize, node: &FlatNode) -> Result<Hit> {
    let context = format!("Query {} hit {}", query, position);
    let items = match (node.tag.as_str(), node.items()) {
        ("Hit", Some(items)) => items,
        _ => {
            return Err(SeqServerError::Schema(format!(
                "{}: expected <Hit>, found <{}>",
                context, node.tag
            )))
        }
    };
    let fields = Fields::new(context, items);

    let number: usize = fields.number(layout::HIT_NUM)?;
    let id = fields.text(layout::HIT_ID)?.trim().to_string();
    let definition = match fields.text(layout::HIT_DEF)?.trim() {
        NO_DEFINITION => String::new(),
        other => other.to_string(),
    };
    let accession = fields.text(layout::HIT_ACCESSION)?.trim().to_string();
    let length: u64 = fields.number(layout::HIT_LEN)?;

    let hsps = fields
        .sequence(layout::HIT_HSPS)?
        .iter()
        .filter(|n| !is_blank_text(n))
        .enumerate()
        .map(|(i, hsp)| build_hsp(&fields.context, i + 1, hsp))
        .collect::<Result<Vec<_>>>()?;

    if hsps.is_empty() {
        return Err(fields.violation("hit has no HSPs".to_string()));
    }

    Ok(Hit {
        number,
        id,
        definition,
        accession,
        length,
        hsps,
    })
}

fn build_hsp(hit_context: &str, position: usize, node: &FlatNode) -> Result<Hsp> {
    let context = format!("{} HSP {}", hit_context, position);
    let items = match (node.tag.as_str(), node.items()) {
        ("Hsp", Some(items)) => items,
        _ => {
            return Err(SeqServerError::Schema(format!(
                "{}: expected <Hsp>, found <{}>",
                context, node.tag
            )))
        }
    };
    let fields = Fields::new(context, items);

    let mut integers = [0i64; layout::HSP_FIELDS.len()];
    for index in layout::HSP_INTEGER_FIELDS {
        integers[index] = fields.number(layout::hsp(index))?;
    }

    let mut reals = [0f64; layout::HSP_FIELDS.len()];
    for index in layout::HSP_REAL_FIELDS {
        reals[index] = fields.number(layout::hsp(index))?;
    }

    let qseq = fields.text(layout::hsp(layout::HSP_QSEQ))?.to_string();
    let hseq = fields.text(layout::hsp(layout::HSP_HSEQ))?.to_string();
    let midline = fields.text(layout::hsp(layout::HSP_MIDLINE))?.to_string();

    let hsp = Hsp {
        number: integers[0],
        bit_score: reals[1],
        score: integers[2],
        evalue: reals[3],
        query_start: integers[4],
        query_end: integers[5],
        subject_start: integers[6],
        subject_end: integers[7],
        query_frame: integers[8],
        subject_frame: integers[9],
        identity: integers[10],
        positives: integers[11],
        gaps: integers[12],
        length: integers[13],
        qseq,
        hseq,
        midline,
    };

    if hsp.length <= 0 {
        return Err(fields.violation("alignment length must be positive".to_string()));
    }

    let widths = [
        hsp.qseq.chars().count(),
        hsp.hseq.chars().count(),
        hsp.midline.chars().count(),
    ];
    if widths[0] != widths[1] || widths[1] != widths[2] {
        return Err(fields.violation(format!(
            "aligned strings differ in length (query {}, subject {}, midline {})",
            widths[0], widths[1], widths[2]
        )));
    }

    Ok(hsp)
}
