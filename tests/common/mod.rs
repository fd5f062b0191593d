//! Shared fixtures for the integration tests
//!
//! Builds BLAST+ XML documents with the element order BLAST+ writes, and
//! HTML reports shaped like `blastn -html` output, so tests do not depend on
//! files on disk.
#![allow(dead_code)]

use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct HspSpec {
    pub evalue: String,
    pub bit_score: f64,
    pub subject_start: i64,
    pub subject_end: i64,
}

impl HspSpec {
    pub fn new(evalue: &str, bit_score: f64) -> Self {
        Self {
            evalue: evalue.to_string(),
            bit_score,
            subject_start: 101,
            subject_end: 112,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HitSpec {
    pub id: String,
    pub definition: String,
    pub hsps: Vec<HspSpec>,
}

impl HitSpec {
    pub fn new(id: &str, hsps: Vec<HspSpec>) -> Self {
        Self {
            id: id.to_string(),
            definition: "No definition line".to_string(),
            hsps,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub definition: String,
    pub length: u64,
    pub hits: Vec<HitSpec>,
    pub with_stats: bool,
}

impl QuerySpec {
    pub fn new(definition: &str, hits: Vec<HitSpec>) -> Self {
        Self {
            definition: definition.to_string(),
            length: 120,
            hits,
            with_stats: true,
        }
    }
}

const QSEQ: &str = "ACGTACGTACGT";
const HSEQ: &str = "ACGTACCTACGT";
const MIDLINE: &str = "|||||| |||||";

fn leaf(out: &mut String, indent: usize, tag: &str, value: &str) {
    let _ = writeln!(out, "{:indent$}<{tag}>{value}</{tag}>", "", indent = indent, tag = tag, value = value);
}

/// A BLAST+ XML document for `queries`.
pub fn blast_xml(program: &str, queries: &[QuerySpec]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>\n");
    out.push_str("<!DOCTYPE BlastOutput PUBLIC \"-//NCBI//NCBI BlastOutput/EN\" \"http://www.ncbi.nlm.nih.gov/dtd/NCBI_BlastOutput.dtd\">\n");
    out.push_str("<BlastOutput>\n");
    leaf(&mut out, 2, "BlastOutput_program", program);
    leaf(&mut out, 2, "BlastOutput_version", "BLASTN 2.2.28+");
    leaf(&mut out, 2, "BlastOutput_reference", "Zheng Zhang et al. (2000)");
    leaf(&mut out, 2, "BlastOutput_db", "/db/ants /db/bees");
    leaf(&mut out, 2, "BlastOutput_query-ID", "Query_1");
    leaf(&mut out, 2, "BlastOutput_query-def", "contig_1");
    leaf(&mut out, 2, "BlastOutput_query-len", "120");
    out.push_str("  <BlastOutput_param>\n    <Parameters>\n");
    leaf(&mut out, 6, "Parameters_expect", "10");
    leaf(&mut out, 6, "Parameters_sc-match", "1");
    leaf(&mut out, 6, "Parameters_sc-mismatch", "-2");
    leaf(&mut out, 6, "Parameters_gap-open", "0");
    leaf(&mut out, 6, "Parameters_gap-extend", "0");
    leaf(&mut out, 6, "Parameters_filter", "L;m;");
    out.push_str("    </Parameters>\n  </BlastOutput_param>\n");
    out.push_str("  <BlastOutput_iterations>\n");

    for (q, query) in queries.iter().enumerate() {
        out.push_str("    <Iteration>\n");
        leaf(&mut out, 6, "Iteration_iter-num", &(q + 1).to_string());
        leaf(&mut out, 6, "Iteration_query-ID", &format!("Query_{}", q + 1));
        leaf(&mut out, 6, "Iteration_query-def", &query.definition);
        leaf(&mut out, 6, "Iteration_query-len", &query.length.to_string());

        out.push_str("      <Iteration_hits>\n");
        for (h, hit) in query.hits.iter().enumerate() {
            out.push_str("        <Hit>\n");
            leaf(&mut out, 10, "Hit_num", &(h + 1).to_string());
            leaf(&mut out, 10, "Hit_id", &hit.id);
            leaf(&mut out, 10, "Hit_def", &hit.definition);
            leaf(&mut out, 10, "Hit_accession", hit.id.trim_start_matches("lcl|"));
            leaf(&mut out, 10, "Hit_len", "500");
            out.push_str("          <Hit_hsps>\n");
            for (n, hsp) in hit.hsps.iter().enumerate() {
                out.push_str("            <Hsp>\n");
                let values = [
                    ("Hsp_num", (n + 1).to_string()),
                    ("Hsp_bit-score", hsp.bit_score.to_string()),
                    ("Hsp_score", "24".to_string()),
                    ("Hsp_evalue", hsp.evalue.clone()),
                    ("Hsp_query-from", "1".to_string()),
                    ("Hsp_query-to", "12".to_string()),
                    ("Hsp_hit-from", hsp.subject_start.to_string()),
                    ("Hsp_hit-to", hsp.subject_end.to_string()),
                    ("Hsp_query-frame", "1".to_string()),
                    ("Hsp_hit-frame", "1".to_string()),
                    ("Hsp_identity", "11".to_string()),
                    ("Hsp_positive", "11".to_string()),
                    ("Hsp_gaps", "0".to_string()),
                    ("Hsp_align-len", "12".to_string()),
                    ("Hsp_qseq", QSEQ.to_string()),
                    ("Hsp_hseq", HSEQ.to_string()),
                    ("Hsp_midline", MIDLINE.to_string()),
                ];
                for (tag, value) in values.iter() {
                    leaf(&mut out, 14, tag, value);
                }
                out.push_str("            </Hsp>\n");
            }
            out.push_str("          </Hit_hsps>\n");
            out.push_str("        </Hit>\n");
        }
        out.push_str("      </Iteration_hits>\n");

        if query.with_stats {
            out.push_str("      <Iteration_stat>\n        <Statistics>\n");
            leaf(&mut out, 10, "Statistics_db-num", "2");
            leaf(&mut out, 10, "Statistics_db-len", "1000");
            leaf(&mut out, 10, "Statistics_hsp-len", "8");
            leaf(&mut out, 10, "Statistics_eff-space", "101184");
            leaf(&mut out, 10, "Statistics_kappa", "0.46");
            leaf(&mut out, 10, "Statistics_lambda", "1.28");
            leaf(&mut out, 10, "Statistics_entropy", "0.85");
            out.push_str("        </Statistics>\n      </Iteration_stat>\n");
        }
        if query.hits.is_empty() {
            leaf(&mut out, 6, "Iteration_message", "No hits found");
        }
        out.push_str("    </Iteration>\n");
    }

    out.push_str("  </BlastOutput_iterations>\n</BlastOutput>\n");
    out
}

/// One query without hits followed by one with two single-HSP hits.
pub fn two_query_xml() -> String {
    blast_xml(
        "blastn",
        &[
            QuerySpec::new("empty_query no matches here", vec![]),
            QuerySpec::new(
                "contig_2 assembled contig",
                vec![
                    HitSpec::new("lcl|weak", vec![HspSpec::new("0.5", 20.3)]),
                    HitSpec::new("lcl|strong", vec![HspSpec::new("2e-30", 120.5)]),
                ],
            ),
        ],
    )
}

/// The first fifteen lines of a `-html` report: preamble then reference.
pub const HTML_HEAD: [&str; 15] = [
    "<HTML>",
    "<TITLE>BLAST Search Results</TITLE>",
    "<BODY BGCOLOR=\"WHITE\" LINK=\"#0000FF\" VLINK=\"#660099\" ALINK=\"#660099\">",
    "<PRE>",
    "",
    "<b>BLASTN 2.2.28+</b>",
    "",
    "",
    "<b>Reference:</b> Zheng Zhang, Scott Schwartz, Lukas Wagner, and",
    "Webb Miller (2000), \"A greedy algorithm for aligning DNA",
    "sequences\", J Comput Biol 2000; 7(1-2):203-14.",
    "",
    "",
    "",
    "",
];

/// Minimal 20-line report: reference on lines 6-15, "total letters" on line
/// 18 and two hit headers after it.
pub fn twenty_line_html() -> String {
    let mut lines: Vec<&str> = HTML_HEAD.to_vec();
    lines.extend([
        "<b>Database:</b> ants",
        "           2 sequences;",
        "           1,000 total letters",
        ">lcl|A1 first hit",
        ">lcl|B2 second hit",
    ]);
    assert_eq!(lines.len(), 20);
    lines.join("\n")
}

/// A two-query report with alignments, statistics and trailing markup.
pub fn full_html() -> String {
    let mut lines: Vec<&str> = HTML_HEAD.to_vec();
    lines.extend([
        "<b>Database:</b> genomes/Atta_cephalotes/scaffolds",
        "           2 sequences;",
        "           1,000 total letters",
        "<script src=\"blastResult.js\"></script>",
        "<b>Query=</b> contig_1",
        "Length=120",
        "><a name=Acep_scaffold7></a>lcl|Acep_scaffold7 genomic",
        "Length=5000",
        " Score = 24.3 bits (12),  Expect = 0.001",
        "Query  1    ACGTACGTACGT  12",
        "            |||||| |||||",
        "Sbjct  900  ACGTACCTACGT  911",
        "Query  13   ACGTACGTACGT  24",
        "Sbjct  140  ACGTACGTACGT  151",
        ">lcl|contig_9<a name=contig_9></a> unplaced",
        "Length=300",
        "Sbjct  5  ACGT  8",
        "<b>Query=</b> contig_2",
        "Length=80",
        "***** No hits found *****",
        "  Database: genomes/Atta_cephalotes/scaffolds",
        "    Posted date:  Jan 1, 2014",
        "Lambda      K        H",
        "</PRE>",
        "</BODY>",
        "</HTML>",
    ]);
    lines.join("\n")
}
