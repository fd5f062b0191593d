/// Tests for building reports from BLAST+ XML
///
/// Covers the positional layout, identifier defaulting, hit ordering and the
/// all-or-nothing failure policy for malformed documents.
mod common;

use common::{blast_xml, two_query_xml, HitSpec, HspSpec, QuerySpec};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use seqserver::blast::{parse_report, Program};
use seqserver::SeqServerError;

#[test]
fn test_two_query_round_trip() {
    let report = parse_report(&two_query_xml(), &[]).unwrap();

    assert_eq!(report.program, "blastn");
    assert_eq!(report.version, "BLASTN 2.2.28+");
    assert_eq!(report.program_kind(), Some(Program::Blastn));
    assert_eq!(report.queries.len(), 2);

    let counts: Vec<usize> = report.queries.iter().map(|q| q.hits.len()).collect();
    assert_eq!(counts, vec![0, 2]);

    for hit in &report.queries[1].hits {
        assert_eq!(hit.hsps.len(), 1);
        assert_eq!(hit.evalue(), hit.hsps[0].evalue);
        assert_eq!(hit.score(), hit.hsps[0].bit_score);
    }
}

#[test]
fn test_hits_sorted_by_evalue() {
    let report = parse_report(&two_query_xml(), &[]).unwrap();
    let hits = &report.queries[1].hits;

    // Reported weak-first; the stronger hit moves up but keeps its number.
    assert_eq!(hits[0].id, "lcl|strong");
    assert_eq!(hits[0].number, 2);
    assert_eq!(hits[1].id, "lcl|weak");
    assert_eq!(hits[1].number, 1);
}

#[test]
fn test_query_identifiers() {
    let xml = blast_xml(
        "blastp",
        &[
            QuerySpec::new("No definition line", vec![]),
            QuerySpec::new("sp|P1|ABC  kinase   domain", vec![]),
        ],
    );
    let report = parse_report(&xml, &[]).unwrap();

    assert_eq!(report.queries[0].id, "Query_1");
    assert_eq!(report.queries[0].meta, "");
    assert_eq!(report.queries[1].id, "sp|P1|ABC");
    assert_eq!(report.queries[1].meta, "kinase domain");
}

#[test]
fn test_hit_definition_sentinel_becomes_empty() {
    let mut hit = HitSpec::new("lcl|x", vec![HspSpec::new("1e-3", 30.0)]);
    let xml = blast_xml("blastn", &[QuerySpec::new("q", vec![hit.clone()])]);
    let report = parse_report(&xml, &[]).unwrap();
    assert_eq!(report.queries[0].hits[0].definition, "");

    hit.definition = "scaffold12 assembled".to_string();
    let xml = blast_xml("blastn", &[QuerySpec::new("q", vec![hit])]);
    let report = parse_report(&xml, &[]).unwrap();
    assert_eq!(report.queries[0].hits[0].definition, "scaffold12 assembled");
}

#[test]
fn test_parameters_and_databases() {
    let report = parse_report(&two_query_xml(), &[]).unwrap();
    assert_eq!(report.parameters["expect"], "10");
    assert_eq!(report.parameters["sc-mismatch"], "-2");
    assert_eq!(report.databases, vec!["/db/ants", "/db/bees"]);

    let submitted = vec!["ants".to_string()];
    let report = parse_report(&two_query_xml(), &submitted).unwrap();
    assert_eq!(report.databases, submitted);
}

#[test]
fn test_statistics_always_seven() {
    let mut without = QuerySpec::new("q2", vec![]);
    without.with_stats = false;
    let xml = blast_xml("blastn", &[QuerySpec::new("q1", vec![]), without]);
    let report = parse_report(&xml, &[]).unwrap();

    let with = &report.queries[0].stats;
    assert_eq!(with.len(), 7);
    assert_eq!(with.get("kappa"), Some("0.46"));
    assert_eq!(with.value("db-len"), Some(1000.0));

    let missing = &report.queries[1].stats;
    assert_eq!(missing.len(), 7);
    assert!(!missing.is_populated());
}

#[test]
fn test_malformed_evalue_fails_whole_parse() {
    let xml = blast_xml(
        "blastn",
        &[QuerySpec::new(
            "q",
            vec![
                HitSpec::new("lcl|ok", vec![HspSpec::new("1e-5", 40.0)]),
                HitSpec::new("lcl|bad", vec![HspSpec::new("abc", 40.0)]),
            ],
        )],
    );

    let err = parse_report(&xml, &[]).unwrap_err();
    assert!(matches!(err, SeqServerError::Schema(_)));
    assert!(err.is_internal());
    assert!(err.to_string().contains("Hsp_evalue"), "{}", err);
}

#[test]
fn test_zero_length_query_rejected() {
    let mut query = QuerySpec::new("q", vec![]);
    query.length = 0;
    let err = parse_report(&blast_xml("blastn", &[query]), &[]).unwrap_err();
    assert!(matches!(err, SeqServerError::Schema(_)));
}

#[test]
fn test_wrong_root_and_broken_markup() {
    let err = parse_report("<Other></Other>", &[]).unwrap_err();
    assert!(matches!(err, SeqServerError::Schema(_)));

    let truncated = two_query_xml().replace("</BlastOutput>\n", "");
    let err = parse_report(&truncated, &[]).unwrap_err();
    assert!(matches!(err, SeqServerError::Parse(_)));
}

#[test]
fn test_report_serializes() {
    let report = parse_report(&two_query_xml(), &[]).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["queries"][1]["hits"][0]["hsps"][0]["evalue"], 2e-30);
    assert_eq!(value["queries"][0]["stats"]["entries"]["lambda"], "1.28");
}

fn evalue_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(1e-10),
        (0u32..50).prop_map(|e| 10f64.powi(-(e as i32))),
        0.0f64..10.0,
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_hits_ordered_and_stable(
        hits in prop::collection::vec(
            prop::collection::vec((evalue_strategy(), 1.0f64..500.0), 1..4),
            0..8,
        )
    ) {
        let specs: Vec<HitSpec> = hits
            .iter()
            .enumerate()
            .map(|(i, hsps)| {
                HitSpec::new(
                    &format!("lcl|hit{}", i + 1),
                    hsps.iter()
                        .map(|(e, s)| HspSpec::new(&format!("{:e}", e), *s))
                        .collect(),
                )
            })
            .collect();
        let xml = blast_xml("blastn", &[QuerySpec::new("q", specs)]);
        let report = parse_report(&xml, &[]).unwrap();
        let built = &report.queries[0].hits;

        prop_assert_eq!(built.len(), hits.len());

        for hit in built {
            let min = hit.hsps.iter().map(|h| h.evalue).fold(f64::INFINITY, f64::min);
            let sum: f64 = hit.hsps.iter().map(|h| h.bit_score).sum();
            prop_assert_eq!(hit.evalue(), min);
            prop_assert!((hit.score() - sum).abs() < 1e-9);
        }

        for pair in built.windows(2) {
            prop_assert!(pair[0].evalue() <= pair[1].evalue());
            if pair[0].evalue() == pair[1].evalue() {
                prop_assert!(pair[0].number < pair[1].number);
            }
        }

        for hsp in built.iter().flat_map(|h| &h.hsps) {
            prop_assert_eq!(hsp.qseq.len(), hsp.hseq.len());
            prop_assert_eq!(hsp.hseq.len(), hsp.midline.len());
        }
    }
}
