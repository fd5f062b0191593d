//! Values derived from a built report on demand
//!
//! Nothing here is stored on the model; every function is a pure read over
//! the hit/HSP graph.

use super::report::{Hit, Hsp};
use crate::SeqServerError;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The five BLAST+ search programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    Blastn,
    Blastp,
    Blastx,
    Tblastn,
    Tblastx,
}

pub const ALGORITHMS: [Program; 5] = [
    Program::Blastn,
    Program::Blastp,
    Program::Blastx,
    Program::Tblastn,
    Program::Tblastx,
];

/// Which optional HSP columns carry information for a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MeaningfulFields {
    pub positives: bool,
    pub query_frame: bool,
    pub hit_frame: bool,
    pub strand: bool,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Blastn => "blastn",
            Program::Blastp => "blastp",
            Program::Blastx => "blastx",
            Program::Tblastn => "tblastn",
            Program::Tblastx => "tblastx",
        }
    }

    pub const fn meaningful_fields(self) -> MeaningfulFields {
        let none = MeaningfulFields {
            positives: false,
            query_frame: false,
            hit_frame: false,
            strand: false,
        };
        match self {
            Program::Blastn => MeaningfulFields {
                strand: true,
                ..none
            },
            Program::Blastp => MeaningfulFields {
                positives: true,
                ..none
            },
            Program::Blastx => MeaningfulFields {
                query_frame: true,
                ..none
            },
            Program::Tblastn => MeaningfulFields {
                hit_frame: true,
                ..none
            },
            Program::Tblastx => MeaningfulFields {
                positives: true,
                strand: true,
                ..none
            },
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = SeqServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALGORITHMS
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| SeqServerError::Other(format!("unknown BLAST program: {}", s)))
    }
}

/// Best (smallest) e-value over a hit's HSPs.
pub fn evalue(hit: &Hit) -> f64 {
    hit.hsps
        .iter()
        .map(|hsp| hsp.evalue)
        .fold(f64::INFINITY, f64::min)
}

/// Total bit score over a hit's HSPs.
pub fn score(hit: &Hit) -> f64 {
    hit.hsps.iter().map(|hsp| hsp.bit_score).sum()
}

/// Render an e-value for display, using `x 10<sup>n</sup>` notation for
/// values that would otherwise print in exponent form. The exponent is
/// signed and at least two digits wide.
pub fn pretty_evalue(evalue: f64) -> String {
    let magnitude = evalue.abs();
    if evalue != 0.0 && evalue.is_finite() && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", evalue);
        if let Some((mantissa, exponent)) = formatted.split_once('e') {
            if let (Ok(mantissa), Ok(exponent)) = (mantissa.parse::<f64>(), exponent.parse::<i32>())
            {
                let sign = if exponent >= 0 { "+" } else { "-" };
                return format!(
                    "{:.3} x 10<sup>{}{:02}</sup>",
                    mantissa,
                    sign,
                    exponent.abs()
                );
            }
        }
    }
    format!("{:.3}", evalue)
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 100.0 / whole as f64 * 100.0).round() / 100.0
}

fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn strand(frame: i64) -> &'static str {
    if frame > 0 {
        "Plus"
    } else {
        "Minus"
    }
}

impl Hsp {
    pub fn identity_fraction(&self) -> String {
        format!("{}/{}", self.identity, self.length)
    }

    pub fn positives_fraction(&self) -> String {
        format!("{}/{}", self.positives, self.length)
    }

    pub fn gaps_fraction(&self) -> String {
        format!("{}/{}", self.gaps, self.length)
    }

    pub fn identity_percentage(&self) -> f64 {
        percentage(self.identity, self.length)
    }

    pub fn positives_percentage(&self) -> f64 {
        percentage(self.positives, self.length)
    }

    pub fn gaps_percentage(&self) -> f64 {
        percentage(self.gaps, self.length)
    }
}

/// Ordered label/value table describing one HSP for display.
///
/// The first four rows are always present; the rest depend on the program.
pub fn hsp_stats(program: Program, hsp: &Hsp) -> IndexMap<&'static str, String> {
    let mut stats = IndexMap::new();

    // Bit scores always show a fractional part: 40.0, not 40.
    stats.insert("Score", format!("{:?}({})", hsp.bit_score, hsp.score));
    stats.insert("Expect", pretty_evalue(hsp.evalue));
    stats.insert(
        "Identities",
        format!(
            "{}({}%)",
            hsp.identity_fraction(),
            format_percentage(hsp.identity_percentage())
        ),
    );
    stats.insert(
        "Gaps",
        format!(
            "{}({}%)",
            hsp.gaps_fraction(),
            format_percentage(hsp.gaps_percentage())
        ),
    );

    let fields = program.meaningful_fields();
    if fields.positives {
        stats.insert(
            "Positives",
            format!(
                "{}({}%)",
                hsp.positives_fraction(),
                format_percentage(hsp.positives_percentage())
            ),
        );
    }
    if fields.query_frame {
        stats.insert("Query Frame", hsp.query_frame.to_string());
    }
    if fields.hit_frame {
        stats.insert("Hit Frame", hsp.subject_frame.to_string());
    }
    if fields.strand {
        stats.insert(
            "Strand",
            format!(
                "({}/{})",
                strand(hsp.query_frame),
                strand(hsp.subject_frame)
            ),
        );
    }

    stats
}
