use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    Protein,
    Nucleotide,
}

impl SequenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::Protein => "protein",
            SequenceType::Nucleotide => "nucleotide",
        }
    }
}

/// Residues shorter than this are too few to tell the alphabet apart.
const MIN_GUESS_RESIDUES: usize = 10;

/// Fraction of A/C/G/T/U above which a sequence is taken as nucleotide.
const NUCLEOTIDE_THRESHOLD: f64 = 0.9;

/// Guess whether raw residues are nucleotide or protein.
///
/// Only letters count, and the ambiguity codes `N` and `X` are ignored.
/// Returns `None` when fewer than ten residues remain.
pub fn guess_type(residues: &str) -> Option<SequenceType> {
    let cleaned: Vec<char> = residues
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| !matches!(c, 'N' | 'X'))
        .collect();

    if cleaned.len() < MIN_GUESS_RESIDUES {
        return None;
    }

    let nucleotides = cleaned
        .iter()
        .filter(|c| matches!(c, 'A' | 'C' | 'G' | 'T' | 'U'))
        .count();

    if nucleotides as f64 / cleaned.len() as f64 > NUCLEOTIDE_THRESHOLD {
        Some(SequenceType::Nucleotide)
    } else {
        Some(SequenceType::Protein)
    }
}

/// Count of every character in `residues`.
pub fn composition(residues: &str) -> BTreeMap<char, usize> {
    let mut counts = BTreeMap::new();
    for c in residues.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

impl Sequence {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn residues(&self) -> String {
        String::from_utf8_lossy(&self.sequence).to_string()
    }

    pub fn detect_type(&self) -> Option<SequenceType> {
        guess_type(&self.residues())
    }

    pub fn header(&self) -> String {
        match &self.description {
            Some(desc) if !desc.is_empty() => format!(">{} {}", self.id, desc),
            _ => format!(">{}", self.id),
        }
    }

    /// Sub-sequence between 1-based inclusive coordinates, clamped to the
    /// sequence. The id gains a `:start-stop` suffix.
    pub fn region(&self, start: usize, stop: usize) -> Sequence {
        let (start, stop) = if start <= stop { (start, stop) } else { (stop, start) };
        let from = start.saturating_sub(1).min(self.len());
        let to = stop.min(self.len()).max(from);

        Sequence {
            id: format!("{}:{}-{}", self.id, start, stop),
            description: self.description.clone(),
            sequence: self.sequence[from..to].to_vec(),
        }
    }
}
