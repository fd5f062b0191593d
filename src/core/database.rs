//! Searchable databases and sequence retrieval across them

use crate::bio::fasta::{parse_fasta, to_fasta_string};
use crate::bio::sequence::{Sequence, SequenceType};
use crate::core::config::DatabaseEntry;
use crate::{Result, SeqServerError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Prefix BLAST+ gives to identifiers it parsed as local.
pub const LOCAL_ID_PREFIX: &str = "lcl|";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Lowercase hex MD5 of `name`.
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub nsequences: u64,
    pub ncharacters: u64,
}

impl Database {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        kind: &str,
        nsequences: u64,
        ncharacters: u64,
    ) -> Self {
        let name = name.into();
        Self {
            id: Self::id_for(&name),
            name,
            title: title.into(),
            kind: kind.to_lowercase(),
            nsequences,
            ncharacters,
        }
    }

    pub fn id_for(name: &str) -> String {
        format!("{:x}", md5::compute(name.as_bytes()))
    }

    /// Second-to-last path component of the name, which is where genome
    /// databases keep the species directory.
    pub fn species(&self) -> Option<&str> {
        let parts: Vec<&str> = self.name.split('/').collect();
        if parts.len() < 2 {
            return None;
        }
        Some(parts[parts.len() - 2]).filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.kind, self.title, self.name)
    }
}

/// Looks sequences up in a database.
pub trait SequenceSource: Send + Sync {
    /// FASTA text for `accession` (optionally restricted to `coords`,
    /// `start-stop`) if `database` holds it.
    fn fetch(&self, database: &Database, accession: &str, coords: Option<&str>)
        -> Result<Option<String>>;
}

/// In-memory source built from FASTA files.
#[derive(Debug, Default)]
pub struct FastaSource {
    by_database: HashMap<String, HashMap<String, Sequence>>,
}

impl FastaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register sequences under `database`. Identifiers carrying the local
    /// prefix are reachable with and without it.
    pub fn insert(&mut self, database: &Database, sequences: Vec<Sequence>) {
        let index = self.by_database.entry(database.id.clone()).or_default();
        for seq in sequences {
            if let Some(bare) = seq.id.strip_prefix(LOCAL_ID_PREFIX) {
                index.insert(bare.to_string(), seq.clone());
            }
            index.insert(seq.id.clone(), seq);
        }
    }

    pub fn count(&self, database: &Database) -> usize {
        self.by_database.get(&database.id).map_or(0, HashMap::len)
    }
}

fn parse_coords(coords: &str) -> Option<(usize, usize)> {
    let (start, stop) = coords.split_once('-')?;
    Some((start.trim().parse().ok()?, stop.trim().parse().ok()?))
}

impl SequenceSource for FastaSource {
    fn fetch(
        &self,
        database: &Database,
        accession: &str,
        coords: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(seq) = self
            .by_database
            .get(&database.id)
            .and_then(|index| index.get(accession))
        else {
            return Ok(None);
        };

        match coords {
            None => Ok(Some(to_fasta_string(seq))),
            Some(range) => match parse_coords(range) {
                Some((start, stop)) => Ok(Some(to_fasta_string(&seq.region(start, stop)))),
                None => {
                    warn!("Ignoring malformed range '{}' for {}", range, accession);
                    Ok(None)
                }
            },
        }
    }
}

/// Outcome of a multi-database lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalResult {
    pub fasta: String,
    pub requested: usize,
    pub found: usize,
}

impl RetrievalResult {
    /// Note for the user when fewer (or more) records came back than asked
    /// for.
    pub fn discrepancy(&self) -> Option<String> {
        (self.requested != self.found).then(|| {
            format!(
                "expected {} sequence(s), found {}",
                self.requested, self.found
            )
        })
    }
}

/// Databases keyed by id, in the order they were added.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Databases {
    collection: IndexMap<String, Database>,
}

impl Databases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, database: Database) {
        self.collection.insert(database.id.clone(), database);
    }

    pub fn get(&self, id: &str) -> Option<&Database> {
        self.collection.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Database> {
        self.get(&Database::id_for(name))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.collection.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Database> {
        self.collection.values()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// The databases named in `names`, in that order. Unknown names are an
    /// error.
    pub fn select(&self, names: &[String]) -> Result<Databases> {
        let mut selected = Databases::new();
        for name in names {
            let db = self
                .find_by_name(name)
                .ok_or_else(|| SeqServerError::Database(format!("Unknown database: {}", name)))?;
            selected.push(db.clone());
        }
        Ok(selected)
    }

    /// Fetch comma separated `accession[:start-stop]` loci.
    ///
    /// Every database is tried in order and the first one holding a locus
    /// wins, so identifiers that are not unique across databases can resolve
    /// to the wrong record. Loci found nowhere become a `# ERROR:` comment
    /// line in place of the record.
    pub fn retrieve(&self, loci: &str, source: &dyn SequenceSource) -> Result<RetrievalResult> {
        let loci: Vec<&str> = loci
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut records = Vec::with_capacity(loci.len());
        let mut found = 0;
        for locus in &loci {
            let (accession, coords) = match locus.split_once(':') {
                Some((accession, coords)) => (accession, Some(coords)),
                None => (*locus, None),
            };

            let mut record = None;
            for database in self.iter() {
                if let Some(fasta) = source.fetch(database, accession, coords)? {
                    debug!("Found {} in {}", locus, database.name);
                    record = Some(fasta);
                    break;
                }
            }

            match record {
                Some(fasta) => {
                    found += 1;
                    records.push(fasta);
                }
                None => {
                    warn!("{} not found in any database", locus);
                    records.push(format!("# ERROR: {} not found in any database", locus));
                }
            }
        }

        Ok(RetrievalResult {
            fasta: records.join("\n"),
            requested: loci.len(),
            found,
        })
    }
}

/// Build the configured databases, loading the FASTA behind each one.
pub fn load_databases(entries: &[DatabaseEntry]) -> Result<(Databases, FastaSource)> {
    let mut databases = Databases::new();
    let mut source = FastaSource::new();

    for entry in entries {
        let sequences = match &entry.fasta {
            Some(path) => parse_fasta(path).map_err(|e| {
                SeqServerError::Database(format!(
                    "Failed to load {} from {}: {}",
                    entry.name,
                    path.display(),
                    e
                ))
            })?,
            None => Vec::new(),
        };

        let kind = match &entry.kind {
            Some(kind) => kind.clone(),
            None => sequences
                .first()
                .and_then(Sequence::detect_type)
                .unwrap_or(SequenceType::Nucleotide)
                .as_str()
                .to_string(),
        };
        let ncharacters = sequences.iter().map(|s| s.len() as u64).sum();

        let database = Database::new(
            entry.name.clone(),
            entry.title.clone().unwrap_or_else(|| entry.name.clone()),
            &kind,
            sequences.len() as u64,
            ncharacters,
        );

        info!(
            "Loaded database {} ({} sequences, {} letters)",
            database.name, database.nsequences, database.ncharacters
        );

        source.insert(&database, sequences);
        databases.push(database);
    }

    Ok((databases, source))
}
