//! BLAST XML (`-outfmt 5`) ingestion
//!
//! The raw document is read into a generic element tree ([`xml`]), flattened
//! into nested scalars and sequences with no BLAST knowledge ([`flatten`]) and
//! finally mapped onto the typed [`report::Report`] by position.

pub mod flatten;
pub mod links;
pub mod report;
pub mod stats;
pub mod xml;

pub use flatten::{flatten_children, FlatNode, FlatValue};
pub use report::{parse_report, Hit, Hsp, Query, QueryStats, Report};
pub use stats::Program;
pub use xml::{parse_xml, XmlChild, XmlNode};
