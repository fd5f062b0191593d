pub mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, Databases, FastaSource, RetrievalResult, SequenceSource};
