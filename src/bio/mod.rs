pub mod fasta;
pub mod sequence;

pub use sequence::{composition, guess_type, Sequence, SequenceType};
