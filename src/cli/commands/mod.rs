pub mod annotate;
pub mod report;
pub mod retrieve;
