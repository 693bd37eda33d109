//! Table containers, CSV ingestion and report persistence.

pub mod load;
pub mod report;
pub mod table;
