//! Stratified 2x2 association testing: Mantel-Haenszel pooled odds ratio,
//! Cochran-Mantel-Haenszel test and Breslow-Day homogeneity test.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod stats;

pub use error::AnalysisError;
pub use stats::{test_cmh_bd, CmhBdSummary, PassRule, Stratum};
