//! Shared DTOs for JSON requests.

use serde::Deserialize;

use crate::{
    data::table::LabeledTable,
    stats::{DegeneratePolicy, PassRule},
};

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub strata: Vec<LabeledTable>,
    #[serde(default)]
    pub pass: PassRule,
    #[serde(default)]
    pub policy: Option<DegeneratePolicy>,
    #[serde(default)]
    pub confidence: Option<f64>,
}
