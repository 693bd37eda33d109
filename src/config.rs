//! Runtime configuration utilities for strata-scope.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::stats::DegeneratePolicy;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
    /// Confidence level of the pooled odds ratio interval.
    pub confidence: f64,
    /// Handling of zero-total strata.
    pub degenerate_policy: DegeneratePolicy,
    /// CSV column holding the stratum label.
    pub stratum_column: String,
    /// CSV column holding the group label.
    pub group_column: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            outputs_dir: PathBuf::from("./outputs"),
            confidence: 0.95,
            degenerate_policy: DegeneratePolicy::Raise,
            stratum_column: "stratum".to_string(),
            group_column: "group".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.outputs_dir);
        let confidence = env::var("CONFIDENCE_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.confidence);
        let degenerate_policy = match env::var("DEGENERATE_POLICY") {
            Ok(raw) => raw
                .parse()
                .map_err(anyhow::Error::msg)
                .context("parsing DEGENERATE_POLICY")?,
            Err(_) => defaults.degenerate_policy,
        };
        let stratum_column = env::var("STRATUM_COLUMN").unwrap_or(defaults.stratum_column);
        let group_column = env::var("GROUP_COLUMN").unwrap_or(defaults.group_column);

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            outputs_dir,
            confidence,
            degenerate_policy,
            stratum_column,
            group_column,
        })
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}
