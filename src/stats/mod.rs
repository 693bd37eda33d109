//! Stratified association statistics and the combined entry points.

pub mod breslow_day;
pub mod cmh;
pub mod dist;
pub mod odds;
pub mod stratum;

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    data::table::ContingencyTable,
    error::{AnalysisError, Result},
};

pub use breslow_day::{bres_day, bres_day_all, BreslowDay};
pub use cmh::cmh_test;
pub use dist::ChiSquareTest;
pub use odds::{multi_odds_ratio, odds_ratio};
pub use stratum::{parse, parse_all, PassRule, Stratum};

/// What to do with strata whose total is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Fail the whole call with `DegenerateTable`.
    #[default]
    Raise,
    /// Drop the stratum before computing anything.
    Skip,
}

impl FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raise" => Ok(Self::Raise),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown degenerate policy `{other}`")),
        }
    }
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise => f.write_str("raise"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Knobs for [`analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub pass_rule: PassRule,
    pub policy: DegeneratePolicy,
    /// Confidence level of the pooled odds ratio interval.
    pub confidence: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            pass_rule: PassRule::default(),
            policy: DegeneratePolicy::default(),
            confidence: 0.95,
        }
    }
}

/// The five scalars of a combined CMH and Breslow-Day run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmhBdSummary {
    pub common_odds_ratio: f64,
    pub cmh_statistic: f64,
    pub cmh_p_value: f64,
    pub breslow_day_statistic: f64,
    pub breslow_day_p_value: f64,
}

impl CmhBdSummary {
    /// `(common_odds_ratio, cmh_statistic, cmh_p_value, bd_statistic, bd_p_value)`.
    pub fn into_tuple(self) -> (f64, f64, f64, f64, f64) {
        (
            self.common_odds_ratio,
            self.cmh_statistic,
            self.cmh_p_value,
            self.breslow_day_statistic,
            self.breslow_day_p_value,
        )
    }
}

/// One reported stratum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumRow {
    pub label: String,
    pub pass0: f64,
    pub fail0: f64,
    pub pass1: f64,
    pub fail1: f64,
    pub total: f64,
    /// `None` when `fail0 * pass1 == 0`.
    pub odds_ratio: Option<f64>,
    pub bd_expected: f64,
    pub bd_contribution: f64,
}

/// Full outcome of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedReport {
    pub strata_count: usize,
    /// Labels of zero-total strata dropped under [`DegeneratePolicy::Skip`].
    pub skipped: Vec<String>,
    pub pass_rule: PassRule,
    pub common_odds_ratio: f64,
    pub odds_ratio_ci: (f64, f64),
    pub confidence: f64,
    pub cmh: ChiSquareTest,
    pub breslow_day: ChiSquareTest,
    pub tarone: ChiSquareTest,
    pub strata: Vec<StratumRow>,
}

impl StratifiedReport {
    pub fn summary(&self) -> CmhBdSummary {
        CmhBdSummary {
            common_odds_ratio: self.common_odds_ratio,
            cmh_statistic: self.cmh.statistic,
            cmh_p_value: self.cmh.p_value,
            breslow_day_statistic: self.breslow_day.statistic,
            breslow_day_p_value: self.breslow_day.p_value,
        }
    }
}

/// Apply `policy` to zero-total strata, returning the kept labelled strata
/// and the labels that were dropped.
pub fn apply_policy(
    labelled: Vec<(String, Stratum)>,
    policy: DegeneratePolicy,
) -> Result<(Vec<(String, Stratum)>, Vec<String>)> {
    let mut kept = Vec::with_capacity(labelled.len());
    let mut skipped = Vec::new();
    for (label, stratum) in labelled {
        if stratum.total() > 0.0 {
            kept.push((label, stratum));
            continue;
        }
        match policy {
            DegeneratePolicy::Raise => {
                return Err(AnalysisError::DegenerateTable(format!(
                    "stratum `{label}` has a zero total"
                )))
            }
            DegeneratePolicy::Skip => {
                warn!(%label, "skipping zero-total stratum");
                skipped.push(label);
            }
        }
    }
    if kept.is_empty() {
        return Err(AnalysisError::EmptyStrata);
    }
    Ok((kept, skipped))
}

/// Pooled odds ratio, CMH test and summed Breslow-Day test in one call.
///
/// Tables are parsed with `rule`; zero-total strata raise.
#[instrument(skip_all, fields(strata = tables.len(), rule = %rule))]
pub fn test_cmh_bd<T: ContingencyTable>(tables: &[T], rule: &PassRule) -> Result<CmhBdSummary> {
    let labelled = parse_all(tables, rule)?
        .into_iter()
        .enumerate()
        .map(|(idx, stratum)| (idx.to_string(), stratum))
        .collect();
    let (kept, _) = apply_policy(labelled, DegeneratePolicy::Raise)?;
    let strata: Vec<Stratum> = kept.into_iter().map(|(_, stratum)| stratum).collect();

    let common = multi_odds_ratio(&strata)?;
    let cmh = cmh_test(&strata)?;
    let bd = bres_day_all(&strata, common)?;
    debug!(common, cmh = cmh.statistic, bd = bd.test.statistic, "stratified tests done");

    Ok(CmhBdSummary {
        common_odds_ratio: common,
        cmh_statistic: cmh.statistic,
        cmh_p_value: cmh.p_value,
        breslow_day_statistic: bd.test.statistic,
        breslow_day_p_value: bd.test.p_value,
    })
}

/// Full report over labelled tables.
#[instrument(skip_all, fields(strata = tables.len(), rule = %options.pass_rule))]
pub fn analyze<T: ContingencyTable>(
    tables: &[(String, T)],
    options: &AnalysisOptions,
) -> Result<StratifiedReport> {
    let labelled = tables
        .iter()
        .map(|(label, table)| Ok((label.clone(), parse(table, &options.pass_rule)?)))
        .collect::<Result<Vec<_>>>()?;
    analyze_strata(labelled, options)
}

/// Full report over already-parsed strata.
pub fn analyze_strata(
    labelled: Vec<(String, Stratum)>,
    options: &AnalysisOptions,
) -> Result<StratifiedReport> {
    let (kept, skipped) = apply_policy(labelled, options.policy)?;
    let strata: Vec<Stratum> = kept.iter().map(|(_, stratum)| *stratum).collect();

    let common = multi_odds_ratio(&strata)?;
    let odds_ratio_ci = odds::mh_confidence_interval(&strata, common, options.confidence)?;
    let cmh = cmh_test(&strata)?;
    let bd = bres_day_all(&strata, common)?;

    let rows = kept
        .into_iter()
        .zip(&bd.terms)
        .map(|((label, stratum), term)| StratumRow {
            label,
            pass0: stratum.pass0,
            fail0: stratum.fail0,
            pass1: stratum.pass1,
            fail1: stratum.fail1,
            total: stratum.total(),
            odds_ratio: odds_ratio(&stratum).ok(),
            bd_expected: term.expected,
            bd_contribution: term.contribution,
        })
        .collect::<Vec<_>>();

    debug!(
        common,
        cmh = cmh.statistic,
        bd = bd.test.statistic,
        skipped = skipped.len(),
        "stratified report built"
    );

    Ok(StratifiedReport {
        strata_count: rows.len(),
        skipped,
        pass_rule: options.pass_rule.clone(),
        common_odds_ratio: common,
        odds_ratio_ci,
        confidence: options.confidence,
        cmh,
        breslow_day: bd.test,
        tarone: bd.tarone,
        strata: rows,
    })
}
