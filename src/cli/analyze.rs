//! CLI entry-point for analysing stratified 2x2 tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::{
        load::{self, Layout},
        report,
    },
    stats::{self, AnalysisOptions, DegeneratePolicy, PassRule, StratifiedReport},
};

/// Args for the `analyze` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Long-format CSV: stratum column, group column and two outcome columns.
    #[arg(long)]
    pub input: PathBuf,
    /// Pass column: `true` (first), `false` (second) or a column name.
    #[arg(long, default_value = "true")]
    pub pass: PassRule,
    /// Override the stratum column name.
    #[arg(long)]
    pub stratum_col: Option<String>,
    /// Override the group column name.
    #[arg(long)]
    pub group_col: Option<String>,
    /// Group labels for row 0 and row 1, comma separated. Defaults to the
    /// order of the first stratum in the file.
    #[arg(long, value_delimiter = ',')]
    pub group_order: Option<Vec<String>>,
    /// Handling of zero-total strata.
    #[arg(long, value_enum)]
    pub policy: Option<DegeneratePolicy>,
    /// Confidence level of the pooled odds ratio interval.
    #[arg(long)]
    pub confidence: Option<f64>,
    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let layout = Layout {
        stratum_col: args.stratum_col.unwrap_or(settings.stratum_column.clone()),
        group_col: args.group_col.unwrap_or(settings.group_column.clone()),
        group_order: args.group_order,
    };
    let options = AnalysisOptions {
        pass_rule: args.pass,
        policy: args.policy.unwrap_or(settings.degenerate_policy),
        confidence: args.confidence.unwrap_or(settings.confidence),
    };

    let frames = load::read_strata_csv(&args.input, &layout)?;
    let tables: Vec<_> = frames
        .into_iter()
        .map(|frame| (frame.label, frame.table))
        .collect();
    let report = stats::analyze(&tables, &options)
        .with_context(|| format!("analysing {}", args.input.display()))?;

    let out_path = settings.join_output("strata_report.csv");
    report::persist_report(&report, &out_path)?;
    info!(
        strata = report.strata_count,
        common_odds_ratio = report.common_odds_ratio,
        "analysis complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_text(&report));
    }
    Ok(())
}

/// Human-readable report.
pub fn render_text(report: &StratifiedReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10}\n",
        "stratum", "pass0", "fail0", "pass1", "fail1", "odds", "bd_chi2"
    ));
    for row in &report.strata {
        let odds = row
            .odds_ratio
            .map(|value| format!("{value:.4}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<16} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10.4}\n",
            row.label, row.pass0, row.fail0, row.pass1, row.fail1, odds, row.bd_contribution
        ));
    }
    if !report.skipped.is_empty() {
        out.push_str(&format!("skipped: {}\n", report.skipped.join(", ")));
    }
    out.push_str(&format!(
        "\ncommon odds ratio  {:.4} ({:.0}% CI {:.4}-{:.4})\n",
        report.common_odds_ratio,
        report.confidence * 100.0,
        report.odds_ratio_ci.0,
        report.odds_ratio_ci.1
    ));
    out.push_str(&format!(
        "CMH                chi2 = {:.4}, df = {}, p = {:.4e}\n",
        report.cmh.statistic, report.cmh.df, report.cmh.p_value
    ));
    out.push_str(&format!(
        "Breslow-Day        chi2 = {:.4}, df = {}, p = {:.4e}\n",
        report.breslow_day.statistic, report.breslow_day.df, report.breslow_day.p_value
    ));
    out.push_str(&format!(
        "Tarone-adjusted    chi2 = {:.4}, df = {}, p = {:.4e}",
        report.tarone.statistic, report.tarone.df, report.tarone.p_value
    ));
    out
}
