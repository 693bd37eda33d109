//! Breslow-Day test of odds ratio homogeneity, with Tarone's adjustment.
//!
//! For a stratum with group-0 margin `m = pass0 + fail0`, pass margin
//! `s = pass0 + pass1` and total `n`, the expected `pass0` under a common
//! odds ratio `r` is the root `E` of
//!
//! ```text
//! E (n - m - s + E) = r (m - E)(s - E)
//! (1 - r) E^2 + (n - m - s + r (m + s)) E - r m s = 0
//! ```
//!
//! lying in `[max(0, m + s - n), min(m, s)]`. Its variance is the inverse of
//! the summed reciprocals of the four reconstructed cells.

use serde::{Deserialize, Serialize};

use crate::{
    error::{AnalysisError, Result},
    stats::{dist::ChiSquareTest, stratum::Stratum},
};

const ROOT_TOLERANCE: f64 = 1e-9;

/// Per-stratum Breslow-Day quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreslowDayTerm {
    /// Expected `pass0` under the common odds ratio.
    pub expected: f64,
    pub variance: f64,
    /// `(pass0 - expected)^2 / variance`.
    pub contribution: f64,
}

/// Aggregate homogeneity test across strata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreslowDay {
    pub test: ChiSquareTest,
    /// Tarone-adjusted statistic on the same degrees of freedom.
    pub tarone: ChiSquareTest,
    pub terms: Vec<BreslowDayTerm>,
}

/// Expected `pass0` of `stratum` when its odds ratio equals `r`.
pub fn expected_cell(stratum: &Stratum, r: f64) -> Result<f64> {
    if !(r.is_finite() && r > 0.0) {
        return Err(AnalysisError::DegenerateTable(format!(
            "common odds ratio {r} must be finite and positive"
        )));
    }
    let n = stratum.total();
    let m = stratum.group0();
    let s = stratum.passes();
    let lower = (m + s - n).max(0.0);
    let upper = m.min(s);

    let a = 1.0 - r;
    let b = n - m - s + r * (m + s);
    let c = -r * m * s;

    let roots = if a.abs() < f64::EPSILON {
        if b == 0.0 {
            Vec::new()
        } else {
            vec![-c / b]
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            Vec::new()
        } else {
            // Stable form: q carries the sign of b so no cancellation occurs.
            let q = -0.5 * (b + b.signum() * disc.sqrt());
            if q == 0.0 {
                vec![0.0]
            } else {
                vec![q / a, c / q]
            }
        }
    };

    roots
        .into_iter()
        .find(|root| *root >= lower - ROOT_TOLERANCE && *root <= upper + ROOT_TOLERANCE)
        .map(|root| root.clamp(lower, upper))
        .ok_or_else(|| {
            AnalysisError::DegenerateTable(format!(
                "no expected cell in [{lower}, {upper}] for odds ratio {r}"
            ))
        })
}

/// Expected cell, its variance and the stratum's statistic contribution.
pub fn bres_day_term(stratum: &Stratum, r: f64) -> Result<BreslowDayTerm> {
    let expected = expected_cell(stratum, r)?;
    let n = stratum.total();
    let m = stratum.group0();
    let s = stratum.passes();
    let cells = [expected, m - expected, s - expected, n - m - s + expected];
    if cells.iter().any(|cell| *cell <= 0.0) {
        return Err(AnalysisError::DegenerateTable(format!(
            "expected cells {cells:?} are not all positive"
        )));
    }
    let variance = 1.0 / cells.iter().map(|cell| 1.0 / cell).sum::<f64>();
    let deviation = stratum.pass0 - expected;
    Ok(BreslowDayTerm {
        expected,
        variance,
        contribution: deviation * deviation / variance,
    })
}

/// Breslow-Day statistic of a single stratum against `r`, on one degree of
/// freedom.
pub fn bres_day(stratum: &Stratum, r: f64) -> Result<ChiSquareTest> {
    let term = bres_day_term(stratum, r)?;
    ChiSquareTest::new(term.contribution, 1.0)
}

/// Sum of per-stratum statistics on `K - 1` degrees of freedom.
pub fn bres_day_all(strata: &[Stratum], r: f64) -> Result<BreslowDay> {
    if strata.is_empty() {
        return Err(AnalysisError::EmptyStrata);
    }
    let terms = strata
        .iter()
        .map(|stratum| bres_day_term(stratum, r))
        .collect::<Result<Vec<_>>>()?;

    let statistic: f64 = terms.iter().map(|term| term.contribution).sum();
    let deviation: f64 = strata
        .iter()
        .zip(&terms)
        .map(|(stratum, term)| stratum.pass0 - term.expected)
        .sum();
    let variance: f64 = terms.iter().map(|term| term.variance).sum();
    let tarone = (statistic - deviation * deviation / variance).max(0.0);

    let df = (strata.len() - 1) as f64;
    Ok(BreslowDay {
        test: ChiSquareTest::new(statistic, df)?,
        tarone: ChiSquareTest::new(tarone, df)?,
        terms,
    })
}
