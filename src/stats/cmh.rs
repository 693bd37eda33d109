//! Cochran-Mantel-Haenszel test of pooled association.
//!
//! The statistic never applies a Yates continuity correction.

use crate::{
    error::{AnalysisError, Result},
    stats::{dist::ChiSquareTest, stratum::Stratum},
};

/// Null-hypothesis moments of cell `pass0` for one stratum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CmhTerm {
    /// `(pass0+fail0)(pass0+pass1)/n`.
    pub expected: f64,
    /// Hypergeometric variance of `pass0`.
    pub variance: f64,
}

/// Expected value and variance of `pass0`, or `None` when `n <= 1`.
pub fn cmh_term(stratum: &Stratum) -> Option<CmhTerm> {
    let n = stratum.total();
    if n <= 1.0 {
        return None;
    }
    let expected = stratum.group0() * stratum.passes() / n;
    let variance = stratum.group0() * stratum.group1() * stratum.passes() * stratum.fails()
        / (n * n * (n - 1.0));
    Some(CmhTerm { expected, variance })
}

/// CMH chi-squared statistic on one degree of freedom.
pub fn cmh_test(strata: &[Stratum]) -> Result<ChiSquareTest> {
    if strata.is_empty() {
        return Err(AnalysisError::EmptyStrata);
    }
    let (deviation, variance) = strata
        .iter()
        .filter_map(|stratum| cmh_term(stratum).map(|term| (stratum.pass0, term)))
        .fold((0.0, 0.0), |(dev, var), (observed, term)| {
            (dev + observed - term.expected, var + term.variance)
        });
    if variance <= 0.0 {
        return Err(AnalysisError::DegenerateTable(
            "CMH variance is zero; every stratum has a zero margin or n <= 1".into(),
        ));
    }
    ChiSquareTest::new(deviation * deviation / variance, 1.0)
}
