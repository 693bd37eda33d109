//! Tail probabilities backed by `statrs`.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use crate::error::{AnalysisError, Result};

/// A chi-squared test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

impl ChiSquareTest {
    /// Attach the upper-tail p-value for `statistic` on `df` degrees of freedom.
    pub fn new(statistic: f64, df: f64) -> Result<Self> {
        Ok(Self {
            statistic,
            df,
            p_value: chi2_sf(statistic, df)?,
        })
    }
}

/// Upper-tail probability of a chi-squared variable exceeding `statistic`.
///
/// Zero degrees of freedom is a point mass at zero, so the tail is 1.
pub fn chi2_sf(statistic: f64, df: f64) -> Result<f64> {
    if !statistic.is_finite() {
        return Err(AnalysisError::DegenerateTable(format!(
            "non-finite chi-squared statistic {statistic}"
        )));
    }
    if df == 0.0 {
        return Ok(1.0);
    }
    let dist = ChiSquared::new(df).map_err(|err| AnalysisError::Distribution(err.to_string()))?;
    Ok(dist.sf(statistic.max(0.0)).clamp(0.0, 1.0))
}

/// Two-sided standard normal critical value for a confidence `level`.
pub fn normal_critical(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(AnalysisError::Distribution(format!(
            "confidence level {level} outside (0, 1)"
        )));
    }
    let normal =
        Normal::new(0.0, 1.0).map_err(|err| AnalysisError::Distribution(err.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}
