//! Mantel-Haenszel common odds ratio.

use crate::{
    error::{AnalysisError, Result},
    stats::{dist::normal_critical, stratum::Stratum},
};

/// Classic odds ratio `(pass0 * fail1) / (fail0 * pass1)` of one table.
pub fn odds_ratio(stratum: &Stratum) -> Result<f64> {
    let denominator = stratum.fail0 * stratum.pass1;
    if denominator == 0.0 {
        return Err(AnalysisError::DegenerateTable(
            "odds ratio denominator fail0 * pass1 is zero".into(),
        ));
    }
    Ok(stratum.pass0 * stratum.fail1 / denominator)
}

/// Pooled odds ratio across strata.
///
/// A single stratum yields its own odds ratio. Several strata are pooled
/// with Mantel-Haenszel weights, each product divided by its stratum
/// total. Zero-total strata carry no information and add nothing.
pub fn multi_odds_ratio(strata: &[Stratum]) -> Result<f64> {
    match strata {
        [] => Err(AnalysisError::EmptyStrata),
        [single] => odds_ratio(single),
        _ => {
            let (numerator, denominator) = mh_sums(strata);
            if denominator == 0.0 {
                return Err(AnalysisError::DegenerateTable(
                    "pooled odds ratio denominator is zero in every stratum".into(),
                ));
            }
            Ok(numerator / denominator)
        }
    }
}

fn mh_sums(strata: &[Stratum]) -> (f64, f64) {
    strata
        .iter()
        .filter(|stratum| stratum.total() > 0.0)
        .fold((0.0, 0.0), |(num, den), stratum| {
            let n = stratum.total();
            (
                num + stratum.pass0 * stratum.fail1 / n,
                den + stratum.fail0 * stratum.pass1 / n,
            )
        })
}

/// Robins-Breslow-Greenland variance of `ln(R)` for the pooled ratio.
pub fn log_mh_variance(strata: &[Stratum]) -> Result<f64> {
    let mut sum_r = 0.0;
    let mut sum_s = 0.0;
    let mut sum_pr = 0.0;
    let mut sum_ps_qr = 0.0;
    let mut sum_qs = 0.0;
    for stratum in strata.iter().filter(|stratum| stratum.total() > 0.0) {
        let n = stratum.total();
        let p = (stratum.pass0 + stratum.fail1) / n;
        let q = (stratum.fail0 + stratum.pass1) / n;
        let r = stratum.pass0 * stratum.fail1 / n;
        let s = stratum.fail0 * stratum.pass1 / n;
        sum_r += r;
        sum_s += s;
        sum_pr += p * r;
        sum_ps_qr += p * s + q * r;
        sum_qs += q * s;
    }
    if sum_r == 0.0 || sum_s == 0.0 {
        return Err(AnalysisError::DegenerateTable(
            "log odds ratio variance undefined for a zero or infinite pooled ratio".into(),
        ));
    }
    Ok(sum_pr / (2.0 * sum_r * sum_r)
        + sum_ps_qr / (2.0 * sum_r * sum_s)
        + sum_qs / (2.0 * sum_s * sum_s))
}

/// Confidence interval for the pooled odds ratio `common` at `level`.
pub fn mh_confidence_interval(strata: &[Stratum], common: f64, level: f64) -> Result<(f64, f64)> {
    let z = normal_critical(level)?;
    let se = log_mh_variance(strata)?.sqrt();
    let log_r = common.ln();
    Ok(((log_r - z * se).exp(), (log_r + z * se).exp()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stratum(a: f64, b: f64, c: f64, d: f64) -> Stratum {
        Stratum::new(a, b, c, d).unwrap()
    }

    #[test]
    fn zero_total_strata_do_not_move_the_pooled_ratio() {
        let base = vec![stratum(10.0, 20.0, 30.0, 40.0), stratum(5.0, 7.0, 9.0, 3.0)];
        let mut padded = base.clone();
        padded.push(stratum(0.0, 0.0, 0.0, 0.0));
        let lhs = multi_odds_ratio(&base).unwrap();
        let rhs = multi_odds_ratio(&padded).unwrap();
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn all_zero_denominators_are_degenerate() {
        let strata = vec![stratum(4.0, 0.0, 3.0, 2.0), stratum(1.0, 5.0, 0.0, 2.0)];
        assert!(matches!(
            multi_odds_ratio(&strata),
            Err(AnalysisError::DegenerateTable(_))
        ));
    }

    #[test]
    fn interval_brackets_the_estimate() {
        let strata = vec![stratum(12.0, 30.0, 8.0, 90.0), stratum(20.0, 25.0, 15.0, 60.0)];
        let r = multi_odds_ratio(&strata).unwrap();
        let (low, high) = mh_confidence_interval(&strata, r, 0.95).unwrap();
        assert!(low < r && r < high);
    }
}
