mod common;

use common::{assert_close, mussel_strata, mussel_tables};
use strata_scope::{
    data::table::LabeledTable,
    stats::{self, bres_day_all, cmh_test, multi_odds_ratio, odds_ratio, AnalysisOptions},
    test_cmh_bd, AnalysisError, PassRule, Stratum,
};

#[test]
fn pooled_odds_ratio_matches_reference() {
    let r = multi_odds_ratio(&mussel_strata()).unwrap();
    assert_close(r, 0.759_022, 1e-6);
    assert_close(1.0 / r, 1.317_485, 1e-6);
}

#[test]
fn cmh_matches_reference() {
    let test = cmh_test(&mussel_strata()).unwrap();
    assert_close(test.statistic, 5.320_928, 1e-6);
    assert_close(test.p_value, 0.021_071, 1e-6);
    assert_eq!(test.df, 1.0);
}

#[test]
fn breslow_day_matches_reference() {
    let strata = mussel_strata();
    let r = multi_odds_ratio(&strata).unwrap();
    let bd = bres_day_all(&strata, r).unwrap();
    assert_close(bd.test.statistic, 0.529_486, 1e-6);
    assert_close(bd.test.p_value, 0.912_367, 1e-6);
    assert_eq!(bd.test.df, 3.0);
    assert_close(bd.terms[0].expected, 71.436_165, 1e-5);
    assert_close(bd.terms[1].contribution, 0.060_439, 1e-6);
    assert!(bd.tarone.statistic <= bd.test.statistic);
    assert_close(bd.tarone.statistic, 0.529_486, 1e-5);
}

#[test]
fn combined_entry_point_returns_all_five_scalars() {
    let tables = mussel_tables();
    let (r, cmh, cmh_p, bd, bd_p) = test_cmh_bd(&tables, &PassRule::ByPosition(true))
        .unwrap()
        .into_tuple();
    assert_close(r, 0.759_022, 1e-6);
    assert_close(cmh, 5.320_928, 1e-6);
    assert_close(cmh_p, 0.021_071, 1e-6);
    assert_close(bd, 0.529_486, 1e-6);
    assert_close(bd_p, 0.912_367, 1e-6);
}

#[test]
fn reversing_the_pass_rule_inverts_only_the_odds_ratio() {
    let tables = mussel_tables();
    let rule = PassRule::ByPosition(true);
    let flipped = rule.reversed().unwrap();
    assert_eq!(flipped, PassRule::ByPosition(false));
    assert_eq!(PassRule::ByName("other".into()).reversed(), None);
    let forward = test_cmh_bd(&tables, &rule).unwrap();
    let reversed = test_cmh_bd(&tables, &flipped).unwrap();
    assert_close(reversed.common_odds_ratio, 1.317_485, 1e-6);
    assert_close(
        reversed.common_odds_ratio * forward.common_odds_ratio,
        1.0,
        1e-12,
    );
    assert_close(reversed.cmh_statistic, forward.cmh_statistic, 1e-9);
    assert_close(reversed.cmh_p_value, forward.cmh_p_value, 1e-9);
    assert_close(reversed.breslow_day_statistic, forward.breslow_day_statistic, 1e-9);
    assert_close(reversed.breslow_day_p_value, forward.breslow_day_p_value, 1e-9);
}

#[test]
fn named_pass_column_matches_positional_rule() {
    let tables = mussel_tables();
    let by_name = test_cmh_bd(&tables, &PassRule::ByName("other".into())).unwrap();
    let by_position = test_cmh_bd(&tables, &PassRule::ByPosition(false)).unwrap();
    assert_eq!(by_name, by_position);
}

#[test]
fn opposing_stratum_is_flagged_as_heterogeneous() {
    let baseline = test_cmh_bd(&mussel_tables(), &PassRule::default()).unwrap();

    let mut tables = mussel_tables();
    tables[3] = LabeledTable::new(["allele_94", "other"], [[20.0, 76.0], [99.0, 27.0]]);
    let perturbed = test_cmh_bd(&tables, &PassRule::default()).unwrap();

    assert!(perturbed.breslow_day_statistic > baseline.breslow_day_statistic);
    assert_close(perturbed.breslow_day_statistic, 47.155_471, 1e-5);
    assert!(perturbed.breslow_day_p_value < 1e-6);
    assert!(baseline.breslow_day_p_value > 0.9);
}

#[test]
fn tenfold_volume_strengthens_cmh_evidence() {
    let strata = mussel_strata();
    let base = cmh_test(&strata).unwrap();
    let mut scaled = strata.clone();
    scaled[0] = scaled[0].scaled(10.0);
    let bigger = cmh_test(&scaled).unwrap();
    assert!(bigger.statistic > base.statistic);
    assert!(bigger.p_value < base.p_value);
    assert_close(bigger.statistic, 29.614_071, 1e-5);
}

#[test]
fn single_stratum_uses_classic_odds_ratio() {
    let stratum = Stratum::new(12.0, 30.0, 8.0, 90.0).unwrap();
    let pooled = multi_odds_ratio(&[stratum]).unwrap();
    assert_close(pooled, 12.0 * 90.0 / (30.0 * 8.0), 1e-12);
    assert_close(pooled, odds_ratio(&stratum).unwrap(), 0.0);
}

#[test]
fn zero_total_stratum_raises_by_default() {
    let mut tables = mussel_tables();
    tables.push(LabeledTable::new(["allele_94", "other"], [[0.0, 0.0], [0.0, 0.0]]));
    let err = test_cmh_bd(&tables, &PassRule::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateTable(_)));
}

#[test]
fn skip_policy_drops_zero_total_strata() {
    let mut tables: Vec<(String, LabeledTable)> = mussel_tables()
        .into_iter()
        .map(|table| (table.label.clone().unwrap_or_default(), table))
        .collect();
    tables.insert(
        1,
        (
            "Empty".to_string(),
            LabeledTable::new(["allele_94", "other"], [[0.0, 0.0], [0.0, 0.0]]),
        ),
    );
    let options = AnalysisOptions {
        policy: stats::DegeneratePolicy::Skip,
        ..AnalysisOptions::default()
    };
    let report = stats::analyze(&tables, &options).unwrap();
    assert_eq!(report.skipped, vec!["Empty".to_string()]);
    assert_eq!(report.strata_count, 4);
    assert_eq!(report.strata[1].label, "Yaquina");
    assert_close(report.breslow_day.statistic, 0.529_486, 1e-6);
}

#[test]
fn wrong_shape_fails_without_partial_result() {
    let mut tables = mussel_tables();
    tables[2] = LabeledTable {
        label: None,
        columns: vec!["a".into(), "b".into(), "c".into()],
        rows: vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
    };
    let err = test_cmh_bd(&tables, &PassRule::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidShape { rows: 2, cols: 3 }));
}

#[test]
fn report_carries_interval_and_rows() {
    let tables: Vec<(String, LabeledTable)> = mussel_tables()
        .into_iter()
        .map(|table| (table.label.clone().unwrap_or_default(), table))
        .collect();
    let report = stats::analyze(&tables, &AnalysisOptions::default()).unwrap();
    assert_close(report.odds_ratio_ci.0, 0.600_552, 1e-4);
    assert_close(report.odds_ratio_ci.1, 0.959_308, 1e-4);
    assert_eq!(report.strata[0].label, "Tillamook");
    assert_close(report.strata[0].odds_ratio.unwrap(), 69.0 * 40.0 / (77.0 * 56.0), 1e-12);
    assert_eq!(report.summary().cmh_statistic, report.cmh.statistic);
}

#[test]
fn pass_rule_text_means_the_same_in_json_and_on_the_command_line() {
    for text in ["true", "false", "other"] {
        let from_json: PassRule = serde_json::from_value(serde_json::json!(text)).unwrap();
        let from_cli: PassRule = text.parse().unwrap();
        assert_eq!(from_json, from_cli);
    }
    let flag: PassRule = serde_json::from_str("false").unwrap();
    assert_eq!(flag, PassRule::ByPosition(false));
    let quoted: PassRule = serde_json::from_str("\"TRUE\"").unwrap();
    assert_eq!(quoted, PassRule::ByPosition(true));
}
