#![allow(dead_code)]

use strata_scope::{data::table::LabeledTable, Stratum};

/// McDonald's mussel Lap allele counts: (label, pass0, fail0, pass1, fail1).
pub const MUSSELS: [(&str, f64, f64, f64, f64); 4] = [
    ("Tillamook", 69.0, 77.0, 56.0, 40.0),
    ("Yaquina", 257.0, 301.0, 61.0, 57.0),
    ("Alsea", 65.0, 79.0, 73.0, 71.0),
    ("Umpqua", 48.0, 48.0, 71.0, 55.0),
];

pub fn mussel_strata() -> Vec<Stratum> {
    MUSSELS
        .iter()
        .map(|&(_, a, b, c, d)| Stratum::new(a, b, c, d).unwrap())
        .collect()
}

pub fn mussel_tables() -> Vec<LabeledTable> {
    MUSSELS
        .iter()
        .map(|&(label, a, b, c, d)| {
            LabeledTable::new(["allele_94", "other"], [[a, b], [c, d]]).with_label(label)
        })
        .collect()
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}
