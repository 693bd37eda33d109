//! Extraction of the four cell counts from one 2x2 table.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    data::table::ContingencyTable,
    error::{AnalysisError, Result},
};

/// Which outcome column counts as "pass".
///
/// Deserializes from a JSON boolean or string. Strings go through
/// [`FromStr`], so `"true"` and `"false"` are positional on every surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawPassRule")]
pub enum PassRule {
    /// `true`: column 0 is pass. `false`: column 1 is pass.
    ByPosition(bool),
    /// The named column is pass, the other one is fail.
    ByName(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPassRule {
    Flag(bool),
    Text(String),
}

impl From<RawPassRule> for PassRule {
    fn from(raw: RawPassRule) -> Self {
        match raw {
            RawPassRule::Flag(first) => Self::ByPosition(first),
            RawPassRule::Text(text) => match text.parse() {
                Ok(rule) => rule,
                Err(never) => match never {},
            },
        }
    }
}

impl Default for PassRule {
    fn default() -> Self {
        Self::ByPosition(true)
    }
}

impl PassRule {
    /// Index of the pass column; the fail column is the remaining one.
    pub fn pass_index(&self, columns: &[String]) -> Result<usize> {
        match self {
            Self::ByPosition(true) => Ok(0),
            Self::ByPosition(false) => Ok(1),
            Self::ByName(label) => columns
                .iter()
                .position(|column| column == label)
                .ok_or_else(|| AnalysisError::ColumnNotFound(label.clone())),
        }
    }

    /// The rule with pass and fail swapped.
    ///
    /// Only positional rules can be flipped without knowing the columns.
    pub fn reversed(&self) -> Option<Self> {
        match self {
            Self::ByPosition(first) => Some(Self::ByPosition(!first)),
            Self::ByName(_) => None,
        }
    }
}

impl FromStr for PassRule {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(if trimmed.eq_ignore_ascii_case("true") {
            Self::ByPosition(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Self::ByPosition(false)
        } else {
            Self::ByName(trimmed.to_string())
        })
    }
}

impl fmt::Display for PassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByPosition(first) => write!(f, "{first}"),
            Self::ByName(label) => f.write_str(label),
        }
    }
}

/// One 2x2 table in fixed cell order.
///
/// Row 0 is group 0, row 1 is group 1. Cells are counts stored as `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    pub pass0: f64,
    pub fail0: f64,
    pub pass1: f64,
    pub fail1: f64,
}

impl Stratum {
    /// Build a stratum, rejecting negative or non-finite cells.
    pub fn new(pass0: f64, fail0: f64, pass1: f64, fail1: f64) -> Result<Self> {
        let cells = [[pass0, fail0], [pass1, fail1]];
        for (row, values) in cells.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                validate_count(row, col, value)?;
            }
        }
        Ok(Self {
            pass0,
            fail0,
            pass1,
            fail1,
        })
    }

    pub fn total(&self) -> f64 {
        self.pass0 + self.fail0 + self.pass1 + self.fail1
    }

    /// `(pass0, fail0, pass1, fail1, total)`.
    pub fn cells(&self) -> (f64, f64, f64, f64, f64) {
        (self.pass0, self.fail0, self.pass1, self.fail1, self.total())
    }

    /// Group 0 row margin.
    pub fn group0(&self) -> f64 {
        self.pass0 + self.fail0
    }

    pub fn group1(&self) -> f64 {
        self.pass1 + self.fail1
    }

    /// Pass column margin.
    pub fn passes(&self) -> f64 {
        self.pass0 + self.pass1
    }

    pub fn fails(&self) -> f64 {
        self.fail0 + self.fail1
    }

    /// Same stratum with pass and fail exchanged.
    pub fn swapped_outcomes(&self) -> Self {
        Self {
            pass0: self.fail0,
            fail0: self.pass0,
            pass1: self.fail1,
            fail1: self.pass1,
        }
    }

    /// Every cell multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            pass0: self.pass0 * factor,
            fail0: self.fail0 * factor,
            pass1: self.pass1 * factor,
            fail1: self.fail1 * factor,
        }
    }
}

fn validate_count(row: usize, col: usize, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidCount { row, col, value })
    }
}

/// Parse one table into a [`Stratum`] using `rule` to pick the pass column.
pub fn parse<T: ContingencyTable + ?Sized>(table: &T, rule: &PassRule) -> Result<Stratum> {
    let (rows, cols) = table.shape();
    if rows != 2 || cols != 2 {
        return Err(AnalysisError::InvalidShape { rows, cols });
    }
    let pass = rule.pass_index(&table.column_labels())?;
    let fail = 1 - pass;

    let read = |row: usize, col: usize| -> Result<f64> {
        let value = table.cell(row, col)?;
        validate_count(row, col, value)?;
        Ok(value)
    };

    Ok(Stratum {
        pass0: read(0, pass)?,
        fail0: read(0, fail)?,
        pass1: read(1, pass)?,
        fail1: read(1, fail)?,
    })
}

/// Parse a sequence of tables with one rule, stopping at the first failure.
pub fn parse_all<T: ContingencyTable>(tables: &[T], rule: &PassRule) -> Result<Vec<Stratum>> {
    tables.iter().map(|table| parse(table, rule)).collect()
}
