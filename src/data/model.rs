use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common CSV dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

// -- Manual Eq/Ord so we can key BTreeMaps with CellValue --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw CSV field.  Empty → `Null`, then integer,
    /// then float, otherwise text.
    pub fn parse(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }

    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whether the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Column-major table loaded from a CSV file.  Immutable after load; all
/// columns have length `n_rows`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Column names in CSV header order.
    pub column_names: Vec<String>,
    /// column name → cells, one per row.
    pub columns: BTreeMap<String, Vec<CellValue>>,
    /// Number of rows.
    pub n_rows: usize,
}

impl Dataset {
    /// Build a dataset from parallel columns.  `column_names` fixes the
    /// display order; every listed column must be present and equal-length.
    pub fn from_columns(
        column_names: Vec<String>,
        columns: BTreeMap<String, Vec<CellValue>>,
    ) -> Self {
        let n_rows = columns.values().next().map(Vec::len).unwrap_or(0);
        Dataset {
            column_names,
            columns,
            n_rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// The cells of a column, in row order.
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// A column counts as numeric when every non-missing cell is a number.
    pub fn is_numeric(&self, name: &str) -> bool {
        match self.column(name) {
            Some(cells) => cells.iter().all(|c| c.is_null() || c.as_f64().is_some()),
            None => false,
        }
    }

    /// Non-missing values of a column as `f64`, row order preserved.
    /// Non-numeric cells are skipped.
    pub fn numeric_values(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .map(|cells| cells.iter().filter_map(CellValue::as_f64).collect())
            .unwrap_or_default()
    }

    /// Occurrence count per distinct value of a column, ordered by value.
    pub fn value_counts(&self, name: &str) -> Vec<(CellValue, usize)> {
        let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
        if let Some(cells) = self.column(name) {
            for cell in cells {
                if cell.is_null() {
                    continue;
                }
                *counts.entry(cell.clone()).or_default() += 1;
            }
        }
        counts.into_iter().collect()
    }
}
