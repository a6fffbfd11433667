use std::collections::BTreeMap;

use thiserror::Error;

use crate::data::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Chart preconditions
// ---------------------------------------------------------------------------

/// User-facing precondition failures.  These are shown inline in place of the
/// affected chart; they never abort the rest of the page.
#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("Select at least two columns to show correlations.")]
    NotEnoughColumns,
    #[error("Column '{0}' was not found in the dataset.")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric.")]
    NotNumeric(String),
}

fn require_numeric(dataset: &Dataset, column: &str) -> Result<(), ChartError> {
    if !dataset.has_column(column) {
        return Err(ChartError::MissingColumn(column.to_string()));
    }
    if !dataset.is_numeric(column) {
        return Err(ChartError::NotNumeric(column.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient over paired samples.  NaN when fewer than
/// two pairs exist or either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Pairwise-complete rows of two numeric columns: only rows where both cells
/// hold a number contribute.
fn paired_values(dataset: &Dataset, a: &str, b: &str) -> (Vec<f64>, Vec<f64>) {
    let (Some(col_a), Some(col_b)) = (dataset.column(a), dataset.column(b)) else {
        return (Vec::new(), Vec::new());
    };
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (ca, cb) in col_a.iter().zip(col_b.iter()) {
        if let (Some(x), Some(y)) = (ca.as_f64(), cb.as_f64()) {
            xs.push(x);
            ys.push(y);
        }
    }
    (xs, ys)
}

/// A square pairwise-correlation matrix with its column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]` = correlation of labels[i] with labels[j].
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }
}

/// Pairwise Pearson correlations over the selected columns.
///
/// Requires at least two columns, each present and numeric.  The result is
/// symmetric with a unit diagonal; degenerate pairs (constant columns) give
/// NaN off the diagonal.
pub fn correlation_matrix(
    dataset: &Dataset,
    columns: &[String],
) -> Result<CorrelationMatrix, ChartError> {
    if columns.len() < 2 {
        return Err(ChartError::NotEnoughColumns);
    }
    for col in columns {
        require_numeric(dataset, col)?;
    }

    let n = columns.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let (xs, ys) = paired_values(dataset, &columns[i], &columns[j]);
            let r = pearson(&xs, &ys);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        labels: columns.to_vec(),
        values,
    })
}

// ---------------------------------------------------------------------------
// Histogram + density estimate
// ---------------------------------------------------------------------------

/// Default bin count for distribution charts.
pub const HISTOGRAM_BINS: usize = 20;

/// Equal-width binned frequencies of a numeric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Left edge of the first bin.
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Center of bin `i`, for bar placement.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }

    /// Total count over all bins.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` into `bins` equal-width buckets spanning [min, max].  Every
/// input value lands in exactly one bin.  A degenerate range (empty input or
/// all values equal) collapses to a single bin holding everything.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if values.is_empty() || bins == 0 || min >= max {
        return Histogram {
            start: if min.is_finite() { min - 0.5 } else { 0.0 },
            bin_width: 1.0,
            counts: vec![values.len()],
        };
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram {
        start: min,
        bin_width,
        counts,
    }
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Linear-interpolated quantile of a sorted sample, p in [0, 1].
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = p * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Gaussian kernel density estimate sampled on an even grid, for overlaying
/// a smoothed curve on a histogram.  Bandwidth is Silverman's rule; a sample
/// too small or constant to estimate yields an empty curve.
pub fn density_curve(values: &[f64], points: usize) -> Vec<[f64; 2]> {
    if values.len() < 2 || points < 2 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let std = sample_std(values);
    let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);
    let spread = if iqr > 0.0 {
        std.min(iqr / 1.34)
    } else {
        std
    };
    let bandwidth = 0.9 * spread * (values.len() as f64).powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    let lo = sorted[0] - 3.0 * bandwidth;
    let hi = sorted[sorted.len() - 1] + 3.0 * bandwidth;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|&v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            [x, density]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary driving one box-and-whisker element.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

/// Quartiles by linear interpolation; whiskers reach the most extreme data
/// points within 1.5 × IQR of the box.  `None` for an empty sample.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let lower_whisker = sorted
        .iter()
        .cloned()
        .find(|&v| v >= lo_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .cloned()
        .find(|&v| v <= hi_fence)
        .unwrap_or(q3);

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
    })
}

/// Box statistics of numeric column `y` grouped by the distinct values of
/// column `x`, ordered by group value.  Rows missing either cell are skipped.
pub fn grouped_box_stats(
    dataset: &Dataset,
    x_column: &str,
    y_column: &str,
) -> Result<Vec<(String, BoxStats)>, ChartError> {
    if !dataset.has_column(x_column) {
        return Err(ChartError::MissingColumn(x_column.to_string()));
    }
    require_numeric(dataset, y_column)?;

    let x_cells = dataset.column(x_column).unwrap_or(&[]);
    let y_cells = dataset.column(y_column).unwrap_or(&[]);

    let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
    for (x, y) in x_cells.iter().zip(y_cells.iter()) {
        if x.is_null() {
            continue;
        }
        if let Some(v) = y.as_f64() {
            groups.entry(x.clone()).or_default().push(v);
        }
    }

    Ok(groups
        .into_iter()
        .filter_map(|(value, ys)| box_stats(&ys).map(|stats| (value.to_string(), stats)))
        .collect())
}

// ---------------------------------------------------------------------------
// Prediction-result counts
// ---------------------------------------------------------------------------

/// Distinct-class counts for a prediction-result chart.  The named column
/// must exist; its absence is a reportable error, never a panic.
pub fn prediction_counts(
    dataset: &Dataset,
    column: &str,
) -> Result<Vec<(CellValue, usize)>, ChartError> {
    if !dataset.has_column(column) {
        return Err(ChartError::MissingColumn(column.to_string()));
    }
    Ok(dataset.value_counts(column))
}

// ---------------------------------------------------------------------------
// Scatter pairs
// ---------------------------------------------------------------------------

/// (x, y) pairs for a scatter plot, one per row where both cells are numeric.
pub fn scatter_points(
    dataset: &Dataset,
    x_column: &str,
    y_column: &str,
) -> Result<Vec<[f64; 2]>, ChartError> {
    require_numeric(dataset, x_column)?;
    require_numeric(dataset, y_column)?;

    let (xs, ys) = paired_values(dataset, x_column, y_column);
    Ok(xs.into_iter().zip(ys).map(|(x, y)| [x, y]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn numeric_dataset(cols: &[(&str, Vec<f64>)]) -> Dataset {
        let mut columns = Map::new();
        let mut names = Vec::new();
        for (name, values) in cols {
            names.push(name.to_string());
            columns.insert(
                name.to_string(),
                values.iter().map(|&v| CellValue::Float(v)).collect(),
            );
        }
        Dataset::from_columns(names, columns)
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);

        let inv = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &inv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_degenerate_is_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn correlation_matrix_is_square_symmetric_unit_diagonal() {
        let ds = numeric_dataset(&[
            ("G1", vec![10.0, 12.0, 14.0, 9.0]),
            ("G2", vec![11.0, 13.0, 15.0, 10.0]),
            ("absences", vec![4.0, 0.0, 2.0, 10.0]),
        ]);
        let cols: Vec<String> = ["G1", "G2", "absences"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let m = correlation_matrix(&ds, &cols).unwrap();

        assert_eq!(m.size(), 3);
        assert_eq!(m.values.len(), 3);
        for i in 0..3 {
            assert_eq!(m.values[i].len(), 3);
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..3 {
                let v = m.values[i][j];
                assert_eq!(v.to_bits(), m.values[j][i].to_bits());
                if !v.is_nan() {
                    assert!((-1.0..=1.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn correlation_requires_two_columns() {
        let ds = numeric_dataset(&[("G1", vec![10.0, 12.0])]);
        // Repeated calls with too few columns keep failing the same way and
        // never produce a matrix.
        for _ in 0..3 {
            assert_eq!(
                correlation_matrix(&ds, &["G1".to_string()]),
                Err(ChartError::NotEnoughColumns)
            );
        }
        assert_eq!(
            correlation_matrix(&ds, &[]),
            Err(ChartError::NotEnoughColumns)
        );
    }

    #[test]
    fn correlation_rejects_text_columns() {
        let mut columns = Map::new();
        columns.insert(
            "G1".to_string(),
            vec![CellValue::Float(1.0), CellValue::Float(2.0)],
        );
        columns.insert(
            "sex".to_string(),
            vec![
                CellValue::Text("F".to_string()),
                CellValue::Text("M".to_string()),
            ],
        );
        let ds = Dataset::from_columns(vec!["G1".to_string(), "sex".to_string()], columns);
        assert_eq!(
            correlation_matrix(&ds, &["G1".to_string(), "sex".to_string()]),
            Err(ChartError::NotNumeric("sex".to_string()))
        );
        assert_eq!(
            correlation_matrix(&ds, &["G1".to_string(), "G4".to_string()]),
            Err(ChartError::MissingColumn("G4".to_string()))
        );
    }

    #[test]
    fn correlation_two_by_two_unit_diagonal() {
        let ds = numeric_dataset(&[("G1", vec![10.0, 12.0, 14.0]), ("G2", vec![11.0, 13.0, 15.0])]);
        let m = correlation_matrix(&ds, &["G1".to_string(), "G2".to_string()]).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.values[0][0], 1.0);
        assert_eq!(m.values[1][1], 1.0);
        assert!((m.values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_counts_sum_to_sample_size() {
        let values: Vec<f64> = (0..137).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        let h = histogram(&values, HISTOGRAM_BINS);
        assert_eq!(h.counts.len(), HISTOGRAM_BINS);
        assert_eq!(h.total(), values.len());
    }

    #[test]
    fn histogram_degenerate_range_single_bin() {
        let h = histogram(&[5.0, 5.0, 5.0], 20);
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.total(), 3);

        let empty = histogram(&[], 20);
        assert_eq!(empty.total(), 0);
    }

    #[test]
    fn density_curve_is_positive_and_spans_data() {
        let values = [1.0, 2.0, 2.0, 3.0, 4.0, 4.5, 5.0];
        let curve = density_curve(&values, 50);
        assert_eq!(curve.len(), 50);
        assert!(curve.iter().all(|p| p[1] >= 0.0));
        assert!(curve.first().unwrap()[0] < 1.0);
        assert!(curve.last().unwrap()[0] > 5.0);

        // Constant samples have no estimable bandwidth.
        assert!(density_curve(&[2.0, 2.0, 2.0], 50).is_empty());
    }

    #[test]
    fn box_stats_known_quartiles() {
        let stats = box_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn box_whiskers_exclude_outliers() {
        let mut values = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        values.push(100.0); // far outlier
        let stats = box_stats(&values).unwrap();
        assert!(stats.upper_whisker <= 14.0);
        assert!(stats.lower_whisker >= 10.0);
    }

    #[test]
    fn grouped_boxes_by_category() {
        let mut columns = Map::new();
        columns.insert(
            "sex".to_string(),
            vec![
                CellValue::Text("F".to_string()),
                CellValue::Text("M".to_string()),
                CellValue::Text("F".to_string()),
                CellValue::Text("M".to_string()),
            ],
        );
        columns.insert(
            "G3".to_string(),
            vec![
                CellValue::Integer(12),
                CellValue::Integer(10),
                CellValue::Integer(14),
                CellValue::Integer(8),
            ],
        );
        let ds = Dataset::from_columns(vec!["sex".to_string(), "G3".to_string()], columns);

        let groups = grouped_box_stats(&ds, "sex", "G3").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "F");
        assert_eq!(groups[0].1.median, 13.0);
        assert_eq!(groups[1].0, "M");
        assert_eq!(groups[1].1.median, 9.0);

        assert_eq!(
            grouped_box_stats(&ds, "sex", "sex"),
            Err(ChartError::NotNumeric("sex".to_string()))
        );
    }

    #[test]
    fn prediction_counts_require_the_column() {
        let ds = numeric_dataset(&[("G1", vec![10.0, 12.0])]);
        assert_eq!(
            prediction_counts(&ds, "Predicted Result"),
            Err(ChartError::MissingColumn("Predicted Result".to_string()))
        );

        let mut columns = Map::new();
        columns.insert(
            "Predicted Result".to_string(),
            vec![
                CellValue::Text("Pass".to_string()),
                CellValue::Text("Fail".to_string()),
                CellValue::Text("Pass".to_string()),
            ],
        );
        let ds = Dataset::from_columns(vec!["Predicted Result".to_string()], columns);
        let counts = prediction_counts(&ds, "Predicted Result").unwrap();
        assert_eq!(
            counts,
            vec![
                (CellValue::Text("Fail".to_string()), 1),
                (CellValue::Text("Pass".to_string()), 2),
            ]
        );
    }

    #[test]
    fn scatter_pairs_one_point_per_row() {
        let ds = numeric_dataset(&[("G1", vec![10.0, 12.0, 14.0]), ("G2", vec![11.0, 13.0, 15.0])]);
        let points = scatter_points(&ds, "G1", "G2").unwrap();
        assert_eq!(points, vec![[10.0, 11.0], [12.0, 13.0], [14.0, 15.0]]);
    }
}
