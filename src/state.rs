use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::data::loader::DatasetCache;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Chart kind – per-column visualization choice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Distribution,
    BoxPlot,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::Distribution,
        ChartKind::BoxPlot,
        ChartKind::Scatter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Distribution => "Distribution",
            ChartKind::BoxPlot => "Box Plot",
            ChartKind::Scatter => "Scatter Plot",
        }
    }

    /// Whether this chart needs an auxiliary x-axis column.
    pub fn needs_x_axis(self) -> bool {
        matches!(self, ChartKind::BoxPlot | ChartKind::Scatter)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.  Everything except the
/// cached dataset is re-read on every frame.
pub struct AppState {
    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Dataset>,

    /// Path the current dataset came from.
    pub source_path: Option<PathBuf>,

    /// Memoized datasets keyed by file path.
    pub cache: DatasetCache,

    /// Columns chosen for correlation / per-column visualizations.
    pub selected_columns: BTreeSet<String>,

    /// Per-column chart-type choice.
    pub chart_kinds: BTreeMap<String, ChartKind>,

    /// Per-column auxiliary x-axis choice for box / scatter plots.
    pub x_axis_choices: BTreeMap<String, String>,

    /// Label shown on the prediction-result chart.
    pub model_name: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            source_path: None,
            cache: DatasetCache::default(),
            selected_columns: BTreeSet::new(),
            chart_kinds: BTreeMap::new(),
            x_axis_choices: BTreeMap::new(),
            model_name: "Grade Predictor".to_string(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and drop selections that reference
    /// columns the new schema does not have.
    pub fn set_dataset(&mut self, dataset: Dataset, path: PathBuf) {
        self.selected_columns
            .retain(|col| dataset.has_column(col));
        self.chart_kinds.retain(|col, _| dataset.has_column(col));
        self.x_axis_choices
            .retain(|col, axis| dataset.has_column(col) && dataset.has_column(axis));

        self.dataset = Some(dataset);
        self.source_path = Some(path);
        self.status_message = None;
    }

    /// Load a dataset through the cache; failures land in `status_message`
    /// and leave any previously loaded dataset untouched.
    pub fn load_from_path(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(dataset) => {
                let dataset = dataset.clone();
                self.set_dataset(dataset, path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Toggle a column in the correlation selection.
    pub fn toggle_column(&mut self, column: &str) {
        if !self.selected_columns.remove(column) {
            self.selected_columns.insert(column.to_string());
        }
    }

    /// Selected columns in dataset (header) order, so charts keep a stable
    /// layout as the selection changes.
    pub fn selected_in_order(&self) -> Vec<String> {
        match &self.dataset {
            Some(ds) => ds
                .column_names
                .iter()
                .filter(|c| self.selected_columns.contains(*c))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Chart kind chosen for a column (Distribution until changed).
    pub fn chart_kind(&self, column: &str) -> ChartKind {
        self.chart_kinds.get(column).copied().unwrap_or_default()
    }

    pub fn set_chart_kind(&mut self, column: &str, kind: ChartKind) {
        self.chart_kinds.insert(column.to_string(), kind);
    }

    /// Auxiliary x-axis column for a box / scatter chart.  Falls back to the
    /// first selected column when no (still-selected) choice exists.
    pub fn x_axis_for(&self, column: &str) -> Option<String> {
        if let Some(axis) = self.x_axis_choices.get(column) {
            if self.selected_columns.contains(axis) {
                return Some(axis.clone());
            }
        }
        self.selected_in_order().first().cloned()
    }

    pub fn set_x_axis(&mut self, column: &str, axis: String) {
        self.x_axis_choices.insert(column.to_string(), axis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::stats;
    use std::collections::BTreeMap as Map;
    use std::io::Write;

    fn three_row_grades() -> Dataset {
        let mut columns = Map::new();
        columns.insert(
            "G1".to_string(),
            vec![
                CellValue::Integer(10),
                CellValue::Integer(12),
                CellValue::Integer(14),
            ],
        );
        columns.insert(
            "G2".to_string(),
            vec![
                CellValue::Integer(11),
                CellValue::Integer(13),
                CellValue::Integer(15),
            ],
        );
        columns.insert(
            "G3".to_string(),
            vec![
                CellValue::Integer(12),
                CellValue::Integer(14),
                CellValue::Integer(16),
            ],
        );
        Dataset::from_columns(
            vec!["G1".to_string(), "G2".to_string(), "G3".to_string()],
            columns,
        )
    }

    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("gradeboard_state_{name}_{}.csv", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn toggle_and_ordered_selection() {
        let mut state = AppState::default();
        state.set_dataset(three_row_grades(), PathBuf::from("test.csv"));

        state.toggle_column("G3");
        state.toggle_column("G1");
        assert_eq!(state.selected_in_order(), vec!["G1", "G3"]);

        state.toggle_column("G3");
        assert_eq!(state.selected_in_order(), vec!["G1"]);
    }

    #[test]
    fn dataset_change_prunes_stale_selections() {
        let mut state = AppState::default();
        state.set_dataset(three_row_grades(), PathBuf::from("a.csv"));
        state.toggle_column("G1");
        state.toggle_column("G2");
        state.set_chart_kind("G2", ChartKind::Scatter);
        state.set_x_axis("G2", "G1".to_string());

        // New dataset without G2.
        let mut columns = Map::new();
        columns.insert("G1".to_string(), vec![CellValue::Integer(1)]);
        let smaller = Dataset::from_columns(vec!["G1".to_string()], columns);
        state.set_dataset(smaller, PathBuf::from("b.csv"));

        assert_eq!(state.selected_in_order(), vec!["G1"]);
        assert_eq!(state.chart_kind("G2"), ChartKind::Distribution);
        assert!(state.x_axis_choices.is_empty());
    }

    #[test]
    fn x_axis_falls_back_to_first_selected() {
        let mut state = AppState::default();
        state.set_dataset(three_row_grades(), PathBuf::from("test.csv"));
        state.toggle_column("G1");
        state.toggle_column("G2");

        assert_eq!(state.x_axis_for("G2"), Some("G1".to_string()));

        state.set_x_axis("G2", "G2".to_string());
        assert_eq!(state.x_axis_for("G2"), Some("G2".to_string()));

        // Deselecting the chosen axis reverts to the fallback.
        state.toggle_column("G2");
        state.toggle_column("G3");
        assert_eq!(state.x_axis_for("G3"), Some("G1".to_string()));
    }

    #[test]
    fn load_failure_keeps_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(three_row_grades(), PathBuf::from("good.csv"));

        state.load_from_path(Path::new("/nonexistent/data.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
        assert!(state.dataset.is_some());
    }

    // End-to-end: a three-row grade CSV produces three distinct single-count
    // bars per grade column and a 2×2 unit-diagonal correlation matrix.
    #[test]
    fn grade_csv_scenario() {
        let path = write_fixture(
            "scenario",
            "G1,G2,G3\n10,11,12\n12,13,14\n14,15,16\n",
        );
        let mut state = AppState::default();
        state.load_from_path(&path);
        let ds = state.dataset.clone().unwrap();

        for col in ["G1", "G2", "G3"] {
            let counts = ds.value_counts(col);
            assert_eq!(counts.len(), 3);
            assert!(counts.iter().all(|(_, n)| *n == 1));
        }

        state.toggle_column("G1");
        state.toggle_column("G2");
        let m = stats::correlation_matrix(&ds, &state.selected_in_order()).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.values[0][0], 1.0);
        assert_eq!(m.values[1][1], 1.0);

        // Scatter Plot for G2 with x-axis G1 pairs x=G1, y=G2 per row.
        state.set_chart_kind("G2", ChartKind::Scatter);
        state.set_x_axis("G2", "G1".to_string());
        let x = state.x_axis_for("G2").unwrap();
        let points = stats::scatter_points(&ds, &x, "G2").unwrap();
        assert_eq!(points, vec![[10.0, 11.0], [12.0, 13.0], [14.0, 15.0]]);

        std::fs::remove_file(path).ok();
    }
}
