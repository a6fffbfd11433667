use eframe::egui::{
    Align2, Color32, CornerRadius, FontId, Rect, RichText, ScrollArea, Sense, Ui, Vec2, pos2,
};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Line, MarkerShape, Plot, PlotPoints, Points,
};

use crate::color;
use crate::data::model::{CellValue, Dataset};
use crate::state::{AppState, ChartKind};
use crate::stats::{self, ChartError};

/// Column required by the prediction-result chart.
pub const PREDICTED_COLUMN: &str = "Predicted Result";

/// Fixed grade-snapshot columns shown at the top of the dashboard.
pub const GRADE_COLUMNS: [&str; 3] = ["G1", "G2", "G3"];

const SKY_BLUE: Color32 = Color32::from_rgb(135, 206, 235);
const GREEN: Color32 = Color32::from_rgb(76, 175, 110);
const ORANGE: Color32 = Color32::from_rgb(255, 165, 64);
const DENSITY_BLUE: Color32 = Color32::from_rgb(36, 96, 168);

// ---------------------------------------------------------------------------
// Dashboard layout (central panel)
// ---------------------------------------------------------------------------

/// Render the whole dashboard in its fixed order: grade overview, raw table,
/// correlation heatmap, per-column visualizations, prediction results.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a CSV file to view the dashboard  (File → Open…)");
            });
            return;
        }
    };

    let selected = state.selected_in_order();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Student Grade Dashboard");
            ui.add_space(4.0);
            grade_overview(ui, dataset);
            caption(
                ui,
                "The bar charts above show how often each grade occurs in the G1, G2 and G3 snapshots.",
            );

            ui.separator();
            ui.heading("Dataset");
            data_table(ui, dataset);

            ui.separator();
            ui.heading("Column Correlation");
            caption(
                ui,
                "The matrix below shows how strongly each pair of selected columns moves together.",
            );
            correlation_heatmap(ui, dataset, &selected);

            if selected.len() >= 2 {
                for column in &selected {
                    ui.separator();
                    ui.heading(format!("Visualizations for {column}"));
                    match state.chart_kind(column) {
                        ChartKind::Distribution => distribution(ui, dataset, column),
                        ChartKind::BoxPlot => {
                            if let Some(x) = state.x_axis_for(column) {
                                box_plot(ui, dataset, &x, column);
                            }
                        }
                        ChartKind::Scatter => {
                            if let Some(x) = state.x_axis_for(column) {
                                scatter_plot(ui, dataset, &x, column);
                            }
                        }
                    }
                }
            }

            ui.separator();
            ui.heading("Prediction Results");
            prediction_results(ui, dataset, &state.model_name);
            ui.add_space(12.0);
        });
}

fn caption(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text.into()).weak());
}

fn warning_label(ui: &mut Ui, text: impl Into<String>) {
    ui.colored_label(Color32::YELLOW, text.into());
}

fn error_label(ui: &mut Ui, text: impl Into<String>) {
    ui.colored_label(Color32::RED, text.into());
}

// ---------------------------------------------------------------------------
// Fixed visuals: grade bar charts + raw table
// ---------------------------------------------------------------------------

/// Three side-by-side value-count bar charts for the grade snapshots.  A
/// missing grade column shows an inline error in its slot.
pub fn grade_overview(ui: &mut Ui, dataset: &Dataset) {
    let colors = [SKY_BLUE, GREEN, ORANGE];
    ui.columns(GRADE_COLUMNS.len(), |cols: &mut [Ui]| {
        for ((column, color), col_ui) in GRADE_COLUMNS.iter().zip(colors).zip(cols.iter_mut()) {
            if !dataset.has_column(column) {
                error_label(col_ui, ChartError::MissingColumn(column.to_string()).to_string());
                continue;
            }
            value_count_chart(col_ui, column, &dataset.value_counts(column), Some(color), 200.0);
        }
    });
}

/// Bar chart of per-value counts.  Numeric categories sit at their numeric
/// position; text categories are indexed with label ticks.  With no fixed
/// color, each category gets its own palette hue.
fn value_count_chart(
    ui: &mut Ui,
    column: &str,
    counts: &[(CellValue, usize)],
    color: Option<Color32>,
    height: f32,
) {
    let numeric = !counts.is_empty() && counts.iter().all(|(v, _)| v.as_f64().is_some());
    let palette = color::generate_palette(counts.len());

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (value, n))| {
            let x = if numeric {
                value.as_f64().unwrap_or(i as f64)
            } else {
                i as f64
            };
            let fill = color.unwrap_or(palette[i]);
            Bar::new(x, *n as f64).width(0.8).fill(fill).name(value.to_string())
        })
        .collect();

    let labels: Vec<String> = counts.iter().map(|(v, _)| v.to_string()).collect();

    let mut plot = Plot::new(("value_counts", column))
        .height(height)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_label(column.to_string())
        .y_axis_label("Frequency");

    if !numeric {
        plot = plot.x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        });
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).name(column));
    });
}

/// The full raw table, striped and scrollable.
pub fn data_table(ui: &mut Ui, dataset: &Dataset) {
    caption(
        ui,
        format!("{} rows × {} columns", dataset.len(), dataset.column_names.len()),
    );
    ScrollArea::horizontal()
        .id_salt("data_table_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(320.0)
                .columns(TableColumn::auto().at_least(60.0), dataset.column_names.len())
                .header(20.0, |mut header| {
                    for name in &dataset.column_names {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, dataset.len(), |mut row| {
                        let row_index = row.index();
                        for name in &dataset.column_names {
                            let text = dataset
                                .column(name)
                                .and_then(|cells| cells.get(row_index))
                                .map(|v| v.to_string())
                                .unwrap_or_default();
                            row.col(|ui: &mut Ui| {
                                ui.label(text);
                            });
                        }
                    });
                });
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Color-scaled pairwise-correlation grid with column labels on both axes.
/// Fewer than two selected columns is a warning, not an error; nothing is
/// drawn in that case.
pub fn correlation_heatmap(ui: &mut Ui, dataset: &Dataset, columns: &[String]) {
    let matrix = match stats::correlation_matrix(dataset, columns) {
        Ok(m) => m,
        Err(e @ ChartError::NotEnoughColumns) => {
            warning_label(ui, e.to_string());
            return;
        }
        Err(e) => {
            error_label(ui, e.to_string());
            return;
        }
    };

    let n = matrix.size();
    let label_w = 90.0_f32;
    let label_h = 22.0_f32;
    let cell = ((ui.available_width() - label_w) / n as f32).clamp(36.0, 72.0);
    let size = Vec2::new(label_w + cell * n as f32, label_h + cell * n as f32);

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let text_color = ui.visuals().text_color();

    for (j, label) in matrix.labels.iter().enumerate() {
        painter.text(
            pos2(origin.x + label_w + (j as f32 + 0.5) * cell, origin.y + label_h * 0.5),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(12.0),
            text_color,
        );
    }

    for i in 0..n {
        let y = origin.y + label_h + i as f32 * cell;
        painter.text(
            pos2(origin.x + label_w - 6.0, y + cell * 0.5),
            Align2::RIGHT_CENTER,
            &matrix.labels[i],
            FontId::proportional(12.0),
            text_color,
        );
        for j in 0..n {
            let r = matrix.values[i][j];
            let rect = Rect::from_min_size(
                pos2(origin.x + label_w + j as f32 * cell, y),
                Vec2::splat(cell),
            );
            painter.rect_filled(rect.shrink(1.0), CornerRadius::same(2), color::correlation_color(r));
            let text = if r.is_nan() {
                "–".to_string()
            } else {
                format!("{r:.2}")
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                text,
                FontId::proportional(11.0),
                color::correlation_text_color(r),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Per-column renderers
// ---------------------------------------------------------------------------

/// Binned frequency histogram with an overlaid smoothed density curve.
pub fn distribution(ui: &mut Ui, dataset: &Dataset, column: &str) {
    if !dataset.has_column(column) {
        error_label(ui, ChartError::MissingColumn(column.to_string()).to_string());
        return;
    }
    let values = dataset.numeric_values(column);
    if values.is_empty() {
        error_label(ui, ChartError::NotNumeric(column.to_string()).to_string());
        return;
    }

    let hist = stats::histogram(&values, stats::HISTOGRAM_BINS);
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(i, &count)| {
            Bar::new(hist.bin_center(i), count as f64).width(hist.bin_width * 0.95)
        })
        .collect();

    // Density is scaled to the frequency axis so the curve overlays the bars.
    let scale = values.len() as f64 * hist.bin_width;
    let curve: Vec<[f64; 2]> = stats::density_curve(&values, 200)
        .into_iter()
        .map(|[x, d]| [x, d * scale])
        .collect();

    Plot::new(("distribution", column))
        .height(260.0)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_label(column.to_string())
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(SKY_BLUE).name(column));
            if !curve.is_empty() {
                plot_ui.line(
                    Line::new(PlotPoints::from(curve))
                        .color(DENSITY_BLUE)
                        .width(2.0)
                        .name("density"),
                );
            }
        });
    caption(
        ui,
        format!(
            "The histogram above shows how the values of {column} are spread; \
             the curve is a smoothed estimate of the same distribution."
        ),
    );
}

/// Box-and-whisker plot of `y_column` grouped by the distinct values of
/// `x_column`.
pub fn box_plot(ui: &mut Ui, dataset: &Dataset, x_column: &str, y_column: &str) {
    let groups = match stats::grouped_box_stats(dataset, x_column, y_column) {
        Ok(groups) => groups,
        Err(e) => {
            error_label(ui, e.to_string());
            return;
        }
    };

    let elems: Vec<BoxElem> = groups
        .iter()
        .enumerate()
        .map(|(i, (label, s))| {
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(label)
            .box_width(0.5)
        })
        .collect();
    let labels: Vec<String> = groups.iter().map(|(label, _)| label.clone()).collect();

    Plot::new(("box_plot", y_column))
        .height(260.0)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_label(x_column.to_string())
        .y_axis_label(y_column.to_string())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).name(y_column));
        });
    caption(
        ui,
        format!(
            "The box plot above shows the distribution of {y_column} per {x_column} category. \
             The line inside each box is the median; the box spans the interquartile range (IQR)."
        ),
    );
}

/// Point cloud of (x, y) pairs, one point per row.
pub fn scatter_plot(ui: &mut Ui, dataset: &Dataset, x_column: &str, y_column: &str) {
    let points = match stats::scatter_points(dataset, x_column, y_column) {
        Ok(points) => points,
        Err(e) => {
            error_label(ui, e.to_string());
            return;
        }
    };

    Plot::new(("scatter", y_column))
        .height(260.0)
        .x_axis_label(x_column.to_string())
        .y_axis_label(y_column.to_string())
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(3.0)
                    .shape(MarkerShape::Circle)
                    .color(GREEN)
                    .name(format!("{x_column} vs {y_column}")),
            );
        });
    caption(
        ui,
        format!(
            "Each point above is one row of the dataset, positioned by its \
             {x_column} and {y_column} values."
        ),
    );
}

/// Categorical count plot over the `Predicted Result` column.  A dataset
/// without that column gets an inline error instead of a chart.
pub fn prediction_results(ui: &mut Ui, dataset: &Dataset, model_name: &str) {
    let counts = match stats::prediction_counts(dataset, PREDICTED_COLUMN) {
        Ok(counts) => counts,
        Err(e) => {
            error_label(ui, e.to_string());
            return;
        }
    };

    ui.label(RichText::new(format!("Model: {model_name}")).strong());
    value_count_chart(ui, PREDICTED_COLUMN, &counts, None, 240.0);
    caption(
        ui,
        format!(
            "The chart above counts how many rows the {model_name} model assigned \
             to each predicted class."
        ),
    );
}
