use eframe::egui::{Color32, Ui};
use egui_plot::{GridMark, Line, Plot, PlotPoints, Points};

use at_snapshot::data::model::CellValue;
use at_snapshot::metrics::{format_currency, format_number};
use at_snapshot::snapshot::{TrendSeries, TrendUnit};

// ---------------------------------------------------------------------------
// Trend chart: one series over reporting periods
// ---------------------------------------------------------------------------

fn format_value(unit: TrendUnit, value: f64) -> String {
    match unit {
        TrendUnit::Currency => format_currency(&CellValue::Float(value)),
        TrendUnit::Count => format_number(&CellValue::Float(value)),
    }
}

/// Render `series` as a line with point markers. Periods are placed at
/// integer x positions and labelled on the axis.
pub fn trend_plot(ui: &mut Ui, series: &TrendSeries, color: Color32, height: f32) {
    if series.points.is_empty() {
        ui.label(format!("No {} history.", series.name.to_lowercase()));
        return;
    }

    let labels: Vec<String> = series
        .points
        .iter()
        .map(|p| p.period.to_string())
        .collect();
    let coords: Vec<[f64; 2]> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.value])
        .collect();

    let unit = series.unit;
    let axis_labels = labels.clone();
    let hover_labels = labels;

    Plot::new(("trend_plot", series.name))
        .height(height)
        .y_axis_label(series.name)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark: GridMark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            axis_labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .y_axis_formatter(move |mark: GridMark, _range| format_value(unit, mark.value))
        .label_formatter(move |_name, point| {
            let idx = point.x.round().max(0.0) as usize;
            let period = hover_labels.get(idx).map(String::as_str).unwrap_or("");
            format!("{period}\n{}", format_value(unit, point.y))
        })
        .show(ui, |plot_ui| {
            let line = Line::new(PlotPoints::from(coords.clone()))
                .name(series.name)
                .color(color)
                .width(2.0);
            plot_ui.line(line);
            plot_ui.points(Points::new(PlotPoints::from(coords)).radius(3.5).color(color));
        });
}
