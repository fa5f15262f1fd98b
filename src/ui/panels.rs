use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use at_snapshot::data::filter::AT_CATEGORY;
use at_snapshot::data::model::CellValue;
use at_snapshot::metrics::{format_currency, format_number, Share};
use at_snapshot::snapshot::TrendSeries;
use at_snapshot::SnapshotReport;

use crate::color::BRAND;
use crate::config::Layout;
use crate::state::AppState;
use crate::ui::plot::trend_plot;

const CHART_HEIGHT: f32 = 200.0;

// ---------------------------------------------------------------------------
// Dashboard body
// ---------------------------------------------------------------------------

/// Render the whole snapshot, arranged per `state.layout`.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => {
                ui.heading(RichText::new(msg).color(Color32::RED));
            }
            None => {
                ui.heading("Open a workbook to build the snapshot  (File → Open…)");
            }
        });
        return;
    };

    header(ui, state, report);
    ui.separator();

    match state.layout {
        Layout::Plain => {
            expenditure(ui, state, report);
            ui.add_space(12.0);
            participants(ui, state, report);
        }
        Layout::Wide => {
            ui.columns(2, |cols: &mut [Ui]| {
                expenditure(&mut cols[0], state, report);
                participants(&mut cols[1], state, report);
            });
        }
    }
    ui.separator();
    providers(ui, state, report);
    ui.separator();
    key_statistics(ui, report);
}

fn header(ui: &mut Ui, state: &AppState, report: &SnapshotReport) {
    let subject = if state.scope.category == AT_CATEGORY {
        "Assistive Technology"
    } else {
        state.scope.category.as_str()
    };
    let title = RichText::new(format!("{subject} Market Snapshot"))
        .size(28.0)
        .strong()
        .color(BRAND);

    let caption = format!(
        "{} | Source: {} ({}, {})",
        report.snapshot.period,
        state.data_path.display(),
        state.scope.category,
        state.scope.geography
    );

    match state.layout {
        Layout::Plain => {
            ui.label(title);
            ui.label(RichText::new(caption).small().weak());
        }
        Layout::Wide => {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(title);
                ui.label(RichText::new(caption).small().weak());
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn expenditure(ui: &mut Ui, state: &AppState, report: &SnapshotReport) {
    let snap = &report.snapshot;
    ui.heading("💰 Expenditure");
    ui.columns(3, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Payments",
            &format_currency(&CellValue::Float(snap.payments)),
            Some(&snap.share_of_total_payments),
        );
        metric_card(
            &mut cols[1],
            "Committed Supports",
            &format_currency(&CellValue::Float(snap.committed_supports)),
            Some(&snap.share_of_total_committed),
        );
        metric_card(&mut cols[2], "Utilisation", &snap.utilisation, None);
    });
    trend(ui, state, report, "Payments");
}

fn participants(ui: &mut Ui, state: &AppState, report: &SnapshotReport) {
    let snap = &report.snapshot;
    ui.heading("👥 Participants");
    ui.columns(3, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Active Participants",
            &format_number(&CellValue::Float(snap.active_participants)),
            None,
        );
        metric_card(
            &mut cols[1],
            "Avg Committed Support",
            &format_currency(&snap.average_committed_support),
            None,
        );
        metric_card(
            &mut cols[2],
            "Avg Payments",
            &format_currency(&snap.average_payments),
            None,
        );
    });
    trend(ui, state, report, "Active participants");
}

fn providers(ui: &mut Ui, state: &AppState, report: &SnapshotReport) {
    let snap = &report.snapshot;
    ui.heading("🏢 Providers");
    ui.columns(2, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Active Providers",
            &format_number(&CellValue::Float(snap.active_providers)),
            None,
        );
        metric_card(
            &mut cols[1],
            "Participants per Provider",
            &format!("{:.1}", snap.participants_per_provider),
            None,
        );
    });
    trend(ui, state, report, "Active providers");
}

/// Every derived figure in one table.
fn key_statistics(ui: &mut Ui, report: &SnapshotReport) {
    ui.heading("📊 Key Statistics");
    let metrics = report.snapshot.metrics();

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(240.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Metric");
            });
            header.col(|ui: &mut Ui| {
                ui.strong(format!("Value ({})", report.snapshot.period));
            });
        })
        .body(|mut body| {
            for metric in &metrics {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(metric.label);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(metric.value.as_str());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn metric_card(ui: &mut Ui, label: &str, value: &str, share: Option<&Share>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).size(22.0).strong());
        if let Some(share) = share {
            let color = match share {
                Share::Available(_) => Color32::from_rgb(0x2E, 0x8B, 0x57),
                Share::NotAvailable => Color32::GRAY,
            };
            ui.label(RichText::new(share.to_string()).small().color(color));
        }
    });
}

fn trend(ui: &mut Ui, state: &AppState, report: &SnapshotReport, name: &str) {
    let Some(series) = find_series(report, name) else {
        return;
    };
    let color = state
        .palette
        .as_ref()
        .map(|p| p.color_for(series.name))
        .unwrap_or(BRAND);
    trend_plot(ui, series, color, CHART_HEIGHT);
}

fn find_series<'a>(report: &'a SnapshotReport, name: &str) -> Option<&'a TrendSeries> {
    report.trends.iter().find(|t| t.name == name)
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.layout == Layout::Wide, "Wide layout")
            .clicked()
        {
            state.toggle_layout();
        }

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!("Period {}", report.snapshot.period));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open market workbook")
        .add_filter("Workbooks", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("OpenDocument", &["ods"])
        .pick_file();

    if let Some(path) = file {
        state.open(path);
    }
}

/// A folder holding one `.parquet` / `.csv` / `.json` file per sheet.
pub fn open_folder_dialog(state: &mut AppState) {
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Open sheet folder")
        .pick_folder()
    {
        state.open(path);
    }
}
