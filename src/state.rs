use std::path::PathBuf;

use at_snapshot::data::filter::Scope;
use at_snapshot::{SheetNames, SnapshotPipeline, SnapshotReport};

use crate::color::SeriesPalette;
use crate::config::{Args, Layout};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Workbook the report was read from.
    pub data_path: PathBuf,

    pub sheets: SheetNames,

    pub scope: Scope,

    pub layout: Layout,

    /// Latest pipeline result (None until a run succeeds).
    pub report: Option<SnapshotReport>,

    /// Colours for the trend charts.
    pub palette: Option<SeriesPalette>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(args: &Args) -> Self {
        Self {
            data_path: args.data.clone(),
            sheets: args.sheets(),
            scope: args.scope(),
            layout: args.layout,
            report: None,
            palette: None,
            status_message: None,
        }
    }

    /// Ingest a freshly computed report and rebuild chart colours.
    pub fn set_report(&mut self, report: SnapshotReport) {
        self.palette = Some(SeriesPalette::new(report.trends.iter().map(|t| t.name)));
        self.report = Some(report);
        self.status_message = None;
    }

    /// Run the pipeline again over `data_path`. A failure clears the report
    /// and leaves the error on screen.
    pub fn reload(&mut self) {
        let pipeline = SnapshotPipeline::new(self.scope.clone());
        match pipeline.run_path(&self.data_path, &self.sheets) {
            Ok(report) => {
                log::info!(
                    "Snapshot for {} ready ({} trend series)",
                    report.snapshot.period,
                    report.trends.len()
                );
                self.set_report(report);
            }
            Err(e) => {
                log::error!("Failed to build snapshot: {e}");
                self.report = None;
                self.palette = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Point the dashboard at another workbook.
    pub fn open(&mut self, path: PathBuf) {
        self.data_path = path;
        self.reload();
    }

    pub fn toggle_layout(&mut self) {
        self.layout = match self.layout {
            Layout::Plain => Layout::Wide,
            Layout::Wide => Layout::Plain,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn args_for(path: &std::path::Path) -> Args {
        Args::try_parse_from(["at-snapshot", "--data", path.to_str().unwrap()]).unwrap()
    }

    #[test]
    fn reload_failure_keeps_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(&args_for(dir.path()));
        state.reload();
        assert!(state.report.is_none());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("Market by Total"), "{msg}");
    }

    #[test]
    fn reload_success_sets_report_and_palette() {
        let dir = tempfile::tempdir().unwrap();
        let key = "Support Category,State/Territory,Period";
        let at = "Capital - Assistive Technology,All Australia,2025-Q2";
        fs::write(
            dir.path().join("Market by Total.csv"),
            format!(
                "{key},Payments,Committed supports,Utilisation\n\
                 {at},\"$100,000\",\"$120,000\",83\n\
                 All,All Australia,2025-Q2,\"$1,000,000\",\"$1,200,000\",80\n"
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join("ActPrtpnt by Total.csv"),
            format!(
                "{key},Active participants,Average committed support,Average payments\n\
                 {at},500,$240,$200\n"
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join("Provider by Total.csv"),
            format!("{key},Active provider\n{at},50\n"),
        )
        .unwrap();

        let mut state = AppState::new(&args_for(dir.path()));
        state.status_message = Some("stale".into());
        state.reload();

        let report = state.report.as_ref().unwrap();
        assert_eq!(report.snapshot.participants_per_provider, 10.0);
        assert!(state.palette.is_some());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggle_layout_flips() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(&args_for(dir.path()));
        assert_eq!(state.layout, Layout::Plain);
        state.toggle_layout();
        assert_eq!(state.layout, Layout::Wide);
    }
}
