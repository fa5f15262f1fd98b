use std::path::PathBuf;

use at_snapshot::data::filter::{Scope, AT_CATEGORY, NATIONWIDE};
use at_snapshot::SheetNames;
use clap::{Parser, ValueEnum};

pub const DEFAULT_DATA_PATH: &str = "data/Explore_Data_2025_09_18.xlsx";

/// How the dashboard arranges its sections. Only the presenter reads this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// Sections stacked top to bottom.
    #[default]
    Plain,
    /// Expenditure and participants side by side.
    Wide,
}

/// Command line options.
#[derive(Debug, Clone, Parser)]
#[command(name = "at-snapshot", version, about = "Assistive Technology market snapshot")]
pub struct Args {
    /// Workbook file (.xlsx, .xls, .ods) or a directory of per-sheet files
    #[arg(long, env = "AT_SNAPSHOT_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Dashboard layout
    #[arg(long, value_enum, default_value_t = Layout::Plain)]
    pub layout: Layout,

    /// Support category to report on
    #[arg(long, default_value = AT_CATEGORY)]
    pub category: String,

    /// Geography to report on
    #[arg(long, default_value = NATIONWIDE)]
    pub geography: String,

    #[arg(long, default_value = "Market by Total")]
    pub market_sheet: String,

    #[arg(long, default_value = "ActPrtpnt by Total")]
    pub participants_sheet: String,

    #[arg(long, default_value = "Provider by Total")]
    pub providers_sheet: String,

    /// Print the snapshot as JSON instead of opening the dashboard
    #[arg(long)]
    pub json: bool,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn scope(&self) -> Scope {
        Scope::new(self.category.trim(), self.geography.trim())
    }

    pub fn sheets(&self) -> SheetNames {
        SheetNames {
            market: self.market_sheet.clone(),
            participants: self.participants_sheet.clone(),
            providers: self.providers_sheet.clone(),
        }
    }
}
