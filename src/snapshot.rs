use std::path::Path;

use serde::Serialize;

use crate::data::columns;
use crate::data::filter::{
    filter_scope, latest_period, require_columns, select_period, Scope, ScopedTable,
};
use crate::data::loader::load_sheet;
use crate::data::model::{CellValue, RawTable, ReportingPeriod, Row};
use crate::data::normalize::normalize;
use crate::error::Result;
use crate::metrics::{
    cell_amount, format_currency, format_number, participants_per_provider, share_percent, Share,
};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Sheet names inside the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub market: String,
    pub participants: String,
    pub providers: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            market: "Market by Total".to_string(),
            participants: "ActPrtpnt by Total".to_string(),
            providers: "Provider by Total".to_string(),
        }
    }
}

/// The three sheets the snapshot is derived from.
#[derive(Debug, Clone)]
pub struct MarketTables {
    pub market: RawTable,
    pub participants: RawTable,
    pub providers: RawTable,
}

impl MarketTables {
    pub fn load(path: &Path, sheets: &SheetNames) -> Result<Self> {
        Ok(MarketTables {
            market: load_sheet(path, &sheets.market)?,
            participants: load_sheet(path, &sheets.participants)?,
            providers: load_sheet(path, &sheets.providers)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Headline figures for the latest reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub period: ReportingPeriod,
    pub scope: Scope,
    pub payments: f64,
    pub committed_supports: f64,
    /// Utilisation as reported, suffixed with `%`.
    pub utilisation: String,
    pub active_participants: f64,
    pub average_committed_support: CellValue,
    pub average_payments: CellValue,
    pub active_providers: f64,
    pub participants_per_provider: f64,
    pub share_of_total_payments: Share,
    pub share_of_total_committed: Share,
}

/// A labelled, display-ready figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

impl Snapshot {
    /// Every figure formatted for display, in dashboard order.
    pub fn metrics(&self) -> Vec<Metric> {
        let metric = |label, value| Metric { label, value };
        vec![
            metric("Payments", format_currency(&CellValue::Float(self.payments))),
            metric(
                "Committed supports",
                format_currency(&CellValue::Float(self.committed_supports)),
            ),
            metric("Utilisation", self.utilisation.clone()),
            metric(
                "Active participants",
                format_number(&CellValue::Float(self.active_participants)),
            ),
            metric(
                "Average committed support",
                format_currency(&self.average_committed_support),
            ),
            metric("Average payments", format_currency(&self.average_payments)),
            metric(
                "Active providers",
                format_number(&CellValue::Float(self.active_providers)),
            ),
            metric(
                "Participants per provider",
                format!("{:.1}", self.participants_per_provider),
            ),
            metric("Share of total payments", self.share_of_total_payments.to_string()),
            metric(
                "Share of total committed supports",
                self.share_of_total_committed.to_string(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: ReportingPeriod,
    pub value: f64,
}

/// Whether a series is measured in dollars or in heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendUnit {
    Currency,
    Count,
}

/// One measure across every reporting period, sorted by period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: &'static str,
    pub unit: TrendUnit,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    fn from_scoped(
        name: &'static str,
        unit: TrendUnit,
        scoped: &ScopedTable,
        column: &str,
    ) -> Result<Self> {
        let mut points = Vec::with_capacity(scoped.rows.len());
        for row in &scoped.rows {
            let Some(period) = row.get(columns::PERIOD).and_then(ReportingPeriod::from_cell) else {
                continue;
            };
            match row.get(column) {
                None | Some(CellValue::Null) => continue,
                Some(cell) => points.push(TrendPoint {
                    period,
                    value: cell_amount(cell, &format!("{} / {column}", scoped.table))?,
                }),
            }
        }
        points.sort_by(|a, b| a.period.cmp(&b.period));
        Ok(TrendSeries { name, unit, points })
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotReport {
    pub snapshot: Snapshot,
    pub trends: Vec<TrendSeries>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Normalise → filter → pick the latest period → derive.
///
/// Built once per render and dropped afterwards; holds no state besides the
/// target scope.
#[derive(Debug, Clone)]
pub struct SnapshotPipeline {
    scope: Scope,
}

impl Default for SnapshotPipeline {
    fn default() -> Self {
        SnapshotPipeline::new(Scope::assistive_technology())
    }
}

impl SnapshotPipeline {
    pub fn new(scope: Scope) -> Self {
        SnapshotPipeline { scope }
    }

    /// Load the workbook at `path` and run the pipeline over it.
    pub fn run_path(&self, path: &Path, sheets: &SheetNames) -> Result<SnapshotReport> {
        log::info!("Reading workbook {}", path.display());
        self.run(MarketTables::load(path, sheets)?)
    }

    /// Run the pipeline over pre-loaded sheets.
    pub fn run(&self, tables: MarketTables) -> Result<SnapshotReport> {
        let market = normalize(tables.market);
        let participants = normalize(tables.participants);
        let providers = normalize(tables.providers);

        require_columns(&market, columns::MARKET)?;
        require_columns(&participants, columns::PARTICIPANTS)?;
        require_columns(&providers, columns::PROVIDERS)?;

        let market_scoped = filter_scope(&market, &self.scope)?;
        let market_total = filter_scope(&market, &self.scope.all_supports())?;
        let participants_scoped = filter_scope(&participants, &self.scope)?;
        let providers_scoped = filter_scope(&providers, &self.scope)?;

        // The market sheet alone decides the period; the other sheets must have it.
        let period = latest_period(&market_scoped)?;
        log::info!("Latest reporting period: {period}");

        let snapshot = derive_snapshot(
            &self.scope,
            &period,
            select_period(&market_scoped, &period)?,
            select_period(&market_total, &period)?,
            select_period(&participants_scoped, &period)?,
            select_period(&providers_scoped, &period)?,
        )?;

        let trends = vec![
            TrendSeries::from_scoped(
                "Payments",
                TrendUnit::Currency,
                &market_scoped,
                columns::PAYMENTS,
            )?,
            TrendSeries::from_scoped(
                "Committed supports",
                TrendUnit::Currency,
                &market_scoped,
                columns::COMMITTED_SUPPORTS,
            )?,
            TrendSeries::from_scoped(
                "Active participants",
                TrendUnit::Count,
                &participants_scoped,
                columns::ACTIVE_PARTICIPANTS,
            )?,
            TrendSeries::from_scoped(
                "Active providers",
                TrendUnit::Count,
                &providers_scoped,
                columns::ACTIVE_PROVIDER,
            )?,
        ];

        Ok(SnapshotReport { snapshot, trends })
    }
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a CellValue {
    const NULL: &CellValue = &CellValue::Null;
    row.get(column).unwrap_or(NULL)
}

fn derive_snapshot(
    scope: &Scope,
    period: &ReportingPeriod,
    market: &Row,
    market_total: &Row,
    participants: &Row,
    providers: &Row,
) -> Result<Snapshot> {
    let payments = cell(market, columns::PAYMENTS);
    let committed = cell(market, columns::COMMITTED_SUPPORTS);

    let active_participants = cell_amount(
        cell(participants, columns::ACTIVE_PARTICIPANTS),
        columns::ACTIVE_PARTICIPANTS,
    )?;
    let active_providers = cell_amount(
        cell(providers, columns::ACTIVE_PROVIDER),
        columns::ACTIVE_PROVIDER,
    )?;

    Ok(Snapshot {
        period: period.clone(),
        scope: scope.clone(),
        payments: cell_amount(payments, columns::PAYMENTS)?,
        committed_supports: cell_amount(committed, columns::COMMITTED_SUPPORTS)?,
        utilisation: format!("{}%", cell(market, columns::UTILISATION)),
        active_participants,
        average_committed_support: cell(participants, columns::AVERAGE_COMMITTED).clone(),
        average_payments: cell(participants, columns::AVERAGE_PAYMENTS).clone(),
        active_providers,
        participants_per_provider: participants_per_provider(active_participants, active_providers),
        share_of_total_payments: Share::from_result(share_percent(
            payments,
            cell(market_total, columns::PAYMENTS),
        ))?,
        share_of_total_committed: Share::from_result(share_percent(
            committed,
            cell(market_total, columns::COMMITTED_SUPPORTS),
        ))?,
    })
}
