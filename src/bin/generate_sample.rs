//! Writes a synthetic market extract as a directory workbook: one Parquet
//! file per sheet, readable with `at-snapshot --data <dir>`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use at_snapshot::data::columns;
use at_snapshot::data::filter::{ALL_CATEGORY, AT_CATEGORY, NATIONWIDE};
use at_snapshot::data::model::CellValue;
use at_snapshot::metrics::format_number;
use at_snapshot::SheetNames;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplicative jitter in `[1 - spread, 1 + spread)`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + (self.next_f64() * 2.0 - 1.0) * spread
    }
}

// ---------------------------------------------------------------------------
// Synthetic market
// ---------------------------------------------------------------------------

const STATES: &[(&str, f64)] = &[("NSW", 0.33), ("VIC", 0.27), ("QLD", 0.22), ("WA", 0.18)];

/// Support categories with their share of quarterly spend.
const CATEGORIES: &[(&str, f64)] = &[
    (AT_CATEGORY, 0.045),
    ("Core - Daily Activities", 0.62),
    ("Capacity Building - Daily Activities", 0.335),
];

const BASE_QUARTERLY_SPEND: f64 = 9_500_000_000.0;
const BASE_PARTICIPANTS: f64 = 610_000.0;

/// One (category, state, period) cell of the synthetic market.
struct Record {
    category: String,
    state: String,
    period: String,
    payments: f64,
    committed: f64,
    participants: i64,
    providers: i64,
}

fn periods() -> Vec<String> {
    (2023..=2025)
        .flat_map(|year| (1..=4).map(move |q| format!("{year}-Q{q}")))
        .take(10)
        .collect()
}

fn generate(rng: &mut SimpleRng) -> Vec<Record> {
    let mut records = Vec::new();
    for (t, period) in periods().iter().enumerate() {
        let growth = 1.0 + 0.025 * t as f64;
        let mut national: Vec<Record> = Vec::new();

        for &(category, share) in CATEGORIES {
            let mut cat_total = Record {
                category: category.to_string(),
                state: NATIONWIDE.to_string(),
                period: period.clone(),
                payments: 0.0,
                committed: 0.0,
                participants: 0,
                providers: 0,
            };
            for &(state, weight) in STATES {
                let payments = BASE_QUARTERLY_SPEND * share * weight * growth * rng.jitter(0.04);
                let committed = payments * 1.25 * rng.jitter(0.03);
                let participants =
                    (BASE_PARTICIPANTS * share.sqrt() * weight * growth * rng.jitter(0.05)) as i64;
                let providers = (participants as f64 / 14.0 * rng.jitter(0.1)) as i64;

                cat_total.payments += payments;
                cat_total.committed += committed;
                cat_total.participants += participants;
                cat_total.providers += providers;

                records.push(Record {
                    category: category.to_string(),
                    state: state.to_string(),
                    period: period.clone(),
                    payments,
                    committed,
                    participants,
                    providers,
                });
            }
            national.push(cat_total);
        }

        let all = Record {
            category: ALL_CATEGORY.to_string(),
            state: NATIONWIDE.to_string(),
            period: period.clone(),
            payments: national.iter().map(|r| r.payments).sum(),
            committed: national.iter().map(|r| r.committed).sum(),
            participants: (BASE_PARTICIPANTS * growth) as i64,
            providers: national.iter().map(|r| r.providers).sum(),
        };
        records.extend(national);
        records.push(all);
    }
    records
}

fn dollars(value: f64) -> String {
    format!("${}", format_number(&CellValue::Integer(value.round() as i64)))
}

// ---------------------------------------------------------------------------
// Parquet output
// ---------------------------------------------------------------------------

fn text(values: impl Iterator<Item = String>) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>()))
}

fn ints(values: impl Iterator<Item = i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values.collect::<Vec<_>>()))
}

/// Key columns shared by every sheet. Category labels carry stray
/// whitespace, as the real extract does.
fn key_columns(records: &[Record]) -> Vec<(&'static str, ArrayRef)> {
    vec![
        (
            columns::SUPPORT_CATEGORY,
            text(records.iter().map(|r| format!("{} ", r.category))),
        ),
        (columns::STATE_TERRITORY, text(records.iter().map(|r| r.state.clone()))),
        (columns::PERIOD, text(records.iter().map(|r| r.period.clone()))),
    ]
}

fn write_sheet(dir: &Path, sheet: &str, cols: Vec<(&str, ArrayRef)>) -> Result<()> {
    let schema = Arc::new(Schema::new(
        cols.iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), cols.into_iter().map(|(_, a)| a).collect())
        .with_context(|| format!("building record batch for '{sheet}'"))?;

    let path = dir.join(format!("{sheet}.parquet"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_workbook"));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);
    let sheets = SheetNames::default();

    let mut market = key_columns(&records);
    market.push((columns::PAYMENTS, text(records.iter().map(|r| dollars(r.payments)))));
    market.push((
        columns::COMMITTED_SUPPORTS,
        text(records.iter().map(|r| dollars(r.committed))),
    ));
    market.push((
        columns::UTILISATION,
        ints(records.iter().map(|r| (r.payments / r.committed * 100.0).round() as i64)),
    ));
    write_sheet(&output_dir, &sheets.market, market)?;

    let mut participants = key_columns(&records);
    participants.push((
        columns::ACTIVE_PARTICIPANTS,
        ints(records.iter().map(|r| r.participants)),
    ));
    participants.push((
        columns::AVERAGE_COMMITTED,
        text(records.iter().map(|r| dollars(r.committed / r.participants.max(1) as f64))),
    ));
    participants.push((
        columns::AVERAGE_PAYMENTS,
        text(records.iter().map(|r| dollars(r.payments / r.participants.max(1) as f64))),
    ));
    write_sheet(&output_dir, &sheets.participants, participants)?;

    let mut providers = key_columns(&records);
    providers.push((columns::ACTIVE_PROVIDER, ints(records.iter().map(|r| r.providers))));
    write_sheet(&output_dir, &sheets.providers, providers)?;

    println!(
        "Wrote {} rows per sheet ({} periods) to {}",
        records.len(),
        periods().len(),
        output_dir.display()
    );
    Ok(())
}
