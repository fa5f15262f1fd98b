//! Spreadsheet workbooks read through calamine. The `.xlsx` fixtures are
//! assembled by hand: a zip of the minimal SpreadsheetML parts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use at_snapshot::data::loader::load_sheet;
use at_snapshot::data::model::CellValue;
use at_snapshot::metrics::Share;
use at_snapshot::{SheetNames, SnapshotError, SnapshotPipeline};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Excel serial day of 2024-06-30.
const JUNE_30_2024: f64 = 45473.0;

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// Serial day rendered with the built-in date format.
    Date(f64),
    Empty,
}

use Cell::{Date, Empty, Number, Text};

/// One sheet: its name and rows, each placed at the given 1-based row number.
type SheetSpec<'a> = (&'a str, Vec<(usize, Vec<Cell<'a>>)>);

fn column_letter(i: usize) -> char {
    (b'A' + i as u8) as char
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn sheet_xml(rows: &[(usize, Vec<Cell<'_>>)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{MAIN_NS}"><sheetData>"#
    );
    for (r, cells) in rows {
        xml.push_str(&format!(r#"<row r="{r}">"#));
        for (i, cell) in cells.iter().enumerate() {
            let at = format!("{}{r}", column_letter(i));
            match cell {
                Text(s) => xml.push_str(&format!(
                    r#"<c r="{at}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    escape(s)
                )),
                Number(v) => xml.push_str(&format!(r#"<c r="{at}"><v>{v}</v></c>"#)),
                Date(v) => xml.push_str(&format!(r#"<c r="{at}" s="1"><v>{v}</v></c>"#)),
                Empty => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_xlsx(path: &Path, sheets: &[SheetSpec<'_>]) {
    let mut parts: Vec<(String, String)> = Vec::new();

    let overrides: String = (1..=sheets.len())
        .map(|n| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            )
        })
        .collect();
    parts.push((
        "[Content_Types].xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{overrides}</Types>"#
        ),
    ));
    parts.push((
        "_rels/.rels".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        ),
    ));

    let sheet_entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            let n = i + 1;
            format!(r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#, escape(name))
        })
        .collect();
    parts.push((
        "xl/workbook.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{sheet_entries}</sheets></workbook>"#
        ),
    ));

    let mut rels: String = (1..=sheets.len())
        .map(|n| {
            format!(
                r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            )
        })
        .collect();
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_NS}/styles" Target="styles.xml"/>"#,
        sheets.len() + 1
    ));
    parts.push((
        "xl/_rels/workbook.xml.rels".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}">{rels}</Relationships>"#
        ),
    ));

    // xf 0 is general, xf 1 uses built-in format 14 (m/d/yyyy)
    parts.push((
        "xl/styles.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="{MAIN_NS}"><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#
        ),
    ));

    for (i, (_, rows)) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(rows)));
    }

    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

const AT: &str = "Capital - Assistive Technology ";
const NATION: &str = "All Australia";

fn market_workbook(path: &Path) {
    let market = (
        "Market by Total",
        vec![
            (
                1,
                vec![
                    Text(" Support Category "),
                    Text("State/Territory"),
                    Text("Period"),
                    Text(" Payments "),
                    Text("Committed supports "),
                    Text("Utilisation"),
                ],
            ),
            (
                2,
                vec![
                    Text(AT),
                    Text(NATION),
                    Text("2025-Q1"),
                    Text("$90,000"),
                    Text("$110,000"),
                    Number(81.0),
                ],
            ),
            (
                3,
                vec![
                    Text(AT),
                    Text(NATION),
                    Text("2025-Q2"),
                    Text("$100,000"),
                    Text("$120,000"),
                    Number(83.0),
                ],
            ),
            (
                4,
                vec![
                    Text("All"),
                    Text(NATION),
                    Text("2025-Q2"),
                    Text("$1,000,000"),
                    Number(1_200_000.0),
                    Number(83.0),
                ],
            ),
        ],
    );
    let participants = (
        "ActPrtpnt by Total",
        vec![
            (
                1,
                vec![
                    Text("Support Category"),
                    Text("State/Territory"),
                    Text("Period"),
                    Text(" Active participants"),
                    Text("Average committed support"),
                    Text("Average payments"),
                ],
            ),
            (
                2,
                vec![
                    Text(AT),
                    Text(NATION),
                    Text("2025-Q2"),
                    Number(500.0),
                    Text("$240"),
                    Number(200.0),
                ],
            ),
        ],
    );
    let providers = (
        "Provider by Total",
        vec![
            (
                1,
                vec![
                    Text("Support Category"),
                    Text("State/Territory"),
                    Text("Period"),
                    Text("Active provider "),
                ],
            ),
            (
                2,
                vec![Text(AT), Text(NATION), Text("2025-Q2"), Number(50.0)],
            ),
        ],
    );
    write_xlsx(path, &[market, participants, providers]);
}

#[test]
fn snapshot_from_xlsx_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.xlsx");
    market_workbook(&path);

    let report = SnapshotPipeline::default()
        .run_path(&path, &SheetNames::default())
        .unwrap();
    let snap = &report.snapshot;

    assert_eq!(snap.period.as_str(), "2025-Q2");
    assert_eq!(snap.payments, 100000.0);
    assert_eq!(snap.committed_supports, 120000.0);
    assert_eq!(snap.active_participants, 500.0);
    assert_eq!(snap.active_providers, 50.0);
    assert_eq!(snap.participants_per_provider, 10.0);
    assert_eq!(snap.share_of_total_payments, Share::Available(10.0));
    assert_eq!(snap.share_of_total_committed, Share::Available(10.0));
}

#[test]
fn xlsx_sheet_names_blank_headers_reads_dates_and_drops_empty_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dates.xlsx");
    write_xlsx(
        &path,
        &[(
            "Provider by Total",
            vec![
                (
                    1,
                    vec![Text("Period"), Text("Active provider"), Empty, Text("Note")],
                ),
                (
                    2,
                    vec![Date(JUNE_30_2024), Number(1200.0), Text("x"), Text("first")],
                ),
                // row 3 is missing entirely
                (
                    4,
                    vec![Date(JUNE_30_2024 - 91.0), Number(1100.0), Empty, Empty],
                ),
            ],
        )],
    );

    let table = load_sheet(&path, "Provider by Total").unwrap();
    assert_eq!(table.name, "Provider by Total");
    assert_eq!(
        table.columns,
        vec!["Period", "Active provider", "Unnamed: 2", "Note"]
    );
    assert_eq!(table.len(), 2);

    let first = &table.rows[0];
    assert_eq!(first["Period"], CellValue::Date("2024-06-30".into()));
    assert_eq!(first["Active provider"], CellValue::Float(1200.0));
    assert_eq!(first["Unnamed: 2"], CellValue::from("x"));

    let second = &table.rows[1];
    assert_eq!(second["Period"], CellValue::Date("2024-03-31".into()));
    assert_eq!(second["Note"], CellValue::Null);
}

#[test]
fn missing_xlsx_sheet_is_a_data_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.xlsx");
    market_workbook(&path);

    let err = load_sheet(&path, "Market by State").unwrap_err();
    assert!(matches!(err, SnapshotError::DataSource { .. }));
    let msg = err.to_string();
    assert!(msg.contains("Market by State"), "{msg}");
    assert!(msg.contains("sheet not found"), "{msg}");
    assert!(msg.contains("Market by Total"), "{msg}");

    let sheets = SheetNames {
        providers: "Providers".to_string(),
        ..SheetNames::default()
    };
    let err = SnapshotPipeline::default()
        .run_path(&path, &sheets)
        .unwrap_err();
    assert!(matches!(err, SnapshotError::DataSource { .. }));
}
