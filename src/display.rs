// src/display.rs
//! Plain-text tables for the command-line shell.

use prettytable::{format, Cell, Row, Table};

use crate::aggregate::{CategoryTotals, LongTable, WideTable};
use crate::dataset::DatasetRow;
use crate::victims::YearCount;
use crate::views::ViewReport;

/// A titled table ready for printing.
pub struct Section {
    pub title: String,
    pub table: Table,
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        header.iter().map(|h| Cell::new(h).style_spec("bFg")).collect(),
    ));
    table
}

fn number(n: impl ToString) -> Cell {
    Cell::new(&n.to_string()).style_spec("r")
}

/// Single-column listing, e.g. the states selector.
pub fn list_table(title: &str, items: &[String]) -> Table {
    let mut table = new_table(&[title]);
    for item in items {
        table.add_row(Row::new(vec![Cell::new(item)]));
    }
    table
}

pub fn totals_table(totals: &CategoryTotals, label: &str) -> Table {
    let mut table = new_table(&[label, "Count"]);
    for c in totals {
        table.add_row(Row::new(vec![Cell::new(&c.category), number(c.count)]));
    }
    table
}

pub fn wide_table(wide: &WideTable) -> Table {
    let mut header = vec![wide.id_column.as_str()];
    header.extend(wide.value_columns.iter().map(String::as_str));
    let mut table = new_table(&header);
    for row in &wide.rows {
        let mut cells = vec![Cell::new(&row.id)];
        cells.extend(row.values.iter().map(|v| number(*v)));
        table.add_row(Row::new(cells));
    }
    table
}

pub fn long_table(long: &LongTable) -> Table {
    let mut table = new_table(&[
        long.id_column.as_str(),
        long.var_column.as_str(),
        long.value_column.as_str(),
    ]);
    for row in &long.rows {
        table.add_row(Row::new(vec![
            Cell::new(&row.id),
            Cell::new(&row.variable),
            number(row.value),
        ]));
    }
    table
}

fn rows_table(rows: &[DatasetRow]) -> Table {
    let mut header = vec!["State", "District", "Year"];
    if let Some(first) = rows.first() {
        header.extend(first.counts.categories());
    }
    let mut table = new_table(&header);
    for row in rows {
        let mut cells = vec![
            Cell::new(&row.region),
            Cell::new(&row.group),
            number(row.year),
        ];
        cells.extend(row.counts.iter().map(|c| number(c.count)));
        table.add_row(Row::new(cells));
    }
    table
}

fn trend_table(trend: &[YearCount]) -> Table {
    let mut table = new_table(&["Year", "Reported"]);
    for point in trend {
        table.add_row(Row::new(vec![number(point.year), number(point.reported)]));
    }
    table
}

/// Break a report into printable sections.
pub fn report_sections(report: &ViewReport) -> Vec<Section> {
    let section = |title: String, table: Table| Section { title, table };
    match report {
        ViewReport::Home {
            message,
            crime_rows,
            victim_rows,
        } => {
            let mut table = new_table(&["Table", "Rows"]);
            table.add_row(Row::new(vec![Cell::new("crime"), number(crime_rows)]));
            table.add_row(Row::new(vec![Cell::new("victims"), number(victim_rows)]));
            vec![section(message.clone(), table)]
        }
        ViewReport::NoData { reason } => {
            vec![section(
                "No data".to_string(),
                list_table("Reason", &[reason.clone()]),
            )]
        }
        ViewReport::CrimeData(data) => vec![
            section(
                format!("Crime Data for {} in {}", data.district, data.state),
                rows_table(&data.rows),
            ),
            section(
                format!("Crime Statistics in {}", data.district),
                totals_table(&data.sorted_totals, "Crime"),
            ),
            section(
                format!("Crime Type Distribution in {}", data.state),
                totals_table(&data.distribution_totals, "CrimeType"),
            ),
            section(
                format!("Crime Comparison in {}", data.state),
                wide_table(&data.comparison),
            ),
        ],
        ViewReport::DangerLevel {
            state,
            district,
            assessment,
            message,
        } => {
            let mut table = new_table(&["Tier", "Total"]);
            table.add_row(Row::new(vec![
                Cell::new(assessment.tier.as_str()),
                number(assessment.total),
            ]));
            vec![section(
                format!("{} ({}, {})", message, district, state),
                table,
            )]
        }
        ViewReport::WomanSafety { state, report } => vec![
            section(
                format!("Trend of Reported Rape Cases in {}", state),
                trend_table(&report.trend),
            ),
            section(
                "Age Group Analysis of Reported Rape Cases".to_string(),
                wide_table(&report.age_groups),
            ),
            section(
                "Regional Comparison of Reported Rape Cases Over Years".to_string(),
                long_table(&report.heatmap),
            ),
            section(
                "Demographics of Rape Victims".to_string(),
                totals_table(&report.demographics, "Demographic"),
            ),
        ],
    }
}
