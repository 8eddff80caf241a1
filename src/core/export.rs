//! CSV report generation.
//!
//! Serializes the day groups of an [`AggregateView`] as one row per entry. Off-days
//! with no entries get a single placeholder row carrying the holiday name. Fields are
//! written through the `csv` crate, so embedded commas and quotes are escaped.

use crate::{
    core::aggregate::{AggregateView, DailyGroup},
    errors::{Error, Result},
    models::Category,
};

/// Column headers of the report.
pub const HEADERS: [&str; 9] = [
    "Date",
    "Status",
    "Process",
    "Product",
    "Plan",
    "Actual",
    "Unit",
    "Batch No",
    "Manpower",
];

/// A generated report ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReport {
    /// Suggested file name
    pub file_name: String,
    /// CSV text
    pub content: String,
}

/// File name `{Org}_Full_Report_{category}_{YYYY-MM}.csv`, with whitespace in the
/// organisation name replaced by underscores.
#[must_use]
pub fn report_file_name(organization: &str, category: Category, month: &str) -> String {
    let org = organization.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{org}_Full_Report_{category}_{}.csv", month.trim())
}

fn status(group: &DailyGroup) -> &'static str {
    if group.is_off_day { "Holiday" } else { "Working" }
}

/// Serializes day groups to CSV text: the header row, then one row per entry.
pub fn to_csv(groups: &[DailyGroup]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for group in groups {
        if group.entries.is_empty() {
            let label = group.off_day_description.as_deref().unwrap_or("-");
            writer.write_record([
                group.date.as_str(),
                status(group),
                "-",
                label,
                "0",
                "0",
                "-",
                "-",
                "0",
            ])?;
            continue;
        }

        for entry in &group.entries {
            let plan = entry.plan_quantity.to_string();
            let actual = entry.actual_quantity.to_string();
            let manpower = entry.manpower.to_string();
            writer.write_record([
                group.date.as_str(),
                status(group),
                entry.process.name(),
                entry.product_name.as_str(),
                plan.as_str(),
                actual.as_str(),
                entry.unit.as_str(),
                entry.batch_no.as_deref().unwrap_or("-"),
                manpower.as_str(),
            ])?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Export {
        message: format!("report is not valid UTF-8: {e}"),
    })
}

/// Builds the downloadable report for a view.
pub fn export_report(view: &AggregateView, organization: &str) -> Result<CsvReport> {
    Ok(CsvReport {
        file_name: report_file_name(organization, view.category, &view.month),
        content: to_csv(&view.days)?,
    })
}
