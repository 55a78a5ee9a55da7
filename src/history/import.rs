use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::model::entity::{Group, GroupHistory, GroupHistoryCreate, Student};
use crate::model::{DatabaseResult, ModelManager};
use crate::web::AuthenticatedUser;

const NAME_COLUMN: &str = "name";
const CLASS_COLUMN: &str = "class";

/// One student's line of a history import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub full_name: String,
    pub class_name: Option<String>,
    /// `(period date, group number)`; `None` means no group in that period.
    pub periods: Vec<(NaiveDate, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ImportError {
    #[error("student not found: {name}")]
    StudentNotFound { name: String },
    #[error("student name is ambiguous: {name} ({count} matches)")]
    AmbiguousStudent { name: String, count: usize },
    #[error("group {group} not found (student {name})")]
    GroupNotFound { name: String, group: f64 },
    #[error("malformed csv: {0}")]
    Malformed(String),
}

/// Rows that parsed, plus one error per row that did not.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedHistory {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub errors: Vec<ImportError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn parse_group(cell: &str) -> Result<Option<f64>, ImportError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    let number: f64 = cell
        .replace(',', ".")
        .parse()
        .map_err(|_| ImportError::Malformed(format!("bad group number '{cell}'")))?;
    if number == 0.0 {
        Ok(None)
    } else {
        Ok(Some(number))
    }
}

/// Reads import rows from csv with a `name` column, an optional `class`
/// column and one ISO-dated column per period. Unknown columns are ignored.
///
/// Only an unusable header or an io failure rejects the file. A row with a
/// bad cell is skipped as a whole and reported.
pub fn parse_history_csv<R: Read>(reader: R) -> Result<ParsedHistory, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| ImportError::Malformed(e.to_string()))?
        .clone();

    let mut name_idx = None;
    let mut class_idx = None;
    let mut period_columns = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        match header {
            NAME_COLUMN => name_idx = Some(idx),
            CLASS_COLUMN => class_idx = Some(idx),
            other => {
                if let Ok(date) = NaiveDate::parse_from_str(other, "%Y-%m-%d") {
                    period_columns.push((idx, date));
                }
            }
        }
    }
    let name_idx =
        name_idx.ok_or_else(|| ImportError::Malformed("missing 'name' column".to_string()))?;

    let mut parsed = ParsedHistory::default();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(ImportError::Malformed(e.to_string()));
            }
            Err(e) => {
                parsed.errors.push(ImportError::Malformed(e.to_string()));
                continue;
            }
        };
        let full_name = record.get(name_idx).unwrap_or_default().to_string();
        if full_name.is_empty() {
            continue;
        }

        let class_name = class_idx
            .and_then(|idx| record.get(idx))
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let periods = period_columns
            .iter()
            .map(|(idx, date)| Ok((*date, parse_group(record.get(*idx).unwrap_or_default())?)))
            .collect::<Result<Vec<_>, ImportError>>();

        match periods {
            Ok(periods) => parsed.rows.push(ImportRow {
                full_name,
                class_name,
                periods,
            }),
            Err(ImportError::Malformed(details)) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                parsed.errors.push(ImportError::Malformed(format!(
                    "line {line} ({full_name}): {details}"
                )));
            }
            Err(e) => parsed.errors.push(e),
        }
    }

    Ok(parsed)
}

pub struct HistoryImport;

impl HistoryImport {
    /// Appends the history of every parsed row. Parse errors and per-row
    /// problems are collected in the report; only storage failures abort.
    #[tracing::instrument(skip(mm, actor, parsed), fields(rows = parsed.rows.len()))]
    pub async fn run(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        parsed: &ParsedHistory,
        replace: bool,
    ) -> DatabaseResult<ImportReport> {
        let mut report = ImportReport {
            inserted: 0,
            errors: parsed.errors.clone(),
        };

        if replace {
            let mut tx = mm.executor().begin().await?;
            let removed = GroupHistory::clear(&mut tx).await?;
            tx.commit().await?;
            tracing::info!("cleared {removed} history entries");
        }

        let groups = Group::all(mm, actor).await?;
        let by_number: HashMap<u64, &Group> =
            groups.iter().map(|g| (g.number().to_bits(), g)).collect();

        for row in &parsed.rows {
            let mut matches = Student::find_by_full_name(mm, actor, &row.full_name).await?;
            let student = match matches.len() {
                0 => {
                    report.errors.push(ImportError::StudentNotFound {
                        name: row.full_name.clone(),
                    });
                    continue;
                }
                1 => matches.remove(0),
                count => {
                    report.errors.push(ImportError::AmbiguousStudent {
                        name: row.full_name.clone(),
                        count,
                    });
                    continue;
                }
            };

            let mut tx = mm.executor().begin().await?;

            if let Some(class_name) = &row.class_name {
                if student.class_name() != Some(class_name.as_str()) {
                    Student::set_class_name(&mut tx, student.id(), class_name).await?;
                }
            }

            for (date, number) in &row.periods {
                let Some(number) = number else { continue };
                let Some(group) = by_number.get(&number.to_bits()) else {
                    report.errors.push(ImportError::GroupNotFound {
                        name: row.full_name.clone(),
                        group: *number,
                    });
                    continue;
                };

                let entry = GroupHistoryCreate {
                    student_id: student.id(),
                    group_id: group.id(),
                    transfer_date: *date,
                    reason: format!("imported ({date})"),
                };
                GroupHistory::append(&mut tx, &entry).await?;
                report.inserted += 1;
            }

            Student::refresh_current_group(&mut tx, student.id()).await?;
            tx.commit().await?;
        }

        tracing::info!(
            "imported {} history entries, {} errors",
            report.inserted,
            report.errors.len()
        );
        Ok(report)
    }
}
