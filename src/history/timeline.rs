use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One group-history row joined with the display data the chart needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryRecord {
    pub student_id: Uuid,
    pub student_name: String,
    pub group_id: Uuid,
    pub group_number: f64,
    pub transfer_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub group_id: Uuid,
    pub group_number: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StudentTimeline {
    pub student_id: Uuid,
    pub full_name: String,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Timeline {
    pub key_dates: Vec<NaiveDate>,
    pub students: Vec<StudentTimeline>,
}

/// Distinct transfer dates, ascending. Falls back to `defaults` when there is
/// no history at all.
pub fn key_dates(records: &[HistoryRecord], defaults: &[NaiveDate]) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.transfer_date).collect();
    if dates.is_empty() {
        let mut defaults = defaults.to_vec();
        defaults.sort();
        defaults.dedup();
        return defaults;
    }
    dates.into_iter().collect()
}

/// Forward-fills one student's sorted entries over `key_dates`.
///
/// Key dates before the first entry produce nothing. After that, every key
/// date gets the group of the latest entry with `transfer_date <= key`.
pub fn student_series(entries: &[&HistoryRecord], key_dates: &[NaiveDate]) -> Vec<TimelinePoint> {
    let mut series = Vec::new();
    let mut current: Option<&HistoryRecord> = None;
    let mut cursor = 0;

    for &key in key_dates {
        while cursor < entries.len() && entries[cursor].transfer_date <= key {
            current = Some(entries[cursor]);
            cursor += 1;
        }

        if let Some(entry) = current {
            series.push(TimelinePoint {
                date: key,
                group_id: entry.group_id,
                group_number: entry.group_number,
            });
        }
    }

    series
}

/// Builds per-student timelines over the shared key dates, sorted by name.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn build_timeline(records: &[HistoryRecord], default_dates: &[NaiveDate]) -> Timeline {
    let key_dates = key_dates(records, default_dates);

    let mut by_student: HashMap<Uuid, Vec<&HistoryRecord>> = HashMap::new();
    for record in records {
        by_student.entry(record.student_id).or_default().push(record);
    }

    let mut students: Vec<StudentTimeline> = by_student
        .into_values()
        .filter_map(|mut entries| {
            // stable: same-day entries keep their log order, the last one wins
            entries.sort_by_key(|e| e.transfer_date);
            let first = entries.first()?;
            let points = student_series(&entries, &key_dates);
            if points.is_empty() {
                return None;
            }

            Some(StudentTimeline {
                student_id: first.student_id,
                full_name: first.student_name.clone(),
                points,
            })
        })
        .collect();

    students.sort_by(|a, b| {
        a.full_name
            .cmp(&b.full_name)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    tracing::debug!("built timeline for {} students", students.len());

    Timeline {
        key_dates,
        students,
    }
}
