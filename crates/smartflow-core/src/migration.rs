//! One-shot normalisation of legacy date strings, run right after the store
//! is read on load.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::models::{format_canonical, parse_canonical, Task, TaskRecord};
use crate::store::TaskStore;
use crate::timezone::localize;

/// Day-month-year display formats written by older builds, plus the
/// year-first format of the date picker.
const LEGACY_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y, %H:%M",
    "%d/%m/%Y, %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a legacy display date as wall-clock time in `tz`.
pub fn parse_legacy(s: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let s = s.trim();
    LEGACY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|naive| localize(naive, tz))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Normalized {
    Canonical,
    Parsed,
    Defaulted,
}

fn normalize_timestamp(value: &str, tz: Tz, now: DateTime<Utc>) -> (DateTime<Utc>, Normalized) {
    if let Some(dt) = parse_canonical(value) {
        return (dt, Normalized::Canonical);
    }
    match parse_legacy(value, tz) {
        Some(dt) => (dt, Normalized::Parsed),
        None => (now, Normalized::Defaulted),
    }
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub tasks: Vec<Task>,
    /// Records rewritten from a parsed legacy date.
    pub migrated: usize,
    /// Records whose date could not be parsed and now carry the load time.
    pub defaulted: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> usize {
        self.migrated + self.defaulted
    }
}

/// Rewrites every non-canonical record to canonical form and persists it.
///
/// Canonical records pass through untouched, so running this twice over the
/// same records writes nothing the second time.
pub async fn migrate_records(
    store: &dyn TaskStore,
    records: Vec<TaskRecord>,
    legacy_tz: Tz,
    now: DateTime<Utc>,
) -> Result<MigrationReport, PersistenceError> {
    let mut report = MigrationReport::default();

    for record in records {
        if record.has_canonical_dates() {
            report.tasks.push(record.to_task()?);
            continue;
        }

        let (date, date_outcome) = normalize_timestamp(&record.date, legacy_tz, now);
        let (created_at, _) = normalize_timestamp(&record.created_at, legacy_tz, now);

        let task = Task {
            id: record.id.clone(),
            text: record.text.clone(),
            date,
            priority: record.priority,
            category: record.category,
            recurrence: record.recurrence,
            completed: record.completed,
            created_at,
        };

        match date_outcome {
            Normalized::Defaulted => {
                warn!(
                    "Unparseable date '{}' on task {}, substituting {}",
                    record.date,
                    record.id,
                    format_canonical(&now)
                );
                report.defaulted += 1;
            }
            Normalized::Parsed => {
                debug!("Migrated date '{}' on task {}", record.date, record.id);
                report.migrated += 1;
            }
            // only created_at needed rewriting
            Normalized::Canonical => report.migrated += 1,
        }

        store.put(&task).await?;
        report.tasks.push(task);
    }

    if report.changed() > 0 {
        info!(
            "Date migration rewrote {} task(s) ({} defaulted)",
            report.changed(),
            report.defaulted
        );
    }

    Ok(report)
}
