use chrono::{DateTime, Timelike, Utc};
use rrule::{RRuleSet, Tz};

use crate::error::CoreError;
use crate::models::{Recurrence, Task};

impl Recurrence {
    /// RFC 5545 frequency for this recurrence, if it repeats.
    pub fn frequency(&self) -> Option<&'static str> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some("DAILY"),
            Recurrence::Weekly => Some("WEEKLY"),
            Recurrence::Monthly => Some("MONTHLY"),
        }
    }
}

/// Computes successor dates for recurring tasks.
pub struct RecurrenceManager {
    recurrence: Recurrence,
}

impl RecurrenceManager {
    pub fn new(recurrence: Recurrence) -> Self {
        Self { recurrence }
    }

    /// First occurrence strictly after `due`, following the rule anchored at
    /// `due` itself.
    ///
    /// The rule is evaluated at whole-second precision; the sub-second part
    /// of `due` is carried over unchanged. Monthly rules anchored on a day a
    /// month lacks skip that month, as RFC 5545 prescribes.
    pub fn next_occurrence(&self, due: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, CoreError> {
        let Some(freq) = self.recurrence.frequency() else {
            return Ok(None);
        };

        let anchor = due.with_nanosecond(0).unwrap_or(due);
        let subsec = due - anchor;

        let rule = format!(
            "DTSTART:{}\nRRULE:FREQ={};COUNT=13",
            anchor.format("%Y%m%dT%H%M%SZ"),
            freq
        );
        let rrule: RRuleSet = rule
            .parse()
            .map_err(|e| CoreError::Validation(format!("Cannot compute recurrence: {}", e)))?;

        let next = rrule
            .into_iter()
            .find(|occurrence| *occurrence > anchor.with_timezone(&Tz::UTC))
            .map(|dt| dt.with_timezone(&Utc) + subsec);

        Ok(next)
    }

    /// Builds the single successor of a freshly created recurring task.
    pub fn successor(
        &self,
        task: &Task,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, CoreError> {
        let Some(date) = self.next_occurrence(task.date)? else {
            return Ok(None);
        };

        Ok(Some(Task {
            id,
            text: task.text.clone(),
            date,
            priority: task.priority,
            category: task.category,
            recurrence: task.recurrence,
            completed: false,
            created_at: now,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskCategory, TaskPriority};
    use chrono::{Duration, TimeZone};

    fn recurring_task(recurrence: Recurrence, date: DateTime<Utc>) -> Task {
        Task {
            id: Task::generate_id(),
            text: "Water plants".to_string(),
            date,
            priority: TaskPriority::Low,
            category: TaskCategory::Personal,
            recurrence,
            completed: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn non_recurring_has_no_next_occurrence() {
        let manager = RecurrenceManager::new(Recurrence::None);
        assert_eq!(manager.next_occurrence(Utc::now()).unwrap(), None);
    }

    #[test]
    fn daily_and_weekly_advance_by_fixed_days() {
        let due = Utc.with_ymd_and_hms(2030, 6, 1, 9, 15, 0).unwrap();
        let daily = RecurrenceManager::new(Recurrence::Daily);
        let weekly = RecurrenceManager::new(Recurrence::Weekly);

        assert_eq!(daily.next_occurrence(due).unwrap(), Some(due + Duration::days(1)));
        assert_eq!(weekly.next_occurrence(due).unwrap(), Some(due + Duration::days(7)));
    }

    #[test]
    fn monthly_keeps_day_of_month() {
        let due = Utc.with_ymd_and_hms(2030, 1, 15, 18, 0, 0).unwrap();
        let monthly = RecurrenceManager::new(Recurrence::Monthly);
        assert_eq!(
            monthly.next_occurrence(due).unwrap(),
            Some(Utc.with_ymd_and_hms(2030, 2, 15, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn subsecond_part_is_preserved() {
        let due = Utc::now() + Duration::days(3);
        let weekly = RecurrenceManager::new(Recurrence::Weekly);
        assert_eq!(weekly.next_occurrence(due).unwrap(), Some(due + Duration::days(7)));
    }

    #[test]
    fn successor_is_a_fresh_incomplete_copy() {
        let due = Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap();
        let task = recurring_task(Recurrence::Weekly, due);
        let now = Utc::now();

        let successor = RecurrenceManager::new(task.recurrence)
            .successor(&task, Task::generate_id(), now)
            .unwrap()
            .unwrap();

        assert_ne!(successor.id, task.id);
        assert_eq!(successor.date, due + Duration::days(7));
        assert!(!successor.completed);
        assert_eq!(successor.text, task.text);
        assert_eq!(successor.created_at, now);
    }
}
