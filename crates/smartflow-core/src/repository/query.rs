use crate::models::{SortKey, StatusFilter, Task};

/// Projects `tasks` through a status bucket, a case-insensitive substring
/// search on the text and a sort order. Ties keep insertion order.
pub fn project(tasks: &[Task], filter: StatusFilter, search: &str, sort: SortKey) -> Vec<Task> {
    let needle = search.to_lowercase();
    let mut projected: Vec<Task> = tasks
        .iter()
        .filter(|t| filter.matches(t))
        .filter(|t| needle.is_empty() || t.text.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    match sort {
        SortKey::Default => {}
        SortKey::DateAsc => projected.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::DateDesc => projected.sort_by(|a, b| b.date.cmp(&a.date)),
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::sample_task;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn on(day: u32, text: &str, completed: bool) -> Task {
        let mut task = sample_task(text, Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap());
        task.completed = completed;
        task
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn sorts_by_date_in_both_directions() {
        let tasks = vec![on(2, "b", false), on(3, "c", false), on(1, "a", false)];

        let asc = project(&tasks, StatusFilter::All, "", SortKey::DateAsc);
        let desc = project(&tasks, StatusFilter::All, "", SortKey::DateDesc);
        let default = project(&tasks, StatusFilter::All, "", SortKey::Default);

        assert_eq!(texts(&asc), vec!["a", "b", "c"]);
        assert_eq!(texts(&desc), vec!["c", "b", "a"]);
        assert_eq!(texts(&default), vec!["b", "c", "a"]);
    }

    #[test]
    fn filters_by_status_and_search() {
        let tasks = vec![
            on(1, "Call Alice", false),
            on(2, "call Bob", true),
            on(3, "Write memo", false),
        ];

        let pending = project(&tasks, StatusFilter::Pending, "", SortKey::Default);
        assert_eq!(texts(&pending), vec!["Call Alice", "Write memo"]);

        let done = project(&tasks, StatusFilter::Completed, "", SortKey::Default);
        assert_eq!(texts(&done), vec!["call Bob"]);

        let calls = project(&tasks, StatusFilter::All, "CALL", SortKey::Default);
        assert_eq!(texts(&calls), vec!["Call Alice", "call Bob"]);

        assert!(project(&tasks, StatusFilter::Pending, "bob", SortKey::Default).is_empty());
    }

    #[test]
    fn search_is_a_plain_substring_match() {
        let tasks = vec![on(1, "Write memo", false), on(2, "memo to self", false)];

        let spaced = project(&tasks, StatusFilter::All, "memo ", SortKey::Default);
        assert_eq!(texts(&spaced), vec!["memo to self"]);
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let tasks = vec![on(1, "first", false), on(1, "second", false), on(1, "third", false)];
        let desc = project(&tasks, StatusFilter::All, "", SortKey::DateDesc);
        assert_eq!(texts(&desc), vec!["first", "second", "third"]);
    }

    proptest! {
        #[test]
        fn projection_is_an_ordered_subset(
            days in prop::collection::vec((1u32..=28, any::<bool>()), 0..30),
            search in "[a-c]{0,2}",
        ) {
            let tasks: Vec<Task> = days
                .iter()
                .enumerate()
                .map(|(i, (day, done))| on(*day, &format!("task {} {}", ["a", "b", "c"][i % 3], i), *done))
                .collect();

            let asc = project(&tasks, StatusFilter::Pending, &search, SortKey::DateAsc);

            prop_assert!(asc.windows(2).all(|w| w[0].date <= w[1].date));
            prop_assert!(asc.iter().all(|t| !t.completed && t.text.contains(search.as_str())));
            let expected = tasks
                .iter()
                .filter(|t| !t.completed && t.text.contains(search.as_str()))
                .count();
            prop_assert_eq!(asc.len(), expected);
        }
    }
}
