use crate::models::TaskPriority;

/// Keyword sets checked in order; the first set with a hit decides.
const KEYWORDS: &[(TaskPriority, &[&str])] = &[
    (
        TaskPriority::High,
        &[
            "urgent", "asap", "critical", "important", "deadline", "immediately", "today",
            "urgence", "critique", "aujourd'hui",
        ],
    ),
    (
        TaskPriority::Medium,
        &[
            "meeting", "call", "review", "appointment", "email", "soon",
            "réunion", "rendez-vous", "appel",
        ],
    ),
    (
        TaskPriority::Low,
        &[
            "someday", "maybe", "later", "eventually", "optional", "whenever",
            "plus tard", "peut-être",
        ],
    ),
];

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Whether `keyword` occurs as whole words. Multi-word keywords such as
/// `plus tard` must appear as a consecutive run.
fn contains_keyword(text_words: &[String], keyword: &str) -> bool {
    let keyword = words(keyword);
    !keyword.is_empty() && text_words.windows(keyword.len()).any(|run| run == keyword.as_slice())
}

/// Guess a priority from task text, case-insensitively and on word
/// boundaries. Defaults to medium.
pub fn infer_priority(text: &str) -> TaskPriority {
    let text_words = words(text);
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_keyword(&text_words, k)))
        .map(|(priority, _)| *priority)
        .unwrap_or(TaskPriority::Medium)
}
