//! Condense a call transcript into a matter description

use once_cell::sync::Lazy;
use regex::Regex;

use super::transcript::{is_human_line, strip_speaker};

pub const FALLBACK_SUMMARY: &str = "Legal consultation request from GoHighLevel";

static ISSUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(I need help with .+?)[.!?]",
        r"(?i)(I want to .+?)[.!?]",
        r"(?i)(I was .+?)[.!?]",
        r"(?i)(I have been .+?)[.!?]",
        r"(?i)(My .+ and I .+?)[.!?]",
        r"(?i)(My .+?)[.!?]",
        r"(?i)(There was .+?)[.!?]",
        r"(?i)(Someone .+?)[.!?]",
        r"(?i)(I got .+?)[.!?]",
        r"(?i)(I am .+?)[.!?]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid issue pattern"))
    .collect()
});

static TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(last week|yesterday|today|last month|this week|recently|[a-z]+ \d+)",
        r"(?i)(\d+ (?:days|weeks|months|years) ago)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid time pattern"))
    .collect()
});

const ADMIN_PHRASES: &[&str] = &["name is", "phone number", "email", "address", "calling about", "contact"];

const ISSUE_KEYWORDS: &[(&str, &str)] = &[
    ("divorce", "seeking divorce assistance"),
    ("custody", "need help with child custody"),
    ("accident", "involved in an accident"),
    ("injured", "sustained injuries"),
    ("arrested", "facing criminal charges"),
    ("fired", "employment issue"),
    ("will", "estate planning matter"),
    ("sued", "involved in litigation"),
    ("bankruptcy", "bankruptcy consultation"),
    ("disability", "disability benefits matter"),
    ("immigration", "immigration issue"),
    ("tax", "tax matter"),
    ("contract", "contract dispute"),
    ("real estate", "real estate matter"),
];

const CONTEXT_KEYWORDS: &[&str] = &[
    "accident", "injury", "divorce", "custody", "arrested", "fired", "sued", "died", "will", "estate",
    "contract", "property", "bankruptcy", "disability", "immigration", "tax",
];

/// Short text comes back unchanged; longer transcripts are reduced to the
/// caller's main issue plus a timeframe/keyword detail, at most `max_len` chars.
pub fn summarize_transcript(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let human_lines: Vec<String> = text
        .lines()
        .filter(|line| is_human_line(line))
        .map(strip_speaker)
        .filter(|line| !line.is_empty())
        .collect();
    let human_text = human_lines.join(" ");
    let human_lower = human_text.to_lowercase();

    let main_issue = ISSUE_PATTERNS
        .iter()
        .filter_map(|p| p.captures(&human_text).map(|c| c[1].trim().to_string()))
        .find(|issue| {
            let lower = issue.to_lowercase();
            !ADMIN_PHRASES.iter().any(|a| lower.contains(a))
        })
        .or_else(|| {
            ISSUE_KEYWORDS
                .iter()
                .find(|(keyword, _)| human_lower.contains(keyword))
                .map(|(_, phrase)| phrase.to_string())
        });

    let mut details = Vec::new();
    if let Some(when) = TIME_PATTERNS.iter().find_map(|p| p.captures(&human_text)) {
        details.push(when[1].to_string());
    }
    if let Some(keyword) = CONTEXT_KEYWORDS.iter().find(|k| human_lower.contains(*k)) {
        details.push(format!("involving {}", keyword));
    }

    let mut parts = Vec::new();
    match main_issue {
        Some(issue) => parts.push(issue),
        None => {
            let first_substantial = human_lines.iter().find(|line| {
                let lower = line.to_lowercase();
                line.chars().count() > 10
                    && !["name is", "phone", "email", "address"].iter().any(|a| lower.contains(a))
            });
            if let Some(line) = first_substantial {
                parts.push(truncate_chars(line, 100));
            }
        }
    }
    if !details.is_empty() {
        parts.push(format!("({})", details.join(", ")));
    }

    let mut summary = parts.join(" ");
    if summary.chars().count() > max_len {
        summary = if let Some((main, _)) = summary.split_once('(') {
            fit(main.trim(), max_len)
        } else {
            let first_sentence = summary.split('.').next().unwrap_or_default();
            fit(first_sentence, max_len)
        };
    }

    if summary.chars().count() < 10 {
        return FALLBACK_SUMMARY.to_string();
    }
    summary
}

fn fit(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        format!("{}...", truncate_chars(text, max_len.saturating_sub(3)))
    }
}

fn truncate_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
