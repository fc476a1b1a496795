//! Caller details pulled out of a voice-AI call transcript

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const REJECTION_PHRASES: &[&str] = &["i'm sorry, we only handle", "i'm sorry, but we"];

const FALSE_POSITIVES: &[&str] = &[
    "not sure", "not sure what", "good", "fine", "okay", "ok", "yes", "no", "yeah", "yep", "sure",
    "right", "correct", "that", "this", "here", "there", "help", "calling", "having trouble",
    "trouble with", "need help", "looking for",
];

/// Looser list used once the bot has explicitly asked for a name
const REPLY_FALSE_POSITIVES: &[&str] = &[
    "not sure", "not sure what", "having trouble", "trouble with", "need help", "looking for", "yes",
    "no", "yeah",
];

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)my name is ([a-z ]+)",
        r"(?i)it'?s ([a-z ]+)",
        r"(?i)this is ([a-z ]+)",
        r"(?i)i'm ([a-z ]+)",
        r"(?i)call me ([a-z ]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid name pattern"))
    .collect()
});

static SPEAKER_PREFIX: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)^\*+\s*caller:\s*", r"(?i)^caller:\s*", r"(?i)^human:\s*", r"^\*+"]
        .iter()
        .map(|p| Regex::new(p).expect("valid prefix pattern"))
        .collect()
});

static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\+?1?\s*\(?\d{3}\)?\s*[-.\s]?\d{3}\s*[-.\s]?\d{4})",
        r"(\d{3}\s+\d{3}\s+\d{4})",
        r"(\d{10})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid phone pattern"))
    .collect()
});

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,})").expect("valid email pattern"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallerInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// False when the AI agent turned the caller away
pub fn should_create_matter(transcript: &str) -> bool {
    let lower = transcript.to_lowercase();
    !REJECTION_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

pub fn extract_caller_info(transcript: &str) -> CallerInfo {
    if transcript.trim().is_empty() {
        return CallerInfo::default();
    }
    CallerInfo {
        name: extract_name(transcript).unwrap_or_default(),
        phone: extract_phone(transcript).unwrap_or_default(),
        email: EMAIL
            .captures(&transcript.to_lowercase())
            .map(|c| c[1].to_string())
            .unwrap_or_default(),
    }
}

pub(crate) fn is_human_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    lower.starts_with("human:")
        || lower.starts_with("caller:")
        || lower.starts_with("**caller:")
        || lower.contains("**caller:**")
        || lower.contains("caller:**")
}

pub(crate) fn strip_speaker(line: &str) -> String {
    let mut clean = line.trim().to_string();
    for prefix in SPEAKER_PREFIX.iter() {
        clean = prefix.replace(&clean, "").into_owned();
    }
    clean.trim().to_string()
}

fn extract_name(transcript: &str) -> Option<String> {
    let lines: Vec<&str> = transcript.lines().collect();

    let from_caller_lines = lines
        .iter()
        .filter(|line| is_human_line(line))
        .find_map(|line| match_name(&strip_speaker(line), FALSE_POSITIVES));
    if from_caller_lines.is_some() {
        return from_caller_lines;
    }

    // the reply right after the agent asks for a name
    for pair in lines.windows(2) {
        let question = pair[0].to_lowercase();
        let asks_name = (question.contains("bot:") || question.contains("ai agent:"))
            && (question.contains("name") || question.contains("could i have"));
        if !asks_name || !is_human_line(pair[1]) {
            continue;
        }
        let reply = strip_speaker(pair[1]);
        if let Some(name) = match_name(&reply, REPLY_FALSE_POSITIVES).or_else(|| bare_name(&reply)) {
            return Some(name);
        }
    }

    match_name(transcript, FALSE_POSITIVES)
}

/// Whole-word phrase match, so "no" does not reject "Antonio"
fn contains_phrase(text: &str, phrases: &[&str]) -> bool {
    let padded = format!(" {} ", text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" "));
    phrases.iter().any(|p| padded.contains(&format!(" {} ", p)))
}

fn match_name(text: &str, false_positives: &[&str]) -> Option<String> {
    NAME_PATTERNS.iter().find_map(|pattern| {
        let candidate = pattern.captures(text)?.get(1)?.as_str().trim().to_string();
        if candidate.len() <= 1 || contains_phrase(&candidate, false_positives) {
            return None;
        }
        Some(title_case(&candidate))
    })
}

/// A short letters-only reply such as "Ada Lovelace."
fn bare_name(reply: &str) -> Option<String> {
    let reply = reply.trim_end_matches(['.', '!']).trim();
    let words: Vec<&str> = reply.split_whitespace().collect();
    let plausible = (1..=3).contains(&words.len())
        && words.iter().all(|w| w.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\''));
    if !plausible || contains_phrase(reply, REPLY_FALSE_POSITIVES) {
        return None;
    }
    Some(title_case(reply))
}

fn extract_phone(transcript: &str) -> Option<String> {
    PHONE_PATTERNS.iter().find_map(|pattern| {
        let raw = pattern.captures(transcript)?.get(1)?.as_str();
        let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 11 && digits.starts_with('1') {
            digits.remove(0);
        }
        (digits.len() == 10).then(|| format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]))
    })
}

pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
