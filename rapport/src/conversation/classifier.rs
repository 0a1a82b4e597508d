//! Keyword classification of user input: emotion, intensity, intent and topics.

use super::tables::{
    COMMAND_WORDS, DIMINISHERS, EMOTION_KEYWORDS, INTENSIFIERS, MEMORY_KEYWORDS, MODERATORS,
    QUESTION_WORDS, STOPWORDS,
};
use super::types::{Emotion, InputAnalysis, Intent};
use lazy_static::lazy_static;
use regex::Regex;

const MAX_TOPICS: usize = 5;

/// Lowercased words of `text`, apostrophes kept
pub fn tokenize(text: &str) -> Vec<String> {
    lazy_static! {
        static ref WORD_REGEX: Regex = Regex::new(r"[a-z][a-z']*").unwrap();
    }

    let lowered = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str().trim_end_matches('\'').to_string())
        .collect()
}

/// Classify a user message
pub fn analyze(input: &str) -> InputAnalysis {
    let words = tokenize(input);
    let emotion = detect_emotion(&words);

    InputAnalysis {
        emotion,
        intensity: detect_intensity(&words),
        intent: detect_intent(input, &words, emotion),
        topics: extract_topics(&words),
    }
}

/// Emotion with the most keyword hits; ties go to the earlier table entry
pub fn detect_emotion(words: &[String]) -> Emotion {
    let mut best = (Emotion::Neutral, 0);

    for (emotion, keywords) in EMOTION_KEYWORDS {
        let hits = count_hits(words, keywords);
        if hits > best.1 {
            best = (*emotion, hits);
        }
    }

    best.0
}

pub fn detect_intensity(words: &[String]) -> f64 {
    if count_hits(words, INTENSIFIERS) > 0 {
        0.8
    } else if count_hits(words, MODERATORS) > 0 {
        0.6
    } else if count_hits(words, DIMINISHERS) > 0 {
        0.3
    } else {
        0.5
    }
}

pub fn detect_intent(input: &str, words: &[String], emotion: Emotion) -> Intent {
    let first = words.first().map(String::as_str);

    if input.trim_end().ends_with('?') || first.is_some_and(|w| QUESTION_WORDS.contains(&w)) {
        Intent::Question
    } else if first.is_some_and(|w| COMMAND_WORDS.contains(&w)) {
        Intent::Command
    } else if emotion != Emotion::Neutral {
        Intent::Emotion
    } else {
        Intent::Statement
    }
}

/// Content words in order of first appearance, without keywords already
/// accounted for by emotion, intensity or memory
pub fn extract_topics(words: &[String]) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();

    for word in words {
        let w = word.as_str();
        if w.len() < 3
            || STOPWORDS.contains(&w)
            || is_emotion_keyword(w)
            || INTENSIFIERS.contains(&w)
            || MODERATORS.contains(&w)
            || DIMINISHERS.contains(&w)
            || MEMORY_KEYWORDS.contains(&w)
            || topics.iter().any(|t| t == w)
        {
            continue;
        }
        topics.push(word.clone());
        if topics.len() == MAX_TOPICS {
            break;
        }
    }

    topics
}

/// Whether any word is in `keywords`
pub fn mentions(words: &[String], keywords: &[&str]) -> bool {
    count_hits(words, keywords) > 0
}

/// First word that is in `keywords`
pub fn first_mention<'a>(words: &'a [String], keywords: &[&str]) -> Option<&'a str> {
    words
        .iter()
        .map(String::as_str)
        .find(|w| keywords.contains(w))
}

fn count_hits(words: &[String], keywords: &[&str]) -> usize {
    words
        .iter()
        .filter(|w| keywords.contains(&w.as_str()))
        .count()
}

fn is_emotion_keyword(word: &str) -> bool {
    EMOTION_KEYWORDS
        .iter()
        .any(|(_, keywords)| keywords.contains(&word))
}
