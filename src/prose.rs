//! Second-stage refinement: drops captions, stubs, and list debris that
//! survive markup cleaning by filtering at sentence granularity.

use crate::config;
use crate::models::{CleanedArticle, CorpusRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

static NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\d{2,4}px").unwrap(),
        Regex::new(r"(?i)\[\[File:.*?\]\]").unwrap(),
        Regex::new(r"(?i)\[\[Image:.*?\]\]").unwrap(),
        Regex::new(r"\{\{.*?\}\}").unwrap(),
        Regex::new(r"(?is)<gallery>.*?</gallery>").unwrap(),
        Regex::new(r"(?i)width=\d+").unwrap(),
        Regex::new(r"(?i)height=\d+").unwrap(),
    ]
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tokens that mark a sentence as image plumbing rather than prose.
static MEDIA_VOCAB: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "thumb",
        "px",
        "file",
        "image",
        "photo",
        "figure",
        "gallery",
        "jpg",
        "jpeg",
        "png",
        "gif",
        "svg",
        "thumbnail",
        "pixels",
    ]
    .into_iter()
    .collect()
});

/// Trailing tokens that end a segment without ending a sentence.
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr.", "mrs.", "ms.", "dr.", "prof.", "rev.", "gen.", "sen.", "rep.", "gov.", "st.",
        "sr.", "jr.", "lt.", "col.", "capt.", "sgt.", "maj.", "mt.", "ft.", "vs.", "etc.",
        "e.g.", "i.e.", "cf.", "al.", "no.", "vol.", "pp.", "ed.", "eds.", "approx.", "inc.",
        "ltd.", "co.", "corp.",
    ]
    .into_iter()
    .collect()
});

/// Refines cleaned text into prose. Returns None when nothing survives the
/// sentence gates, which marks the article as caption or list debris.
pub fn process_text(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let mut text = text.to_string();
    for regex in NOISE_PATTERNS.iter() {
        text = regex.replace_all(&text, "").into_owned();
    }

    let filtered = filter_sentences(&text);
    let collapsed = WHITESPACE_REGEX
        .replace_all(filtered.trim(), " ")
        .into_owned();
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed)
}

pub fn refine_article(article: CleanedArticle) -> Option<CorpusRecord> {
    let text = process_text(&article.text)?;
    Some(CorpusRecord {
        title: article.title,
        text,
    })
}

fn filter_sentences(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        if text.trim().is_empty() {
            return String::new();
        }
        // A segmenter that yields nothing for real text must not lose the
        // article: pass it through unfiltered instead.
        warn!("Sentence segmentation yielded no segments, keeping text unsegmented");
        return text.to_string();
    }
    let kept: Vec<String> = sentences
        .into_iter()
        .filter(|s| is_prose_sentence(s))
        .collect();
    kept.join(" ")
}

/// Splits on Unicode sentence boundaries, then mends the over-splits the
/// boundary rules produce after abbreviations and initials.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    for segment in text.split_sentence_bounds() {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(last) = sentences.last_mut() {
            if ends_with_abbreviation(last) {
                last.push(' ');
                last.push_str(trimmed);
                continue;
            }
        }
        sentences.push(trimmed.to_string());
    }
    sentences
}

fn ends_with_abbreviation(sentence: &str) -> bool {
    let Some(last) = sentence.split_whitespace().next_back() else {
        return false;
    };
    if ABBREVIATIONS.contains(last.to_lowercase().as_str()) {
        return true;
    }
    // Single initials, the "J." in "J. R. R. Tolkien".
    let mut chars = last.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.'), None) if c.is_alphabetic() && c.is_uppercase()
    )
}

fn is_prose_sentence(sentence: &str) -> bool {
    let total = sentence.chars().count();
    if total < config::MIN_SENTENCE_CHARS {
        return false;
    }
    if has_media_token(sentence) {
        return false;
    }
    let alpha = sentence.chars().filter(|c| c.is_alphabetic()).count();
    (alpha as f64) >= (total as f64) * config::MIN_ALPHA_RATIO
}

fn has_media_token(sentence: &str) -> bool {
    sentence.split_whitespace().any(|raw| {
        let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
        !token.is_empty() && MEDIA_VOCAB.contains(token.to_lowercase().as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sentences_dropped() {
        let result = process_text("Tiny one. This sentence is long enough to stay around.");
        assert_eq!(
            result,
            Some("This sentence is long enough to stay around.".to_string())
        );
    }

    #[test]
    fn sentence_length_boundary() {
        assert!(is_prose_sentence("Ab cd efg."));
        assert!(!is_prose_sentence("Ab cd ef."));
    }

    #[test]
    fn media_sentences_dropped() {
        let result =
            process_text("The gallery shows twelve works. The artist lived in Paris for years.");
        assert_eq!(
            result,
            Some("The artist lived in Paris for years.".to_string())
        );
    }

    #[test]
    fn media_tokens_match_through_punctuation() {
        assert!(has_media_token("He kept the old photo."));
        assert!(has_media_token("Saved as (figure) above"));
        assert!(!has_media_token("The imagery was striking here."));
    }

    #[test]
    fn density_gate_boundary() {
        // 20 chars total, 10 vs 9 alphabetic.
        assert!(is_prose_sentence("abcdefghij 123 4567."));
        assert!(!is_prose_sentence("abcdefghi 1234 5678."));
    }

    #[test]
    fn numeric_runs_dropped_prose_kept() {
        assert!(!is_prose_sentence("12 34 56 78 90"));
        assert!(is_prose_sentence("The quick fox runs."));
    }

    #[test]
    fn abbreviation_split_is_mended() {
        let sentences = split_sentences("Dr. Smith arrived early. The meeting started.");
        assert_eq!(
            sentences,
            vec![
                "Dr. Smith arrived early.".to_string(),
                "The meeting started.".to_string(),
            ]
        );
    }

    #[test]
    fn initials_are_mended() {
        let sentences =
            split_sentences("J. R. R. Tolkien wrote books. Another sentence follows here.");
        assert_eq!(
            sentences,
            vec![
                "J. R. R. Tolkien wrote books.".to_string(),
                "Another sentence follows here.".to_string(),
            ]
        );
    }

    #[test]
    fn decimal_numbers_not_split() {
        let sentences = split_sentences("The value of pi is 3.14 approximately. Next fact here.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("3.14 approximately"));
    }

    #[test]
    fn unpunctuated_text_is_one_segment() {
        let sentences = split_sentences("no terminal punctuation at all here");
        assert_eq!(sentences, vec!["no terminal punctuation at all here"]);
    }

    #[test]
    fn gallery_and_dimension_noise_removed() {
        let raw = "Before text stays here fine. <gallery>File:a.jpg\nFile:b.jpg</gallery> \
                   width=200 height=100 After text stays here too.";
        let result = process_text(raw);
        assert_eq!(
            result,
            Some("Before text stays here fine. After text stays here too.".to_string())
        );
    }

    #[test]
    fn blank_input_is_none() {
        assert_eq!(process_text(""), None);
        assert_eq!(process_text("  \n "), None);
    }

    #[test]
    fn pure_noise_is_none() {
        assert_eq!(process_text("{{infobox}} 300px width=500"), None);
    }

    #[test]
    fn clean_prose_passes_unchanged() {
        let raw = "The artist lived in Paris for ten years. She painted daily.";
        assert_eq!(process_text(raw), Some(raw.to_string()));
    }

    #[test]
    fn refine_article_keeps_title() {
        let article = CleanedArticle {
            title: "Paris".to_string(),
            text: "The artist lived in Paris for ten years.".to_string(),
        };
        let record = refine_article(article).unwrap();
        assert_eq!(record.title, "Paris");
        assert_eq!(record.text, "The artist lived in Paris for ten years.");
    }
}
