use crate::models::{CleanedArticle, RawArticle};
use crate::wikitext;
use once_cell::sync::Lazy;
use regex::Regex;

static PIPE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|[^\n]*").unwrap());

static LINK_UNWRAP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(?:[^|\]]*\|)?([^\]]+)\]\]").unwrap());

/// The substitution cascade, applied to the whole running text in declared
/// order. Order is load-bearing: link unwrapping must run before the residual
/// bracket sweep, pipe stripping before the vocabulary pass sees caption
/// fragments.
static CASCADE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // table blocks
        (Regex::new(r"(?s)\{\|.*?\|\}").unwrap(), ""),
        // caption fragments: |thumb|... runs and Albedo| annotation runs
        (Regex::new(r"(?i)\|thumb\|[^|\n]*").unwrap(), ""),
        (Regex::new(r"(?i)albedo\|[^|\n]*").unwrap(), ""),
        // anything from a pipe to end of line
        (PIPE_LINE_REGEX.clone(), ""),
        // image and figure vocabulary, whole words, longest alternatives first
        (
            Regex::new(
                r"(?i)\b(?:infobox image|illustration|thumbnail|portrait|figure|glyph|photo|image|px)\b",
            )
            .unwrap(),
            "",
        ),
        // size annotations like 200px
        (Regex::new(r"(?i)\b\d{2,4}px\b").unwrap(), ""),
        // bracketed reference markers
        (
            Regex::new(r"(?i)\[\d+\]|\[citation needed\]|\[note \d+\]").unwrap(),
            "",
        ),
        // link unwrap, the one substitution rule: display text is usually prose
        (LINK_UNWRAP_REGEX.clone(), "$1"),
        // HTML tags
        (Regex::new(r"<[^>]+>").unwrap(), ""),
        // bare URLs
        (Regex::new(r"(?i)https?://\S+|www\.\S+").unwrap(), ""),
        // file/image and category link blocks
        (Regex::new(r"(?si)\[\[(?:File|Image):.+?\]\]").unwrap(), ""),
        (Regex::new(r"(?si)\[\[Category:.+?\]\]").unwrap(), ""),
        // bracket/paren pairs emptied by earlier deletions
        (Regex::new(r"\[\s*\]|\(\s*\)").unwrap(), ""),
        // whatever double-brace/double-bracket runs survived
        (Regex::new(r"\{\{[^}]*\}\}|\[\[[^\]]*\]\]").unwrap(), ""),
        // whitespace collapse
        (Regex::new(r"\n\s*\n").unwrap(), "\n"),
        (Regex::new(r" +").unwrap(), " "),
    ]
});

/// Cleans raw article markup down to prose. Returns None when the surviving
/// text falls below `min_words`, the primary recall/precision knob.
pub fn clean_text(raw: &str, min_words: usize) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let stripped = wikitext::strip_markup(raw);
    let cleaned = apply_cascade(&stripped);

    let joined = cleaned
        .split('\n')
        .map(str::trim)
        .filter(|line| keep_line(line))
        .collect::<Vec<_>>()
        .join(" ");
    let text = joined.trim().to_string();

    if text.split_whitespace().count() < min_words {
        return None;
    }
    Some(text)
}

/// Titles only need the link-unwrap and pipe-stripping rules.
pub fn clean_title(raw: &str) -> Option<String> {
    let unwrapped = LINK_UNWRAP_REGEX.replace_all(raw, "$1");
    let stripped = PIPE_LINE_REGEX.replace_all(&unwrapped, "");
    let title = stripped.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

pub fn clean_article(raw: RawArticle, min_words: usize) -> Option<CleanedArticle> {
    let text = clean_text(&raw.markup, min_words)?;
    let title = clean_title(&raw.title)?;
    Some(CleanedArticle { title, text })
}

fn apply_cascade(text: &str) -> String {
    let mut text = text.to_string();
    for (regex, replacement) in CASCADE.iter() {
        text = regex.replace_all(&text, *replacement).into_owned();
    }
    text
}

fn keep_line(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    const DROP_PREFIXES: [&str; 8] = ["|", "{", "}", "==", "[[", "]]", "thumb|", "Albedo|"];
    if DROP_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return false;
    }
    const DROP_FRAGMENTS: [&str; 5] = ["category:", "file:", "image:", "|thumb|", "|albedo|"];
    let lower = line.to_lowercase();
    !DROP_FRAGMENTS.iter().any(|f| lower.contains(f))
}
