use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").unwrap());

static REF_SELF_CLOSING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<ref\b[^>]*/>").unwrap());

static REF_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ref\b[^>]*>.*?</ref>").unwrap());

static EXTERNAL_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(?:https?:|//)[^\]]*\]").unwrap());

static MAGIC_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"__[A-Z_]+__").unwrap());

/// Reduces wikicode to plain(er) text ahead of the substitution cascade:
/// comments, reference blocks, tables, templates, and link markup go away;
/// link display text survives. Line structure is preserved so the caller's
/// line filter still sees the original line boundaries.
pub fn strip_markup(text: &str) -> String {
    let text = COMMENT_REGEX.replace_all(text, "");
    let text = REF_SELF_CLOSING_REGEX.replace_all(&text, "");
    let text = REF_BLOCK_REGEX.replace_all(&text, "");
    let text = strip_tables(&text);
    let text = strip_templates(&text);
    let text = strip_links(&text);
    let text = EXTERNAL_LINK_REGEX.replace_all(&text, "");
    let text = text.replace("'''''", "").replace("'''", "").replace("''", "");
    MAGIC_WORD_REGEX.replace_all(&text, "").into_owned()
}

/// Removes `{{...}}` runs, tracking nesting depth. An unclosed opener
/// swallows the rest of the text.
fn strip_templates(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;
    let mut run_start = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            result.push_str(&text[run_start..i]);
            let mut depth: i32 = 0;
            while i + 1 < bytes.len() {
                if bytes[i] == b'{' && bytes[i + 1] == b'{' {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b'}' && bytes[i + 1] == b'}' {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    i += 1;
                }
            }
            if depth > 0 {
                return result;
            }
            run_start = i;
        } else {
            i += 1;
        }
    }

    result.push_str(&text[run_start..]);
    result
}

/// Removes `{|...|}` table blocks. Table openers only count at the start of a
/// line (wikitext requires it), which keeps `{{` template syntax out of reach.
fn strip_tables(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;
    let mut run_start = 0;

    while i + 1 < bytes.len() {
        let at_line_start = i == 0 || bytes[i - 1] == b'\n';
        if at_line_start && bytes[i] == b'{' && bytes[i + 1] == b'|' {
            result.push_str(&text[run_start..i]);
            let mut depth: i32 = 0;
            while i + 1 < bytes.len() {
                if bytes[i] == b'{' && bytes[i + 1] == b'|' {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b'|' && bytes[i + 1] == b'}' {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    i += 1;
                }
            }
            if depth > 0 {
                return result;
            }
            run_start = i;
        } else {
            i += 1;
        }
    }

    result.push_str(&text[run_start..]);
    result
}

/// Replaces `[[...]]` links with their display text. Media and category
/// links vanish entirely, captions and all, even when the caption nests
/// further links.
fn strip_links(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;
    let mut run_start = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'[' && bytes[i + 1] == b'[' {
            result.push_str(&text[run_start..i]);
            let content_start = i + 2;
            let mut depth: i32 = 0;
            while i + 1 < bytes.len() {
                if bytes[i] == b'[' && bytes[i + 1] == b'[' {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b']' && bytes[i + 1] == b']' {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    i += 1;
                }
            }
            if depth > 0 {
                return result;
            }
            if let Some(display) = link_display(&text[content_start..i - 2]) {
                result.push_str(display);
            }
            run_start = i;
        } else {
            i += 1;
        }
    }

    result.push_str(&text[run_start..]);
    result
}

/// What a `[[...]]` link renders as: the text after the first pipe, or the
/// target itself. None for suppressed targets (media, category, interwiki).
fn link_display(content: &str) -> Option<&str> {
    let (target, display) = match content.find('|') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, content),
    };
    if is_suppressed_target(target) {
        return None;
    }
    Some(display)
}

fn is_suppressed_target(target: &str) -> bool {
    let target = target.trim();
    const SUPPRESSED_PREFIXES: [&str; 15] = [
        "file:",
        "image:",
        "category:",
        "wikt:",
        "wiktionary:",
        "wikipedia:",
        "wikisource:",
        "wikiquote:",
        "wikibooks:",
        "wikinews:",
        "wikiversity:",
        "wikivoyage:",
        "commons:",
        "species:",
        "meta:",
    ];
    if SUPPRESSED_PREFIXES
        .iter()
        .any(|ns| starts_with_ignore_case(target, ns))
    {
        return true;
    }
    // Interwiki links look like a 2-3 letter language code and a colon.
    match target.find(':') {
        Some(pos) if (2..=3).contains(&pos) => {
            target[..pos].chars().all(|c| c.is_ascii_alphabetic())
        }
        _ => false,
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
