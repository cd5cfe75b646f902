/// Namespace id of mainspace content articles
pub const MAIN_NAMESPACE: i32 = 0;

/// Raw markup must exceed this length (in bytes) to be worth cleaning
pub const MIN_MARKUP_LEN: usize = 50;

/// Default minimum word count for a cleaned article to be accepted
pub const DEFAULT_MIN_WORDS: usize = 10;

/// Sentences shorter than this (in chars, trimmed) are dropped by the prose filter
pub const MIN_SENTENCE_CHARS: usize = 10;

/// Minimum fraction of alphabetic characters for a sentence to count as prose
pub const MIN_ALPHA_RATIO: f64 = 0.5;

/// Progress update interval (refresh every N accepted articles)
pub const PROGRESS_INTERVAL: u64 = 100;

/// Schema URI prefix shared by all MediaWiki export versions
pub const MEDIAWIKI_EXPORT_NS: &str = "http://www.mediawiki.org/xml/export-";
