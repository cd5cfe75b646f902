//! Alexandria: Wikipedia dump to plain-text corpus pipeline
//!
//! This crate turns a bz2-compressed Wikipedia XML export into a JSON corpus
//! of readable prose, one pass over the dump:
//!
//! 1. **Stream** -- Decompress and parse the dump incrementally, yielding one
//!    page subtree at a time without ever loading the archive into memory
//! 2. **Extract** -- Keep mainspace articles with real revision text; drop
//!    redirects, talk/category/template pages, and stubs
//! 3. **Clean** -- Strip wiki markup structurally, then run an ordered
//!    substitution cascade and a per-line filter; enforce a word-count floor
//! 4. **Refine** -- Split cleaned text into sentences and keep only those
//!    that read like prose (length, media vocabulary, alphabetic density)
//! 5. **Write** -- Stream accepted {title, text} records into a JSON array
//!    that stays valid even when a run is interrupted
//!
//! # Architecture
//!
//! The pipeline is single-threaded and streaming end to end:
//!
//! - **Streaming XML parsing** -- Event-based parsing over a BZ2 decoder;
//!   memory stays flat regardless of dump size
//! - **Per-page isolation** -- A malformed or rejected page never aborts the
//!   run; every rejection is counted under its reason
//! - **Incremental output** -- Records are serialized as they are accepted,
//!   with array framing written on open and close
//!
//! # Key Modules
//!
//! - [`parser`] -- Streaming XML parser with BZ2 decompression
//! - [`extract`] -- Structural validation, skip taxonomy, and the run driver
//! - [`wikitext`] -- Structural markup stripping (templates, tables, links)
//! - [`clean`] -- Regex substitution cascade and line filtering
//! - [`prose`] -- Sentence segmentation and prose heuristics
//! - [`writer`] -- Streaming JSON array output
//! - [`models`] -- Core data types (DumpPage, RawArticle, CorpusRecord)
//! - [`stats`] -- Run counters and throughput tracking
//! - [`config`] -- Pipeline constants and thresholds
//!
//! # Example Usage
//!
//! ```bash
//! # Extract a full dump
//! alexandria -i enwiki-latest-pages-articles.xml.bz2 -o corpus.json
//!
//! # Inspect acceptance rates on the first 10k pages without writing
//! alexandria -i enwiki-latest-pages-articles.xml.bz2 -o /dev/null --limit 10000 --dry-run -v
//! ```

pub mod clean;
pub mod config;
pub mod extract;
pub mod models;
pub mod parser;
pub mod prose;
pub mod stats;
pub mod wikitext;
pub mod writer;
