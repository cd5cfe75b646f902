use crate::clean;
use crate::config;
use crate::models::{CorpusRecord, DumpPage, RawArticle};
use crate::parser::DumpReader;
use crate::prose;
use crate::stats::{PipelineStats, RateTracker};
use crate::writer::CorpusWriter;
use anyhow::Result;
use indicatif::{HumanCount, ProgressBar};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a page was rejected on its way through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not in the article namespace.
    Namespace,
    /// Missing or blank title or revision text.
    Incomplete,
    /// Redirect element or #REDIRECT marker.
    Redirect,
    /// Markup too short to be a real article.
    Short,
    /// Cleaning left fewer words than the threshold.
    Markup,
    /// No sentence survived the prose gates.
    Prose,
}

/// Terminal state of one page.
#[derive(Debug)]
pub enum PageOutcome {
    Accepted(CorpusRecord),
    Skipped(SkipReason),
}

/// Knobs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub min_words: usize,
    pub limit: Option<u64>,
    pub dry_run: bool,
}

/// Structural validation: keeps mainspace articles that carry actual prose
/// markup, rejects everything else with the reason.
pub fn extract_article(page: DumpPage) -> Result<RawArticle, SkipReason> {
    if page.ns != Some(config::MAIN_NAMESPACE) {
        return Err(SkipReason::Namespace);
    }
    let title = page
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(SkipReason::Incomplete)?;
    let markup = page
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or(SkipReason::Incomplete)?;
    if page.redirect || is_redirect(&markup) {
        return Err(SkipReason::Redirect);
    }
    if markup.len() <= config::MIN_MARKUP_LEN {
        return Err(SkipReason::Short);
    }
    Ok(RawArticle { title, markup })
}

fn is_redirect(markup: &str) -> bool {
    let head = markup.trim_start();
    head.get(..9)
        .is_some_and(|p| p.eq_ignore_ascii_case("#redirect"))
}

/// Runs one page through extraction, cleaning, and prose refinement.
pub fn process_page(page: DumpPage, min_words: usize) -> PageOutcome {
    let raw = match extract_article(page) {
        Ok(raw) => raw,
        Err(reason) => return PageOutcome::Skipped(reason),
    };
    let Some(cleaned) = clean::clean_article(raw, min_words) else {
        return PageOutcome::Skipped(SkipReason::Markup);
    };
    match prose::refine_article(cleaned) {
        Some(record) => PageOutcome::Accepted(record),
        None => PageOutcome::Skipped(SkipReason::Prose),
    }
}

/// Drives the whole pipeline: dump in, corpus out. A skip never aborts the
/// run; an I/O or stream error does, after the output file has been closed
/// as a valid JSON array of whatever was written.
pub fn run_extraction(
    input: &Path,
    output: &Path,
    options: &ExtractOptions,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<PipelineStats> {
    let reader = DumpReader::open(input)?;
    let mut writer = if options.dry_run {
        None
    } else {
        Some(CorpusWriter::create(output)?)
    };

    let mut stats = PipelineStats::new();
    let mut rates = RateTracker::new();
    let pb = ProgressBar::new_spinner();
    let mut failure: Option<anyhow::Error> = None;

    for page in reader {
        if let Some(flag) = &cancel {
            if flag.load(Ordering::Relaxed) {
                warn!("Interrupt received, stopping early");
                stats.interrupted = true;
                break;
            }
        }
        if let Some(limit) = options.limit {
            if stats.pages_seen >= limit {
                info!(limit, "Page limit reached");
                break;
            }
        }

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        stats.inc_pages();
        let page_id = page.id;

        match process_page(page, options.min_words) {
            PageOutcome::Accepted(record) => {
                if let Some(w) = writer.as_mut() {
                    if let Err(e) = w.write(&record) {
                        failure = Some(e);
                        break;
                    }
                }
                stats.inc_accepted();
                if stats.accepted % config::PROGRESS_INTERVAL == 0 {
                    let (instant, average) = rates.sample(stats.accepted);
                    pb.set_message(format!(
                        "{} articles ({:.0}/s now, {:.0}/s avg)",
                        HumanCount(stats.accepted),
                        instant,
                        average
                    ));
                    pb.tick();
                }
            }
            PageOutcome::Skipped(reason) => {
                debug!(page_id, reason = ?reason, "Page skipped");
                stats.record_skip(reason);
            }
        }
    }

    pb.finish_and_clear();

    if let Some(w) = writer {
        match w.finalize() {
            Ok(records) => debug!(records, "Output finalized"),
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                } else {
                    warn!(error = %e, "Failed to finalize output after stream error");
                }
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => {
            info!(
                pages = stats.pages_seen,
                accepted = stats.accepted,
                skipped = stats.skipped(),
                "Extraction complete"
            );
            Ok(stats)
        }
    }
}
