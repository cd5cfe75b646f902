use crate::models::CorpusRecord;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Streams accepted records into a JSON array without holding the corpus in
/// memory. The opening bracket goes out on create and the closing bracket on
/// `finalize`, so a zero-record run still produces a parseable file.
pub struct CorpusWriter {
    out: BufWriter<File>,
    records: u64,
}

impl CorpusWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let mut out = BufWriter::with_capacity(128 * 1024, file);
        out.write_all(b"[\n")
            .context("Failed to write array opening")?;
        Ok(Self { out, records: 0 })
    }

    pub fn write(&mut self, record: &CorpusRecord) -> Result<()> {
        if self.records > 0 {
            self.out
                .write_all(b",\n")
                .context("Failed to write record separator")?;
        }
        serde_json::to_writer(&mut self.out, record).context("Failed to serialize record")?;
        self.records += 1;
        Ok(())
    }

    /// Closes the array and flushes. Returns the number of records written.
    pub fn finalize(mut self) -> Result<u64> {
        self.out
            .write_all(b"\n]")
            .context("Failed to write array closing")?;
        self.out.flush().context("Failed to flush output file")?;
        Ok(self.records)
    }
}
