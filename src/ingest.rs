use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result as Result};
use bstr::ByteSlice;
use log::{info, warn};
use memmap2::MmapOptions;

use crate::registry::{Outcome, Registry};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceSummary {
    pub ingested: u64,
    pub skipped: u64,
}

pub fn ingest_bytes(registry: &mut Registry, data: &[u8]) -> SourceSummary {
    let mut summary = SourceSummary::default();

    for line in data.lines() {
        match registry.ingest(line) {
            Outcome::Ingested => summary.ingested += 1,
            Outcome::Skipped(_) => summary.skipped += 1,
            Outcome::Blank => { }
        }
    }

    summary
}

/// Maps the file read-only and ingests every line of it.
pub fn ingest_file(registry: &mut Registry, path: &Path) -> Result<SourceSummary> {
    let file: File = File::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let size = file.metadata()
        .with_context(|| format!("cannot stat {}", path.display()))?
        .len();
    if size == 0 {
        return Ok(SourceSummary::default());
    }

    let mmap = unsafe { MmapOptions::new().map(&file) }
        .with_context(|| format!("cannot map {}", path.display()))?;
    Ok(ingest_bytes(registry, &mmap))
}

/// Ingests each path in order. Unreadable sources are reported on `out` and skipped.
pub fn ingest_all<P, W>(registry: &mut Registry, paths: &[P], mut out: W) -> Result<Vec<Result<SourceSummary>>>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut summaries = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        writeln!(out, "Opening file: {}", path.display())?;

        let summary = ingest_file(registry, path);
        match &summary {
            Ok(counts) => {
                info!("{}: {} records", path.display(), counts.ingested);
                if counts.skipped > 0 {
                    warn!("{}: skipped {} malformed lines", path.display(), counts.skipped);
                }
            },
            Err(error) => {
                writeln!(out, "File cannot be opened.")?;
                warn!("{error:#}");
            }
        }
        summaries.push(summary);
    }

    Ok(summaries)
}
