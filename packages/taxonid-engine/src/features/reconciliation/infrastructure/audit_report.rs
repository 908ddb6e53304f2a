//! File reports of a reconciliation run
//!
//! Layout under the per-release report directory:
//! - `created.tsv`, `deleted.tsv`, `resurrected.tsv`: one row per id
//! - `unstable.txt`: names that lost an id, with the ids they gained
//! - `nomatch.txt`: usages left without a names match
//! - `summary.json`: the serialised result

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::features::matching::domain::Candidate;
use crate::features::reconciliation::domain::{AuditEntry, AuditLog, ReconciliationResult};
use crate::shared::utils::id_converter;

pub const CREATED_FILE: &str = "created.tsv";
pub const DELETED_FILE: &str = "deleted.tsv";
pub const RESURRECTED_FILE: &str = "resurrected.tsv";
pub const UNSTABLE_FILE: &str = "unstable.txt";
pub const NOMATCH_FILE: &str = "nomatch.txt";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Copy)]
struct UnstableName<'a> {
    deletion: bool,
    entry: &'a AuditEntry,
}

/// Writes the report files of one release into a directory
#[derive(Debug, Clone)]
pub struct AuditReporter {
    dir: PathBuf,
}

impl AuditReporter {
    /// Creates the directory if needed
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open the no-match log, truncating an earlier one
    pub fn no_match_log(&self) -> io::Result<NoMatchLog> {
        let file = File::create(self.dir.join(NOMATCH_FILE))?;
        Ok(NoMatchLog {
            writer: BufWriter::new(file),
        })
    }

    pub fn write_all(&self, audit: &AuditLog, result: &ReconciliationResult) -> io::Result<()> {
        self.write_tsv(DELETED_FILE, &audit.deleted)?;
        self.write_tsv(RESURRECTED_FILE, &audit.resurrected)?;
        self.write_tsv(CREATED_FILE, &audit.created)?;
        self.write_unstable(audit)?;
        self.write_summary(result)
    }

    fn write_tsv(&self, filename: &str, entries: &BTreeMap<u64, AuditEntry>) -> io::Result<()> {
        let path = self.dir.join(filename);
        info!(ids = entries.len(), path = %path.display(), "Writing id report");
        let mut w = BufWriter::new(File::create(&path)?);
        for entry in entries.values() {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                id_converter::encode(entry.id),
                entry.rank,
                entry.status,
                tsv_field(&entry.scientific_name),
                entry.authorship.as_deref().map(tsv_field).unwrap_or_default()
            )?;
        }
        w.flush()
    }

    fn write_unstable(&self, audit: &AuditLog) -> io::Result<()> {
        let names = unstable_names(audit);
        let mut w = BufWriter::new(File::create(self.dir.join(UNSTABLE_FILE))?);
        for (name, entries) in &names {
            writeln!(w, "{}", name)?;
            for n in entries {
                write_unstable_name(&mut w, n)?;
            }
        }
        w.flush()
    }

    fn write_summary(&self, result: &ReconciliationResult) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(self.dir.join(SUMMARY_FILE))?);
        serde_json::to_writer_pretty(&mut w, result).map_err(io::Error::from)?;
        w.flush()
    }
}

/// Group changed names by scientific name
///
/// A name enters through a deletion; creations and resurrections are only
/// added to names already present. Names with deletions only are dropped.
fn unstable_names(audit: &AuditLog) -> BTreeMap<&str, Vec<UnstableName<'_>>> {
    let mut names: BTreeMap<&str, Vec<UnstableName<'_>>> = BTreeMap::new();
    for entry in audit.deleted.values() {
        names
            .entry(entry.scientific_name.as_str())
            .or_default()
            .push(UnstableName {
                deletion: true,
                entry,
            });
    }
    for entry in audit.resurrected.values().chain(audit.created.values()) {
        if let Some(list) = names.get_mut(entry.scientific_name.as_str()) {
            list.push(UnstableName {
                deletion: false,
                entry,
            });
        }
    }
    names.retain(|_, list| !list.iter().all(|n| n.deletion));
    names
}

fn write_unstable_name(w: &mut impl Write, n: &UnstableName<'_>) -> io::Result<()> {
    let e = n.entry;
    write!(
        w,
        " {} {} [{} {} {}:{} nidx=",
        if n.deletion { '-' } else { '+' },
        e.label(),
        e.status,
        e.rank,
        e.dataset_key,
        id_converter::encode(e.id)
    )?;
    match e.name_index_id {
        Some(nidx) => {
            let canonical = e.canonical_name_index_id.unwrap_or(nidx);
            write!(w, "{}/{} {}", nidx, canonical, e.match_type)?;
        }
        None => write!(w, "null")?,
    }
    if e.status.is_synonym() {
        if let Some(parent) = &e.parent_label {
            write!(w, " parent={}", parent)?;
        }
    }
    writeln!(w, "]")
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Line log of usages that keep their project id
pub struct NoMatchLog {
    writer: BufWriter<File>,
}

impl NoMatchLog {
    pub fn write(&mut self, c: &Candidate) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}",
            c.usage_id,
            c.status,
            c.rank,
            c.label()
        )
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
