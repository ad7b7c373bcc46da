use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::util::{OutputIntegration, utc_iso, write_json_pretty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Ok,
    /// At least one unit of work failed; the rest completed.
    Partial,
    /// The whole command had nothing to act on (missing input).
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunSummary {
    pub command: String,
    pub status: RunStatus,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_ms: Option<i64>,
    pub counters: BTreeMap<String, u64>,
    pub failures: Vec<FailureRecord>,
    pub notes: Vec<String>,
    #[serde(skip)]
    started: Option<DateTime<Utc>>,
}

impl RunSummary {
    #[must_use]
    pub fn new(command: &str) -> Self {
        let started = Utc::now();
        Self {
            command: command.to_string(),
            started_at: utc_iso(started),
            started: Some(started),
            ..Self::default()
        }
    }

    pub fn count(&mut self, name: &str, amount: u64) {
        *self.counters.entry(name.to_string()).or_insert(0) += amount;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn fail(&mut self, path: impl Into<String>, error: impl ToString) {
        self.failures.push(FailureRecord {
            path: path.into(),
            error: error.to_string(),
        });
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn mark_skipped(&mut self) {
        self.status = RunStatus::Skipped;
    }

    /// Stamp the finish time. A run with failures is downgraded to `partial`.
    pub fn finish(&mut self) {
        let finished = Utc::now();
        self.finished_at = Some(utc_iso(finished));
        self.duration_ms = self
            .started
            .map(|started| (finished - started).num_milliseconds());
        if !self.failures.is_empty() && self.status == RunStatus::Ok {
            self.status = RunStatus::Partial;
        }
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, self)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str::<Self>(&content)?)
    }

    /// Finish the run, write the optional summary file, and print a JSON
    /// line when the environment asked for machine output.
    pub fn emit(mut self, path: Option<&Path>, integration: &OutputIntegration) -> Result<Self> {
        self.finish();
        if let Some(path) = path {
            self.write_to_path(path)?;
        }
        if integration.should_emit_json() {
            println!("{}", serde_json::to_string(&self)?);
        }
        Ok(self)
    }
}
