//! Run metrics
//!
//! Counts what happened to every sentence and clause in a run, including the
//! distribution of clause types, roles and relativizers.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::batch::SentenceOutcome;

/// Aggregated statistics of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Sentences handed to the runner
    pub sentences_seen: usize,
    /// Sentences the engine analyzed
    pub sentences_processed: usize,
    /// Processed without a usable constituency tree
    pub sentences_degraded: usize,
    /// Skipped sentences by reason
    pub sentences_skipped: BTreeMap<String, usize>,
    pub clauses_accepted: usize,
    /// Rejected candidates by reason
    pub clauses_rejected: BTreeMap<String, usize>,
    /// Accepted clauses merged into another with the same span
    pub duplicates_merged: usize,
    pub rc_types: BTreeMap<String, usize>,
    pub roles: BTreeMap<String, usize>,
    pub relativizers: BTreeMap<String, usize>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a SentenceOutcome>) -> Self {
        let mut stats = Self::new();
        for outcome in outcomes {
            stats.record(outcome);
        }
        stats
    }

    /// Add one sentence outcome
    pub fn record(&mut self, outcome: &SentenceOutcome) {
        self.sentences_seen += 1;

        let (sentence, analysis, degraded) = match outcome {
            SentenceOutcome::Skipped { reason, .. } => {
                *self
                    .sentences_skipped
                    .entry(reason.as_str().to_string())
                    .or_default() += 1;
                return;
            }
            SentenceOutcome::Processed {
                sentence,
                analysis,
                degraded,
                ..
            } => (sentence, analysis, degraded),
        };

        self.sentences_processed += 1;
        if degraded.is_some() {
            self.sentences_degraded += 1;
        }
        self.duplicates_merged += analysis.duplicates;

        for clause in &analysis.rejected {
            if let Some(reason) = clause.rejection {
                *self
                    .clauses_rejected
                    .entry(reason.as_str().to_string())
                    .or_default() += 1;
            }
        }

        for clause in &analysis.accepted {
            self.clauses_accepted += 1;
            *self
                .rc_types
                .entry(clause.rc_type().as_str().to_string())
                .or_default() += 1;
            *self
                .roles
                .entry(clause.role.report_label().to_string())
                .or_default() += 1;

            let relativizer = clause
                .relativizer()
                .and_then(|i| sentence.token(i))
                .map(|t| t.lower())
                .unwrap_or_else(|| "zero".to_string());
            *self.relativizers.entry(relativizer).or_default() += 1;
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.sentences_skipped.values().sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.clauses_rejected.values().sum()
    }

    /// Plain-text summary
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Sentences seen:      {}", self.sentences_seen);
        let _ = writeln!(out, "Sentences processed: {}", self.sentences_processed);
        if self.sentences_degraded > 0 {
            let _ = writeln!(out, "  without tree:      {}", self.sentences_degraded);
        }
        let _ = writeln!(out, "Sentences skipped:   {}", self.total_skipped());
        write_counts(&mut out, &self.sentences_skipped);
        let _ = writeln!(out, "Clauses accepted:    {}", self.clauses_accepted);
        let _ = writeln!(out, "Clauses rejected:    {}", self.total_rejected());
        write_counts(&mut out, &self.clauses_rejected);
        if self.duplicates_merged > 0 {
            let _ = writeln!(out, "Duplicates merged:   {}", self.duplicates_merged);
        }

        for (title, counts) in [
            ("RC types", &self.rc_types),
            ("Roles", &self.roles),
            ("Relativizers", &self.relativizers),
        ] {
            if !counts.is_empty() {
                let _ = writeln!(out, "{title}:");
                write_counts(&mut out, counts);
            }
        }
        out
    }
}

fn write_counts(out: &mut String, counts: &BTreeMap<String, usize>) {
    for (key, count) in counts {
        let _ = writeln!(out, "  {key:<24} {count}");
    }
}
