//! RC Extractor - Relative clause extraction pipeline
//!
//! Detects relative clauses in parsed sentences, classifies their type and
//! the role of the relativizer, and filters constructions that only look
//! like relative clauses. Also drives batches of sentences concurrently and
//! exports the accepted clauses.

use rc_core::{ClassifiedClause, ParsedSentence, Result};
use serde::{Deserialize, Serialize};

/// Result of running the engine over one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    /// Accepted clauses in ordinal order
    pub accepted: Vec<ClassifiedClause>,
    /// Candidates vetoed with a reason
    pub rejected: Vec<ClassifiedClause>,
    /// Accepted clauses merged into a more specific one with the same span
    pub duplicates: usize,
}

/// Trait for relative clause extractors
pub trait ClauseExtractor: Send + Sync {
    fn extract(&self, sentence: &ParsedSentence) -> Result<SentenceAnalysis>;
}

pub mod assembler;
pub mod batch;
pub mod boundary;
pub mod export;
pub mod filter;
pub mod grammar;
pub mod metrics;
pub mod pipeline;
pub mod role;
pub mod scanner;

pub use batch::{BatchRunner, SentenceInput, SentenceOutcome};
pub use metrics::RunStats;
pub use pipeline::RelativeClauseExtractor;
