//! RC Core - Domain model, lexicon and shared types
//!
//! This crate defines the abstractions shared by the relative clause engine:
//! - Syntactic representation (tokens, dependency relations, constituency trees)
//! - Candidate and classified clause records
//! - Common error types and skip reasons
//! - The configurable lexicon
//! - Configuration management

pub mod config;
pub mod lexicon;
pub mod syntax;

pub use config::{
    AlignmentPolicy, AppConfig, BatchConfig, ConfigError, FilterConfig, LoggingConfig,
    OutputConfig, OutputFormat,
};
pub use lexicon::Lexicon;
pub use syntax::{ConstituentNode, DepRel, ParsedSentence, Span, Token};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for relative clause extraction
#[derive(Error, Debug)]
pub enum RcError {
    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Parser unavailable: {0}")]
    ParserUnavailable(String),

    #[error("Invalid sentence: {0}")]
    InvalidSentence(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RcError>;

impl From<ConfigError> for RcError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

/// Why a whole sentence was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Alignment,
    MalformedDependency,
    MalformedTree,
    ParserUnavailable,
    Internal,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alignment => "alignment",
            Self::MalformedDependency => "malformed_dependency",
            Self::MalformedTree => "malformed_tree",
            Self::ParserUnavailable => "parser_unavailable",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Clause Classification
// ============================================================================

/// Surface type of a relative clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RcType {
    Full,
    Reduced,
    Zero,
}

impl RcType {
    /// Specificity rank used for deduplication, lower wins
    pub fn rank(&self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Reduced => 1,
            Self::Zero => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
            Self::Zero => "zero",
        }
    }
}

impl std::fmt::Display for RcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammatical role of the relativizer inside its clause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Subject,
    Object,
    Other,
    #[default]
    None,
}

impl Role {
    /// Label used in exported records (`SRC`, `ORC`, `Other`)
    pub fn report_label(&self) -> &'static str {
        match self {
            Self::Subject => "SRC",
            Self::Object => "ORC",
            Self::Other => "Other",
            Self::None => "",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.report_label())
    }
}

/// Reason a candidate was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NoHeadNoun,
    MannerAdjunct,
    ComplementClause,
    PpFrontedNoExtraction,
    EllipticalFragment,
    TemporaryAmbiguity,
    LowConfidence,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHeadNoun => "no_head_noun",
            Self::MannerAdjunct => "manner_adjunct",
            Self::ComplementClause => "complement_clause",
            Self::PpFrontedNoExtraction => "pp_fronted_no_extraction",
            Self::EllipticalFragment => "elliptical_fragment",
            Self::TemporaryAmbiguity => "temporary_ambiguity",
            Self::LowConfidence => "low_confidence",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A possible relative clause found by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcCandidate {
    pub rc_type: RcType,
    /// Relativizer token, present only for full clauses
    pub relativizer: Option<usize>,
    /// Predicate whose edge attaches the clause to a noun
    pub anchor: usize,
    /// Dependency subtree of the anchor, before trimming
    pub raw_span: Span,
}

impl RcCandidate {
    pub fn full(relativizer: usize, anchor: usize, raw_span: Span) -> Self {
        Self {
            rc_type: RcType::Full,
            relativizer: Some(relativizer),
            anchor,
            raw_span,
        }
    }

    pub fn relativizer_less(rc_type: RcType, anchor: usize, raw_span: Span) -> Self {
        Self {
            rc_type,
            relativizer: None,
            anchor,
            raw_span,
        }
    }
}

/// A candidate after boundary resolution, role classification and filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedClause {
    pub candidate: RcCandidate,
    /// Modified noun; `None` only when rejected with `no_head_noun`
    pub head_noun: Option<usize>,
    /// Final trimmed clause span
    pub span: Span,
    pub role: Role,
    pub passive: bool,
    /// Role rests on a core-argument gap rather than a default
    pub gap_resolved: bool,
    /// Span came from the dependency subtree instead of the constituency tree
    pub fallback_span: bool,
    pub rejection: Option<RejectionReason>,
    /// 1-based position among accepted clauses of the sentence
    pub ordinal: Option<usize>,
}

impl ClassifiedClause {
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }

    pub fn rc_type(&self) -> RcType {
        self.candidate.rc_type
    }

    pub fn relativizer(&self) -> Option<usize> {
        self.candidate.relativizer
    }

    pub fn anchor(&self) -> usize {
        self.candidate.anchor
    }
}

// ============================================================================
// Output Record
// ============================================================================

/// Whether a clause restricts its head noun or only comments on it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Restrictiveness {
    #[default]
    Restrictive,
    /// Set off by a comma, as in "my brother, who lives in Ohio"
    Nonrestrictive,
}

impl Restrictiveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restrictive => "restrictive",
            Self::Nonrestrictive => "nonrestrictive",
        }
    }
}

/// One exported row per accepted clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseRecord {
    pub source: String,
    pub sentence: String,
    pub sentence_position: usize,
    pub clause_position: usize,
    pub rc_type: RcType,
    pub relativizer: String,
    pub head_noun: String,
    pub rc_content: String,
    pub role: String,
    pub passive: bool,
    pub restrictiveness: Restrictiveness,
    /// Linear shape of the clause, e.g. `NP + Comp + NP2 + Verb`
    pub structure_pattern: String,
    pub clause_verb: String,
    pub head_relation: String,
    pub relativizer_relation: String,
    pub filler_gap: usize,
    pub rc_length: usize,
    pub sentence_word_count: usize,
    pub sentence_verb_count: usize,
}

impl ClauseRecord {
    pub fn new(
        source: impl Into<String>,
        sentence_position: usize,
        sentence: &ParsedSentence,
        clause: &ClassifiedClause,
    ) -> Self {
        let text_at = |index: Option<usize>| {
            index
                .and_then(|i| sentence.token(i))
                .map(|t| t.text.clone())
                .unwrap_or_default()
        };
        let relativizer = clause.relativizer();
        let anchor = clause.anchor();

        let relativizer_relation = relativizer
            .and_then(|i| sentence.token(i))
            .map(|t| t.label.clone())
            .unwrap_or_else(|| "zero".to_string());
        let head_relation = clause
            .head_noun
            .and_then(|i| sentence.token(i))
            .map(|t| t.label.clone())
            .unwrap_or_default();

        // Tokens strictly between the filler and the clause verb
        let filler = relativizer.or(clause.head_noun).unwrap_or(anchor);
        let filler_gap = anchor.abs_diff(filler).saturating_sub(1);

        Self {
            source: source.into(),
            sentence: sentence.text.clone(),
            sentence_position,
            clause_position: clause.ordinal.unwrap_or_default(),
            rc_type: clause.rc_type(),
            relativizer: text_at(relativizer),
            head_noun: text_at(clause.head_noun),
            rc_content: sentence.text_of(clause.span),
            role: clause.role.report_label().to_string(),
            passive: clause.passive,
            restrictiveness: restrictiveness(sentence, clause),
            structure_pattern: structure_pattern(sentence, clause).to_string(),
            clause_verb: text_at(Some(anchor)),
            head_relation,
            relativizer_relation,
            filler_gap,
            rc_length: clause.span.len(),
            sentence_word_count: sentence.word_count(),
            sentence_verb_count: sentence.verb_count(),
        }
    }
}

/// A comma right before the clause marks it nonrestrictive, except for
/// `that` clauses which are always restrictive
fn restrictiveness(sentence: &ParsedSentence, clause: &ClassifiedClause) -> Restrictiveness {
    let is_that = clause
        .relativizer()
        .and_then(|r| sentence.token(r))
        .is_some_and(|t| t.lower() == "that");
    let comma_before = clause
        .span
        .start
        .checked_sub(1)
        .filter(|&i| clause.head_noun.is_some_and(|h| h < i))
        .and_then(|i| sentence.token(i))
        .is_some_and(|t| t.text == ",");

    if comma_before && !is_that {
        Restrictiveness::Nonrestrictive
    } else {
        Restrictiveness::Restrictive
    }
}

fn structure_pattern(sentence: &ParsedSentence, clause: &ClassifiedClause) -> &'static str {
    let Some(relativizer) = clause.relativizer() else {
        return "zero relative";
    };
    let fronted_prep = relativizer
        .checked_sub(1)
        .filter(|&p| p == clause.span.start)
        .and_then(|p| sentence.token(p))
        .is_some_and(|t| t.is_preposition());
    if fronted_prep {
        return "NP + Prep + Comp + Verb";
    }

    match (clause.role, clause.passive) {
        (Role::Subject, true) => "NP + Comp + Verb + NP2 (passive)",
        (Role::Subject, false) => "NP + Comp + Verb + NP2",
        (Role::Object, _) => "NP + Comp + NP2 + Verb",
        (Role::Other | Role::None, _) => "NP + Comp + NP2",
    }
}
