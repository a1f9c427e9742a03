//! Per-sentence extraction pipeline
//!
//! Scanner, then Boundary Resolver, Role Classifier and Filter per candidate,
//! then the Assembler over the survivors.

use rc_core::{
    AppConfig, ClassifiedClause, Lexicon, ParsedSentence, RcCandidate, RcError, RejectionReason,
    Result,
};
use tracing::debug;

use crate::assembler::ClauseAssembler;
use crate::boundary::BoundaryResolver;
use crate::filter::{FilterPipeline, RuleContext};
use crate::role::RoleClassifier;
use crate::scanner::RelativizerScanner;
use crate::{ClauseExtractor, SentenceAnalysis};

/// Rule-based relative clause extractor
pub struct RelativeClauseExtractor {
    lexicon: Lexicon,
    filters: FilterPipeline,
    boundary: BoundaryResolver,
    assembler: ClauseAssembler,
}

impl Default for RelativeClauseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RelativeClauseExtractor {
    /// Default lexicon and the standard filter rules
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::default())
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self {
            lexicon,
            filters: FilterPipeline::standard(),
            boundary: BoundaryResolver::new(),
            assembler: ClauseAssembler::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_lexicon(config.lexicon.clone())
            .with_filters(FilterPipeline::from_config(&config.filters))
    }

    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Run every stage over one sentence
    pub fn analyze(&self, sentence: &ParsedSentence) -> SentenceAnalysis {
        let candidates = RelativizerScanner::new(&self.lexicon).scan(sentence);

        let (accepted, rejected): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .map(|candidate| self.classify(sentence, candidate))
            .partition(ClassifiedClause::is_accepted);

        let (accepted, duplicates) = self.assembler.assemble(accepted);

        SentenceAnalysis {
            accepted,
            rejected,
            duplicates,
        }
    }

    fn classify(&self, sentence: &ParsedSentence, candidate: RcCandidate) -> ClassifiedClause {
        let boundary = self.boundary.resolve(sentence, &candidate);
        let assignment = RoleClassifier::new(&self.lexicon).classify(sentence, &candidate);

        let rejection = match boundary.head_noun {
            None => Some(RejectionReason::NoHeadNoun),
            Some(head_noun) => self.filters.apply(&RuleContext {
                sentence,
                lexicon: &self.lexicon,
                relativizer: candidate.relativizer,
                anchor: candidate.anchor,
                head_noun,
                span: boundary.span,
                gap_resolved: assignment.gap_resolved,
            }),
        };

        debug!(
            anchor = candidate.anchor,
            rc_type = %candidate.rc_type,
            span = %boundary.span,
            role = ?assignment.role,
            rejection = ?rejection,
            "classified candidate"
        );

        ClassifiedClause {
            candidate,
            head_noun: boundary.head_noun,
            span: boundary.span,
            role: assignment.role,
            passive: assignment.passive,
            gap_resolved: assignment.gap_resolved,
            fallback_span: boundary.fallback,
            rejection,
            ordinal: None,
        }
    }
}

impl ClauseExtractor for RelativeClauseExtractor {
    fn extract(&self, sentence: &ParsedSentence) -> Result<SentenceAnalysis> {
        if sentence.is_empty() {
            return Err(RcError::InvalidSentence("sentence has no tokens".to_string()));
        }
        let n = sentence.len();
        if let Some(token) = sentence
            .tokens
            .iter()
            .enumerate()
            .find(|(i, t)| t.index != *i || t.head.is_some_and(|h| h >= n))
            .map(|(_, t)| t)
        {
            return Err(RcError::InvalidSentence(format!(
                "token {} ({}) is out of place or has an out-of-range head",
                token.index, token.text
            )));
        }
        Ok(self.analyze(sentence))
    }
}
