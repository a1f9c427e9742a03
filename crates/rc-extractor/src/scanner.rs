//! Relativizer Scanner
//!
//! Finds candidate relative clauses in a sentence. Full clauses are found
//! from their relativizer; reduced and zero clauses from adnominal clause
//! predicates that no relativizer claimed. `that` clauses attached to a noun
//! as complements are emitted as well so the filter can account for them.

use std::collections::BTreeSet;

use rc_core::{DepRel, Lexicon, ParsedSentence, RcCandidate, RcType};
use tracing::debug;

use crate::grammar;

/// Walks a sentence and emits [`RcCandidate`]s in sentence order
pub struct RelativizerScanner<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> RelativizerScanner<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn scan(&self, sentence: &ParsedSentence) -> Vec<RcCandidate> {
        let mut candidates = self.full_candidates(sentence);
        let claimed: BTreeSet<usize> = candidates.iter().map(|c| c.anchor).collect();
        candidates.extend(self.noun_complement_candidates(sentence, &claimed));
        candidates.extend(self.relativizer_less_candidates(sentence, &claimed));

        candidates.sort_by_key(|c| {
            (
                c.raw_span.start,
                c.anchor,
                c.relativizer.unwrap_or(usize::MAX),
            )
        });
        candidates
    }

    fn full_candidates(&self, sentence: &ParsedSentence) -> Vec<RcCandidate> {
        let mut by_anchor: Vec<RcCandidate> = Vec::new();

        for token in &sentence.tokens {
            if !self.lexicon.is_relativizer(&token.text) {
                continue;
            }
            // Demonstrative `that`
            if token.lower() == "that" && token.relation == DepRel::Det {
                continue;
            }
            let Some(anchor) = grammar::adnominal_predicate(sentence, token.index) else {
                continue;
            };
            let Some(head) = sentence.token(anchor).and_then(|t| t.head) else {
                continue;
            };
            if !(head < token.index && token.index < anchor) {
                continue;
            }
            // One relativizer per clause, the leftmost
            if by_anchor.iter().any(|c| c.anchor == anchor) {
                continue;
            }

            debug!(relativizer = %token.text, anchor, "full candidate");
            by_anchor.push(RcCandidate::full(
                token.index,
                anchor,
                sentence.subtree_span(anchor),
            ));
        }

        by_anchor
    }

    /// `that` clauses attached to a noun as complements. They rarely are
    /// relative clauses, but the filter decides and counts them.
    fn noun_complement_candidates(
        &self,
        sentence: &ParsedSentence,
        claimed: &BTreeSet<usize>,
    ) -> Vec<RcCandidate> {
        let mut candidates = Vec::new();

        for token in &sentence.tokens {
            if token.relation != DepRel::CComp || claimed.contains(&token.index) {
                continue;
            }
            let Some(head) = token.head.filter(|&h| h < token.index) else {
                continue;
            };
            if !sentence.token(head).is_some_and(|t| t.is_nominal()) {
                continue;
            }
            let marker = sentence.children(token.index).find(|c| {
                head < c.index
                    && c.index < token.index
                    && c.lower() == "that"
                    && c.relation != DepRel::Det
            });
            let Some(marker) = marker else { continue };

            debug!(verb = %token.text, "noun complement candidate");
            candidates.push(RcCandidate::full(
                marker.index,
                token.index,
                sentence.subtree_span(token.index),
            ));
        }

        candidates
    }

    fn relativizer_less_candidates(
        &self,
        sentence: &ParsedSentence,
        claimed: &BTreeSet<usize>,
    ) -> Vec<RcCandidate> {
        let mut candidates = Vec::new();

        for token in &sentence.tokens {
            if !token.relation.is_adnominal_clause() || claimed.contains(&token.index) {
                continue;
            }
            let Some(head) = token.head else { continue };
            if head >= token.index {
                continue;
            }
            let has_copula = sentence.children(token.index).any(|c| c.relation == DepRel::Cop);
            if !token.is_verb() && !has_copula {
                continue;
            }

            let rc_type = if !grammar::is_finite(sentence, token.index) {
                RcType::Reduced
            } else {
                // A subject of its own between noun and verb means the
                // relativizer was deleted from a non-subject position
                let own_subject = grammar::overt_subject(sentence, token.index)
                    .is_some_and(|s| head < s && s < token.index);
                if own_subject {
                    RcType::Reduced
                } else {
                    RcType::Zero
                }
            };

            debug!(verb = %token.text, rc_type = %rc_type, "relativizer-less candidate");
            candidates.push(RcCandidate::relativizer_less(
                rc_type,
                token.index,
                sentence.subtree_span(token.index),
            ));
        }

        candidates
    }
}
