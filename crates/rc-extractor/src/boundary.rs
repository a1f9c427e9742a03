//! Clause Boundary Resolver
//!
//! Picks the clause span from the constituency tree when one is available and
//! falls back to the dependency subtree of the anchor otherwise.

use rc_core::{ConstituentNode, ParsedSentence, RcCandidate, Span};

/// Phrase labels that can delimit a relative clause
const CLAUSE_LABELS: [&str; 6] = ["S", "SBAR", "SBARQ", "SINV", "SQ", "RRC"];

/// Resolved span and head noun of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub span: Span,
    pub head_noun: Option<usize>,
    /// Span came from the dependency subtree
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryResolver;

impl BoundaryResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, sentence: &ParsedSentence, candidate: &RcCandidate) -> Boundary {
        let attachment = sentence.token(candidate.anchor).and_then(|t| t.head);
        let head_noun = attachment.filter(|&h| {
            sentence.token(h).is_some_and(|t| t.is_nominal())
        });

        let from_tree = sentence
            .tree
            .as_ref()
            .and_then(|tree| smallest_clause_node(tree, candidate, attachment));

        let (raw, fallback) = match from_tree {
            Some(span) => (span, false),
            None => (dependency_span(sentence, candidate, attachment), true),
        };

        let span = trim_punctuation(sentence, raw).unwrap_or(Span::single(candidate.anchor));

        Boundary {
            span,
            head_noun: head_noun.filter(|&h| h < span.start),
            fallback,
        }
    }
}

/// Smallest clause-level node covering anchor and relativizer that starts
/// after the attachment noun
fn smallest_clause_node(
    tree: &ConstituentNode,
    candidate: &RcCandidate,
    attachment: Option<usize>,
) -> Option<Span> {
    let mut best: Option<Span> = None;

    tree.visit(&mut |node, parent| {
        if node.is_leaf() {
            return;
        }
        let label = node.base_label();
        let reduced_vp = label == "VP" && parent.is_some_and(|p| p.base_label() == "NP");
        if !CLAUSE_LABELS.contains(&label) && !reduced_vp {
            return;
        }

        let span = node.span();
        if !span.contains(candidate.anchor) {
            return;
        }
        if candidate.relativizer.is_some_and(|r| !span.contains(r)) {
            return;
        }
        if attachment.is_some_and(|h| span.start <= h) {
            return;
        }
        if !best.is_some_and(|b| b.len() <= span.len()) {
            best = Some(span);
        }
    });

    best
}

/// Dependency subtree of the anchor, kept to the right of the attachment
/// noun and widened to include the relativizer
fn dependency_span(
    sentence: &ParsedSentence,
    candidate: &RcCandidate,
    attachment: Option<usize>,
) -> Span {
    let mut span = candidate.raw_span;
    if let Some(r) = candidate.relativizer {
        span = span.union(&Span::single(r));
    }
    if let Some(h) = attachment {
        if span.start <= h {
            span = Span::new((h + 1).min(candidate.anchor), span.end);
        }
    }
    let last = sentence.len().saturating_sub(1);
    Span::new(span.start.min(last), span.end.min(last))
}

/// Strip leading and trailing punctuation; `None` when nothing remains
fn trim_punctuation(sentence: &ParsedSentence, span: Span) -> Option<Span> {
    let is_word = |i: usize| sentence.token(i).is_some_and(|t| !t.is_punct());
    let start = span.indices().find(|&i| is_word(i))?;
    let end = span.indices().rev().find(|&i| is_word(i))?;
    Some(Span::new(start, end))
}
