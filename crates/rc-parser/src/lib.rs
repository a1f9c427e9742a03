//! RC Parser - Tree adapter for external parser output
//!
//! Normalizes the two parse representations produced upstream into the
//! shared [`ParsedSentence`] form:
//! - Dependency arcs (JSON arc list or CoNLL-X / CoNLL-U text)
//! - Penn Treebank bracketed constituency trees
//!
//! The two parses must describe the same tokenization. Disagreement is
//! reported as [`ParserError::Alignment`] and handled according to the
//! configured [`AlignmentPolicy`].

pub mod align;
pub mod bracket;
pub mod conll;

pub use align::{check_alignment, unescape_ptb};
pub use bracket::parse_bracketed;
pub use conll::parse_conll;

use rc_core::{AlignmentPolicy, ParsedSentence, RcError, SkipReason, Token};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while adapting parser output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// The two parses disagree on tokenization
    #[error(
        "Token alignment failed: {dependency_tokens} dependency tokens vs \
         {constituency_tokens} constituency leaves (first mismatch at {mismatch:?})"
    )]
    Alignment {
        dependency_tokens: usize,
        constituency_tokens: usize,
        mismatch: Option<usize>,
    },

    /// Heads out of range, no root, or a cycle
    #[error("Malformed dependency parse: {0}")]
    MalformedDependency(String),

    /// Unbalanced or empty brackets
    #[error("Malformed constituency tree: {0}")]
    MalformedTree(String),

    /// Upstream parse missing
    #[error("Parser output unavailable: {0}")]
    ParserUnavailable(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl ParserError {
    /// Skip reason recorded when this error drops a sentence
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Self::Alignment { .. } => SkipReason::Alignment,
            Self::MalformedDependency(_) => SkipReason::MalformedDependency,
            Self::MalformedTree(_) => SkipReason::MalformedTree,
            Self::ParserUnavailable(_) => SkipReason::ParserUnavailable,
        }
    }
}

impl From<ParserError> for RcError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::Alignment { .. } => RcError::Alignment(err.to_string()),
            ParserError::ParserUnavailable(msg) => RcError::ParserUnavailable(msg),
            other => RcError::InvalidSentence(other.to_string()),
        }
    }
}

// ============================================================================
// Raw Parser Output
// ============================================================================

/// One dependency arc, heads 1-based with `0` for the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArc {
    pub form: String,
    pub pos: String,
    pub head: usize,
    pub deprel: String,
}

impl RawArc {
    pub fn new(
        form: impl Into<String>,
        pos: impl Into<String>,
        head: usize,
        deprel: impl Into<String>,
    ) -> Self {
        Self {
            form: form.into(),
            pos: pos.into(),
            head,
            deprel: deprel.into(),
        }
    }
}

/// Dependency parse in one of the accepted encodings
#[derive(Debug, Clone, Copy)]
pub enum DependencyInput<'a> {
    Arcs(&'a [RawArc]),
    Conll(&'a str),
}

// ============================================================================
// Tree Adapter
// ============================================================================

/// Result of adapting one sentence
#[derive(Debug, Clone)]
pub struct AdaptedSentence {
    pub sentence: ParsedSentence,
    /// Set when the constituency tree was dropped under the
    /// dependency-only policy
    pub degraded: Option<ParserError>,
}

/// Builds [`ParsedSentence`] values from raw parser output
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeAdapter {
    policy: AlignmentPolicy,
}

impl TreeAdapter {
    pub fn new(policy: AlignmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    /// Adapt one sentence.
    ///
    /// A missing dependency parse always fails. A missing constituency parse
    /// yields a dependency-only sentence. A malformed or misaligned tree fails
    /// under [`AlignmentPolicy::Strict`] and is dropped otherwise.
    pub fn adapt(
        &self,
        text: &str,
        dependency: Option<DependencyInput<'_>>,
        constituency: Option<&str>,
    ) -> Result<AdaptedSentence> {
        let arcs = match dependency {
            None => {
                return Err(ParserError::ParserUnavailable(
                    "no dependency parse".to_string(),
                ))
            }
            Some(DependencyInput::Arcs(arcs)) => arcs.to_vec(),
            Some(DependencyInput::Conll(conll)) => parse_conll(conll)?,
        };
        if arcs.is_empty() {
            return Err(ParserError::ParserUnavailable(
                "empty dependency parse".to_string(),
            ));
        }

        let tokens = build_tokens(&arcs)?;
        let text = if text.trim().is_empty() {
            arcs.iter()
                .map(|a| a.form.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text.to_string()
        };

        let Some(bracketed) = constituency.filter(|c| !c.trim().is_empty()) else {
            return Ok(AdaptedSentence {
                sentence: ParsedSentence::new(text, tokens, None),
                degraded: None,
            });
        };

        let tree = parse_bracketed(bracketed)
            .and_then(|(tree, leaves)| check_alignment(&tokens, &leaves).map(|_| tree));

        match (tree, self.policy) {
            (Ok(tree), _) => Ok(AdaptedSentence {
                sentence: ParsedSentence::new(text, tokens, Some(tree)),
                degraded: None,
            }),
            (Err(err), AlignmentPolicy::DependencyOnly) => Ok(AdaptedSentence {
                sentence: ParsedSentence::new(text, tokens, None),
                degraded: Some(err),
            }),
            (Err(err), AlignmentPolicy::Strict) => Err(err),
        }
    }
}

/// Convert 1-based arcs into tokens, validating the head structure
fn build_tokens(arcs: &[RawArc]) -> Result<Vec<Token>> {
    let n = arcs.len();

    for (i, arc) in arcs.iter().enumerate() {
        if arc.head > n {
            return Err(ParserError::MalformedDependency(format!(
                "token {} ({}) has head {} beyond sentence length {}",
                i + 1,
                arc.form,
                arc.head,
                n
            )));
        }
        if arc.head == i + 1 {
            return Err(ParserError::MalformedDependency(format!(
                "token {} ({}) is its own head",
                i + 1,
                arc.form
            )));
        }
    }

    if !arcs.iter().any(|a| a.head == 0) {
        return Err(ParserError::MalformedDependency(
            "no root token".to_string(),
        ));
    }

    // Every head chain must reach the root within n steps
    for start in 0..n {
        let mut current = arcs[start].head;
        let mut steps = 0;
        while current != 0 {
            steps += 1;
            if steps > n {
                return Err(ParserError::MalformedDependency(format!(
                    "cycle through token {}",
                    start + 1
                )));
            }
            current = arcs[current - 1].head;
        }
    }

    Ok(arcs
        .iter()
        .enumerate()
        .map(|(i, arc)| Token::new(i, &arc.form, &arc.pos, &arc.deprel, arc.head.checked_sub(1)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::Span;

    fn arcs() -> Vec<RawArc> {
        vec![
            RawArc::new("The", "DT", 2, "det"),
            RawArc::new("book", "NN", 3, "nsubj"),
            RawArc::new("was", "VBD", 0, "root"),
            RawArc::new("good", "JJ", 3, "acomp"),
        ]
    }

    const TREE: &str = "(TOP (S (NP (DT The) (NN book)) (VP (VBD was) (ADJP (JJ good)))))";

    #[test]
    fn test_adapt_with_tree() {
        let adapter = TreeAdapter::default();
        let arcs = arcs();
        let adapted = adapter
            .adapt("The book was good", Some(DependencyInput::Arcs(&arcs)), Some(TREE))
            .unwrap();
        let sentence = adapted.sentence;
        assert!(adapted.degraded.is_none());
        assert_eq!(sentence.len(), 4);
        assert_eq!(sentence.tokens[0].head, Some(1));
        assert_eq!(sentence.tokens[2].head, None);
        assert_eq!(sentence.tree.as_ref().map(|t| t.span()), Some(Span::new(0, 3)));
    }

    #[test]
    fn test_missing_dependency_is_unavailable() {
        let err = TreeAdapter::default()
            .adapt("text", None, Some(TREE))
            .unwrap_err();
        assert_eq!(err.skip_reason(), SkipReason::ParserUnavailable);
    }

    #[test]
    fn test_missing_tree_is_dependency_only() {
        let arcs = arcs();
        let adapted = TreeAdapter::default()
            .adapt("", Some(DependencyInput::Arcs(&arcs)), None)
            .unwrap();
        assert!(adapted.sentence.is_dependency_only());
        assert_eq!(adapted.sentence.text, "The book was good");
    }

    #[test]
    fn test_alignment_policy() {
        let arcs = arcs();
        let short = "(TOP (S (NP (DT The) (NN book)) (VP (VBD was))))";

        let err = TreeAdapter::new(AlignmentPolicy::Strict)
            .adapt("x", Some(DependencyInput::Arcs(&arcs)), Some(short))
            .unwrap_err();
        assert!(matches!(
            err,
            ParserError::Alignment {
                dependency_tokens: 4,
                constituency_tokens: 3,
                ..
            }
        ));

        let adapted = TreeAdapter::new(AlignmentPolicy::DependencyOnly)
            .adapt("x", Some(DependencyInput::Arcs(&arcs)), Some(short))
            .unwrap();
        assert!(adapted.sentence.is_dependency_only());
        assert_eq!(
            adapted.degraded.map(|e| e.skip_reason()),
            Some(SkipReason::Alignment)
        );
    }

    #[test]
    fn test_malformed_tree_under_strict() {
        let arcs = arcs();
        let err = TreeAdapter::default()
            .adapt("x", Some(DependencyInput::Arcs(&arcs)), Some("(S (NP"))
            .unwrap_err();
        assert_eq!(err.skip_reason(), SkipReason::MalformedTree);
    }

    #[test]
    fn test_dependency_validation() {
        let mut bad = arcs();
        bad[0].head = 9;
        assert!(matches!(
            build_tokens(&bad),
            Err(ParserError::MalformedDependency(_))
        ));

        let no_root: Vec<RawArc> = arcs()
            .into_iter()
            .map(|mut a| {
                if a.head == 0 {
                    a.head = 1;
                }
                a
            })
            .collect();
        assert!(build_tokens(&no_root).is_err());

        let cycle = vec![
            RawArc::new("a", "DT", 2, "dep"),
            RawArc::new("b", "NN", 1, "dep"),
            RawArc::new("c", "VB", 0, "root"),
        ];
        assert!(build_tokens(&cycle).is_err());
    }

    #[test]
    fn test_raw_arc_json() {
        let arc: RawArc =
            serde_json::from_str(r#"{"form":"who","pos":"WP","head":3,"deprel":"nsubj"}"#)
                .unwrap();
        assert_eq!(arc, RawArc::new("who", "WP", 3, "nsubj"));
    }

    #[test]
    fn test_error_into_rc_error() {
        let err: RcError = ParserError::ParserUnavailable("gone".to_string()).into();
        assert!(matches!(err, RcError::ParserUnavailable(_)));
    }
}
