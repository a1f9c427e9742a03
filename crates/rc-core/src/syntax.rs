//! Syntactic representation shared by every pipeline stage
//!
//! A sentence is a token sequence carrying a dependency tree (head index and
//! relation per token) plus an optional constituency tree whose spans are
//! expressed over the same token indices.

use serde::{Deserialize, Serialize};

// ============================================================================
// Spans
// ============================================================================

/// Inclusive range of token indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a span, swapping the bounds if given in reverse
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Span covering a single token
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// Number of tokens covered
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// A span always covers at least one token
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both
    pub fn union(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// ============================================================================
// Dependency Relations
// ============================================================================

/// Typed view of a dependency label.
///
/// Both Stanford basic dependencies (as produced by PTB-trained parsers) and
/// Universal Dependencies are mapped onto the same variants, so rules never
/// match on raw label strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepRel {
    Root,
    /// Finite relative clause modifier (`rcmod`, `acl:relcl`)
    RelClause,
    /// Non-finite clausal modifier of a noun (`partmod`, `vmod`, `infmod`, `acl`)
    AdnominalClause,
    NSubj,
    NSubjPass,
    CSubj,
    DObj,
    IObj,
    PObj,
    /// Oblique nominal (`obl`, `nmod`)
    Oblique,
    Poss,
    AdvMod,
    /// Complementizer or subordinator (`mark`, `complm`)
    Mark,
    Aux,
    AuxPass,
    Cop,
    Prep,
    Case,
    Det,
    Expl,
    CComp,
    XComp,
    AdvCl,
    Conj,
    Punct,
    Other,
}

impl DepRel {
    /// Classify a raw dependency label
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "acl:relcl" => return Self::RelClause,
            "nsubj:pass" => return Self::NSubjPass,
            "aux:pass" => return Self::AuxPass,
            "nmod:poss" => return Self::Poss,
            "csubj:pass" => return Self::CSubj,
            "obl:npmod" | "obl:tmod" => return Self::Oblique,
            _ => {}
        }

        let base = lower.split(':').next().unwrap_or_default();
        match base {
            "root" => Self::Root,
            "rcmod" | "relcl" => Self::RelClause,
            "partmod" | "vmod" | "infmod" | "acl" => Self::AdnominalClause,
            "nsubj" => Self::NSubj,
            "nsubjpass" => Self::NSubjPass,
            "csubj" | "csubjpass" => Self::CSubj,
            "dobj" | "obj" => Self::DObj,
            "iobj" => Self::IObj,
            "pobj" => Self::PObj,
            "obl" | "nmod" => Self::Oblique,
            "poss" => Self::Poss,
            "advmod" => Self::AdvMod,
            "mark" | "complm" => Self::Mark,
            "aux" => Self::Aux,
            "auxpass" => Self::AuxPass,
            "cop" => Self::Cop,
            "prep" => Self::Prep,
            "case" => Self::Case,
            "det" | "predet" => Self::Det,
            "expl" => Self::Expl,
            "ccomp" => Self::CComp,
            "xcomp" => Self::XComp,
            "advcl" => Self::AdvCl,
            "conj" => Self::Conj,
            "punct" => Self::Punct,
            _ => Self::Other,
        }
    }

    /// Clause attached to a noun (finite or non-finite)
    pub fn is_adnominal_clause(&self) -> bool {
        matches!(self, Self::RelClause | Self::AdnominalClause)
    }

    /// Relation that makes its dependent the predicate of a clause
    pub fn is_clausal(&self) -> bool {
        matches!(
            self,
            Self::Root
                | Self::RelClause
                | Self::AdnominalClause
                | Self::CComp
                | Self::XComp
                | Self::AdvCl
                | Self::CSubj
        )
    }

    /// Complement clause relations a relativizer may be extracted out of
    pub fn is_complement_clause(&self) -> bool {
        matches!(self, Self::CComp | Self::XComp)
    }

    pub fn is_subject(&self) -> bool {
        matches!(self, Self::NSubj | Self::NSubjPass | Self::CSubj | Self::Expl)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::DObj | Self::IObj)
    }

    pub fn is_auxiliary(&self) -> bool {
        matches!(self, Self::Aux | Self::AuxPass | Self::Cop)
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// One token of a parsed sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 0-based position in the sentence
    pub index: usize,
    /// Surface form
    pub text: String,
    /// Part-of-speech tag (PTB tagset)
    pub pos: String,
    /// Raw dependency label as emitted by the parser
    pub label: String,
    /// Typed relation derived from `label`
    pub relation: DepRel,
    /// Head token index, `None` for the root
    pub head: Option<usize>,
}

impl Token {
    pub fn new(
        index: usize,
        text: impl Into<String>,
        pos: impl Into<String>,
        label: impl Into<String>,
        head: Option<usize>,
    ) -> Self {
        let label = label.into();
        Self {
            index,
            text: text.into(),
            pos: pos.into(),
            relation: DepRel::from_label(&label),
            label,
            head,
        }
    }

    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    /// Verb or modal tag
    pub fn is_verb(&self) -> bool {
        self.pos.starts_with("VB") || self.pos == "MD"
    }

    /// Tags that can head a noun phrase modified by a relative clause
    pub fn is_nominal(&self) -> bool {
        self.pos.starts_with("NN") || matches!(self.pos.as_str(), "PRP" | "CD" | "DT" | "EX")
    }

    pub fn is_preposition(&self) -> bool {
        matches!(self.pos.as_str(), "IN" | "TO")
    }

    pub fn is_punct(&self) -> bool {
        self.relation == DepRel::Punct
            || matches!(
                self.pos.as_str(),
                "," | "." | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP"
            )
    }
}

// ============================================================================
// Constituency Tree
// ============================================================================

/// Node of a phrase-structure tree.
///
/// Leaves are preterminals over exactly one token; phrases own their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstituentNode {
    Leaf {
        tag: String,
        index: usize,
    },
    Phrase {
        label: String,
        span: Span,
        children: Vec<ConstituentNode>,
    },
}

impl ConstituentNode {
    /// Phrase label or POS tag
    pub fn label(&self) -> &str {
        match self {
            Self::Leaf { tag, .. } => tag,
            Self::Phrase { label, .. } => label,
        }
    }

    /// Label without function tags or coindexation (`NP-SBJ-1` -> `NP`)
    pub fn base_label(&self) -> &str {
        let label = self.label();
        if label.starts_with('-') {
            return label;
        }
        label
            .split(['-', '='])
            .next()
            .filter(|base| !base.is_empty())
            .unwrap_or(label)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Leaf { index, .. } => Span::single(*index),
            Self::Phrase { span, .. } => *span,
        }
    }

    pub fn children(&self) -> &[ConstituentNode] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Phrase { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Visit every node in pre-order together with its parent
    pub fn visit<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a ConstituentNode, Option<&'a ConstituentNode>),
    {
        self.visit_inner(None, f);
    }

    fn visit_inner<'a, F>(&'a self, parent: Option<&'a ConstituentNode>, f: &mut F)
    where
        F: FnMut(&'a ConstituentNode, Option<&'a ConstituentNode>),
    {
        f(self, parent);
        for child in self.children() {
            child.visit_inner(Some(self), f);
        }
    }

    /// Number of leaves under this node
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Phrase { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}

// ============================================================================
// Parsed Sentence
// ============================================================================

/// A sentence after tree adaptation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSentence {
    /// Sentence text as handed over by the parsing collaborator
    pub text: String,
    pub tokens: Vec<Token>,
    /// Constituency tree; `None` in dependency-only mode
    pub tree: Option<ConstituentNode>,
}

impl ParsedSentence {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>, tree: Option<ConstituentNode>) -> Self {
        Self {
            text: text.into(),
            tokens,
            tree,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// True when no constituency tree is available
    pub fn is_dependency_only(&self) -> bool {
        self.tree.is_none()
    }

    /// Direct dependents of a token, in sentence order
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .filter(move |t| t.head == Some(index) && t.index != index)
    }

    /// Ancestors of a token, nearest first.
    ///
    /// Bounded by the sentence length so a malformed (cyclic) head chain
    /// cannot loop forever.
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = index;
        while let Some(head) = self.tokens.get(current).and_then(|t| t.head) {
            if head >= self.tokens.len() || chain.len() >= self.tokens.len() {
                break;
            }
            chain.push(head);
            current = head;
        }
        chain
    }

    /// Whether `ancestor` dominates `index` in the dependency tree
    pub fn dominates(&self, ancestor: usize, index: usize) -> bool {
        self.ancestors(index).contains(&ancestor)
    }

    /// Contiguous span covering a token and all of its dependency descendants
    pub fn subtree_span(&self, index: usize) -> Span {
        let mut span = Span::single(index);
        for token in &self.tokens {
            if token.index != index && self.dominates(index, token.index) {
                span = span.union(&Span::single(token.index));
            }
        }
        span
    }

    /// Space-joined surface text of a span, clamped to the sentence
    pub fn text_of(&self, span: Span) -> String {
        self.tokens
            .iter()
            .filter(|t| span.contains(t.index))
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn verb_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.pos.starts_with("VB")).count()
    }
}
