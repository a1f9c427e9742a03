//! False-Positive Filter
//!
//! An ordered list of independent veto rules. Each rule sees the classified
//! clause together with its sentence; the first rule that objects sets the
//! rejection reason and later rules are not consulted.

use rc_core::{DepRel, FilterConfig, Lexicon, ParsedSentence, RejectionReason, Span, Token};

use crate::grammar;

/// Everything a rule may inspect
pub struct RuleContext<'a> {
    pub sentence: &'a ParsedSentence,
    pub lexicon: &'a Lexicon,
    pub relativizer: Option<usize>,
    pub anchor: usize,
    pub head_noun: usize,
    pub span: Span,
    pub gap_resolved: bool,
}

impl RuleContext<'_> {
    fn head_noun_lower(&self) -> String {
        self.sentence
            .token(self.head_noun)
            .map(|t| t.lower())
            .unwrap_or_default()
    }

    fn relativizer_lower(&self) -> Option<String> {
        self.relativizer
            .and_then(|r| self.sentence.token(r))
            .map(|t| t.lower())
    }

    /// The clause predicate has a subject other than the relativizer
    fn has_own_subject(&self) -> bool {
        grammar::overt_subject(self.sentence, self.anchor)
            .is_some_and(|s| Some(s) != self.relativizer)
    }
}

/// A rule that can veto a candidate with a reason
pub trait VetoRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason>;
}

// ============================================================================
// Rules
// ============================================================================

/// "the way that he spoke": adjunct clause after a manner, reason or time
/// noun, where the relativizer fills no core argument
pub struct MannerAdjunctRule;

impl VetoRule for MannerAdjunctRule {
    fn name(&self) -> &'static str {
        "manner_adjunct"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        (ctx.lexicon.is_manner_noun(&ctx.head_noun_lower()) && !ctx.gap_resolved)
            .then_some(RejectionReason::MannerAdjunct)
    }
}

/// "the fact that he left": complete clause after a complement-taking noun,
/// or any complete `that` clause the parser attached as a noun complement
pub struct ComplementClauseRule;

impl VetoRule for ComplementClauseRule {
    fn name(&self) -> &'static str {
        "complement_clause"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        let is_that = ctx.relativizer_lower().is_some_and(|r| r == "that");
        if !is_that || ctx.gap_resolved || !ctx.has_own_subject() {
            return None;
        }
        let noun_complement = ctx
            .sentence
            .token(ctx.anchor)
            .is_some_and(|t| t.relation == DepRel::CComp);
        (noun_complement || ctx.lexicon.is_complement_noun(&ctx.head_noun_lower()))
            .then_some(RejectionReason::ComplementClause)
    }
}

/// "the claim to which she objected": fronted PP with no real extraction
pub struct PpFrontingRule;

impl VetoRule for PpFrontingRule {
    fn name(&self) -> &'static str {
        "pp_fronted_no_extraction"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        let relativizer = ctx.relativizer?;
        let prep = grammar::fronted_preposition(ctx.sentence, relativizer)?;
        if ctx.span.start != prep || !ctx.has_own_subject() {
            return None;
        }

        let prep_word = ctx.sentence.token(prep)?.lower();
        let same_prep_inside = ctx.sentence.tokens.iter().any(|t| {
            t.index != prep
                && t.is_preposition()
                && t.lower() == prep_word
                && ctx.sentence.dominates(ctx.anchor, t.index)
        });

        (ctx.lexicon.is_complement_noun(&ctx.head_noun_lower()) || same_prep_inside)
            .then_some(RejectionReason::PpFrontedNoExtraction)
    }
}

/// Negation pieces that may trail a stranded auxiliary
const NEGATIONS: [&str; 3] = ["not", "nt", "never"];

/// `do` forms end a clause as main verbs far more often than as stranded
/// auxiliaries ("the work he has done")
const DO_FORMS: [&str; 5] = ["do", "does", "did", "done", "doing"];

/// "something he shouldn't have", "everything he could": the clause stops
/// on a modal or auxiliary whose verb was elided
pub struct EllipticalFragmentRule;

impl EllipticalFragmentRule {
    fn is_stranded(ctx: &RuleContext<'_>, last: &Token, preceding: &[&Token]) -> bool {
        let lexicon = ctx.lexicon;
        let word = Lexicon::normalize(&last.text);

        let modal = lexicon.modal_tokens.contains(&word) && !last.is_nominal();
        let auxiliary = lexicon.auxiliary_endings.contains(&word)
            && !matches!(last.pos.as_str(), "VBN" | "VBG")
            && !DO_FORMS.contains(&word.as_str())
            && (last.relation.is_auxiliary()
                || preceding
                    .iter()
                    .any(|t| lexicon.is_auxiliary_like(&Lexicon::normalize(&t.text))));
        if !modal && !auxiliary {
            return false;
        }

        // A verb of its own to the right means nothing was elided
        !ctx.sentence
            .children(last.index)
            .any(|c| c.index > last.index && c.is_verb())
    }
}

impl VetoRule for EllipticalFragmentRule {
    fn name(&self) -> &'static str {
        "elliptical_fragment"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        let mut words: Vec<&Token> = ctx
            .span
            .indices()
            .filter_map(|i| ctx.sentence.token(i))
            .filter(|t| !Lexicon::normalize(&t.text).is_empty())
            .collect();
        while words
            .last()
            .is_some_and(|t| NEGATIONS.contains(&Lexicon::normalize(&t.text).as_str()))
        {
            words.pop();
        }

        let (last, preceding) = words.split_last()?;
        Self::is_stranded(ctx, last, preceding).then_some(RejectionReason::EllipticalFragment)
    }
}

/// Relativizer-less clause verb directly followed by `to`
pub struct TemporaryAmbiguityRule;

impl VetoRule for TemporaryAmbiguityRule {
    fn name(&self) -> &'static str {
        "temporary_ambiguity"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        if ctx.relativizer.is_some() {
            return None;
        }
        ctx.sentence
            .token(ctx.anchor + 1)
            .is_some_and(|t| t.lower() == "to")
            .then_some(RejectionReason::TemporaryAmbiguity)
    }
}

/// Contraction pieces that make a short clause a fragment
const CONTRACTIONS: [&str; 7] = ["'", "'ve", "'re", "'s", "'m", "'ll", "'d"];

/// Multi-factor confidence score for relativizer-less clauses
pub struct LowConfidenceRule {
    threshold: i32,
}

impl LowConfidenceRule {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    /// Confidence score, `None` when the clause fails an absolute check
    pub fn score(ctx: &RuleContext<'_>) -> Option<i32> {
        let words: Vec<&str> = ctx
            .span
            .indices()
            .filter_map(|i| ctx.sentence.token(i))
            .map(|t| t.text.as_str())
            .collect();

        if words.len() < 4 {
            return None;
        }
        let commas = words.iter().filter(|w| **w == ",").count();
        if commas >= 3 || words.iter().any(|w| w.contains('\u{2014}') || *w == "--") {
            return None;
        }
        if words.len() <= 4 && CONTRACTIONS.contains(&words[1]) {
            return None;
        }

        let head_noun = ctx.head_noun_lower();
        let attracting = ctx.lexicon.is_rc_attracting_noun(&head_noun);
        let mut score = 0;

        score += match ctx.anchor.saturating_sub(ctx.head_noun) {
            0..=3 => 3,
            4..=5 => 2,
            6..=7 => 1,
            8..=10 => 0,
            _ => -3,
        };

        if attracting {
            score += 2;
        } else if ctx.lexicon.is_complement_noun(&head_noun) {
            score -= 2;
        }

        if matches!(words[0].to_lowercase().as_str(), "i" | "you" | "we") {
            if words.len() == 4 && !attracting {
                score -= 1;
            } else if words.len() >= 6 {
                score += 1;
            }
        }

        score += match words.len() {
            8.. => 2,
            6..=7 => 1,
            _ => 0,
        };

        if !grammar::has_direct_object(ctx.sentence, ctx.anchor) {
            score += 2;
        }

        Some(score)
    }
}

impl VetoRule for LowConfidenceRule {
    fn name(&self) -> &'static str {
        "low_confidence"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        if ctx.relativizer.is_some() {
            return None;
        }
        match Self::score(ctx) {
            Some(score) if score >= self.threshold => None,
            _ => Some(RejectionReason::LowConfidence),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ordered veto rules
pub struct FilterPipeline {
    rules: Vec<Box<dyn VetoRule>>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl FilterPipeline {
    /// No rules; every clause is accepted
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The four rules that are always on
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(MannerAdjunctRule)
            .with_rule(ComplementClauseRule)
            .with_rule(PpFrontingRule)
            .with_rule(EllipticalFragmentRule)
    }

    /// Standard rules plus the opt-in ones enabled in `config`
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut pipeline = Self::standard();
        if config.temporary_ambiguity {
            pipeline = pipeline.with_rule(TemporaryAmbiguityRule);
        }
        if config.zero_confidence {
            pipeline = pipeline.with_rule(LowConfidenceRule::new(config.zero_confidence_threshold));
        }
        pipeline
    }

    pub fn with_rule(mut self, rule: impl VetoRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// First objection, if any
    pub fn apply(&self, ctx: &RuleContext<'_>) -> Option<RejectionReason> {
        self.rules.iter().find_map(|rule| rule.check(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        sentence: &'a ParsedSentence,
        lexicon: &'a Lexicon,
        relativizer: Option<usize>,
        anchor: usize,
        head_noun: usize,
        span: Span,
        gap_resolved: bool,
    ) -> RuleContext<'a> {
        RuleContext {
            sentence,
            lexicon,
            relativizer,
            anchor,
            head_noun,
            span,
            gap_resolved,
        }
    }

    fn sentence(words: &[(&str, &str, &str, Option<usize>)]) -> ParsedSentence {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, (w, pos, rel, head))| Token::new(i, *w, *pos, *rel, *head))
            .collect();
        ParsedSentence::new("", tokens, None)
    }

    #[test]
    fn test_manner_adjunct() {
        // I like the way that he spoke
        let s = sentence(&[
            ("I", "PRP", "nsubj", Some(1)),
            ("like", "VBP", "root", None),
            ("the", "DT", "det", Some(3)),
            ("way", "NN", "dobj", Some(1)),
            ("that", "IN", "advmod", Some(6)),
            ("he", "PRP", "nsubj", Some(6)),
            ("spoke", "VBD", "rcmod", Some(3)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, Some(4), 6, 3, Span::new(4, 6), false);
        assert_eq!(MannerAdjunctRule.check(&c), Some(RejectionReason::MannerAdjunct));

        // An object gap keeps "the time that I spent"
        let c = ctx(&s, &lexicon, Some(4), 6, 3, Span::new(4, 6), true);
        assert_eq!(MannerAdjunctRule.check(&c), None);
    }

    #[test]
    fn test_reason_why_is_manner_adjunct() {
        // the reason why he left
        let s = sentence(&[
            ("the", "DT", "det", Some(1)),
            ("reason", "NN", "root", None),
            ("why", "WRB", "advmod", Some(4)),
            ("he", "PRP", "nsubj", Some(4)),
            ("left", "VBD", "rcmod", Some(1)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, Some(2), 4, 1, Span::new(2, 4), false);
        assert_eq!(MannerAdjunctRule.check(&c), Some(RejectionReason::MannerAdjunct));
    }

    #[test]
    fn test_complement_clause() {
        // the fact that he left
        let s = sentence(&[
            ("the", "DT", "det", Some(1)),
            ("fact", "NN", "root", None),
            ("that", "IN", "mark", Some(4)),
            ("he", "PRP", "nsubj", Some(4)),
            ("left", "VBD", "rcmod", Some(1)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, Some(2), 4, 1, Span::new(2, 4), false);
        assert_eq!(ComplementClauseRule.check(&c), Some(RejectionReason::ComplementClause));
    }

    #[test]
    fn test_noun_complement_attachment() {
        // the news that he left, parsed as a complement of the noun
        let s = sentence(&[
            ("the", "DT", "det", Some(1)),
            ("news", "NN", "root", None),
            ("that", "IN", "mark", Some(4)),
            ("he", "PRP", "nsubj", Some(4)),
            ("left", "VBD", "ccomp", Some(1)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, Some(2), 4, 1, Span::new(2, 4), false);
        assert_eq!(ComplementClauseRule.check(&c), Some(RejectionReason::ComplementClause));

        // Same words as a relative clause with a subject gap
        let c = ctx(&s, &lexicon, Some(2), 4, 1, Span::new(2, 4), true);
        assert_eq!(ComplementClauseRule.check(&c), None);
    }

    #[test]
    fn test_pp_fronting() {
        // the claim to which she objected
        let s = sentence(&[
            ("the", "DT", "det", Some(1)),
            ("claim", "NN", "root", None),
            ("to", "TO", "prep", Some(5)),
            ("which", "WDT", "pobj", Some(2)),
            ("she", "PRP", "nsubj", Some(5)),
            ("objected", "VBD", "rcmod", Some(1)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, Some(3), 5, 1, Span::new(2, 5), true);
        assert_eq!(PpFrontingRule.check(&c), Some(RejectionReason::PpFrontedNoExtraction));

        // Span not starting at the preposition
        let c = ctx(&s, &lexicon, Some(3), 5, 1, Span::new(3, 5), true);
        assert_eq!(PpFrontingRule.check(&c), None);
    }

    #[test]
    fn test_elliptical_fragment() {
        // something he should n't have
        let s = sentence(&[
            ("something", "NN", "root", None),
            ("he", "PRP", "nsubj", Some(4)),
            ("should", "MD", "aux", Some(4)),
            ("n't", "RB", "neg", Some(4)),
            ("have", "VB", "rcmod", Some(0)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, None, 4, 0, Span::new(1, 4), false);
        assert_eq!(
            EllipticalFragmentRule.check(&c),
            Some(RejectionReason::EllipticalFragment)
        );
    }

    #[test]
    fn test_elliptical_modal_and_long_clauses() {
        let lexicon = Lexicon::default();

        // everything he could
        let s = sentence(&[
            ("everything", "NN", "root", None),
            ("he", "PRP", "nsubj", Some(2)),
            ("could", "MD", "rcmod", Some(0)),
        ]);
        let c = ctx(&s, &lexicon, None, 2, 0, Span::new(1, 2), false);
        assert_eq!(
            EllipticalFragmentRule.check(&c),
            Some(RejectionReason::EllipticalFragment)
        );

        // the thing that my older brother and his best friend should have
        let s = sentence(&[
            ("thing", "NN", "root", None),
            ("that", "WDT", "dobj", Some(10)),
            ("my", "PRP$", "poss", Some(4)),
            ("older", "JJR", "amod", Some(4)),
            ("brother", "NN", "nsubj", Some(10)),
            ("and", "CC", "cc", Some(4)),
            ("his", "PRP$", "poss", Some(8)),
            ("best", "JJS", "amod", Some(8)),
            ("friend", "NN", "conj", Some(4)),
            ("should", "MD", "aux", Some(10)),
            ("have", "VB", "rcmod", Some(0)),
        ]);
        let c = ctx(&s, &lexicon, Some(1), 10, 0, Span::new(1, 10), true);
        assert_eq!(
            EllipticalFragmentRule.check(&c),
            Some(RejectionReason::EllipticalFragment)
        );
    }

    #[test]
    fn test_main_verb_endings_are_not_elliptical() {
        let lexicon = Lexicon::default();

        // the work he has done
        let s = sentence(&[
            ("work", "NN", "root", None),
            ("he", "PRP", "nsubj", Some(3)),
            ("has", "VBZ", "aux", Some(3)),
            ("done", "VBN", "rcmod", Some(0)),
        ]);
        let c = ctx(&s, &lexicon, None, 3, 0, Span::new(1, 3), false);
        assert_eq!(EllipticalFragmentRule.check(&c), None);

        // everything he has
        let s = sentence(&[
            ("everything", "NN", "root", None),
            ("he", "PRP", "nsubj", Some(2)),
            ("has", "VBZ", "rcmod", Some(0)),
        ]);
        let c = ctx(&s, &lexicon, None, 2, 0, Span::new(1, 2), false);
        assert_eq!(EllipticalFragmentRule.check(&c), None);

        // the trash he put in the can
        let s = sentence(&[
            ("trash", "NN", "root", None),
            ("he", "PRP", "nsubj", Some(2)),
            ("put", "VBD", "rcmod", Some(0)),
            ("in", "IN", "prep", Some(2)),
            ("the", "DT", "det", Some(5)),
            ("can", "NN", "pobj", Some(3)),
        ]);
        let c = ctx(&s, &lexicon, None, 2, 0, Span::new(1, 5), false);
        assert_eq!(EllipticalFragmentRule.check(&c), None);
    }

    #[test]
    fn test_temporary_ambiguity() {
        let s = sentence(&[
            ("people", "NNS", "root", None),
            ("want", "VBP", "rcmod", Some(0)),
            ("to", "TO", "aux", Some(3)),
            ("leave", "VB", "xcomp", Some(1)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, None, 1, 0, Span::new(1, 3), true);
        assert_eq!(
            TemporaryAmbiguityRule.check(&c),
            Some(RejectionReason::TemporaryAmbiguity)
        );
    }

    #[test]
    fn test_low_confidence_score() {
        // the things we saw at the market yesterday
        let s = sentence(&[
            ("the", "DT", "det", Some(1)),
            ("things", "NNS", "root", None),
            ("we", "PRP", "nsubj", Some(3)),
            ("saw", "VBD", "rcmod", Some(1)),
            ("at", "IN", "prep", Some(3)),
            ("the", "DT", "det", Some(6)),
            ("market", "NN", "pobj", Some(4)),
            ("yesterday", "NN", "tmod", Some(3)),
        ]);
        let lexicon = Lexicon::default();
        let c = ctx(&s, &lexicon, None, 3, 1, Span::new(2, 7), false);
        // gap 2 (+3), attracting (+2), pronoun-initial 6 words (+1),
        // length 6 (+1), no object (+2)
        assert_eq!(LowConfidenceRule::score(&c), Some(9));
        assert_eq!(LowConfidenceRule::new(-1).check(&c), None);

        let short = ctx(&s, &lexicon, None, 3, 1, Span::new(2, 3), false);
        assert_eq!(
            LowConfidenceRule::new(-1).check(&short),
            Some(RejectionReason::LowConfidence)
        );
    }

    #[test]
    fn test_pipeline_from_config() {
        assert_eq!(FilterPipeline::standard().rule_names().len(), 4);
        let config = FilterConfig {
            temporary_ambiguity: true,
            zero_confidence: true,
            zero_confidence_threshold: -1,
        };
        let names = FilterPipeline::from_config(&config).rule_names();
        assert_eq!(
            names,
            vec![
                "manner_adjunct",
                "complement_clause",
                "pp_fronted_no_extraction",
                "elliptical_fragment",
                "temporary_ambiguity",
                "low_confidence"
            ]
        );
    }
}
