//! Dependency-tree queries shared by the pipeline stages

use rc_core::{DepRel, Lexicon, ParsedSentence};

const FINITE_TAGS: [&str; 4] = ["VBD", "VBZ", "VBP", "MD"];

const PERFECT_HAVE: [&str; 6] = ["have", "has", "had", "having", "'ve", "'d"];

/// Nearest predicate that attaches the clause containing `index` to a noun.
///
/// Walks the head chain upward, passing through complement clauses whose
/// head is a verb and through coordinated verbs. Any other clause relation
/// ends the search without a match.
pub fn adnominal_predicate(sentence: &ParsedSentence, index: usize) -> Option<usize> {
    for ancestor in sentence.ancestors(index) {
        let token = sentence.token(ancestor)?;
        match token.relation {
            rel if rel.is_adnominal_clause() => return Some(ancestor),
            rel if rel.is_complement_clause() => {
                let governor_is_verb = token
                    .head
                    .and_then(|h| sentence.token(h))
                    .is_some_and(|h| h.is_verb());
                if !governor_is_verb {
                    return None;
                }
            }
            DepRel::Conj if token.is_verb() => {}
            rel if rel.is_clausal() => return None,
            _ => {}
        }
    }
    None
}

/// Tensed predicate, or one carrying a tensed auxiliary or copula
pub fn is_finite(sentence: &ParsedSentence, index: usize) -> bool {
    let Some(token) = sentence.token(index) else {
        return false;
    };
    FINITE_TAGS.contains(&token.pos.as_str())
        || sentence
            .children(index)
            .any(|c| c.relation.is_auxiliary() && FINITE_TAGS.contains(&c.pos.as_str()))
}

/// Infinitival predicate introduced by `to`
pub fn is_infinitive(sentence: &ParsedSentence, index: usize) -> bool {
    sentence
        .children(index)
        .any(|c| c.index < index && c.lower() == "to" && c.pos == "TO")
}

/// First subject dependent of a predicate
pub fn overt_subject(sentence: &ParsedSentence, index: usize) -> Option<usize> {
    sentence
        .children(index)
        .find(|c| c.relation.is_subject())
        .map(|c| c.index)
}

pub fn has_direct_object(sentence: &ParsedSentence, index: usize) -> bool {
    sentence.children(index).any(|c| c.relation.is_object())
}

pub fn has_perfect_auxiliary(sentence: &ParsedSentence, index: usize) -> bool {
    sentence
        .children(index)
        .any(|c| c.relation == DepRel::Aux && PERFECT_HAVE.contains(&c.lower().as_str()))
}

/// Passive voice on a predicate.
///
/// Trusts explicit passive labels first. When the parser missed them, a
/// participle carrying a be/get/become auxiliary counts as passive.
pub fn is_passive(sentence: &ParsedSentence, lexicon: &Lexicon, index: usize) -> bool {
    let Some(token) = sentence.token(index) else {
        return false;
    };
    if sentence
        .children(index)
        .any(|c| matches!(c.relation, DepRel::AuxPass | DepRel::NSubjPass))
    {
        return true;
    }

    let participle = token.pos == "VBN"
        || (token.pos.starts_with("VB")
            && token.pos != "VBG"
            && lexicon.looks_like_participle(&token.text));
    participle
        && sentence.children(index).any(|c| {
            c.index < index && c.relation.is_auxiliary() && lexicon.is_passive_auxiliary(&c.text)
        })
}

/// Preposition fronted together with a relativizer (`to which`, `in whom`)
pub fn fronted_preposition(sentence: &ParsedSentence, relativizer: usize) -> Option<usize> {
    let prep_index = relativizer.checked_sub(1)?;
    let prep = sentence.token(prep_index)?;
    let rel = sentence.token(relativizer)?;
    if !prep.is_preposition() {
        return None;
    }

    let stanford = rel.relation == DepRel::PObj && rel.head == Some(prep_index);
    let universal = prep.relation == DepRel::Case && prep.head == Some(relativizer);
    (stanford || universal).then_some(prep_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::Token;

    fn passive_clause() -> ParsedSentence {
        // The man who was born here
        let tokens = vec![
            Token::new(0, "The", "DT", "det", Some(1)),
            Token::new(1, "man", "NN", "root", None),
            Token::new(2, "who", "WP", "nsubj", Some(4)),
            Token::new(3, "was", "VBD", "aux", Some(4)),
            Token::new(4, "born", "VBN", "rcmod", Some(1)),
            Token::new(5, "here", "RB", "advmod", Some(4)),
        ];
        ParsedSentence::new("The man who was born here", tokens, None)
    }

    #[test]
    fn test_adnominal_predicate() {
        let s = passive_clause();
        assert_eq!(adnominal_predicate(&s, 2), Some(4));
        assert_eq!(adnominal_predicate(&s, 0), None);
    }

    #[test]
    fn test_predicate_through_verbal_complement() {
        // the man who I think left
        let tokens = vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "man", "NN", "root", None),
            Token::new(2, "who", "WP", "nsubj", Some(5)),
            Token::new(3, "I", "PRP", "nsubj", Some(4)),
            Token::new(4, "think", "VBP", "rcmod", Some(1)),
            Token::new(5, "left", "VBD", "ccomp", Some(4)),
        ];
        let s = ParsedSentence::new("the man who I think left", tokens, None);
        assert_eq!(adnominal_predicate(&s, 2), Some(4));
    }

    #[test]
    fn test_noun_complement_blocks_predicate() {
        // the claim that he left
        let tokens = vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "claim", "NN", "root", None),
            Token::new(2, "that", "IN", "mark", Some(4)),
            Token::new(3, "he", "PRP", "nsubj", Some(4)),
            Token::new(4, "left", "VBD", "ccomp", Some(1)),
        ];
        let s = ParsedSentence::new("the claim that he left", tokens, None);
        assert_eq!(adnominal_predicate(&s, 2), None);
    }

    #[test]
    fn test_passive_heuristic_without_labels() {
        let s = passive_clause();
        assert!(is_passive(&s, &Lexicon::default(), 4));
        assert!(is_finite(&s, 4));
        assert_eq!(overt_subject(&s, 4), Some(2));
        assert!(!has_direct_object(&s, 4));
    }

    #[test]
    fn test_fronted_preposition() {
        // the claim to which she objected
        let tokens = vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "claim", "NN", "root", None),
            Token::new(2, "to", "TO", "prep", Some(5)),
            Token::new(3, "which", "WDT", "pobj", Some(2)),
            Token::new(4, "she", "PRP", "nsubj", Some(5)),
            Token::new(5, "objected", "VBD", "rcmod", Some(1)),
        ];
        let s = ParsedSentence::new("the claim to which she objected", tokens, None);
        assert_eq!(fronted_preposition(&s, 3), Some(2));
        assert_eq!(fronted_preposition(&s, 4), None);
    }
}
