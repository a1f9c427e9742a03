//! Role Classifier
//!
//! Decides whether the relativizer (or the empty relativizer of a reduced or
//! zero clause) is the subject, the object or something else inside its
//! clause, looking through passive voice.

use rc_core::{DepRel, Lexicon, ParsedSentence, RcCandidate, Role};

use crate::grammar;

/// Role decision for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: Role,
    pub passive: bool,
    /// Role rests on a core-argument gap
    pub gap_resolved: bool,
}

impl RoleAssignment {
    fn new(role: Role, passive: bool, gap_resolved: bool) -> Self {
        Self {
            role,
            passive,
            gap_resolved,
        }
    }
}

pub struct RoleClassifier<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> RoleClassifier<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn classify(&self, sentence: &ParsedSentence, candidate: &RcCandidate) -> RoleAssignment {
        let passive = grammar::is_passive(sentence, self.lexicon, candidate.anchor);
        match candidate.relativizer {
            Some(relativizer) => {
                self.with_relativizer(sentence, candidate.anchor, relativizer, passive)
            }
            None => self.without_relativizer(sentence, candidate.anchor, passive),
        }
    }

    fn with_relativizer(
        &self,
        sentence: &ParsedSentence,
        anchor: usize,
        relativizer: usize,
        passive: bool,
    ) -> RoleAssignment {
        let Some(token) = sentence.token(relativizer) else {
            return RoleAssignment::new(Role::Other, passive, false);
        };

        match token.relation {
            DepRel::NSubjPass => RoleAssignment::new(Role::Subject, true, true),
            rel if rel.is_subject() => RoleAssignment::new(Role::Subject, passive, true),
            rel if rel.is_object() => {
                // A passive predicate with no other subject promotes its
                // object to subject ("who was born" mislabeled as dobj)
                let other_subject = grammar::overt_subject(sentence, anchor)
                    .is_some_and(|s| s != relativizer);
                if passive && !other_subject {
                    RoleAssignment::new(Role::Subject, true, true)
                } else {
                    RoleAssignment::new(Role::Object, passive, true)
                }
            }
            // Prepositional and adverbial gaps are adjuncts, not core arguments
            _ => RoleAssignment::new(Role::Other, passive, false),
        }
    }

    fn without_relativizer(
        &self,
        sentence: &ParsedSentence,
        anchor: usize,
        passive: bool,
    ) -> RoleAssignment {
        let Some(verb) = sentence.token(anchor) else {
            return RoleAssignment::new(Role::Other, passive, false);
        };

        if !grammar::is_finite(sentence, anchor) {
            if grammar::is_infinitive(sentence, anchor) {
                return if passive {
                    RoleAssignment::new(Role::Subject, true, true)
                } else {
                    RoleAssignment::new(Role::Other, false, false)
                };
            }
            return match verb.pos.as_str() {
                "VBN" if !grammar::has_perfect_auxiliary(sentence, anchor) => {
                    RoleAssignment::new(Role::Subject, true, true)
                }
                "VBG" => RoleAssignment::new(Role::Subject, passive, true),
                _ => RoleAssignment::new(Role::Other, passive, false),
            };
        }

        let head = verb.head.unwrap_or(0);
        let own_subject = grammar::overt_subject(sentence, anchor)
            .is_some_and(|s| head < s && s < anchor);
        if !own_subject {
            return RoleAssignment::new(Role::Subject, passive, true);
        }

        // The head noun fills an object gap only when the verb lacks one
        if grammar::has_direct_object(sentence, anchor) {
            RoleAssignment::new(Role::Other, passive, false)
        } else {
            RoleAssignment::new(Role::Object, passive, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::{RcType, Span, Token};

    fn sentence(tokens: Vec<Token>) -> ParsedSentence {
        ParsedSentence::new("", tokens, None)
    }

    fn classify(s: &ParsedSentence, candidate: &RcCandidate) -> RoleAssignment {
        let lexicon = Lexicon::default();
        RoleClassifier::new(&lexicon).classify(s, candidate)
    }

    #[test]
    fn test_subject_and_object_relativizers() {
        // the book that I read
        let s = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "book", "NN", "root", None),
            Token::new(2, "that", "WDT", "dobj", Some(4)),
            Token::new(3, "I", "PRP", "nsubj", Some(4)),
            Token::new(4, "read", "VBD", "rcmod", Some(1)),
        ]);
        let role = classify(&s, &RcCandidate::full(2, 4, Span::new(2, 4)));
        assert_eq!(role, RoleAssignment::new(Role::Object, false, true));
    }

    #[test]
    fn test_passive_subject() {
        // the man who was born
        let s = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "man", "NN", "root", None),
            Token::new(2, "who", "WP", "nsubjpass", Some(4)),
            Token::new(3, "was", "VBD", "auxpass", Some(4)),
            Token::new(4, "born", "VBN", "rcmod", Some(1)),
        ]);
        let role = classify(&s, &RcCandidate::full(2, 4, Span::new(2, 4)));
        assert_eq!(role.role, Role::Subject);
        assert!(role.passive);
    }

    #[test]
    fn test_passive_promotes_mislabeled_object() {
        let s = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "man", "NN", "root", None),
            Token::new(2, "who", "WP", "dobj", Some(4)),
            Token::new(3, "was", "VBD", "aux", Some(4)),
            Token::new(4, "fired", "VBN", "rcmod", Some(1)),
        ]);
        let role = classify(&s, &RcCandidate::full(2, 4, Span::new(2, 4)));
        assert_eq!(role.role, Role::Subject);
        assert!(role.passive);
    }

    #[test]
    fn test_adverbial_relativizer_is_other() {
        // the town where she lives
        let s = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "town", "NN", "root", None),
            Token::new(2, "where", "WRB", "advmod", Some(4)),
            Token::new(3, "she", "PRP", "nsubj", Some(4)),
            Token::new(4, "lives", "VBZ", "rcmod", Some(1)),
        ]);
        let role = classify(&s, &RcCandidate::full(2, 4, Span::new(2, 4)));
        assert_eq!(role, RoleAssignment::new(Role::Other, false, false));
    }

    #[test]
    fn test_prepositional_relativizer_leaves_gap_unresolved() {
        // the way in which he spoke
        let s = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "way", "NN", "root", None),
            Token::new(2, "in", "IN", "prep", Some(5)),
            Token::new(3, "which", "WDT", "pobj", Some(2)),
            Token::new(4, "he", "PRP", "nsubj", Some(5)),
            Token::new(5, "spoke", "VBD", "rcmod", Some(1)),
        ]);
        let role = classify(&s, &RcCandidate::full(3, 5, Span::new(2, 5)));
        assert_eq!(role, RoleAssignment::new(Role::Other, false, false));
    }

    #[test]
    fn test_relativizer_less_roles() {
        // the letter written by her
        let reduced = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "letter", "NN", "root", None),
            Token::new(2, "written", "VBN", "partmod", Some(1)),
            Token::new(3, "by", "IN", "prep", Some(2)),
            Token::new(4, "her", "PRP", "pobj", Some(3)),
        ]);
        let role = classify(
            &reduced,
            &RcCandidate::relativizer_less(RcType::Reduced, 2, Span::new(2, 4)),
        );
        assert_eq!(role, RoleAssignment::new(Role::Subject, true, true));

        // the book I read
        let object = sentence(vec![
            Token::new(0, "the", "DT", "det", Some(1)),
            Token::new(1, "book", "NN", "root", None),
            Token::new(2, "I", "PRP", "nsubj", Some(3)),
            Token::new(3, "read", "VBD", "rcmod", Some(1)),
        ]);
        let role = classify(
            &object,
            &RcCandidate::relativizer_less(RcType::Reduced, 3, Span::new(2, 3)),
        );
        assert_eq!(role.role, Role::Object);
        assert!(!role.gap_resolved);

        // a man lives next door
        let zero = sentence(vec![
            Token::new(0, "a", "DT", "det", Some(1)),
            Token::new(1, "man", "NN", "root", None),
            Token::new(2, "lives", "VBZ", "rcmod", Some(1)),
        ]);
        let candidate = RcCandidate::relativizer_less(RcType::Zero, 2, Span::new(2, 2));
        let role = classify(&zero, &candidate);
        assert_eq!(role, RoleAssignment::new(Role::Subject, false, true));
    }

    #[test]
    fn test_infinitival_clause() {
        // a book to read
        let s = sentence(vec![
            Token::new(0, "a", "DT", "det", Some(1)),
            Token::new(1, "book", "NN", "root", None),
            Token::new(2, "to", "TO", "aux", Some(3)),
            Token::new(3, "read", "VB", "infmod", Some(1)),
        ]);
        let candidate = RcCandidate::relativizer_less(RcType::Reduced, 3, Span::new(2, 3));
        let role = classify(&s, &candidate);
        assert_eq!(role.role, Role::Other);
    }
}
