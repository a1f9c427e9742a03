//! Closed word lists consulted by the scanner, role classifier and filters
//!
//! Every list is part of the run configuration so that a corpus can override
//! any of them from TOML without touching code.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Word lists driving relative clause detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Words that introduce a full relative clause
    pub relativizers: BTreeSet<String>,

    /// Head nouns that favour a manner/temporal adjunct reading
    pub manner_nouns: BTreeSet<String>,

    /// Abstract nouns that take complement clauses
    pub complement_nouns: BTreeSet<String>,

    /// Nouns frequently modified by relative clauses
    pub rc_attracting_nouns: BTreeSet<String>,

    /// Modal auxiliaries, apostrophes removed (`shouldn't` -> `shouldnt`)
    pub modal_tokens: BTreeSet<String>,

    /// Auxiliary forms that can close an elliptical clause
    pub auxiliary_endings: BTreeSet<String>,

    /// Auxiliaries forming the passive with a following participle
    pub passive_auxiliaries: BTreeSet<String>,

    /// Past participles not ending in `-ed`
    pub irregular_participles: BTreeSet<String>,
}

fn set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            relativizers: set(&[
                "which", "whichever", "that", "who", "whom", "whose", "whoever", "whomever",
                "what", "whatever", "where", "when", "why",
            ]),
            manner_nouns: set(&[
                "way", "ways", "time", "times", "manner", "manners", "reason", "reasons", "moment",
                "moments",
            ]),
            complement_nouns: set(&[
                "fact", "facts", "idea", "ideas", "belief", "beliefs", "claim", "claims", "notion",
                "thought", "question", "problem", "issue", "issues", "evidence", "form", "forms",
            ]),
            rc_attracting_nouns: set(&[
                "thing", "things", "way", "ways", "time", "times", "place", "places", "person",
                "people", "man", "woman", "someone", "anyone", "everyone", "something",
                "anything", "everything", "nothing", "one", "ones", "book", "books", "moment",
                "moments", "day", "days", "year", "years",
            ]),
            modal_tokens: set(&[
                "can", "cannot", "could", "couldn", "couldnt", "may", "might", "must", "mustn",
                "mustnt", "shall", "shan", "shant", "should", "shouldn", "shouldnt", "will", "won",
                "wont", "would", "wouldn", "wouldnt", "needn", "neednt",
            ]),
            auxiliary_endings: set(&[
                "be", "been", "being", "am", "is", "are", "was", "were", "have", "has", "had",
                "do", "does", "did", "done", "doing",
            ]),
            passive_auxiliaries: set(&[
                "be", "been", "being", "am", "is", "are", "was", "were", "get", "gets", "got",
                "getting", "gotten", "become", "becomes", "became",
            ]),
            irregular_participles: set(&[
                "born", "brought", "bought", "built", "caught", "chosen", "dealt", "done",
                "driven", "drunk", "drawn", "eaten", "felt", "found", "forgiven", "forgotten",
                "given", "gone", "grown", "heard", "held", "kept", "known", "left", "lost", "made",
                "paid", "put", "read", "run", "said", "seen", "sold", "sent", "set", "shot",
                "shown", "spoken", "spent", "stood", "taken", "taught", "told", "thrown", "worn",
                "written",
            ]),
        }
    }
}

impl Lexicon {
    /// Normalize a token for list lookups.
    ///
    /// Folds curly apostrophes, lowercases, strips surrounding punctuation and
    /// drops remaining apostrophes, so `Shouldn't` becomes `shouldnt` and a
    /// bare comma becomes the empty string.
    pub fn normalize(token: &str) -> String {
        let folded = token
            .replace(['\u{2019}', '\u{2018}'], "'")
            .to_lowercase();
        folded
            .trim_matches(|c: char| {
                c.is_ascii_punctuation() || matches!(c, '\u{201c}' | '\u{201d}')
            })
            .replace('\'', "")
    }

    pub fn is_relativizer(&self, token: &str) -> bool {
        self.relativizers.contains(&token.to_lowercase())
    }

    pub fn is_manner_noun(&self, token: &str) -> bool {
        self.manner_nouns.contains(&token.to_lowercase())
    }

    pub fn is_complement_noun(&self, token: &str) -> bool {
        self.complement_nouns.contains(&token.to_lowercase())
    }

    pub fn is_rc_attracting_noun(&self, token: &str) -> bool {
        self.rc_attracting_nouns.contains(&token.to_lowercase())
    }

    /// Modal or clause-final auxiliary, on a normalized token
    pub fn is_auxiliary_like(&self, normalized: &str) -> bool {
        self.modal_tokens.contains(normalized) || self.auxiliary_endings.contains(normalized)
    }

    pub fn is_passive_auxiliary(&self, token: &str) -> bool {
        self.passive_auxiliaries.contains(&Self::normalize(token))
    }

    /// Whether a verb form looks like a past participle
    pub fn looks_like_participle(&self, token: &str) -> bool {
        let normalized = Self::normalize(token);
        normalized.ends_with("ed") || self.irregular_participles.contains(&normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relativizers() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.relativizers.len(), 13);
        assert!(lexicon.is_relativizer("Which"));
        assert!(lexicon.is_relativizer("whomever"));
        assert!(!lexicon.is_relativizer("how"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Lexicon::normalize("Shouldn't"), "shouldnt");
        assert_eq!(Lexicon::normalize("n't"), "nt");
        assert_eq!(Lexicon::normalize("won\u{2019}t"), "wont");
        assert_eq!(Lexicon::normalize("\u{201c}Hello,"), "hello");
        assert_eq!(Lexicon::normalize(","), "");
    }

    #[test]
    fn test_participles() {
        let lexicon = Lexicon::default();
        assert!(lexicon.looks_like_participle("born"));
        assert!(lexicon.looks_like_participle("fired"));
        assert!(!lexicon.looks_like_participle("run-of-the-mill"));
        assert!(lexicon.is_passive_auxiliary("Was"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let lexicon: Lexicon = toml::from_str(r#"manner_nouns = ["way"]"#).unwrap();
        assert_eq!(lexicon.manner_nouns.len(), 1);
        assert!(lexicon.is_relativizer("who"));
    }
}
