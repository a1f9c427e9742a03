//! Token alignment between the dependency and constituency parses

use rc_core::Token;

use crate::{ParserError, Result};

/// Undo Penn Treebank escaping of a leaf or token form
pub fn unescape_ptb(word: &str) -> &str {
    match word {
        "-LRB-" | "-lrb-" => "(",
        "-RRB-" | "-rrb-" => ")",
        "-LSB-" | "-lsb-" => "[",
        "-RSB-" | "-rsb-" => "]",
        "-LCB-" | "-lcb-" => "{",
        "-RCB-" | "-rcb-" => "}",
        "``" | "''" | "\u{201c}" | "\u{201d}" => "\"",
        "`" | "\u{2018}" | "\u{2019}" => "'",
        other => other,
    }
}

/// Check that tree leaves and dependency tokens describe the same words
pub fn check_alignment(tokens: &[Token], leaves: &[String]) -> Result<()> {
    let mismatch = tokens
        .iter()
        .zip(leaves)
        .position(|(token, leaf)| unescape_ptb(&token.text) != unescape_ptb(leaf));

    if tokens.len() == leaves.len() && mismatch.is_none() {
        return Ok(());
    }

    Err(ParserError::Alignment {
        dependency_tokens: tokens.len(),
        constituency_tokens: leaves.len(),
        mismatch: mismatch.or(Some(tokens.len().min(leaves.len()))),
    })
}
