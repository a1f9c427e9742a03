//! Penn Treebank bracketed tree reader

use rc_core::{ConstituentNode, Span};

use crate::{ParserError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    Open,
    Close,
    Atom(String),
}

#[derive(Debug)]
enum RawTree {
    Node { label: String, children: Vec<RawTree> },
    Word(String),
}

fn lex(input: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut atom = String::new();

    let flush = |atom: &mut String, lexemes: &mut Vec<Lexeme>| {
        if !atom.is_empty() {
            lexemes.push(Lexeme::Atom(std::mem::take(atom)));
        }
    };

    for c in input.chars() {
        match c {
            '(' => {
                flush(&mut atom, &mut lexemes);
                lexemes.push(Lexeme::Open);
            }
            ')' => {
                flush(&mut atom, &mut lexemes);
                lexemes.push(Lexeme::Close);
            }
            c if c.is_whitespace() => flush(&mut atom, &mut lexemes),
            c => atom.push(c),
        }
    }
    flush(&mut atom, &mut lexemes);
    lexemes
}

fn parse_node(lexemes: &[Lexeme], pos: &mut usize) -> Result<RawTree> {
    if lexemes.get(*pos) != Some(&Lexeme::Open) {
        return Err(ParserError::MalformedTree(format!(
            "expected '(' at position {}",
            pos
        )));
    }
    *pos += 1;

    let label = match lexemes.get(*pos) {
        Some(Lexeme::Atom(label)) => {
            *pos += 1;
            label.clone()
        }
        _ => String::new(),
    };

    let mut children = Vec::new();
    loop {
        match lexemes.get(*pos) {
            Some(Lexeme::Open) => children.push(parse_node(lexemes, pos)?),
            Some(Lexeme::Atom(word)) => {
                children.push(RawTree::Word(word.clone()));
                *pos += 1;
            }
            Some(Lexeme::Close) => {
                *pos += 1;
                break;
            }
            None => return Err(ParserError::MalformedTree("unbalanced brackets".to_string())),
        }
    }

    if children.is_empty() {
        return Err(ParserError::MalformedTree(format!(
            "empty bracket{}",
            if label.is_empty() {
                String::new()
            } else {
                format!(" ({label})")
            }
        )));
    }

    Ok(RawTree::Node { label, children })
}

/// Assign token indices to leaves, dropping empty elements
fn build(
    raw: RawTree,
    next_index: &mut usize,
    leaves: &mut Vec<String>,
) -> Result<Option<ConstituentNode>> {
    let (label, mut children) = match raw {
        RawTree::Word(word) => {
            return Err(ParserError::MalformedTree(format!(
                "word {word:?} outside a preterminal"
            )))
        }
        RawTree::Node { label, children } => (label, children),
    };

    // Preterminal: (TAG word)
    if children.len() == 1 && matches!(children[0], RawTree::Word(_)) {
        let Some(RawTree::Word(word)) = children.pop() else {
            return Ok(None);
        };
        if label == "-NONE-" {
            return Ok(None);
        }
        if label.is_empty() {
            return Err(ParserError::MalformedTree(format!(
                "word {word:?} has no tag"
            )));
        }
        let index = *next_index;
        *next_index += 1;
        leaves.push(word);
        return Ok(Some(ConstituentNode::Leaf { tag: label, index }));
    }

    let mut built = Vec::with_capacity(children.len());
    for child in children {
        if let Some(node) = build(child, next_index, leaves)? {
            built.push(node);
        }
    }

    let (Some(first), Some(last)) = (built.first(), built.last()) else {
        return Ok(None);
    };
    let span = Span::new(first.span().start, last.span().end);

    if label.is_empty() && built.len() == 1 {
        return Ok(built.pop());
    }

    Ok(Some(ConstituentNode::Phrase {
        label: if label.is_empty() {
            "ROOT".to_string()
        } else {
            label
        },
        span,
        children: built,
    }))
}

/// Parse a bracketed tree, returning it together with its leaf words in order
pub fn parse_bracketed(input: &str) -> Result<(ConstituentNode, Vec<String>)> {
    let lexemes = lex(input);
    if lexemes.is_empty() {
        return Err(ParserError::MalformedTree("empty input".to_string()));
    }

    let mut pos = 0;
    let raw = parse_node(&lexemes, &mut pos)?;
    if pos != lexemes.len() {
        return Err(ParserError::MalformedTree(
            "trailing input after tree".to_string(),
        ));
    }

    let mut next_index = 0;
    let mut leaves = Vec::new();
    let tree = build(raw, &mut next_index, &mut leaves)?
        .ok_or_else(|| ParserError::MalformedTree("tree has no leaves".to_string()))?;

    Ok((tree, leaves))
}
