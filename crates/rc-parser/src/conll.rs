//! CoNLL-X / CoNLL-U reader

use crate::{ParserError, RawArc, Result};

/// Parse CoNLL text for a single sentence into 1-based arcs.
///
/// Comment lines, multi-word token ranges (`3-4`) and empty nodes (`5.1`)
/// are skipped. The fine-grained tag column is preferred; the coarse one is
/// used when it is `_`.
pub fn parse_conll(text: &str) -> Result<Vec<RawArc>> {
    let mut arcs = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            fields = line.split_whitespace().collect();
        }
        if fields.len() < 8 {
            return Err(ParserError::MalformedDependency(format!(
                "line {}: expected at least 8 columns, found {}",
                line_no + 1,
                fields.len()
            )));
        }

        let id = fields[0];
        if id.contains('-') || id.contains('.') {
            continue;
        }
        let id: usize = id.parse().map_err(|_| {
            ParserError::MalformedDependency(format!("line {}: bad id {:?}", line_no + 1, id))
        })?;
        if id != arcs.len() + 1 {
            return Err(ParserError::MalformedDependency(format!(
                "line {}: expected id {}, found {}",
                line_no + 1,
                arcs.len() + 1,
                id
            )));
        }

        let head: usize = fields[6].parse().map_err(|_| {
            ParserError::MalformedDependency(format!(
                "line {}: bad head {:?}",
                line_no + 1,
                fields[6]
            ))
        })?;
        let pos = if fields[4] != "_" { fields[4] } else { fields[3] };

        arcs.push(RawArc::new(fields[1], pos, head, fields[7]));
    }

    Ok(arcs)
}
