//! Clause Assembler
//!
//! Merges accepted clauses that ended up with the same span and numbers the
//! survivors in span order.

use rc_core::ClassifiedClause;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseAssembler;

impl ClauseAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Deduplicate and number accepted clauses.
    ///
    /// Among clauses sharing a span the most specific type wins (full, then
    /// reduced, then zero), then the lower relativizer index, then the lower
    /// anchor. Returns the survivors and the number of clauses merged away.
    pub fn assemble(&self, mut clauses: Vec<ClassifiedClause>) -> (Vec<ClassifiedClause>, usize) {
        clauses.sort_by_key(|c| {
            (
                c.span.start,
                c.span.end,
                c.rc_type().rank(),
                c.relativizer().unwrap_or(usize::MAX),
                c.anchor(),
            )
        });

        let before = clauses.len();
        clauses.dedup_by(|later, kept| later.span == kept.span);
        let duplicates = before - clauses.len();

        for (i, clause) in clauses.iter_mut().enumerate() {
            clause.ordinal = Some(i + 1);
        }

        (clauses, duplicates)
    }
}
