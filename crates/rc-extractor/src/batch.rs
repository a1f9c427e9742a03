//! Batch runner
//!
//! Adapts and analyzes many sentences concurrently on the blocking pool.
//! Results come back in input order no matter which task finishes first, and
//! a failing sentence is recorded as skipped instead of ending the run.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use futures::stream::{self, StreamExt};
use rc_core::{AppConfig, ClauseRecord, ParsedSentence, RcError, SkipReason};
use rc_parser::{DependencyInput, RawArc, TreeAdapter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pipeline::RelativeClauseExtractor;
use crate::{ClauseExtractor, SentenceAnalysis};

// ============================================================================
// Input
// ============================================================================

/// One pre-parsed sentence, as emitted by the parsing collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceInput {
    /// Source identifier, usually a file name
    pub source: String,
    pub text: String,
    /// Dependency arcs, 1-based heads
    pub dependency: Option<Vec<RawArc>>,
    /// Dependency parse as CoNLL text, used when `dependency` is absent
    pub conll: Option<String>,
    /// Bracketed constituency tree
    pub constituency: Option<String>,
}

impl SentenceInput {
    /// Dependency parse to adapt, arcs before CoNLL text
    pub fn dependency_input(&self) -> Option<DependencyInput<'_>> {
        match (&self.dependency, &self.conll) {
            (Some(arcs), _) => Some(DependencyInput::Arcs(arcs)),
            (None, Some(conll)) => Some(DependencyInput::Conll(conll)),
            (None, None) => None,
        }
    }
}

/// A line of the input file, either parsed or the reason it was not
pub type InputLine = std::result::Result<SentenceInput, String>;

/// Parse JSON Lines input, one entry per non-empty line
pub fn parse_input_lines(content: &str) -> Vec<InputLine> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|e| format!("invalid input record: {e}")))
        .collect()
}

/// Read a JSON Lines input file
pub async fn load_inputs(path: &Path) -> rc_core::Result<Vec<InputLine>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_input_lines(&content))
}

// ============================================================================
// Outcome
// ============================================================================

/// What happened to one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceOutcome {
    Processed {
        position: usize,
        source: String,
        sentence: ParsedSentence,
        analysis: SentenceAnalysis,
        /// Why the constituency tree was dropped, if it was
        degraded: Option<SkipReason>,
    },
    Skipped {
        position: usize,
        source: String,
        reason: SkipReason,
        message: String,
    },
}

impl SentenceOutcome {
    pub fn position(&self) -> usize {
        match self {
            Self::Processed { position, .. } | Self::Skipped { position, .. } => *position,
        }
    }

    /// Export rows for the accepted clauses
    pub fn records(&self) -> Vec<ClauseRecord> {
        match self {
            Self::Processed {
                position,
                source,
                sentence,
                analysis,
                ..
            } => analysis
                .accepted
                .iter()
                .map(|clause| ClauseRecord::new(source.as_str(), *position, sentence, clause))
                .collect(),
            Self::Skipped { .. } => Vec::new(),
        }
    }
}

fn skip_reason_for(err: &RcError) -> SkipReason {
    match err {
        RcError::Alignment(_) => SkipReason::Alignment,
        RcError::ParserUnavailable(_) => SkipReason::ParserUnavailable,
        RcError::InvalidSentence(_) => SkipReason::MalformedDependency,
        _ => SkipReason::Internal,
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs the extractor over a batch of sentences
pub struct BatchRunner {
    extractor: Arc<RelativeClauseExtractor>,
    adapter: TreeAdapter,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(
        extractor: RelativeClauseExtractor,
        adapter: TreeAdapter,
        concurrency: usize,
    ) -> Self {
        Self {
            extractor: Arc::new(extractor),
            adapter,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            RelativeClauseExtractor::from_config(config),
            TreeAdapter::new(config.batch.alignment),
            config.batch.effective_concurrency(),
        )
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process one sentence synchronously
    pub fn process(
        extractor: &RelativeClauseExtractor,
        adapter: &TreeAdapter,
        position: usize,
        input: InputLine,
    ) -> SentenceOutcome {
        let input = match input {
            Ok(input) => input,
            Err(message) => {
                return SentenceOutcome::Skipped {
                    position,
                    source: String::new(),
                    reason: SkipReason::ParserUnavailable,
                    message,
                }
            }
        };

        let adapted = match adapter.adapt(
            &input.text,
            input.dependency_input(),
            input.constituency.as_deref(),
        ) {
            Ok(adapted) => adapted,
            Err(err) => {
                return SentenceOutcome::Skipped {
                    position,
                    source: input.source,
                    reason: err.skip_reason(),
                    message: err.to_string(),
                }
            }
        };

        match extractor.extract(&adapted.sentence) {
            Ok(analysis) => SentenceOutcome::Processed {
                position,
                source: input.source,
                sentence: adapted.sentence,
                analysis,
                degraded: adapted.degraded.map(|e| e.skip_reason()),
            },
            Err(err) => SentenceOutcome::Skipped {
                position,
                source: input.source,
                reason: skip_reason_for(&err),
                message: err.to_string(),
            },
        }
    }

    /// Process a batch, preserving input order
    pub async fn run(&self, inputs: Vec<InputLine>) -> Vec<SentenceOutcome> {
        info!(
            sentences = inputs.len(),
            concurrency = self.concurrency,
            "starting extraction batch"
        );

        let tasks = inputs.into_iter().enumerate().map(|(position, input)| {
            let extractor = Arc::clone(&self.extractor);
            let adapter = self.adapter;
            let source = input
                .as_ref()
                .map(|i| i.source.clone())
                .unwrap_or_default();

            async move {
                let handle = tokio::task::spawn_blocking(move || {
                    Self::process(&extractor, &adapter, position, input)
                });
                match handle.await {
                    Ok(outcome) => outcome,
                    Err(err) => SentenceOutcome::Skipped {
                        position,
                        source,
                        reason: SkipReason::Internal,
                        message: format!("sentence task failed: {err}"),
                    },
                }
            }
        });

        let outcomes: Vec<SentenceOutcome> = stream::iter(tasks)
            .buffered(self.concurrency)
            .inspect(|outcome| {
                if let SentenceOutcome::Skipped {
                    position,
                    reason,
                    message,
                    ..
                } = outcome
                {
                    warn!(position, reason = %reason, "skipped sentence: {}", message);
                }
            })
            .collect()
            .await;

        info!(sentences = outcomes.len(), "finished extraction batch");
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::AlignmentPolicy;
    use std::io::Write;

    fn line(text: &str, arcs: Vec<RawArc>, tree: Option<&str>) -> InputLine {
        Ok(SentenceInput {
            source: "test".to_string(),
            text: text.to_string(),
            dependency: Some(arcs),
            conll: None,
            constituency: tree.map(str::to_string),
        })
    }

    fn book_arcs() -> Vec<RawArc> {
        vec![
            RawArc::new("The", "DT", 2, "det"),
            RawArc::new("book", "NN", 6, "nsubj"),
            RawArc::new("that", "WDT", 5, "dobj"),
            RawArc::new("I", "PRP", 5, "nsubj"),
            RawArc::new("read", "VBD", 2, "rcmod"),
            RawArc::new("was", "VBD", 0, "root"),
            RawArc::new("good", "JJ", 6, "acomp"),
        ]
    }

    const ONE_TOKEN: &str = concat!(
        r#"{"source":"a","text":"x","#,
        r#""dependency":[{"form":"x","pos":"NN","head":0,"deprel":"root"}]}"#
    );

    #[test]
    fn test_parse_input_lines() {
        let content = format!(
            "{ONE_TOKEN}\n\nnot json\n{}",
            r#"{"source":"b","conll":"1\tx\tx\tNN\tNN\t_\t0\troot\t_\t_"}"#
        );
        let lines = parse_input_lines(&content);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].is_ok());
        assert!(lines[1].is_err());
        assert_eq!(lines[2].as_ref().map(|i| i.source.as_str()), Ok("b"));
    }

    #[tokio::test]
    async fn test_load_inputs_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{ONE_TOKEN}").unwrap();
        writeln!(file, "{{broken").unwrap();

        let lines = load_inputs(file.path()).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].is_ok());
        assert!(lines[1].is_err());

        let missing = load_inputs(Path::new("/nonexistent/input.jsonl")).await;
        assert!(missing.is_err());
    }

    #[test]
    fn test_process_skips_unusable_input() {
        let extractor = RelativeClauseExtractor::new();
        let adapter = TreeAdapter::default();

        let outcome = BatchRunner::process(&extractor, &adapter, 0, Err("bad".to_string()));
        assert!(matches!(
            outcome,
            SentenceOutcome::Skipped {
                reason: SkipReason::ParserUnavailable,
                ..
            }
        ));

        let no_parse = Ok(SentenceInput {
            text: "nothing".to_string(),
            ..Default::default()
        });
        let outcome = BatchRunner::process(&extractor, &adapter, 1, no_parse);
        assert!(matches!(
            outcome,
            SentenceOutcome::Skipped {
                reason: SkipReason::ParserUnavailable,
                position: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_preserves_order_and_survives_failures() {
        let runner = BatchRunner::new(
            RelativeClauseExtractor::new(),
            TreeAdapter::new(AlignmentPolicy::Strict),
            4,
        );

        let mut inputs = Vec::new();
        for i in 0..12 {
            if i % 5 == 3 {
                inputs.push(Err(format!("broken line {i}")));
            } else {
                inputs.push(line("The book that I read was good", book_arcs(), None));
            }
        }

        let outcomes = runner.run(inputs).await;
        let positions: Vec<usize> = outcomes.iter().map(SentenceOutcome::position).collect();
        assert_eq!(positions, (0..12).collect::<Vec<_>>());

        let skipped = outcomes
            .iter()
            .filter(|o| matches!(o, SentenceOutcome::Skipped { .. }))
            .count();
        assert_eq!(skipped, 2);
        assert_eq!(outcomes[0].records().len(), 1);
        assert_eq!(outcomes[0].records()[0].rc_content, "that I read");
    }

    #[test]
    fn test_dependency_only_marks_degraded() {
        let extractor = RelativeClauseExtractor::new();
        let adapter = TreeAdapter::new(AlignmentPolicy::DependencyOnly);
        let outcome = BatchRunner::process(
            &extractor,
            &adapter,
            0,
            line(
                "The book that I read was good",
                book_arcs(),
                Some("(S (NP (DT The) (NN book)))"),
            ),
        );
        match outcome {
            SentenceOutcome::Processed {
                degraded, analysis, ..
            } => {
                assert_eq!(degraded, Some(SkipReason::Alignment));
                assert_eq!(analysis.accepted.len(), 1);
            }
            other => panic!("expected processed sentence, got {other:?}"),
        }
    }
}
