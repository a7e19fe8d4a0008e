use thiserror::Error;

use super::*;

/// The record an integrity failure was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RecordRef {
    Target(i64),
    Question(i64),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(id) => write!(f, "target {id}"),
            Self::Question(id) => write!(f, "question {id}"),
        }
    }
}

/// Cross-table inconsistencies in the source export. Any of these aborts the
/// import before output is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(super) enum IntegrityError {
    #[error("duplicate {table} key {key}")]
    DuplicateKey { table: &'static str, key: String },

    #[error("{owner} references attribute {code} which is not in the attribute table")]
    MissingAttribute { owner: RecordRef, code: Code },

    #[error("{owner} references note {note} which is not in the notes table")]
    MissingNote { owner: RecordRef, note: Code },

    #[error("note {note} uses color {color:?} which is not in the color map")]
    MissingColor { note: Code, color: String },

    #[error("{owner} references target {target_id} which is not in the targets table")]
    UnknownTarget { owner: RecordRef, target_id: i64 },

    #[error("{table} row for target {target_id} references question {question_id} which is not in the questions table")]
    UnknownQuestion {
        table: &'static str,
        question_id: i64,
        target_id: i64,
    },

    #[error("target {target_id} has reference {reference:?} that does not start with a known section")]
    UnknownSection { target_id: i64, reference: String },

    #[error(
        "question {question_id}: threshold {threshold:?} for target {target_id} is not one of its valid answers"
    )]
    ThresholdNotFound {
        question_id: i64,
        target_id: i64,
        threshold: String,
    },

    #[error(
        "question {question_id}: caveat answer {answer:?} for target {target_id} does not match any answer"
    )]
    UnmatchedCaveatAnswer {
        question_id: i64,
        target_id: i64,
        answer: String,
    },

    #[error(
        "question {question_id}: caveat answer {answer:?} for target {target_id} matches {matches} answers"
    )]
    AmbiguousAnswer {
        question_id: i64,
        target_id: i64,
        answer: String,
        matches: usize,
    },

    #[error("both criteria and caveats specified for {section} in question {question_id} ({title})")]
    MixedSectionRules {
        question_id: i64,
        title: String,
        section: Section,
    },
}
