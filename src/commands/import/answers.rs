use super::*;

/// Strips spreadsheet ordinal markers such as `"2-"` or `"3 - "` from the
/// front of an answer.
#[derive(Debug)]
pub(super) struct AnswerCleaner {
    ordinal_prefix: Regex,
}

impl AnswerCleaner {
    pub(super) fn new() -> Result<Self> {
        let ordinal_prefix =
            Regex::new(r"^\s*\d+\s*-*\s*").context("failed to compile answer ordinal regex")?;
        Ok(Self { ordinal_prefix })
    }

    /// An answer that is nothing but a number (`"10"`) keeps its text.
    pub(super) fn clean(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let stripped = self.ordinal_prefix.replace(raw, "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            Some(raw.to_string())
        } else {
            Some(stripped.to_string())
        }
    }
}

/// A question's processed answers, remembering which raw `ValidAnswers`
/// entry each one came from.
#[derive(Debug)]
pub(super) struct AnswerSet {
    answers: Vec<Answer>,
    raw_positions: Vec<usize>,
}

impl AnswerSet {
    pub(super) fn from_raw(
        raw_answers: &[Option<String>],
        cleaner: &AnswerCleaner,
        ids: &IdAllocator,
    ) -> Self {
        let mut answers = Vec::with_capacity(raw_answers.len());
        let mut raw_positions = Vec::with_capacity(raw_answers.len());

        for (raw_index, raw) in raw_answers.iter().enumerate() {
            let Some(title) = raw.as_deref().and_then(|raw| cleaner.clean(raw)) else {
                continue;
            };
            answers.push(Answer {
                id: ids.fresh(),
                title,
            });
            raw_positions.push(raw_index);
        }

        Self {
            answers,
            raw_positions,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.answers.len()
    }

    /// Position of the processed answer produced from raw entry `raw_index`.
    pub(super) fn position_of_raw(&self, raw_index: usize) -> Option<usize> {
        self.raw_positions
            .iter()
            .position(|&position| position == raw_index)
    }

    /// Identifiers of the answers from `position` to the end.
    pub(super) fn suffix_ids(&self, position: usize) -> Vec<Uuid> {
        self.answers[position..]
            .iter()
            .map(|answer| answer.id)
            .collect()
    }

    /// Answers produced from a raw `ValidAnswers` entry equal to `text`.
    pub(super) fn matching_raw<'a>(
        &'a self,
        raw_answers: &[Option<String>],
        text: &str,
    ) -> Vec<&'a Answer> {
        raw_answers
            .iter()
            .enumerate()
            .filter(|(_, raw)| raw.as_deref().map(str::trim) == Some(text))
            .filter_map(|(raw_index, _)| self.position_of_raw(raw_index))
            .map(|position| &self.answers[position])
            .collect()
    }

    pub(super) fn matching(&self, title: &str) -> Vec<&Answer> {
        self.answers
            .iter()
            .filter(|answer| answer.title == title)
            .collect()
    }

    pub(super) fn into_answers(self) -> Vec<Answer> {
        self.answers
    }
}
