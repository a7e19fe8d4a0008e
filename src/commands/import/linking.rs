use crate::model::SectionLogic;

use super::*;

/// Shared, read-only state for linking one question's rules.
pub(super) struct LinkContext<'a> {
    pub(super) lookups: &'a Lookups,
    pub(super) targets: &'a TargetIndex,
    pub(super) cleaner: &'a AnswerCleaner,
    pub(super) ids: &'a IdAllocator,
}

/// Rules of one kind split by the section of the target they point at.
#[derive(Debug)]
pub(super) struct SectionRules<T> {
    monitoring: Vec<T>,
    assessment: Vec<T>,
    control_rules: Vec<T>,
}

impl<T> Default for SectionRules<T> {
    fn default() -> Self {
        Self {
            monitoring: Vec::new(),
            assessment: Vec::new(),
            control_rules: Vec::new(),
        }
    }
}

impl<T> SectionRules<T> {
    fn slot(&mut self, section: Section) -> &mut Vec<T> {
        match section {
            Section::Monitoring => &mut self.monitoring,
            Section::Assessment => &mut self.assessment,
            Section::ControlRules => &mut self.control_rules,
        }
    }

    pub(super) fn push(&mut self, section: Section, rule: T) {
        self.slot(section).push(rule);
    }

    pub(super) fn take(&mut self, section: Section) -> Vec<T> {
        std::mem::take(self.slot(section))
    }

    pub(super) fn len(&self) -> usize {
        self.monitoring.len() + self.assessment.len() + self.control_rules.len()
    }
}

pub(super) fn link_criteria(
    question: &RawQuestion,
    answers: &AnswerSet,
    rows: &[&RawCriterion],
    ctx: &LinkContext<'_>,
    counts: &mut ImportCounts,
) -> Result<SectionRules<Criterion>, IntegrityError> {
    let owner = RecordRef::Question(question.question_id);
    let mut rules = SectionRules::default();

    for row in rows {
        let resolution = ctx.targets.resolve(row.target_id, &owner)?;

        let threshold_not_found = || IntegrityError::ThresholdNotFound {
            question_id: question.question_id,
            target_id: row.target_id,
            threshold: row.threshold.clone(),
        };
        let raw_index = question
            .valid_answers
            .iter()
            .position(|answer| answer.as_deref() == Some(row.threshold.as_str()))
            .ok_or_else(threshold_not_found)?;
        let position = answers
            .position_of_raw(raw_index)
            .ok_or_else(threshold_not_found)?;

        let TargetResolution::Linked { id, section } = resolution else {
            debug!(
                question_id = question.question_id,
                target_id = row.target_id,
                "dropping criterion on excluded target"
            );
            counts.rules_dropped_excluded_target += 1;
            continue;
        };

        rules.push(
            section,
            Criterion {
                id: ctx.ids.fresh(),
                target: id,
                answers: answers.suffix_ids(position),
            },
        );
    }

    Ok(rules)
}

/// Answer strings collected per note, in first-seen order.
type NoteAnswers = Vec<(Code, Vec<String>)>;

pub(super) fn link_caveats(
    question: &RawQuestion,
    answers: &AnswerSet,
    rows: &[&RawCaveat],
    ctx: &LinkContext<'_>,
    counts: &mut ImportCounts,
) -> Result<SectionRules<Caveat>, IntegrityError> {
    let owner = RecordRef::Question(question.question_id);
    let mut rules = SectionRules::default();

    for (target_id, notes) in group_caveat_rows(rows) {
        let resolution = ctx.targets.resolve(target_id, &owner)?;

        for (note_id, answer_texts) in notes {
            let note = ctx.lookups.note(&note_id, &owner)?;
            let answer_ids = match_caveat_answers(
                question.question_id,
                target_id,
                &answer_texts,
                &question.valid_answers,
                answers,
                ctx.cleaner,
            )?;

            let TargetResolution::Linked { id, section } = resolution else {
                debug!(
                    question_id = question.question_id,
                    target_id,
                    note_id = %note_id,
                    "dropping caveat on excluded target"
                );
                counts.rules_dropped_excluded_target += 1;
                continue;
            };

            rules.push(
                section,
                Caveat {
                    id: ctx.ids.fresh(),
                    title: note.title,
                    score: note.score,
                    target: id,
                    answers: answer_ids,
                },
            );
        }
    }

    Ok(rules)
}

/// Groups caveat rows by target and then by note, so one note that applies to
/// several answers becomes a single caveat. Entries without a note are
/// ignored; a note with only null answers still yields a caveat.
fn group_caveat_rows(rows: &[&RawCaveat]) -> Vec<(i64, NoteAnswers)> {
    let mut groups: Vec<(i64, NoteAnswers)> = Vec::new();

    for row in rows {
        let group = match groups
            .iter()
            .position(|(target_id, _)| *target_id == row.target_id)
        {
            Some(position) => position,
            None => {
                groups.push((row.target_id, Vec::new()));
                groups.len() - 1
            }
        };
        let notes = &mut groups[group].1;

        for entry in &row.answers {
            let Some(note_id) = entry.note_id.as_ref().filter(|note_id| !note_id.is_blank())
            else {
                continue;
            };
            let note = match notes.iter().position(|(id, _)| id == note_id) {
                Some(position) => position,
                None => {
                    notes.push((note_id.clone(), Vec::new()));
                    notes.len() - 1
                }
            };
            if let Some(answer) = entry
                .answer
                .as_deref()
                .map(str::trim)
                .filter(|answer| !answer.is_empty())
            {
                notes[note].1.push(answer.to_string());
            }
        }
    }

    groups
}

/// Maps caveat answer strings onto processed answers: the raw `ValidAnswers`
/// entry first, then the processed title, then the text with its ordinal
/// marker stripped. Each string must identify exactly one answer.
fn match_caveat_answers(
    question_id: i64,
    target_id: i64,
    texts: &[String],
    raw_answers: &[Option<String>],
    answers: &AnswerSet,
    cleaner: &AnswerCleaner,
) -> Result<Vec<Uuid>, IntegrityError> {
    let mut ids = Vec::with_capacity(texts.len());

    for text in texts {
        let mut matches = answers.matching_raw(raw_answers, text);
        if matches.is_empty() {
            matches = answers.matching(text);
        }
        if matches.is_empty()
            && let Some(cleaned) = cleaner.clean(text)
        {
            matches = answers.matching(&cleaned);
        }

        match matches.as_slice() {
            [] => {
                return Err(IntegrityError::UnmatchedCaveatAnswer {
                    question_id,
                    target_id,
                    answer: text.clone(),
                });
            }
            [answer] => {
                if !ids.contains(&answer.id) {
                    ids.push(answer.id);
                }
            }
            _ => {
                return Err(IntegrityError::AmbiguousAnswer {
                    question_id,
                    target_id,
                    answer: text.clone(),
                    matches: matches.len(),
                });
            }
        }
    }

    Ok(ids)
}

/// Combines both rule kinds into per-section logic, rejecting any section that
/// has both.
pub(super) fn assemble_domain_logic(
    question_id: i64,
    title: &str,
    mut criteria: SectionRules<Criterion>,
    mut caveats: SectionRules<Caveat>,
) -> Result<DomainLogic, IntegrityError> {
    let mut logic = DomainLogic::default();

    for section in Section::ALL {
        let section_criteria = criteria.take(section);
        let section_caveats = caveats.take(section);

        let rule_type = match (section_criteria.is_empty(), section_caveats.is_empty()) {
            (false, false) => {
                return Err(IntegrityError::MixedSectionRules {
                    question_id,
                    title: title.to_string(),
                    section,
                });
            }
            (false, true) => RuleType::Criteria,
            (true, false) => RuleType::Caveats,
            (true, true) => RuleType::None,
        };

        *logic.section_mut(section) = SectionLogic {
            rule_type,
            criteria: section_criteria,
            caveats: section_caveats,
        };
    }

    Ok(logic)
}
