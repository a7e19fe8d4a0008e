use super::*;

#[derive(Debug)]
pub(super) struct Normalized {
    pub(super) model: DecisionModel,
    pub(super) counts: ImportCounts,
}

/// Runs the whole transform over fully loaded tables. Either every record is
/// consistent and a complete model comes back, or the first integrity error
/// aborts the run.
pub(super) fn normalize(tables: &SourceTables) -> Result<Normalized> {
    let cleaner = AnswerCleaner::new()?;
    let ids = IdAllocator::new();
    let lookups = Lookups::build(tables)?;
    let mut counts = ImportCounts::default();

    let (targets, target_index) = build_targets(&tables.targets, &lookups, &ids, &mut counts)?;
    let mut rules_by_question = group_rules(tables)?;

    let ctx = LinkContext {
        lookups: &lookups,
        targets: &target_index,
        cleaner: &cleaner,
        ids: &ids,
    };

    let mut questions = Vec::with_capacity(tables.questions.len());
    for raw in &tables.questions {
        counts.questions_read += 1;
        let rules = rules_by_question
            .remove(&raw.question_id)
            .unwrap_or_default();

        match assemble_question(raw, &rules, &ctx, &mut counts)? {
            AssembledQuestion::Emitted(question) => {
                counts.questions_emitted += 1;
                questions.push(question);
            }
            AssembledQuestion::Excluded(reason) => {
                counts.rules_skipped_excluded_question += rules.criteria.len() + rules.caveats.len();
                match reason {
                    QuestionExclusion::Untitled => {
                        counts.questions_excluded_untitled += 1;
                        warn!(question_id = raw.question_id, "excluding question without a title");
                    }
                    QuestionExclusion::TooFewAnswers(answer_count) => {
                        counts.questions_excluded_too_few_answers += 1;
                        warn!(
                            question_id = raw.question_id,
                            answer_count, "excluding question with fewer than two answers"
                        );
                    }
                }
            }
        }
    }

    debug!(keyed_ids = ids.keyed_len(), "allocated legacy identifiers");
    info!(
        targets = counts.targets_emitted,
        targets_excluded = counts.targets_excluded_untitled,
        questions = counts.questions_emitted,
        questions_excluded =
            counts.questions_excluded_untitled + counts.questions_excluded_too_few_answers,
        criteria = counts.criteria_linked,
        caveats = counts.caveats_linked,
        "normalized decision tree"
    );

    Ok(Normalized {
        model: DecisionModel { targets, questions },
        counts,
    })
}

/// Buckets criteria and caveat rows by question, rejecting rows that point at
/// a question id the questions table does not have.
fn group_rules(tables: &SourceTables) -> Result<HashMap<i64, QuestionRules<'_>>, IntegrityError> {
    let mut grouped = HashMap::<i64, QuestionRules<'_>>::with_capacity(tables.questions.len());

    for question in &tables.questions {
        if grouped
            .insert(question.question_id, QuestionRules::default())
            .is_some()
        {
            return Err(IntegrityError::DuplicateKey {
                table: "question",
                key: question.question_id.to_string(),
            });
        }
    }

    for criterion in &tables.criteria {
        grouped
            .get_mut(&criterion.question_id)
            .ok_or(IntegrityError::UnknownQuestion {
                table: "criteria",
                question_id: criterion.question_id,
                target_id: criterion.target_id,
            })?
            .criteria
            .push(criterion);
    }

    for caveat in &tables.caveats {
        grouped
            .get_mut(&caveat.question_id)
            .ok_or(IntegrityError::UnknownQuestion {
                table: "caveats",
                question_id: caveat.question_id,
                target_id: caveat.target_id,
            })?
            .caveats
            .push(caveat);
    }

    Ok(grouped)
}
