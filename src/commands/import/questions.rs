use super::*;

/// Criteria and caveat rows that belong to one question.
#[derive(Debug, Default)]
pub(super) struct QuestionRules<'a> {
    pub(super) criteria: Vec<&'a RawCriterion>,
    pub(super) caveats: Vec<&'a RawCaveat>,
}

/// Why a question did not make it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum QuestionExclusion {
    Untitled,
    TooFewAnswers(usize),
}

#[derive(Debug)]
pub(super) enum AssembledQuestion {
    Emitted(Question),
    Excluded(QuestionExclusion),
}

pub(super) fn assemble_question(
    raw: &RawQuestion,
    rules: &QuestionRules<'_>,
    ctx: &LinkContext<'_>,
    counts: &mut ImportCounts,
) -> Result<AssembledQuestion, IntegrityError> {
    let owner = RecordRef::Question(raw.question_id);

    let Some(title) = ctx
        .lookups
        .optional_attribute(raw.title.as_ref(), &owner)?
        .filter(|title| !title.is_empty())
        .map(ToOwned::to_owned)
    else {
        return Ok(AssembledQuestion::Excluded(QuestionExclusion::Untitled));
    };

    let answers = AnswerSet::from_raw(&raw.valid_answers, ctx.cleaner, ctx.ids);
    if answers.len() < 2 {
        return Ok(AssembledQuestion::Excluded(
            QuestionExclusion::TooFewAnswers(answers.len()),
        ));
    }

    let attributes = ctx.lookups.attribute_texts(&raw.attributes, &owner)?;
    let category = ctx
        .lookups
        .optional_attribute(raw.category.as_ref(), &owner)?
        .unwrap_or_default()
        .to_string();

    let criteria = link_criteria(raw, &answers, &rules.criteria, ctx, counts)?;
    let caveats = link_caveats(raw, &answers, &rules.caveats, ctx, counts)?;
    counts.criteria_linked += criteria.len();
    counts.caveats_linked += caveats.len();

    let domain_logic = assemble_domain_logic(raw.question_id, &title, criteria, caveats)?;

    Ok(AssembledQuestion::Emitted(Question {
        id: ctx.ids.allocate(IdKind::Question, raw.question_id),
        legacy_id: raw.question_id,
        description: join_description(&attributes, &title),
        title,
        category,
        answers: answers.into_answers(),
        domain_logic,
    }))
}
