use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use tracing::info;
use uuid::Uuid;

use crate::cli::AskArgs;
use crate::evaluation::evaluate;
use crate::model::{DecisionModel, Question};
use crate::render::{Palette, write_evaluation, write_question};
use crate::util::read_json;

pub fn run(args: AskArgs) -> Result<()> {
    let model: DecisionModel = read_json(&args.model)?;
    info!(
        path = %args.model.display(),
        questions = model.questions.len(),
        "loaded decision model"
    );

    let palette = Palette::from_flag(args.no_color);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let summary = run_session(&model, &mut input, &mut output, &palette, random_index)?;
    info!(answered = summary.answered, "session ended");

    Ok(())
}

fn random_index(len: usize) -> usize {
    (Uuid::new_v4().as_u128() % len as u128) as usize
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) answered: usize,
}

enum Step<T> {
    Continue(T),
    EndOfInput,
}

/// Prompt loop: pick a question, read a choice, print recommendations, and
/// repeat until the user declines or input runs out.
pub(crate) fn run_session<R, W>(
    model: &DecisionModel,
    input: &mut R,
    output: &mut W,
    palette: &Palette,
    mut pick_random: impl FnMut(usize) -> usize,
) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
{
    if model.questions.is_empty() {
        bail!("decision model contains no questions");
    }

    let mut summary = SessionSummary::default();

    loop {
        let Step::Continue(question) = select_question(model, input, output, &mut pick_random)?
        else {
            break;
        };

        writeln!(output)?;
        write_question(output, palette, question)?;

        let Step::Continue(choice) = read_choice(question, input, output)? else {
            break;
        };

        let evaluation = evaluate(model, question, choice)?;
        writeln!(output)?;
        write_evaluation(output, palette, &evaluation)?;
        writeln!(output)?;
        summary.answered += 1;

        let Step::Continue(again) = ask_to_continue(input, output)? else {
            break;
        };
        if !again {
            break;
        }
    }

    Ok(summary)
}

fn select_question<'a, R: BufRead, W: Write>(
    model: &'a DecisionModel,
    input: &mut R,
    output: &mut W,
    pick_random: &mut impl FnMut(usize) -> usize,
) -> Result<Step<&'a Question>> {
    loop {
        let Some(reply) = prompt(
            input,
            output,
            "Enter a question id, or press enter to be asked a random question: ",
        )?
        else {
            return Ok(Step::EndOfInput);
        };

        if reply.is_empty() || reply.eq_ignore_ascii_case("random") {
            let index = pick_random(model.questions.len()) % model.questions.len();
            return Ok(Step::Continue(&model.questions[index]));
        }

        let found = reply
            .trim_start_matches('#')
            .parse::<i64>()
            .ok()
            .and_then(|legacy_id| model.question_by_legacy_id(legacy_id));
        match found {
            Some(question) => return Ok(Step::Continue(question)),
            None => writeln!(output, "Question #{reply} not found.")?,
        }
    }
}

fn read_choice<R: BufRead, W: Write>(
    question: &Question,
    input: &mut R,
    output: &mut W,
) -> Result<Step<usize>> {
    let last = question.answers.len().saturating_sub(1);
    loop {
        let Some(reply) = prompt(input, output, &format!("Choice [0-{last}]: "))? else {
            return Ok(Step::EndOfInput);
        };

        if reply.is_empty() {
            return Ok(Step::Continue(0));
        }
        match reply.parse::<usize>() {
            Ok(choice) if choice <= last => return Ok(Step::Continue(choice)),
            _ => writeln!(output, "Choice must be a number between 0 and {last}.")?,
        }
    }
}

fn ask_to_continue<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Step<bool>> {
    loop {
        let Some(reply) = prompt(
            input,
            output,
            "Would you like to answer another question? [Y/n]: ",
        )?
        else {
            return Ok(Step::EndOfInput);
        };

        match reply.to_ascii_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(Step::Continue(true)),
            "n" | "no" => return Ok(Step::Continue(false)),
            _ => writeln!(output, "Must respond yes or no.")?,
        }
    }
}

/// Writes `message` and reads one trimmed line; `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from standard input")?;
    if read == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::model::{Answer, Criterion, DomainLogic, RuleType, Section, SectionLogic, Target};

    fn model() -> DecisionModel {
        let target = Target {
            id: Uuid::new_v4(),
            legacy_id: 47,
            title: "Catch disposal records".to_string(),
            description: String::new(),
            section: Section::Monitoring,
            reference: "Monitoring:47".to_string(),
        };
        let answers: Vec<Answer> = ["No", "Yes"]
            .into_iter()
            .map(|title| Answer {
                id: Uuid::new_v4(),
                title: title.to_string(),
            })
            .collect();
        let logic = DomainLogic {
            monitoring: SectionLogic {
                rule_type: RuleType::Criteria,
                criteria: vec![Criterion {
                    id: Uuid::new_v4(),
                    target: target.id,
                    answers: vec![answers[1].id],
                }],
                caveats: Vec::new(),
            },
            ..DomainLogic::default()
        };
        let observed = Question {
            id: Uuid::new_v4(),
            legacy_id: 7,
            title: "Is catch data collected?".to_string(),
            description: String::new(),
            category: String::new(),
            answers,
            domain_logic: logic,
        };
        let unrelated = Question {
            id: Uuid::new_v4(),
            legacy_id: 8,
            title: "Is there a stock assessment?".to_string(),
            description: String::new(),
            category: String::new(),
            answers: observed.answers.clone(),
            domain_logic: DomainLogic::default(),
        };

        DecisionModel {
            targets: vec![target],
            questions: vec![observed, unrelated],
        }
    }

    fn session(
        model: &DecisionModel,
        input: &str,
        pick_random: impl FnMut(usize) -> usize,
    ) -> (SessionSummary, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let summary = run_session(model, &mut input, &mut output, &Palette::new(false), pick_random)
            .expect("session runs");
        (summary, String::from_utf8(output).expect("utf8 output"))
    }

    fn never_random(_: usize) -> usize {
        panic!("random question should not be requested")
    }

    #[test]
    fn unknown_question_id_reprompts_then_evaluates() {
        let model = model();
        let (summary, output) = session(&model, "42\n#7\n1\nn\n", never_random);

        assert_eq!(summary, SessionSummary { answered: 1 });
        assert!(output.contains("Question #42 not found."));
        assert!(output.contains("#7 Is catch data collected?"));
        assert!(output.contains("You answered: Yes"));
        assert!(output.contains("monitoring #47 Catch disposal records"));
    }

    #[test]
    fn blank_question_id_picks_random_question() {
        let model = model();
        let mut requested = Vec::new();
        let (summary, output) = session(&model, "\n0\ny\n", |len| {
            requested.push(len);
            1
        });

        assert_eq!(requested, vec![2]);
        assert_eq!(summary.answered, 1);
        assert!(output.contains("#8 Is there a stock assessment?"));
        assert!(output.contains("No targets apply to this answer."));
    }

    #[test]
    fn invalid_replies_are_rejected_until_valid() {
        let model = model();
        let (summary, output) = session(&model, "7\n5\nabc\n\nmaybe\nno\n", never_random);

        assert_eq!(summary.answered, 1);
        assert_eq!(
            output.matches("Choice must be a number between 0 and 1.").count(),
            2
        );
        assert!(output.contains("You answered: No"));
        assert!(output.contains("Must respond yes or no."));
    }

    #[test]
    fn end_of_input_ends_the_session() {
        let model = model();
        let (summary, _) = session(&model, "7\n", never_random);
        assert_eq!(summary.answered, 0);

        let (summary, _) = session(&model, "", never_random);
        assert_eq!(summary.answered, 0);
    }

    #[test]
    fn empty_model_is_rejected() {
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let err = run_session(
            &DecisionModel::default(),
            &mut input,
            &mut output,
            &Palette::new(false),
            never_random,
        )
        .expect_err("no questions to ask");
        assert!(err.to_string().contains("no questions"));
    }
}
