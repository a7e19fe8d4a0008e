use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::EvaluateArgs;
use crate::evaluation::evaluate;
use crate::model::DecisionModel;
use crate::render::{Palette, write_evaluation, write_question};
use crate::util::read_json;

pub fn run(args: EvaluateArgs) -> Result<()> {
    let model: DecisionModel = read_json(&args.model)?;
    info!(
        path = %args.model.display(),
        questions = model.questions.len(),
        "loaded decision model"
    );

    let question = model
        .question_by_legacy_id(args.question)
        .with_context(|| {
            format!(
                "question {} not found in {}",
                args.question,
                args.model.display()
            )
        })?;
    let evaluation = evaluate(&model, question, args.choice)?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &evaluation)
            .context("failed to serialize evaluation json output")?;
        writeln!(output)?;
    } else {
        let palette = Palette::from_flag(args.no_color);
        write_question(&mut output, &palette, question)?;
        writeln!(output)?;
        write_evaluation(&mut output, &palette, &evaluation)?;
    }
    output.flush()?;

    Ok(())
}
