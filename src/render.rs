use std::io::Write;

use anyhow::Result;

use crate::evaluation::{Evaluation, Severity};
use crate::model::Question;

/// ANSI styling for terminal output; a disabled palette passes text through.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Color unless `--no-color` was passed or `NO_COLOR` is set.
    pub fn from_flag(no_color: bool) -> Self {
        Self::new(!no_color && std::env::var_os("NO_COLOR").is_none())
    }

    fn paint(&self, text: &str, sgr: &str) -> String {
        if self.enabled {
            format!("\x1b[{sgr}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, "1")
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, "2")
    }

    pub fn inverse(&self, text: &str) -> String {
        self.paint(text, "7")
    }

    pub fn severity(&self, text: &str, severity: Severity) -> String {
        let sgr = match severity {
            Severity::Critical => "31;4",
            Severity::Severe => "31",
            Severity::Warning => "33",
            Severity::Neutral => "1",
            Severity::Notice => "35",
            Severity::Favorable => "32",
        };
        self.paint(text, sgr)
    }
}

pub fn write_question<W: Write>(out: &mut W, palette: &Palette, question: &Question) -> Result<()> {
    writeln!(
        out,
        "{}",
        palette.bold(&format!("#{} {}", question.legacy_id, question.title))
    )?;
    if !question.description.is_empty() {
        writeln!(out, "{}", palette.dim(&question.description))?;
    }
    if !question.category.is_empty() {
        writeln!(out, "{}", palette.dim(&format!("Category: {}", question.category)))?;
    }
    for (index, answer) in question.answers.iter().enumerate() {
        writeln!(out, "{index}) {}", answer.title)?;
    }
    Ok(())
}

pub fn write_evaluation<W: Write>(
    out: &mut W,
    palette: &Palette,
    evaluation: &Evaluation<'_>,
) -> Result<()> {
    writeln!(out, "You answered: {}", evaluation.answer.title)?;

    if evaluation.recommendations.is_empty() {
        writeln!(out, "No targets apply to this answer.")?;
        return Ok(());
    }

    writeln!(out, "Based on your answer, the following targets apply:")?;
    for recommendation in &evaluation.recommendations {
        let target = recommendation.target;
        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            palette.inverse(&format!("{} #{}", target.section, target.legacy_id)),
            palette.bold(&target.title)
        )?;
        if !target.description.is_empty() {
            writeln!(out, "{}", target.description)?;
        }
        for caveat in &recommendation.caveats {
            writeln!(
                out,
                "{}",
                palette.severity(
                    &format!("[{}] {}", caveat.severity.as_str(), caveat.title),
                    caveat.severity
                )
            )?;
        }
    }

    Ok(())
}
