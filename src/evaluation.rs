use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Answer, Caveat, Criterion, DecisionModel, Question, Section, Target};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("choice {choice} is out of range for question {question_id} ({answer_count} answers)")]
    InvalidChoice {
        question_id: i64,
        choice: usize,
        answer_count: usize,
    },

    #[error("question {question_id} references target {target} which is not in the model")]
    UnknownTarget { question_id: i64, target: Uuid },
}

/// Presentation bucket for a caveat's severity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Severe,
    Warning,
    Neutral,
    Notice,
    Favorable,
}

impl Severity {
    pub fn from_score(score: i64) -> Self {
        match score {
            -3 => Self::Critical,
            -2 => Self::Severe,
            -1 => Self::Warning,
            1 => Self::Notice,
            2 => Self::Favorable,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Severe => "severe",
            Self::Warning => "warning",
            Self::Neutral => "neutral",
            Self::Notice => "notice",
            Self::Favorable => "favorable",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CaveatNote<'a> {
    pub title: &'a str,
    pub score: i64,
    pub severity: Severity,
}

impl<'a> CaveatNote<'a> {
    fn from_caveat(caveat: &'a Caveat) -> Self {
        Self {
            title: &caveat.title,
            score: caveat.score,
            severity: Severity::from_score(caveat.score),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation<'a> {
    pub target: &'a Target,
    /// Threshold of the criterion that selected this target, if any.
    pub threshold: Option<usize>,
    pub caveats: Vec<CaveatNote<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation<'a> {
    pub question_id: i64,
    pub question: &'a str,
    pub choice: usize,
    pub answer: &'a Answer,
    pub recommendations: Vec<Recommendation<'a>>,
}

/// Index of the first answer a criterion covers.
pub fn criterion_threshold(question: &Question, criterion: &Criterion) -> Option<usize> {
    criterion
        .answers
        .first()
        .and_then(|answer_id| question.answer_index(*answer_id))
}

/// Recommends targets for answer `choice` of `question`.
///
/// Caveats apply when they list the chosen answer. For criteria, each target
/// takes the criterion with the highest threshold that does not exceed
/// `choice`. Targets come back ordered by section, then title.
pub fn evaluate<'a>(
    model: &'a DecisionModel,
    question: &'a Question,
    choice: usize,
) -> Result<Evaluation<'a>, EvaluationError> {
    let answer = question
        .answers
        .get(choice)
        .ok_or(EvaluationError::InvalidChoice {
            question_id: question.legacy_id,
            choice,
            answer_count: question.answers.len(),
        })?;

    let mut caveats_by_target = HashMap::<Uuid, Vec<&Caveat>>::new();
    let mut criteria_by_target = HashMap::<Uuid, usize>::new();
    let mut order = Vec::<Uuid>::new();
    let mut seen = HashSet::<Uuid>::new();

    for section in Section::ALL {
        let logic = question.domain_logic.section(section);

        for caveat in &logic.caveats {
            if caveat.answers.contains(&answer.id) {
                caveats_by_target.entry(caveat.target).or_default().push(caveat);
                if seen.insert(caveat.target) {
                    order.push(caveat.target);
                }
            }
        }

        for criterion in &logic.criteria {
            let Some(threshold) = criterion_threshold(question, criterion) else {
                continue;
            };
            if threshold > choice {
                continue;
            }
            let best = criteria_by_target.entry(criterion.target).or_insert(threshold);
            if threshold > *best {
                *best = threshold;
            }
            if seen.insert(criterion.target) {
                order.push(criterion.target);
            }
        }
    }

    let mut recommendations = Vec::with_capacity(order.len());
    for target_id in order {
        let target = model
            .target(target_id)
            .ok_or(EvaluationError::UnknownTarget {
                question_id: question.legacy_id,
                target: target_id,
            })?;

        recommendations.push(Recommendation {
            target,
            threshold: criteria_by_target.get(&target_id).copied(),
            caveats: caveats_by_target
                .remove(&target_id)
                .unwrap_or_default()
                .into_iter()
                .map(CaveatNote::from_caveat)
                .collect(),
        });
    }

    recommendations.sort_by(|a, b| {
        a.target
            .section
            .cmp(&b.target.section)
            .then_with(|| a.target.title.cmp(&b.target.title))
            .then(a.target.legacy_id.cmp(&b.target.legacy_id))
    });

    Ok(Evaluation {
        question_id: question.legacy_id,
        question: &question.title,
        choice,
        answer,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DomainLogic, RuleType, SectionLogic};

    fn target(legacy_id: i64, title: &str, section: Section) -> Target {
        Target {
            id: Uuid::new_v4(),
            legacy_id,
            title: title.to_string(),
            description: String::new(),
            section,
            reference: format!("{section}:{legacy_id}"),
        }
    }

    fn answers(titles: &[&str]) -> Vec<Answer> {
        titles
            .iter()
            .map(|title| Answer {
                id: Uuid::new_v4(),
                title: (*title).to_string(),
            })
            .collect()
    }

    fn criterion(target: &Target, answers: &[Answer]) -> Criterion {
        Criterion {
            id: Uuid::new_v4(),
            target: target.id,
            answers: answers.iter().map(|answer| answer.id).collect(),
        }
    }

    fn question(answers: Vec<Answer>, domain_logic: DomainLogic) -> Question {
        Question {
            id: Uuid::new_v4(),
            legacy_id: 7,
            title: "Is there an observer program?".to_string(),
            description: String::new(),
            category: "Data".to_string(),
            answers,
            domain_logic,
        }
    }

    #[test]
    fn severity_buckets_follow_score() {
        let buckets: Vec<&str> = (-4..=3)
            .map(|score| Severity::from_score(score).as_str())
            .collect();
        assert_eq!(
            buckets,
            vec![
                "neutral",
                "critical",
                "severe",
                "warning",
                "neutral",
                "notice",
                "favorable",
                "neutral",
            ]
        );
    }

    #[test]
    fn highest_threshold_not_above_choice_wins() {
        let rule = target(30, "Harvest control rule", Section::ControlRules);
        let answers = answers(&["No", "Partial", "Yes"]);
        let logic = DomainLogic {
            control_rules: SectionLogic {
                rule_type: RuleType::Criteria,
                criteria: vec![
                    criterion(&rule, &answers[0..]),
                    criterion(&rule, &answers[1..]),
                    criterion(&rule, &answers[2..]),
                ],
                caveats: Vec::new(),
            },
            ..DomainLogic::default()
        };
        let question = question(answers, logic);
        let model = DecisionModel {
            targets: vec![rule],
            questions: Vec::new(),
        };

        let evaluation = evaluate(&model, &question, 1).expect("choice in range");
        assert_eq!(evaluation.answer.title, "Partial");
        assert_eq!(evaluation.recommendations.len(), 1);
        assert_eq!(evaluation.recommendations[0].threshold, Some(1));

        let first = evaluate(&model, &question, 0).expect("choice in range");
        assert_eq!(first.recommendations[0].threshold, Some(0));
    }

    #[test]
    fn criteria_above_choice_do_not_apply() {
        let monitoring = target(10, "Logbooks", Section::Monitoring);
        let answers = answers(&["No", "Yes"]);
        let logic = DomainLogic {
            monitoring: SectionLogic {
                rule_type: RuleType::Criteria,
                criteria: vec![criterion(&monitoring, &answers[1..])],
                caveats: Vec::new(),
            },
            ..DomainLogic::default()
        };
        let question = question(answers, logic);
        let model = DecisionModel {
            targets: vec![monitoring],
            questions: Vec::new(),
        };

        let evaluation = evaluate(&model, &question, 0).expect("choice in range");
        assert!(evaluation.recommendations.is_empty());
    }

    #[test]
    fn caveats_apply_only_to_listed_answers_and_results_sort_by_section() {
        let logbooks = target(10, "Logbooks", Section::Monitoring);
        let assessment = target(20, "Catch curve", Section::Assessment);
        let biomass = target(21, "Biomass dynamic model", Section::Assessment);
        let answers = answers(&["None", "Some", "Many"]);

        let caveat = |target: &Target, answer: &Answer, title: &str, score: i64| Caveat {
            id: Uuid::new_v4(),
            title: title.to_string(),
            score,
            target: target.id,
            answers: vec![answer.id],
        };
        let logic = DomainLogic {
            monitoring: SectionLogic {
                rule_type: RuleType::Criteria,
                criteria: vec![criterion(&logbooks, &answers[0..])],
                caveats: Vec::new(),
            },
            assessment: SectionLogic {
                rule_type: RuleType::Caveats,
                criteria: Vec::new(),
                caveats: vec![
                    caveat(&assessment, &answers[1], "Needs length data", -3),
                    caveat(&biomass, &answers[1], "Index required", 1),
                    caveat(&biomass, &answers[2], "Well suited", 2),
                ],
            },
            ..DomainLogic::default()
        };
        let question = question(answers, logic);
        let model = DecisionModel {
            targets: vec![assessment, biomass, logbooks],
            questions: Vec::new(),
        };

        let evaluation = evaluate(&model, &question, 1).expect("choice in range");
        let titles: Vec<&str> = evaluation
            .recommendations
            .iter()
            .map(|recommendation| recommendation.target.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["Logbooks", "Biomass dynamic model", "Catch curve"]
        );

        let catch_curve = &evaluation.recommendations[2];
        assert_eq!(catch_curve.threshold, None);
        assert_eq!(catch_curve.caveats.len(), 1);
        assert_eq!(catch_curve.caveats[0].title, "Needs length data");
        assert_eq!(catch_curve.caveats[0].severity, Severity::Critical);

        let biomass_notes: Vec<&str> = evaluation.recommendations[1]
            .caveats
            .iter()
            .map(|note| note.title)
            .collect();
        assert_eq!(biomass_notes, vec!["Index required"]);
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let question = question(answers(&["No", "Yes"]), DomainLogic::default());
        let model = DecisionModel::default();

        let err = evaluate(&model, &question, 2).expect_err("choice out of range");
        assert_eq!(
            err,
            EvaluationError::InvalidChoice {
                question_id: 7,
                choice: 2,
                answer_count: 2,
            }
        );
    }

    #[test]
    fn dangling_target_reference_is_reported() {
        let orphan = target(99, "Orphan", Section::Monitoring);
        let answers = answers(&["No", "Yes"]);
        let logic = DomainLogic {
            monitoring: SectionLogic {
                rule_type: RuleType::Criteria,
                criteria: vec![criterion(&orphan, &answers[0..])],
                caveats: Vec::new(),
            },
            ..DomainLogic::default()
        };
        let question = question(answers, logic);

        let err = evaluate(&DecisionModel::default(), &question, 0).expect_err("target missing");
        assert_eq!(
            err,
            EvaluationError::UnknownTarget {
                question_id: 7,
                target: orphan.id,
            }
        );
    }
}
