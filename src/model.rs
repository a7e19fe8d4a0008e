use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::camel_case;

/// Governance category a target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Monitoring,
    Assessment,
    ControlRules,
}

impl Section {
    pub const ALL: [Section; 3] = [Self::Monitoring, Self::Assessment, Self::ControlRules];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monitoring => "monitoring",
            Self::Assessment => "assessment",
            Self::ControlRules => "controlRules",
        }
    }

    /// Classifies a spreadsheet reference such as `"Control Rules:12"` by the
    /// camel-cased text before its first colon.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let prefix = reference.split(':').next().unwrap_or_default();
        let normalized = camel_case(prefix);
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == normalized)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: Uuid,
    pub legacy_id: i64,
    pub title: String,
    pub description: String,
    pub section: Section,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub title: String,
}

/// Applies to the answer at its threshold and every answer after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: Uuid,
    pub target: Uuid,
    pub answers: Vec<Uuid>,
}

/// Applies to exactly the listed answers, annotated with a note and its
/// severity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveat {
    pub id: Uuid,
    pub title: String,
    pub score: i64,
    pub target: Uuid,
    pub answers: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    None,
    Criteria,
    Caveats,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionLogic {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub criteria: Vec<Criterion>,
    pub caveats: Vec<Caveat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainLogic {
    pub monitoring: SectionLogic,
    pub assessment: SectionLogic,
    pub control_rules: SectionLogic,
}

impl DomainLogic {
    pub fn section(&self, section: Section) -> &SectionLogic {
        match section {
            Section::Monitoring => &self.monitoring,
            Section::Assessment => &self.assessment,
            Section::ControlRules => &self.control_rules,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut SectionLogic {
        match section {
            Section::Monitoring => &mut self.monitoring,
            Section::Assessment => &mut self.assessment,
            Section::ControlRules => &mut self.control_rules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub legacy_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub answers: Vec<Answer>,
    pub domain_logic: DomainLogic,
}

impl Question {
    pub fn answer_index(&self, answer_id: Uuid) -> Option<usize> {
        self.answers.iter().position(|answer| answer.id == answer_id)
    }
}

/// The normalized output document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionModel {
    pub targets: Vec<Target>,
    pub questions: Vec<Question>,
}

impl DecisionModel {
    pub fn target(&self, id: Uuid) -> Option<&Target> {
        self.targets.iter().find(|target| target.id == id)
    }

    pub fn question_by_legacy_id(&self, legacy_id: i64) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.legacy_id == legacy_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceHash {
    pub table: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportCounts {
    pub targets_read: usize,
    pub targets_emitted: usize,
    pub targets_excluded_untitled: usize,
    pub questions_read: usize,
    pub questions_emitted: usize,
    pub questions_excluded_untitled: usize,
    pub questions_excluded_too_few_answers: usize,
    pub criteria_linked: usize,
    pub caveats_linked: usize,
    pub rules_dropped_excluded_target: usize,
    pub rules_skipped_excluded_question: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub source: String,
    pub output_path: Option<String>,
    pub dry_run: bool,
    pub source_hashes: Vec<SourceHash>,
    pub counts: ImportCounts,
}
