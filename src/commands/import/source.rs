use serde::de::DeserializeOwned;

use super::*;
use crate::util::{read_json, sha256_file};

pub(super) const ATTRIBUTES_FILE: &str = "attributes.json";
pub(super) const TARGETS_FILE: &str = "targets.json";
pub(super) const QUESTIONS_FILE: &str = "questions.json";
pub(super) const CRITERIA_FILE: &str = "criteria.json";
pub(super) const CAVEATS_FILE: &str = "caveats.json";
pub(super) const COLORMAP_FILE: &str = "colormap.json";
pub(super) const NOTES_FILE: &str = "notes.json";

/// Attribute and note identifiers show up as both strings and integers
/// depending on the export, so they are normalized to text on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawCode")]
pub(super) struct Code(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Integer(i64),
}

impl From<RawCode> for Code {
    fn from(raw: RawCode) -> Self {
        match raw {
            RawCode::Text(text) => Self(text.trim().to_string()),
            RawCode::Integer(value) => Self(value.to_string()),
        }
    }
}

impl Code {
    pub(super) fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tables arrive either as a bare array or wrapped as `{"Elements": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(rename = "Elements")]
        elements: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) => items,
            Self::Wrapped { elements } => elements,
        }
    }
}

fn listing<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Listing::deserialize(deserializer).map(Listing::into_vec)
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawAttribute {
    #[serde(rename = "AttributeID")]
    pub(super) attribute_id: Code,
    #[serde(rename = "AttributeText")]
    pub(super) attribute_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawTarget {
    #[serde(rename = "TargetID")]
    pub(super) target_id: i64,
    #[serde(rename = "Title", default)]
    pub(super) title: Option<Code>,
    #[serde(rename = "Attributes", default)]
    pub(super) attributes: Vec<Option<Code>>,
    #[serde(rename = "Reference")]
    pub(super) reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawQuestion {
    #[serde(rename = "QuestionID")]
    pub(super) question_id: i64,
    #[serde(rename = "Title", default)]
    pub(super) title: Option<Code>,
    #[serde(rename = "Category", default)]
    pub(super) category: Option<Code>,
    #[serde(rename = "Attributes", default)]
    pub(super) attributes: Vec<Option<Code>>,
    #[serde(rename = "ValidAnswers", default)]
    pub(super) valid_answers: Vec<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawCriterion {
    #[serde(rename = "QuestionID")]
    pub(super) question_id: i64,
    #[serde(rename = "TargetID")]
    pub(super) target_id: i64,
    #[serde(rename = "Threshold")]
    pub(super) threshold: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawCaveat {
    #[serde(rename = "QuestionID")]
    pub(super) question_id: i64,
    #[serde(rename = "TargetID")]
    pub(super) target_id: i64,
    #[serde(rename = "Answers", default)]
    pub(super) answers: Vec<RawCaveatAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawCaveatAnswer {
    #[serde(rename = "NoteID", default)]
    pub(super) note_id: Option<Code>,
    #[serde(rename = "Answer", default)]
    pub(super) answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawColor {
    #[serde(rename = "ColorName")]
    pub(super) color_name: String,
    #[serde(rename = "Score")]
    pub(super) score: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawNote {
    #[serde(rename = "NoteID")]
    pub(super) note_id: Code,
    #[serde(rename = "NoteColor")]
    pub(super) note_color: String,
    #[serde(rename = "NoteText", default)]
    pub(super) note_text: Option<String>,
}

/// Every input table, fully loaded. The bundle form uses these field names
/// as its top-level keys.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct SourceTables {
    #[serde(deserialize_with = "listing")]
    pub(super) attributes: Vec<RawAttribute>,
    #[serde(deserialize_with = "listing")]
    pub(super) targets: Vec<RawTarget>,
    #[serde(deserialize_with = "listing")]
    pub(super) questions: Vec<RawQuestion>,
    #[serde(deserialize_with = "listing")]
    pub(super) criteria: Vec<RawCriterion>,
    #[serde(deserialize_with = "listing")]
    pub(super) caveats: Vec<RawCaveat>,
    #[serde(deserialize_with = "listing")]
    pub(super) colormap: Vec<RawColor>,
    #[serde(deserialize_with = "listing")]
    pub(super) notes: Vec<RawNote>,
}

#[derive(Debug, Clone)]
pub(super) enum SourceLocation {
    Directory(PathBuf),
    Bundle(PathBuf),
}

impl SourceLocation {
    pub(super) fn describe(&self) -> String {
        match self {
            Self::Directory(path) => format!("directory {}", path.display()),
            Self::Bundle(path) => format!("bundle {}", path.display()),
        }
    }
}

pub(super) struct LoadedSource {
    pub(super) tables: SourceTables,
    pub(super) hashes: Vec<SourceHash>,
}

pub(super) fn load_source(location: &SourceLocation) -> Result<LoadedSource> {
    match location {
        SourceLocation::Directory(dir) => load_directory(dir),
        SourceLocation::Bundle(path) => {
            let tables: SourceTables = read_json(path)?;
            let hashes = vec![hash_entry("bundle", path)?];
            Ok(LoadedSource { tables, hashes })
        }
    }
}

fn load_directory(dir: &Path) -> Result<LoadedSource> {
    let mut hashes = Vec::with_capacity(7);

    let tables = SourceTables {
        attributes: read_table(dir, ATTRIBUTES_FILE, &mut hashes)?,
        targets: read_table(dir, TARGETS_FILE, &mut hashes)?,
        questions: read_table(dir, QUESTIONS_FILE, &mut hashes)?,
        criteria: read_table(dir, CRITERIA_FILE, &mut hashes)?,
        caveats: read_table(dir, CAVEATS_FILE, &mut hashes)?,
        colormap: read_table(dir, COLORMAP_FILE, &mut hashes)?,
        notes: read_table(dir, NOTES_FILE, &mut hashes)?,
    };

    Ok(LoadedSource { tables, hashes })
}

fn read_table<T: DeserializeOwned>(
    dir: &Path,
    file_name: &str,
    hashes: &mut Vec<SourceHash>,
) -> Result<Vec<T>> {
    let path = dir.join(file_name);
    let listing: Listing<T> = read_json(&path)?;
    let rows = listing.into_vec();

    let table = file_name.trim_end_matches(".json");
    debug!(table, rows = rows.len(), path = %path.display(), "loaded source table");
    hashes.push(hash_entry(table, &path)?);

    Ok(rows)
}

fn hash_entry(table: &str, path: &Path) -> Result<SourceHash> {
    Ok(SourceHash {
        table: table.to_string(),
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
    })
}
