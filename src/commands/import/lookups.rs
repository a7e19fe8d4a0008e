use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ResolvedNote {
    pub(super) title: String,
    pub(super) score: i64,
}

/// Read-only code tables built once per run from the attribute, color map and
/// notes exports.
#[derive(Debug)]
pub(super) struct Lookups {
    attributes: HashMap<Code, String>,
    scores: HashMap<String, i64>,
    notes: HashMap<Code, RawNote>,
}

impl Lookups {
    pub(super) fn build(tables: &SourceTables) -> Result<Self, IntegrityError> {
        let mut attributes = HashMap::with_capacity(tables.attributes.len());
        for attribute in &tables.attributes {
            let text = attribute.attribute_text.clone().unwrap_or_default();
            if attributes
                .insert(attribute.attribute_id.clone(), text)
                .is_some()
            {
                return Err(IntegrityError::DuplicateKey {
                    table: "attribute",
                    key: attribute.attribute_id.to_string(),
                });
            }
        }

        let mut scores = HashMap::with_capacity(tables.colormap.len());
        for color in &tables.colormap {
            if scores
                .insert(color.color_name.trim().to_string(), color.score)
                .is_some()
            {
                return Err(IntegrityError::DuplicateKey {
                    table: "color",
                    key: color.color_name.clone(),
                });
            }
        }

        let mut notes = HashMap::with_capacity(tables.notes.len());
        for note in &tables.notes {
            if notes.insert(note.note_id.clone(), note.clone()).is_some() {
                return Err(IntegrityError::DuplicateKey {
                    table: "note",
                    key: note.note_id.to_string(),
                });
            }
        }

        debug!(
            attributes = attributes.len(),
            colors = scores.len(),
            notes = notes.len(),
            "built lookup tables"
        );

        Ok(Self {
            attributes,
            scores,
            notes,
        })
    }

    pub(super) fn attribute(
        &self,
        code: &Code,
        owner: &RecordRef,
    ) -> Result<&str, IntegrityError> {
        self.attributes
            .get(code)
            .map(|text| text.trim())
            .ok_or_else(|| IntegrityError::MissingAttribute {
                owner: owner.clone(),
                code: code.clone(),
            })
    }

    /// Resolves an attribute list to text, dropping null and blank codes as
    /// well as codes whose text is blank.
    pub(super) fn attribute_texts(
        &self,
        codes: &[Option<Code>],
        owner: &RecordRef,
    ) -> Result<Vec<String>, IntegrityError> {
        let mut texts = Vec::with_capacity(codes.len());
        for code in codes.iter().flatten().filter(|code| !code.is_blank()) {
            let text = self.attribute(code, owner)?;
            if !text.is_empty() {
                texts.push(text.to_string());
            }
        }
        Ok(texts)
    }

    /// Text for an optional single-code field such as a title or category;
    /// `None` when the field is null or blank.
    pub(super) fn optional_attribute(
        &self,
        code: Option<&Code>,
        owner: &RecordRef,
    ) -> Result<Option<&str>, IntegrityError> {
        match code.filter(|code| !code.is_blank()) {
            Some(code) => self.attribute(code, owner).map(Some),
            None => Ok(None),
        }
    }

    pub(super) fn score(&self, color: &str, note: &Code) -> Result<i64, IntegrityError> {
        self.scores
            .get(color.trim())
            .copied()
            .ok_or_else(|| IntegrityError::MissingColor {
                note: note.clone(),
                color: color.to_string(),
            })
    }

    pub(super) fn note(
        &self,
        note_id: &Code,
        owner: &RecordRef,
    ) -> Result<ResolvedNote, IntegrityError> {
        let note = self
            .notes
            .get(note_id)
            .ok_or_else(|| IntegrityError::MissingNote {
                owner: owner.clone(),
                note: note_id.clone(),
            })?;

        Ok(ResolvedNote {
            title: note.note_text.as_deref().unwrap_or_default().trim().to_string(),
            score: self.score(&note.note_color, &note.note_id)?,
        })
    }
}
