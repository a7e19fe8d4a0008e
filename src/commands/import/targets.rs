use super::*;

#[derive(Debug, Clone, Copy)]
enum TargetSlot {
    Emitted { id: Uuid, section: Section },
    Excluded,
}

/// Built targets keyed by spreadsheet TargetID, including the ones that were
/// excluded so rules pointing at them can be told apart from dangling ids.
#[derive(Debug, Default)]
pub(super) struct TargetIndex {
    slots: HashMap<i64, TargetSlot>,
}

/// Where a rule's target ended up after the target pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TargetResolution {
    Linked { id: Uuid, section: Section },
    Excluded,
}

impl TargetIndex {
    pub(super) fn resolve(
        &self,
        target_id: i64,
        owner: &RecordRef,
    ) -> Result<TargetResolution, IntegrityError> {
        match self.slots.get(&target_id) {
            Some(TargetSlot::Emitted { id, section }) => Ok(TargetResolution::Linked {
                id: *id,
                section: *section,
            }),
            Some(TargetSlot::Excluded) => Ok(TargetResolution::Excluded),
            None => Err(IntegrityError::UnknownTarget {
                owner: owner.clone(),
                target_id,
            }),
        }
    }
}

pub(super) fn build_targets(
    raw_targets: &[RawTarget],
    lookups: &Lookups,
    ids: &IdAllocator,
    counts: &mut ImportCounts,
) -> Result<(Vec<Target>, TargetIndex), IntegrityError> {
    let mut targets = Vec::with_capacity(raw_targets.len());
    let mut index = TargetIndex::default();

    for raw in raw_targets {
        counts.targets_read += 1;
        if index.slots.contains_key(&raw.target_id) {
            return Err(IntegrityError::DuplicateKey {
                table: "target",
                key: raw.target_id.to_string(),
            });
        }

        match build_target(raw, lookups, ids)? {
            Some(target) => {
                index.slots.insert(
                    raw.target_id,
                    TargetSlot::Emitted {
                        id: target.id,
                        section: target.section,
                    },
                );
                targets.push(target);
                counts.targets_emitted += 1;
            }
            None => {
                warn!(target_id = raw.target_id, reference = %raw.reference, "excluding target without a title");
                index.slots.insert(raw.target_id, TargetSlot::Excluded);
                counts.targets_excluded_untitled += 1;
            }
        }
    }

    Ok((targets, index))
}

fn build_target(
    raw: &RawTarget,
    lookups: &Lookups,
    ids: &IdAllocator,
) -> Result<Option<Target>, IntegrityError> {
    let owner = RecordRef::Target(raw.target_id);
    let attributes = lookups.attribute_texts(&raw.attributes, &owner)?;

    let titled = lookups
        .optional_attribute(raw.title.as_ref(), &owner)?
        .filter(|title| !title.is_empty())
        .map(ToOwned::to_owned);
    let Some(title) = titled.or_else(|| attributes.first().cloned()) else {
        return Ok(None);
    };

    let section =
        Section::from_reference(&raw.reference).ok_or_else(|| IntegrityError::UnknownSection {
            target_id: raw.target_id,
            reference: raw.reference.clone(),
        })?;

    Ok(Some(Target {
        id: ids.allocate(IdKind::Target, raw.target_id),
        legacy_id: raw.target_id,
        description: join_description(&attributes, &title),
        title,
        section,
        reference: raw.reference.trim().to_string(),
    }))
}

/// Joins attribute text with `". "`, leaving out the entry used as the title.
pub(super) fn join_description(attributes: &[String], title: &str) -> String {
    attributes
        .iter()
        .filter(|attribute| attribute.as_str() != title)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(". ")
}
