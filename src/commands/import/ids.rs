use std::cell::RefCell;

use super::*;

const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6d2f_93b1_4c0e_4f57_a1f8_3b9e_52c4_d710);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum IdKind {
    Question,
    Target,
}

impl IdKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Target => "target",
        }
    }
}

/// Hands out identifiers for one import run.
///
/// Records that carry a spreadsheet id get a name-based UUID memoized by
/// `(kind, legacy_id)`, so every reference to the same record resolves to the
/// same identifier regardless of processing order. Generated records
/// (answers, criteria, caveats) get a fresh random UUID.
#[derive(Debug, Default)]
pub(super) struct IdAllocator {
    keyed: RefCell<HashMap<(IdKind, i64), Uuid>>,
}

impl IdAllocator {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn allocate(&self, kind: IdKind, legacy_id: i64) -> Uuid {
        *self.keyed.borrow_mut().entry((kind, legacy_id)).or_insert_with(|| {
            let name = format!("{}:{legacy_id}", kind.as_str());
            Uuid::new_v5(&LEGACY_ID_NAMESPACE, name.as_bytes())
        })
    }

    pub(super) fn fresh(&self) -> Uuid {
        Uuid::new_v4()
    }

    pub(super) fn keyed_len(&self) -> usize {
        self.keyed.borrow().len()
    }
}
