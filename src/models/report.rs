use std::collections::BTreeMap;

use serde::Serialize;

use super::enums::ReportKind;
use super::raw::RawRecord;

/// Rows for every requested report kind, gathered in one fetch cycle.
///
/// A requested kind is always present; a kind whose source failed holds
/// its fallback rows (empty unless the source declared otherwise).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportBundle {
    sections: BTreeMap<ReportKind, Vec<RawRecord>>,
}

impl ReportBundle {
    /// A bundle with an empty section for each kind.
    pub fn empty<I: IntoIterator<Item = ReportKind>>(kinds: I) -> Self {
        Self {
            sections: kinds.into_iter().map(|k| (k, Vec::new())).collect(),
        }
    }

    pub(crate) fn insert(&mut self, kind: ReportKind, rows: Vec<RawRecord>) {
        self.sections.insert(kind, rows);
    }

    /// Rows for `kind`; empty when the kind was not requested.
    pub fn rows(&self, kind: ReportKind) -> &[RawRecord] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, kind: ReportKind) -> bool {
        self.sections.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ReportKind> + '_ {
        self.sections.keys().copied()
    }

    /// Number of sections (requested kinds).
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// True when no section has any rows: the "no data" state.
    pub fn has_no_data(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }
}
