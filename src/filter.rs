use std::collections::HashSet;

use crate::{classify::NotamType, Notam};

/// Selection applied to the active records before display. An empty type set
/// admits every type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotamFilter {
    pub types: HashSet<NotamType>,
    pub new_only: bool,
    pub unlimited_height_only: bool,
    pub airport: Option<String>,
}

impl NotamFilter {
    pub fn matches(&self, notam: &Notam, new_ids: &HashSet<String>) -> bool {
        let type_match = self.types.is_empty() || self.types.contains(&notam.notam_type);
        let new_match = !self.new_only || new_ids.contains(&notam.id);
        let height_match = !self.unlimited_height_only || notam.is_unlimited_height();
        let airport_match = self
            .airport
            .as_deref()
            .map_or(true, |airport| notam.location() == Some(airport));

        type_match && new_match && height_match && airport_match
    }

    pub fn apply<'a>(
        &'a self,
        notams: impl IntoIterator<Item = &'a Notam> + 'a,
        new_ids: &'a HashSet<String>,
    ) -> impl Iterator<Item = &'a Notam> + 'a {
        notams
            .into_iter()
            .filter(move |notam| self.matches(notam, new_ids))
    }
}
