use std::collections::HashMap;

use crate::types::{Aperture, Point};

/// Index of an aperture in an [`ApertureTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApertureId(usize);

/// Aperture arena built from %AD commands and resolved contours.
///
/// Apertures are kept in definition order; names index into the arena.
#[derive(Debug, Default)]
pub struct ApertureTable {
    apertures: Vec<Aperture>,
    by_name: HashMap<String, ApertureId>,
}

impl ApertureTable {
    /// Add an aperture. A repeated name keeps resolving to the first definition.
    pub fn define(&mut self, aperture: Aperture) -> ApertureId {
        let id = ApertureId(self.apertures.len());
        if let Some(name) = &aperture.name {
            self.by_name.entry(name.clone()).or_insert(id);
        }
        self.apertures.push(aperture);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<ApertureId> {
        self.by_name.get(name).copied()
    }

    #[cfg(test)]
    fn get(&self, id: ApertureId) -> &Aperture {
        &self.apertures[id.0]
    }

    pub fn add_position(&mut self, id: ApertureId, pos: Point) {
        self.apertures[id.0].positions.push(pos);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.apertures.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.apertures.is_empty()
    }

    /// Consume the table, yielding apertures in ascending size.
    ///
    /// The sort is stable, so equal sizes keep definition order.
    pub fn into_sorted(self) -> Vec<Aperture> {
        let mut apertures = self.apertures;
        apertures.sort_by(|a, b| a.size.total_cmp(&b.size));
        apertures
    }
}
