use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{EntityId, Position};

/// Content-space positions of the entities placed on one city's map.
///
/// Positions are not bounds-checked; markers outside the image are valid.
/// Iteration follows placement order: the most recently placed or moved
/// entity comes last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementStore {
    positions: IndexMap<EntityId, Position>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move a placement, bringing it to the top of the paint
    /// order. Returns the previous position.
    pub fn upsert(&mut self, id: impl Into<EntityId>, pos: Position) -> Option<Position> {
        let id = id.into();
        let previous = self.positions.shift_remove(&id);
        self.positions.insert(id, pos);
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<Position> {
        self.positions.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Placements in render order. The last one is drawn on top.
    pub fn list(&self) -> impl Iterator<Item = (&EntityId, Position)> + '_ {
        self.positions.iter().map(|(id, pos)| (id, *pos))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Drop every placement whose id fails `keep`. Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.positions.len();
        self.positions.retain(|id, _| keep(id));
        before - self.positions.len()
    }
}
