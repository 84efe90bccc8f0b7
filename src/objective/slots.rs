//! Capacity-bounded assignment of nearby obstacles to observation slots
//!
//! Each tracked obstacle keeps its slot until it leaves range (with
//! hysteresis) or a strictly closer obstacle displaces the farthest one.

use std::collections::BTreeMap;

use crate::sim::state::EpisodeRng;

#[derive(Debug, Clone, PartialEq)]
pub struct SlotTable {
    capacity: usize,
    /// obstacle index -> slot
    assigned: BTreeMap<usize, usize>,
}

impl SlotTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            assigned: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn clear(&mut self) {
        self.assigned.clear();
    }

    pub fn slot_of(&self, obstacle: usize) -> Option<usize> {
        self.assigned.get(&obstacle).copied()
    }

    pub fn contains(&self, obstacle: usize) -> bool {
        self.assigned.contains_key(&obstacle)
    }

    /// `(obstacle index, slot)` in obstacle index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.assigned.iter().map(|(&o, &s)| (o, s))
    }

    fn free_slots(&self) -> Vec<usize> {
        (0..self.capacity)
            .filter(|slot| !self.assigned.values().any(|s| s == slot))
            .collect()
    }

    /// Re-evaluate assignments given each obstacle's current distance
    ///
    /// `distances[i]` belongs to obstacle `i`. Free-slot ties are broken with
    /// `rng` so that the allocation is reproducible from the episode seed.
    pub fn update(&mut self, distances: &[f64], range: f64, hysteresis: f64, rng: &mut EpisodeRng) {
        let evict_beyond = range * hysteresis;
        self.assigned
            .retain(|&i, _| distances.get(i).is_some_and(|&d| d <= evict_beyond));

        if self.capacity == 0 {
            return;
        }

        for (i, &dist) in distances.iter().enumerate() {
            if !(dist < range) || self.contains(i) {
                continue;
            }

            let free = self.free_slots();
            if let Some(pick) = rng.choose_index(free.len()) {
                self.assigned.insert(i, free[pick]);
                continue;
            }

            // Full: displace the farthest tracked obstacle if strictly closer
            let farthest = self
                .assigned
                .iter()
                .map(|(&o, &s)| (o, s, distances[o]))
                .fold(None, |acc: Option<(usize, usize, f64)>, cur| match acc {
                    Some(best) if best.2 >= cur.2 => Some(best),
                    _ => Some(cur),
                });
            if let Some((victim, slot, victim_dist)) = farthest {
                if dist < victim_dist {
                    self.assigned.remove(&victim);
                    self.assigned.insert(i, slot);
                }
            }
        }
    }
}
