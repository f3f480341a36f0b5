//! Index-keyed particle arena with a free list
//!
//! Particles churn in the hundreds per frame; slots are reused instead of
//! reallocating. Indices stay stable across release, so occupied slots can
//! be collected first and released after the update pass without any
//! index-shift hazard.

use super::state::Particle;

#[derive(Debug, Clone, Default)]
pub struct ParticleArena {
    slots: Vec<Option<Particle>>,
    free: Vec<usize>,
}

impl ParticleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            free: Vec::new(),
        }
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a particle, reusing a freed slot when available
    pub fn insert(&mut self, particle: Particle) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(particle);
                idx
            }
            None => {
                self.slots.push(Some(particle));
                self.slots.len() - 1
            }
        }
    }

    /// Remove a particle by index, returning it to the pool. Releasing an
    /// already-free slot is a no-op.
    pub fn release(&mut self, idx: usize) -> Option<Particle> {
        let taken = self.slots.get_mut(idx)?.take();
        if taken.is_some() {
            self.free.push(idx);
        }
        taken
    }

    pub fn get(&self, idx: usize) -> Option<&Particle> {
        self.slots.get(idx)?.as_ref()
    }

    /// Iterate occupied slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (i, p)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Particle)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|p| (i, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ParticleKind;
    use glam::Vec2;

    fn particle(x: f32) -> Particle {
        Particle {
            pos: Vec2::new(x, 0.0),
            vel: Vec2::ZERO,
            size: 3.0,
            target_size: 3.0,
            hue: 0.0,
            xp_value: 2,
            kind: ParticleKind::Common,
            trail: Vec::new(),
        }
    }

    #[test]
    fn test_insert_and_len() {
        let mut arena = ParticleArena::new();
        assert!(arena.is_empty());
        arena.insert(particle(1.0));
        arena.insert(particle(2.0));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_release_reuses_slot() {
        let mut arena = ParticleArena::new();
        let a = arena.insert(particle(1.0));
        arena.insert(particle(2.0));

        let released = arena.release(a);
        assert!(released.is_some());
        assert_eq!(arena.len(), 1);

        // The freed index comes back on the next insert
        let b = arena.insert(particle(3.0));
        assert_eq!(b, a);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut arena = ParticleArena::new();
        let a = arena.insert(particle(1.0));
        assert!(arena.release(a).is_some());
        assert!(arena.release(a).is_none());
        assert_eq!(arena.len(), 0);
        // Free list must not contain the slot twice
        arena.insert(particle(2.0));
        arena.insert(particle(3.0));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_iter_skips_freed_slots() {
        let mut arena = ParticleArena::new();
        let a = arena.insert(particle(1.0));
        arena.insert(particle(2.0));
        arena.release(a);

        let xs: Vec<f32> = arena.iter().map(|(_, p)| p.pos.x).collect();
        assert_eq!(xs, vec![2.0]);
    }
}
