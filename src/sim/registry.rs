//! Collision registry
//!
//! Bookkeeping of which entities take part in the pairwise sweep. Owns no
//! entities, only their ids, kept sorted so the sweep order is stable.

use super::entity::EntityId;

#[derive(Debug, Clone, Default)]
pub struct CollisionRegistry {
    members: Vec<EntityId>,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Registering a member again is a no-op.
    pub fn register(&mut self, id: EntityId) {
        if let Err(pos) = self.members.binary_search(&id) {
            self.members.insert(pos, id);
        }
    }

    /// Remove an entity. Removing a non-member is a no-op.
    pub fn unregister(&mut self, id: EntityId) {
        if let Ok(pos) = self.members.binary_search(&id) {
            self.members.remove(pos);
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Every unordered pair of members, lazily, each pair once
    pub fn pairs(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        let members = &self.members;
        (0..members.len())
            .flat_map(move |i| (i + 1..members.len()).map(move |j| (members[i], members[j])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = CollisionRegistry::new();
        registry.register(EntityId(3));
        registry.register(EntityId(1));
        registry.register(EntityId(3));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.members(), &[EntityId(1), EntityId(3)]);
    }

    #[test]
    fn test_unregister_non_member_is_noop() {
        let mut registry = CollisionRegistry::new();
        registry.register(EntityId(1));
        registry.unregister(EntityId(7));
        registry.unregister(EntityId(1));
        registry.unregister(EntityId(1));
        assert!(registry.is_empty());
        assert!(!registry.contains(EntityId(1)));
    }

    #[test]
    fn test_pairs_are_unordered_and_unique() {
        let mut registry = CollisionRegistry::new();
        for i in 1..=4 {
            registry.register(EntityId(i));
        }
        let pairs: Vec<_> = registry.pairs().collect();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(a, b)| a < b));
        assert!(pairs.contains(&(EntityId(2), EntityId(4))));
        assert!(!pairs.contains(&(EntityId(4), EntityId(2))));
    }

    #[test]
    fn test_pairs_empty_and_single() {
        let mut registry = CollisionRegistry::new();
        assert_eq!(registry.pairs().count(), 0);
        registry.register(EntityId(1));
        assert_eq!(registry.pairs().count(), 0);
    }
}
