//! Slot-based item containers and the item definition catalog.

use std::collections::BTreeMap;

use contracts::{Item, ItemDefinition, MAX_ITEM_STACK};

// ---------------------------------------------------------------------------
// ItemContainer
// ---------------------------------------------------------------------------

/// A fixed-capacity, ordered, nullable-slot item container.
///
/// Stackable placement merges into the existing slot for that item id;
/// non-stackable placement consumes one slot per call. Capacity failures are
/// results, not errors: `add` returns the placed slot or `None`.
#[derive(Debug, Clone)]
pub struct ItemContainer {
    slots: Vec<Option<Item>>,
}

impl ItemContainer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The ordered slot sequence, vacant slots included.
    pub fn items(&self) -> &[Option<Item>] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> Option<Item> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn first_open_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn free_slot_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn occupied_slot_count(&self) -> usize {
        self.capacity() - self.free_slot_count()
    }

    /// Places an item, returning the slot it landed in, or `None` when no
    /// eligible slot exists. Stack merges saturate at [`MAX_ITEM_STACK`].
    pub fn add(&mut self, item: Item, stackable: bool) -> Option<usize> {
        if stackable {
            if let Some(slot) = self.slot_of(item.item_id) {
                let existing = self.slots[slot].as_mut()?;
                existing.amount = existing
                    .amount
                    .saturating_add(item.amount)
                    .min(MAX_ITEM_STACK);
                return Some(slot);
            }
        }

        let slot = self.first_open_slot()?;
        self.slots[slot] = Some(item);
        Some(slot)
    }

    /// Vacates a slot and returns what occupied it; `None` for a vacant or
    /// out-of-range slot.
    pub fn remove(&mut self, slot: usize) -> Option<Item> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn set(&mut self, slot: usize, item: Option<Item>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = item;
        }
    }

    /// Whether the container holds at least `item.amount` units of
    /// `item.item_id`, counted across all slots.
    pub fn has(&self, item: Item) -> bool {
        self.total_amount(item.item_id) >= u64::from(item.amount)
    }

    pub fn total_amount(&self, item_id: u32) -> u64 {
        self.slots
            .iter()
            .flatten()
            .filter(|held| held.item_id == item_id)
            .map(|held| u64::from(held.amount))
            .sum()
    }

    fn slot_of(&self, item_id: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.map(|held| held.item_id == item_id).unwrap_or(false))
    }
}

// ---------------------------------------------------------------------------
// ItemCatalog
// ---------------------------------------------------------------------------

/// Registry backing the `lookup(item_id) -> definition | absent` contract.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    definitions: BTreeMap<u32, ItemDefinition>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: ItemDefinition) {
        self.definitions.insert(definition.item_id, definition);
    }

    pub fn lookup(&self, item_id: u32) -> Option<&ItemDefinition> {
        self.definitions.get(&item_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stackable_adds_merge_into_one_slot() {
        let mut container = ItemContainer::new(28);
        for _ in 0..5 {
            let placed = container.add(Item::new(995, 1_000), true);
            assert_eq!(placed, Some(0));
        }

        assert_eq!(container.occupied_slot_count(), 1);
        assert_eq!(container.slot(0), Some(Item::new(995, 5_000)));
    }

    #[test]
    fn stack_merge_saturates_at_the_hard_cap() {
        let mut container = ItemContainer::new(28);
        container.add(Item::new(995, MAX_ITEM_STACK - 10), true);
        container.add(Item::new(995, 100), true);
        assert_eq!(container.slot(0), Some(Item::new(995, MAX_ITEM_STACK)));
    }

    #[test]
    fn non_stackable_adds_consume_one_slot_each() {
        let mut container = ItemContainer::new(4);
        for slot in 0..4 {
            assert_eq!(container.add(Item::single(1277), false), Some(slot));
        }
        assert_eq!(container.add(Item::single(1277), false), None);
        assert_eq!(container.occupied_slot_count(), 4);
    }

    #[test]
    fn remove_vacates_the_slot() {
        let mut container = ItemContainer::new(28);
        container.add(Item::single(1277), false);
        assert_eq!(container.remove(0), Some(Item::single(1277)));
        assert_eq!(container.remove(0), None);
        assert_eq!(container.first_open_slot(), Some(0));
    }

    #[test]
    fn has_counts_across_slots() {
        let mut container = ItemContainer::new(28);
        container.add(Item::single(1277), false);
        container.add(Item::single(1277), false);
        assert!(container.has(Item::new(1277, 2)));
        assert!(!container.has(Item::new(1277, 3)));
        assert!(!container.has(Item::single(4151)));
    }

    #[test]
    fn catalog_lookup_is_absent_for_unknown_ids() {
        let mut catalog = ItemCatalog::new();
        catalog.register(ItemDefinition {
            item_id: 995,
            name: "Coins".to_string(),
            stackable: true,
            value: 1,
        });

        assert_eq!(catalog.lookup(995).map(|def| def.name.as_str()), Some("Coins"));
        assert!(catalog.lookup(4151).is_none());
    }
}
