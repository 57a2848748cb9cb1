//! Animation requests, one type per category.
//!
//! A request names the item(s) it animates plus any geometry needed to build
//! its tween. Targets are kept in a [`TargetSlots`] pair: each slot is cleared
//! the moment that item's animation reaches a terminal outcome, and the
//! request is spent once every slot is empty.

use std::fmt;

use crate::hooks::{self, CategoryHooks};
use crate::types::{Category, ItemId, Occupant};

/// Up to two target items of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetSlots {
    slots: [Option<(Occupant, ItemId)>; 2],
}

impl TargetSlots {
    /// A single-target request.
    pub fn sole(item: ItemId) -> Self {
        Self {
            slots: [Some((Occupant::Sole, item)), None],
        }
    }

    /// The outgoing and incoming occupant of one slot. The same item in both
    /// positions is kept once, as the new occupant.
    pub fn pair(old: Option<ItemId>, new: Option<ItemId>) -> Self {
        let old = old.filter(|o| Some(*o) != new);
        Self {
            slots: [
                old.map(|item| (Occupant::Old, item)),
                new.map(|item| (Occupant::New, item)),
            ],
        }
    }

    /// Iterate over the targets that have not been cleared yet.
    pub fn iter(&self) -> impl Iterator<Item = (Occupant, ItemId)> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn get(&self, occupant: Occupant) -> Option<ItemId> {
        self.iter()
            .find(|(o, _)| *o == occupant)
            .map(|(_, item)| item)
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.iter().any(|(_, i)| i == item)
    }

    pub fn occupant_of(&self, item: ItemId) -> Option<Occupant> {
        self.iter().find(|(_, i)| *i == item).map(|(o, _)| o)
    }

    /// Clear `item` from its slot. Returns `false` when it was not a target.
    pub fn clear(&mut self, item: ItemId) -> bool {
        let mut cleared = false;
        for slot in &mut self.slots {
            if matches!(slot, Some((_, i)) if *i == item) {
                *slot = None;
                cleared = true;
            }
        }
        cleared
    }

    /// True once every target has been cleared.
    pub fn is_fully_spent(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Start and end position of a moving item, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub from_x: f32,
    pub from_y: f32,
    pub to_x: f32,
    pub to_y: f32,
}

impl Motion {
    pub fn new(from_x: f32, from_y: f32, to_x: f32, to_y: f32) -> Self {
        Self {
            from_x,
            from_y,
            to_x,
            to_y,
        }
    }

    pub fn delta_x(&self) -> f32 {
        self.to_x - self.from_x
    }

    pub fn delta_y(&self) -> f32 {
        self.to_y - self.from_y
    }
}

/// Behaviour shared by every request type managed by a
/// [`CategoryManager`](crate::manager::CategoryManager).
pub trait ItemRequest: fmt::Debug + Sized + 'static {
    /// Category this request type belongs to.
    const CATEGORY: Category;

    fn targets(&self) -> &TargetSlots;

    fn targets_mut(&mut self) -> &mut TargetSlots;

    /// Hook table used when a manager is built without explicit hooks.
    fn default_hooks() -> CategoryHooks<Self>;
}

/// Fade an item in.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    targets: TargetSlots,
}

impl InsertRequest {
    pub fn new(item: ItemId) -> Self {
        Self {
            targets: TargetSlots::sole(item),
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        self.targets.get(Occupant::Sole)
    }
}

impl ItemRequest for InsertRequest {
    const CATEGORY: Category = Category::Insert;

    fn targets(&self) -> &TargetSlots {
        &self.targets
    }

    fn targets_mut(&mut self) -> &mut TargetSlots {
        &mut self.targets
    }

    fn default_hooks() -> CategoryHooks<Self> {
        hooks::insert_hooks()
    }
}

/// Fade an item out, or hold a swiped-away item in place until it is gone.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveRequest {
    targets: TargetSlots,
    dismissed: bool,
}

impl RemoveRequest {
    pub fn new(item: ItemId) -> Self {
        Self {
            targets: TargetSlots::sole(item),
            dismissed: false,
        }
    }

    /// Removal of an item the user already swiped off screen. It keeps its
    /// translation and opacity while the removal runs.
    pub fn dismissed(item: ItemId) -> Self {
        Self {
            targets: TargetSlots::sole(item),
            dismissed: true,
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn item(&self) -> Option<ItemId> {
        self.targets.get(Occupant::Sole)
    }
}

impl ItemRequest for RemoveRequest {
    const CATEGORY: Category = Category::Remove;

    fn targets(&self) -> &TargetSlots {
        &self.targets
    }

    fn targets_mut(&mut self) -> &mut TargetSlots {
        &mut self.targets
    }

    fn default_hooks() -> CategoryHooks<Self> {
        hooks::remove_hooks()
    }
}

/// Slide an item from its old position to its new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositionRequest {
    targets: TargetSlots,
    pub motion: Motion,
}

impl RepositionRequest {
    pub fn new(item: ItemId, motion: Motion) -> Self {
        Self {
            targets: TargetSlots::sole(item),
            motion,
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        self.targets.get(Occupant::Sole)
    }
}

impl ItemRequest for RepositionRequest {
    const CATEGORY: Category = Category::Reposition;

    fn targets(&self) -> &TargetSlots {
        &self.targets
    }

    fn targets_mut(&mut self) -> &mut TargetSlots {
        &mut self.targets
    }

    fn default_hooks() -> CategoryHooks<Self> {
        hooks::reposition_hooks()
    }
}

/// Cross-fade the old occupant of a slot into the new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceRequest {
    targets: TargetSlots,
    pub motion: Motion,
}

impl ReplaceRequest {
    pub fn new(old: Option<ItemId>, new: Option<ItemId>, motion: Motion) -> Self {
        Self {
            targets: TargetSlots::pair(old, new),
            motion,
        }
    }

    pub fn old_item(&self) -> Option<ItemId> {
        self.targets.get(Occupant::Old)
    }

    pub fn new_item(&self) -> Option<ItemId> {
        self.targets.get(Occupant::New)
    }
}

impl ItemRequest for ReplaceRequest {
    const CATEGORY: Category = Category::Replace;

    fn targets(&self) -> &TargetSlots {
        &self.targets
    }

    fn targets_mut(&mut self) -> &mut TargetSlots {
        &mut self.targets
    }

    fn default_hooks() -> CategoryHooks<Self> {
        hooks::replace_hooks()
    }
}

/// A request of any category, as accepted by
/// [`Coordinator::enqueue`](crate::coordinator::Coordinator::enqueue).
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationRequest {
    Insert(InsertRequest),
    Remove(RemoveRequest),
    Reposition(RepositionRequest),
    Replace(ReplaceRequest),
}

impl AnimationRequest {
    pub fn category(&self) -> Category {
        match self {
            Self::Insert(_) => Category::Insert,
            Self::Remove(_) => Category::Remove,
            Self::Reposition(_) => Category::Reposition,
            Self::Replace(_) => Category::Replace,
        }
    }

    pub fn targets(&self) -> &TargetSlots {
        match self {
            Self::Insert(r) => r.targets(),
            Self::Remove(r) => r.targets(),
            Self::Reposition(r) => r.targets(),
            Self::Replace(r) => r.targets(),
        }
    }
}

impl From<InsertRequest> for AnimationRequest {
    fn from(request: InsertRequest) -> Self {
        Self::Insert(request)
    }
}

impl From<RemoveRequest> for AnimationRequest {
    fn from(request: RemoveRequest) -> Self {
        Self::Remove(request)
    }
}

impl From<RepositionRequest> for AnimationRequest {
    fn from(request: RepositionRequest) -> Self {
        Self::Reposition(request)
    }
}

impl From<ReplaceRequest> for AnimationRequest {
    fn from(request: ReplaceRequest) -> Self {
        Self::Replace(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_slot_lifecycle() {
        let mut slots = TargetSlots::sole(ItemId(1));
        assert!(slots.contains(ItemId(1)));
        assert_eq!(slots.occupant_of(ItemId(1)), Some(Occupant::Sole));
        assert!(!slots.is_fully_spent());

        assert!(!slots.clear(ItemId(2)));
        assert!(slots.clear(ItemId(1)));
        assert!(slots.is_fully_spent());
        assert!(!slots.clear(ItemId(1)));
    }

    #[test]
    fn test_replace_spent_only_after_both_cleared() {
        let mut request = ReplaceRequest::new(
            Some(ItemId(1)),
            Some(ItemId(2)),
            Motion::new(0.0, 0.0, 0.0, 10.0),
        );
        assert_eq!(request.old_item(), Some(ItemId(1)));
        assert_eq!(request.new_item(), Some(ItemId(2)));

        request.targets_mut().clear(ItemId(1));
        assert!(!request.targets().is_fully_spent());
        assert_eq!(request.old_item(), None);

        request.targets_mut().clear(ItemId(2));
        assert!(request.targets().is_fully_spent());
    }

    #[test]
    fn test_replace_with_absent_occupants() {
        let only_new = ReplaceRequest::new(None, Some(ItemId(5)), Motion::default());
        assert_eq!(only_new.targets().iter().count(), 1);
        assert_eq!(only_new.targets().occupant_of(ItemId(5)), Some(Occupant::New));

        let empty = ReplaceRequest::new(None, None, Motion::default());
        assert!(empty.targets().is_fully_spent());
    }

    #[test]
    fn test_same_item_in_both_slots_kept_as_new() {
        let slots = TargetSlots::pair(Some(ItemId(3)), Some(ItemId(3)));
        assert_eq!(slots.iter().collect::<Vec<_>>(), vec![(Occupant::New, ItemId(3))]);
    }

    #[test]
    fn test_dismissed_remove() {
        assert!(RemoveRequest::dismissed(ItemId(4)).is_dismissed());
        assert!(!RemoveRequest::new(ItemId(4)).is_dismissed());
        assert_eq!(RemoveRequest::dismissed(ItemId(4)).item(), Some(ItemId(4)));
    }

    #[test]
    fn test_motion_delta() {
        let motion = Motion::new(10.0, 20.0, 15.0, 5.0);
        assert_eq!(motion.delta_x(), 5.0);
        assert_eq!(motion.delta_y(), -15.0);
    }

    #[test]
    fn test_animation_request_category() {
        let request: AnimationRequest = RemoveRequest::new(ItemId(9)).into();
        assert_eq!(request.category(), Category::Remove);
        assert!(request.targets().contains(ItemId(9)));
    }
}
