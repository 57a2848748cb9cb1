//! Binds driver tween handles back to the request and item they animate.
//!
//! This replaces a per-tween listener object: the manager records a binding
//! when it starts a tween and looks it up again when the driver reports a
//! lifecycle event. Detaching a binding is what makes completion idempotent,
//! since a second report for the same handle finds nothing.

use std::collections::BTreeMap;

use crate::types::{ItemId, RequestId, TweenHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TweenBinding {
    pub request: RequestId,
    pub item: ItemId,
    /// A cancel report was delivered; the end report will finish the item.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ListenerTable {
    bindings: BTreeMap<TweenHandle, TweenBinding>,
}

impl ListenerTable {
    pub fn bind(&mut self, handle: TweenHandle, request: RequestId, item: ItemId) {
        let previous = self.bindings.insert(
            handle,
            TweenBinding {
                request,
                item,
                cancelled: false,
            },
        );
        assert!(previous.is_none(), "tween {handle:?} bound twice");
    }

    pub fn get(&self, handle: TweenHandle) -> Option<&TweenBinding> {
        self.bindings.get(&handle)
    }

    pub fn contains(&self, handle: TweenHandle) -> bool {
        self.bindings.contains_key(&handle)
    }

    /// Flag the binding as cancelled. Returns it only the first time.
    pub fn mark_cancelled(&mut self, handle: TweenHandle) -> Option<TweenBinding> {
        let binding = self.bindings.get_mut(&handle)?;
        if binding.cancelled {
            return None;
        }
        binding.cancelled = true;
        Some(*binding)
    }

    pub fn detach(&mut self, handle: TweenHandle) -> Option<TweenBinding> {
        self.bindings.remove(&handle)
    }

    /// Drop every binding for `item`, returning how many there were.
    pub fn detach_item(&mut self, item: ItemId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, b| b.item != item);
        before - self.bindings.len()
    }

    /// Handles bound to `item`, in creation order.
    pub fn handles_for(&self, item: ItemId) -> Vec<TweenHandle> {
        self.bindings
            .iter()
            .filter(|(_, b)| b.item == item)
            .map(|(h, _)| *h)
            .collect()
    }

    /// All bound handles, in creation order.
    pub fn handles(&self) -> Vec<TweenHandle> {
        self.bindings.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_detach() {
        let mut table = ListenerTable::default();
        table.bind(TweenHandle(1), RequestId(0), ItemId(10));
        table.bind(TweenHandle(2), RequestId(0), ItemId(11));

        assert!(table.contains(TweenHandle(1)));
        assert_eq!(table.handles_for(ItemId(11)), vec![TweenHandle(2)]);

        let binding = table.detach(TweenHandle(1)).unwrap();
        assert_eq!(binding.item, ItemId(10));
        assert!(table.detach(TweenHandle(1)).is_none());
        assert_eq!(table.handles(), vec![TweenHandle(2)]);
    }

    #[test]
    fn test_mark_cancelled_once() {
        let mut table = ListenerTable::default();
        table.bind(TweenHandle(7), RequestId(3), ItemId(1));

        assert!(table.mark_cancelled(TweenHandle(7)).is_some());
        assert!(table.mark_cancelled(TweenHandle(7)).is_none());
        assert!(table.get(TweenHandle(7)).unwrap().cancelled);
        assert!(table.mark_cancelled(TweenHandle(8)).is_none());
    }

    #[test]
    fn test_detach_item() {
        let mut table = ListenerTable::default();
        table.bind(TweenHandle(1), RequestId(0), ItemId(5));
        table.bind(TweenHandle(2), RequestId(1), ItemId(6));

        assert_eq!(table.detach_item(ItemId(5)), 1);
        assert_eq!(table.detach_item(ItemId(5)), 0);
        assert_eq!(table.handles(), vec![TweenHandle(2)]);
    }

    #[test]
    #[should_panic(expected = "bound twice")]
    fn test_double_bind_panics() {
        let mut table = ListenerTable::default();
        table.bind(TweenHandle(1), RequestId(0), ItemId(5));
        table.bind(TweenHandle(1), RequestId(1), ItemId(6));
    }
}
