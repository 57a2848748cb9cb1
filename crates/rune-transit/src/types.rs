//! Core identifiers and small value types shared by the transition engine.
//!
//! - `ItemId`: identity of a list item (the owner decides what it maps to)
//! - `Category`: the four kinds of list mutation animation
//! - `Occupant`: which slot of a request an item fills
//! - `ItemProperty` / `PropertyTarget`: what a tween drives
//! - `TweenHandle`: opaque handle returned by a tween driver
//! - `CategoryMap`: one value per category

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Identity of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a tween created by a [`TweenDriver`](crate::tween::TweenDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TweenHandle(pub u64);

/// Identifier of a request inside one category manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

/// Identifier of a deferred-ready batch inside one category manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub(crate) u64);

/// Animation category.
///
/// Each category has its own duration and its own manager; the coordinator
/// orders categories against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Insert,
    Remove,
    Reposition,
    Replace,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 4] = [
        Category::Insert,
        Category::Remove,
        Category::Reposition,
        Category::Replace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Reposition => "reposition",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which slot of a request an item occupies.
///
/// Insert, Remove and Reposition requests have a single `Sole` slot; Replace
/// requests have an `Old` and a `New` slot for the outgoing and incoming
/// occupant of the same logical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    Sole,
    Old,
    New,
}

/// Visual property of an item that a tween can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemProperty {
    Alpha,
    TranslationX,
    TranslationY,
}

impl ItemProperty {
    /// Value of the property when the item is at rest.
    pub fn resting_value(self) -> f32 {
        match self {
            Self::Alpha => 1.0,
            Self::TranslationX | Self::TranslationY => 0.0,
        }
    }
}

/// Target value for one property of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyTarget {
    pub property: ItemProperty,
    pub value: f32,
}

impl PropertyTarget {
    pub fn new(property: ItemProperty, value: f32) -> Self {
        Self { property, value }
    }

    pub fn alpha(value: f32) -> Self {
        Self::new(ItemProperty::Alpha, value)
    }

    pub fn translation_x(value: f32) -> Self {
        Self::new(ItemProperty::TranslationX, value)
    }

    pub fn translation_y(value: f32) -> Self {
        Self::new(ItemProperty::TranslationY, value)
    }
}

/// Where an item currently sits within one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Absent,
    Pending,
    Deferred,
    Active,
}

/// One value per [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryMap<T> {
    pub insert: T,
    pub remove: T,
    pub reposition: T,
    pub replace: T,
}

impl<T> CategoryMap<T> {
    /// Build a map by evaluating `f` for every category.
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            insert: f(Category::Insert),
            remove: f(Category::Remove),
            reposition: f(Category::Reposition),
            replace: f(Category::Replace),
        }
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        match category {
            Category::Insert => &self.insert,
            Category::Remove => &self.remove,
            Category::Reposition => &self.reposition,
            Category::Replace => &self.replace,
        }
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Insert => &mut self.insert,
            Category::Remove => &mut self.remove,
            Category::Reposition => &mut self.reposition,
            Category::Replace => &mut self.replace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_map_indexing() {
        let mut map = CategoryMap::from_fn(|c| c.as_str().len());
        assert_eq!(map[Category::Insert], 6);
        assert_eq!(map[Category::Reposition], 10);

        map[Category::Remove] = 0;
        assert_eq!(map.remove, 0);
    }

    #[test]
    fn test_resting_values() {
        assert_eq!(ItemProperty::Alpha.resting_value(), 1.0);
        assert_eq!(ItemProperty::TranslationX.resting_value(), 0.0);
        assert_eq!(ItemProperty::TranslationY.resting_value(), 0.0);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&Category::Reposition).unwrap();
        assert_eq!(json, "\"reposition\"");
        let parsed: Category = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(parsed, Category::Replace);
    }
}
