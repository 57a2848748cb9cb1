//! Transition coordination for list items.
//!
//! When items of a visual list are inserted, removed, moved or swapped, this
//! crate decides when each item's animation starts, tracks it while it runs
//! and reports when each item (and finally the whole list) is done.
//!
//! - **Requests**: one type per category (insert, remove, reposition, replace)
//! - **Category managers**: Pending → Deferred → Active bookkeeping per category
//! - **Schedule**: removals first, then moves and replacements, then insertions
//! - **Tween driver**: the seam to whatever actually interpolates properties
//! - **Events**: `Starting` / `Finished` per item and `AllFinished` per drain
//!
//! # Architecture
//!
//! ```text
//! Coordinator<D: TweenDriver>
//!   ├── CategoryManager<InsertRequest>
//!   ├── CategoryManager<RemoveRequest>
//!   ├── CategoryManager<RepositionRequest>
//!   ├── CategoryManager<ReplaceRequest>
//!   ├── DeferredTimers   (deferred-ready batches, fired by `advance`)
//!   └── EventQueue       (drained by the owner)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use rune_transit::{Coordinator, ItemId, SimulatedTweens};
//!
//! let mut coordinator = Coordinator::new(SimulatedTweens::new());
//! coordinator.notify_remove(ItemId(3));
//! coordinator.notify_reposition(ItemId(4), 0.0, 120.0, 0.0, 80.0);
//! coordinator.run_pending_animations();
//!
//! while coordinator.is_running() {
//!     coordinator.step(Duration::from_millis(16));
//!     for event in coordinator.drain_events() {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod coordinator;
pub mod easing;
pub mod events;
pub mod hooks;
mod listener;
pub mod manager;
pub mod request;
pub mod schedule;
pub mod sim;
mod timer;
pub mod tween;
pub mod types;

pub use coordinator::{Coordinator, Managers};
pub use easing::EasingFunction;
pub use events::{EventQueue, TransitionEvent};
pub use hooks::{CategoryHooks, CreateHook, LifecycleHook};
pub use manager::CategoryManager;
pub use request::{
    AnimationRequest, InsertRequest, ItemRequest, Motion, RemoveRequest, ReplaceRequest,
    RepositionRequest, TargetSlots,
};
pub use schedule::{Launch, PendingSummary, SchedulePlan, ScheduleRule, default_schedule};
pub use sim::SimulatedTweens;
pub use tween::{TweenContext, TweenDriver, TweenEvent};
pub use types::{
    Category, CategoryMap, ItemId, ItemProperty, ItemState, Occupant, PropertyTarget, TweenHandle,
};
