//! Host bindings for the `listwindow` crate.
//!
//! `listwindow` holds the windowing math and size bookkeeping. This crate connects it to a
//! rendering surface through the [`Host`] capability trait:
//!
//! - [`ScrollTracker`]: finds the element that actually scrolls a list (or the page) and keeps
//!   the shared scroll metrics current
//! - [`VariableList`]: rows with individual measured heights, scroll compensation when rows
//!   above the viewport change size
//! - [`FixedList`]: uniform rows, windowed arithmetically with spacer heights
//!
//! The crate never reads clocks or schedules work on its own; the host forwards events with a
//! millisecond timestamp and calls back for frames and microtasks it was asked for.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod fixed;
mod host;
mod options;
mod tracker;
mod variable;

#[cfg(test)]
mod tests;

pub use fixed::FixedList;
pub use host::{
    FrameHandle, Host, ObserverHandle, Overflow, ScrollContainer, find_scroll_parent,
    is_scrollable,
};
pub use options::{Estimate, FixedListOptions, KeyFn, VariableListOptions};
pub use tracker::{ScrollParentResolver, ScrollTracker};
pub use variable::{Entry, EntryKey, VariableList};
