//! A headless windowing engine for long vertical lists.
//!
//! For host bindings (scroll container detection, list controllers), see the
//! `listwindow-adapter` crate.
//!
//! This crate holds the parts that do not depend on any rendering surface:
//! - prefix-sum offsets over per-item heights ([`OffsetTable`])
//! - offset → index window queries, for variable and uniform row heights ([`window`])
//! - measured sizes keyed by item identity, with coalesced small updates ([`SizeTracker`])
//! - a shared scroll read model ([`ScrollModel`]) and a "viewport changed" source
//!   ([`LayoutTick`])
//!
//! Rows are one-dimensional: sizes are heights and offsets grow downwards.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod key;
mod layout;
mod offsets;
mod scroll;
mod sizes;
mod types;
pub mod window;


pub use layout::{LayoutSubscriber, LayoutTick, SubscriptionId};
pub use offsets::OffsetTable;
pub use scroll::{ScrollMetrics, ScrollMetricsReader, ScrollModel};
pub use sizes::{
    SizeChange, SizePolicy, SizeReport, SizeTracker, compensation_delta, measured_px,
};
pub use types::{FixedWindow, VisibleWindow};
pub use window::{window_for_fixed, window_for_offsets};

pub use key::ItemKey;
#[doc(hidden)]
pub use key::KeyMap;
