//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive an [`Application`](crate::app::Application)
//! without a window system. Use [`render_list_to_string`] to turn a
//! recorded frame into text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::{Pilot, FRAME_DELTA};
pub use snapshot::{command_to_string, render_list_to_string};
