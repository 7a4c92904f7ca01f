//! # vellum
//!
//! A retained-mode UI core: dependency properties, an element tree with
//! measure/arrange layout, routed input and focus, and a render-list frame
//! pipeline that hands flat command lists to a pluggable renderer.
//!
//! vellum does not open windows or talk to a GPU itself. A host supplies a
//! [`render::Renderer`] per surface and a [`popup::Platform`] for popup
//! windows; the crate ships recording and headless implementations of both
//! for tests.
//!
//! ## Core Systems
//!
//! - **[`property`]** — Dependency property registry, typed handles, value levels
//! - **[`tree`]** — Slotmap-backed element arena: visual/logical trees, values, name scopes, templates
//! - **[`layout`]** — Measure/arrange with invalidation, taffy-backed flex panel
//! - **[`widget`]** — Widget trait: measure, arrange and render hooks
//! - **[`widgets`]** — Built-in panels, shapes, text, image and Popup
//! - **[`event`]** — Platform input, routed events, input bindings, the input manager
//! - **[`focus`]** — Keyboard focus and tab/directional navigation
//! - **[`render`]** — Render commands, tree builder, renderer trait, RenderHost
//! - **[`popup`]** — Popup placement, surfaces and the popup service
//! - **[`window`]** / **[`app`]** — Windows and the application frame loop
//! - **[`testing`]** — Headless Pilot and render-list snapshots

// Foundation
pub mod error;
pub mod geometry;
pub mod logging;
pub mod dispatcher;

// Core systems
pub mod property;
pub mod tree;
pub mod layout;

// Widget system
pub mod widget;
pub mod widgets;

// Input
pub mod event;
pub mod focus;

// Rendering
pub mod render;
pub mod popup;

// Application
pub mod window;
pub mod app;

// Test tooling
pub mod testing;

pub use error::{Result, UiError};
