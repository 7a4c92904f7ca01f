//! Popups: placement, platform surfaces, per-popup roots and the service
//! that keeps them in step with `IsOpen`.

pub mod placement;
pub mod platform;
pub mod root;
pub mod service;

pub use placement::{place_popup, Monitor, PlacementMode, PlacementRequest};
pub use platform::{HeadlessHandle, HeadlessPlatform, Platform, PopupSurface, SurfaceRecord};
pub use root::{PopupAnimation, PopupRoot, FADE_DURATION};
pub use service::PopupService;
