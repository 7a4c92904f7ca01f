//! Rendering pipeline: render list, tree builder, renderer backends, host.

pub mod list;
pub mod builder;
pub mod renderer;
pub mod recording;
pub mod host;

pub use list::{CornerRadius, Glyph, ImageSource, PathSegment, RenderCommand, RenderList, StackKind};
pub use builder::{RenderCx, RenderTreeBuilder};
pub use renderer::{Extent, FrameContext, Renderer, RendererParams};
pub use recording::{RecordedFrame, RecordingHandle, RecordingRenderer};
pub use host::RenderHost;
