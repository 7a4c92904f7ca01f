//! Built-in widgets: panels, Border, shapes, Image, TextBlock, Popup.

pub mod panel;
pub mod stack_panel;
pub mod canvas;
pub mod flex_panel;
pub mod border;
pub mod rectangle;
pub mod shapes;
pub mod image;
pub mod text_block;
pub mod popup;

pub use panel::Panel;
pub use stack_panel::{Orientation, StackPanel};
pub use canvas::{Canvas, CanvasProperties};
pub use flex_panel::FlexPanel;
pub use border::Border;
pub use rectangle::Rectangle;
pub use shapes::{PathShape, Polygon};
pub use image::Image;
pub use text_block::TextBlock;
pub use popup::Popup;
