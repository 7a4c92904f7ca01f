//! Widget system: the per-type behavior trait.

pub mod traits;

pub use traits::Widget;
