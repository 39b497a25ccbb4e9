pub mod geometry;
pub mod window;

pub use geometry::{Point, Rect};
pub use window::{DataKey, Layer, Layers, OutputId, WindowId, WindowKind};
