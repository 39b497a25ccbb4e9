use super::render::Framebuffer;
use super::window_manager::WindowManager;
use crate::model::Rect;

/// Renders every workspace of an output tiled into one rectangle.
pub trait WorkspaceWall {
    /// The rectangle covering the full workspace grid.
    fn wall_rectangle(&self) -> Rect;

    /// Sets the visible part of the wall. [`Rect::EMPTY`] disables it.
    fn set_viewport(&mut self, viewport: Rect);

    /// Paints the wall into `target` at `rect`, sampling the live contents of
    /// the windows that are visible right now.
    fn render_wall(&mut self, windows: &dyn WindowManager, target: &Framebuffer, rect: Rect);
}
