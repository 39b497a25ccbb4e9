//! Capabilities the overview core consumes from the rest of the compositor.
//!
//! Each collaborator is a trait so the core can be driven by a real
//! compositor or by the in-memory [`crate::headless`] host.

pub mod render;
pub mod switcher;
pub mod wall;
pub mod window_manager;

pub use render::{EffectHandle, EffectPhase, Framebuffer, RenderPipeline};
pub use switcher::{SwitchFilter, Switcher};
pub use wall::WorkspaceWall;
pub use window_manager::{NewView, WindowManager};

/// Borrowed view of one output's collaborators, handed to every controller
/// entry point for the duration of a single call.
pub struct Shell<'a> {
    pub windows: &'a mut dyn WindowManager,
    pub render: &'a mut dyn RenderPipeline,
    pub wall: &'a mut dyn WorkspaceWall,
    pub switcher: &'a mut dyn Switcher,
}
