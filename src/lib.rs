//! Overview mode for a compositing window manager.
//!
//! Layers mirrors of every window over a tiled wall of all workspaces while
//! the window switcher is running. See [`overview::OverviewController`].

pub mod common;
pub mod headless;
pub mod model;
pub mod overview;
pub mod sys;
