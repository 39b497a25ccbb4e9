use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::overview::MirrorProxy;

new_key_type! {
    /// Generation-checked handle to a compositor window.
    ///
    /// A handle outlives the window it names; lookups through a stale handle
    /// resolve to `None` instead of reaching a reused slot.
    pub struct WindowId;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputId(u32);

impl OutputId {
    pub const fn new(id: u32) -> Self { Self(id) }
}

/// What a window is, checked by pattern match rather than by downcasting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowKind {
    /// A real client window. Only these take part in the switch algorithm.
    Normal,
    /// A visual stand-in for a normal window, torn down when overview ends.
    Mirror(MirrorProxy),
}

impl WindowKind {
    pub fn is_normal(&self) -> bool { matches!(self, WindowKind::Normal) }

    pub fn is_mirror(&self) -> bool { matches!(self, WindowKind::Mirror(_)) }

    pub fn as_mirror(&self) -> Option<&MirrorProxy> {
        match self {
            WindowKind::Mirror(proxy) => Some(proxy),
            WindowKind::Normal => None,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Layer {
    Background,
    Bottom,
    Workspace,
    Top,
    Fullscreen,
    Unmanaged,
    Lock,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Background,
        Layer::Bottom,
        Layer::Workspace,
        Layer::Top,
        Layer::Fullscreen,
        Layer::Unmanaged,
        Layer::Lock,
    ];

    pub fn bit(self) -> Layers {
        match self {
            Layer::Background => Layers::BACKGROUND,
            Layer::Bottom => Layers::BOTTOM,
            Layer::Workspace => Layers::WORKSPACE,
            Layer::Top => Layers::TOP,
            Layer::Fullscreen => Layers::FULLSCREEN,
            Layer::Unmanaged => Layers::UNMANAGED,
            Layer::Lock => Layers::LOCK,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Layers: u32 {
        const BACKGROUND = 1 << 0;
        const BOTTOM = 1 << 1;
        const WORKSPACE = 1 << 2;
        const TOP = 1 << 3;
        const FULLSCREEN = 1 << 4;
        const UNMANAGED = 1 << 5;
        const LOCK = 1 << 6;

        /// Layers holding windows the window manager arranges.
        const WM = Self::WORKSPACE.bits() | Self::FULLSCREEN.bits();
    }
}

impl Layers {
    pub fn includes(self, layer: Layer) -> bool { self.contains(layer.bit()) }
}

impl FromIterator<Layer> for Layers {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        iter.into_iter().fold(Layers::empty(), |acc, layer| acc | layer.bit())
    }
}

/// Name of a piece of data attached to a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataKey(&'static str);

impl DataKey {
    pub const fn new(name: &'static str) -> Self { Self(name) }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn wm_layers_cover_workspace_and_fullscreen() {
        let layers: Layers = [Layer::Workspace, Layer::Fullscreen].into_iter().collect();
        assert_eq!(layers, Layers::WM);
        assert!(Layers::WM.includes(Layer::Workspace));
        assert!(!Layers::WM.includes(Layer::Top));
    }

    #[test]
    fn layer_names_are_snake_case() {
        assert_eq!(Layer::Fullscreen.to_string(), "fullscreen");
        assert_eq!(Layer::ALL.len(), 7);
    }
}
