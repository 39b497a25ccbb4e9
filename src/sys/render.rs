use slotmap::new_key_type;

use crate::model::{OutputId, Rect};

new_key_type! {
    /// Subscription handle returned when registering a frame effect.
    pub struct EffectHandle;
}

/// Point in a frame at which registered effects run.
///
/// Within one frame all `Pre` effects run before any `Overlay` effect, and
/// `Overlay` effects run before `Post`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EffectPhase {
    Pre,
    Overlay,
    Post,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pub output: OutputId,
    pub geometry: Rect,
}

pub trait RenderPipeline {
    fn add_effect(&mut self, phase: EffectPhase) -> EffectHandle;

    /// Returns false if `handle` was not registered.
    fn rem_effect(&mut self, handle: EffectHandle) -> bool;

    fn damage(&mut self, rect: Rect);

    /// Whether any damage is already queued for the next frame.
    fn has_scheduled_damage(&self) -> bool;

    fn target_framebuffer(&self) -> Framebuffer;
}
