use tracing::{debug, trace};

use super::ledger::VisibilityLedger;
use crate::common::config::DamagePolicy;
use crate::model::{OutputId, Rect};
use crate::sys::{EffectHandle, EffectPhase, RenderPipeline, Shell};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OverlayState {
    #[default]
    Inactive,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OverlayHooks {
    paint: EffectHandle,
    damage: EffectHandle,
}

/// Paints the workspace wall behind the switch view.
///
/// While enabled it owns exactly two frame effects: a pre-frame effect that
/// damages the overlay rectangle and an overlay-phase effect that renders the
/// wall. The handles are kept so disabling revokes exactly those two.
#[derive(Debug)]
pub struct OverlayScheduler {
    output: OutputId,
    rect: Rect,
    damage: DamagePolicy,
    ledger: VisibilityLedger,
    hooks: Option<OverlayHooks>,
}

impl OverlayScheduler {
    pub fn new(output: OutputId, rect: Rect, damage: DamagePolicy, ledger: VisibilityLedger) -> Self {
        Self { output, rect, damage, ledger, hooks: None }
    }

    pub fn state(&self) -> OverlayState {
        match self.hooks {
            Some(_) => OverlayState::Active,
            None => OverlayState::Inactive,
        }
    }

    /// Returns false if the overlay was already enabled.
    pub fn enable(&mut self, shell: &mut Shell<'_>) -> bool {
        if self.hooks.is_some() {
            return false;
        }
        let viewport = shell.wall.wall_rectangle();
        shell.wall.set_viewport(viewport);
        self.hooks = Some(OverlayHooks {
            paint: shell.render.add_effect(EffectPhase::Overlay),
            damage: shell.render.add_effect(EffectPhase::Pre),
        });
        debug!(output = ?self.output, ?viewport, "overlay enabled");
        true
    }

    /// Returns false if the overlay was already disabled.
    pub fn disable(&mut self, shell: &mut Shell<'_>) -> bool {
        let Some(hooks) = self.hooks.take() else {
            return false;
        };
        shell.wall.set_viewport(Rect::EMPTY);
        shell.render.rem_effect(hooks.paint);
        shell.render.rem_effect(hooks.damage);
        // Clear whatever the last overlay frame left on screen.
        shell.render.damage(self.rect);
        debug!(output = ?self.output, "overlay disabled");
        true
    }

    /// Runs the effect registered under `handle`. Returns false for handles
    /// this scheduler does not own.
    pub fn run_effect(&self, handle: EffectHandle, shell: &mut Shell<'_>) -> bool {
        match self.hooks {
            Some(hooks) if hooks.paint == handle => {
                self.paint(shell);
                true
            }
            Some(hooks) if hooks.damage == handle => {
                self.schedule_damage(shell.render);
                true
            }
            _ => false,
        }
    }

    /// Renders the wall with the real windows briefly swapped back in, so the
    /// workspace thumbnails show live content instead of blank windows.
    fn paint(&self, shell: &mut Shell<'_>) {
        trace!(output = ?self.output, "painting workspace wall");
        self.ledger.show_mirrors(shell.windows, self.output, false);
        let target = shell.render.target_framebuffer();
        shell.wall.render_wall(shell.windows, &target, self.rect);
        self.ledger.show_mirrors(shell.windows, self.output, true);
    }

    fn schedule_damage(&self, render: &mut dyn RenderPipeline) {
        let damage = match self.damage {
            DamagePolicy::Always => true,
            DamagePolicy::WhenScheduled => render.has_scheduled_damage(),
        };
        if damage {
            render.damage(self.rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::headless::{HeadlessRender, HeadlessSwitcher, HeadlessWall, HeadlessWindows};
    use crate::model::{Layer, Layers};
    use crate::overview::MirrorProxy;
    use crate::sys::WindowManager;

    const OUTPUT: OutputId = OutputId::new(1);
    const OVERLAY: Rect = Rect::new(0, 0, 300, 600);
    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    struct Fixture {
        windows: HeadlessWindows,
        render: HeadlessRender,
        wall: HeadlessWall,
        switcher: HeadlessSwitcher,
        overlay: OverlayScheduler,
    }

    impl Fixture {
        fn new(damage: DamagePolicy) -> Self {
            let ledger = VisibilityLedger::new(Layers::WM);
            Self {
                windows: HeadlessWindows::new(),
                render: HeadlessRender::new(OUTPUT, SCREEN),
                wall: HeadlessWall::new(Rect::new(0, 0, 5760, 3240)),
                switcher: HeadlessSwitcher::default(),
                overlay: OverlayScheduler::new(OUTPUT, OVERLAY, damage, ledger),
            }
        }

        fn with_shell<T>(&mut self, f: impl FnOnce(&mut OverlayScheduler, &mut Shell<'_>) -> T) -> T {
            let mut shell = Shell {
                windows: &mut self.windows,
                render: &mut self.render,
                wall: &mut self.wall,
                switcher: &mut self.switcher,
            };
            f(&mut self.overlay, &mut shell)
        }

        fn run(&mut self, phase: EffectPhase) {
            for handle in self.render.effects(phase) {
                self.with_shell(|overlay, shell| assert!(overlay.run_effect(handle, shell)));
            }
        }
    }

    #[test]
    fn enable_is_idempotent() {
        let mut fx = Fixture::new(DamagePolicy::Always);

        assert!(fx.with_shell(|overlay, shell| overlay.enable(shell)));
        let viewport = fx.wall.viewport();
        assert!(!fx.with_shell(|overlay, shell| overlay.enable(shell)));

        assert_eq!(fx.overlay.state(), OverlayState::Active);
        assert_eq!(fx.render.effect_count(), 2);
        assert_eq!(fx.render.effects(EffectPhase::Pre).len(), 1);
        assert_eq!(fx.render.effects(EffectPhase::Overlay).len(), 1);
        assert_eq!(fx.wall.viewport(), viewport);
        assert_eq!(viewport, Rect::new(0, 0, 5760, 3240));
    }

    #[test]
    fn disable_revokes_both_effects_and_damages_once() {
        let mut fx = Fixture::new(DamagePolicy::Always);
        fx.with_shell(|overlay, shell| overlay.enable(shell));
        let other = fx.render.add_effect(EffectPhase::Overlay);

        assert!(fx.with_shell(|overlay, shell| overlay.disable(shell)));
        assert!(!fx.with_shell(|overlay, shell| overlay.disable(shell)));

        assert_eq!(fx.overlay.state(), OverlayState::Inactive);
        assert_eq!(fx.render.effects(EffectPhase::Overlay), vec![other]);
        assert_eq!(fx.render.effect_count(), 1);
        assert_eq!(fx.wall.viewport(), Rect::EMPTY);
        assert_eq!(fx.render.damage_log(), &[OVERLAY]);
    }

    #[test]
    fn foreign_handles_are_ignored() {
        let mut fx = Fixture::new(DamagePolicy::Always);
        fx.with_shell(|overlay, shell| overlay.enable(shell));
        let other = fx.render.add_effect(EffectPhase::Pre);

        assert!(!fx.with_shell(|overlay, shell| overlay.run_effect(other, shell)));
        assert!(fx.render.damage_log().is_empty());
    }

    #[test]
    fn paint_renders_wall_with_real_windows_visible() {
        let mut fx = Fixture::new(DamagePolicy::Always);
        let a = fx.windows.open(OUTPUT, Layer::Workspace, "a", Rect::new(0, 0, 100, 100));
        let b = fx.windows.open(OUTPUT, Layer::Workspace, "b", Rect::new(100, 0, 100, 100));
        let mirror_a = MirrorProxy::spawn(&mut fx.windows, a).unwrap();
        let mirror_b = MirrorProxy::spawn(&mut fx.windows, b).unwrap();
        let ledger = VisibilityLedger::new(Layers::WM);
        ledger.hide(&mut fx.windows, a);
        ledger.hide(&mut fx.windows, b);
        fx.with_shell(|overlay, shell| overlay.enable(shell));

        fx.run(EffectPhase::Overlay);

        let renders = fx.wall.renders();
        assert_eq!(renders.len(), 1);
        assert_eq!(renders[0].rect, OVERLAY);
        assert_eq!(renders[0].target.output, OUTPUT);
        assert_eq!(renders[0].visible, vec![a, b]);

        assert!(!fx.windows.is_visible(a));
        assert!(!fx.windows.is_visible(b));
        assert!(fx.windows.is_visible(mirror_a));
        assert!(fx.windows.is_visible(mirror_b));
    }

    #[test]
    fn damage_policy_always_damages_every_frame() {
        let mut fx = Fixture::new(DamagePolicy::Always);
        fx.with_shell(|overlay, shell| overlay.enable(shell));

        fx.run(EffectPhase::Pre);
        fx.run(EffectPhase::Pre);

        assert_eq!(fx.render.damage_log(), &[OVERLAY, OVERLAY]);
    }

    #[test]
    fn damage_policy_when_scheduled_waits_for_damage() {
        let mut fx = Fixture::new(DamagePolicy::WhenScheduled);
        fx.with_shell(|overlay, shell| overlay.enable(shell));

        fx.run(EffectPhase::Pre);
        assert!(fx.render.damage_log().is_empty());

        let client = Rect::new(500, 500, 10, 10);
        fx.render.damage(client);
        fx.run(EffectPhase::Pre);
        assert_eq!(fx.render.damage_log(), &[client, OVERLAY]);
    }
}
