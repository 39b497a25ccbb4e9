//! Overview mode: live mirrors of every window laid out by the switcher on top
//! of a wall of all workspaces.
//!
//! The controller coordinates three subsystems that know nothing of each
//! other. It creates a mirror for each real window and starts the switcher,
//! strips real windows out of the switcher's filter notifications so only
//! mirrors get laid out, and keeps the workspace wall painting underneath.
//! On switch end it closes the mirrors and shows the real windows again.

mod filter;
mod ledger;
mod mirror;
mod overlay;

pub use filter::SwitchEventFilter;
pub use ledger::{HIDDEN_MARK, VisibilityLedger};
pub use mirror::{MIRROR_TITLE_SUFFIX, MirrorProxy, UNMAPPED_MIRROR_TITLE};
pub use overlay::{OverlayScheduler, OverlayState};
use tracing::{debug, info, instrument, trace};

use crate::common::config::{Modifiers, OverviewSettings};
use crate::model::{Layers, OutputId, WindowId, WindowKind};
use crate::sys::{EffectHandle, Shell, SwitchFilter, WindowManager};

#[derive(Debug)]
pub enum Event<'a> {
    Activate,
    Key(Modifiers, &'a str),
    SwitchFilter(&'a mut SwitchFilter),
    SwitchEnd,
    Effect(EffectHandle),
    Shutdown,
}

/// One overview session per output.
#[derive(Debug)]
pub struct OverviewController {
    output: OutputId,
    settings: OverviewSettings,
    layers: Layers,
    ledger: VisibilityLedger,
    filter: SwitchEventFilter,
    overlay: OverlayScheduler,
    mirrors_active: bool,
}

impl OverviewController {
    pub fn new(output: OutputId, settings: OverviewSettings) -> Self {
        let layers = settings.layers();
        let ledger = VisibilityLedger::new(layers);
        let overlay = OverlayScheduler::new(output, settings.overlay_rect, settings.damage, ledger);
        Self {
            output,
            settings,
            layers,
            ledger,
            filter: SwitchEventFilter::new(ledger),
            overlay,
            mirrors_active: false,
        }
    }

    pub fn output(&self) -> OutputId { self.output }

    pub fn settings(&self) -> &OverviewSettings { &self.settings }

    pub fn mirrors_active(&self) -> bool { self.mirrors_active }

    pub fn overlay_state(&self) -> OverlayState { self.overlay.state() }

    pub fn is_active(&self) -> bool {
        self.mirrors_active || self.overlay.state() == OverlayState::Active
    }

    pub fn ledger(&self) -> &VisibilityLedger { &self.ledger }

    #[instrument(skip(self, shell), fields(output = ?self.output))]
    pub fn handle_event(&mut self, event: Event<'_>, shell: &mut Shell<'_>) {
        match event {
            Event::Activate => self.activate(shell),
            Event::Key(modifiers, key) => {
                self.handle_key(modifiers, key, shell);
            }
            Event::SwitchFilter(filter) => self.on_switch_filter(filter, shell),
            Event::SwitchEnd => self.on_switch_end(shell),
            Event::Effect(handle) => {
                self.run_effect(handle, shell);
            }
            Event::Shutdown => self.shutdown(shell),
        }
    }

    /// Runs [`Self::activate`] if the combination is the configured binding.
    pub fn handle_key(&mut self, modifiers: Modifiers, key: &str, shell: &mut Shell<'_>) -> bool {
        if !self.settings.activate.matches(modifiers, key) {
            return false;
        }
        self.activate(shell);
        true
    }

    #[instrument(skip(self, shell), fields(output = ?self.output))]
    pub fn activate(&mut self, shell: &mut Shell<'_>) {
        if shell.switcher.is_active() {
            info!("switcher already running, stopping it");
            shell.switcher.toggle();
            return;
        }

        if !self.mirrors_active {
            self.mirrors_active = true;
            let count = self.spawn_mirrors(shell.windows);
            info!(count, "mirrors created");
        }

        shell.switcher.toggle();
        self.overlay.enable(shell);
    }

    fn spawn_mirrors(&self, windows: &mut dyn WindowManager) -> usize {
        let focused = windows.active_view(self.output);
        let mut count = 0;
        for view in windows.views_in_layer(self.output, self.layers) {
            if !matches!(windows.kind(view), Some(WindowKind::Normal)) {
                continue;
            }
            let Some(mirror) = MirrorProxy::spawn(windows, view) else {
                continue;
            };
            if focused == Some(view) {
                windows.focus_view(mirror);
            }
            count += 1;
        }
        count
    }

    /// Filters a switcher notification. Outside of an overview session the
    /// notification is left alone, so the switcher keeps working on its own.
    pub fn on_switch_filter(&mut self, event: &mut SwitchFilter, shell: &mut Shell<'_>) {
        if !self.mirrors_active {
            trace!("no mirrors, leaving switch filter untouched");
            return;
        }
        let hidden = self.filter.filter(shell.windows, event);
        trace!(hidden, shown = event.views_shown.len(), "filtered switch views");
    }

    #[instrument(skip(self, shell), fields(output = ?self.output))]
    pub fn on_switch_end(&mut self, shell: &mut Shell<'_>) {
        let windows = &mut *shell.windows;
        let mut mirrors: Vec<(WindowId, MirrorProxy)> = Vec::new();
        let mut restored = 0;
        // Mirrors always live in the workspace layer, and marked windows may
        // have changed layer since they were hidden.
        for view in windows.views_in_layer(self.output, Layers::all()) {
            match windows.kind(view) {
                Some(WindowKind::Mirror(proxy)) => mirrors.push((view, proxy)),
                Some(WindowKind::Normal) => {
                    if self.ledger.restore(windows, view) {
                        restored += 1;
                    }
                }
                None => {}
            }
        }

        let focused = windows.active_view(self.output);
        for (mirror, proxy) in &mirrors {
            if focused == Some(*mirror) && proxy.is_alive(windows) {
                windows.focus_view(proxy.base());
            }
            debug!(?mirror, "closing mirror");
            windows.close_view(*mirror);
        }
        info!(mirrors = mirrors.len(), restored, "overview ended");

        self.mirrors_active = false;
        self.overlay.disable(shell);
    }

    /// Dispatches a frame effect. Returns false for handles owned by someone else.
    pub fn run_effect(&self, handle: EffectHandle, shell: &mut Shell<'_>) -> bool {
        self.overlay.run_effect(handle, shell)
    }

    /// Tears the session down when the output goes away or the plugin unloads.
    #[instrument(skip(self, shell), fields(output = ?self.output))]
    pub fn shutdown(&mut self, shell: &mut Shell<'_>) {
        if !self.is_active() {
            return;
        }
        let stop_switcher = self.mirrors_active && shell.switcher.is_active();
        self.on_switch_end(shell);
        if stop_switcher {
            shell.switcher.toggle();
        }
    }
}
