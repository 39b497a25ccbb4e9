//! An in-memory compositor.
//!
//! Implements every collaborator the overview core consumes, and a small host
//! that owns one controller per output, routes switcher notifications to it,
//! and paints frames by running registered effects phase by phase.

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::common::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use crate::common::config::{Modifiers, OverviewSettings};
use crate::model::{DataKey, Layer, Layers, OutputId, Point, Rect, WindowId, WindowKind};
use crate::overview::OverviewController;
use crate::sys::{
    EffectHandle, EffectPhase, Framebuffer, NewView, RenderPipeline, Shell, SwitchFilter,
    Switcher, WindowManager, WorkspaceWall,
};

#[derive(Debug)]
struct WindowRecord {
    kind: WindowKind,
    output: OutputId,
    layer: Layer,
    frame: Rect,
    title: String,
    visible: bool,
    activated: bool,
    mapped: bool,
    data: HashSet<DataKey>,
}

/// Window stack shared by all outputs.
#[derive(Debug, Default)]
pub struct HeadlessWindows {
    windows: SlotMap<WindowId, WindowRecord>,
    /// Bottom to top.
    stacking: Vec<WindowId>,
    focus: HashMap<OutputId, WindowId>,
}

impl HeadlessWindows {
    pub fn new() -> Self { Self::default() }

    /// Opens and maps a normal window.
    pub fn open(&mut self, output: OutputId, layer: Layer, title: &str, frame: Rect) -> WindowId {
        let id = self.add_view(NewView {
            kind: WindowKind::Normal,
            output,
            layer,
            frame,
            title: title.to_string(),
        });
        self.emit_map(id);
        id
    }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn is_mapped(&self, id: WindowId) -> bool { self.windows.get(id).is_some_and(|w| w.mapped) }

    pub fn is_activated(&self, id: WindowId) -> bool {
        self.windows.get(id).is_some_and(|w| w.activated)
    }

    pub fn mirrors(&self, output: OutputId) -> Vec<WindowId> {
        self.stacking
            .iter()
            .copied()
            .filter(|&id| {
                let w = &self.windows[id];
                w.output == output && w.kind.is_mirror()
            })
            .collect()
    }

    pub fn mirror_of(&self, base: WindowId) -> Option<WindowId> {
        self.stacking.iter().copied().find(|&id| {
            self.windows[id].kind.as_mirror().is_some_and(|proxy| proxy.base() == base)
        })
    }

    /// Topmost window on `output` that takes pointer input at `point`.
    ///
    /// Mirrors hit-test through their base, so a mirror whose base would
    /// refuse the point lets it fall through to whatever is underneath.
    pub fn view_at(&self, output: OutputId, point: Point) -> Option<WindowId> {
        self.stacking.iter().rev().copied().find(|&id| {
            let w = &self.windows[id];
            if w.output != output || !w.visible || !w.mapped || !w.frame.contains(point) {
                return false;
            }
            match w.kind {
                WindowKind::Normal => true,
                WindowKind::Mirror(proxy) => {
                    let origin = w.frame.origin();
                    proxy.accepts_input(self, point.x - origin.x, point.y - origin.y)
                }
            }
        })
    }
}

impl WindowManager for HeadlessWindows {
    fn views_in_layer(&self, output: OutputId, layers: Layers) -> Vec<WindowId> {
        self.stacking
            .iter()
            .copied()
            .filter(|&id| {
                let w = &self.windows[id];
                w.output == output && layers.includes(w.layer)
            })
            .collect()
    }

    fn kind(&self, id: WindowId) -> Option<WindowKind> { self.windows.get(id).map(|w| w.kind) }

    fn layer(&self, id: WindowId) -> Option<Layer> { self.windows.get(id).map(|w| w.layer) }

    fn title(&self, id: WindowId) -> Option<String> {
        match self.windows.get(id)?.kind {
            WindowKind::Mirror(proxy) => Some(proxy.title(self)),
            WindowKind::Normal => Some(self.windows[id].title.clone()),
        }
    }

    fn bounding_box(&self, id: WindowId) -> Option<Rect> { self.windows.get(id).map(|w| w.frame) }

    fn output_of(&self, id: WindowId) -> Option<OutputId> { self.windows.get(id).map(|w| w.output) }

    fn is_visible(&self, id: WindowId) -> bool { self.windows.get(id).is_some_and(|w| w.visible) }

    fn set_visible(&mut self, id: WindowId, visible: bool) {
        if let Some(w) = self.windows.get_mut(id) {
            w.visible = visible;
        }
    }

    fn has_data(&self, id: WindowId, key: DataKey) -> bool {
        self.windows.get(id).is_some_and(|w| w.data.contains(&key))
    }

    fn store_data(&mut self, id: WindowId, key: DataKey) {
        if let Some(w) = self.windows.get_mut(id) {
            w.data.insert(key);
        }
    }

    fn erase_data(&mut self, id: WindowId, key: DataKey) {
        if let Some(w) = self.windows.get_mut(id) {
            w.data.remove(&key);
        }
    }

    fn active_view(&self, output: OutputId) -> Option<WindowId> { self.focus.get(&output).copied() }

    fn focus_view(&mut self, id: WindowId) {
        let Some(output) = self.output_of(id) else {
            return;
        };
        let previous = self.focus.insert(output, id);
        if previous == Some(id) {
            return;
        }
        if let Some(previous) = previous {
            self.set_activated(previous, false);
        }
        self.set_activated(id, true);
    }

    fn set_activated(&mut self, id: WindowId, activated: bool) {
        match self.kind(id) {
            Some(WindowKind::Mirror(proxy)) => proxy.set_activated(self, activated),
            Some(WindowKind::Normal) => self.windows[id].activated = activated,
            None => {}
        }
    }

    fn map_input_coordinates(&self, id: WindowId, point: Point) -> Option<Point> {
        let w = self.windows.get(id)?;
        if !w.mapped || !w.frame.contains(point) {
            return None;
        }
        let origin = w.frame.origin();
        Some(Point::new(point.x - origin.x, point.y - origin.y))
    }

    fn add_view(&mut self, view: NewView) -> WindowId {
        let id = self.windows.insert(WindowRecord {
            kind: view.kind,
            output: view.output,
            layer: view.layer,
            frame: view.frame,
            title: view.title,
            visible: true,
            activated: false,
            mapped: false,
            data: HashSet::default(),
        });
        self.stacking.push(id);
        id
    }

    fn emit_map(&mut self, id: WindowId) {
        if let Some(w) = self.windows.get_mut(id) {
            w.mapped = true;
        }
    }

    fn close_view(&mut self, id: WindowId) {
        let Some(w) = self.windows.remove(id) else {
            return;
        };
        self.stacking.retain(|&other| other != id);
        if self.focus.get(&w.output) == Some(&id) {
            self.focus.remove(&w.output);
        }
        trace!(?id, title = %w.title, "closed view");
    }
}

#[derive(Debug)]
pub struct HeadlessRender {
    output: OutputId,
    geometry: Rect,
    effects: SlotMap<EffectHandle, EffectPhase>,
    scheduled: Vec<Rect>,
    damage_log: Vec<Rect>,
    frames: u64,
}

impl HeadlessRender {
    pub fn new(output: OutputId, geometry: Rect) -> Self {
        Self {
            output,
            geometry,
            effects: SlotMap::with_key(),
            scheduled: Vec::new(),
            damage_log: Vec::new(),
            frames: 0,
        }
    }

    pub fn effects(&self, phase: EffectPhase) -> Vec<EffectHandle> {
        self.effects.iter().filter(|(_, p)| **p == phase).map(|(handle, _)| handle).collect()
    }

    pub fn effect_count(&self) -> usize { self.effects.len() }

    /// Every damaged rectangle, in request order.
    pub fn damage_log(&self) -> &[Rect] { &self.damage_log }

    pub fn frames(&self) -> u64 { self.frames }

    fn finish_frame(&mut self) {
        self.scheduled.clear();
        self.frames += 1;
    }
}

impl RenderPipeline for HeadlessRender {
    fn add_effect(&mut self, phase: EffectPhase) -> EffectHandle { self.effects.insert(phase) }

    fn rem_effect(&mut self, handle: EffectHandle) -> bool { self.effects.remove(handle).is_some() }

    fn damage(&mut self, rect: Rect) {
        self.scheduled.push(rect);
        self.damage_log.push(rect);
    }

    fn has_scheduled_damage(&self) -> bool { !self.scheduled.is_empty() }

    fn target_framebuffer(&self) -> Framebuffer {
        Framebuffer { output: self.output, geometry: self.geometry }
    }
}

/// What the wall saw when it was asked to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallRender {
    pub target: Framebuffer,
    pub rect: Rect,
    /// Windows of the target output visible at render time, bottom to top.
    pub visible: Vec<WindowId>,
}

#[derive(Debug)]
pub struct HeadlessWall {
    wall_rect: Rect,
    viewport: Rect,
    renders: Vec<WallRender>,
}

impl HeadlessWall {
    pub fn new(wall_rect: Rect) -> Self {
        Self { wall_rect, viewport: Rect::EMPTY, renders: Vec::new() }
    }

    /// Wall of a `columns` x `rows` grid of workspaces the size of `screen`.
    pub fn for_grid(screen: Rect, columns: i32, rows: i32) -> Self {
        Self::new(Rect::new(screen.x, screen.y, screen.width * columns, screen.height * rows))
    }

    pub fn viewport(&self) -> Rect { self.viewport }

    pub fn renders(&self) -> &[WallRender] { &self.renders }
}

impl WorkspaceWall for HeadlessWall {
    fn wall_rectangle(&self) -> Rect { self.wall_rect }

    fn set_viewport(&mut self, viewport: Rect) { self.viewport = viewport; }

    fn render_wall(&mut self, windows: &dyn WindowManager, target: &Framebuffer, rect: Rect) {
        let visible = windows
            .views_in_layer(target.output, Layers::all())
            .into_iter()
            .filter(|&id| windows.is_visible(id))
            .collect();
        self.renders.push(WallRender { target: *target, rect, visible });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchNotification {
    Started,
    Ended,
}

#[derive(Debug, Default)]
pub struct HeadlessSwitcher {
    active: bool,
    toggles: usize,
    pending: VecDeque<SwitchNotification>,
    history: Vec<SwitchNotification>,
    laid_out: Vec<WindowId>,
}

impl HeadlessSwitcher {
    pub fn toggles(&self) -> usize { self.toggles }

    /// Windows left for layout by the last filter notification.
    pub fn laid_out(&self) -> &[WindowId] { &self.laid_out }

    pub fn history(&self) -> &[SwitchNotification] { &self.history }

    /// Stops the switch view without emitting an end notification.
    pub fn force_inactive(&mut self) { self.active = false; }
}

impl Switcher for HeadlessSwitcher {
    fn is_active(&self) -> bool { self.active }

    fn toggle(&mut self) {
        self.active = !self.active;
        self.toggles += 1;
        let notification =
            if self.active { SwitchNotification::Started } else { SwitchNotification::Ended };
        self.pending.push_back(notification);
        self.history.push(notification);
    }
}

/// Per-output collaborators plus the overview session driving them.
#[derive(Debug)]
pub struct OutputStack {
    pub render: HeadlessRender,
    pub wall: HeadlessWall,
    pub switcher: HeadlessSwitcher,
    pub overview: OverviewController,
}

impl OutputStack {
    fn split<'a>(
        &'a mut self,
        windows: &'a mut HeadlessWindows,
    ) -> (&'a mut OverviewController, Shell<'a>) {
        let OutputStack { render, wall, switcher, overview } = self;
        (overview, Shell { windows, render, wall, switcher })
    }
}

#[derive(Debug, Default)]
pub struct Headless {
    pub windows: HeadlessWindows,
    outputs: BTreeMap<OutputId, OutputStack>,
}

impl Headless {
    pub fn new() -> Self { Self::default() }

    pub fn add_output(
        &mut self,
        output: OutputId,
        geometry: Rect,
        settings: OverviewSettings,
    ) -> &mut OutputStack {
        debug!(?output, ?geometry, "adding output");
        self.outputs.entry(output).or_insert_with(|| OutputStack {
            render: HeadlessRender::new(output, geometry),
            wall: HeadlessWall::for_grid(geometry, 3, 3),
            switcher: HeadlessSwitcher::default(),
            overview: OverviewController::new(output, settings),
        })
    }

    /// Shuts the output's session down and drops it.
    pub fn remove_output(&mut self, output: OutputId) -> bool {
        if self.with_shell(output, |overview, shell| overview.shutdown(shell)).is_none() {
            return false;
        }
        self.pump(output);
        self.outputs.remove(&output).is_some()
    }

    pub fn output(&self, output: OutputId) -> Option<&OutputStack> { self.outputs.get(&output) }

    pub fn output_mut(&mut self, output: OutputId) -> Option<&mut OutputStack> {
        self.outputs.get_mut(&output)
    }

    pub fn with_shell<T>(
        &mut self,
        output: OutputId,
        f: impl FnOnce(&mut OverviewController, &mut Shell<'_>) -> T,
    ) -> Option<T> {
        let stack = self.outputs.get_mut(&output)?;
        let (overview, mut shell) = stack.split(&mut self.windows);
        Some(f(overview, &mut shell))
    }

    /// Feeds a key press to the output's session.
    pub fn press(&mut self, output: OutputId, modifiers: Modifiers, key: &str) -> bool {
        let handled = self
            .with_shell(output, |overview, shell| overview.handle_key(modifiers, key, shell))
            .unwrap_or(false);
        self.pump(output);
        handled
    }

    pub fn activate(&mut self, output: OutputId) {
        self.with_shell(output, |overview, shell| overview.activate(shell));
        self.pump(output);
    }

    /// Stops the switcher if it is running and delivers the end notification.
    pub fn end_switch(&mut self, output: OutputId) {
        if let Some(stack) = self.outputs.get_mut(&output) {
            if stack.switcher.is_active() {
                stack.switcher.toggle();
            }
        }
        self.pump(output);
    }

    /// Delivers queued switcher notifications to the output's session.
    pub fn pump(&mut self, output: OutputId) {
        let Some(stack) = self.outputs.get_mut(&output) else {
            return;
        };
        let windows = &mut self.windows;
        while let Some(notification) = stack.switcher.pending.pop_front() {
            trace!(?output, ?notification, "switcher notification");
            match notification {
                SwitchNotification::Started => {
                    let mut event =
                        SwitchFilter::new(windows.views_in_layer(output, Layers::WM), Vec::new());
                    let (overview, mut shell) = stack.split(windows);
                    overview.on_switch_filter(&mut event, &mut shell);
                    stack.switcher.laid_out = event.views_shown;
                }
                SwitchNotification::Ended => {
                    let (overview, mut shell) = stack.split(windows);
                    overview.on_switch_end(&mut shell);
                    stack.switcher.laid_out.clear();
                }
            }
        }
    }

    /// Paints one frame, running effects phase by phase. Returns the phase of
    /// every effect the session handled, in execution order.
    pub fn paint_frame(&mut self, output: OutputId) -> Vec<EffectPhase> {
        let Some(stack) = self.outputs.get_mut(&output) else {
            return Vec::new();
        };
        let mut handled = Vec::new();
        for phase in [EffectPhase::Pre, EffectPhase::Overlay, EffectPhase::Post] {
            for handle in stack.render.effects(phase) {
                let (overview, mut shell) = stack.split(&mut self.windows);
                if overview.run_effect(handle, &mut shell) {
                    handled.push(phase);
                }
            }
        }
        stack.render.finish_frame();
        handled
    }
}
