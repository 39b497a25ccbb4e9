use tracing::debug;

use crate::model::{Layer, Point, WindowId, WindowKind};
use crate::sys::{NewView, WindowManager};

pub const MIRROR_TITLE_SUFFIX: &str = "(mirror)";
pub const UNMAPPED_MIRROR_TITLE: &str = "mirror(unmapped)";

/// A visual stand-in for a normal window.
///
/// The proxy only holds a generation-checked handle to its base, so a base
/// that goes away first is noticed on the next call instead of dangling.
/// Input and focus highlight are forwarded to the base; the mirror never
/// becomes a target of its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MirrorProxy {
    base: WindowId,
    origin: Point,
}

impl MirrorProxy {
    /// Creates a mirror of `base` at the base's position in the workspace
    /// layer of the same output and maps it.
    ///
    /// Returns `None` if `base` is gone, is itself a mirror, or has no output.
    pub fn spawn(windows: &mut dyn WindowManager, base: WindowId) -> Option<WindowId> {
        if !windows.kind(base)?.is_normal() {
            return None;
        }
        let frame = windows.bounding_box(base)?;
        let output = windows.output_of(base)?;

        let proxy = MirrorProxy { base, origin: frame.origin() };
        let title = proxy.title(windows);
        let mirror = windows.add_view(NewView {
            kind: WindowKind::Mirror(proxy),
            output,
            layer: Layer::Workspace,
            frame,
            title,
        });
        windows.emit_map(mirror);
        debug!(?base, ?mirror, "created mirror");
        Some(mirror)
    }

    pub fn base(&self) -> WindowId { self.base }

    pub fn origin(&self) -> Point { self.origin }

    pub fn is_alive(&self, windows: &dyn WindowManager) -> bool {
        windows.kind(self.base).is_some()
    }

    /// Hit-tests a mirror-local point against the base window.
    pub fn accepts_input(&self, windows: &dyn WindowManager, sx: f64, sy: f64) -> bool {
        if !self.is_alive(windows) {
            return false;
        }
        let cursor = self.origin.offset(sx, sy);
        windows.map_input_coordinates(self.base, cursor).is_some()
    }

    pub fn set_activated(&self, windows: &mut dyn WindowManager, activated: bool) {
        if self.is_alive(windows) {
            windows.set_activated(self.base, activated);
        }
    }

    pub fn title(&self, windows: &dyn WindowManager) -> String {
        match windows.title(self.base) {
            Some(title) => format!("{title}{MIRROR_TITLE_SUFFIX}"),
            None => UNMAPPED_MIRROR_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::headless::HeadlessWindows;
    use crate::model::{OutputId, Rect};

    const OUTPUT: OutputId = OutputId::new(1);

    fn proxy_of(windows: &HeadlessWindows, mirror: WindowId) -> MirrorProxy {
        *windows.kind(mirror).unwrap().as_mirror().unwrap()
    }

    #[test]
    fn mirror_copies_base_placement() {
        let mut windows = HeadlessWindows::new();
        let base = windows.open(OUTPUT, Layer::Workspace, "term", Rect::new(40, 50, 200, 100));

        let mirror = MirrorProxy::spawn(&mut windows, base).unwrap();

        assert_eq!(windows.bounding_box(mirror), Some(Rect::new(40, 50, 200, 100)));
        assert_eq!(windows.output_of(mirror), Some(OUTPUT));
        assert_eq!(windows.layer(mirror), Some(Layer::Workspace));
        assert!(windows.is_mapped(mirror));
        assert_eq!(proxy_of(&windows, mirror).base(), base);
        assert_eq!(windows.title(mirror).as_deref(), Some("term(mirror)"));
    }

    #[test]
    fn mirrors_are_never_mirrored() {
        let mut windows = HeadlessWindows::new();
        let base = windows.open(OUTPUT, Layer::Workspace, "term", Rect::new(0, 0, 10, 10));
        let mirror = MirrorProxy::spawn(&mut windows, base).unwrap();

        assert_eq!(MirrorProxy::spawn(&mut windows, mirror), None);
    }

    #[test]
    fn input_is_tested_against_the_base() {
        let mut windows = HeadlessWindows::new();
        let base = windows.open(OUTPUT, Layer::Workspace, "term", Rect::new(100, 100, 50, 50));
        let mirror = MirrorProxy::spawn(&mut windows, base).unwrap();
        let proxy = proxy_of(&windows, mirror);

        assert!(proxy.accepts_input(&windows, 10.0, 10.0));
        assert!(!proxy.accepts_input(&windows, 60.0, 10.0));
    }

    #[test]
    fn focus_highlight_goes_to_the_base() {
        let mut windows = HeadlessWindows::new();
        let base = windows.open(OUTPUT, Layer::Workspace, "term", Rect::new(0, 0, 10, 10));
        let mirror = MirrorProxy::spawn(&mut windows, base).unwrap();

        proxy_of(&windows, mirror).set_activated(&mut windows, true);
        assert!(windows.is_activated(base));
        proxy_of(&windows, mirror).set_activated(&mut windows, false);
        assert!(!windows.is_activated(base));
    }

    #[test]
    fn degrades_once_base_is_closed() {
        let mut windows = HeadlessWindows::new();
        let base = windows.open(OUTPUT, Layer::Workspace, "term", Rect::new(0, 0, 10, 10));
        let mirror = MirrorProxy::spawn(&mut windows, base).unwrap();
        let proxy = proxy_of(&windows, mirror);

        windows.close_view(base);

        assert!(!proxy.is_alive(&windows));
        assert!(!proxy.accepts_input(&windows, 1.0, 1.0));
        assert_eq!(proxy.title(&windows), UNMAPPED_MIRROR_TITLE);
        proxy.set_activated(&mut windows, true);
        assert!(windows.kind(mirror).is_some());
    }
}
