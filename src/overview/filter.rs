use tracing::trace;

use super::ledger::VisibilityLedger;
use crate::model::{WindowId, WindowKind};
use crate::sys::{SwitchFilter, WindowManager};

/// Keeps real windows out of the switcher while mirrors stand in for them.
///
/// Every normal window passing through a filter notification is hidden and
/// marked, then dropped from the list, so the switcher lays out mirror
/// geometry only.
#[derive(Clone, Copy, Debug)]
pub struct SwitchEventFilter {
    ledger: VisibilityLedger,
}

impl SwitchEventFilter {
    pub fn new(ledger: VisibilityLedger) -> Self { Self { ledger } }

    /// Filters both lists in place. Returns how many windows got newly hidden.
    pub fn filter(&self, windows: &mut dyn WindowManager, event: &mut SwitchFilter) -> usize {
        self.remove_and_hide(windows, &mut event.views_shown)
            + self.remove_and_hide(windows, &mut event.views_hidden)
    }

    fn remove_and_hide(&self, windows: &mut dyn WindowManager, views: &mut Vec<WindowId>) -> usize {
        let mut hidden = 0;
        for &view in views.iter() {
            match windows.kind(view) {
                Some(WindowKind::Normal) => {
                    if self.ledger.hide(windows, view) {
                        hidden += 1;
                    }
                }
                Some(WindowKind::Mirror(_)) => {}
                None => trace!(?view, "skipping destroyed window"),
            }
        }
        views.retain(|&view| matches!(windows.kind(view), Some(WindowKind::Mirror(_))));
        hidden
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::headless::HeadlessWindows;
    use crate::model::{Layer, Layers, OutputId, Rect};
    use crate::overview::MirrorProxy;

    const OUTPUT: OutputId = OutputId::new(1);

    struct Fixture {
        windows: HeadlessWindows,
        filter: SwitchEventFilter,
        ledger: VisibilityLedger,
    }

    impl Fixture {
        fn new() -> Self {
            let ledger = VisibilityLedger::new(Layers::WM);
            Self { windows: HeadlessWindows::new(), filter: SwitchEventFilter::new(ledger), ledger }
        }

        fn open(&mut self, title: &str) -> WindowId {
            self.windows.open(OUTPUT, Layer::Workspace, title, Rect::new(0, 0, 100, 100))
        }
    }

    #[test]
    fn normals_are_hidden_and_dropped() {
        let mut fx = Fixture::new();
        let a = fx.open("a");
        let b = fx.open("b");
        let c = fx.open("c");
        let mirror_a = MirrorProxy::spawn(&mut fx.windows, a).unwrap();

        let mut event = SwitchFilter::new(vec![mirror_a, b, c], vec![]);
        let hidden = fx.filter.filter(&mut fx.windows, &mut event);

        assert_eq!(hidden, 2);
        assert_eq!(event.views_shown, vec![mirror_a]);
        for view in [b, c] {
            assert!(fx.ledger.is_hidden(&fx.windows, view));
            assert!(!fx.windows.is_visible(view));
        }
        assert!(!fx.ledger.is_hidden(&fx.windows, mirror_a));
        assert!(fx.windows.is_visible(mirror_a));
    }

    #[test]
    fn hidden_list_follows_the_same_rule() {
        let mut fx = Fixture::new();
        let b = fx.open("b");
        let mirror_b = MirrorProxy::spawn(&mut fx.windows, b).unwrap();

        let mut event = SwitchFilter::new(vec![], vec![b, mirror_b]);
        fx.filter.filter(&mut fx.windows, &mut event);

        assert_eq!(event.views_hidden, vec![mirror_b]);
        assert!(fx.ledger.is_hidden(&fx.windows, b));
    }

    #[test]
    fn already_marked_windows_are_not_counted_twice() {
        let mut fx = Fixture::new();
        let a = fx.open("a");

        let mut first = SwitchFilter::new(vec![a], vec![]);
        let mut second = SwitchFilter::new(vec![a], vec![a]);
        assert_eq!(fx.filter.filter(&mut fx.windows, &mut first), 1);
        assert_eq!(fx.filter.filter(&mut fx.windows, &mut second), 0);
        assert_eq!(second, SwitchFilter::default());
    }

    #[test]
    fn destroyed_windows_are_skipped() {
        let mut fx = Fixture::new();
        let a = fx.open("a");
        let gone = fx.open("gone");
        fx.windows.close_view(gone);

        let mut event = SwitchFilter::new(vec![gone, a], vec![]);
        assert_eq!(fx.filter.filter(&mut fx.windows, &mut event), 1);
        assert!(event.views_shown.is_empty());
    }
}
