use crate::model::{DataKey, Layers, OutputId, WindowId, WindowKind};
use crate::sys::WindowManager;

/// Tag carried by a normal window while a mirror stands in for it.
pub const HIDDEN_MARK: DataKey = DataKey::new("scale-hidden");

/// Bookkeeping for windows hidden behind mirrors.
///
/// The ledger has no table of its own; the mark lives on the window, so it
/// disappears together with the window and cannot go stale. Only windows in
/// the watched layers get marked, but lookups scan every layer so a marked
/// window is still found after moving to another one.
#[derive(Clone, Copy, Debug)]
pub struct VisibilityLedger {
    layers: Layers,
}

impl VisibilityLedger {
    pub fn new(layers: Layers) -> Self { Self { layers } }

    pub fn is_hidden(&self, windows: &dyn WindowManager, id: WindowId) -> bool {
        windows.has_data(id, HIDDEN_MARK)
    }

    pub fn watches(&self, windows: &dyn WindowManager, id: WindowId) -> bool {
        windows.layer(id).is_some_and(|layer| self.layers.includes(layer))
    }

    /// Marks and hides a normal window. Returns false if the window is not a
    /// normal window attached to an output in a watched layer, or is already
    /// marked.
    pub fn hide(&self, windows: &mut dyn WindowManager, id: WindowId) -> bool {
        if !matches!(windows.kind(id), Some(WindowKind::Normal))
            || windows.output_of(id).is_none()
            || !self.watches(windows, id)
            || self.is_hidden(windows, id)
        {
            return false;
        }
        windows.store_data(id, HIDDEN_MARK);
        windows.set_visible(id, false);
        true
    }

    /// Clears the mark and shows the window again.
    pub fn restore(&self, windows: &mut dyn WindowManager, id: WindowId) -> bool {
        if !self.is_hidden(windows, id) {
            return false;
        }
        windows.set_visible(id, true);
        windows.erase_data(id, HIDDEN_MARK);
        true
    }

    pub fn hidden(&self, windows: &dyn WindowManager, output: OutputId) -> Vec<WindowId> {
        windows
            .views_in_layer(output, Layers::all())
            .into_iter()
            .filter(|&id| self.is_hidden(windows, id))
            .collect()
    }

    /// Shows either the mirrors or the marked windows they stand in for,
    /// hiding the other side. Marks are left untouched.
    pub fn show_mirrors(&self, windows: &mut dyn WindowManager, output: OutputId, visible: bool) {
        for id in windows.views_in_layer(output, Layers::all()) {
            match windows.kind(id) {
                Some(WindowKind::Mirror(_)) => windows.set_visible(id, visible),
                Some(WindowKind::Normal) if self.is_hidden(windows, id) => {
                    windows.set_visible(id, !visible)
                }
                _ => {}
            }
        }
    }
}
