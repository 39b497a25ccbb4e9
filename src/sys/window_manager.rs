use crate::model::{DataKey, Layer, Layers, OutputId, Point, Rect, WindowId, WindowKind};

/// Request to insert a view into the stacking order.
#[derive(Clone, Debug)]
pub struct NewView {
    pub kind: WindowKind,
    pub output: OutputId,
    pub layer: Layer,
    pub frame: Rect,
    pub title: String,
}

/// Window and layer management.
///
/// Every query taking a [`WindowId`] treats a destroyed window as absent:
/// getters return `None`/`false` and setters do nothing.
pub trait WindowManager {
    /// Windows of `output` in any of `layers`, bottom to top.
    fn views_in_layer(&self, output: OutputId, layers: Layers) -> Vec<WindowId>;

    fn kind(&self, id: WindowId) -> Option<WindowKind>;

    fn layer(&self, id: WindowId) -> Option<Layer>;

    fn title(&self, id: WindowId) -> Option<String>;

    fn bounding_box(&self, id: WindowId) -> Option<Rect>;

    fn output_of(&self, id: WindowId) -> Option<OutputId>;

    fn is_visible(&self, id: WindowId) -> bool;

    fn set_visible(&mut self, id: WindowId, visible: bool);

    fn has_data(&self, id: WindowId, key: DataKey) -> bool;

    fn store_data(&mut self, id: WindowId, key: DataKey);

    fn erase_data(&mut self, id: WindowId, key: DataKey);

    fn active_view(&self, output: OutputId) -> Option<WindowId>;

    fn focus_view(&mut self, id: WindowId);

    /// Sets the focus highlight without moving input focus.
    fn set_activated(&mut self, id: WindowId, activated: bool);

    /// Maps a layout-space point into `id`'s surface coordinates, or `None`
    /// when the window would not take input there.
    fn map_input_coordinates(&self, id: WindowId, point: Point) -> Option<Point>;

    fn add_view(&mut self, view: NewView) -> WindowId;

    /// Announces a freshly added view as mapped.
    fn emit_map(&mut self, id: WindowId);

    fn close_view(&mut self, id: WindowId);
}
