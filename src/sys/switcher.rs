use crate::model::WindowId;

/// Payload of the switcher's filter notification.
///
/// Subscribers edit both lists in place before the switcher lays them out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchFilter {
    pub views_shown: Vec<WindowId>,
    pub views_hidden: Vec<WindowId>,
}

impl SwitchFilter {
    pub fn new(views_shown: Vec<WindowId>, views_hidden: Vec<WindowId>) -> Self {
        Self { views_shown, views_hidden }
    }
}

/// The window switcher ("scale") subsystem.
pub trait Switcher {
    fn is_active(&self) -> bool;

    /// Starts the switch view, or stops it if it is running.
    fn toggle(&mut self);
}
