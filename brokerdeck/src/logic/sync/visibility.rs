use crate::logic::types::Panel;
use std::cell::Cell;
use std::rc::Rc;

/// Where panel switches are drawn
pub trait PanelView {
    fn show_panel(&self, panel: Panel);
}

/// Tracks which single panel is active.
///
/// Only a read for the synchronizers; it never schedules anything itself.
pub struct VisibilityRouter {
    active: Cell<Option<Panel>>,
    view: Rc<dyn PanelView>,
}

impl VisibilityRouter {
    pub fn new(view: Rc<dyn PanelView>) -> Self {
        Self {
            active: Cell::new(None),
            view,
        }
    }

    /// Deactivate every other panel and activate `panel` in one step
    pub fn activate(&self, panel: Panel) {
        self.active.set(Some(panel));
        self.view.show_panel(panel);
    }

    pub fn is_active(&self, panel: Panel) -> bool {
        self.active.get() == Some(panel)
    }

    /// `None` until the first `activate`
    #[cfg(test)]
    pub fn active(&self) -> Option<Panel> {
        self.active.get()
    }
}
