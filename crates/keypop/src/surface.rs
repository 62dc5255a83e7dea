use keypop_core::item::{Bounds, ItemContent};
use keypop_core::layout::{Justification, Placement};
use serde::Serialize;

/// A floating surface positioned relative to an anchor. Implementations are
/// created once and reused across gestures.
pub trait SurfaceHost {
    fn show_at(&mut self, anchor: &Bounds, placement: Placement);
    fn update_at(&mut self, anchor: &Bounds, placement: Placement);
    fn dismiss(&mut self);
    fn is_showing(&self) -> bool;
}

/// The single-key preview bubble.
pub trait PreviewSurface: SurfaceHost {
    /// `has_alternates` drives the "more on long press" indicator.
    fn set_content(&mut self, content: &ItemContent, has_alternates: bool);
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;
}

/// The extended picker grid. The surface turns each pushed [`ItemView`] into
/// a renderable child.
pub trait ExtendedSurface: SurfaceHost {
    fn clear_items(&mut self);
    fn push_item(&mut self, item: ItemView);
    fn set_justification(&mut self, justification: Justification);
    /// Reports which slot is now active; `None` clears the highlight.
    fn set_active(&mut self, slot: Option<usize>);
}

/// One child of the extended grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub slot: usize,
    pub content: ItemContent,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    /// Starts the lower row when the grid has two rows.
    pub wrap_before: bool,
}

/// Shows the surface, or moves it if it is already up.
pub(crate) fn present<S: SurfaceHost + ?Sized>(
    surface: &mut S,
    anchor: &Bounds,
    placement: Placement,
) {
    if surface.is_showing() {
        surface.update_at(anchor, placement);
    } else {
        surface.show_at(anchor, placement);
    }
}
