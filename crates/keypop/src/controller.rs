use keypop_core::config::Config;
use keypop_core::hit_test::{self, Pointer};
use keypop_core::item::{Anchor, ItemContent};
use keypop_core::layout::{self, ExtendedLayout, HostMetrics, PopupMetrics};
use tracing::debug;

use crate::surface::{self, ExtendedSurface, ItemView, PreviewSurface};

/// Lifecycle state for one press gesture.
#[derive(Debug, Clone, PartialEq)]
enum State {
    /// Nothing on screen.
    Hidden,
    /// Preview bubble over the pressed key.
    Preview { metrics: PopupMetrics },
    /// Long-press picker is open and tracking the pointer.
    Extended {
        metrics: PopupMetrics,
        layout: ExtendedLayout,
        primary_slot: usize,
        active: usize,
    },
}

/// Public view of [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    PreviewShown,
    ExtendedShown,
}

/// Drives the preview bubble and the extended picker for one keyboard view.
///
/// Calls are expected from a single event-dispatch thread, one gesture at a
/// time.
pub struct PopupController<P, E> {
    state: State,
    config: Config,
    host: HostMetrics,
    preview: P,
    extended: E,
}

impl<P: PreviewSurface, E: ExtendedSurface> PopupController<P, E> {
    pub fn new(config: &Config, host: HostMetrics, preview: P, extended: E) -> Self {
        Self {
            state: State::Hidden,
            config: config.clone(),
            host,
            preview,
            extended,
        }
    }

    /// Updates the hosting view's geometry, e.g. after a rotation.
    pub fn set_host(&mut self, host: HostMetrics) {
        self.host = host;
    }

    pub fn host(&self) -> &HostMetrics {
        &self.host
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Hidden => Phase::Hidden,
            State::Preview { .. } => Phase::PreviewShown,
            State::Extended { .. } => Phase::ExtendedShown,
        }
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn extended(&self) -> &E {
        &self.extended
    }

    pub fn is_showing_preview(&self) -> bool {
        self.preview.is_showing() && self.preview.is_visible()
    }

    pub fn is_showing_extended(&self) -> bool {
        self.extended.is_showing()
    }

    /// Slot of the extended grid currently selected, if any.
    pub fn active_slot(&self) -> Option<usize> {
        match self.state {
            State::Extended { active, .. } => Some(active),
            _ => None,
        }
    }

    /// Shows the preview bubble over `anchor`.
    pub fn show(&mut self, anchor: &Anchor) {
        if !anchor.kind.allows_preview() {
            debug!(kind = ?anchor.kind, "no preview for this key");
            return;
        }

        if matches!(self.state, State::Extended { .. }) {
            self.close_extended();
        }

        let metrics = layout::calc(&anchor.bounds, &self.host, &self.config.sizing);
        surface::present(&mut self.preview, &anchor.bounds, layout::place_preview(&metrics));
        self.preview.set_content(&anchor.content, anchor.has_alternates());
        self.preview.set_visible(self.config.popup.preview_enabled);

        debug!(width = metrics.width, height = metrics.height, "preview shown");
        self.state = State::Preview { metrics };
    }

    /// Opens (or rebuilds) the long-press picker for `anchor`.
    ///
    /// Returns the layout the grid was built with, or `None` when the key has
    /// nothing to pick from.
    pub fn extend(&mut self, anchor: &Anchor) -> Option<ExtendedLayout> {
        if !anchor.kind.allows_extend() {
            debug!(kind = ?anchor.kind, "no extended popup for this key");
            return None;
        }
        if !anchor.has_alternates() {
            debug!("extend ignored: key has no alternates");
            return None;
        }

        let metrics = layout::calc(&anchor.bounds, &self.host, &self.config.sizing);
        let item_count = anchor.slot_count();
        let layout = layout::plan_extended_layout(
            item_count,
            &anchor.bounds,
            &metrics,
            self.host.container_width,
            self.config.popup.row_capacity,
        );
        // Always inside the grid; the clamp appends the primary content after
        // the alternates should that ever change.
        let primary_slot = layout.initial_slot().min(item_count - 1);

        self.build_items(anchor, &metrics, &layout, primary_slot);
        self.preview.set_visible(false);
        surface::present(
            &mut self.extended,
            &anchor.bounds,
            layout::place_extended(&metrics, &layout),
        );
        self.extended.set_active(Some(primary_slot));

        debug!(
            row0 = layout.row0_count,
            row1 = layout.row1_count,
            side = ?layout.anchor_side,
            offset = layout.anchor_offset,
            "extended popup shown"
        );
        self.state = State::Extended {
            metrics,
            layout,
            primary_slot,
            active: primary_slot,
        };
        Some(layout)
    }

    fn build_items(
        &mut self,
        anchor: &Anchor,
        metrics: &PopupMetrics,
        layout: &ExtendedLayout,
        primary_slot: usize,
    ) {
        let (width, height) = metrics.item_size();
        self.extended.clear_items();
        self.extended.set_justification(layout.justification());
        for slot in 0..layout.item_count() {
            self.extended.push_item(ItemView {
                slot,
                content: anchor.content_for_slot(slot, primary_slot).clone(),
                width,
                height,
                active: slot == primary_slot,
                wrap_before: layout.has_two_rows() && slot == layout.row1_count,
            });
        }
    }

    /// Feeds a pointer sample (relative to `anchor`) to the picker.
    ///
    /// Returns `false` when no picker is open or the pointer left its
    /// tracking area; the previous selection is kept in that case.
    pub fn propagate_motion_event(&mut self, anchor: &Anchor, x: f32, y: f32) -> bool {
        let State::Extended {
            metrics,
            layout,
            ref mut active,
            ..
        } = self.state
        else {
            return false;
        };

        let Some(slot) = hit_test::resolve(Pointer::new(x, y), &metrics, &layout) else {
            debug!(x, y, key = ?anchor.content, "pointer left the extended popup");
            return false;
        };

        if *active != slot {
            *active = slot;
            self.extended.set_active(Some(slot));
        }
        true
    }

    /// Content the gesture currently points at: the active slot of the
    /// picker, otherwise the anchor's own content. `None` when hidden.
    pub fn active_item_content<'a>(&self, anchor: &'a Anchor) -> Option<&'a ItemContent> {
        match self.state {
            State::Hidden => None,
            State::Preview { .. } => Some(&anchor.content),
            State::Extended {
                primary_slot,
                active,
                ..
            } => Some(anchor.content_for_slot(active, primary_slot)),
        }
    }

    /// Ends the gesture: closes the picker and makes the preview invisible.
    /// The preview surface stays allocated for the next press.
    pub fn hide(&mut self) {
        self.close_extended();
        self.preview.set_visible(false);
        self.state = State::Hidden;
        debug!("popups hidden");
    }

    /// Dismisses both surfaces.
    pub fn dismiss_all_popups(&mut self) {
        self.close_extended();
        if self.preview.is_showing() {
            self.preview.dismiss();
        }
        self.state = State::Hidden;
        debug!("popups dismissed");
    }

    fn close_extended(&mut self) {
        if matches!(self.state, State::Extended { .. }) {
            self.extended.set_active(None);
        }
        if self.extended.is_showing() {
            self.extended.dismiss();
        }
    }
}
