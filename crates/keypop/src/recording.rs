use std::cell::RefCell;
use std::rc::Rc;

use keypop_core::item::{Bounds, ItemContent};
use keypop_core::layout::{Justification, Placement};
use serde::Serialize;

use crate::surface::{ExtendedSurface, ItemView, PreviewSurface, SurfaceHost};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    ShowAt { anchor: Bounds, placement: Placement },
    UpdateAt { anchor: Bounds, placement: Placement },
    Dismiss,
    SetContent { content: ItemContent, has_alternates: bool },
    SetVisible { visible: bool },
    ClearItems,
    PushItem { item: ItemView },
    SetJustification { justification: Justification },
    SetActive { slot: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorded {
    pub surface: &'static str,
    #[serde(flatten)]
    pub call: SurfaceCall,
}

/// Call log shared by several surfaces so their relative order is kept.
pub type Journal = Rc<RefCell<Vec<Recorded>>>;

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    name: &'static str,
    journal: Journal,
    showing: bool,
    visible: bool,
    placement: Option<Placement>,
    content: Option<ItemContent>,
    items: Vec<ItemView>,
    justification: Option<Justification>,
    active: Option<usize>,
}

impl RecordingSurface {
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            journal,
            showing: false,
            visible: false,
            placement: None,
            content: None,
            items: Vec::new(),
            justification: None,
            active: None,
        }
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn content(&self) -> Option<&ItemContent> {
        self.content.as_ref()
    }

    pub fn items(&self) -> &[ItemView] {
        &self.items
    }

    pub fn justification(&self) -> Option<Justification> {
        self.justification
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    fn record(&self, call: SurfaceCall) {
        self.journal.borrow_mut().push(Recorded {
            surface: self.name,
            call,
        });
    }
}

impl SurfaceHost for RecordingSurface {
    fn show_at(&mut self, anchor: &Bounds, placement: Placement) {
        self.showing = true;
        self.placement = Some(placement);
        self.record(SurfaceCall::ShowAt { anchor: *anchor, placement });
    }

    fn update_at(&mut self, anchor: &Bounds, placement: Placement) {
        self.placement = Some(placement);
        self.record(SurfaceCall::UpdateAt { anchor: *anchor, placement });
    }

    fn dismiss(&mut self) {
        self.showing = false;
        self.record(SurfaceCall::Dismiss);
    }

    fn is_showing(&self) -> bool {
        self.showing
    }
}

impl PreviewSurface for RecordingSurface {
    fn set_content(&mut self, content: &ItemContent, has_alternates: bool) {
        self.content = Some(content.clone());
        self.record(SurfaceCall::SetContent {
            content: content.clone(),
            has_alternates,
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.record(SurfaceCall::SetVisible { visible });
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

impl ExtendedSurface for RecordingSurface {
    fn clear_items(&mut self) {
        self.items.clear();
        self.record(SurfaceCall::ClearItems);
    }

    fn push_item(&mut self, item: ItemView) {
        self.items.push(item.clone());
        self.record(SurfaceCall::PushItem { item });
    }

    fn set_justification(&mut self, justification: Justification) {
        self.justification = Some(justification);
        self.record(SurfaceCall::SetJustification { justification });
    }

    fn set_active(&mut self, slot: Option<usize>) {
        self.active = slot;
        self.record(SurfaceCall::SetActive { slot });
    }
}
