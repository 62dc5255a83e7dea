use serde::{Deserialize, Serialize};

/// On-screen rectangle of an anchor, relative to its parent keyboard view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Key code of a text key. Printable characters use their code point,
/// function keys use negative codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub i32);

impl KeyCode {
    pub const ENTER: KeyCode = KeyCode(10);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const LANGUAGE_SWITCH: KeyCode = KeyCode(-210);
    pub const SWITCH_TO_TEXT_CONTEXT: KeyCode = KeyCode(-211);
    pub const SWITCH_TO_MEDIA_CONTEXT: KeyCode = KeyCode(-212);

    /// Keys that may open the extended popup even though they never get a
    /// preview bubble.
    const EXTEND_EXCEPTIONS: [KeyCode; 4] = [
        KeyCode::ENTER,
        KeyCode::LANGUAGE_SWITCH,
        KeyCode::SWITCH_TO_TEXT_CONTEXT,
        KeyCode::SWITCH_TO_MEDIA_CONTEXT,
    ];

    /// Whitespace and control keys (everything up to and including space)
    /// get no preview.
    pub fn is_popup_worthy(self) -> bool {
        self.0 > Self::SPACE.0
    }

    pub fn is_extend_exception(self) -> bool {
        Self::EXTEND_EXCEPTIONS.contains(&self)
    }
}

/// Opaque content descriptor handed to the surfaces for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ItemContent {
    Label(String),
    Icon(String),
}

impl ItemContent {
    pub fn label(text: impl Into<String>) -> Self {
        ItemContent::Label(text.into())
    }
}

/// How extended-popup slots map onto the anchor's alternates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRemap {
    /// The anchor's own content occupies the initially active slot and every
    /// later slot is shifted by one.
    InsertPrimary,
    /// Slot k shows alternate k.
    Natural,
}

/// Which content a slot of the extended grid displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotContent {
    Primary,
    Alternate(usize),
}

impl IndexRemap {
    pub fn slot_count(self, alternates: usize) -> usize {
        match self {
            IndexRemap::InsertPrimary => alternates + 1,
            IndexRemap::Natural => alternates,
        }
    }

    pub fn content_for(self, slot: usize, primary_slot: usize) -> SlotContent {
        match self {
            IndexRemap::Natural => SlotContent::Alternate(slot),
            IndexRemap::InsertPrimary if slot == primary_slot => SlotContent::Primary,
            IndexRemap::InsertPrimary if slot < primary_slot => SlotContent::Alternate(slot),
            IndexRemap::InsertPrimary => SlotContent::Alternate(slot - 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    TextKey { code: KeyCode },
    Emoji,
}

impl AnchorKind {
    pub fn remap(self) -> IndexRemap {
        match self {
            AnchorKind::TextKey { .. } => IndexRemap::InsertPrimary,
            AnchorKind::Emoji => IndexRemap::Natural,
        }
    }

    pub fn allows_preview(self) -> bool {
        match self {
            AnchorKind::TextKey { code } => code.is_popup_worthy(),
            AnchorKind::Emoji => true,
        }
    }

    pub fn allows_extend(self) -> bool {
        match self {
            AnchorKind::TextKey { code } => code.is_popup_worthy() || code.is_extend_exception(),
            AnchorKind::Emoji => true,
        }
    }
}

/// The key a popup is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub bounds: Bounds,
    pub kind: AnchorKind,
    pub content: ItemContent,
    pub alternates: Vec<ItemContent>,
}

impl Anchor {
    pub fn text_key(code: KeyCode, label: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            bounds,
            kind: AnchorKind::TextKey { code },
            content: ItemContent::label(label),
            alternates: Vec::new(),
        }
    }

    pub fn emoji(symbol: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            bounds,
            kind: AnchorKind::Emoji,
            content: ItemContent::label(symbol),
            alternates: Vec::new(),
        }
    }

    pub fn with_alternates<I, S>(mut self, alternates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternates = alternates
            .into_iter()
            .map(|s| ItemContent::Label(s.into()))
            .collect();
        self
    }

    pub fn has_alternates(&self) -> bool {
        !self.alternates.is_empty()
    }

    /// Number of slots the extended grid needs for this anchor.
    pub fn slot_count(&self) -> usize {
        self.kind.remap().slot_count(self.alternates.len())
    }

    /// Content displayed in `slot`, falling back to the anchor's own content
    /// when the slot has no alternate behind it.
    pub fn content_for_slot(&self, slot: usize, primary_slot: usize) -> &ItemContent {
        match self.kind.remap().content_for(slot, primary_slot) {
            SlotContent::Primary => &self.content,
            SlotContent::Alternate(i) => self.alternates.get(i).unwrap_or(&self.content),
        }
    }
}
