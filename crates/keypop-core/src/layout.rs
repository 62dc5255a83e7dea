use serde::{Deserialize, Serialize};

use crate::config::{Multipliers, SizingConfig};
use crate::item::Bounds;

/// Height of one extended-popup row as a fraction of the popup height.
pub const ROW_HEIGHT_FRACTION: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// What kind of surface hosts the anchor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMode {
    /// Regular full-size keyboard.
    Full,
    /// Toolbar-sized keys (e.g. a smartbar row).
    Compact,
    /// Emoji grid; popups size themselves from the pressed cell.
    EmojiGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostMetrics {
    pub container_width: f32,
    pub nominal_key_width: f32,
    pub nominal_key_height: f32,
    pub orientation: Orientation,
    pub mode: HostMode,
}

/// Size of the single-key preview and horizontal centering offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopupMetrics {
    pub width: f32,
    pub height: f32,
    /// `(anchor_width - width) / 2`; negative when the popup is wider.
    pub diff_x: f32,
}

impl PopupMetrics {
    /// Size of a single item in the extended grid.
    pub fn item_size(&self) -> (f32, f32) {
        (self.width, self.height * ROW_HEIGHT_FRACTION)
    }
}

/// Offset and size of a floating surface relative to its anchor's top-left
/// corner. Negative `y` is above the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSide {
    /// Anchor sits in the left half; the grid grows rightward.
    Left,
    /// Anchor sits in the right half; the grid grows leftward.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Justification {
    Start,
    End,
}

/// Row partitioning and horizontal shift of the extended grid.
///
/// Row 1 is the upper, possibly shorter row; row 0 sits directly above the
/// anchor. Slots `[0, row1_count)` belong to row 1, the rest to row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtendedLayout {
    pub row0_count: usize,
    pub row1_count: usize,
    pub anchor_side: AnchorSide,
    /// Number of row-0 columns between the anchor column and the row edge on
    /// the anchoring side.
    pub anchor_offset: usize,
}

impl ExtendedLayout {
    pub fn item_count(&self) -> usize {
        self.row0_count + self.row1_count
    }

    pub fn has_two_rows(&self) -> bool {
        self.row1_count > 0
    }

    pub fn justification(&self) -> Justification {
        match self.anchor_side {
            AnchorSide::Left => Justification::Start,
            AnchorSide::Right => Justification::End,
        }
    }

    /// Row-0 column sitting directly above the anchor.
    pub fn anchor_column(&self) -> usize {
        match self.anchor_side {
            AnchorSide::Left => self.anchor_offset,
            AnchorSide::Right => (self.row0_count - 1).saturating_sub(self.anchor_offset),
        }
    }

    /// Slot selected when the grid first opens.
    pub fn initial_slot(&self) -> usize {
        self.row1_count + self.anchor_column()
    }
}

/// Computes the preview size for `anchor` on the given host.
pub fn calc(anchor: &Bounds, host: &HostMetrics, sizing: &SizingConfig) -> PopupMetrics {
    let (width, height) = match host.mode {
        HostMode::EmojiGrid => scale(sizing.emoji, anchor.width, anchor.height),
        mode => {
            let m = match host.orientation {
                Orientation::Portrait => sizing.portrait,
                Orientation::Landscape => sizing.landscape,
            };
            if mode == HostMode::Compact {
                (
                    anchor.width * m.width,
                    host.nominal_key_height * m.height * sizing.compact_height_factor,
                )
            } else {
                scale(m, host.nominal_key_width, host.nominal_key_height)
            }
        }
    };

    PopupMetrics {
        width,
        height,
        diff_x: (anchor.width - width) / 2.0,
    }
}

fn scale(m: Multipliers, width: f32, height: f32) -> (f32, f32) {
    (width * m.width, height * m.height)
}

/// Splits `item_count` into (row0, row1). Up to `row_capacity` items share
/// one row; beyond that the lower row takes the extra item of an odd count.
pub fn partition_rows(item_count: usize, row_capacity: usize) -> (usize, usize) {
    if item_count <= row_capacity.max(1) {
        (item_count, 0)
    } else {
        let row1 = item_count / 2;
        (item_count - row1, row1)
    }
}

/// Offset that would center a row of `row0_count` columns over the anchor,
/// leaning towards the anchoring side for even counts.
pub fn centering_offset(row0_count: usize) -> usize {
    row0_count.saturating_sub(1) / 2
}

pub fn plan_extended_layout(
    item_count: usize,
    anchor: &Bounds,
    popup: &PopupMetrics,
    container_width: f32,
    row_capacity: usize,
) -> ExtendedLayout {
    let (row0_count, row1_count) = partition_rows(item_count, row_capacity);

    let anchor_side = if anchor.x < container_width / 2.0 {
        AnchorSide::Left
    } else {
        AnchorSide::Right
    };

    let space = match anchor_side {
        AnchorSide::Left => anchor.x,
        AnchorSide::Right => container_width - anchor.x - anchor.width,
    };

    let mut anchor_offset = centering_offset(row0_count);
    while anchor_offset > 0 && anchor_offset as f32 * popup.width > space {
        anchor_offset -= 1;
    }

    ExtendedLayout {
        row0_count,
        row1_count,
        anchor_side,
        anchor_offset,
    }
}

/// Preview bubble: popup-sized, centered over the anchor, bottom edge on the
/// anchor's top edge.
pub fn place_preview(popup: &PopupMetrics) -> Placement {
    Placement {
        x: popup.diff_x,
        y: -popup.height,
        width: popup.width,
        height: popup.height,
    }
}

pub fn place_extended(popup: &PopupMetrics, layout: &ExtendedLayout) -> Placement {
    let row_height = popup.height * ROW_HEIGHT_FRACTION;
    let width = layout.row0_count as f32 * popup.width;
    let shift = layout.anchor_offset as f32 * popup.width;

    let x = match layout.anchor_side {
        AnchorSide::Left => popup.diff_x - shift,
        AnchorSide::Right => popup.diff_x - width + popup.width + shift,
    };

    let (height, y) = if layout.has_two_rows() {
        (row_height * 2.0, -popup.height - row_height)
    } else {
        (row_height, -popup.height)
    };

    Placement { x, y, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f32 = 100.0;
    const H: f32 = 200.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn metrics() -> PopupMetrics {
        PopupMetrics { width: W, height: H, diff_x: -5.0 }
    }

    fn host(orientation: Orientation, mode: HostMode) -> HostMetrics {
        HostMetrics {
            container_width: 1080.0,
            nominal_key_width: 100.0,
            nominal_key_height: 120.0,
            orientation,
            mode,
        }
    }

    fn anchor_at(x: f32) -> Bounds {
        Bounds::new(x, 0.0, 90.0, 120.0)
    }

    // --- calc ---

    #[test]
    fn portrait_full_uses_nominal_size() {
        let host = host(Orientation::Portrait, HostMode::Full);
        let m = calc(&anchor_at(0.0), &host, &SizingConfig::default());
        assert!(approx(m.width, 110.0), "width {}", m.width);
        assert!(approx(m.height, 300.0), "height {}", m.height);
        assert!(approx(m.diff_x, -10.0), "diff_x {}", m.diff_x);
    }

    #[test]
    fn landscape_compact_uses_anchor_width_and_compact_height() {
        let host = host(Orientation::Landscape, HostMode::Compact);
        let m = calc(&anchor_at(0.0), &host, &SizingConfig::default());
        assert!(approx(m.width, 54.0), "width {}", m.width);
        assert!(approx(m.height, 120.0 * 3.0 * 1.2), "height {}", m.height);
        assert!(approx(m.diff_x, 18.0));
    }

    #[test]
    fn landscape_full_uses_nominal_size() {
        let host = host(Orientation::Landscape, HostMode::Full);
        let m = calc(&anchor_at(0.0), &host, &SizingConfig::default());
        assert!(approx(m.width, 60.0));
        assert!(approx(m.height, 360.0));
    }

    #[test]
    fn portrait_compact_scales_anchor_width() {
        let host = host(Orientation::Portrait, HostMode::Compact);
        let m = calc(&anchor_at(0.0), &host, &SizingConfig::default());
        assert!(approx(m.width, 99.0));
        assert!(approx(m.height, 120.0 * 2.5 * 1.2));
    }

    #[test]
    fn emoji_grid_sizes_from_the_cell() {
        let host = host(Orientation::Portrait, HostMode::EmojiGrid);
        let m = calc(&anchor_at(0.0), &host, &SizingConfig::default());
        assert!(approx(m.width, 90.0));
        assert!(approx(m.height, 300.0));
        assert!(approx(m.diff_x, 0.0));
        // One grid row is exactly one cell high
        assert!(approx(m.item_size().1, 120.0));
    }

    #[test]
    fn configured_multipliers_drive_sizing() {
        let sizing = SizingConfig {
            landscape: Multipliers { width: 0.8, height: 2.0 },
            compact_height_factor: 1.5,
            ..SizingConfig::default()
        };

        let full = calc(&anchor_at(0.0), &host(Orientation::Landscape, HostMode::Full), &sizing);
        assert!(approx(full.width, 80.0), "width {}", full.width);
        assert!(approx(full.height, 240.0), "height {}", full.height);

        let compact = host(Orientation::Landscape, HostMode::Compact);
        let m = calc(&anchor_at(0.0), &compact, &sizing);
        assert!(approx(m.width, 72.0), "width {}", m.width);
        assert!(approx(m.height, 360.0), "height {}", m.height);
        assert!(approx(m.diff_x, 9.0));

        // Portrait keeps its defaults
        let portrait = calc(&anchor_at(0.0), &host(Orientation::Portrait, HostMode::Full), &sizing);
        assert!(approx(portrait.width, 110.0));
    }

    #[test]
    fn row_capacity_controls_wrapping() {
        assert_eq!(partition_rows(4, 3), (2, 2));
        assert_eq!(partition_rows(3, 3), (3, 0));
        assert_eq!(partition_rows(7, 8), (7, 0));
    }

    // --- row partitioning ---

    #[test]
    fn up_to_five_items_use_one_row() {
        for n in 1..=5 {
            assert_eq!(partition_rows(n, 5), (n, 0), "n = {}", n);
        }
    }

    #[test]
    fn odd_counts_above_five_put_extra_item_in_row0() {
        for n in (7..=21).step_by(2) {
            let (row0, row1) = partition_rows(n, 5);
            assert_eq!(row0, row1 + 1, "n = {}", n);
            assert_eq!(row0 + row1, n);
        }
    }

    #[test]
    fn even_counts_above_five_split_evenly() {
        for n in (6..=20).step_by(2) {
            let (row0, row1) = partition_rows(n, 5);
            assert_eq!(row0, row1, "n = {}", n);
            assert_eq!(row0 + row1, n);
        }
    }

    #[test]
    fn zero_capacity_still_allows_single_item_row() {
        assert_eq!(partition_rows(1, 0), (1, 0));
    }

    // --- anchor offset ---

    #[test]
    fn centering_offset_values() {
        assert_eq!(centering_offset(0), 0);
        assert_eq!(centering_offset(1), 0);
        assert_eq!(centering_offset(2), 0);
        assert_eq!(centering_offset(3), 1);
        assert_eq!(centering_offset(4), 1);
        assert_eq!(centering_offset(5), 2);
    }

    #[test]
    fn seven_items_anchored_left_with_room() {
        let layout = plan_extended_layout(7, &anchor_at(300.0), &metrics(), 1080.0, 5);
        assert_eq!(layout.row0_count, 4);
        assert_eq!(layout.row1_count, 3);
        assert_eq!(layout.anchor_side, AnchorSide::Left);
        assert_eq!(layout.anchor_offset, 1);
        assert_eq!(layout.justification(), Justification::Start);
    }

    #[test]
    fn far_left_anchor_clamps_offset_to_zero() {
        let layout = plan_extended_layout(5, &anchor_at(0.0), &metrics(), 1080.0, 5);
        assert_eq!(centering_offset(layout.row0_count), 2);
        assert_eq!(layout.anchor_offset, 0);
    }

    #[test]
    fn partial_space_reduces_offset_stepwise() {
        // Room for one popup column but not two
        let layout = plan_extended_layout(5, &anchor_at(150.0), &metrics(), 1080.0, 5);
        assert_eq!(layout.anchor_offset, 1);
    }

    #[test]
    fn right_half_anchor_measures_space_to_the_right_edge() {
        // 1080 - 900 - 90 = 90 px to the right edge: not even one column
        let layout = plan_extended_layout(5, &anchor_at(900.0), &metrics(), 1080.0, 5);
        assert_eq!(layout.anchor_side, AnchorSide::Right);
        assert_eq!(layout.justification(), Justification::End);
        assert_eq!(layout.anchor_offset, 0);

        let layout = plan_extended_layout(5, &anchor_at(700.0), &metrics(), 1080.0, 5);
        assert_eq!(layout.anchor_offset, 2);
    }

    #[test]
    fn offset_never_exceeds_centering_or_space() {
        for n in 1..=14 {
            for x in (0..1000).step_by(37) {
                let anchor = anchor_at(x as f32);
                let layout = plan_extended_layout(n, &anchor, &metrics(), 1080.0, 5);
                let space = match layout.anchor_side {
                    AnchorSide::Left => anchor.x,
                    AnchorSide::Right => 1080.0 - anchor.x - anchor.width,
                };
                assert!(layout.anchor_offset <= centering_offset(layout.row0_count));
                assert!(
                    layout.anchor_offset == 0 || layout.anchor_offset as f32 * W <= space,
                    "n = {}, x = {}",
                    n,
                    x
                );
                assert_eq!(layout.item_count(), n);
            }
        }
    }

    // --- initial slot ---

    #[test]
    fn initial_slot_left_counts_from_row_start() {
        let layout = ExtendedLayout {
            row0_count: 4,
            row1_count: 3,
            anchor_side: AnchorSide::Left,
            anchor_offset: 1,
        };
        assert_eq!(layout.initial_slot(), 4);
    }

    #[test]
    fn initial_slot_right_counts_from_row_end() {
        let layout = ExtendedLayout {
            row0_count: 4,
            row1_count: 3,
            anchor_side: AnchorSide::Right,
            anchor_offset: 1,
        };
        assert_eq!(layout.anchor_column(), 2);
        assert_eq!(layout.initial_slot(), 5);

        let single = ExtendedLayout {
            row0_count: 3,
            row1_count: 0,
            anchor_side: AnchorSide::Right,
            anchor_offset: 0,
        };
        assert_eq!(single.initial_slot(), 2);
    }

    // --- placement ---

    #[test]
    fn preview_sits_above_anchor() {
        let p = place_preview(&metrics());
        assert_eq!(p, Placement { x: -5.0, y: -H, width: W, height: H });
    }

    #[test]
    fn four_items_single_row_placement() {
        let layout = plan_extended_layout(4, &anchor_at(300.0), &metrics(), 1080.0, 5);
        assert_eq!((layout.row0_count, layout.row1_count), (4, 0));
        let p = place_extended(&metrics(), &layout);
        assert!(approx(p.width, 4.0 * W));
        assert!(approx(p.height, 0.4 * H));
        assert!(approx(p.y, -H));
        assert!(approx(p.x, -5.0 - W * layout.anchor_offset as f32));
    }

    #[test]
    fn two_rows_stack_above_the_anchor() {
        let layout = plan_extended_layout(7, &anchor_at(300.0), &metrics(), 1080.0, 5);
        let p = place_extended(&metrics(), &layout);
        assert!(approx(p.height, 0.8 * H));
        assert!(approx(p.y, -H - 0.4 * H));
    }

    #[test]
    fn right_anchor_grid_extends_leftward() {
        let layout = ExtendedLayout {
            row0_count: 4,
            row1_count: 0,
            anchor_side: AnchorSide::Right,
            anchor_offset: 1,
        };
        let p = place_extended(&metrics(), &layout);
        // Column 2 of 4 sits on top of the anchor
        assert!(approx(p.x, -5.0 - 2.0 * W));
        assert!(approx(p.x + layout.anchor_column() as f32 * W, -5.0));
    }
}
