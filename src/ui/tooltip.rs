use egui::{Context, Id, LayerId, Order, Pos2, Rect, Rounding, Stroke, Vec2};

use crate::ui::theme;

/// Vertical gap between the hovered cell and the tooltip.
pub const GAP: f32 = 8.0;
/// The tooltip never comes closer than this to the container's side edges.
pub const SIDE_PADDING: f32 = 5.0;
/// Space that must remain below the tooltip before it flips above the cell.
pub const BOTTOM_MARGIN: f32 = 10.0;
/// Measured drift beyond this means the coordinate space is unreliable
/// (an ancestor introduced its own) and the placement must be re-anchored.
pub const ANCHOR_EPSILON: f32 = 0.5;

const INNER_PADDING: f32 = 8.0;
const MAX_TEXT_WIDTH: f32 = 260.0;

/// A resolved tooltip position, relative to the box it was computed against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Pos2,
    /// The below-the-cell default overflowed and the tooltip flipped above.
    pub above: bool,
}

/// Compute where a tooltip of size `tip` goes for a hovered `cell` inside
/// `container`. Centered under the cell with a fixed gap, clamped to the
/// container's side edges, flipped above the cell when the bottom would
/// overflow. The result is in container-relative coordinates.
pub fn place(cell: Rect, container: Rect, tip: Vec2) -> Placement {
    let mut left = cell.center().x - container.left() - tip.x / 2.0;
    let mut top = cell.bottom() - container.top() + GAP;
    let mut above = false;

    if left < SIDE_PADDING {
        left = SIDE_PADDING;
    }
    if left + tip.x > container.width() - SIDE_PADDING {
        left = container.width() - tip.x - SIDE_PADDING;
    }

    if top + tip.y > container.height() - BOTTOM_MARGIN {
        top = cell.top() - container.top() - tip.y - GAP;
        above = true;
    }

    Placement {
        pos: Pos2::new(left, top),
        above,
    }
}

/// Container-relative placement to absolute screen position.
pub fn screen_pos(container: Rect, placement: Placement) -> Pos2 {
    container.min + placement.pos.to_vec2()
}

/// Whether a measured on-screen position agrees with the computed one. A
/// divergence beyond the epsilon means a transformed/filtered ancestor broke
/// the fixed-coordinate assumption.
pub fn anchor_reliable(expected: Pos2, measured: Pos2) -> bool {
    expected.distance(measured) <= ANCHOR_EPSILON
}

/// Resolve the final placement. The happy path anchors against `container`;
/// if a measurement reveals drift and the nearest coordinate-space ancestor
/// is known, the same clamp/flip runs again relative to that ancestor's
/// box. Returns the placement and the box it is relative to.
pub fn resolve(
    cell: Rect,
    container: Rect,
    ancestor: Option<Rect>,
    tip: Vec2,
    measured: Option<Pos2>,
) -> (Placement, Rect) {
    let primary = place(cell, container, tip);
    if let (Some(measured), Some(ancestor)) = (measured, ancestor) {
        if !anchor_reliable(screen_pos(container, primary), measured) {
            return (place(cell, ancestor, tip), ancestor);
        }
    }
    (primary, container)
}

/// Paint the hover tooltip for a calendar day: one bulleted line per task
/// title. Hiding is simply not calling this — no animation state exists.
pub fn show_day_tooltip(ctx: &Context, container: Rect, cell: Rect, titles: &[&str]) {
    if titles.is_empty() {
        return;
    }
    let text = titles
        .iter()
        .map(|t| format!("• {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    let painter = ctx.layer_painter(LayerId::new(Order::Tooltip, Id::new("day-tooltip")));
    let galley = painter.layout(
        text,
        theme::font_tooltip(),
        theme::TEXT_PRIMARY,
        MAX_TEXT_WIDTH,
    );
    let tip = galley.size() + Vec2::splat(INNER_PADDING * 2.0);

    let (placement, anchor) = resolve(cell, container, None, tip, None);
    let rect = Rect::from_min_size(screen_pos(anchor, placement), tip);

    painter.rect_filled(rect, Rounding::same(6.0), theme::TOOLTIP_BG);
    painter.rect_stroke(rect, Rounding::same(6.0), Stroke::new(1.0, theme::TOOLTIP_BORDER));
    painter.galley(
        rect.min + Vec2::splat(INNER_PADDING),
        galley,
        egui::Color32::TRANSPARENT,
    );
}
