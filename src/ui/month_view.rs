use std::collections::BTreeMap;

use chrono::NaiveDate;
use egui::{Align2, Id, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::model::{GridCell, Task};
use crate::ui::{theme, tooltip};

const WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Actions the month view can request.
pub enum MonthViewAction {
    None,
    /// A day cell was clicked: select that date for new-task creation.
    Select(NaiveDate),
}

/// Render the 42-cell month grid. Hovering a cell with tasks shows the
/// titles tooltip, positioned against the whole grid's box.
pub fn show_month_view(
    grid: &[GridCell],
    buckets: &BTreeMap<NaiveDate, Vec<&Task>>,
    ui: &mut Ui,
) -> MonthViewAction {
    let mut action = MonthViewAction::None;

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let container = response.rect;
    painter.rect_filled(container, 0.0, theme::BG_DARK);

    let gap = theme::CELL_GAP;
    let cell_w = (container.width() - 6.0 * gap) / 7.0;
    let cell_h =
        (container.height() - theme::WEEKDAY_HEADER_HEIGHT - 5.0 * gap) / 6.0;

    // Weekday header, Monday first.
    for (col, label) in WEEKDAY_LABELS.iter().enumerate() {
        let x = container.left() + col as f32 * (cell_w + gap) + cell_w / 2.0;
        painter.text(
            Pos2::new(x, container.top() + theme::WEEKDAY_HEADER_HEIGHT / 2.0),
            Align2::CENTER_CENTER,
            *label,
            theme::font_small(),
            theme::TEXT_DIM,
        );
    }

    let mut hovered: Option<(Rect, NaiveDate)> = None;

    for (idx, cell) in grid.iter().enumerate() {
        let col = (idx % 7) as f32;
        let row = (idx / 7) as f32;
        let rect = Rect::from_min_size(
            Pos2::new(
                container.left() + col * (cell_w + gap),
                container.top() + theme::WEEKDAY_HEADER_HEIGHT + row * (cell_h + gap),
            ),
            Vec2::new(cell_w, cell_h),
        );

        let fill = if cell.is_selected {
            theme::BG_SELECTED
        } else {
            theme::CELL_BG
        };
        painter.rect_filled(rect, Rounding::same(4.0), fill);
        if cell.is_selected {
            painter.rect_stroke(rect, Rounding::same(4.0), Stroke::new(1.0, theme::ACCENT));
        }
        if cell.is_today {
            painter.rect_stroke(
                rect,
                Rounding::same(4.0),
                Stroke::new(1.5, theme::CELL_TODAY_RING),
            );
        }

        let day_color = if cell.muted {
            theme::CELL_MUTED_TEXT
        } else {
            theme::TEXT_PRIMARY
        };
        painter.text(
            rect.min + Vec2::new(6.0, 4.0),
            Align2::LEFT_TOP,
            cell.day().to_string(),
            theme::font_cell(),
            day_color,
        );

        if cell.has_tasks {
            painter.circle_filled(
                Pos2::new(rect.center().x, rect.bottom() - 7.0),
                2.5,
                theme::TASK_DOT,
            );
        }

        let cell_response = ui.interact(rect, Id::new(("day-cell", idx)), Sense::click());
        if cell_response.clicked() {
            action = MonthViewAction::Select(cell.date);
        }
        if cell_response.hovered() && cell.has_tasks {
            hovered = Some((rect, cell.date));
        }
    }

    if let Some((cell_rect, date)) = hovered {
        if let Some(bucket) = buckets.get(&date) {
            let titles: Vec<&str> = bucket.iter().map(|t| t.name.as_str()).collect();
            tooltip::show_day_tooltip(ui.ctx(), container, cell_rect, &titles);
        }
    }

    action
}
