use std::time::Instant;

use egui::{RichText, Ui};
use uuid::Uuid;

use crate::model::{DeleteConfirm, Task};
use crate::ui::theme;

/// Actions the task lists can request.
pub enum TaskListAction {
    None,
    /// Checkbox change: flip the completion flag.
    Toggle(Uuid),
    /// Load the task into the form as the edit target.
    Edit(Uuid),
    /// The delete trigger was activated (arming and confirming are decided
    /// by the caller's confirmation state machine).
    DeletePressed(Uuid),
}

/// Render the pending and completed lists.
pub fn show_task_lists(
    pending: &[&Task],
    completed: &[&Task],
    confirm: &DeleteConfirm,
    now: Instant,
    ui: &mut Ui,
) -> TaskListAction {
    let mut action = TaskListAction::None;

    section_header(ui, "Tasks", pending.len());
    if pending.is_empty() {
        ui.label(
            RichText::new("Nothing planned — add a task above.")
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    }

    egui::ScrollArea::vertical()
        .id_salt("task_lists")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, task) in pending.iter().enumerate() {
                if let Some(a) = task_row(task, i, false, confirm, now, ui) {
                    action = a;
                }
            }

            if !completed.is_empty() {
                ui.add_space(8.0);
                section_header(ui, "Done", completed.len());
                for (i, task) in completed.iter().enumerate() {
                    if let Some(a) = task_row(task, i, true, confirm, now, ui) {
                        action = a;
                    }
                }
            }
        });

    action
}

fn section_header(ui: &mut Ui, title: &str, count: usize) {
    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(title)
                .strong()
                .size(13.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.label(
            RichText::new(format!("({count})"))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(2.0);
}

/// Row text in the original list format: `MM/DD [subject] name · memo`.
fn row_text(task: &Task) -> String {
    let mut text = String::new();
    if let Some(date) = task.date {
        text.push_str(&date.format("%m/%d ").to_string());
    }
    if let Some(subject) = &task.subject {
        text.push_str(&format!("[{subject}] "));
    }
    text.push_str(&task.name);
    if let Some(memo) = &task.memo {
        text.push_str(&format!(" · {memo}"));
    }
    text
}

fn task_row(
    task: &Task,
    index: usize,
    done_section: bool,
    confirm: &DeleteConfirm,
    now: Instant,
    ui: &mut Ui,
) -> Option<TaskListAction> {
    let mut action = None;

    let row_bg = if index % 2 == 0 {
        theme::BG_PANEL
    } else {
        theme::BG_DARK
    };
    let frame = egui::Frame {
        fill: row_bg,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::symmetric(6.0, 4.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::NONE,
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 6.0;

            let mut checked = task.done;
            if ui.checkbox(&mut checked, "").changed() {
                action = Some(TaskListAction::Toggle(task.id));
            }

            let mut text = RichText::new(row_text(task))
                .font(theme::font_row())
                .color(if done_section {
                    theme::TEXT_DIM
                } else {
                    theme::TEXT_PRIMARY
                });
            if done_section {
                text = text.strikethrough();
            }
            ui.add(egui::Label::new(text).truncate());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                // Two-phase delete: armed triggers show the confirmation
                // label until their window elapses.
                let armed = confirm.is_armed(task.id, now);
                let del_label = if armed {
                    RichText::new("Sure?").size(10.0).color(theme::DANGER)
                } else {
                    RichText::new("✕").size(10.0).color(theme::TEXT_DIM)
                };
                let del_btn = ui.add(egui::Button::new(del_label).frame(false));
                if del_btn.on_hover_text("Delete task").clicked() {
                    action = Some(TaskListAction::DeletePressed(task.id));
                }

                if !done_section {
                    let edit_btn = ui.add(
                        egui::Button::new(
                            RichText::new("✎").size(10.0).color(theme::TEXT_DIM),
                        )
                        .frame(false),
                    );
                    if edit_btn.on_hover_text("Edit task").clicked() {
                        action = Some(TaskListAction::Edit(task.id));
                    }
                }
            });
        });
    });

    ui.add_space(1.0);
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn row_text_renders_all_fields() {
        let task = Task {
            id: Uuid::new_v4(),
            subject: Some("math".to_string()),
            name: "read ch.3".to_string(),
            memo: Some("pp. 40-60".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            done: false,
            created_at: 0,
        };
        assert_eq!(row_text(&task), "03/05 [math] read ch.3 · pp. 40-60");
    }

    #[test]
    fn row_text_omits_absent_fields() {
        let task = Task {
            id: Uuid::new_v4(),
            subject: None,
            name: "just a name".to_string(),
            memo: None,
            date: None,
            done: false,
            created_at: 0,
        };
        assert_eq!(row_text(&task), "just a name");
    }
}
