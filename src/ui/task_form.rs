use chrono::NaiveDate;
use egui::{Key, RichText, Ui};

use crate::model::Task;
use crate::ui::theme;

/// Raw field contents of the add/edit form. The store does the trimming and
/// validation on submit.
#[derive(Debug, Default)]
pub struct FormState {
    pub subject: String,
    pub name: String,
    pub memo: String,
}

impl FormState {
    pub fn clear(&mut self) {
        self.subject.clear();
        self.name.clear();
        self.memo.clear();
    }

    /// Load a task's fields for editing.
    pub fn load(&mut self, task: &Task) {
        self.subject = task.subject.clone().unwrap_or_default();
        self.name = task.name.clone();
        self.memo = task.memo.clone().unwrap_or_default();
    }
}

/// Actions the form can request.
pub enum FormAction {
    None,
    /// Submit the current fields; add or commit-edit is the store's call.
    Submit,
}

/// Render the task form. One submit button serves both add and edit; Enter
/// in the name or memo field submits too.
pub fn show_task_form(
    form: &mut FormState,
    selected: &mut NaiveDate,
    editing: bool,
    ui: &mut Ui,
) -> FormAction {
    let mut action = FormAction::None;

    ui.add_space(2.0);
    ui.label(
        RichText::new(if editing { "Edit Task" } else { "New Task" })
            .strong()
            .size(13.0)
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(4.0);

    let field_label = |ui: &mut Ui, text: &str| {
        ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
    };

    field_label(ui, "Subject");
    ui.add_sized(
        [ui.available_width(), 24.0],
        egui::TextEdit::singleline(&mut form.subject).hint_text("Optional subject..."),
    );

    field_label(ui, "Name");
    let name_edit = ui.add_sized(
        [ui.available_width(), 24.0],
        egui::TextEdit::singleline(&mut form.name).hint_text("Task name..."),
    );

    field_label(ui, "Memo");
    let memo_edit = ui.add_sized(
        [ui.available_width(), 24.0],
        egui::TextEdit::singleline(&mut form.memo).hint_text("Optional memo..."),
    );

    field_label(ui, "Date");
    ui.add(egui_extras::DatePickerButton::new(selected).id_salt("form_date"));

    let submitted_with_enter = (name_edit.lost_focus() || memo_edit.lost_focus())
        && ui.input(|i| i.key_pressed(Key::Enter));

    ui.add_space(6.0);
    let label = if editing { "Save Task" } else { "Add Task" };
    let submit_btn = egui::Button::new(RichText::new(label).color(egui::Color32::WHITE))
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(5.0));
    let clicked = ui
        .add_sized([ui.available_width(), 28.0], submit_btn)
        .clicked();

    if clicked || submitted_with_enter {
        action = FormAction::Submit;
    }
    action
}
