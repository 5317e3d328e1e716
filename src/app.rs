use std::time::{Duration, Instant};

use chrono::NaiveDate;
use egui::RichText;
use uuid::Uuid;

use crate::error::PlannerError;
use crate::model::calendar::{bucket_by_date, month_grid};
use crate::model::{DeleteConfirm, MonthCursor, Press, TaskDraft};
use crate::store::TaskStore;
use crate::ui;
use crate::ui::month_view::MonthViewAction;
use crate::ui::task_form::{FormAction, FormState};
use crate::ui::task_list::TaskListAction;
use crate::ui::theme;

/// Main application state.
pub struct PlannerApp {
    pub store: TaskStore,
    pub cursor: MonthCursor,
    /// The externally tracked selected date: new tasks land on it, and the
    /// grid highlights it.
    pub selected: NaiveDate,
    pub form: FormState,
    pub confirm: DeleteConfirm,

    // Dialog state
    pub show_about: bool,

    // Status message
    pub status_message: String,
}

impl PlannerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, store: TaskStore) -> Self {
        Self {
            store,
            cursor: MonthCursor::default(),
            selected: chrono::Local::now().date_naive(),
            form: FormState::default(),
            confirm: DeleteConfirm::new(),
            show_about: false,
            status_message: "Ready".to_string(),
        }
    }

    /// Submit the form: commit the active edit or add a new task.
    fn submit_form(&mut self) {
        let was_editing = self.store.editing().is_some();
        let draft = TaskDraft {
            subject: self.form.subject.clone(),
            name: self.form.name.clone(),
            memo: self.form.memo.clone(),
            date: Some(self.selected),
        };
        match self.store.commit_edit(&draft) {
            Ok(_) => {
                self.form.clear();
                self.status_message = if was_editing {
                    "Task updated".to_string()
                } else {
                    "Task added".to_string()
                };
            }
            Err(PlannerError::Validation(msg)) => {
                self.status_message = msg;
            }
            Err(e) => {
                // Stale edit target, e.g. removed by a remote push.
                log::debug!("submit ignored: {e}");
                self.form.clear();
            }
        }
    }

    fn begin_edit(&mut self, id: Uuid) {
        let Some(task) = self.store.begin_edit(id).cloned() else {
            return;
        };
        self.form.load(&task);
        if let Some(date) = task.date {
            self.selected = date;
        }
        self.status_message = format!("Editing '{}'", task.name);
    }

    fn press_delete(&mut self, id: Uuid, now: Instant) {
        match self.confirm.press(id, now) {
            Press::Armed => {
                self.status_message = "Press delete again to confirm".to_string();
            }
            Press::Confirmed => {
                self.store.remove(id);
                self.confirm.clear(id);
                self.status_message = "Task deleted".to_string();
            }
        }
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        theme::apply_theme(ctx);

        let now = Instant::now();
        self.confirm.tick(now);
        if self.store.poll_remote() {
            log::debug!("applied pushed snapshot");
        }

        // Keep polling for pushes, and repaint armed triggers so their
        // revert becomes visible without user input.
        if self.store.is_remote() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
        if self.confirm.any_armed() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(theme::BG_PANEL)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        RichText::new(&self.status_message)
                            .font(theme::font_status())
                            .color(theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!("Tasks: {}", self.store.tasks().len()))
                                .size(10.5)
                                .color(theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: form + lists
        let mut form_action = FormAction::None;
        let mut list_action = TaskListAction::None;
        egui::SidePanel::left("task_panel")
            .default_width(theme::SIDE_PANEL_WIDTH)
            .min_width(240.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                form_action = ui::task_form::show_task_form(
                    &mut self.form,
                    &mut self.selected,
                    self.store.editing().is_some(),
                    ui,
                );
                ui.add_space(4.0);
                ui.separator();
                ui.add_space(2.0);

                let pending = self.store.pending_tasks();
                let completed = self.store.completed_tasks();
                list_action =
                    ui::task_list::show_task_lists(&pending, &completed, &self.confirm, now, ui);
            });

        // Central panel: month header + grid
        let mut month_action = MonthViewAction::None;
        let mut month_nav = 0i8;
        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(theme::BG_DARK)
                    .inner_margin(egui::Margin::same(8.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("◀").clicked() {
                        month_nav = -1;
                    }
                    ui.label(
                        RichText::new(self.cursor.label())
                            .font(theme::font_header())
                            .color(theme::TEXT_PRIMARY),
                    );
                    if ui.button("▶").clicked() {
                        month_nav = 1;
                    }
                });
                ui.add_space(4.0);

                let today = chrono::Local::now().date_naive();
                let buckets = bucket_by_date(self.store.tasks());
                let grid = month_grid(self.cursor.first(), &buckets, today, self.selected);
                month_action = ui::month_view::show_month_view(&grid, &buckets, ui);
            });

        // Handle deferred actions once the panels released their borrows.
        if month_nav < 0 {
            self.cursor.prev();
        } else if month_nav > 0 {
            self.cursor.next();
        }
        if let FormAction::Submit = form_action {
            self.submit_form();
        }
        match list_action {
            TaskListAction::Toggle(id) => {
                self.store.toggle_done(id);
                self.status_message = "Task updated".to_string();
            }
            TaskListAction::Edit(id) => self.begin_edit(id),
            TaskListAction::DeletePressed(id) => self.press_delete(id, now),
            TaskListAction::None => {}
        }
        if let MonthViewAction::Select(date) = month_action {
            self.selected = date;
        }

        // Dialogs
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
