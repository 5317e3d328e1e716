pub mod dialogs;
pub mod month_view;
pub mod task_form;
pub mod task_list;
pub mod theme;
pub mod toolbar;
pub mod tooltip;
