pub mod app;
pub mod error;
pub mod model;
pub mod store;
pub mod ui;
