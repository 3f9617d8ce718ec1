//! PDF report rendering

pub mod layout;
pub mod render;

pub use render::{render, render_at, report_filename};
