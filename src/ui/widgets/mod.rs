// src/ui/widgets/mod.rs

pub mod footer;
pub mod input;
pub mod notice_popup;
pub mod results;
pub mod summary;
