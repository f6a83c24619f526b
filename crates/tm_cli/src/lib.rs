//! `tm` command-line front end: argument dispatch, plain-text rendering and
//! the interactive menu. All task state lives behind `tm_core::TaskService`.

pub mod cli;
pub mod interactive;
pub mod render;
