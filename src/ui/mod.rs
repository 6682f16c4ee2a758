//! UI module for the importscope preview
//!
//! This module provides a terminal preview that hosts the layout engine:
//! it draws positions computed by a [`crate::layout::LayoutSession`] and
//! feeds force ticks into it once per frame.

mod app;

pub use app::{run_app, Action, App};
