//! importscope - import graph construction and layout
//!
//! This crate extracts import statements from a codebase, resolves them into
//! a typed import graph, classifies files by their role in that graph, and
//! computes 2D positions for it under four layout strategies.

pub mod analysis;
pub mod config;
pub mod export;
pub mod graph;
pub mod layout;
pub mod ui;
