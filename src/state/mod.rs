/// State management module
///
/// This module handles all search state, including:
/// - Shared data structures (data.rs)
/// - The query/pagination state machine (controller.rs)

pub mod controller;
pub mod data;
