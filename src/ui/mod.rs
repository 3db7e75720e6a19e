/// User interface module
///
/// - `projection.rs` - pure render-facing view of the search state
/// - `pagination.rs` - page button window for the pagination bar
/// - `thumbnail.rs` - image download, decode and cache
/// - `grid.rs` - iced widgets for the toolbar, grid, pagination and photo dialog

pub mod grid;
pub mod pagination;
pub mod projection;
pub mod thumbnail;
