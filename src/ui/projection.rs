/// Render-facing view of the search state
///
/// `project` is a pure function of the controller and the presentation-local
/// hover index. Widgets in `grid.rs` read only from the `Projection`.

use crate::state::controller::{LoadState, SearchController};
use crate::state::data::Photo;
use crate::ui::pagination::PageWindow;

/// One tile of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailView<'a> {
    pub index: usize,
    pub photo: &'a Photo,
    pub hovered: bool,
    /// The likes badge shows while the pointer is over the tile
    pub likes_visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    pub show_loading: bool,
    pub show_empty: bool,
    /// "Showing {perPage} out of {totalItems} results."
    pub summary_text: Option<String>,
    pub thumbnails: Vec<ThumbnailView<'a>>,
    pub pagination: Option<PageWindow>,
    pub error_text: Option<String>,
}

pub fn project(controller: &SearchController, hovered: Option<usize>) -> Projection<'_> {
    let state = controller.load_state();
    let results = controller.results();
    let page = controller.displayed_page().unwrap_or_else(|| controller.page_request());

    let summary_text = results
        .filter(|r| r.total_pages > 0)
        .map(|r| format!("Showing {} out of {} results.", page.per_page.get(), r.total_items));

    let thumbnails = results
        .map(|r| {
            r.items
                .iter()
                .enumerate()
                .map(|(index, photo)| {
                    let is_hovered = hovered == Some(index);
                    ThumbnailView {
                        index,
                        photo,
                        hovered: is_hovered,
                        likes_visible: is_hovered,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let pagination = results
        .filter(|r| r.total_pages > 0)
        .map(|r| PageWindow::new(page.page, r.total_pages));

    Projection {
        show_loading: state == LoadState::Loading,
        show_empty: state == LoadState::Empty,
        summary_text,
        thumbnails,
        pagination,
        error_text: controller.error().map(|e| e.to_string()),
    }
}
