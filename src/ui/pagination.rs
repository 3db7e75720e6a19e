/// Page buttons for the pagination bar
///
/// First and last page are always shown, plus one sibling on each side of
/// the current page. Gaps collapse into an ellipsis; a gap of a single page
/// shows that page instead.

/// Pages always shown at each end
const BOUNDARY: i64 = 1;
/// Pages shown on each side of the current one
const SIBLINGS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub current: u32,
    pub total: u32,
    pub items: Vec<PageItem>,
}

impl PageWindow {
    pub fn new(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            items: page_items(i64::from(current), i64::from(total)),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total
    }
}

fn page_items(current: i64, count: i64) -> Vec<PageItem> {
    let page = |n: i64| PageItem::Page(n as u32);

    let start_pages: Vec<i64> = (1..=BOUNDARY.min(count)).collect();
    let end_pages: Vec<i64> = ((count - BOUNDARY + 1).max(BOUNDARY + 1)..=count).collect();

    let siblings_start = (current - SIBLINGS)
        .min(count - BOUNDARY - SIBLINGS * 2 - 1)
        .max(BOUNDARY + 2);
    let siblings_end = (current + SIBLINGS)
        .max(BOUNDARY + SIBLINGS * 2 + 2)
        .min(end_pages.first().map_or(count - 1, |first| first - 2));

    let mut items: Vec<PageItem> = start_pages.into_iter().map(page).collect();

    if siblings_start > BOUNDARY + 2 {
        items.push(PageItem::Ellipsis);
    } else if BOUNDARY + 1 < count - BOUNDARY {
        items.push(page(BOUNDARY + 1));
    }

    items.extend((siblings_start..=siblings_end).map(page));

    if siblings_end < count - BOUNDARY - 1 {
        items.push(PageItem::Ellipsis);
    } else if count - BOUNDARY > BOUNDARY {
        items.push(page(count - BOUNDARY));
    }

    items.extend(end_pages.into_iter().map(page));
    items
}
