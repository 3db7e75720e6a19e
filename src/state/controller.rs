/// Search state machine
///
/// `SearchController` owns the query, paging and result state of the view.
/// It never touches the network: transitions that need fresh results hand
/// back a `FetchRequest`, and the caller reports the outcome with `apply`.
/// Every request gets a new `RequestId`; only the outcome of the newest one
/// is applied, so replies that arrive out of order cannot overwrite newer
/// state.

use tracing::{debug, info, warn};

use super::data::{PageRequest, PerPage, ResultSet};
use crate::error::{GatewayError, InvalidPerPage};

/// Token identifying one issued fetch. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// A fetch the caller must run against the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub query: String,
    pub page: PageRequest,
}

/// What the view should be showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No search committed yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// Results are present
    Loaded,
    /// Loaded, but the committed query matched nothing
    Empty,
}

/// What `apply` did with the outcome it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Fresh,
    /// Superseded by a newer request; ignored
    Stale,
    /// The requested page no longer exists. Nothing was applied and the
    /// last page must be fetched instead.
    Refetch(FetchRequest),
}

/// Query and paging that produced the displayed results
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    query: String,
    page: PageRequest,
}

#[derive(Debug)]
pub struct SearchController {
    default_per_page: PerPage,
    /// Text being edited, not yet searched for
    pending_query: String,
    committed_query: Option<String>,
    page: PageRequest,
    results: Option<ResultSet>,
    /// Request behind `results`
    shown: Option<Snapshot>,
    in_flight: Option<FetchRequest>,
    next_id: u64,
    error: Option<GatewayError>,
}

impl SearchController {
    pub fn new(default_per_page: PerPage) -> Self {
        Self {
            default_per_page,
            pending_query: String::new(),
            committed_query: None,
            page: PageRequest::first(default_per_page),
            results: None,
            shown: None,
            in_flight: None,
            next_id: 0,
            error: None,
        }
    }

    // ========== Accessors ==========

    pub fn pending_query(&self) -> &str {
        &self.pending_query
    }

    pub fn committed_query(&self) -> Option<&str> {
        self.committed_query.as_deref()
    }

    /// Page and page size of the current (or next) fetch
    pub fn page_request(&self) -> PageRequest {
        self.page
    }

    /// Page and page size of the results on screen
    pub fn displayed_page(&self) -> Option<PageRequest> {
        self.shown.as_ref().map(|s| s.page)
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        if self.in_flight.is_some() {
            return LoadState::Loading;
        }
        match &self.results {
            None => LoadState::Idle,
            Some(results) => {
                let has_query = self.committed_query.as_deref().is_some_and(|q| !q.is_empty());
                if results.is_empty() && has_query {
                    LoadState::Empty
                } else {
                    LoadState::Loaded
                }
            }
        }
    }

    // ========== Transitions ==========

    /// Update the editing buffer. Never fetches.
    pub fn set_pending_query(&mut self, text: impl Into<String>) {
        self.pending_query = text.into();
    }

    /// Search for the pending text, starting over at page 1 with the default
    /// page size. Blank input is ignored.
    pub fn commit_query(&mut self) -> Option<FetchRequest> {
        let query = self.pending_query.trim();
        if query.is_empty() {
            debug!("Ignoring blank query");
            return None;
        }

        info!(query, "Committing search query");
        self.committed_query = Some(query.to_string());
        self.page = PageRequest::first(self.default_per_page);
        Some(self.issue())
    }

    /// Jump to page `n`. Ignored without results, outside
    /// `1..=total_pages`, or when `n` is already the current page.
    pub fn set_page(&mut self, n: u32) -> Option<FetchRequest> {
        self.committed_query.as_ref()?;
        let total_pages = self.results.as_ref()?.total_pages;

        if n < 1 || n > total_pages {
            debug!(page = n, total_pages, "Ignoring out-of-range page");
            return None;
        }
        if n == self.page.page {
            return None;
        }

        self.page.page = n;
        Some(self.issue())
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        self.set_page(self.page.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<FetchRequest> {
        self.set_page(self.page.page.saturating_sub(1))
    }

    /// Change the page size, keeping the query. The current page is clamped
    /// when the new size leaves fewer pages.
    pub fn set_per_page(&mut self, per_page: PerPage) -> Option<FetchRequest> {
        if per_page == self.page.per_page {
            return None;
        }

        self.page.per_page = per_page;
        if let Some(results) = &self.results {
            let last_page = per_page.page_count(results.total_items).max(1);
            self.page.page = self.page.page.min(last_page);
        }

        self.committed_query.as_ref()?;
        Some(self.issue())
    }

    /// `set_per_page` for a raw number; anything outside {5, 10, 20, 30}
    /// is rejected and leaves state unchanged.
    pub fn set_per_page_value(&mut self, value: u32) -> Result<Option<FetchRequest>, InvalidPerPage> {
        let per_page = PerPage::try_from(value)?;
        Ok(self.set_per_page(per_page))
    }

    /// Report the outcome of a fetch.
    ///
    /// Outcomes for anything but the newest request are dropped. A failure
    /// keeps the previous results and rolls query and paging back to what
    /// produced them. A page past the end of the (shrunken) result
    /// collection is not shown; the last page is requested in its place.
    pub fn apply(&mut self, id: RequestId, outcome: Result<ResultSet, GatewayError>) -> Applied {
        let request = match self.in_flight.take() {
            Some(request) if request.id == id => request,
            other => {
                self.in_flight = other;
                debug!(?id, "Discarding stale search response");
                return Applied::Stale;
            }
        };

        match outcome {
            Ok(results) if results.total_pages > 0 && request.page.page > results.total_pages => {
                warn!(
                    page = request.page.page,
                    total_pages = results.total_pages,
                    "Requested page is past the end, fetching the last page"
                );
                self.page = PageRequest { page: results.total_pages, ..request.page };
                return Applied::Refetch(self.issue());
            }
            Ok(results) => {
                info!(
                    query = %request.query,
                    page = request.page.page,
                    total = results.total_items,
                    "Search results applied"
                );
                self.page = request.page;
                self.shown = Some(Snapshot { query: request.query, page: request.page });
                self.error = None;
                self.results = Some(results);
            }
            Err(err) => {
                warn!(query = %request.query, error = %err, "Search failed");
                match &self.shown {
                    Some(snapshot) => {
                        self.committed_query = Some(snapshot.query.clone());
                        self.page = snapshot.page;
                    }
                    None => {
                        self.committed_query = None;
                        self.page = PageRequest::first(self.default_per_page);
                    }
                }
                self.error = Some(err);
            }
        }

        Applied::Fresh
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Allocate a new request for the committed query and current paging,
    /// superseding whatever was in flight.
    fn issue(&mut self) -> FetchRequest {
        self.next_id += 1;
        let request = FetchRequest {
            id: RequestId(self.next_id),
            query: self.committed_query.clone().unwrap_or_default(),
            page: self.page,
        };
        if let Some(previous) = &self.in_flight {
            debug!(superseded = ?previous.id, by = ?request.id, "Superseding in-flight search");
        }
        debug!(
            id = ?request.id,
            query = %request.query,
            page = request.page.page,
            per_page = request.page.per_page.get(),
            "Issuing search"
        );
        self.in_flight = Some(request.clone());
        request
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(PerPage::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{photos, ScriptedGateway};
    use crate::gateway::SearchGateway;

    fn result_set(total_items: u64, total_pages: u32, count: usize) -> ResultSet {
        ResultSet { items: photos(count), total_items, total_pages }
    }

    /// Run a request against the gateway and apply its outcome
    async fn run(controller: &mut SearchController, gateway: &ScriptedGateway, request: FetchRequest) -> Applied {
        let outcome = gateway.search(&request.query, request.page).await;
        controller.apply(request.id, outcome)
    }

    fn loaded(query: &str, total_items: u64, total_pages: u32) -> SearchController {
        let mut controller = SearchController::default();
        controller.set_pending_query(query);
        let request = controller.commit_query().unwrap();
        controller.apply(request.id, Ok(result_set(total_items, total_pages, 10)));
        controller
    }

    #[test]
    fn test_starts_idle() {
        let controller = SearchController::default();
        assert_eq!(controller.load_state(), LoadState::Idle);
        assert_eq!(controller.committed_query(), None);
        assert_eq!(controller.page_request(), PageRequest { page: 1, per_page: PerPage::Ten });
        assert!(controller.results().is_none());
    }

    #[test]
    fn test_pending_query_does_not_fetch() {
        let mut controller = SearchController::default();
        controller.set_pending_query("moun");
        controller.set_pending_query("mountain");
        assert_eq!(controller.pending_query(), "mountain");
        assert_eq!(controller.committed_query(), None);
        assert_eq!(controller.load_state(), LoadState::Idle);
    }

    #[test]
    fn test_blank_commit_is_ignored() {
        let mut controller = SearchController::default();
        controller.set_pending_query("   ");
        assert!(controller.commit_query().is_none());
        assert_eq!(controller.load_state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_commit_end_to_end() {
        let gateway = ScriptedGateway::new(|_, _| Ok(result_set(45, 5, 10)));
        let mut controller = SearchController::default();

        controller.set_pending_query("mountain");
        let request = controller.commit_query().unwrap();
        assert_eq!(controller.load_state(), LoadState::Loading);

        assert_eq!(run(&mut controller, &gateway, request).await, Applied::Fresh);
        assert_eq!(gateway.calls(), vec![("mountain".to_string(), 1, 10)]);
        assert_eq!(controller.load_state(), LoadState::Loaded);
        assert_eq!(controller.results().unwrap().items.len(), 10);
        assert_eq!(controller.displayed_page(), Some(PageRequest { page: 1, per_page: PerPage::Ten }));
    }

    #[test]
    fn test_commit_resets_page_and_per_page() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.set_page(4).unwrap();
        controller.apply(request.id, Ok(result_set(45, 5, 10)));
        let request = controller.set_per_page(PerPage::Five).unwrap();
        controller.apply(request.id, Ok(result_set(45, 9, 5)));

        controller.set_pending_query("lake");
        let request = controller.commit_query().unwrap();
        assert_eq!(request.query, "lake");
        assert_eq!(request.page, PageRequest { page: 1, per_page: PerPage::Ten });
        assert_eq!(controller.page_request().page, 1);
    }

    #[test]
    fn test_commit_uses_configured_default_per_page() {
        let mut controller = SearchController::new(PerPage::Twenty);
        controller.set_pending_query("forest");
        let request = controller.commit_query().unwrap();
        assert_eq!(request.page.per_page, PerPage::Twenty);
    }

    #[tokio::test]
    async fn test_set_page_fetches_requested_page() {
        let gateway = ScriptedGateway::new(|_, _| Ok(result_set(45, 5, 10)));
        let mut controller = loaded("mountain", 45, 5);

        let request = controller.set_page(3).unwrap();
        assert_eq!(request.query, "mountain");
        assert_eq!(request.page, PageRequest { page: 3, per_page: PerPage::Ten });
        run(&mut controller, &gateway, request).await;

        assert_eq!(gateway.calls(), vec![("mountain".to_string(), 3, 10)]);
        assert_eq!(controller.committed_query(), Some("mountain"));
    }

    #[test]
    fn test_set_page_out_of_range_is_ignored() {
        let mut controller = loaded("mountain", 45, 5);
        assert!(controller.set_page(9).is_none());
        assert!(controller.set_page(0).is_none());
        assert_eq!(controller.page_request().page, 1);
        assert_eq!(controller.load_state(), LoadState::Loaded);
    }

    #[test]
    fn test_set_page_without_results_is_ignored() {
        let mut controller = SearchController::default();
        assert!(controller.set_page(2).is_none());

        controller.set_pending_query("mountain");
        controller.commit_query().unwrap();
        // first page still loading, page count unknown
        assert!(controller.set_page(2).is_none());
    }

    #[test]
    fn test_same_page_is_ignored() {
        let mut controller = loaded("mountain", 45, 5);
        assert!(controller.set_page(1).is_none());
        assert!(controller.previous_page().is_none());
    }

    #[test]
    fn test_next_and_previous_page() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.next_page().unwrap();
        assert_eq!(request.page.page, 2);
        controller.apply(request.id, Ok(result_set(45, 5, 10)));

        let request = controller.previous_page().unwrap();
        assert_eq!(request.page.page, 1);
    }

    #[test]
    fn test_set_per_page_keeps_query_and_page() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.set_page(2).unwrap();
        controller.apply(request.id, Ok(result_set(45, 5, 10)));

        let request = controller.set_per_page(PerPage::Twenty).unwrap();
        assert_eq!(request.query, "mountain");
        assert_eq!(request.page, PageRequest { page: 2, per_page: PerPage::Twenty });
        assert_eq!(controller.committed_query(), Some("mountain"));
    }

    #[test]
    fn test_set_per_page_clamps_page() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.set_page(5).unwrap();
        controller.apply(request.id, Ok(result_set(45, 5, 5)));

        // 45 items at 30 per page is 2 pages
        let request = controller.set_per_page(PerPage::Thirty).unwrap();
        assert_eq!(request.page.page, 2);
    }

    #[test]
    fn test_set_per_page_before_search_only_records() {
        let mut controller = SearchController::default();
        assert!(controller.set_per_page(PerPage::Thirty).is_none());
        assert_eq!(controller.page_request().per_page, PerPage::Thirty);
        assert_eq!(controller.load_state(), LoadState::Idle);
    }

    #[test]
    fn test_invalid_per_page_leaves_state_unchanged() {
        let mut controller = loaded("mountain", 45, 5);
        let before = controller.page_request();

        assert_eq!(controller.set_per_page_value(15), Err(InvalidPerPage(15)));
        assert_eq!(controller.page_request(), before);
        assert_eq!(controller.load_state(), LoadState::Loaded);

        let request = controller.set_per_page_value(30).unwrap().unwrap();
        assert_eq!(request.page.per_page, PerPage::Thirty);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = loaded("mountain", 45, 5);

        let a = controller.set_page(2).unwrap();
        let b = controller.set_page(3).unwrap();
        assert!(b.id > a.id);

        let b_results = result_set(45, 5, 7);
        assert_eq!(controller.apply(b.id, Ok(b_results.clone())), Applied::Fresh);
        assert_eq!(controller.apply(a.id, Ok(result_set(45, 5, 3))), Applied::Stale);

        assert_eq!(controller.results(), Some(&b_results));
        assert_eq!(controller.page_request().page, 3);
        assert_eq!(controller.load_state(), LoadState::Loaded);
    }

    #[test]
    fn test_stale_response_does_not_end_loading() {
        let mut controller = loaded("mountain", 45, 5);
        let a = controller.set_page(2).unwrap();
        let _b = controller.set_page(3).unwrap();

        assert_eq!(controller.apply(a.id, Ok(result_set(45, 5, 3))), Applied::Stale);
        assert_eq!(controller.load_state(), LoadState::Loading);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut controller = loaded("mountain", 45, 5);
        let a = controller.set_page(2).unwrap();
        let b = controller.set_page(3).unwrap();
        controller.apply(b.id, Ok(result_set(45, 5, 10)));

        assert_eq!(controller.apply(a.id, Err(GatewayError::Timeout)), Applied::Stale);
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_empty_results() {
        let gateway = ScriptedGateway::new(|_, _| Ok(ResultSet::default()));
        let mut controller = SearchController::default();
        controller.set_pending_query("zzzzunlikely");
        let request = controller.commit_query().unwrap();
        run(&mut controller, &gateway, request).await;

        assert_eq!(controller.load_state(), LoadState::Empty);
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut controller = loaded("mountain", 45, 5);
        let before = controller.results().cloned();

        let request = controller.set_page(2).unwrap();
        controller.apply(request.id, Err(GatewayError::Transport("connection reset".into())));

        assert_eq!(controller.load_state(), LoadState::Loaded);
        assert_eq!(controller.results().cloned(), before);
        assert_eq!(controller.page_request().page, 1);
        assert_eq!(controller.error(), Some(&GatewayError::Transport("connection reset".into())));
    }

    #[test]
    fn test_failed_commit_restores_previous_query() {
        let mut controller = loaded("mountain", 45, 5);
        controller.set_pending_query("lake");
        let request = controller.commit_query().unwrap();
        controller.apply(request.id, Err(GatewayError::Timeout));

        assert_eq!(controller.committed_query(), Some("mountain"));
        assert_eq!(controller.pending_query(), "lake");
    }

    #[test]
    fn test_first_failure_returns_to_idle() {
        let mut controller = SearchController::default();
        controller.set_pending_query("mountain");
        let request = controller.commit_query().unwrap();
        controller.apply(
            request.id,
            Err(GatewayError::Status { status: 500, message: "boom".into() }),
        );

        assert_eq!(controller.load_state(), LoadState::Idle);
        assert_eq!(controller.committed_query(), None);
        assert!(controller.error().is_some());
    }

    #[test]
    fn test_success_clears_error() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.set_page(2).unwrap();
        controller.apply(request.id, Err(GatewayError::Timeout));
        assert!(controller.error().is_some());

        let request = controller.set_page(2).unwrap();
        controller.apply(request.id, Ok(result_set(45, 5, 10)));
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_dismiss_error() {
        let mut controller = SearchController::default();
        controller.set_pending_query("x");
        let request = controller.commit_query().unwrap();
        controller.apply(request.id, Err(GatewayError::Timeout));
        controller.dismiss_error();
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_page_past_the_end_refetches_last_page() {
        let mut controller = loaded("mountain", 45, 5);
        let shown = controller.results().cloned();
        let request = controller.set_page(5).unwrap();

        // collection shrank between requests
        let follow_up = match controller.apply(request.id, Ok(result_set(25, 3, 0))) {
            Applied::Refetch(follow_up) => follow_up,
            other => panic!("expected a refetch, got {:?}", other),
        };
        assert_eq!(follow_up.query, "mountain");
        assert_eq!(follow_up.page, PageRequest { page: 3, per_page: PerPage::Ten });
        assert!(follow_up.id > request.id);

        // the empty out-of-range page is never displayed
        assert_eq!(controller.load_state(), LoadState::Loading);
        assert_eq!(controller.results().cloned(), shown);
        assert_eq!(controller.displayed_page(), Some(PageRequest { page: 1, per_page: PerPage::Ten }));

        let last_page = result_set(25, 3, 5);
        assert_eq!(controller.apply(follow_up.id, Ok(last_page.clone())), Applied::Fresh);
        assert_eq!(controller.results(), Some(&last_page));
        assert_eq!(controller.displayed_page(), Some(PageRequest { page: 3, per_page: PerPage::Ten }));
        assert_eq!(controller.page_request().page, 3);
    }

    #[test]
    fn test_shrunken_collection_keeps_pages_reachable() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.set_page(5).unwrap();
        let Applied::Refetch(follow_up) = controller.apply(request.id, Ok(result_set(25, 3, 0))) else {
            panic!("expected a refetch");
        };
        controller.apply(follow_up.id, Ok(result_set(25, 3, 5)));

        let request = controller.set_page(2).unwrap();
        assert_eq!(request.page.page, 2);
        assert!(controller.set_page(4).is_none());
    }

    #[test]
    fn test_vanished_collection_shows_empty() {
        let mut controller = loaded("mountain", 45, 5);
        let request = controller.set_page(3).unwrap();
        assert_eq!(controller.apply(request.id, Ok(ResultSet::default())), Applied::Fresh);
        assert_eq!(controller.load_state(), LoadState::Empty);
    }
}
