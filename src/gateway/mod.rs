/// Photo-search gateway
///
/// The search state machine only knows the `SearchGateway` contract.
/// - `unsplash.rs` - HTTP implementation against the Unsplash API

pub mod unsplash;

use std::future::Future;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::state::controller::{FetchRequest, RequestId};
use crate::state::data::{PageRequest, ResultSet};

pub use unsplash::UnsplashGateway;

/// Remote photo search
pub trait SearchGateway: Send + Sync + 'static {
    /// Fetch one page of photos matching `query`
    fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> impl Future<Output = Result<ResultSet, GatewayError>> + Send;
}

/// Run a controller-issued request, tagging the outcome with its ID so the
/// controller can tell whether it is still wanted
pub async fn execute<G: SearchGateway>(
    gateway: Arc<G>,
    request: FetchRequest,
) -> (RequestId, Result<ResultSet, GatewayError>) {
    let outcome = gateway.search(&request.query, request.page).await;
    (request.id, outcome)
}
