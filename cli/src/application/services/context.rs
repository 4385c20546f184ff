//! Application service: the agent-facing platform context document.

use crate::application::ports::PlatformClient;
use crate::application::services::catalog_cache::CatalogCache;
use crate::domain::context::compose_context;

/// Static primer, extended with the live service catalog when a client and
/// cache are available. A catalog that cannot be fetched leaves just the
/// primer.
pub async fn context(live: Option<(&impl PlatformClient, &CatalogCache)>) -> String {
    match live {
        Some((client, cache)) => {
            let types = cache.get(client).await;
            compose_context(Some(types.as_slice()))
        }
        None => compose_context(None),
    }
}
