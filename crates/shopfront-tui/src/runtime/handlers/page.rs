//! Page data loading.

use anyhow::{Result, bail};
use shopfront_core::Services;
use shopfront_core::route::Route;

use super::display;
use crate::common::TaskId;
use crate::events::UiEvent;
use crate::state::PageData;

/// Orders shown on the account page.
pub const ACCOUNT_ORDERS_PAGE_SIZE: u32 = 10;

/// Loads the data for `route`.
///
/// Pure async function - runtime spawns and sends result to inbox.
pub async fn load_page(services: Services, task: TaskId, route: Route) -> UiEvent {
    let result = fetch_page(&services, &route).await.map_err(|e| {
        tracing::warn!(%route, error = %e, "page load failed");
        display(&e)
    });
    UiEvent::PageLoaded { task, result }
}

async fn fetch_page(services: &Services, route: &Route) -> Result<PageData> {
    let catalog = &services.catalog;
    match route {
        Route::Home => {
            let (categories, featured) =
                tokio::try_join!(catalog.top_categories(), catalog.featured())?;
            Ok(PageData::Home {
                categories,
                featured,
            })
        }
        Route::Products(query) => {
            let (page, categories) = tokio::join!(catalog.list_products(query), catalog.categories());
            // The category names only decorate the filter bar.
            let categories = categories.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "categories unavailable");
                Vec::new()
            });
            Ok(PageData::Products {
                query: query.clone(),
                page: page?,
                categories,
            })
        }
        Route::Product(slug) => {
            let detail = catalog
                .product_detail(slug.as_deref().unwrap_or_default())
                .await?;
            Ok(PageData::Product(Box::new(detail)))
        }
        Route::Cart => Ok(PageData::Cart(services.cart.load_cart(catalog).await?)),
        Route::Account => {
            if !services.api.is_authenticated() {
                bail!("Please log in to view your account");
            }
            let (profile, orders) = tokio::try_join!(
                services.api.get_profile(),
                services.api.get_orders(0, ACCOUNT_ORDERS_PAGE_SIZE)
            )?;
            Ok(PageData::Account { profile, orders })
        }
        Route::Admin => {
            let summary = services.api.get_dashboard_summary().await?;
            Ok(PageData::Admin {
                summary,
                live: None,
                stream_error: None,
            })
        }
        Route::Other(path) => Ok(PageData::NotFound(path.clone())),
    }
}
