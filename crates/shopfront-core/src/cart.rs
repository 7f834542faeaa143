//! Cart management.
//!
//! Anonymous users keep a local cart in [`Storage`] under the `cart` key.
//! Authenticated users use the server cart. The two are only combined by
//! [`CartManager::sync_cart_on_login`], which replays local items onto the
//! server cart and then empties the local one.
//!
//! Item ids depend on the mode: local entries are addressed by product id,
//! remote entries by the server's cart line id.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::api::types::{Product, RemoteCartItem};
use crate::catalog::Catalog;
use crate::storage::{CART_KEY, Storage};

/// One entry of the local cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: u64,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// The anonymous cart as persisted under the `cart` key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalCart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl LocalCart {
    /// Adds `quantity` to the entry for `product_id`, appending a new entry
    /// stamped with `now` if none exists.
    pub fn upsert(&mut self, product_id: u64, quantity: u32, now: DateTime<Utc>) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = item.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                product_id,
                quantity,
                added_at: now,
            });
        }
    }

    /// Returns `false` if there is no entry for `product_id`.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) -> bool {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Returns `false` if there was no entry for `product_id`.
    pub fn remove(&mut self, product_id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Saturates at `u32::MAX`.
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .map(|i| i.quantity)
            .fold(0, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A displayable cart line, local or remote.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Id used for update/remove: product id (local) or cart line id (remote).
    pub item_id: u64,
    pub product_id: Option<u64>,
    pub name: String,
    pub unit_price: Option<f64>,
    pub quantity: u32,
    pub product: Option<Product>,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price.unwrap_or(0.0) * f64::from(self.quantity)
    }

    fn from_local(item: &CartItem, catalog: &Catalog) -> Self {
        let product = catalog.lookup(item.product_id);
        Self {
            item_id: item.product_id,
            product_id: Some(item.product_id),
            name: product
                .as_ref()
                .map_or_else(|| format!("Product #{}", item.product_id), |p| p.name.clone()),
            unit_price: product.as_ref().map(|p| p.price),
            quantity: item.quantity,
            product,
        }
    }

    fn from_remote(item: RemoteCartItem, catalog: &Catalog) -> Self {
        let product_id = item
            .product_id
            .or_else(|| item.product.as_ref().map(|p| p.id));
        let product = item
            .product
            .or_else(|| product_id.and_then(|id| catalog.lookup(id)));
        // A zero price-at-add falls through to the product's current price.
        let unit_price = item
            .price_at_add
            .filter(|p| *p > 0.0)
            .or_else(|| product.as_ref().map(|p| p.price));

        Self {
            item_id: item.id,
            product_id,
            name: product.as_ref().map_or_else(
                || format!("Item #{}", item.id),
                |p| p.name.clone(),
            ),
            unit_price,
            quantity: item.quantity,
            product,
        }
    }
}

/// Order summary for the cart page. Shipping is always free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartSummary {
    pub subtotal: f64,
    pub total: f64,
}

impl CartSummary {
    pub const SHIPPING_LABEL: &str = "Free";

    pub fn for_lines(lines: &[CartLine]) -> Self {
        let subtotal = lines.iter().map(CartLine::line_total).sum();
        Self {
            subtotal,
            total: subtotal,
        }
    }
}

/// The cart as displayed: lines plus which cart they came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub is_local: bool,
}

impl CartView {
    pub fn summary(&self) -> CartSummary {
        CartSummary::for_lines(&self.lines)
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .map(|l| l.quantity)
            .fold(0, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Outcome of [`CartManager::sync_cart_on_login`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Local items replayed onto the server cart.
    pub synced: usize,
}

pub struct CartManager {
    api: Arc<ApiClient>,
    storage: Arc<dyn Storage>,
}

impl CartManager {
    pub fn new(api: Arc<ApiClient>, storage: Arc<dyn Storage>) -> Self {
        Self { api, storage }
    }

    /// Whether operations target the server cart.
    pub fn is_remote(&self) -> bool {
        self.api.is_authenticated()
    }

    /// The persisted local cart; a missing or malformed record is empty.
    pub fn local_cart(&self) -> LocalCart {
        let Some(raw) = self.storage.get(CART_KEY) else {
            return LocalCart::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed local cart");
            LocalCart::default()
        })
    }

    fn save_local(&self, cart: &LocalCart) -> Result<()> {
        let json = serde_json::to_string(cart).context("Failed to serialize cart")?;
        self.storage.set(CART_KEY, &json)
    }

    /// Adds a product and returns the refreshed item count.
    ///
    /// # Errors
    /// Returns an error if `quantity` is zero, the server rejects the add, or
    /// the local cart cannot be saved.
    pub async fn add_to_cart(&self, product_id: u64, quantity: u32) -> Result<u32> {
        if quantity == 0 {
            bail!("Quantity must be at least 1");
        }

        if self.is_remote() {
            self.api.add_to_cart(product_id, quantity).await?;
        } else {
            let mut cart = self.local_cart();
            cart.upsert(product_id, quantity, Utc::now());
            self.save_local(&cart)?;
        }
        tracing::debug!(product_id, quantity, remote = self.is_remote(), "added to cart");

        Ok(self.update_cart_count().await)
    }

    /// Sets a line's quantity; zero or negative removes the line.
    ///
    /// # Errors
    /// Returns an error if the server rejects the change or storage fails.
    pub async fn update_quantity(&self, item_id: u64, quantity: i64) -> Result<u32> {
        if quantity <= 0 {
            return self.remove_from_cart(item_id).await;
        }
        let quantity = u32::try_from(quantity).context("Quantity is too large")?;

        if self.is_remote() {
            self.api.update_cart_item(item_id, quantity).await?;
        } else {
            let mut cart = self.local_cart();
            if cart.set_quantity(item_id, quantity) {
                self.save_local(&cart)?;
            }
        }

        Ok(self.update_cart_count().await)
    }

    /// Removes a line and returns the refreshed item count.
    ///
    /// # Errors
    /// Returns an error if the server rejects the removal or storage fails.
    pub async fn remove_from_cart(&self, item_id: u64) -> Result<u32> {
        if self.is_remote() {
            self.api.remove_cart_item(item_id).await?;
        } else {
            let mut cart = self.local_cart();
            if cart.remove(item_id) {
                self.save_local(&cart)?;
            }
        }

        Ok(self.update_cart_count().await)
    }

    /// Total item quantity for the header badge. Never fails: a failed
    /// server fetch falls back to the local cart.
    pub async fn update_cart_count(&self) -> u32 {
        if !self.is_remote() {
            return self.local_cart().total_quantity();
        }

        match self.api.get_cart().await {
            Ok(cart) => cart.total_quantity(),
            Err(e) => {
                tracing::warn!(error = %e, "cart fetch failed; using local count");
                self.local_cart().total_quantity()
            }
        }
    }

    /// Replays every local item onto the server cart, in stored order, then
    /// clears the local cart.
    ///
    /// Does nothing unless authenticated with a non-empty local cart. The
    /// first failing add aborts the sync: items already added stay on the
    /// server and the local cart is left untouched, so a retry re-adds them.
    /// The cart count is not refreshed here.
    ///
    /// # Errors
    /// Returns the first add failure, or a storage error when clearing.
    pub async fn sync_cart_on_login(&self) -> Result<SyncReport> {
        let cart = self.local_cart();
        if !self.is_remote() || cart.is_empty() {
            return Ok(SyncReport::default());
        }

        for item in &cart.items {
            self.api
                .add_to_cart(item.product_id, item.quantity)
                .await
                .with_context(|| format!("Failed to sync product {}", item.product_id))?;
        }

        self.save_local(&LocalCart::default())?;
        tracing::info!(items = cart.items.len(), "local cart synced");

        Ok(SyncReport {
            synced: cart.items.len(),
        })
    }

    /// Empties the local cart and returns the refreshed count.
    ///
    /// # Errors
    /// Returns an error if storage fails.
    pub async fn clear_local_cart(&self) -> Result<u32> {
        self.save_local(&LocalCart::default())?;
        Ok(self.update_cart_count().await)
    }

    /// Lines for the cart page, from the server cart when authenticated.
    ///
    /// # Errors
    /// Returns an error if the server cart cannot be fetched.
    pub async fn load_cart(&self, catalog: &Catalog) -> Result<CartView> {
        if self.is_remote() {
            let cart = self.api.get_cart().await?;
            let lines = cart
                .items
                .into_iter()
                .map(|item| CartLine::from_remote(item, catalog))
                .collect();
            return Ok(CartView {
                lines,
                is_local: false,
            });
        }

        let lines = self
            .local_cart()
            .items
            .iter()
            .map(|item| CartLine::from_local(item, catalog))
            .collect();
        Ok(CartView {
            lines,
            is_local: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, CatalogSource};
    use crate::storage::MemoryStorage;

    fn anonymous() -> (CartManager, Arc<dyn Storage>, Arc<ApiClient>) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let api = Arc::new(ApiClient::new(
            "http://127.0.0.1:9/api",
            Arc::clone(&storage),
        ));
        (
            CartManager::new(Arc::clone(&api), Arc::clone(&storage)),
            storage,
            api,
        )
    }

    #[test]
    fn test_upsert_sums_quantities() {
        let mut cart = LocalCart::default();
        let now = Utc::now();
        cart.upsert(7, 2, now);
        cart.upsert(7, 3, now);
        cart.upsert(8, 1, now);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total_quantity(), 6);
    }

    #[tokio::test]
    async fn test_anonymous_add_persists_local_cart() {
        let (cart, storage, _) = anonymous();

        assert_eq!(cart.add_to_cart(1, 2).await.unwrap(), 2);
        assert_eq!(cart.add_to_cart(1, 3).await.unwrap(), 5);
        assert_eq!(cart.add_to_cart(2, 1).await.unwrap(), 6);

        let raw = storage.get(CART_KEY).unwrap();
        let stored: LocalCart = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].product_id, 1);
        assert_eq!(stored.items[0].quantity, 5);
        assert!(raw.contains("\"productId\":1"));
        assert!(raw.contains("\"addedAt\""));
    }

    #[tokio::test]
    async fn test_count_saturates_instead_of_overflowing() {
        let (cart, _, _) = anonymous();

        assert_eq!(cart.add_to_cart(1, 3_000_000_000).await.unwrap(), 3_000_000_000);
        assert_eq!(cart.add_to_cart(2, 3_000_000_000).await.unwrap(), u32::MAX);
        assert_eq!(cart.update_cart_count().await, u32::MAX);
        assert_eq!(cart.local_cart().items.len(), 2);
    }

    #[test]
    fn test_view_quantity_saturates() {
        let line = |item_id| CartLine {
            item_id,
            product_id: Some(item_id),
            name: format!("Product #{item_id}"),
            unit_price: None,
            quantity: 3_000_000_000,
            product: None,
        };
        let view = CartView {
            lines: vec![line(1), line(2)],
            is_local: true,
        };
        assert_eq!(view.total_quantity(), u32::MAX);
    }

    #[tokio::test]
    async fn test_zero_quantity_add_is_rejected() {
        let (cart, _, _) = anonymous();
        assert!(cart.add_to_cart(1, 0).await.is_err());
        assert!(cart.local_cart().is_empty());
    }

    #[tokio::test]
    async fn test_update_to_zero_equals_removal() {
        let (cart, _, _) = anonymous();
        cart.add_to_cart(1, 2).await.unwrap();
        cart.add_to_cart(2, 4).await.unwrap();

        let count = cart.update_quantity(2, 0).await.unwrap();
        assert_eq!(count, 2);
        assert!(cart.local_cart().items.iter().all(|i| i.product_id != 2));

        let count = cart.update_quantity(1, -3).await.unwrap();
        assert_eq!(count, 0);
        assert!(cart.local_cart().is_empty());
    }

    #[tokio::test]
    async fn test_update_sets_quantity() {
        let (cart, _, _) = anonymous();
        cart.add_to_cart(3, 1).await.unwrap();
        assert_eq!(cart.update_quantity(3, 4).await.unwrap(), 4);
        // Unknown items are ignored.
        assert_eq!(cart.update_quantity(99, 4).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_malformed_local_cart_counts_as_empty() {
        let (cart, storage, _) = anonymous();
        storage.set(CART_KEY, "{oops").unwrap();
        assert_eq!(cart.update_cart_count().await, 0);
    }

    #[tokio::test]
    async fn test_sync_is_noop_when_anonymous() {
        let (cart, _, _) = anonymous();
        cart.add_to_cart(1, 1).await.unwrap();
        let report = cart.sync_cart_on_login().await.unwrap();
        assert_eq!(report.synced, 0);
        assert_eq!(cart.local_cart().total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_load_local_cart_lines_and_summary() {
        let (cart, _, api) = anonymous();
        let catalog = Catalog::new(
            api,
            &CatalogConfig {
                source: CatalogSource::Demo,
                ..CatalogConfig::default()
            },
        );
        cart.add_to_cart(6, 2).await.unwrap();
        cart.add_to_cart(404, 1).await.unwrap();

        let view = cart.load_cart(&catalog).await.unwrap();
        assert!(view.is_local);
        assert_eq!(view.lines[0].name, "Wireless Mouse");
        assert_eq!(view.lines[1].name, "Product #404");
        assert_eq!(view.total_quantity(), 3);

        let summary = view.summary();
        assert!((summary.subtotal - 59.98).abs() < 1e-9);
        assert!((summary.total - summary.subtotal).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remote_line_prefers_price_at_add() {
        let (_, _, api) = anonymous();
        let catalog = Catalog::new(api, &CatalogConfig::default());
        let item: RemoteCartItem = serde_json::from_str(
            r#"{"id":11,"quantity":2,"priceAtAdd":5.0,
                "product":{"id":3,"slug":"s","name":"Stand","price":9.0}}"#,
        )
        .unwrap();
        let line = CartLine::from_remote(item, &catalog);
        assert_eq!(line.item_id, 11);
        assert_eq!(line.product_id, Some(3));
        assert!((line.line_total() - 10.0).abs() < f64::EPSILON);

        let zero: RemoteCartItem = serde_json::from_str(
            r#"{"id":12,"quantity":1,"priceAtAdd":0,
                "product":{"id":3,"slug":"s","name":"Stand","price":9.0}}"#,
        )
        .unwrap();
        assert_eq!(CartLine::from_remote(zero, &catalog).unit_price, Some(9.0));
    }
}
