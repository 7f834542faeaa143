//! Core Shopfront library (API client, session, cart, catalog, config).

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod format;
pub mod logging;
pub mod route;
pub mod session;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiClient;
use crate::auth::AuthManager;
use crate::cart::CartManager;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::storage::Storage;

/// The storefront services, constructed once and shared by the views.
#[derive(Clone)]
pub struct Services {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub api: Arc<ApiClient>,
    pub cart: Arc<CartManager>,
    pub catalog: Arc<Catalog>,
    pub auth: Arc<AuthManager>,
}

impl Services {
    /// # Errors
    /// Returns an error if the API client cannot be built from `config`.
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Result<Self> {
        let api = Arc::new(ApiClient::from_config(&config, Arc::clone(&storage))?);
        Ok(Self::with_api(config, storage, api))
    }

    /// Services around an existing client.
    pub fn with_api(config: Config, storage: Arc<dyn Storage>, api: Arc<ApiClient>) -> Self {
        let cart = Arc::new(CartManager::new(Arc::clone(&api), Arc::clone(&storage)));
        let catalog = Arc::new(Catalog::new(Arc::clone(&api), &config.catalog));
        let auth = Arc::new(AuthManager::new(Arc::clone(&api), Arc::clone(&cart)));

        Self {
            config,
            storage,
            api,
            cart,
            catalog,
            auth,
        }
    }
}
