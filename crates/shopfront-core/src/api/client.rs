use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::error::{ApiError, ApiErrorKind, ApiResult};
use super::metrics::{self, MetricsStream};
use super::types::{
    AddCartItemRequest, AuthResponse, Category, CreateOrderRequest, LoginRequest,
    MetricsSnapshot, Order, OrderConfirmation, Page, Product, ProductDetail, Profile,
    ProfileUpdate, RefreshRequest, RegisterRequest, RemoteCart, UpdateCartItemRequest,
};
use crate::config::Config;
use crate::session::{SessionStore, StoredUser};
use crate::storage::Storage;

pub const USER_AGENT: &str = concat!("shopfront/", env!("CARGO_PKG_VERSION"));

/// Session state as seen by the API client.
///
/// Published on a watch channel so views can follow refreshes and forced
/// logouts that happen inside unrelated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    LoggedOut { forced: bool },
    Refreshing,
    LoggedIn { user: Option<StoredUser> },
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Public,
}

/// Storefront API client.
///
/// Attaches the stored access token to authenticated requests. A 401 on an
/// authenticated request triggers one refresh-token exchange and one retry;
/// if the refresh fails the session is cleared and the call fails with an
/// `Auth` error.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: SessionStore,
    status_tx: watch::Sender<SessionStatus>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        Self::with_http(base_url, storage, reqwest::Client::new())
    }

    /// Builds a client from configuration (base URL, connect timeout).
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> Result<Self> {
        let base_url = config.effective_base_url()?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self::with_http(base_url, storage, http))
    }

    fn with_http(
        base_url: impl Into<String>,
        storage: Arc<dyn Storage>,
        http: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let session = SessionStore::new(storage);
        let initial = if session.is_authenticated() {
            SessionStatus::LoggedIn {
                user: session.current_user(),
            }
        } else {
            SessionStatus::LoggedOut { forced: false }
        };
        let (status_tx, _) = watch::channel(initial);

        Self {
            base_url,
            http,
            session,
            status_tx,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<StoredUser> {
        self.session.current_user()
    }

    /// Subscribes to session status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    fn publish(&self, status: SessionStatus) {
        self.status_tx.send_replace(status);
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// Logs in and persists the session.
    ///
    /// # Errors
    /// Returns an error if the request fails or the session cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<StoredUser> {
        let response: AuthResponse = self
            .post("/auth/login", &LoginRequest { email, password }, Auth::Public)
            .await?;
        self.store_session(&response)
    }

    /// Registers a new account and persists the session.
    ///
    /// # Errors
    /// Returns an error if the request fails or the session cannot be stored.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<StoredUser> {
        let request = RegisterRequest {
            email,
            password,
            full_name,
        };
        let response: AuthResponse = self.post("/auth/register", &request, Auth::Public).await?;
        self.store_session(&response)
    }

    fn store_session(&self, response: &AuthResponse) -> Result<StoredUser> {
        if response.access_token.is_empty() {
            anyhow::bail!(ApiError::parse("Auth response did not include an access token"));
        }
        let user = self.session.save(response)?;
        self.publish(SessionStatus::LoggedIn {
            user: Some(user.clone()),
        });
        Ok(user)
    }

    /// Clears every session key.
    ///
    /// # Errors
    /// Returns an error if storage cannot be updated.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        self.publish(SessionStatus::LoggedOut { forced: false });
        Ok(())
    }

    /// Exchanges the stored refresh token for a new token pair.
    ///
    /// Returns `false` when there is no refresh token or the exchange fails;
    /// failures are logged, never propagated.
    pub async fn refresh_session(&self) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            return false;
        };

        let request = RefreshRequest {
            refresh_token: &refresh_token,
        };
        let result = match encode(&request) {
            Ok(body) => self.exchange_refresh(&body).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(auth) if !auth.access_token.is_empty() => {
                if let Err(e) = self
                    .session
                    .update_tokens(&auth.access_token, &auth.refresh_token)
                {
                    tracing::warn!(error = %e, "failed to persist refreshed tokens");
                    return false;
                }
                tracing::info!("access token refreshed");
                true
            }
            Ok(_) => {
                tracing::warn!("refresh response did not include an access token");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                false
            }
        }
    }

    async fn exchange_refresh(&self, body: &Value) -> ApiResult<AuthResponse> {
        let response = self
            .dispatch(&Method::POST, "/auth/refresh", Some(body), None)
            .await?;
        decode(&read_body(response).await?)
    }

    fn force_logout(&self) {
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "failed to clear session after refresh failure");
        }
        tracing::info!("session expired; logged out");
        self.publish(SessionStatus::LoggedOut { forced: true });
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    /// `GET /products` with listing parameters (search, category, price bounds, sort, page).
    pub async fn get_products(&self, params: &[(&str, String)]) -> ApiResult<Page<Product>> {
        let endpoint = with_query("/products", params);
        self.get(&endpoint, Auth::Public).await
    }

    pub async fn get_product(&self, slug: &str) -> ApiResult<ProductDetail> {
        self.get(&format!("/products/{}", path_segment(slug)), Auth::Public)
            .await
    }

    pub async fn get_featured_products(&self, limit: u32) -> ApiResult<Vec<Product>> {
        self.get(&format!("/products/featured?limit={limit}"), Auth::Public)
            .await
    }

    pub async fn get_categories(&self) -> ApiResult<Vec<Category>> {
        self.get("/categories", Auth::Public).await
    }

    // ------------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------------

    pub async fn get_cart(&self) -> ApiResult<RemoteCart> {
        self.get("/cart", Auth::Bearer).await
    }

    pub async fn add_to_cart(&self, product_id: u64, quantity: u32) -> ApiResult<Value> {
        let request = AddCartItemRequest {
            product_id,
            quantity,
        };
        self.post("/cart/items", &request, Auth::Bearer).await
    }

    pub async fn update_cart_item(&self, item_id: u64, quantity: u32) -> ApiResult<Value> {
        let body = encode(&UpdateCartItemRequest { quantity })?;
        self.send_json(
            Method::PATCH,
            &format!("/cart/items/{item_id}"),
            Some(&body),
            Auth::Bearer,
        )
        .await
    }

    pub async fn remove_cart_item(&self, item_id: u64) -> ApiResult<Value> {
        self.send_json(
            Method::DELETE,
            &format!("/cart/items/{item_id}"),
            None,
            Auth::Bearer,
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Account & orders
    // ------------------------------------------------------------------------

    pub async fn get_profile(&self) -> ApiResult<Profile> {
        self.get("/me", Auth::Bearer).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Profile> {
        let body = encode(update)?;
        self.send_json(Method::PATCH, "/me", Some(&body), Auth::Bearer)
            .await
    }

    pub async fn get_orders(&self, page: u32, size: u32) -> ApiResult<Page<Order>> {
        self.get(&format!("/me/orders?page={page}&size={size}"), Auth::Bearer)
            .await
    }

    pub async fn get_order(&self, order_id: u64) -> ApiResult<Order> {
        self.get(&format!("/orders/{order_id}"), Auth::Bearer).await
    }

    pub async fn create_order(&self, order: &CreateOrderRequest) -> ApiResult<OrderConfirmation> {
        self.post("/orders", order, Auth::Bearer).await
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    pub async fn get_dashboard_summary(&self) -> ApiResult<MetricsSnapshot> {
        self.get("/admin/dashboard/summary", Auth::Bearer).await
    }

    /// Opens the live metrics SSE stream.
    ///
    /// The stream is long-lived and is not retried on 401.
    pub async fn metrics_stream(&self) -> ApiResult<MetricsStream> {
        let url = format!("{}/admin/metrics/stream", self.base_url);
        let mut builder = self
            .http
            .get(&url)
            .header(header::ACCEPT, "text/event-stream");
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| ApiError::network(&e))?;
        let status = response.status();
        if !status.is_success() {
            let mut error = ApiError::new(
                ApiErrorKind::HttpStatus,
                "Failed to connect to metrics stream",
            );
            error.status = Some(status.as_u16());
            return Err(error);
        }

        Ok(metrics::parse_stream(response.bytes_stream()))
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, auth: Auth) -> ApiResult<T> {
        self.send_json(Method::GET, endpoint, None, auth).await
    }

    async fn post<T, B>(&self, endpoint: &str, body: &B, auth: Auth) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode(body)?;
        self.send_json(Method::POST, endpoint, Some(&body), auth)
            .await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        auth: Auth,
    ) -> ApiResult<T> {
        let text = self.send(&method, endpoint, body, auth).await?;
        decode(&text)
    }

    /// Sends a request, handling the one-shot refresh and retry on 401.
    async fn send(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&Value>,
        auth: Auth,
    ) -> ApiResult<String> {
        let token = match auth {
            Auth::Bearer => self.session.access_token(),
            Auth::Public => None,
        };

        let response = self
            .dispatch(method, endpoint, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || token.is_none() {
            return read_body(response).await;
        }

        tracing::debug!(endpoint, "access token rejected; refreshing");
        self.publish(SessionStatus::Refreshing);

        if !self.refresh_session().await {
            self.force_logout();
            return Err(ApiError::auth_failed());
        }

        self.publish(SessionStatus::LoggedIn {
            user: self.session.current_user(),
        });

        let token = self.session.access_token();
        let retry = self
            .dispatch(method, endpoint, body, token.as_deref())
            .await?;
        read_body(retry).await
    }

    async fn dispatch(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{endpoint}", self.base_url);
        tracing::debug!(%method, endpoint, authenticated = token.is_some(), "api request");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "api request failed");
            ApiError::network(&e)
        })
    }
}

async fn read_body(response: reqwest::Response) -> ApiResult<String> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let body = response.text().await.map_err(|e| ApiError::network(&e))?;

    if !status.is_success() {
        let error = ApiError::http_status(status.as_u16(), &body, is_json);
        tracing::debug!(status = status.as_u16(), message = %error.message, "api error");
        return Err(error);
    }
    Ok(body)
}

/// Decodes a response body; an empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::parse(format!("Failed to parse response: {e}")))
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::parse(format!("Failed to encode request: {e}")))
}

fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}

/// Percent-encodes one path segment. Form encoding writes a space as `+`,
/// which a path would keep literally, so spaces become `%20`.
fn path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
