//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use shopfront_core::api::SessionStatus;
use shopfront_core::api::types::{MetricsSnapshot, OrderConfirmation};
use shopfront_core::auth::{AuthEvent, AuthPhase, LoginOutcome};
use shopfront_core::catalog::ListingQuery;
use shopfront_core::route::Route;

use crate::common::{TaskId, TaskKind};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::mutations::StateMutation;
use crate::overlays::{
    AuthRequest, LoginState, Overlay, OverlayTransition, PromptKind, PromptState,
};
use crate::state::{AppState, PageData, PageState, TuiState};

/// Effects for the first frame: load the starting page and the cart badge.
pub fn init(app: &mut AppState) -> Vec<UiEffect> {
    let route = app.tui.route.clone();
    let mut effects = navigate(&mut app.tui, route);
    effects.push(UiEffect::RefreshCartCount);
    effects
}

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            app.tui.toasts.expire(Instant::now());
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::Session(status) => handle_session(&mut app.tui, &status),
        UiEvent::PageLoaded { task, result } => handle_page_loaded(&mut app.tui, task, result),
        UiEvent::CartUpdated {
            task,
            result,
            success,
        } => handle_cart_updated(&mut app.tui, task, result, success),
        UiEvent::CartCount(count) => {
            app.tui.cart_count = count;
            vec![]
        }
        UiEvent::AuthFinished { task, result } => handle_auth_finished(app, task, result),
        UiEvent::LoggedOut { task, result } => handle_logged_out(&mut app.tui, task, result),
        UiEvent::OrderPlaced { task, result } => handle_order_placed(&mut app.tui, task, result),
        UiEvent::Metrics { task, result } => {
            handle_metrics(&mut app.tui, task, result);
            vec![]
        }
        UiEvent::MetricsEnded { task } => {
            if app.tui.tasks.metrics.finish_if_active(task) {
                if let Some(PageData::Admin { stream_error, .. }) = app.tui.page.data_mut() {
                    stream_error.get_or_insert_with(|| "Live metrics disconnected".to_string());
                }
            }
            vec![]
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

fn start_task(tui: &mut TuiState, kind: TaskKind) -> TaskId {
    let id = tui.task_seq.next_id();
    tui.tasks.state_mut(kind).start(id);
    id
}

/// Moves to `route` and starts loading it.
pub fn navigate(tui: &mut TuiState, route: Route) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    if tui.route == Route::Admin && route != Route::Admin {
        tui.tasks.metrics.clear();
        effects.push(UiEffect::StopMetrics);
    }
    if route != tui.route {
        tui.route = route;
        tui.selected = 0;
        tui.page = PageState::Loading;
    }
    effects.push(load_current(tui));
    effects
}

/// Reloads the current route. Data already on screen stays until the new
/// data arrives.
fn load_current(tui: &mut TuiState) -> UiEffect {
    let task = start_task(tui, TaskKind::PageLoad);
    UiEffect::LoadPage {
        task,
        route: tui.route.clone(),
    }
}

fn navigate_query(tui: &mut TuiState, query: ListingQuery) -> Vec<UiEffect> {
    navigate(tui, Route::Products(query))
}

fn handle_page_loaded(
    tui: &mut TuiState,
    task: TaskId,
    result: Result<PageData, String>,
) -> Vec<UiEffect> {
    if !tui.tasks.page_load.finish_if_active(task) {
        return vec![];
    }

    match result {
        Ok(data) => {
            let is_admin = matches!(data, PageData::Admin { .. });
            tui.page = PageState::Ready(data);
            tui.clamp_selection();
            if is_admin && !tui.tasks.metrics.is_running() {
                let task = start_task(tui, TaskKind::Metrics);
                return vec![UiEffect::StartMetrics { task }];
            }
        }
        Err(message) => {
            if matches!(tui.page, PageState::Loading) {
                tui.page = PageState::Failed(message.clone());
            }
            tui.toasts.error(message);
        }
    }
    vec![]
}

// ============================================================================
// Keys
// ============================================================================

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(overlay) = &mut app.overlay {
        let update = overlay.handle_key(&app.tui, key);
        if matches!(update.transition, OverlayTransition::Close) {
            app.overlay = None;
        }
        return apply_mutations(app, update.mutations);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let tui = &mut app.tui;
    match key.code {
        KeyCode::Char('c') if ctrl => vec![UiEffect::Quit],
        KeyCode::Char('q') => vec![UiEffect::Quit],

        KeyCode::Char('h') => navigate(tui, Route::Home),
        KeyCode::Char('p') => navigate(tui, Route::products()),
        KeyCode::Char('c') => navigate(tui, Route::Cart),
        KeyCode::Char('m') => navigate(tui, Route::Admin),
        KeyCode::Char('u') => {
            if tui.auth.is_logged_in() {
                navigate(tui, Route::Account)
            } else {
                tui.toasts.warning("Please log in to view your account");
                app.overlay = Some(Overlay::Login(LoginState::open()));
                vec![]
            }
        }
        KeyCode::Char('r') => vec![load_current(tui)],
        KeyCode::Char('l') => {
            if tui.auth.is_logged_in() {
                let task = start_task(tui, TaskKind::Auth);
                vec![UiEffect::Logout { task }]
            } else {
                app.overlay = Some(Overlay::Login(LoginState::open()));
                vec![]
            }
        }

        KeyCode::Down | KeyCode::Char('j') => {
            tui.move_selection(1);
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            tui.move_selection(-1);
            vec![]
        }
        KeyCode::Enter => match tui.selected_product() {
            Some(product) => {
                let route = Route::product(product.slug.clone());
                navigate(tui, route)
            }
            None => vec![],
        },
        KeyCode::Char('a') => add_to_cart(tui),

        _ => match tui.route.clone() {
            Route::Home => handle_home_key(tui, key),
            Route::Products(query) => handle_products_key(app, &query, key),
            Route::Cart => handle_cart_key(app, key),
            _ => vec![],
        },
    }
}

fn handle_home_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let KeyCode::Char(c) = key.code else {
        return vec![];
    };
    let Some(index) = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1)) else {
        return vec![];
    };
    let category = match tui.page.data() {
        Some(PageData::Home { categories, .. }) => categories.get(index).map(|c| c.id),
        _ => None,
    };
    match category {
        Some(id) => navigate_query(
            tui,
            ListingQuery::default().with_filter(ListingQuery::CATEGORY, &id.to_string()),
        ),
        None => vec![],
    }
}

fn handle_products_key(app: &mut AppState, query: &ListingQuery, key: KeyEvent) -> Vec<UiEffect> {
    let tui = &mut app.tui;
    let prompt = |kind| Some(Overlay::Prompt(PromptState::open(kind, query)));
    match key.code {
        KeyCode::Char('/') => {
            app.overlay = prompt(PromptKind::Search);
            vec![]
        }
        KeyCode::Char('[') => {
            app.overlay = prompt(PromptKind::MinPrice);
            vec![]
        }
        KeyCode::Char(']') => {
            app.overlay = prompt(PromptKind::MaxPrice);
            vec![]
        }
        KeyCode::Char('s') => {
            let next = query.sort().next();
            navigate_query(tui, query.with_filter(ListingQuery::SORT, next.as_str()))
        }
        KeyCode::Char('x') if !query.is_empty() => navigate_query(tui, query.cleared()),
        KeyCode::Char('n') | KeyCode::Right => {
            let total = match tui.page.data() {
                Some(PageData::Products { page, .. }) => page.total_pages,
                _ => 0,
            };
            match query.page().checked_add(1).filter(|next| *next < total) {
                Some(next) => navigate_query(tui, query.with_page(next)),
                None => vec![],
            }
        }
        KeyCode::Char('N') | KeyCode::Left if query.page() > 0 => {
            navigate_query(tui, query.with_page(query.page() - 1))
        }
        _ => vec![],
    }
}

fn handle_cart_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let tui = &mut app.tui;
    let Some(PageData::Cart(view)) = tui.page.data() else {
        return vec![];
    };

    if key.code == KeyCode::Char('o') {
        if view.is_empty() {
            tui.toasts.warning("Your cart is empty");
            return vec![];
        }
        if !tui.auth.is_logged_in() {
            tui.toasts.warning("Please log in to checkout");
            app.overlay = Some(Overlay::Login(LoginState::open()));
            return vec![];
        }
        let task = start_task(tui, TaskKind::Checkout);
        return vec![UiEffect::Checkout { task }];
    }

    let Some(line) = view.lines.get(tui.selected) else {
        return vec![];
    };
    let (item_id, quantity) = (line.item_id, i64::from(line.quantity));
    let delta = match key.code {
        KeyCode::Char('+' | '=') => Some(1),
        KeyCode::Char('-') => Some(-1),
        _ => None,
    };

    if let Some(delta) = delta {
        let task = start_task(tui, TaskKind::CartMutation);
        return vec![UiEffect::UpdateCartItem {
            task,
            item_id,
            quantity: quantity + delta,
        }];
    }
    if matches!(key.code, KeyCode::Char('d') | KeyCode::Delete) {
        let task = start_task(tui, TaskKind::CartMutation);
        return vec![UiEffect::RemoveCartItem { task, item_id }];
    }
    vec![]
}

/// Adds the focused product: the detail page's product, otherwise the
/// product under the cursor.
fn add_to_cart(tui: &mut TuiState) -> Vec<UiEffect> {
    let product = match tui.page.data() {
        Some(PageData::Product(detail)) => Some(&detail.product),
        _ => tui.selected_product(),
    };
    let Some(product) = product else {
        return vec![];
    };
    if !product.in_stock() {
        let message = format!("{} is out of stock", product.name);
        tui.toasts.warning(message);
        return vec![];
    }

    let (product_id, name) = (product.id, product.name.clone());
    let task = start_task(tui, TaskKind::CartMutation);
    vec![UiEffect::AddToCart {
        task,
        product_id,
        quantity: 1,
        name,
    }]
}

fn apply_mutations(app: &mut AppState, mutations: Vec<StateMutation>) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    for mutation in mutations {
        match mutation {
            StateMutation::Auth(event) => apply_auth(&mut app.tui, event),
            StateMutation::Navigate(route) => effects.extend(navigate(&mut app.tui, route)),
            StateMutation::SubmitAuth(request) => {
                let task = start_task(&mut app.tui, TaskKind::Auth);
                effects.push(match request {
                    AuthRequest::Login { email, password } => UiEffect::Login {
                        task,
                        email,
                        password,
                    },
                    AuthRequest::Register {
                        email,
                        password,
                        full_name,
                    } => UiEffect::Register {
                        task,
                        email,
                        password,
                        full_name,
                    },
                });
            }
        }
    }
    effects
}

// ============================================================================
// Auth
// ============================================================================

fn apply_auth(tui: &mut TuiState, event: AuthEvent) {
    let phase = std::mem::take(&mut tui.auth);
    tui.auth = phase.apply(event);
}

/// Pages that make no sense without a session.
fn requires_session(route: &Route) -> bool {
    matches!(route, Route::Account | Route::Admin)
}

fn handle_session(tui: &mut TuiState, status: &SessionStatus) -> Vec<UiEffect> {
    let was_logged_in = tui.auth.is_logged_in();

    if *status == (SessionStatus::LoggedOut { forced: true }) {
        // The watch channel keeps only the latest value, so the preceding
        // `Refreshing` may never be observed.
        if matches!(tui.auth, AuthPhase::LoggedIn { .. }) {
            apply_auth(tui, AuthEvent::TokenRejected);
        }
        apply_auth(tui, AuthEvent::RefreshFailed);
        if !was_logged_in {
            return vec![];
        }
        tui.toasts
            .warning("Your session has expired. Please log in again.");
        let mut effects = vec![UiEffect::RefreshCartCount];
        if requires_session(&tui.route) {
            effects.extend(navigate(tui, Route::Home));
        }
        return effects;
    }

    if let Some(event) = AuthPhase::event_for(status) {
        apply_auth(tui, event);
    }
    vec![]
}

fn handle_auth_finished(
    app: &mut AppState,
    task: TaskId,
    result: Result<LoginOutcome, String>,
) -> Vec<UiEffect> {
    if !app.tui.tasks.auth.finish_if_active(task) {
        return vec![];
    }
    let tui = &mut app.tui;

    match result {
        Ok(outcome) => {
            apply_auth(tui, AuthEvent::Succeeded(outcome.user.clone()));
            if matches!(app.overlay, Some(Overlay::Login(_))) {
                app.overlay = None;
            }
            tui.cart_count = outcome.cart_count;
            tui.toasts
                .success(format!("Welcome, {}!", outcome.user.display_name()));
            if outcome.sync.synced > 0 {
                tui.toasts.success(format!(
                    "Moved {} item(s) from your guest cart",
                    outcome.sync.synced
                ));
            }
            if let Some(error) = outcome.sync_error {
                tui.toasts
                    .warning(format!("Could not sync your cart: {error}"));
            }
            vec![load_current(tui)]
        }
        Err(message) => {
            apply_auth(tui, AuthEvent::Failed(message.clone()));
            match app.overlay.as_mut().and_then(Overlay::as_login_mut) {
                Some(login) => login.fail(message),
                None => tui.toasts.error(message),
            }
            vec![]
        }
    }
}

fn handle_logged_out(
    tui: &mut TuiState,
    task: TaskId,
    result: Result<u32, String>,
) -> Vec<UiEffect> {
    if !tui.tasks.auth.finish_if_active(task) {
        return vec![];
    }
    match result {
        Ok(count) => {
            apply_auth(tui, AuthEvent::LoggedOut);
            tui.cart_count = count;
            tui.toasts.success("Logged out");
            if requires_session(&tui.route) {
                navigate(tui, Route::Home)
            } else {
                vec![load_current(tui)]
            }
        }
        Err(message) => {
            tui.toasts.error(message);
            vec![]
        }
    }
}

// ============================================================================
// Cart, checkout, metrics
// ============================================================================

fn handle_cart_updated(
    tui: &mut TuiState,
    task: TaskId,
    result: Result<u32, String>,
    success: Option<String>,
) -> Vec<UiEffect> {
    if !tui.tasks.cart_mutation.finish_if_active(task) {
        return vec![];
    }
    match result {
        Ok(count) => {
            tui.cart_count = count;
            if let Some(message) = success {
                tui.toasts.success(message);
            }
            if tui.route == Route::Cart {
                return vec![load_current(tui)];
            }
        }
        Err(message) => tui.toasts.error(message),
    }
    vec![]
}

fn handle_order_placed(
    tui: &mut TuiState,
    task: TaskId,
    result: Result<OrderConfirmation, String>,
) -> Vec<UiEffect> {
    if !tui.tasks.checkout.finish_if_active(task) {
        return vec![];
    }
    match result {
        Ok(order) => {
            let message = order.message.as_deref().map_or_else(
                || format!("Order #{} placed ({})", order.id, order.status),
                |m| format!("Order #{}: {m}", order.id),
            );
            tui.toasts.success(message);
            let mut effects = vec![UiEffect::RefreshCartCount];
            if tui.route == Route::Cart {
                effects.push(load_current(tui));
            }
            effects
        }
        Err(message) => {
            tui.toasts.error(message);
            vec![]
        }
    }
}

fn handle_metrics(tui: &mut TuiState, task: TaskId, result: Result<MetricsSnapshot, String>) {
    if !tui.tasks.metrics.is_active(task) {
        return;
    }
    let Some(PageData::Admin {
        live, stream_error, ..
    }) = tui.page.data_mut()
    else {
        return;
    };
    match result {
        Ok(snapshot) => {
            *live = Some(snapshot);
            *stream_error = None;
        }
        Err(message) => *stream_error = Some(message),
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::api::types::{Inventory, Page, ProductDetail};
    use shopfront_core::cart::{CartLine, CartView, SyncReport};
    use shopfront_core::catalog::{SortKey, demo};
    use shopfront_core::session::StoredUser;

    use super::*;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn user() -> StoredUser {
        StoredUser {
            id: 42,
            email: "ada@example.com".to_string(),
        }
    }

    fn logged_in() -> AuthPhase {
        AuthPhase::LoggedIn { user: user() }
    }

    /// Loads `data` through the reducer the way the runtime would.
    fn loaded(route: Route, auth: AuthPhase, data: PageData) -> AppState {
        let mut app = AppState::new(route, auth, true);
        let effects = init(&mut app);
        let Some(UiEffect::LoadPage { task, .. }) = effects.first() else {
            panic!("expected a page load, got {effects:?}");
        };
        update(
            &mut app,
            UiEvent::PageLoaded {
                task: *task,
                result: Ok(data),
            },
        );
        app
    }

    fn products_page(query: &str, total_pages: u32) -> AppState {
        let query = ListingQuery::parse(query);
        let mut page = Page::single(demo::products());
        page.total_pages = total_pages;
        page.number = query.page();
        loaded(
            Route::Products(query.clone()),
            AuthPhase::default(),
            PageData::Products {
                query,
                page,
                categories: demo::categories(),
            },
        )
    }

    fn cart_page(auth: AuthPhase) -> AppState {
        let line = CartLine {
            item_id: 11,
            product_id: Some(1),
            name: "Laptop".to_string(),
            unit_price: Some(999.99),
            quantity: 2,
            product: None,
        };
        loaded(
            Route::Cart,
            auth,
            PageData::Cart(CartView {
                lines: vec![line],
                is_local: false,
            }),
        )
    }

    fn page_route(effects: &[UiEffect]) -> Option<&Route> {
        effects.iter().find_map(|e| match e {
            UiEffect::LoadPage { route, .. } => Some(route),
            _ => None,
        })
    }

    #[test]
    fn test_init_loads_route_and_cart_count() {
        let mut app = AppState::new(Route::Home, AuthPhase::default(), true);
        let effects = init(&mut app);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadPage { route: Route::Home, .. }, UiEffect::RefreshCartCount]
        ));
        assert!(matches!(app.tui.page, PageState::Loading));
    }

    #[test]
    fn test_stale_page_results_are_dropped() {
        let mut app = AppState::new(Route::Home, AuthPhase::default(), true);
        let first = init(&mut app);
        let Some(UiEffect::LoadPage { task: stale, .. }) = first.first().cloned() else {
            panic!("expected a page load");
        };
        update(&mut app, key(KeyCode::Char('c')));

        update(
            &mut app,
            UiEvent::PageLoaded {
                task: stale,
                result: Ok(PageData::NotFound("/".to_string())),
            },
        );
        assert!(matches!(app.tui.page, PageState::Loading));
        assert_eq!(app.tui.route, Route::Cart);
    }

    #[test]
    fn test_failed_reload_keeps_previous_data() {
        let mut app = products_page("", 1);
        let effects = update(&mut app, key(KeyCode::Char('r')));
        let Some(UiEffect::LoadPage { task, .. }) = effects.first().cloned() else {
            panic!("expected a reload");
        };

        update(
            &mut app,
            UiEvent::PageLoaded {
                task,
                result: Err("HTTP error! status: 503".to_string()),
            },
        );
        assert!(matches!(
            app.tui.page,
            PageState::Ready(PageData::Products { .. })
        ));
        assert_eq!(
            app.tui.toasts.last().map(|t| t.message.as_str()),
            Some("HTTP error! status: 503")
        );
    }

    #[test]
    fn test_sort_key_cycles_and_resets_page() {
        let mut app = products_page("page=2&search=a", 5);
        let effects = update(&mut app, key(KeyCode::Char('s')));
        let Some(Route::Products(query)) = page_route(&effects) else {
            panic!("expected products navigation");
        };
        assert_eq!(query.sort(), SortKey::Newest.next());
        assert_eq!(query.page(), 0);
        assert_eq!(query.search(), "a");
    }

    #[test]
    fn test_next_page_stops_at_last_page() {
        let mut app = products_page("page=1", 3);
        let effects = update(&mut app, key(KeyCode::Char('n')));
        let Some(Route::Products(query)) = page_route(&effects) else {
            panic!("expected products navigation");
        };
        assert_eq!(query.page(), 2);

        let mut app = products_page("page=2", 3);
        assert!(update(&mut app, key(KeyCode::Char('n'))).is_empty());
        let effects = update(&mut app, key(KeyCode::Char('N')));
        assert!(matches!(page_route(&effects), Some(Route::Products(q)) if q.page() == 1));
    }

    #[test]
    fn test_next_page_at_max_page_is_ignored() {
        let mut app = products_page("page=4294967295", u32::MAX);
        assert!(update(&mut app, key(KeyCode::Char('n'))).is_empty());
        assert!(update(&mut app, key(KeyCode::Right)).is_empty());

        let effects = update(&mut app, key(KeyCode::Char('N')));
        assert!(matches!(
            page_route(&effects),
            Some(Route::Products(q)) if q.page() == u32::MAX - 1
        ));
    }

    #[test]
    fn test_clear_filters() {
        let mut app = products_page("search=zzz&minPrice=5", 0);
        let effects = update(&mut app, key(KeyCode::Char('x')));
        assert_eq!(page_route(&effects), Some(&Route::products()));
    }

    #[test]
    fn test_search_prompt_round_trip() {
        let mut app = products_page("sort=name", 1);
        update(&mut app, key(KeyCode::Char('/')));
        assert!(matches!(app.overlay, Some(Overlay::Prompt(_))));
        update(&mut app, key(KeyCode::Char('m')));
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(app.overlay.is_none());
        let Some(Route::Products(query)) = page_route(&effects) else {
            panic!("expected products navigation");
        };
        assert_eq!(query.search(), "m");
        assert_eq!(query.get(ListingQuery::SORT), Some("name"));
    }

    #[test]
    fn test_add_to_cart_from_listing() {
        let mut app = products_page("", 1);
        update(&mut app, key(KeyCode::Down));
        let effects = update(&mut app, key(KeyCode::Char('a')));
        let expected = demo::products().remove(1);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::AddToCart { product_id, quantity: 1, .. }] if *product_id == expected.id
        ));
        assert!(app.tui.tasks.cart_mutation.is_running());
    }

    #[test]
    fn test_out_of_stock_is_not_added() {
        let mut product = demo::products().remove(0);
        product.inventory = Some(Inventory { stock: 0 });
        let detail = ProductDetail {
            product,
            related_products: Vec::new(),
            reviews: Vec::new(),
        };
        let mut app = loaded(
            Route::product("laptop"),
            AuthPhase::default(),
            PageData::Product(Box::new(detail)),
        );

        assert!(update(&mut app, key(KeyCode::Char('a'))).is_empty());
        assert!(
            app.tui
                .toasts
                .last()
                .is_some_and(|t| t.message.ends_with("out of stock"))
        );
    }

    #[test]
    fn test_cart_keys_target_selected_line() {
        let mut app = cart_page(logged_in());
        let plus = update(&mut app, key(KeyCode::Char('+')));
        assert!(matches!(
            plus.as_slice(),
            [UiEffect::UpdateCartItem { item_id: 11, quantity: 3, .. }]
        ));
        let minus = update(&mut app, key(KeyCode::Char('-')));
        assert!(matches!(
            minus.as_slice(),
            [UiEffect::UpdateCartItem { item_id: 11, quantity: 1, .. }]
        ));
        let remove = update(&mut app, key(KeyCode::Char('d')));
        assert!(matches!(
            remove.as_slice(),
            [UiEffect::RemoveCartItem { item_id: 11, .. }]
        ));
    }

    #[test]
    fn test_cart_update_reloads_cart_page() {
        let mut app = cart_page(logged_in());
        let effects = update(&mut app, key(KeyCode::Char('d')));
        let Some(UiEffect::RemoveCartItem { task, .. }) = effects.first().cloned() else {
            panic!("expected removal");
        };

        let effects = update(
            &mut app,
            UiEvent::CartUpdated {
                task,
                result: Ok(0),
                success: Some("Item removed from cart".to_string()),
            },
        );
        assert_eq!(app.tui.cart_count, 0);
        assert_eq!(page_route(&effects), Some(&Route::Cart));
    }

    #[test]
    fn test_checkout_requires_login() {
        let mut app = cart_page(AuthPhase::default());
        let effects = update(&mut app, key(KeyCode::Char('o')));
        assert!(effects.is_empty());
        assert!(matches!(app.overlay, Some(Overlay::Login(_))));

        let mut app = cart_page(logged_in());
        let effects = update(&mut app, key(KeyCode::Char('o')));
        assert!(matches!(effects.as_slice(), [UiEffect::Checkout { .. }]));
    }

    #[test]
    fn test_login_flow_through_overlay() {
        let mut app = loaded(
            Route::Home,
            AuthPhase::default(),
            PageData::NotFound("/".to_string()),
        );
        update(&mut app, key(KeyCode::Char('l')));
        for c in "ada@example.com".chars() {
            update(&mut app, key(KeyCode::Char(c)));
        }
        update(&mut app, key(KeyCode::Tab));
        for c in "secret".chars() {
            update(&mut app, key(KeyCode::Char(c)));
        }
        let effects = update(&mut app, key(KeyCode::Enter));
        let Some(UiEffect::Login { task, email, .. }) = effects.first().cloned() else {
            panic!("expected login effect, got {effects:?}");
        };
        assert_eq!(email, "ada@example.com");
        assert_eq!(app.tui.auth, AuthPhase::Authenticating);

        let effects = update(
            &mut app,
            UiEvent::AuthFinished {
                task,
                result: Ok(LoginOutcome {
                    user: user(),
                    cart_count: 3,
                    sync: SyncReport { synced: 2 },
                    sync_error: None,
                }),
            },
        );
        assert!(app.overlay.is_none());
        assert_eq!(app.tui.auth, logged_in());
        assert_eq!(app.tui.cart_count, 3);
        assert_eq!(page_route(&effects), Some(&Route::Home));
    }

    #[test]
    fn test_login_failure_shows_inline_error() {
        let mut app = loaded(
            Route::Home,
            AuthPhase::default(),
            PageData::NotFound("/".to_string()),
        );
        update(&mut app, key(KeyCode::Char('l')));
        let effects = update(&mut app, key(KeyCode::Enter));
        let Some(UiEffect::Login { task, .. }) = effects.first().cloned() else {
            panic!("expected login effect");
        };

        update(
            &mut app,
            UiEvent::AuthFinished {
                task,
                result: Err("Please fill in all fields".to_string()),
            },
        );
        let Some(Overlay::Login(login)) = &app.overlay else {
            panic!("login overlay should stay open");
        };
        assert_eq!(login.error.as_deref(), Some("Please fill in all fields"));
        assert!(!login.submitting);
        assert_eq!(
            app.tui.auth,
            AuthPhase::LoggedOut {
                error: Some("Please fill in all fields".to_string())
            }
        );
    }

    #[test]
    fn test_forced_logout_leaves_account_page() {
        let mut app = loaded(
            Route::Account,
            logged_in(),
            PageData::NotFound("/account.html".to_string()),
        );
        let effects = update(
            &mut app,
            UiEvent::Session(SessionStatus::LoggedOut { forced: true }),
        );

        assert_eq!(app.tui.auth, AuthPhase::LoggedOut { error: None });
        assert!(effects.contains(&UiEffect::RefreshCartCount));
        assert_eq!(page_route(&effects), Some(&Route::Home));
        assert!(
            app.tui
                .toasts
                .last()
                .is_some_and(|t| t.message.contains("session has expired"))
        );
    }

    #[test]
    fn test_refresh_round_trip_keeps_user() {
        let mut app = AppState::new(Route::Home, logged_in(), true);
        update(&mut app, UiEvent::Session(SessionStatus::Refreshing));
        assert_eq!(app.tui.auth, AuthPhase::Refreshing { user: user() });
        update(
            &mut app,
            UiEvent::Session(SessionStatus::LoggedIn { user: Some(user()) }),
        );
        assert_eq!(app.tui.auth, logged_in());
    }

    #[test]
    fn test_leaving_admin_stops_metrics() {
        let mut app = loaded(
            Route::Admin,
            logged_in(),
            PageData::Admin {
                summary: MetricsSnapshot::default(),
                live: None,
                stream_error: None,
            },
        );
        assert!(app.tui.tasks.metrics.is_running());

        let effects = update(&mut app, key(KeyCode::Char('h')));
        assert_eq!(effects.first(), Some(&UiEffect::StopMetrics));
        assert!(!app.tui.tasks.metrics.is_running());
    }

    #[test]
    fn test_metrics_update_admin_page() {
        let mut app = AppState::new(Route::Admin, logged_in(), true);
        let effects = init(&mut app);
        let Some(UiEffect::LoadPage { task, .. }) = effects.first().cloned() else {
            panic!("expected a page load");
        };
        let effects = update(
            &mut app,
            UiEvent::PageLoaded {
                task,
                result: Ok(PageData::Admin {
                    summary: MetricsSnapshot::default(),
                    live: None,
                    stream_error: None,
                }),
            },
        );
        let Some(UiEffect::StartMetrics { task }) = effects.first().cloned() else {
            panic!("expected metrics stream to start");
        };

        let snapshot = MetricsSnapshot {
            online_users: Some(12),
            ..MetricsSnapshot::default()
        };
        update(
            &mut app,
            UiEvent::Metrics {
                task,
                result: Ok(snapshot.clone()),
            },
        );
        assert!(matches!(
            app.tui.page.data(),
            Some(PageData::Admin { live: Some(s), .. }) if *s == snapshot
        ));
    }
}
