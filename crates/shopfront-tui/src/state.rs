//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── route: Route          (current location)
//! │   ├── page: PageState       (data for the route: loading, ready, failed)
//! │   ├── selected: usize       (cursor within the page's list)
//! │   ├── cart_count / auth     (header badge and login phase)
//! │   ├── toasts: Toasts
//! │   └── task_seq / tasks      (async task bookkeeping)
//! └── overlay: Option<Overlay>  (login modal, input prompts)
//! ```
//!
//! `TuiState` and the overlay are separate fields so overlay key handlers can
//! borrow the overlay mutably while reading the rest of the state.

use shopfront_core::api::types::{
    Category, MetricsSnapshot, Order, Page, Product, ProductDetail, Profile,
};
use shopfront_core::auth::AuthPhase;
use shopfront_core::cart::CartView;
use shopfront_core::catalog::ListingQuery;
use shopfront_core::route::Route;

use crate::common::{TaskSeq, Tasks, Toasts};
use crate::overlays::Overlay;

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(route: Route, auth: AuthPhase, demo: bool) -> Self {
        Self {
            tui: TuiState::new(route, auth, demo),
            overlay: None,
        }
    }
}

/// Data loaded for one page.
#[derive(Debug, Clone)]
pub enum PageData {
    Home {
        categories: Vec<Category>,
        featured: Vec<Product>,
    },
    Products {
        query: ListingQuery,
        page: Page<Product>,
        categories: Vec<Category>,
    },
    Product(Box<ProductDetail>),
    Cart(CartView),
    Account {
        profile: Profile,
        orders: Page<Order>,
    },
    Admin {
        summary: MetricsSnapshot,
        /// Latest pushed snapshot, once the stream has delivered one.
        live: Option<MetricsSnapshot>,
        stream_error: Option<String>,
    },
    NotFound(String),
}

impl PageData {
    /// Number of rows the cursor can move over.
    pub fn selectable_len(&self) -> usize {
        match self {
            PageData::Home { featured, .. } => featured.len(),
            PageData::Products { page, .. } => page.content.len(),
            PageData::Product(detail) => detail.related_products.len(),
            PageData::Cart(view) => view.lines.len(),
            PageData::Account { orders, .. } => orders.content.len(),
            PageData::Admin { .. } | PageData::NotFound(_) => 0,
        }
    }

    /// The product under the cursor on pages that list products.
    pub fn selected_product(&self, selected: usize) -> Option<&Product> {
        match self {
            PageData::Home { featured, .. } => featured.get(selected),
            PageData::Products { page, .. } => page.content.get(selected),
            PageData::Product(detail) => detail.related_products.get(selected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageState {
    Loading,
    Ready(PageData),
    /// The page could not be loaded; the message is shown in place of content.
    Failed(String),
}

impl PageState {
    pub fn data(&self) -> Option<&PageData> {
        match self {
            PageState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut PageData> {
        match self {
            PageState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// TUI application state (non-overlay).
pub struct TuiState {
    pub should_quit: bool,
    pub route: Route,
    pub page: PageState,
    /// Cursor within the current page's list.
    pub selected: usize,
    /// Header badge: total quantity in the active cart.
    pub cart_count: u32,
    pub auth: AuthPhase,
    pub toasts: Toasts,
    /// Whether the catalog is served from the built-in sample data.
    pub demo: bool,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(route: Route, auth: AuthPhase, demo: bool) -> Self {
        Self {
            should_quit: false,
            route,
            page: PageState::Loading,
            selected: 0,
            cart_count: 0,
            auth,
            toasts: Toasts::default(),
            demo,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
        }
    }

    /// The listing query of the products page, if that is the current route.
    pub fn listing_query(&self) -> Option<&ListingQuery> {
        match &self.route {
            Route::Products(query) => Some(query),
            _ => None,
        }
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.page
            .data()
            .and_then(|data| data.selected_product(self.selected))
    }

    /// Keeps the cursor inside the current list after the data changed.
    pub fn clamp_selection(&mut self) {
        let len = self.page.data().map_or(0, PageData::selectable_len);
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.page.data().map_or(0, PageData::selectable_len);
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::catalog::demo;

    use super::*;

    fn home_state() -> TuiState {
        let mut tui = TuiState::new(Route::Home, AuthPhase::default(), true);
        tui.page = PageState::Ready(PageData::Home {
            categories: demo::categories(),
            featured: demo::products().into_iter().take(3).collect(),
        });
        tui
    }

    #[test]
    fn test_selection_stays_within_list() {
        let mut tui = home_state();
        tui.move_selection(1);
        tui.move_selection(5);
        assert_eq!(tui.selected, 2);
        tui.move_selection(-10);
        assert_eq!(tui.selected, 0);
    }

    #[test]
    fn test_selection_clamps_after_reload() {
        let mut tui = home_state();
        tui.selected = 2;
        tui.page = PageState::Ready(PageData::NotFound("/x".to_string()));
        tui.clamp_selection();
        assert_eq!(tui.selected, 0);
        assert!(tui.selected_product().is_none());
    }
}
