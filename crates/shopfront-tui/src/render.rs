//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use shopfront_core::api::types::{
    Category, MetricsSnapshot, Order, Page, Product, ProductDetail, Profile,
};
use shopfront_core::auth::AuthPhase;
use shopfront_core::cart::CartView;
use shopfront_core::catalog::ListingQuery;
use shopfront_core::route::Route;
use unicode_width::UnicodeWidthStr;

use crate::common::{ToastKind, truncate_to_width};
use crate::components;
use crate::overlays::render_utils::{InputHint, hint_line};
use crate::state::{AppState, PageData, PageState, TuiState};

const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;
const TOAST_MAX_WIDTH: u16 = 50;

/// Spinner frames shown while a request is in flight.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
/// Ticks per spinner frame.
const SPINNER_SPEED_DIVISOR: usize = 4;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    render_header(state, frame, chunks[0]);
    render_body(state, frame, chunks[1]);
    frame.render_widget(Paragraph::new(footer_line(state)), chunks[2]);
    render_toasts(state, frame, chunks[1]);

    // Overlay last, so it appears on top.
    if let Some(overlay) = &app.overlay {
        overlay.render(frame, area);
    }
}

fn spinner(state: &TuiState) -> &'static str {
    SPINNER_FRAMES[(state.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()]
}

// ============================================================================
// Header and footer
// ============================================================================

fn nav_span(key: &str, label: String, active: bool) -> Vec<Span<'static>> {
    let style = if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    vec![
        Span::styled(format!(" {key}"), Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {label} "), style),
    ]
}

pub fn header_line(state: &TuiState) -> Line<'static> {
    let route = &state.route;
    let mut spans = vec![Span::styled(
        " Shopfront ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.extend(nav_span("h", "Home".to_string(), *route == Route::Home));
    spans.extend(nav_span(
        "p",
        "Products".to_string(),
        matches!(route, Route::Products(_) | Route::Product(_)),
    ));
    spans.extend(nav_span(
        "c",
        format!("Cart ({})", state.cart_count),
        *route == Route::Cart,
    ));
    spans.extend(nav_span("u", "Account".to_string(), *route == Route::Account));
    spans.extend(nav_span("m", "Admin".to_string(), *route == Route::Admin));
    spans.push(Span::raw("  "));

    match &state.auth {
        AuthPhase::LoggedIn { user } => {
            spans.push(Span::styled(
                user.display_name().to_string(),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::styled(" (l logout)", Style::default().fg(Color::DarkGray)));
        }
        AuthPhase::Refreshing { user } => {
            spans.push(Span::styled(
                user.display_name().to_string(),
                Style::default().fg(Color::Yellow),
            ));
        }
        AuthPhase::Authenticating => {
            spans.push(Span::styled("Logging in...", Style::default().fg(Color::Yellow)));
        }
        AuthPhase::LoggedOut { .. } => {
            spans.push(Span::styled("l", Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw(" Login"));
        }
    }

    if state.demo {
        spans.push(Span::styled("  [demo]", Style::default().fg(Color::Magenta)));
    }
    if state.tasks.is_any_running() {
        spans.push(Span::styled(
            format!("  {}", spinner(state)),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    frame.render_widget(Paragraph::new(header_line(state)), area);
}

fn footer_line(state: &TuiState) -> Line<'static> {
    let mut hints = vec![InputHint::new("j/k", "move")];
    match &state.route {
        Route::Home => hints.extend([
            InputHint::new("1-6", "category"),
            InputHint::new("Enter", "open"),
            InputHint::new("a", "add to cart"),
        ]),
        Route::Products(_) => hints.extend([
            InputHint::new("/", "search"),
            InputHint::new("s", "sort"),
            InputHint::new("[ ]", "price"),
            InputHint::new("n/N", "page"),
            InputHint::new("x", "clear"),
            InputHint::new("a", "add"),
        ]),
        Route::Product(_) => hints.extend([
            InputHint::new("a", "add to cart"),
            InputHint::new("Enter", "open related"),
        ]),
        Route::Cart => hints.extend([
            InputHint::new("+/-", "quantity"),
            InputHint::new("d", "remove"),
            InputHint::new("o", "checkout"),
        ]),
        Route::Account | Route::Admin | Route::Other(_) => {}
    }
    hints.extend([InputHint::new("r", "reload"), InputHint::new("q", "quit")]);
    hint_line(&hints, Color::Cyan)
}

// ============================================================================
// Body
// ============================================================================

/// Page content plus the line the cursor sits on, used for scrolling.
#[derive(Default)]
pub struct Body {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<usize>,
}

impl Body {
    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn extend(&mut self, lines: impl IntoIterator<Item = Line<'static>>) {
        self.lines.extend(lines);
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn mark_cursor(&mut self) {
        self.cursor = Some(self.lines.len());
    }

    /// Selectable product rows, with the selected one expanded.
    fn products(&mut self, products: &[Product], selected: usize, width: u16) {
        for (i, product) in products.iter().enumerate() {
            if i == selected {
                self.mark_cursor();
            }
            self.push(components::product_row(product, width, i == selected));
            if i == selected {
                self.push(components::product_blurb(product));
            }
        }
    }
}

fn render_body(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", state.route.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = body(state, inner.width.saturating_sub(2));
    let height = inner.height as usize;
    let offset = body
        .cursor
        .map_or(0, |line| (line + 3).saturating_sub(height));
    let paragraph = Paragraph::new(body.lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    let content = Rect::new(
        inner.x + 1,
        inner.y,
        inner.width.saturating_sub(2),
        inner.height,
    );
    frame.render_widget(paragraph, content);
}

/// Builds the body lines for the current page.
pub fn body(state: &TuiState, width: u16) -> Body {
    let mut body = Body::default();
    match &state.page {
        PageState::Loading => {
            body.blank();
            body.push(Line::from(Span::styled(
                format!("{} Loading...", spinner(state)),
                Style::default().fg(Color::Yellow),
            )));
        }
        PageState::Failed(message) => {
            body.blank();
            body.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )));
            body.push(Line::from(Span::styled(
                "Press r to retry",
                Style::default().fg(Color::DarkGray),
            )));
        }
        PageState::Ready(data) => page_body(&mut body, state, data, width),
    }
    body
}

fn page_body(body: &mut Body, state: &TuiState, data: &PageData, width: u16) {
    let selected = state.selected;
    match data {
        PageData::Home {
            categories,
            featured,
        } => {
            body.push(components::section_title("Shop by Category"));
            body.extend(
                categories
                    .iter()
                    .enumerate()
                    .map(|(i, c)| components::category_row(i, c)),
            );
            body.blank();
            body.push(components::section_title("Featured Products"));
            if featured.is_empty() {
                body.extend(components::empty_state(
                    "No featured products right now",
                    Some("Press p to browse all products"),
                ));
            } else {
                body.products(featured, selected, width);
            }
        }
        PageData::Products {
            query,
            page,
            categories,
        } => listing_body(body, query, page, categories, selected, width),
        PageData::Product(detail) => product_body(body, detail, selected, width),
        PageData::Cart(view) => cart_body(body, view, state, width),
        PageData::Account { profile, orders } => account_body(body, profile, orders, selected),
        PageData::Admin {
            summary,
            live,
            stream_error,
        } => admin_body(body, summary, live.as_ref(), stream_error.as_deref()),
        PageData::NotFound(path) => {
            body.extend(components::empty_state(
                &format!("Nothing lives at {path}"),
                Some("Press h to go home"),
            ));
        }
    }
}

fn listing_body(
    body: &mut Body,
    query: &ListingQuery,
    page: &Page<Product>,
    categories: &[Category],
    selected: usize,
    width: u16,
) {
    body.push(components::filter_bar(query, categories));
    body.blank();

    if page.content.is_empty() {
        let action = (!query.is_empty()).then_some("Press x to clear filters");
        body.extend(components::empty_state(
            "Try adjusting your search or filters",
            action,
        ));
        return;
    }

    body.products(&page.content, selected, width);
    body.blank();
    body.push(Line::from(Span::styled(
        format!(
            "Showing {} of {} products",
            page.content.len(),
            page.total_elements
        ),
        Style::default().fg(Color::DarkGray),
    )));
    if page.total_pages > 1 {
        body.push(components::pagination_line(&components::pagination(
            page.number,
            page.total_pages,
        )));
    }
}

fn product_body(body: &mut Body, detail: &ProductDetail, selected: usize, width: u16) {
    body.extend(components::product_detail(&detail.product));
    body.blank();

    body.push(components::section_title(&format!(
        "Reviews ({})",
        detail.reviews.len()
    )));
    if detail.reviews.is_empty() {
        body.push(Line::from(Span::styled(
            "No reviews yet.",
            Style::default().fg(Color::DarkGray),
        )));
        body.blank();
    }
    for review in &detail.reviews {
        body.extend(components::review(review));
    }

    if !detail.related_products.is_empty() {
        body.push(components::section_title("Related Products"));
        body.products(&detail.related_products, selected, width);
    }
}

fn cart_body(body: &mut Body, view: &CartView, state: &TuiState, width: u16) {
    if view.is_empty() {
        body.extend(components::empty_state(
            "Your cart is empty",
            Some("Press p to start shopping"),
        ));
        return;
    }

    for (i, line) in view.lines.iter().enumerate() {
        if i == state.selected {
            body.mark_cursor();
        }
        body.push(components::cart_line(line, width, i == state.selected));
    }
    body.blank();
    body.extend(components::cart_summary(&view.summary()));
    body.blank();

    if state.auth.is_logged_in() {
        body.push(Line::from(Span::styled(
            "Press o to place your order",
            Style::default().fg(Color::Cyan),
        )));
    } else {
        body.push(Line::from(Span::styled(
            "Guest cart: log in (l) to checkout. Your items move to your account.",
            Style::default().fg(Color::Yellow),
        )));
    }
}

fn account_body(body: &mut Body, profile: &Profile, orders: &Page<Order>, selected: usize) {
    body.push(components::section_title("Profile"));
    if let Some(name) = &profile.full_name {
        body.push(Line::from(format!("  Name   {name}")));
    }
    body.push(Line::from(format!("  Email  {}", profile.email)));
    body.blank();

    body.push(components::section_title(&format!(
        "Order History ({})",
        orders.total_elements
    )));
    if orders.content.is_empty() {
        body.push(Line::from(Span::styled(
            "You have not placed any orders yet.",
            Style::default().fg(Color::DarkGray),
        )));
        return;
    }
    for (i, order) in orders.content.iter().enumerate() {
        if i == selected {
            body.mark_cursor();
        }
        body.push(components::order_row(order, i == selected));
        if i == selected {
            body.extend(components::order_items(order));
        }
    }
}

fn admin_body(
    body: &mut Body,
    summary: &MetricsSnapshot,
    live: Option<&MetricsSnapshot>,
    stream_error: Option<&str>,
) {
    let status = match (live, stream_error) {
        (_, Some(error)) => Span::styled(format!("○ {error}"), Style::default().fg(Color::Red)),
        (Some(_), None) => Span::styled("● Live", Style::default().fg(Color::Green)),
        (None, None) => Span::styled("○ Connecting...", Style::default().fg(Color::Yellow)),
    };
    body.push(Line::from(vec![
        Span::styled(
            "Dashboard  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        status,
    ]));
    body.blank();

    // Live events omit `totalUsers`; keep the summary's value.
    let mut shown = live.cloned().unwrap_or_else(|| summary.clone());
    if shown.total_users.is_none() {
        shown.total_users = summary.total_users;
    }
    body.extend(components::metrics(&shown));
}

// ============================================================================
// Toasts
// ============================================================================

fn render_toasts(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut bottom = area.y + area.height;
    for toast in state.toasts.iter().collect::<Vec<_>>().into_iter().rev() {
        if bottom < area.y + 3 {
            break;
        }
        let (color, icon) = match toast.kind {
            ToastKind::Success => (Color::Green, "✓"),
            ToastKind::Error => (Color::Red, "✗"),
            ToastKind::Warning => (Color::Yellow, "!"),
        };
        let max_text = TOAST_MAX_WIDTH.min(area.width).saturating_sub(6) as usize;
        let text = truncate_to_width(&toast.message, max_text);
        let width = u16::try_from(text.width() + 6)
            .unwrap_or(TOAST_MAX_WIDTH)
            .min(area.width);

        let rect = Rect::new(area.x + area.width - width, bottom - 3, width, 3);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{icon} "), Style::default().fg(color)),
                Span::raw(text),
            ]))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            rect,
        );
        bottom -= 3;
    }
}
