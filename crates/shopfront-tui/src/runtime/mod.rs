//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! Handlers send their result events to `inbox_tx`; the runtime drains
//! `inbox_rx` each frame.

mod handlers;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use shopfront_core::Services;
use shopfront_core::config::CatalogSource;
use shopfront_core::route::Route;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while requests are in flight (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Poll duration when idle. Also bounds how late a toast expires.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    services: Services,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    /// The admin metrics stream, aborted when leaving the admin page.
    metrics_task: Option<JoinHandle<()>>,
    /// Forwards session status changes into the inbox.
    session_task: Option<JoinHandle<()>>,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(services: Services, route: Route) -> Result<Self> {
        // Panic hook BEFORE entering alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let demo = services.catalog.source() == CatalogSource::Demo;
        let state = AppState::new(route, services.auth.phase(), demo);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state,
            services,
            inbox_tx,
            inbox_rx,
            metrics_task: None,
            session_task: None,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if reading input or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let status = self.services.api.subscribe();
        self.session_task = Some(tokio::spawn(handlers::forward_session_status(
            status,
            self.inbox_tx.clone(),
        )));

        let effects = update::init(&mut self.state);
        self.execute_effects(effects);

        let result = self.event_loop();
        self.stop_background_tasks();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let events = self.collect_events()?;
            if !events.is_empty() {
                dirty = true;
            }

            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from the inbox and the terminal, plus a Tick when due.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.state.tui.tasks.is_any_running() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick only when there is nothing to process.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and sends its result event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce(Services) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let services = self.services.clone();
        tokio::spawn(async move {
            let _ = tx.send(f(services).await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }

            UiEffect::LoadPage { task, route } => {
                self.spawn_effect(move |s| handlers::load_page(s, task, route));
            }

            UiEffect::AddToCart {
                task,
                product_id,
                quantity,
                name,
            } => {
                self.spawn_effect(move |s| {
                    handlers::add_to_cart(s, task, product_id, quantity, name)
                });
            }
            UiEffect::UpdateCartItem {
                task,
                item_id,
                quantity,
            } => {
                self.spawn_effect(move |s| handlers::update_cart_item(s, task, item_id, quantity));
            }
            UiEffect::RemoveCartItem { task, item_id } => {
                self.spawn_effect(move |s| handlers::remove_cart_item(s, task, item_id));
            }
            UiEffect::RefreshCartCount => {
                self.spawn_effect(handlers::refresh_cart_count);
            }

            UiEffect::Login {
                task,
                email,
                password,
            } => {
                self.spawn_effect(move |s| handlers::login(s, task, email, password));
            }
            UiEffect::Register {
                task,
                email,
                password,
                full_name,
            } => {
                self.spawn_effect(move |s| {
                    handlers::register(s, task, email, password, full_name)
                });
            }
            UiEffect::Logout { task } => {
                self.spawn_effect(move |s| handlers::logout(s, task));
            }

            UiEffect::Checkout { task } => {
                self.spawn_effect(move |s| handlers::checkout(s, task));
            }

            UiEffect::StartMetrics { task } => {
                self.stop_metrics();
                let api = Arc::clone(&self.services.api);
                let tx = self.inbox_tx.clone();
                self.metrics_task = Some(tokio::spawn(async move {
                    let ended = handlers::metrics_stream(api, task, tx.clone()).await;
                    let _ = tx.send(ended);
                }));
            }
            UiEffect::StopMetrics => self.stop_metrics(),
        }
    }

    fn stop_metrics(&mut self) {
        if let Some(handle) = self.metrics_task.take() {
            handle.abort();
        }
    }

    fn stop_background_tasks(&mut self) {
        self.stop_metrics();
        if let Some(handle) = self.session_task.take() {
            handle.abort();
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.stop_background_tasks();
        let _ = terminal::restore_terminal();
    }
}
