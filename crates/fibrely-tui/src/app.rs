//! Application core — event loop, action dispatch, dialog and toast
//! management.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use fibrely_api::{Geocoder, OltClient};
use fibrely_core::DeviceGraph;

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::dialog::AddDeviceDialog;
use crate::event::{Event, EventReader};
use crate::fetch::{spawn_address_lookup, spawn_device_create, spawn_graph_fetch};
use crate::theme;
use crate::topology::TopologyScreen;
use crate::tui::Tui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Top-level application state and event loop.
pub struct App {
    client: OltClient,
    geocoder: Geocoder,
    olt_id: String,

    topology: TopologyScreen,
    dialog: Option<AddDeviceDialog>,
    notification: Option<(Notification, Instant)>,

    /// Latest valid snapshot, shared with the dialog when one opens.
    graph: Option<Arc<DeviceGraph>>,
    /// Reverse geocoding runs once per process, not once per refetch.
    address_requested: bool,

    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(client: OltClient, geocoder: Geocoder, olt_id: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            client,
            geocoder,
            olt_id,
            topology: TopologyScreen::new(),
            dialog: None,
            notification: None,
            graph: None,
            address_requested: false,
            running: true,
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.topology.init(self.action_tx.clone())?;

        spawn_graph_fetch(
            self.client.clone(),
            self.olt_id.clone(),
            self.action_tx.clone(),
        );

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(olt = %self.olt_id, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions.
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. The dialog captures all input while
    /// open; global keys apply only outside it.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if let Some(dialog) = &mut self.dialog {
            return dialog.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Ok(Some(Action::Quit)),
            _ => self.topology.handle_key_event(key),
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Tick => {
                if let Some((_, since)) = &self.notification {
                    if since.elapsed() > NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::Render | Action::Resize(..) => {}

            Action::GraphLoaded { graph, .. } => {
                self.graph = Some(Arc::clone(graph));
                if !self.address_requested {
                    if let Some(point) = graph.olt().location {
                        self.address_requested = true;
                        spawn_address_lookup(
                            self.geocoder.clone(),
                            point,
                            self.action_tx.clone(),
                        );
                    }
                }
                self.forward_to_topology(action)?;
            }

            Action::Refetch => {
                debug!("refetching graph snapshot");
                spawn_graph_fetch(
                    self.client.clone(),
                    self.olt_id.clone(),
                    self.action_tx.clone(),
                );
            }

            Action::OpenAddFlow(parent) => {
                if let Some(graph) = &self.graph {
                    match AddDeviceDialog::open(Arc::clone(graph), parent.clone()) {
                        Ok(dialog) => self.dialog = Some(dialog),
                        Err(reason) => self.notify(Notification::warning(reason)),
                    }
                }
            }

            Action::CloseDialog => {
                self.dialog = None;
            }

            Action::SubmitCreate(req) => {
                spawn_device_create(
                    self.client.clone(),
                    self.olt_id.clone(),
                    req.clone(),
                    self.action_tx.clone(),
                );
            }

            Action::CreateSucceeded { id } => {
                self.dialog = None;
                self.notify(Notification::success(format!("Device {id} created")));
                self.action_tx.send(Action::Refetch)?;
            }

            Action::CreateFailed(message) => {
                if let Some(dialog) = &mut self.dialog {
                    dialog.submit_failed(message);
                }
                self.notify(Notification::error(format!("Create failed: {message}")));
            }

            Action::Notify(notification) => {
                self.notify(notification.clone());
            }

            other => self.forward_to_topology(other)?,
        }

        Ok(())
    }

    fn forward_to_topology(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.topology.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        self.topology.render(frame, area);

        if let Some(dialog) = &self.dialog {
            dialog.render(frame, area);
        }

        if let Some((notification, _)) = &self.notification {
            Self::render_toast(frame, area, notification);
        }
    }

    /// One-line toast pinned above the hints bar.
    fn render_toast(frame: &mut Frame, area: Rect, notification: &Notification) {
        let (icon, color) = match notification.level {
            NotificationLevel::Success => ("✓", theme::SIGNAL_GREEN),
            NotificationLevel::Warning => ("⚠", theme::SPLICE_AMBER),
            NotificationLevel::Error => ("✗", theme::LASER_RED),
        };

        let text = format!(" {icon} {} ", notification.message);
        let width = (text.chars().count() as u16).min(area.width.saturating_sub(2));
        let toast_area = Rect {
            x: area.width.saturating_sub(width + 1),
            y: area.height.saturating_sub(2),
            width,
            height: 1,
        };

        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().fg(color).bg(theme::BG_RAISED),
            ))),
            toast_area,
        );
    }
}
