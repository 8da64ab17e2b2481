//! Topology screen — the OLT device tree with port accounting.

use std::cell::Cell;
use std::collections::HashSet;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use fibrely_core::{
    ConsistencyReport, DeviceGraph, DeviceKind, NodeKey, Olt, PortSummary, PowerState, TreeRow,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;

// ── Screen state ─────────────────────────────────────────────────────

enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

pub struct TopologyScreen {
    load: LoadState,
    graph: Option<Arc<DeviceGraph>>,
    report: Option<Arc<ConsistencyReport>>,
    /// Expanded node keys — client-local, discarded with the screen.
    expanded: HashSet<NodeKey>,
    /// Flat visible rows in render order (pre-order DFS).
    rows: Vec<TreeRow>,
    selected: usize,
    scroll_offset: usize,
    /// Height of the tree pane as of the last render; the visibility
    /// clamp in key handling reads it back.
    tree_height: Cell<u16>,
    /// Reverse-geocoded OLT address; placeholder until resolution.
    address: Option<String>,
}

impl TopologyScreen {
    pub fn new() -> Self {
        Self {
            load: LoadState::Loading,
            graph: None,
            report: None,
            expanded: HashSet::new(),
            rows: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            tree_height: Cell::new(0),
            address: None,
        }
    }

    /// Selected row's node key, if any.
    pub fn selected_key(&self) -> Option<&NodeKey> {
        self.rows.get(self.selected).map(|r| &r.key)
    }

    /// Install a freshly fetched snapshot. Expansion state survives a
    /// refetch for keys that still exist.
    fn set_graph(&mut self, graph: Arc<DeviceGraph>, report: Arc<ConsistencyReport>) {
        let root = graph.root_key();
        self.expanded
            .retain(|key| *key == root || graph.node(key).is_some());
        self.graph = Some(graph);
        self.report = Some(report);
        self.load = LoadState::Ready;
        self.rebuild_rows();
    }

    /// Re-flatten the tree after any expansion or data change.
    fn rebuild_rows(&mut self) {
        let Some(ref graph) = self.graph else {
            self.rows.clear();
            return;
        };
        match graph.flatten(&self.expanded) {
            Ok(rows) => self.rows = rows,
            Err(e) => {
                // validate() rejects cycles at load; reaching this means
                // the snapshot changed under us.
                self.load = LoadState::Failed(e.to_string());
                self.rows.clear();
                return;
            }
        }
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    fn toggle_selected(&mut self) {
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        if !row.has_children {
            return;
        }
        let key = row.key.clone();
        if !self.expanded.remove(&key) {
            self.expanded.insert(key);
        }
        self.rebuild_rows();
    }

    fn set_expanded(&mut self, on: bool) {
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        if !row.has_children {
            return;
        }
        let key = row.key.clone();
        let changed = if on {
            self.expanded.insert(key)
        } else {
            self.expanded.remove(&key)
        };
        if changed {
            self.rebuild_rows();
        }
    }

    /// Adjust `scroll_offset` so the selected row is inside the tree
    /// pane measured during the last render.
    fn ensure_visible(&mut self) {
        let viewport = usize::from(self.tree_height.get()).max(1);
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected + 1 > self.scroll_offset + viewport {
            self.scroll_offset = (self.selected + 1).saturating_sub(viewport);
        }
    }

    /// Action for the `a` key: open the add flow, or explain why not.
    fn add_action(&self) -> Option<Action> {
        let row = self.rows.get(self.selected)?;
        let graph = self.graph.as_ref()?;
        let key = &row.key;

        if key.kind.allowed_children().is_empty() {
            return Some(Action::Notify(Notification::warning(format!(
                "{} is terminal — it connects only to end users",
                key.kind
            ))));
        }
        let ports = graph.ports_of(key)?;
        if !ports.has_free_port() {
            return Some(Action::Notify(Notification::warning(format!(
                "No available ports on {} ({} in use)",
                key.id,
                ports.usage_label()
            ))));
        }
        Some(Action::OpenAddFlow(key.clone()))
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect, olt: &Olt) {
        let block = Block::default()
            .title(format!(" {} ", olt.display_name()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status = olt.status;
        let power_label = match olt.power {
            PowerState::On => "Power on",
            PowerState::Off => "Power off",
            PowerState::Unknown => "Power ?",
        };
        let ports = olt.ports();

        let dash = || Span::styled("—", theme::value());
        let lines = vec![
            Line::from(vec![
                Span::styled(" Status ", theme::label()),
                Span::styled(
                    status.label(),
                    Style::default().fg(theme::status_color(status)),
                ),
                Span::styled("  ", theme::label()),
                Span::styled(power_label, theme::value()),
                Span::styled("   Ports ", theme::label()),
                Span::styled(ports.usage_label(), theme::value()),
            ]),
            Line::from(vec![
                Span::styled(" IP     ", theme::label()),
                olt.ip
                    .map_or_else(dash, |ip| Span::styled(ip.to_string(), theme::value())),
                Span::styled("   MAC ", theme::label()),
                olt.mac
                    .as_deref()
                    .map_or_else(dash, |m| Span::styled(m.to_owned(), theme::value())),
                Span::styled("   Serial ", theme::label()),
                olt.serial
                    .as_deref()
                    .map_or_else(dash, |s| Span::styled(s.to_owned(), theme::value())),
            ]),
            Line::from(vec![
                Span::styled(" Addr   ", theme::label()),
                Span::styled(
                    self.address.as_deref().unwrap_or("Resolving address…"),
                    Style::default().fg(theme::SOFT_WHITE),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Owner  ", theme::label()),
                olt.owned_by
                    .as_deref()
                    .map_or_else(dash, |o| Span::styled(o.to_owned(), theme::value())),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Tree guide prefix for one row: ancestor guide columns plus the
    /// connector at the row's own depth.
    fn build_prefix<'a>(guides: &[bool], depth: usize, is_last_child: bool) -> Vec<Span<'a>> {
        let guide_style = Style::default().fg(theme::GRID_GRAY);
        let mut spans = Vec::new();
        for level in 0..depth.saturating_sub(1) {
            let ch = if guides.get(level).copied().unwrap_or(false) {
                "│  "
            } else {
                "   "
            };
            spans.push(Span::styled(ch.to_owned(), guide_style));
        }
        if depth > 0 {
            let ch = if is_last_child { "└─ " } else { "├─ " };
            spans.push(Span::styled(ch.to_owned(), guide_style));
        }
        spans
    }

    fn port_spans<'a>(ports: PortSummary) -> Vec<Span<'a>> {
        let mut spans = vec![Span::styled(
            format!("  {}", ports.usage_label()),
            Style::default().fg(theme::SOFT_WHITE),
        )];
        if ports.is_over_provisioned() {
            spans.push(Span::styled(
                format!("  OVER by {}", -ports.available),
                Style::default()
                    .fg(theme::LASER_RED)
                    .add_modifier(Modifier::BOLD),
            ));
        } else if ports.has_free_port() {
            spans.push(Span::styled(
                format!("  {} free", ports.available),
                Style::default().fg(theme::SIGNAL_GREEN),
            ));
        } else {
            spans.push(Span::styled(
                "  full",
                Style::default().fg(theme::SPLICE_AMBER),
            ));
        }
        spans
    }

    fn render_tree(&self, frame: &mut Frame, area: Rect) {
        self.tree_height.set(area.height);
        let Some(ref graph) = self.graph else { return };

        let mut lines: Vec<Line<'_>> = Vec::with_capacity(self.rows.len());
        // Which depth levels still have siblings coming below us.
        let mut guides: Vec<bool> = Vec::new();

        for (row_idx, row) in self.rows.iter().enumerate() {
            let depth = usize::from(row.depth);
            let is_selected = row_idx == self.selected;

            guides.truncate(depth);
            if depth > 0 {
                guides.resize(depth, false);
                guides[depth - 1] = !row.is_last_child;
            }

            let mut spans = Self::build_prefix(&guides, depth, row.is_last_child);

            if is_selected {
                spans.push(Span::styled(
                    "▸ ",
                    Style::default()
                        .fg(theme::STRAND_VIOLET)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::raw("  "));
            }

            let expander = if row.has_children {
                if self.expanded.contains(&row.key) {
                    "▾ "
                } else {
                    "▸ "
                }
            } else {
                "· "
            };
            spans.push(Span::styled(
                expander,
                Style::default().fg(theme::GRID_GRAY),
            ));

            let kind = row.key.kind;
            spans.push(Span::styled(
                format!("{} ", theme::kind_icon(kind)),
                Style::default().fg(theme::kind_color(kind)),
            ));

            let name = if kind == DeviceKind::Olt {
                graph.olt().display_name().to_owned()
            } else {
                graph
                    .node(&row.key)
                    .map_or_else(|| row.key.id.to_string(), |n| n.display_name().to_owned())
            };
            spans.push(Span::styled(
                name,
                Style::default()
                    .fg(theme::kind_color(kind))
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
            ));
            spans.push(Span::styled(
                format!(" [{}]", row.key.id),
                Style::default().fg(theme::GRID_GRAY),
            ));
            spans.push(Span::styled(
                format!(" {}", kind.label()),
                Style::default().fg(theme::GRID_GRAY),
            ));

            if let Some(ports) = graph.ports_of(&row.key) {
                spans.extend(Self::port_spans(ports));
                if !graph.addable_kinds(&row.key).is_empty() {
                    spans.push(Span::styled(
                        "  [+]",
                        Style::default().fg(theme::SIGNAL_GREEN),
                    ));
                }
            }

            lines.push(Line::from(spans));
        }

        let viewport = usize::from(area.height);
        let scroll = self
            .scroll_offset
            .min(lines.len().saturating_sub(viewport));
        let visible: Vec<Line<'_>> = lines.into_iter().skip(scroll).take(viewport).collect();
        frame.render_widget(Paragraph::new(visible), area);
    }

    #[allow(clippy::too_many_lines)]
    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(ref graph) = self.graph else { return };
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };

        let title = if row.key.kind == DeviceKind::Olt {
            format!(" {} ", graph.olt().display_name())
        } else {
            graph
                .node(&row.key)
                .map_or_else(String::new, |n| format!(" {} ", n.display_name()))
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height < 2 || inner.width < 10 {
            return;
        }

        let mut lines: Vec<Line<'_>> = Vec::new();
        let kind = row.key.kind;

        lines.push(Line::from(vec![
            Span::styled(" Kind     ", theme::label()),
            Span::styled(
                kind.label(),
                Style::default().fg(theme::kind_color(kind)),
            ),
            Span::styled("  Id ", theme::label()),
            Span::styled(row.key.id.to_string(), theme::value()),
        ]));

        let (capacity, location, attachments, input) = if kind == DeviceKind::Olt {
            (graph.olt().capacity.display(), graph.olt().location, 0, None)
        } else if let Some(node) = graph.node(&row.key) {
            (
                node.capacity.display(),
                node.location,
                node.attachments.len(),
                node.input.as_ref(),
            )
        } else {
            return;
        };

        lines.push(Line::from(vec![
            Span::styled(" Capacity ", theme::label()),
            Span::styled(capacity, theme::value()),
        ]));

        if let Some(ports) = graph.ports_of(&row.key) {
            let mut spans = vec![
                Span::styled(" Ports    ", theme::label()),
                Span::styled(ports.usage_label(), theme::value()),
                Span::styled("  Available ", theme::label()),
                Span::styled(
                    ports.available.to_string(),
                    Style::default().fg(if ports.is_over_provisioned() {
                        theme::LASER_RED
                    } else {
                        theme::SIGNAL_GREEN
                    }),
                ),
            ];
            if ports.is_over_provisioned() {
                spans.push(Span::styled(
                    "  over-provisioned",
                    Style::default()
                        .fg(theme::LASER_RED)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            lines.push(Line::from(spans));
        }

        if let Some(point) = location {
            lines.push(Line::from(vec![
                Span::styled(" Location ", theme::label()),
                Span::styled(
                    format!("{:.5}, {:.5}", point.latitude, point.longitude),
                    theme::value(),
                ),
            ]));
        }

        if let Some(input) = input {
            let mut text = format!("{} {}", input.kind.label(), input.id);
            if let Some(port) = input.port {
                text.push_str(&format!(" port {port}"));
            }
            lines.push(Line::from(vec![
                Span::styled(" Uplink   ", theme::label()),
                Span::styled(text, theme::value()),
            ]));
        }

        let children = graph.children_of(&row.key).len();
        lines.push(Line::from(vec![
            Span::styled(" Children ", theme::label()),
            Span::styled(children.to_string(), theme::value()),
            Span::styled("  Attachments ", theme::label()),
            Span::styled(attachments.to_string(), theme::value()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("enter ", theme::key_hint_key()),
            Span::styled("expand/collapse  ", theme::key_hint()),
            Span::styled("a ", theme::key_hint_key()),
            Span::styled("add device  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("reload  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ];

        if let Some(report) = self.report.as_ref().filter(|r| !r.is_clean()) {
            spans.push(Span::styled(
                format!("   ⚠ {} consistency warnings", report.warning_count()),
                Style::default().fg(theme::SPLICE_AMBER),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_message(frame: &mut Frame, area: Rect, message: &str, style: Style) {
        let block = Block::default()
            .title(" Topology ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let y = inner.y + inner.height / 2;
        let msg_area = Rect {
            x: inner.x + 2,
            y,
            width: inner.width.saturating_sub(4),
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(message.to_owned(), style))).centered(),
            msg_area,
        );
    }
}

impl Component for TopologyScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.rows.is_empty() {
                    self.selected = (self.selected + 1).min(self.rows.len() - 1);
                    self.ensure_visible();
                }
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                self.ensure_visible();
                Ok(None)
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.selected = 0;
                self.scroll_offset = 0;
                Ok(None)
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.rows.len().saturating_sub(1);
                self.ensure_visible();
                Ok(None)
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle_selected();
                Ok(None)
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.set_expanded(true);
                Ok(None)
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.set_expanded(false);
                Ok(None)
            }
            KeyCode::Char('a') => Ok(self.add_action()),
            KeyCode::Char('r') => Ok(Some(Action::Refetch)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::GraphLoaded { graph, report } => {
                self.set_graph(Arc::clone(graph), Arc::clone(report));
            }
            Action::GraphLoadFailed(msg) => {
                self.load = LoadState::Failed(msg.clone());
            }
            Action::AddressResolved(address) => {
                self.address = Some(address.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match self.load {
            LoadState::Loading => {
                Self::render_message(
                    frame,
                    area,
                    "Loading topology…",
                    Style::default().fg(theme::GRID_GRAY),
                );
                return;
            }
            LoadState::Failed(ref msg) => {
                Self::render_message(frame, area, msg, Style::default().fg(theme::LASER_RED));
                return;
            }
            LoadState::Ready => {}
        }
        let Some(graph) = self.graph.clone() else {
            return;
        };

        let [header_area, main_area, hints_area] = Layout::vertical([
            Constraint::Length(6),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header_area, graph.olt());

        let block = Block::default()
            .title(format!(" Topology  ·  {} devices ", graph.device_count()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let main_inner = block.inner(main_area);
        frame.render_widget(block, main_area);

        if main_inner.height < 2 || main_inner.width < 30 {
            return;
        }

        let [tree_area, detail_area] =
            Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)])
                .areas(main_inner);

        self.render_tree(frame, tree_area);
        self.render_detail(frame, detail_area);
        self.render_hints(frame, hints_area);
    }
}
