//! Add-device dialog: kind selection, form entry, submission.
//!
//! The dialog is a small state machine. It validates locally against the
//! graph snapshot before emitting a submit action; nothing is sent to the
//! backend until the draft passes.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tui_input::{Input, InputRequest};

use fibrely_core::{DeviceDraft, DeviceGraph, DeviceKind, NodeKey, validate_draft};

use crate::action::Action;
use crate::theme;

const FIELD_COUNT: usize = 4;

// ── State ────────────────────────────────────────────────────────────

pub struct FormState {
    kind: DeviceKind,
    name: Input,
    capacity: Input,
    latitude: Input,
    longitude: Input,
    focus: usize,
    error: Option<String>,
}

impl FormState {
    fn new(kind: DeviceKind, parent_location: Option<(f64, f64)>) -> Self {
        let (lat, lon) = parent_location.unwrap_or((0.0, 0.0));
        Self {
            kind,
            name: Input::default(),
            capacity: Input::default(),
            latitude: Input::default().with_value(format!("{lat:.6}")),
            longitude: Input::default().with_value(format!("{lon:.6}")),
            focus: 0,
            error: None,
        }
    }

    fn focused_input(&mut self) -> &mut Input {
        match self.focus {
            0 => &mut self.name,
            1 => &mut self.capacity,
            2 => &mut self.latitude,
            _ => &mut self.longitude,
        }
    }
}

enum DialogState {
    /// Parent allows more than one child kind; pick one first.
    TypeSelect {
        options: &'static [DeviceKind],
        selected: usize,
    },
    Form(FormState),
    /// Request in flight; input is ignored until the outcome arrives.
    Submitting(FormState),
}

pub struct AddDeviceDialog {
    graph: Arc<DeviceGraph>,
    parent: NodeKey,
    state: DialogState,
}

impl AddDeviceDialog {
    /// Open the flow for `parent`. Fails with a reason when nothing can
    /// be added there (terminal kind or no free port).
    pub fn open(graph: Arc<DeviceGraph>, parent: NodeKey) -> Result<Self, String> {
        let options = graph.addable_kinds(&parent);
        if options.is_empty() {
            let reason = if parent.kind.allowed_children().is_empty() {
                format!("{} devices are terminal", parent.kind)
            } else {
                format!("no available ports on {}", parent.id)
            };
            return Err(reason);
        }

        let state = if options.len() == 1 {
            DialogState::Form(FormState::new(options[0], parent_location(&graph, &parent)))
        } else {
            DialogState::TypeSelect {
                options,
                selected: 0,
            }
        };

        Ok(Self {
            graph,
            parent,
            state,
        })
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, DialogState::Submitting(_))
    }

    /// Called when the backend rejected the creation. Returns the form
    /// to an editable state with the failure shown inline.
    pub fn submit_failed(&mut self, message: &str) {
        if let DialogState::Submitting(form) = &mut self.state {
            form.error = Some(message.to_owned());
            let form = std::mem::replace(
                &mut self.state,
                DialogState::TypeSelect {
                    options: &[],
                    selected: 0,
                },
            );
            if let DialogState::Submitting(form) = form {
                self.state = DialogState::Form(form);
            }
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match &mut self.state {
            DialogState::TypeSelect { options, selected } => match key.code {
                KeyCode::Esc => Ok(Some(Action::CloseDialog)),
                KeyCode::Char('j') | KeyCode::Down => {
                    *selected = (*selected + 1) % options.len();
                    Ok(None)
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    *selected = selected.checked_sub(1).unwrap_or(options.len() - 1);
                    Ok(None)
                }
                KeyCode::Enter => {
                    let kind = options[*selected];
                    self.state = DialogState::Form(FormState::new(
                        kind,
                        parent_location(&self.graph, &self.parent),
                    ));
                    Ok(None)
                }
                _ => Ok(None),
            },
            DialogState::Form(form) => match key.code {
                KeyCode::Esc => {
                    // Back to kind selection when there was a choice.
                    let options = self.graph.addable_kinds(&self.parent);
                    if options.len() > 1 {
                        self.state = DialogState::TypeSelect {
                            options,
                            selected: 0,
                        };
                        Ok(None)
                    } else {
                        Ok(Some(Action::CloseDialog))
                    }
                }
                KeyCode::Tab | KeyCode::Down => {
                    form.focus = (form.focus + 1) % FIELD_COUNT;
                    Ok(None)
                }
                KeyCode::BackTab | KeyCode::Up => {
                    form.focus = form.focus.checked_sub(1).unwrap_or(FIELD_COUNT - 1);
                    Ok(None)
                }
                KeyCode::Enter => Ok(self.try_submit()),
                _ => {
                    if let Some(req) = edit_request(key) {
                        form.focused_input().handle(req);
                        form.error = None;
                    }
                    Ok(None)
                }
            },
            DialogState::Submitting(_) => Ok(None),
        }
    }

    /// Validate the form and either move to `Submitting` or surface the
    /// first failure inline.
    fn try_submit(&mut self) -> Option<Action> {
        let DialogState::Form(form) = &mut self.state else {
            return None;
        };

        let latitude = match form.latitude.value().trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                form.error = Some("latitude must be a number".to_owned());
                return None;
            }
        };
        let longitude = match form.longitude.value().trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                form.error = Some("longitude must be a number".to_owned());
                return None;
            }
        };

        let draft = DeviceDraft {
            kind: form.kind,
            name: form.name.value().to_owned(),
            capacity: form.capacity.value().to_owned(),
            latitude,
            longitude,
        };

        match validate_draft(&self.graph, &self.parent, &draft) {
            Ok(req) => {
                let form = std::mem::replace(
                    &mut self.state,
                    DialogState::TypeSelect {
                        options: &[],
                        selected: 0,
                    },
                );
                if let DialogState::Form(form) = form {
                    self.state = DialogState::Submitting(form);
                }
                Some(Action::SubmitCreate(req))
            }
            Err(e) => {
                form.error = Some(e.to_string());
                None
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered(area, 52, 13);
        frame.render_widget(Clear, popup);

        match &self.state {
            DialogState::TypeSelect { options, selected } => {
                self.render_type_select(frame, popup, options, *selected);
            }
            DialogState::Form(form) => self.render_form(frame, popup, form, false),
            DialogState::Submitting(form) => self.render_form(frame, popup, form, true),
        }
    }

    fn render_type_select(
        &self,
        frame: &mut Frame,
        area: Rect,
        options: &[DeviceKind],
        selected: usize,
    ) {
        let block = Block::default()
            .title(format!(" Add device under {} ", self.parent.id))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            Line::from(Span::styled(" Device type:", theme::label())),
            Line::default(),
        ];
        for (i, kind) in options.iter().enumerate() {
            let marker = if i == selected { " ▸ " } else { "   " };
            let style = if i == selected {
                theme::row_selected()
            } else {
                Style::default().fg(theme::kind_color(*kind))
            };
            lines.push(Line::from(vec![
                Span::styled(marker.to_owned(), style),
                Span::styled(format!("{} {}", theme::kind_icon(*kind), kind.label()), style),
            ]));
        }
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(" enter ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, form: &FormState, submitting: bool) {
        let block = Block::default()
            .title(format!(
                " New {} under {} ",
                form.kind.label(),
                self.parent.id
            ))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let capacity_hint = if form.kind.capacity_is_split() {
            "split, e.g. 1x4"
        } else {
            "port count, e.g. 8"
        };
        let fields: [(&str, &Input, &str); FIELD_COUNT] = [
            ("Name     ", &form.name, ""),
            ("Capacity ", &form.capacity, capacity_hint),
            ("Latitude ", &form.latitude, ""),
            ("Longitude", &form.longitude, ""),
        ];

        let mut lines: Vec<Line<'_>> = Vec::new();
        for (i, (label, input, hint)) in fields.iter().enumerate() {
            let focused = i == form.focus && !submitting;
            let marker = if focused { "▸" } else { " " };
            let value_style = if focused {
                Style::default()
                    .fg(theme::SOFT_WHITE)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::value()
            };
            let mut spans = vec![
                Span::styled(format!(" {marker} {label} "), theme::label()),
                Span::styled(input.value().to_owned(), value_style),
            ];
            if focused {
                spans.push(Span::styled(
                    "▏",
                    Style::default().fg(theme::STRAND_VIOLET),
                ));
            }
            if input.value().is_empty() && !hint.is_empty() {
                spans.push(Span::styled(
                    format!("({hint})"),
                    Style::default().fg(theme::GRID_GRAY),
                ));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::default());
        if submitting {
            lines.push(Line::from(Span::styled(
                " Creating device…",
                Style::default().fg(theme::SPLICE_AMBER),
            )));
        } else if let Some(ref error) = form.error {
            lines.push(Line::from(Span::styled(
                format!(" ✗ {error}"),
                Style::default().fg(theme::LASER_RED),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled(" tab ", theme::key_hint_key()),
                Span::styled("next field  ", theme::key_hint()),
                Span::styled("enter ", theme::key_hint_key()),
                Span::styled("create  ", theme::key_hint()),
                Span::styled("esc ", theme::key_hint_key()),
                Span::styled("back", theme::key_hint()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Translate a key press into a text-edit request for the focused field.
fn edit_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left if ctrl => Some(InputRequest::GoToPrevWord),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right if ctrl => Some(InputRequest::GoToNextWord),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

fn parent_location(graph: &DeviceGraph, parent: &NodeKey) -> Option<(f64, f64)> {
    let point = if *parent == graph.root_key() {
        graph.olt().location
    } else {
        graph.node(parent).and_then(|n| n.location)
    }?;
    Some((point.latitude, point.longitude))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}
