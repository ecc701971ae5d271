//! Bank and Plaid connection steps

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::wizard::{FlowData, StepAction, StepId, StepProps, StepView};
use crate::workspace::Workspace;

/// Which connection flow the step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Bank,
    Plaid,
}

pub struct ConnectionForm {
    kind: ConnectionKind,
    /// Set once the user confirmed the connection prompt
    connecting: bool,
}

impl ConnectionForm {
    pub fn new(kind: ConnectionKind) -> Self {
        Self {
            kind,
            connecting: false,
        }
    }

    fn bank_name(view: &StepView, workspace: &Workspace) -> String {
        let feed = match &view.props {
            StepProps::BankConnection { feed, .. } | StepProps::PlaidConnection { feed } => {
                feed.as_str()
            }
            _ => "",
        };
        workspace
            .feed(feed)
            .map_or_else(|| feed.to_string(), |f| f.bank.clone())
    }

    /// First Enter starts the connection, second Enter finishes it
    pub fn handle_key(&mut self, key: KeyCode, view: &StepView, workspace: &Workspace) -> StepAction {
        if key != KeyCode::Enter {
            return StepAction::Stay;
        }
        if !self.connecting {
            self.connecting = true;
            tracing::debug!(kind = ?self.kind, "Connection started");
            return StepAction::Stay;
        }
        let target = if view.is_editing {
            StepId::Confirmation
        } else {
            StepId::Card
        };
        StepAction::Next {
            target,
            data: FlowData {
                bank_name: Some(Self::bank_name(view, workspace)),
                ..FlowData::default()
            },
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, view: &StepView, workspace: &Workspace) {
        let bank = Self::bank_name(view, workspace);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Explanation
                Constraint::Length(2), // Status
                Constraint::Min(0),
            ])
            .split(area);

        let explanation = match self.kind {
            ConnectionKind::Bank => format!(
                "The {bank} feed needs a fresh connection before its cards can be assigned. \
                 You'll be sent to {bank} to sign in."
            ),
            ConnectionKind::Plaid => format!(
                "{bank} is connected through Plaid. Reconnect with Plaid Link to refresh \
                 the card list."
            ),
        };
        frame.render_widget(
            Paragraph::new(explanation).wrap(Wrap { trim: true }),
            chunks[0],
        );

        let status = if self.connecting {
            Line::from(vec![
                Span::styled("Connected", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::raw(" - press Enter to continue"),
            ])
        } else {
            Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::Yellow)),
                Span::raw(format!(" connect to {bank}")),
            ])
        };
        frame.render_widget(
            Paragraph::new(status).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{dispatch, StepContext};

    #[test]
    fn test_connect_then_continue_to_card() {
        let workspace = Workspace::demo();
        let view = dispatch(
            Some(StepId::BankConnection),
            &StepContext {
                feed: "oauth.chase.com".to_string(),
                ..StepContext::default()
            },
        );
        let mut form = ConnectionForm::new(ConnectionKind::Bank);

        assert_eq!(form.handle_key(KeyCode::Enter, &view, &workspace), StepAction::Stay);
        let action = form.handle_key(KeyCode::Enter, &view, &workspace);
        assert_eq!(
            action,
            StepAction::Next {
                target: StepId::Card,
                data: FlowData {
                    bank_name: Some("Chase".to_string()),
                    ..FlowData::default()
                },
            }
        );
    }

    #[test]
    fn test_other_keys_do_nothing() {
        let workspace = Workspace::demo();
        let view = dispatch(Some(StepId::PlaidConnection), &StepContext::default());
        let mut form = ConnectionForm::new(ConnectionKind::Plaid);
        assert_eq!(
            form.handle_key(KeyCode::Char('x'), &view, &workspace),
            StepAction::Stay
        );
    }
}
