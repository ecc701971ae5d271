//! Assignee step: pick the member who receives the card

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::ui::form_field::SelectList;
use crate::wizard::{FlowData, StepAction, StepId, StepView};
use crate::workspace::Workspace;

pub struct AssigneeForm {
    members: SelectList,
}

impl AssigneeForm {
    pub fn new(view: &StepView, workspace: &Workspace) -> Self {
        let members = &workspace.policy.members;
        let selected = view
            .data
            .email
            .as_deref()
            .and_then(|email| members.iter().position(|m| m.email == email))
            .unwrap_or(0);
        Self {
            members: SelectList::new(members.len(), selected),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, view: &StepView, workspace: &Workspace) -> StepAction {
        if self.members.handle_key(key) {
            return StepAction::Stay;
        }
        if key != KeyCode::Enter {
            return StepAction::Stay;
        }
        let Some(member) = self
            .members
            .selected()
            .and_then(|i| workspace.policy.members.get(i))
        else {
            return StepAction::Stay;
        };

        let target = if view.is_editing {
            StepId::Confirmation
        } else {
            feed_name(view)
                .and_then(|feed| workspace.feed(feed))
                .map_or(StepId::Card, |feed| feed.step_after_assignee())
        };
        StepAction::Next {
            target,
            data: FlowData {
                email: Some(member.email.clone()),
                ..FlowData::default()
            },
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, workspace: &Workspace) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Instructions
                Constraint::Min(4),    // Members
            ])
            .split(area);

        let instructions = Paragraph::new(Line::from(format!(
            "Who should receive this card? Members of {}:",
            workspace.policy.name
        )))
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(instructions, chunks[0]);

        let items: Vec<ListItem> = workspace
            .policy
            .members
            .iter()
            .map(|member| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        member.display_name.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", member.email),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut self.members.state);
    }
}

fn feed_name(view: &StepView) -> Option<&str> {
    match &view.props {
        crate::wizard::StepProps::Assignee { feed, .. } => Some(feed.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{dispatch, StepContext};

    fn view(feed: &str, is_editing: bool) -> StepView {
        dispatch(
            Some(StepId::Assignee),
            &StepContext {
                feed: feed.to_string(),
                is_editing,
                ..StepContext::default()
            },
        )
    }

    #[test]
    fn test_enter_picks_member_and_feed_successor() {
        let workspace = Workspace::demo();
        let view = view("plaid.ins_19", false);
        let mut form = AssigneeForm::new(&view, &workspace);

        form.handle_key(KeyCode::Down, &view, &workspace);
        let action = form.handle_key(KeyCode::Enter, &view, &workspace);

        assert_eq!(
            action,
            StepAction::Next {
                target: StepId::PlaidConnection,
                data: FlowData {
                    email: Some("sam@acme.example".to_string()),
                    ..FlowData::default()
                },
            }
        );
    }

    #[test]
    fn test_editing_returns_to_confirmation() {
        let workspace = Workspace::demo();
        let view = view("oauth.chase.com", true);
        let mut form = AssigneeForm::new(&view, &workspace);

        let action = form.handle_key(KeyCode::Enter, &view, &workspace);
        assert!(matches!(
            action,
            StepAction::Next {
                target: StepId::Confirmation,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_feed_goes_straight_to_card() {
        let workspace = Workspace::demo();
        let view = view("unknown.feed", false);
        let mut form = AssigneeForm::new(&view, &workspace);

        let action = form.handle_key(KeyCode::Enter, &view, &workspace);
        assert!(matches!(
            action,
            StepAction::Next {
                target: StepId::Card,
                ..
            }
        ));
    }
}
