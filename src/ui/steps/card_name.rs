//! Card name step

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::ui::form_field::TextInput;
use crate::wizard::{FlowData, StepAction, StepId, StepView};
use crate::workspace::default_card_name;

const MAX_CARD_NAME: usize = 50;

pub struct CardNameForm {
    name: TextInput,
}

impl CardNameForm {
    pub fn new(view: &StepView) -> Self {
        let initial = view.data.card_name.clone().unwrap_or_else(|| {
            view.data
                .email
                .as_deref()
                .map(default_card_name)
                .unwrap_or_default()
        });
        Self {
            name: TextInput::new(&initial, "Card name", Some(MAX_CARD_NAME)),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> StepAction {
        if key != KeyCode::Enter {
            self.name.handle_key(key);
            return StepAction::Stay;
        }
        let name = self.name.value().trim();
        if name.is_empty() {
            return StepAction::Stay;
        }
        StepAction::Next {
            target: StepId::Confirmation,
            data: FlowData {
                card_name: Some(name.to_string()),
                ..FlowData::default()
            },
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);
        frame.render_widget(
            Paragraph::new("Give the card a name so it's easy to recognise.")
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );
        self.name.render(frame, chunks[1], "Name", true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{dispatch, StepContext};

    fn view(data: FlowData) -> StepView {
        dispatch(
            Some(StepId::CardName),
            &StepContext {
                data,
                ..StepContext::default()
            },
        )
    }

    #[test]
    fn test_suggests_name_from_assignee() {
        let form = CardNameForm::new(&view(FlowData {
            email: Some("jo@acme.example".to_string()),
            ..FlowData::default()
        }));
        assert_eq!(form.name.value(), "jo's card");
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut form = CardNameForm::new(&view(FlowData::default()));
        form.handle_key(KeyCode::Char(' '));
        assert_eq!(form.handle_key(KeyCode::Enter), StepAction::Stay);
    }

    #[test]
    fn test_enter_trims_and_moves_to_confirmation() {
        let mut form = CardNameForm::new(&view(FlowData {
            card_name: Some(" Travel ".to_string()),
            ..FlowData::default()
        }));
        assert_eq!(
            form.handle_key(KeyCode::Enter),
            StepAction::Next {
                target: StepId::Confirmation,
                data: FlowData {
                    card_name: Some("Travel".to_string()),
                    ..FlowData::default()
                },
            }
        );
    }
}
