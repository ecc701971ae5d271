//! Card step: pick the card from the feed

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::ui::form_field::SelectList;
use crate::wizard::{FlowData, StepAction, StepId, StepProps, StepView};
use crate::workspace::{CardFeed, Workspace};

pub struct CardForm {
    cards: SelectList,
}

fn feed<'a>(view: &StepView, workspace: &'a Workspace) -> Option<&'a CardFeed> {
    match &view.props {
        StepProps::Card { feed, .. } => workspace.feed(feed),
        _ => None,
    }
}

impl CardForm {
    pub fn new(view: &StepView, workspace: &Workspace) -> Self {
        let cards = feed(view, workspace).map_or(&[][..], |f| f.cards.as_slice());
        let selected = view
            .data
            .card_number
            .as_deref()
            .and_then(|number| cards.iter().position(|c| c.number == number))
            .unwrap_or(0);
        Self {
            cards: SelectList::new(cards.len(), selected),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, view: &StepView, workspace: &Workspace) -> StepAction {
        if self.cards.handle_key(key) || key != KeyCode::Enter {
            return StepAction::Stay;
        }
        let Some(card) = feed(view, workspace)
            .zip(self.cards.selected())
            .and_then(|(f, i)| f.cards.get(i))
        else {
            return StepAction::Stay;
        };

        let target = if view.is_editing {
            StepId::Confirmation
        } else {
            StepId::TransactionStartDate
        };
        StepAction::Next {
            target,
            data: FlowData {
                card_number: Some(card.number.clone()),
                encrypted_card_number: Some(card.encrypted_number.clone()),
                ..FlowData::default()
            },
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, view: &StepView, workspace: &Workspace) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(3)])
            .split(area);

        let Some(feed) = feed(view, workspace) else {
            frame.render_widget(
                Paragraph::new("This card feed is not available in the workspace.")
                    .style(Style::default().fg(Color::Red)),
                chunks[0],
            );
            return;
        };
        if feed.cards.is_empty() {
            frame.render_widget(
                Paragraph::new(format!("No unassigned cards in the {} feed.", feed.bank))
                    .style(Style::default().fg(Color::DarkGray)),
                chunks[0],
            );
            return;
        }

        frame.render_widget(
            Paragraph::new(Line::from(format!("Choose a {} card:", feed.bank)))
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );
        let items: Vec<ListItem> = feed
            .cards
            .iter()
            .map(|card| ListItem::new(Line::from(card.number.as_str())))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut self.cards.state);
    }
}
