//! Confirmation step: review the collected details, edit any of them, or assign

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::ui::form_field::SelectList;
use crate::wizard::{FlowData, StartDateOption, StepAction, StepId, StepProps, StepView};
use crate::workspace::default_card_name;

/// Rows that re-open a step in edit mode, followed by the submit row
const EDIT_ROWS: &[(StepId, &str)] = &[
    (StepId::Assignee, "Assignee"),
    (StepId::Card, "Card"),
    (StepId::TransactionStartDate, "Start date"),
    (StepId::CardName, "Name"),
];

pub struct ConfirmationForm {
    rows: SelectList,
}

fn row_value(step: StepId, data: &FlowData) -> String {
    let missing = || "-".to_string();
    match step {
        StepId::Assignee => data.email.clone().unwrap_or_else(missing),
        StepId::Card => data.card_number.clone().unwrap_or_else(missing),
        StepId::TransactionStartDate => match (data.start_date_option, &data.start_date) {
            (Some(StartDateOption::Custom), Some(date)) => date.clone(),
            (Some(StartDateOption::Custom), None) => missing(),
            _ => "From the beginning".to_string(),
        },
        StepId::CardName => data
            .card_name
            .clone()
            .or_else(|| data.email.as_deref().map(default_card_name))
            .unwrap_or_else(missing),
        _ => missing(),
    }
}

impl ConfirmationForm {
    pub fn new() -> Self {
        Self {
            // Land on "Assign card"
            rows: SelectList::new(EDIT_ROWS.len() + 1, EDIT_ROWS.len()),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> StepAction {
        if self.rows.handle_key(key) || key != KeyCode::Enter {
            return StepAction::Stay;
        }
        match self.rows.selected().and_then(|i| EDIT_ROWS.get(i)) {
            Some((step, _)) => StepAction::Edit(*step),
            None => StepAction::Submit,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, view: &StepView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(EDIT_ROWS.len() as u16 + 2),
                Constraint::Min(0),
                Constraint::Length(1), // Return destination
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new("Check the details, then assign the card.")
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );

        let mut items: Vec<ListItem> = EDIT_ROWS
            .iter()
            .map(|(step, label)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
                    Span::raw(row_value(*step, &view.data)),
                ]))
            })
            .collect();
        items.push(ListItem::new(Line::from(Span::styled(
            "Assign card",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))));

        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut self.rows.state);

        if let StepProps::Confirmation {
            back_to: Some(back_to),
            ..
        } = &view.props
        {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Returns to {back_to} when done"),
                    Style::default().fg(Color::DarkGray),
                )),
                chunks[3],
            );
        }
    }
}

impl Default for ConfirmationForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_on_last_row_submits() {
        let mut form = ConfirmationForm::new();
        assert_eq!(form.handle_key(KeyCode::Enter), StepAction::Submit);
    }

    #[test]
    fn test_rows_reopen_steps_for_editing() {
        let mut form = ConfirmationForm::new();
        // Wraps from "Assign card" to the first row
        form.handle_key(KeyCode::Down);
        assert_eq!(form.handle_key(KeyCode::Enter), StepAction::Edit(StepId::Assignee));
        form.handle_key(KeyCode::Down);
        form.handle_key(KeyCode::Down);
        assert_eq!(
            form.handle_key(KeyCode::Enter),
            StepAction::Edit(StepId::TransactionStartDate)
        );
    }

    #[test]
    fn test_row_values() {
        let data = FlowData {
            email: Some("alex@acme.example".to_string()),
            start_date_option: Some(StartDateOption::Custom),
            start_date: Some("2026-03-01".to_string()),
            ..FlowData::default()
        };
        assert_eq!(row_value(StepId::Card, &data), "-");
        assert_eq!(row_value(StepId::TransactionStartDate, &data), "2026-03-01");
        assert_eq!(row_value(StepId::CardName, &data), "alex's card");
    }
}
