//! Transaction start date step

use chrono::{NaiveDate, Utc};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::ui::form_field::{SelectList, TextInput};
use crate::wizard::{FlowData, StartDateOption, StepAction, StepId, StepProps, StepView};

const OPTIONS: &[(StartDateOption, &str)] = &[
    (StartDateOption::FromBeginning, "From the beginning"),
    (StartDateOption::Custom, "Custom start date"),
];

pub struct StartDateForm {
    options: SelectList,
    date: TextInput,
    error: Option<String>,
}

/// Parse a YYYY-MM-DD date that is not in the future
pub fn validate_start_date(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| "Enter a date as YYYY-MM-DD".to_string())?;
    if date > today {
        return Err("Start date can't be in the future".to_string());
    }
    Ok(date)
}

impl StartDateForm {
    pub fn new(view: &StepView) -> Self {
        let selected = match view.data.start_date_option {
            Some(StartDateOption::Custom) => 1,
            _ => 0,
        };
        Self {
            options: SelectList::new(OPTIONS.len(), selected),
            date: TextInput::new(
                view.data.start_date.as_deref().unwrap_or_default(),
                "YYYY-MM-DD",
                Some(10),
            ),
            error: None,
        }
    }

    fn selected_option(&self) -> StartDateOption {
        self.options
            .selected()
            .and_then(|i| OPTIONS.get(i))
            .map_or(StartDateOption::FromBeginning, |(option, _)| *option)
    }

    pub fn handle_key(&mut self, key: KeyCode, view: &StepView) -> StepAction {
        self.handle_key_on(key, view, Utc::now().date_naive())
    }

    fn handle_key_on(&mut self, key: KeyCode, view: &StepView, today: NaiveDate) -> StepAction {
        if matches!(key, KeyCode::Up | KeyCode::Down) {
            self.options.handle_key(key);
            return StepAction::Stay;
        }
        let option = self.selected_option();
        if key != KeyCode::Enter {
            if option == StartDateOption::Custom {
                self.date.handle_key(key);
                self.error = None;
            }
            return StepAction::Stay;
        }

        let start_date = match option {
            StartDateOption::FromBeginning => None,
            StartDateOption::Custom => match validate_start_date(self.date.value(), today) {
                Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
                Err(message) => {
                    self.error = Some(message);
                    return StepAction::Stay;
                }
            },
        };

        let target = if view.is_editing {
            StepId::Confirmation
        } else {
            StepId::CardName
        };
        StepAction::Next {
            target,
            data: FlowData {
                start_date_option: Some(option),
                start_date,
                ..FlowData::default()
            },
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, view: &StepView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Instructions
                Constraint::Length(3), // Options
                Constraint::Length(3), // Date input
                Constraint::Length(1), // Error
                Constraint::Min(0),
                Constraint::Length(1), // Return hint
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new("Import transactions from which date?")
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );

        let items: Vec<ListItem> = OPTIONS
            .iter()
            .map(|(_, label)| ListItem::new(Line::from(*label)))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut self.options.state);

        let custom = self.selected_option() == StartDateOption::Custom;
        if custom {
            self.date.render(frame, chunks[2], "Start date", true);
        }
        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
                chunks[3],
            );
        }
        if let StepProps::TransactionStartDate {
            back_to: Some(back_to),
            ..
        } = &view.props
        {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Opened from {back_to}"),
                    Style::default().fg(Color::DarkGray),
                )),
                chunks[5],
            );
        }
    }
}
