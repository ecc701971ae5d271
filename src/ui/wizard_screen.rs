//! Wizard screen: frame, progress, current step form and key hints

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use super::steps::StepForm;
use crate::wizard::{StepAction, StepId, StepRegistry, StepView};
use crate::workspace::Workspace;

/// Form built for this step and edit flag
struct ActiveForm {
    step: StepId,
    is_editing: bool,
    form: StepForm,
}

pub struct WizardScreen {
    active: Option<ActiveForm>,
    /// Last error or notice, cleared on the next key
    pub status: Option<String>,
}

impl WizardScreen {
    pub fn new() -> Self {
        Self {
            active: None,
            status: None,
        }
    }

    /// Rebuild the form when the resolved step changes
    fn form_for(&mut self, view: &StepView, workspace: &Workspace) -> &mut StepForm {
        let stale = self
            .active
            .as_ref()
            .map_or(true, |a| a.step != view.step || a.is_editing != view.is_editing);
        if stale {
            tracing::debug!(step = %view.step, editing = view.is_editing, "Building step form");
        }
        let active = match self.active.take() {
            Some(active) if !stale => active,
            _ => ActiveForm {
                step: view.step,
                is_editing: view.is_editing,
                form: StepForm::for_view(view, workspace),
            },
        };
        &mut self.active.insert(active).form
    }

    /// Current step number (1-based) and total, if the step is in the registry
    pub fn progress(registry: &StepRegistry, step: StepId) -> Option<(usize, usize)> {
        registry
            .position(step)
            .map(|i| (i + 1, registry.steps().len()))
    }

    pub fn handle_key(&mut self, key: KeyCode, view: &StepView, workspace: &Workspace) -> StepAction {
        self.status = None;
        self.form_for(view, workspace).handle_key(key, view, workspace)
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        view: &StepView,
        registry: &StepRegistry,
        workspace: &Workspace,
        location: &str,
    ) {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);

        let mut title = format!(" Assign card: {} ", view.step.title());
        if view.is_editing {
            title = format!(" Assign card: {} (editing) ", view.step.title());
        }
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Progress
                Constraint::Min(6),    // Form
                Constraint::Length(1), // Status
                Constraint::Length(1), // Hints
                Constraint::Length(1), // Location
            ])
            .split(inner);

        let progress = match Self::progress(registry, view.step) {
            Some((n, total)) => format!("Step {n} of {total}"),
            None => String::new(),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(progress, Style::default().fg(Color::DarkGray))),
            chunks[0],
        );

        self.form_for(view, workspace)
            .render(frame, chunks[1], view, workspace);

        if let Some(status) = &self.status {
            frame.render_widget(
                Paragraph::new(Span::styled(status.as_str(), Style::default().fg(Color::Red))),
                chunks[2],
            );
        }

        let hints = Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" continue  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" back  "),
            Span::styled("Ctrl+C", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" close"),
        ]);
        frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), chunks[3]);

        frame.render_widget(
            Paragraph::new(Span::styled(location, Style::default().fg(Color::DarkGray))),
            chunks[4],
        );
    }
}

impl Default for WizardScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{dispatch, StepContext};

    #[test]
    fn test_progress_follows_registry() {
        let registry = StepRegistry::new([StepId::Assignee, StepId::Card, StepId::Confirmation]);
        assert_eq!(WizardScreen::progress(&registry, StepId::Card), Some((2, 3)));
        assert_eq!(WizardScreen::progress(&registry, StepId::CardName), None);
    }

    #[test]
    fn test_form_is_kept_while_step_unchanged() {
        let workspace = Workspace::demo();
        let mut screen = WizardScreen::new();
        let view = dispatch(Some(StepId::BankConnection), &StepContext::default());

        // First Enter starts connecting; only a kept form finishes on the second
        assert_eq!(screen.handle_key(KeyCode::Enter, &view, &workspace), StepAction::Stay);
        assert!(matches!(
            screen.handle_key(KeyCode::Enter, &view, &workspace),
            StepAction::Next { target: StepId::Card, .. }
        ));

        let card = dispatch(Some(StepId::Card), &StepContext::default());
        screen.handle_key(KeyCode::Down, &card, &workspace);
        assert_eq!(screen.active.as_ref().map(|a| a.step), Some(StepId::Card));
    }
}
