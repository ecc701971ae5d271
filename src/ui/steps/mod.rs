//! Step collaborators: one form per wizard step

pub mod access_denied;
mod assignee;
mod card;
mod card_name;
mod confirmation;
mod connection;
mod start_date;

pub use assignee::AssigneeForm;
pub use card::CardForm;
pub use card_name::CardNameForm;
pub use confirmation::ConfirmationForm;
pub use connection::{ConnectionForm, ConnectionKind};
pub use start_date::{validate_start_date, StartDateForm};

use crossterm::event::KeyCode;
use ratatui::{layout::Rect, Frame};

use crate::wizard::{StepAction, StepId, StepView};
use crate::workspace::Workspace;

/// The form rendering the current step
pub enum StepForm {
    Assignee(AssigneeForm),
    Connection(ConnectionForm),
    Card(CardForm),
    StartDate(StartDateForm),
    CardName(CardNameForm),
    Confirmation(ConfirmationForm),
}

impl StepForm {
    pub fn for_view(view: &StepView, workspace: &Workspace) -> Self {
        match view.step {
            StepId::Assignee => StepForm::Assignee(AssigneeForm::new(view, workspace)),
            StepId::BankConnection => {
                StepForm::Connection(ConnectionForm::new(ConnectionKind::Bank))
            }
            StepId::PlaidConnection => {
                StepForm::Connection(ConnectionForm::new(ConnectionKind::Plaid))
            }
            StepId::Card => StepForm::Card(CardForm::new(view, workspace)),
            StepId::TransactionStartDate => StepForm::StartDate(StartDateForm::new(view)),
            StepId::CardName => StepForm::CardName(CardNameForm::new(view)),
            StepId::Confirmation => StepForm::Confirmation(ConfirmationForm::new()),
        }
    }

    /// Shift+Tab steps back on every form; other keys go to the form
    pub fn handle_key(&mut self, key: KeyCode, view: &StepView, workspace: &Workspace) -> StepAction {
        if key == KeyCode::BackTab {
            return StepAction::Back;
        }
        match self {
            StepForm::Assignee(form) => form.handle_key(key, view, workspace),
            StepForm::Connection(form) => form.handle_key(key, view, workspace),
            StepForm::Card(form) => form.handle_key(key, view, workspace),
            StepForm::StartDate(form) => form.handle_key(key, view),
            StepForm::CardName(form) => form.handle_key(key),
            StepForm::Confirmation(form) => form.handle_key(key),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, view: &StepView, workspace: &Workspace) {
        match self {
            StepForm::Assignee(form) => form.render(frame, area, workspace),
            StepForm::Connection(form) => form.render(frame, area, view, workspace),
            StepForm::Card(form) => form.render(frame, area, view, workspace),
            StepForm::StartDate(form) => form.render(frame, area, view),
            StepForm::CardName(form) => form.render(frame, area),
            StepForm::Confirmation(form) => form.render(frame, area, view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{dispatch, StepContext};

    #[test]
    fn test_back_tab_steps_back_from_any_form() {
        let workspace = Workspace::demo();
        for step in StepId::all() {
            let view = dispatch(Some(*step), &StepContext::default());
            let mut form = StepForm::for_view(&view, &workspace);
            assert_eq!(
                form.handle_key(KeyCode::BackTab, &view, &workspace),
                StepAction::Back
            );
        }
    }
}
