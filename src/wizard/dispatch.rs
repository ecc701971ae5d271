//! Mapping from the resolved step to the collaborator that renders it

use super::state::FlowData;
use super::step::StepId;

/// External data the host hands to step collaborators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepContext {
    /// Rendered when no step is resolved; the registry's first step
    pub first_step: StepId,
    pub policy_id: Option<String>,
    /// Decoded feed identifier
    pub feed: String,
    pub back_to: Option<String>,
    /// False once the assignee changed since the wizard started
    pub should_use_back_to: bool,
    pub is_editing: bool,
    pub data: FlowData,
}

/// Per-step props, one variant per collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepProps {
    Assignee {
        policy_id: Option<String>,
        feed: String,
    },
    BankConnection {
        policy_id: Option<String>,
        feed: String,
    },
    PlaidConnection {
        feed: String,
    },
    Card {
        policy_id: Option<String>,
        feed: String,
    },
    TransactionStartDate {
        policy_id: Option<String>,
        feed: String,
        back_to: Option<String>,
    },
    CardName {
        policy_id: Option<String>,
    },
    Confirmation {
        policy_id: Option<String>,
        back_to: Option<String>,
    },
}

/// What the host renders for one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub step: StepId,
    pub props: StepProps,
    pub is_editing: bool,
    pub data: FlowData,
}

/// Navigation requested by a step collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Nothing to do (key consumed locally)
    Stay,
    /// Record `data`, then move to `target`
    Next { target: StepId, data: FlowData },
    Back,
    Close,
    /// Re-enter an earlier step in edit mode
    Edit(StepId),
    /// Confirmation accepted
    Submit,
}

impl StepAction {
    pub fn next(target: StepId) -> Self {
        StepAction::Next {
            target,
            data: FlowData::default(),
        }
    }
}

/// Build the view for `step`. An absent step renders `ctx.first_step`.
pub fn dispatch(step: Option<StepId>, ctx: &StepContext) -> StepView {
    let step = step.unwrap_or(ctx.first_step);
    let policy_id = ctx.policy_id.clone();
    let feed = ctx.feed.clone();

    let props = match step {
        StepId::Assignee => StepProps::Assignee { policy_id, feed },
        StepId::BankConnection => StepProps::BankConnection { policy_id, feed },
        StepId::PlaidConnection => StepProps::PlaidConnection { feed },
        StepId::Card => StepProps::Card { policy_id, feed },
        StepId::TransactionStartDate => StepProps::TransactionStartDate {
            policy_id,
            feed,
            back_to: ctx.back_to.clone(),
        },
        StepId::CardName => StepProps::CardName { policy_id },
        StepId::Confirmation => StepProps::Confirmation {
            policy_id,
            back_to: ctx.back_to.clone().filter(|_| ctx.should_use_back_to),
        },
    };

    StepView {
        step,
        props,
        is_editing: ctx.is_editing,
        data: ctx.data.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> StepContext {
        StepContext {
            policy_id: Some("POL1".to_string()),
            feed: "oauth.chase.com".to_string(),
            back_to: Some("workspace/cards".to_string()),
            should_use_back_to: true,
            ..StepContext::default()
        }
    }

    #[test]
    fn test_every_step_maps_to_its_own_props() {
        let ctx = context();
        for step in StepId::all() {
            let view = dispatch(Some(*step), &ctx);
            assert_eq!(view.step, *step);
        }
        assert!(matches!(
            dispatch(Some(StepId::PlaidConnection), &ctx).props,
            StepProps::PlaidConnection { ref feed } if feed == "oauth.chase.com"
        ));
    }

    #[test]
    fn test_absent_step_renders_assignee() {
        let view = dispatch(None, &context());
        assert_eq!(view.step, StepId::Assignee);
        assert!(matches!(view.props, StepProps::Assignee { .. }));
    }

    #[test]
    fn test_absent_step_renders_registry_first_step() {
        let ctx = StepContext {
            first_step: StepId::Card,
            ..context()
        };
        let view = dispatch(None, &ctx);
        assert_eq!(view.step, StepId::Card);
        assert!(matches!(view.props, StepProps::Card { .. }));
    }

    #[test]
    fn test_confirmation_keeps_back_to_while_assignee_unchanged() {
        let view = dispatch(Some(StepId::Confirmation), &context());
        assert_eq!(
            view.props,
            StepProps::Confirmation {
                policy_id: Some("POL1".to_string()),
                back_to: Some("workspace/cards".to_string()),
            }
        );
    }

    #[test]
    fn test_confirmation_suppresses_back_to_after_assignee_change() {
        let ctx = StepContext {
            should_use_back_to: false,
            ..context()
        };
        let view = dispatch(Some(StepId::Confirmation), &ctx);
        assert!(matches!(
            view.props,
            StepProps::Confirmation { back_to: None, .. }
        ));

        // Only confirmation is affected
        let start_date = dispatch(Some(StepId::TransactionStartDate), &ctx);
        assert!(matches!(
            start_date.props,
            StepProps::TransactionStartDate { back_to: Some(_), .. }
        ));
    }
}
