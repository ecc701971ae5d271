//! Step identifiers and the ordered step registry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::WizardError;

/// Steps of the card assignment wizard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepId {
    /// Pick the workspace member who receives the card
    #[default]
    Assignee,
    /// Reconnect a direct bank feed
    BankConnection,
    /// Reconnect a Plaid-backed feed
    PlaidConnection,
    /// Pick the card from the feed
    Card,
    /// Choose from when transactions are imported
    TransactionStartDate,
    /// Name the card
    CardName,
    /// Review and submit
    Confirmation,
}

impl StepId {
    /// All steps in their natural wizard order
    pub fn all() -> &'static [StepId] {
        &[
            StepId::Assignee,
            StepId::BankConnection,
            StepId::PlaidConnection,
            StepId::Card,
            StepId::TransactionStartDate,
            StepId::CardName,
            StepId::Confirmation,
        ]
    }

    /// Wire value used in route params and the persisted record
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Assignee => "ASSIGNEE",
            StepId::BankConnection => "BANK_CONNECTION",
            StepId::PlaidConnection => "PLAID_CONNECTION",
            StepId::Card => "CARD",
            StepId::TransactionStartDate => "TRANSACTION_START_DATE",
            StepId::CardName => "CARD_NAME",
            StepId::Confirmation => "CONFIRMATION",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StepId::Assignee => "Assign card",
            StepId::BankConnection => "Connect bank",
            StepId::PlaidConnection => "Connect with Plaid",
            StepId::Card => "Choose card",
            StepId::TransactionStartDate => "Transaction start date",
            StepId::CardName => "Card name",
            StepId::Confirmation => "Confirm assignment",
        }
    }

    /// Lenient parse: unknown values become `None`
    pub fn parse(value: &str) -> Option<StepId> {
        value.parse().ok()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        StepId::all()
            .iter()
            .copied()
            .find(|step| step.as_str() == normalized)
            .ok_or_else(|| WizardError::UnknownStep(s.to_string()))
    }
}

/// Ordered sequence of steps defining legal back/forward traversal.
///
/// Order matters for `previous` only. Forward moves are chosen by the step
/// collaborators and validated for membership with [`StepRegistry::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Vec<StepId>,
}

impl StepRegistry {
    /// Build a registry from an explicit order. Duplicates are dropped and an
    /// empty list falls back to the full default order.
    pub fn new(steps: impl IntoIterator<Item = StepId>) -> Self {
        let mut ordered: Vec<StepId> = Vec::new();
        for step in steps {
            if !ordered.contains(&step) {
                ordered.push(step);
            }
        }
        if ordered.is_empty() {
            return Self::default();
        }
        Self { steps: ordered }
    }

    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    /// The default step, used whenever nothing else resolves
    pub fn first(&self) -> StepId {
        self.steps[0]
    }

    pub fn contains(&self, step: StepId) -> bool {
        self.steps.contains(&step)
    }

    pub fn position(&self, step: StepId) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    /// Step before `step` in registry order, `None` at the start or when
    /// `step` is not registered
    pub fn previous(&self, step: StepId) -> Option<StepId> {
        match self.position(step) {
            Some(index) if index > 0 => Some(self.steps[index - 1]),
            _ => None,
        }
    }

    /// Validate a collaborator-chosen move from `current` to `target`
    pub fn transition(&self, current: StepId, target: StepId) -> Result<StepId, WizardError> {
        if self.contains(target) {
            Ok(target)
        } else {
            Err(WizardError::StepNotInRegistry {
                from: current,
                to: target,
            })
        }
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self {
            steps: StepId::all().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_wire_and_kebab_forms() {
        assert_eq!(StepId::parse("CARD_NAME"), Some(StepId::CardName));
        assert_eq!(StepId::parse("card-name"), Some(StepId::CardName));
        assert_eq!(StepId::parse(" confirmation "), Some(StepId::Confirmation));
        assert_eq!(StepId::parse("SOMETHING_ELSE"), None);
        assert_eq!(StepId::parse(""), None);
    }

    #[test]
    fn test_from_str_reports_unknown_value() {
        let err = "NOPE".parse::<StepId>().unwrap_err();
        assert!(matches!(err, WizardError::UnknownStep(ref v) if v == "NOPE"));
    }

    #[test]
    fn test_serde_uses_wire_values() {
        let json = serde_json::to_string(&StepId::TransactionStartDate).unwrap();
        assert_eq!(json, "\"TRANSACTION_START_DATE\"");
        let step: StepId = serde_json::from_str("\"PLAID_CONNECTION\"").unwrap();
        assert_eq!(step, StepId::PlaidConnection);
    }

    #[test]
    fn test_default_registry_starts_at_assignee() {
        let registry = StepRegistry::default();
        assert_eq!(registry.first(), StepId::Assignee);
        assert_eq!(registry.steps().len(), 7);
        assert_eq!(registry.steps().last(), Some(&StepId::Confirmation));
    }

    #[test]
    fn test_previous_follows_registry_order() {
        let registry = StepRegistry::default();
        assert_eq!(registry.previous(StepId::Assignee), None);
        assert_eq!(
            registry.previous(StepId::BankConnection),
            Some(StepId::Assignee)
        );
        assert_eq!(registry.previous(StepId::Card), Some(StepId::PlaidConnection));
        assert_eq!(
            registry.previous(StepId::Confirmation),
            Some(StepId::CardName)
        );
    }

    #[test]
    fn test_custom_registry_dedupes_and_skips_missing() {
        let registry = StepRegistry::new([
            StepId::Assignee,
            StepId::Card,
            StepId::Card,
            StepId::Confirmation,
        ]);
        assert_eq!(
            registry.steps(),
            &[StepId::Assignee, StepId::Card, StepId::Confirmation]
        );
        assert_eq!(registry.previous(StepId::BankConnection), None);
        assert_eq!(registry.previous(StepId::Confirmation), Some(StepId::Card));
    }

    #[test]
    fn test_empty_registry_falls_back_to_default() {
        assert_eq!(StepRegistry::new([]), StepRegistry::default());
    }

    #[test]
    fn test_transition_rejects_unregistered_target() {
        let registry = StepRegistry::new([StepId::Assignee, StepId::Card]);
        assert_eq!(
            registry.transition(StepId::Assignee, StepId::Card).unwrap(),
            StepId::Card
        );
        assert!(matches!(
            registry.transition(StepId::Assignee, StepId::PlaidConnection),
            Err(WizardError::StepNotInRegistry {
                from: StepId::Assignee,
                to: StepId::PlaidConnection
            })
        ));
    }
}
