//! Pure step resolution and route/record reconciliation

use super::step::{StepId, StepRegistry};

/// Write needed to bring the route and the persisted record back in line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Already converged (or nothing to converge on)
    None,
    /// The route carries a step the record doesn't: record catches up
    WriteFlowState(StepId),
    /// Only the record knows the step: restore it into the route
    WriteRoute(StepId),
}

fn registered(step: Option<StepId>, registry: &StepRegistry) -> Option<StepId> {
    step.filter(|s| registry.contains(*s))
}

/// Route step wins over the persisted step, which wins over the first
/// registered step. Steps outside the registry count as absent.
pub fn resolve_step(
    url_step: Option<StepId>,
    persisted_step: Option<StepId>,
    registry: &StepRegistry,
) -> StepId {
    registered(url_step, registry)
        .or_else(|| registered(persisted_step, registry))
        .unwrap_or_else(|| registry.first())
}

/// Decide the single write that converges route and record.
///
/// Applying the result and calling this again with the new inputs always
/// yields [`SyncAction::None`].
pub fn sync_action(
    url_step: Option<StepId>,
    persisted_step: Option<StepId>,
    registry: &StepRegistry,
) -> SyncAction {
    let url_step = registered(url_step, registry);
    let persisted_step = registered(persisted_step, registry);
    match (url_step, persisted_step) {
        (Some(url), persisted) if persisted != Some(url) => SyncAction::WriteFlowState(url),
        (None, Some(persisted)) => SyncAction::WriteRoute(persisted),
        _ => SyncAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<Option<StepId>> {
        std::iter::once(None)
            .chain(StepId::all().iter().copied().map(Some))
            .collect()
    }

    #[test]
    fn test_url_step_takes_precedence() {
        let registry = StepRegistry::default();
        assert_eq!(
            resolve_step(Some(StepId::Card), Some(StepId::Assignee), &registry),
            StepId::Card
        );
    }

    #[test]
    fn test_precedence_over_all_combinations() {
        let registry = StepRegistry::default();
        for url in options() {
            for persisted in options() {
                let expected = url.or(persisted).unwrap_or(StepId::Assignee);
                assert_eq!(resolve_step(url, persisted, &registry), expected);
            }
        }
    }

    #[test]
    fn test_unregistered_steps_fall_back() {
        let registry = StepRegistry::new([StepId::Assignee, StepId::Card]);
        assert_eq!(
            resolve_step(Some(StepId::PlaidConnection), Some(StepId::Card), &registry),
            StepId::Card
        );
        assert_eq!(
            resolve_step(Some(StepId::PlaidConnection), None, &registry),
            StepId::Assignee
        );
    }

    #[test]
    fn test_sync_action_cases() {
        let registry = StepRegistry::default();
        assert_eq!(
            sync_action(Some(StepId::Card), Some(StepId::Assignee), &registry),
            SyncAction::WriteFlowState(StepId::Card)
        );
        assert_eq!(
            sync_action(Some(StepId::Card), None, &registry),
            SyncAction::WriteFlowState(StepId::Card)
        );
        assert_eq!(
            sync_action(None, Some(StepId::CardName), &registry),
            SyncAction::WriteRoute(StepId::CardName)
        );
        assert_eq!(sync_action(None, None, &registry), SyncAction::None);
        assert_eq!(
            sync_action(Some(StepId::Card), Some(StepId::Card), &registry),
            SyncAction::None
        );
    }

    #[test]
    fn test_sync_reaches_fixed_point_in_one_write() {
        let registry = StepRegistry::default();
        for url in options() {
            for persisted in options() {
                let (mut url_now, mut persisted_now) = (url, persisted);
                match sync_action(url_now, persisted_now, &registry) {
                    SyncAction::WriteFlowState(step) => persisted_now = Some(step),
                    SyncAction::WriteRoute(step) => url_now = Some(step),
                    SyncAction::None => {}
                }
                assert_eq!(url_now, persisted_now);
                assert_eq!(
                    sync_action(url_now, persisted_now, &registry),
                    SyncAction::None
                );
                assert_eq!(
                    resolve_step(url_now, persisted_now, &registry),
                    resolve_step(url, persisted, &registry)
                );
            }
        }
    }
}
