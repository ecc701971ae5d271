//! Assign-card wizard core: step resolution, route/record sync, navigation

pub mod controller;
pub mod dispatch;
pub mod error;
pub mod navigation;
pub mod resolve;
pub mod route;
pub mod state;
pub mod step;
pub mod store;

pub use controller::{AccessGate, Mounted, WizardCommand, WizardController, WizardOptions, WizardStores};
pub use dispatch::{dispatch, StepAction, StepContext, StepProps, StepView};
pub use error::{StoreError, WizardError};
pub use navigation::{LeaveEvent, ListenerId, Navigator, ScreenNavigator};
pub use resolve::{resolve_step, sync_action, SyncAction};
pub use route::{MemoryRouteStore, RouteParamStore, RouteParams};
pub use state::{FlowData, FlowState, FlowStatePatch, StartDateOption};
pub use step::{StepId, StepRegistry};
pub use store::{FileFlowStore, FlowStateStore, MemoryFlowStore};
