//! Route parameters: the shareable location descriptor of the wizard screen

use std::borrow::Cow;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::WizardError;
use super::step::StepId;

/// Parameters of the assign-card route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    /// Card feed identifier, still URI-encoded
    pub feed: String,
    /// Where to return once the card is assigned
    pub back_to: Option<String>,
    pub step: Option<StepId>,
}

impl RouteParams {
    pub fn new(feed: &str) -> Self {
        Self {
            feed: urlencoding::encode(feed).into_owned(),
            ..Self::default()
        }
    }

    /// Parse a query string such as `feed=oauth.chase.com&step=CARD`.
    ///
    /// A leading `?` is ignored, unknown keys are dropped and an unknown
    /// `step` value is treated as absent.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "feed" => params.feed = value.to_string(),
                "backTo" => {
                    let decoded = decode_lossy(value);
                    if !decoded.is_empty() {
                        params.back_to = Some(decoded.into_owned());
                    }
                }
                "step" => params.step = StepId::parse(&decode_lossy(value)),
                _ => {}
            }
        }
        params
    }

    /// Render back into a query string (no leading `?`)
    pub fn to_query(&self) -> String {
        let mut parts = vec![format!("feed={}", self.feed)];
        if let Some(back_to) = &self.back_to {
            parts.push(format!("backTo={}", urlencoding::encode(back_to)));
        }
        if let Some(step) = self.step {
            parts.push(format!("step={step}"));
        }
        parts.join("&")
    }

    /// The feed identifier with percent-encoding removed
    pub fn decoded_feed(&self) -> Result<String, WizardError> {
        urlencoding::decode(&self.feed)
            .map(Cow::into_owned)
            .map_err(|_| WizardError::InvalidFeed(self.feed.clone()))
    }
}

fn decode_lossy(value: &str) -> Cow<'_, str> {
    urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
}

/// Host-owned store of the current route params.
///
/// The controller only reads and rewrites the `step` field.
pub trait RouteParamStore: Send + Sync {
    fn params(&self) -> RouteParams;

    fn read_step(&self) -> Option<StepId> {
        self.params().step
    }

    fn write_step(&self, step: StepId);
}

/// In-process route store used by the terminal host and tests
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    params: Mutex<RouteParams>,
    writes: Mutex<Vec<StepId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRouteStore {
    pub fn new(params: RouteParams) -> Self {
        Self {
            params: Mutex::new(params),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Location as it would appear in a shared link
    pub fn location(&self) -> String {
        format!("assign-card?{}", lock(&self.params).to_query())
    }

    /// Every step written so far, oldest first
    pub fn writes(&self) -> Vec<StepId> {
        lock(&self.writes).clone()
    }

    /// Simulate the user editing the location (deep link, history navigation)
    pub fn replace(&self, params: RouteParams) {
        *lock(&self.params) = params;
    }
}

impl RouteParamStore for MemoryRouteStore {
    fn params(&self) -> RouteParams {
        lock(&self.params).clone()
    }

    fn write_step(&self, step: StepId) {
        lock(&self.params).step = Some(step);
        lock(&self.writes).push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_reads_all_fields() {
        let params = RouteParams::from_query(
            "?feed=oauth.chase.com%231234&backTo=workspace%2Fcards&step=CARD_NAME",
        );
        assert_eq!(params.feed, "oauth.chase.com%231234");
        assert_eq!(params.back_to.as_deref(), Some("workspace/cards"));
        assert_eq!(params.step, Some(StepId::CardName));
        assert_eq!(params.decoded_feed().unwrap(), "oauth.chase.com#1234");
    }

    #[test]
    fn test_from_query_drops_unknown_step_and_empty_back_to() {
        let params = RouteParams::from_query("feed=vcf&backTo=&step=BOGUS&other=1");
        assert_eq!(params.feed, "vcf");
        assert_eq!(params.back_to, None);
        assert_eq!(params.step, None);
    }

    #[test]
    fn test_to_query_encodes_back_to() {
        let params = RouteParams {
            feed: "vcf".to_string(),
            back_to: Some("settings/cards?x=1".to_string()),
            step: Some(StepId::Card),
        };
        assert_eq!(
            params.to_query(),
            "feed=vcf&backTo=settings%2Fcards%3Fx%3D1&step=CARD"
        );
        assert_eq!(RouteParams::from_query(&params.to_query()), params);
    }

    #[test]
    fn test_decoded_feed_rejects_invalid_utf8() {
        let params = RouteParams {
            feed: "%FF%FE".to_string(),
            ..RouteParams::default()
        };
        assert!(matches!(
            params.decoded_feed(),
            Err(WizardError::InvalidFeed(_))
        ));
    }

    #[test]
    fn test_memory_store_write_step_keeps_other_params() {
        let store = MemoryRouteStore::new(RouteParams::from_query("feed=vcf&backTo=home"));
        store.write_step(StepId::Confirmation);

        let params = store.params();
        assert_eq!(params.step, Some(StepId::Confirmation));
        assert_eq!(params.back_to.as_deref(), Some("home"));
        assert_eq!(store.writes(), vec![StepId::Confirmation]);
        assert_eq!(
            store.location(),
            "assign-card?feed=vcf&backTo=home&step=CONFIRMATION"
        );
    }
}
