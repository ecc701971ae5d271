//! Workspace data consumed by the step collaborators: policy members, card
//! feeds, and the log of submitted assignments

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::wizard::{FlowData, StartDateOption, StepId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
}

impl Policy {
    pub fn member(&self, email: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.email == email)
    }
}

/// How a feed talks to its bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedConnection {
    /// Direct OAuth connection to the bank
    Direct,
    /// Connection brokered by Plaid
    Plaid,
    /// Commercial feed, no user-side connection
    Commercial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCard {
    /// Masked card number shown to the user
    pub number: String,
    pub encrypted_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFeed {
    pub name: String,
    pub bank: String,
    pub connection: FeedConnection,
    pub cards: Vec<FeedCard>,
}

impl CardFeed {
    /// Step that follows the assignee step for this feed
    pub fn step_after_assignee(&self) -> StepId {
        match self.connection {
            FeedConnection::Direct => StepId::BankConnection,
            FeedConnection::Plaid => StepId::PlaidConnection,
            FeedConnection::Commercial => StepId::Card,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub policy: Policy,
    pub feeds: Vec<CardFeed>,
}

impl Workspace {
    /// Load from `path`, falling back to the demo workspace when absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No workspace file, using demo workspace");
            return Ok(Self::demo());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workspace file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse workspace file {}", path.display()))
    }

    pub fn feed(&self, name: &str) -> Option<&CardFeed> {
        self.feeds.iter().find(|f| f.name == name)
    }

    pub fn demo() -> Self {
        let member = |email: &str, name: &str| Member {
            email: email.to_string(),
            display_name: name.to_string(),
        };
        let card = |number: &str, encrypted: &str| FeedCard {
            number: number.to_string(),
            encrypted_number: encrypted.to_string(),
        };
        Self {
            policy: Policy {
                id: "A1B2C3D4E5F6".to_string(),
                name: "Acme Travel".to_string(),
                members: vec![
                    member("alex@acme.example", "Alex Rivera"),
                    member("sam@acme.example", "Sam Okafor"),
                    member("jo@acme.example", "Jo Lindqvist"),
                ],
            },
            feeds: vec![
                CardFeed {
                    name: "oauth.chase.com".to_string(),
                    bank: "Chase".to_string(),
                    connection: FeedConnection::Direct,
                    cards: vec![
                        card("480801XXXXXX2111", "v12:74E3CA3C4C0FA02F"),
                        card("480801XXXXXX2566", "v12:2AE4A6D2A9C4B7F1"),
                    ],
                },
                CardFeed {
                    name: "plaid.ins_19".to_string(),
                    bank: "Regions Bank".to_string(),
                    connection: FeedConnection::Plaid,
                    cards: vec![card("411111XXXXXX1111", "plaid:8C1F0E9A")],
                },
                CardFeed {
                    name: "vcf".to_string(),
                    bank: "Visa Commercial".to_string(),
                    connection: FeedConnection::Commercial,
                    cards: vec![
                        card("490901XXXXXX1234", "vcf:1234"),
                        card("490901XXXXXX5678", "vcf:5678"),
                        card("490901XXXXXX9012", "vcf:9012"),
                    ],
                },
            ],
        }
    }
}

/// A submitted card assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub policy_id: String,
    pub feed: String,
    pub email: String,
    pub card_number: String,
    pub card_name: String,
    /// `None` imports every transaction the feed has
    pub start_date: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    /// Build from the data the wizard accumulated
    pub fn from_flow(policy_id: &str, feed: &str, data: &FlowData) -> Result<Self> {
        let Some(email) = data.email.clone() else {
            bail!("No assignee selected");
        };
        let Some(card_number) = data.card_number.clone() else {
            bail!("No card selected");
        };
        let start_date = match data.start_date_option {
            Some(StartDateOption::Custom) => match &data.start_date {
                Some(date) => Some(date.clone()),
                None => bail!("Custom start date selected but no date given"),
            },
            Some(StartDateOption::FromBeginning) | None => None,
        };
        let card_name = data
            .card_name
            .clone()
            .unwrap_or_else(|| default_card_name(&email));

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            policy_id: policy_id.to_string(),
            feed: feed.to_string(),
            email,
            card_number,
            card_name,
            start_date,
            assigned_at: Utc::now(),
        })
    }
}

/// Suggested card name for an assignee
pub fn default_card_name(email: &str) -> String {
    let user = email.split('@').next().unwrap_or(email);
    format!("{user}'s card")
}

/// Append-only JSON log of assignments
pub struct AssignmentLog;

impl AssignmentLog {
    pub fn load(path: &Path) -> Result<Vec<Assignment>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path).context("Failed to read assignment log")?;
        serde_json::from_str(&contents).context("Failed to parse assignment log")
    }

    pub fn append(path: &Path, assignment: &Assignment) -> Result<()> {
        let mut assignments = Self::load(path)?;
        assignments.push(assignment.clone());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let contents = serde_json::to_string_pretty(&assignments)?;
        fs::write(path, contents).context("Failed to write assignment log")?;

        tracing::info!(
            id = %assignment.id,
            email = %assignment.email,
            card = %assignment.card_number,
            "Card assigned"
        );
        Ok(())
    }
}
