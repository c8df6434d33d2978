//! Journal rows for events emitted by the crowdfund ledger.

use crowdfund_ledger::LedgerEvent;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// A committed ledger event, ready to be appended to the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub event_type: &'static str,
    pub campaign_id: Option<i64>,
    pub actor: String,
    pub amount: Option<String>,
    /// Full event payload as JSON.
    pub data: String,
    pub recorded_at: i64,
}

impl JournalEntry {
    pub fn from_event(event: &LedgerEvent, recorded_at: i64) -> Result<Self> {
        Ok(Self {
            event_type: event.name(),
            campaign_id: event.campaign_id().and_then(|id| i64::try_from(id).ok()),
            actor: event.actor().to_string(),
            amount: event.amount().map(|a| a.to_string()),
            data: serde_json::to_string(event)?,
            recorded_at,
        })
    }
}

/// An event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub campaign_id: Option<i64>,
    pub actor: String,
    pub amount: Option<String>,
    pub data: String,
    pub recorded_at: i64,
}
