//! Events emitted by committed ledger operations.
//!
//! Events are appended to an [`EventLog`] in commit order. Hosts drain the
//! log after each write and forward the events wherever they need them.

use serde::Serialize;

use crate::types::{Address, Amount};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Token balance moved. `from` is [`Address::ZERO`] for mints.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    CampaignCreated {
        campaign_id: u64,
        title: String,
        goal: Amount,
        deadline: u64,
        creator: Address,
    },
    ContributionMade {
        campaign_id: u64,
        contributor: Address,
        amount: Amount,
    },
    /// `total_raised` paid out to `creator`.
    CampaignFinalized {
        campaign_id: u64,
        creator: Address,
        total_raised: Amount,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::CampaignCreated { .. } => "campaign_created",
            Self::ContributionMade { .. } => "contribution_made",
            Self::CampaignFinalized { .. } => "campaign_finalized",
        }
    }

    /// The campaign this event belongs to, if any.
    pub fn campaign_id(&self) -> Option<u64> {
        match self {
            Self::CampaignCreated { campaign_id, .. }
            | Self::ContributionMade { campaign_id, .. }
            | Self::CampaignFinalized { campaign_id, .. } => Some(*campaign_id),
            Self::Transfer { .. } | Self::OwnershipTransferred { .. } => None,
        }
    }

    /// The account that caused or received the effect.
    pub fn actor(&self) -> Address {
        match self {
            Self::Transfer { to, .. } => *to,
            Self::OwnershipTransferred { new, .. } => *new,
            Self::CampaignCreated { creator, .. } => *creator,
            Self::ContributionMade { contributor, .. } => *contributor,
            Self::CampaignFinalized { creator, .. } => *creator,
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match self {
            Self::Transfer { amount, .. } | Self::ContributionMade { amount, .. } => Some(*amount),
            Self::CampaignCreated { goal, .. } => Some(*goal),
            Self::CampaignFinalized { total_raised, .. } => Some(*total_raised),
            Self::OwnershipTransferred { .. } => None,
        }
    }
}

/// Pending events, oldest first.
#[derive(Debug, Default)]
pub struct EventLog {
    pending: Vec<LedgerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[LedgerEvent] {
        &self.pending
    }

    pub fn last(&self) -> Option<&LedgerEvent> {
        self.pending.last()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending)
    }
}
