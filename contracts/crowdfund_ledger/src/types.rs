//! # Types
//!
//! Shared data structures used across the ledger.
//!
//! ## Config / State split
//!
//! A [`Campaign`] is stored internally as two records:
//!
//! - [`CampaignConfig`]: written once by `create_campaign`; never mutated.
//! - [`CampaignState`]: rewritten by every contribution and by finalization.
//!
//! The public API returns the reconstructed [`Campaign`].
//!
//! ## Status as a Finite-State Machine
//!
//! [`CampaignStatus`] is derived from the stored record and the current time:
//!
//! ```text
//! Open ──► Finalizable ──► Finalized
//!   └──────────────────────►┘   (goal reached before the deadline)
//! ```
//!
//! `Open` becomes `Finalizable` when the deadline passes **or** the goal is
//! reached. `Finalized` is terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Token and native amounts in minimal indivisible units.
///
/// All arithmetic on amounts is checked; an overflow rejects the operation.
pub type Amount = u128;

/// Decimal places of both the reward token and the native currency.
pub const DECIMALS: u8 = 18;

/// One whole token (or one whole native unit) in minimal units.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Reward units minted per native unit contributed.
pub const REWARD_RATE: Amount = 100;

pub const TOKEN_NAME: &str = "RNT Token";
pub const TOKEN_SYMBOL: &str = "RNT";

/// A 20-byte account identity.
///
/// Rendered and parsed as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The void identity used as the sender of minted tokens.
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// An address with every byte set to `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of a campaign at a given instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Accepting contributions; cannot be finalized yet.
    Open,
    /// Deadline passed or goal reached; awaiting `finalize_campaign`.
    Finalizable,
    /// Funds paid out to the creator.
    Finalized,
}

/// Immutable campaign configuration, written once at creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignConfig {
    pub id: u64,
    pub title: String,
    pub goal: Amount,
    pub deadline: u64,
    pub creator: Address,
}

/// Mutable campaign state, updated on contributions and finalization.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CampaignState {
    pub total_raised: Amount,
    pub finalized: bool,
}

/// Full representation of a funding campaign.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Campaign {
    /// Sequential identifier, starting at 1.
    pub id: u64,
    pub title: String,
    /// Funding target in native minimal units.
    pub goal: Amount,
    /// Unix timestamp (seconds) at which contributions stop.
    pub deadline: u64,
    /// Account that created the campaign and receives the payout.
    pub creator: Address,
    /// Sum of all contributions received so far.
    pub total_raised: Amount,
    pub finalized: bool,
}

impl Campaign {
    pub(crate) fn from_parts(config: &CampaignConfig, state: &CampaignState) -> Self {
        Self {
            id: config.id,
            title: config.title.clone(),
            goal: config.goal,
            deadline: config.deadline,
            creator: config.creator,
            total_raised: state.total_raised,
            finalized: state.finalized,
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.total_raised >= self.goal
    }

    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.deadline
    }

    pub fn status(&self, now: u64) -> CampaignStatus {
        if self.finalized {
            CampaignStatus::Finalized
        } else if self.has_ended(now) || self.goal_reached() {
            CampaignStatus::Finalizable
        } else {
            CampaignStatus::Open
        }
    }
}
