//! # Crowdfund Ledger
//!
//! Campaign accounting and reward issuance for the RNT crowdfunding protocol.
//! Two cooperating state machines live here:
//!
//! - [`RewardToken`]: the RNT balance book with a single-minter gate.
//! - [`CampaignRegistry`]: campaigns, contribution records and their
//!   lifecycle. Every contribution mints RNT to the contributor at a fixed
//!   rate of [`REWARD_RATE`] reward units per native unit.
//!
//! [`Ledger`] owns both, together with the native-currency [`NativeBank`],
//! the [`Clock`] and the [`EventLog`], and is the single entry point a host
//! drives:
//!
//! | Phase        | Entry Point(s)                                          |
//! |--------------|---------------------------------------------------------|
//! | Bootstrap    | [`Ledger::deploy`], [`Ledger::credit_native`]           |
//! | Token        | `transfer`, `transfer_ownership`, `mint`                |
//! | Campaigns    | `create_campaign`, `contribute`, `finalize_campaign`    |
//! | Queries      | `campaign`, `campaigns`, `contributions`, `balance_of`, `total_supply` |
//! | Events       | [`Ledger::drain_events`]                                |
//!
//! ## Execution model
//!
//! Every write takes `&mut Ledger` and either commits completely or returns
//! an [`Error`] with no state touched. Writes validate and stage all of their
//! effects first and only then apply them, so a failing step (an
//! unauthorized mint, an overflow, an empty wallet) leaves nothing behind.
//!
//! The core never logs. Hosts read the outcome from the returned `Result` and
//! from the drained events.

mod bank;
mod clock;
mod events;
mod ledger;
mod registry;
mod storage;
mod token;
mod types;
pub mod units;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use bank::NativeBank;
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{EventLog, LedgerEvent};
pub use ledger::Ledger;
pub use registry::CampaignRegistry;
pub use token::RewardToken;
pub use types::{
    Address, Amount, Campaign, CampaignStatus, DECIMALS, REWARD_RATE, TOKEN_NAME, TOKEN_SYMBOL,
    UNIT,
};

use thiserror::Error;

/// Every way a ledger operation can be rejected.
///
/// A rejected operation never leaves a partial effect behind.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    #[error("goal must be greater than 0")]
    InvalidGoal,

    #[error("duration must be a positive number of seconds, got {0}")]
    InvalidDuration(i64),

    #[error("amount must be greater than 0")]
    InvalidAmount,

    #[error("campaign title must not be empty")]
    EmptyTitle,

    #[error("campaign {0} does not exist")]
    UnknownCampaign(u64),

    #[error("campaign {0} has ended")]
    CampaignEnded(u64),

    #[error("campaign {0} already finalized")]
    AlreadyFinalized(u64),

    #[error("campaign {0} is still open and its goal is not reached")]
    NotFinalizable(u64),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("insufficient native funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidUnits(String),
}

pub type Result<T> = std::result::Result<T, Error>;
