//! # Campaign Registry
//!
//! Campaign lifecycle, contribution records and reward orchestration.
//!
//! The registry owns no token or native balances itself. Writes borrow them
//! through an [`Env`] for the duration of the call, which gives the registry
//! an exclusive handle on the token while a contribution mints.
//!
//! Every write stages its effects first and applies them only once all
//! checks have passed:
//!
//! ```text
//! contribute:  check campaign ─► check sums ─► stage native move ─► stage mint
//!              ─► commit native ─► commit state ─► commit mint ─► emit
//! finalize:    check campaign ─► stage payout ─► mark finalized ─► pay out ─► emit
//! ```

use crate::bank::NativeBank;
use crate::events::{EventLog, LedgerEvent};
use crate::storage::CampaignStore;
use crate::token::RewardToken;
use crate::types::{Address, Amount, Campaign, CampaignConfig, CampaignState, REWARD_RATE};
use crate::{Error, Result};

/// Mutable handles a registry write needs besides its own storage.
pub(crate) struct Env<'a> {
    pub now: u64,
    pub token: &'a mut RewardToken,
    pub bank: &'a mut NativeBank,
    pub log: &'a mut EventLog,
}

#[derive(Debug)]
pub struct CampaignRegistry {
    address: Address,
    store: CampaignStore,
}

impl CampaignRegistry {
    /// A registry acting as `address`: the identity it mints as and the
    /// escrow account that holds raised funds until finalization.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            store: CampaignStore::default(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of campaigns ever created. Also the id of the newest one.
    pub fn campaign_count(&self) -> u64 {
        self.store.count()
    }

    /// Retrieve a campaign by id. Ids outside `1..=campaign_count` fail.
    pub fn campaign(&self, id: u64) -> Result<Campaign> {
        self.store.load(id)
    }

    /// All campaigns in creation order.
    pub fn campaigns(&self) -> impl Iterator<Item = Campaign> + '_ {
        self.store.iter()
    }

    /// Accumulated contribution of `contributor` to campaign `id`; 0 if none.
    pub fn contributions(&self, id: u64, contributor: &Address) -> Amount {
        self.store.contribution(id, contributor)
    }

    /// Every `(contributor, amount)` recorded for campaign `id`.
    pub fn contributors(&self, id: u64) -> impl Iterator<Item = (&Address, Amount)> + '_ {
        self.store.contributions_to(id)
    }

    pub(crate) fn create_campaign(
        &mut self,
        now: u64,
        log: &mut EventLog,
        caller: Address,
        title: &str,
        goal: Amount,
        duration_secs: i64,
    ) -> Result<u64> {
        if goal == 0 {
            return Err(Error::InvalidGoal);
        }
        if duration_secs <= 0 {
            return Err(Error::InvalidDuration(duration_secs));
        }
        if title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }

        let duration = u64::try_from(duration_secs).map_err(|_| Error::Overflow)?;
        let deadline = now.checked_add(duration).ok_or(Error::Overflow)?;
        let id = self.store.next_id()?;

        self.store.insert(CampaignConfig {
            id,
            title: title.to_string(),
            goal,
            deadline,
            creator: caller,
        });

        log.emit(LedgerEvent::CampaignCreated {
            campaign_id: id,
            title: title.to_string(),
            goal,
            deadline,
            creator: caller,
        });
        Ok(id)
    }

    pub(crate) fn contribute(
        &mut self,
        env: Env<'_>,
        caller: Address,
        id: u64,
        amount: Amount,
    ) -> Result<()> {
        let config = self.store.config(id)?;
        let state = self.store.state(id)?;

        if state.finalized || env.now >= config.deadline {
            return Err(Error::CampaignEnded(id));
        }
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }

        let total_raised = state
            .total_raised
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        let contributed = self
            .store
            .contribution(id, &caller)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        let reward = amount.checked_mul(REWARD_RATE).ok_or(Error::Overflow)?;

        let payment = env.bank.prepare_transfer(caller, self.address, amount)?;
        let mint = env.token.prepare_mint(self.address, caller, reward)?;

        // Nothing below can fail.
        env.bank.commit(payment);
        self.store.save_state(
            id,
            CampaignState {
                total_raised,
                finalized: false,
            },
        );
        self.store.save_contribution(id, caller, contributed);
        env.token.commit_mint(mint, env.log);

        env.log.emit(LedgerEvent::ContributionMade {
            campaign_id: id,
            contributor: caller,
            amount,
        });
        Ok(())
    }

    /// Pays the whole raised amount to the creator. Anyone may trigger it.
    pub(crate) fn finalize_campaign(&mut self, env: Env<'_>, id: u64) -> Result<Amount> {
        let config = self.store.config(id)?;
        let state = self.store.state(id)?;

        if state.finalized {
            return Err(Error::AlreadyFinalized(id));
        }
        if env.now < config.deadline && state.total_raised < config.goal {
            return Err(Error::NotFinalizable(id));
        }

        let total_raised = state.total_raised;
        let creator = config.creator;
        let payout = env
            .bank
            .prepare_transfer(self.address, creator, total_raised)?;

        // Flag first: any later attempt sees AlreadyFinalized.
        self.store.save_state(
            id,
            CampaignState {
                total_raised,
                finalized: true,
            },
        );
        env.bank.commit(payout);

        env.log.emit(LedgerEvent::CampaignFinalized {
            campaign_id: id,
            creator,
            total_raised,
        });
        Ok(total_raised)
    }
}
