//! # Storage
//!
//! Typed tables backing the [`CampaignRegistry`](crate::CampaignRegistry).
//!
//! | Table            | Key                    | Value            |
//! |------------------|------------------------|------------------|
//! | `count`          | -                      | `u64`            |
//! | `configs`        | campaign id            | `CampaignConfig` |
//! | `states`         | campaign id            | `CampaignState`  |
//! | `contributions`  | (campaign id, address) | `Amount`         |
//!
//! Contributions are the high-frequency write. They only touch the small
//! `CampaignState` row and one contribution cell; the config row is written
//! once at creation.

use std::collections::{BTreeMap, HashMap};

use crate::types::{Address, Amount, Campaign, CampaignConfig, CampaignState};
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct CampaignStore {
    count: u64,
    configs: BTreeMap<u64, CampaignConfig>,
    states: BTreeMap<u64, CampaignState>,
    contributions: HashMap<(u64, Address), Amount>,
}

impl CampaignStore {
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The id the next created campaign will receive.
    pub fn next_id(&self) -> Result<u64> {
        self.count.checked_add(1).ok_or(Error::Overflow)
    }

    /// Store a new campaign with zeroed state and bump the counter.
    ///
    /// `config.id` must be the value returned by [`Self::next_id`].
    pub fn insert(&mut self, config: CampaignConfig) {
        debug_assert_eq!(Some(config.id), self.count.checked_add(1));
        let id = config.id;
        self.configs.insert(id, config);
        self.states.insert(id, CampaignState::default());
        self.count = id;
    }

    pub fn config(&self, id: u64) -> Result<&CampaignConfig> {
        self.configs.get(&id).ok_or(Error::UnknownCampaign(id))
    }

    pub fn state(&self, id: u64) -> Result<&CampaignState> {
        self.states.get(&id).ok_or(Error::UnknownCampaign(id))
    }

    /// Overwrite only the mutable state of an existing campaign.
    pub fn save_state(&mut self, id: u64, state: CampaignState) {
        debug_assert!(self.configs.contains_key(&id));
        self.states.insert(id, state);
    }

    /// Load the full `Campaign` by combining config and state.
    pub fn load(&self, id: u64) -> Result<Campaign> {
        Ok(Campaign::from_parts(self.config(id)?, self.state(id)?))
    }

    /// All campaigns in id order.
    pub fn iter(&self) -> impl Iterator<Item = Campaign> + '_ {
        self.configs
            .iter()
            .filter_map(|(id, config)| {
                self.states
                    .get(id)
                    .map(|state| Campaign::from_parts(config, state))
            })
    }

    pub fn contribution(&self, id: u64, contributor: &Address) -> Amount {
        self.contributions
            .get(&(id, *contributor))
            .copied()
            .unwrap_or(0)
    }

    pub fn save_contribution(&mut self, id: u64, contributor: Address, amount: Amount) {
        self.contributions.insert((id, contributor), amount);
    }

    /// Every contribution cell recorded for campaign `id`.
    pub fn contributions_to(&self, id: u64) -> impl Iterator<Item = (&Address, Amount)> + '_ {
        self.contributions
            .iter()
            .filter(move |((campaign, _), _)| *campaign == id)
            .map(|((_, contributor), amount)| (contributor, *amount))
    }
}
