//! The ledger facade a host drives.
//!
//! Every write names its caller. The registry's own address is never a
//! valid caller: only the registry itself, from inside `contribute` and
//! `finalize_campaign`, acts with that identity.

use crate::bank::NativeBank;
use crate::clock::{Clock, SystemClock};
use crate::events::{EventLog, LedgerEvent};
use crate::registry::{CampaignRegistry, Env};
use crate::token::RewardToken;
use crate::types::{Address, Amount, Campaign};
use crate::{Error, Result};

/// The authoritative ledger: token, registry, native balances, clock and
/// pending events, owned together and driven one call at a time.
#[derive(Debug)]
pub struct Ledger<C = SystemClock> {
    clock: C,
    bank: NativeBank,
    token: RewardToken,
    registry: CampaignRegistry,
    events: EventLog,
}

impl<C: Clock> Ledger<C> {
    /// Run the deployment sequence.
    ///
    /// 1. Deploy the reward token with `initial_whole_tokens` credited to
    ///    `deployer`.
    /// 2. Deploy the registry as `registry_address`.
    /// 3. Transfer the minter role from `deployer` to the registry.
    ///
    /// Fails with [`Error::InvalidAddress`] when either identity is the zero
    /// address or both are the same account.
    pub fn deploy(
        clock: C,
        bank: NativeBank,
        deployer: Address,
        registry_address: Address,
        initial_whole_tokens: Amount,
    ) -> Result<Self> {
        if deployer.is_zero() {
            return Err(Error::InvalidAddress(format!("deployer {deployer} is the zero address")));
        }
        if registry_address.is_zero() || registry_address == deployer {
            return Err(Error::InvalidAddress(format!(
                "registry {registry_address} must be a distinct non-zero address"
            )));
        }

        let mut events = EventLog::new();
        let mut token = RewardToken::new(deployer, initial_whole_tokens, &mut events)?;
        let registry = CampaignRegistry::new(registry_address);
        token.transfer_ownership(deployer, registry.address(), &mut events)?;

        Ok(Self {
            clock,
            bank,
            token,
            registry,
            events,
        })
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn token(&self) -> &RewardToken {
        &self.token
    }

    pub fn registry(&self) -> &CampaignRegistry {
        &self.registry
    }

    pub fn bank(&self) -> &NativeBank {
        &self.bank
    }

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.pending()
    }

    /// Take the events committed since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.token.balance_of(holder)
    }

    pub fn total_supply(&self) -> Amount {
        self.token.total_supply()
    }

    pub fn native_balance_of(&self, holder: &Address) -> Amount {
        self.bank.balance_of(holder)
    }

    pub fn campaign_count(&self) -> u64 {
        self.registry.campaign_count()
    }

    pub fn campaign(&self, id: u64) -> Result<Campaign> {
        self.registry.campaign(id)
    }

    pub fn campaigns(&self) -> impl Iterator<Item = Campaign> + '_ {
        self.registry.campaigns()
    }

    pub fn contributions(&self, id: u64, contributor: &Address) -> Amount {
        self.registry.contributions(id, contributor)
    }

    // ── Writes ───────────────────────────────────────────────────────

    fn check_caller(&self, caller: Address) -> Result<()> {
        if caller == self.registry.address() {
            return Err(Error::Unauthorized(caller));
        }
        Ok(())
    }

    /// Issue native funds to `to`. Host bootstrap only.
    pub fn credit_native(&mut self, to: Address, amount: Amount) -> Result<()> {
        self.bank.credit(to, amount)
    }

    pub fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.check_caller(caller)?;
        self.token.transfer(caller, to, amount, &mut self.events)
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_minter: Address) -> Result<()> {
        self.check_caller(caller)?;
        self.token
            .transfer_ownership(caller, new_minter, &mut self.events)
    }

    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.check_caller(caller)?;
        self.token.mint(caller, to, amount, &mut self.events)
    }

    /// Open a campaign owned by `caller`. Returns the new campaign id.
    pub fn create_campaign(
        &mut self,
        caller: Address,
        title: &str,
        goal: Amount,
        duration_secs: i64,
    ) -> Result<u64> {
        self.check_caller(caller)?;
        let now = self.clock.now();
        self.registry
            .create_campaign(now, &mut self.events, caller, title, goal, duration_secs)
    }

    /// Contribute `amount` of `caller`'s native funds to campaign `id` and
    /// mint the reward.
    pub fn contribute(&mut self, caller: Address, id: u64, amount: Amount) -> Result<()> {
        self.check_caller(caller)?;
        let env = Env {
            now: self.clock.now(),
            token: &mut self.token,
            bank: &mut self.bank,
            log: &mut self.events,
        };
        self.registry.contribute(env, caller, id, amount)
    }

    /// Close campaign `id` and pay its creator. Returns the amount paid.
    pub fn finalize_campaign(&mut self, caller: Address, id: u64) -> Result<Amount> {
        self.check_caller(caller)?;
        let env = Env {
            now: self.clock.now(),
            token: &mut self.token,
            bank: &mut self.bank,
            log: &mut self.events,
        };
        self.registry.finalize_campaign(env, id)
    }
}
