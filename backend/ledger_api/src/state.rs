//! Shared service state: the ledger behind a lock, and its event journal.
//!
//! Every write holds the ledger lock until the events it emitted are in the
//! journal, so journal order is commit order.

use crowdfund_ledger::{Address, Ledger, NativeBank, SystemClock};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::{ApiError, Result};
use crate::events::JournalEntry;

pub struct AppState {
    pub pool: SqlitePool,
    pub ledger: Mutex<Ledger<SystemClock>>,
}

impl AppState {
    /// Deploy a fresh ledger from `config` and journal the deployment events.
    pub async fn deploy(pool: SqlitePool, config: &Config) -> Result<Self> {
        let mut bank = NativeBank::new();
        for (account, amount) in &config.native_allocations {
            bank.credit(*account, *amount)?;
        }

        let mut ledger = Ledger::deploy(
            SystemClock,
            bank,
            config.deployer,
            config.registry_address,
            config.initial_supply,
        )?;
        info!(
            deployer = %config.deployer,
            registry = %config.registry_address,
            supply = config.initial_supply,
            "Ledger deployed"
        );

        journal(&pool, &mut ledger).await;
        Ok(Self {
            pool,
            ledger: Mutex::new(ledger),
        })
    }

    /// Run a read against the current ledger state.
    pub async fn read<T>(&self, f: impl FnOnce(&Ledger<SystemClock>) -> T) -> T {
        let ledger = self.ledger.lock().await;
        f(&ledger)
    }

    /// Run one write as `caller` and journal what it emitted.
    ///
    /// The registry identity is reserved for the ledger itself; requests
    /// claiming it are refused before they reach the ledger.
    pub async fn write<T>(
        &self,
        action: &'static str,
        caller: Address,
        op: impl FnOnce(&mut Ledger<SystemClock>) -> crowdfund_ledger::Result<T>,
    ) -> Result<T> {
        let mut ledger = self.ledger.lock().await;
        if caller == ledger.registry().address() {
            warn!(%caller, action, "Refused request claiming the registry identity");
            return Err(ApiError::Forbidden(
                "the registry address cannot be used as a caller".to_string(),
            ));
        }

        match op(&mut ledger) {
            Ok(value) => {
                info!(%caller, action, "Committed");
                journal(&self.pool, &mut ledger).await;
                Ok(value)
            }
            Err(e) => {
                warn!(%caller, action, error = %e, "Rejected");
                Err(e.into())
            }
        }
    }
}

/// Move the ledger's pending events into the journal.
///
/// Delivery is fire-and-forget: a journal failure is logged and the events
/// are dropped, the ledger commit stands.
async fn journal(pool: &SqlitePool, ledger: &mut Ledger<SystemClock>) {
    let events = ledger.drain_events();
    if events.is_empty() {
        return;
    }
    let recorded_at = chrono::Utc::now().timestamp();

    let entries: Result<Vec<JournalEntry>> = events
        .iter()
        .map(|event| JournalEntry::from_event(event, recorded_at))
        .collect();

    let outcome = match entries {
        Ok(entries) => db::insert_events(pool, &entries).await,
        Err(e) => Err(e),
    };
    if let Err(e) = outcome {
        error!("Failed to journal {} events: {e}", events.len());
    }
}
