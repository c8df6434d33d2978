//! Application configuration loaded from environment variables.

use crowdfund_ledger::{units::parse_units, Address, Amount, DECIMALS};

use crate::errors::{ApiError, Result};

const DEFAULT_REGISTRY_ADDRESS: &str = "0x00000000000000000000000000000000000c0ffe";

#[derive(Debug, Clone)]
pub struct Config {
    /// Account that deploys the token and receives the initial supply
    pub deployer: Address,
    /// Identity the campaign registry acts as (minter and escrow)
    pub registry_address: Address,
    /// Initial RNT supply in whole tokens
    pub initial_supply: Amount,
    /// Native funds issued at startup, in minimal units
    pub native_allocations: Vec<(Address, Amount)>,
    /// Path to the SQLite event journal
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            deployer: lookup("DEPLOYER_ADDRESS")
                .ok_or_else(|| {
                    ApiError::Config("DEPLOYER_ADDRESS environment variable is required".to_string())
                })?
                .parse()
                .map_err(|e| ApiError::Config(format!("Invalid DEPLOYER_ADDRESS: {e}")))?,
            registry_address: var("REGISTRY_ADDRESS", DEFAULT_REGISTRY_ADDRESS)
                .parse()
                .map_err(|e| ApiError::Config(format!("Invalid REGISTRY_ADDRESS: {e}")))?,
            initial_supply: var("INITIAL_SUPPLY", "1000000")
                .parse()
                .map_err(|_| ApiError::Config("Invalid INITIAL_SUPPLY".to_string()))?,
            native_allocations: parse_allocations(&var("NATIVE_ALLOCATIONS", ""))?,
            database_url: var("DATABASE_URL", "sqlite:./crowdfund_events.db"),
            api_port: var("API_PORT", "3001")
                .parse()
                .map_err(|_| ApiError::Config("Invalid API_PORT".to_string()))?,
        })
    }
}

/// Parse `addr=amount,addr=amount` with amounts in whole native units.
pub fn parse_allocations(raw: &str) -> Result<Vec<(Address, Amount)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (addr, amount) = entry.split_once('=').ok_or_else(|| {
                ApiError::Config(format!("Invalid NATIVE_ALLOCATIONS entry: {entry}"))
            })?;
            let addr = addr
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("Invalid NATIVE_ALLOCATIONS entry: {e}")))?;
            let amount = parse_units(amount, DECIMALS)
                .map_err(|e| ApiError::Config(format!("Invalid NATIVE_ALLOCATIONS entry: {e}")))?;
            Ok((addr, amount))
        })
        .collect()
}
