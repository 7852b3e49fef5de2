//! Contract-wide configuration.
//!
//! The grace period and renewal fee are copied into each vault when it is
//! created, so changing the config only affects vaults created afterwards.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::errors::VaultError;
use crate::validation::validate_config;

const ADMIN: Symbol = symbol_short!("ADMIN");
const TOKEN: Symbol = symbol_short!("TOKEN");
const FEE_COLL: Symbol = symbol_short!("FEE_COLL");
const CONFIG: Symbol = symbol_short!("CONFIG");

/// Default grace period: 30 days.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 2_592_000;
/// Renewal fee charged per check-in, in token base units.
pub const DEFAULT_RENEWAL_FEE: i128 = 0;
pub const DEFAULT_MIN_DEPOSIT: i128 = 1;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    pub grace_period_secs: u64,
    pub renewal_fee: i128,
    pub min_deposit: i128,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            renewal_fee: DEFAULT_RENEWAL_FEE,
            min_deposit: DEFAULT_MIN_DEPOSIT,
        }
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&ADMIN)
}

pub fn init(
    env: &Env,
    admin: &Address,
    token: &Address,
    fee_collector: &Address,
    config: &VaultConfig,
) -> Result<(), VaultError> {
    if is_initialized(env) {
        return Err(VaultError::AlreadyInitialized);
    }
    validate_config(config)?;

    let instance = env.storage().instance();
    instance.set(&ADMIN, admin);
    instance.set(&TOKEN, token);
    instance.set(&FEE_COLL, fee_collector);
    instance.set(&CONFIG, config);
    Ok(())
}

pub fn admin(env: &Env) -> Result<Address, VaultError> {
    env.storage()
        .instance()
        .get(&ADMIN)
        .ok_or(VaultError::NotInitialized)
}

/// Token contract holding every vault's deposit.
pub fn token(env: &Env) -> Result<Address, VaultError> {
    env.storage()
        .instance()
        .get(&TOKEN)
        .ok_or(VaultError::NotInitialized)
}

pub fn fee_collector(env: &Env) -> Result<Address, VaultError> {
    env.storage()
        .instance()
        .get(&FEE_COLL)
        .ok_or(VaultError::NotInitialized)
}

pub fn get(env: &Env) -> Result<VaultConfig, VaultError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(VaultError::NotInitialized)
}

/// Replace the config after checking `caller` is the stored admin.
pub fn update(env: &Env, caller: &Address, config: &VaultConfig) -> Result<(), VaultError> {
    if admin(env)? != *caller {
        return Err(VaultError::Unauthorized);
    }
    validate_config(config)?;
    env.storage().instance().set(&CONFIG, config);
    Ok(())
}
