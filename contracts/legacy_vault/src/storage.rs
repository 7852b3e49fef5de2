use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::errors::VaultError;
use crate::vault::Vault;

const VAULT: Symbol = symbol_short!("VAULT");
const VAULT_CTR: Symbol = symbol_short!("VAULT_CTR");
const OWNED: Symbol = symbol_short!("OWNED");

/// Average ledger close time, used to turn a grace period into ledgers.
const LEDGER_SECS: u64 = 5;

// ~60 days / ~120 days of ledgers.
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

/// TTL for a vault record: its whole grace period in ledgers plus the
/// default headroom, clamped to the network maximum. Long grace periods hit
/// the clamp, so every read and write refreshes the entry as well.
fn vault_ttl(env: &Env, vault: &Vault) -> u32 {
    let grace_ledgers = vault.clock.grace_period_secs / LEDGER_SECS;
    let wanted = grace_ledgers.saturating_add(TTL_EXTEND_TO as u64);
    wanted.min(env.storage().max_ttl() as u64) as u32
}

fn extend_vault(env: &Env, vault: &Vault) {
    let extend_to = vault_ttl(env, vault);
    env.storage()
        .persistent()
        .extend_ttl(&(VAULT, vault.id), extend_to / 2, extend_to);
    // Config lives in instance storage and must outlast every vault.
    env.storage().instance().extend_ttl(extend_to / 2, extend_to);
}

pub fn next_vault_id(env: &Env) -> u64 {
    let id: u64 = env.storage().instance().get(&VAULT_CTR).unwrap_or(0) + 1;
    env.storage().instance().set(&VAULT_CTR, &id);
    id
}

pub fn load_vault(env: &Env, vault_id: u64) -> Result<Vault, VaultError> {
    let vault: Vault = env
        .storage()
        .persistent()
        .get(&(VAULT, vault_id))
        .ok_or(VaultError::VaultNotFound)?;
    extend_vault(env, &vault);
    Ok(vault)
}

pub fn store_vault(env: &Env, vault: &Vault) {
    env.storage().persistent().set(&(VAULT, vault.id), vault);
    extend_vault(env, vault);
}

/// Ids of the owner's open vaults, oldest first. Executed and cancelled
/// vaults are dropped from the list; their records stay readable by id.
pub fn vaults_of(env: &Env, owner: &Address) -> Vec<u64> {
    let key = (OWNED, owner.clone());
    match env.storage().persistent().get::<_, Vec<u64>>(&key) {
        Some(ids) => {
            extend_index(env, &key);
            ids
        }
        None => Vec::new(env),
    }
}

pub fn index_owner(env: &Env, owner: &Address, vault_id: u64) {
    let key = (OWNED, owner.clone());
    let mut ids = vaults_of(env, owner);
    ids.push_back(vault_id);
    env.storage().persistent().set(&key, &ids);
    extend_index(env, &key);
}

pub fn unindex_owner(env: &Env, owner: &Address, vault_id: u64) {
    let key = (OWNED, owner.clone());
    let mut ids = vaults_of(env, owner);
    let Some(pos) = ids.first_index_of(vault_id) else {
        return;
    };
    ids.remove(pos);
    if ids.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &ids);
        extend_index(env, &key);
    }
}

fn extend_index(env: &Env, key: &(Symbol, Address)) {
    let extend_to = TTL_EXTEND_TO.min(env.storage().max_ttl());
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD.min(extend_to), extend_to);
}
