//! Structured event publishing for the inheritance vault.
//!
//! Every effect produced by the state machine maps to exactly one event with
//! topics `(kind, vault_id)`. Renewals and revivals use different topics so
//! indexers can tell a routine check-in from a late one.

#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::config::VaultConfig;
use crate::vault::{VaultEffect, VaultSnapshot};

pub fn publish_initialized(env: &Env, admin: &Address, config: &VaultConfig) {
    env.events()
        .publish((symbol_short!("INIT"),), (admin.clone(), config.clone()));
}

pub fn publish_config_updated(env: &Env, admin: &Address, config: &VaultConfig) {
    env.events()
        .publish((symbol_short!("CONFIG"),), (admin.clone(), config.clone()));
}

pub fn publish_vault_created(env: &Env, snapshot: &VaultSnapshot) {
    env.events().publish(
        (symbol_short!("VAULT_NEW"), snapshot.id),
        (
            snapshot.owner.clone(),
            snapshot.executor.clone(),
            snapshot.deposit_balance,
        ),
    );
}

pub fn publish_effect(env: &Env, vault_id: u64, effect: &VaultEffect) {
    let events = env.events();
    match effect {
        VaultEffect::Lapsed => events.publish((symbol_short!("LAPSED"), vault_id), ()),
        VaultEffect::Activated => events.publish((symbol_short!("ACTIVATED"), vault_id), ()),
        VaultEffect::Renewed => events.publish((symbol_short!("RENEWED"), vault_id), ()),
        VaultEffect::Revived => events.publish((symbol_short!("REVIVED"), vault_id), ()),
        VaultEffect::HeirAdded(heir_id) => {
            events.publish((symbol_short!("HEIR_ADD"), vault_id), *heir_id)
        }
        VaultEffect::HeirRemoved(heir_id) => {
            events.publish((symbol_short!("HEIR_REM"), vault_id), *heir_id)
        }
        VaultEffect::FeeCharged(amount) => {
            events.publish((symbol_short!("FEE_PAID"), vault_id), *amount)
        }
        VaultEffect::Deposited(amount) => {
            events.publish((symbol_short!("DEPOSIT"), vault_id), *amount)
        }
        VaultEffect::Refunded(owner, amount) => {
            events.publish((symbol_short!("REFUND"), vault_id), (owner.clone(), *amount))
        }
        VaultEffect::Paid(payout) => events.publish(
            (symbol_short!("PAYOUT"), vault_id),
            (payout.payee.clone(), payout.recipient.clone(), payout.amount),
        ),
        VaultEffect::Executed => events.publish((symbol_short!("EXECUTED"), vault_id), ()),
        VaultEffect::Cancelled => events.publish((symbol_short!("CANCELLED"), vault_id), ()),
    }
}
