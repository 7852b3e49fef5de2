//! Payout planning for an executed vault.
//!
//! Each heir receives `floor(balance * share / 100)`. The executor receives
//! whatever is left, which covers both the unallocated percentage and the
//! rounding dust, so the plan always sums to the balance exactly.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::allocation::Heir;
use crate::errors::VaultError;
use crate::validation::MAX_SHARE;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payee {
    Heir(u64),
    Executor,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub payee: Payee,
    pub recipient: Address,
    pub amount: i128,
}

/// `floor(balance * share / 100)` without forming `balance * share`.
///
/// Splitting `balance = 100q + r` gives `q * share + floor(r * share / 100)`,
/// which cannot overflow for `share <= 100`.
pub fn share_of(balance: i128, share: u32) -> i128 {
    let pct = MAX_SHARE as i128;
    let share = share as i128;
    let q = balance / pct;
    let r = balance % pct;
    q * share + (r * share) / pct
}

/// Build the payout plan: one line per heir in table order, then exactly one
/// executor line with the remainder.
pub fn plan(
    env: &Env,
    balance: i128,
    heirs: &Vec<Heir>,
    executor: &Address,
) -> Result<Vec<Payout>, VaultError> {
    if balance < 0 {
        return Err(VaultError::InvalidInput);
    }
    let total_shares: u32 = heirs.iter().map(|h| h.share).sum();
    if total_shares > MAX_SHARE {
        return Err(VaultError::AllocationExceeded);
    }

    let mut payouts = Vec::new(env);
    let mut distributed: i128 = 0;
    for heir in heirs.iter() {
        let amount = share_of(balance, heir.share);
        distributed += amount;
        payouts.push_back(Payout {
            payee: Payee::Heir(heir.id),
            recipient: heir.wallet,
            amount,
        });
    }

    payouts.push_back(Payout {
        payee: Payee::Executor,
        recipient: executor.clone(),
        amount: balance - distributed,
    });
    Ok(payouts)
}

pub fn total(payouts: &Vec<Payout>) -> i128 {
    payouts.iter().map(|p| p.amount).sum()
}
