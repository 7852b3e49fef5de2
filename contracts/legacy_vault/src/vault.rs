//! Vault lifecycle state machine.
//!
//! ```text
//! Draft ──activate──▶ Active ──(clock)──▶ Lapsed ──execute──▶ Executed
//!   │                   ▲  │                 │
//!   │                   └──┼──check_in───────┘
//!   └──────cancel──────────┴─────────────────┴──cancel──▶ Cancelled
//! ```
//!
//! [`apply`] is the whole engine: `(vault, command, now) -> (vault', effects)`.
//! It never touches storage or the ledger clock; `env` is only used to
//! allocate host vectors. Every command first re-derives Active/Lapsed from
//! the clock, then runs against a copy of the vault that is returned only on
//! success, so a rejected command leaves the caller's vault untouched.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::allocation::{AllocationTable, Heir, NewHeir};
use crate::errors::VaultError;
use crate::liveness::{Liveness, LivenessClock};
use crate::planner::{self, Payout};
use crate::validation::validate_amount;

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VaultStatus {
    Draft = 0,
    Active = 1,
    Lapsed = 2,
    Executed = 3,
    Cancelled = 4,
}

impl VaultStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VaultStatus::Executed | VaultStatus::Cancelled)
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VaultCommand {
    Activate,
    AddHeir(NewHeir),
    RemoveHeir(u64),
    /// Carries whether the renewal fee accompanies the check-in.
    CheckIn(bool),
    TopUp(i128),
    Cancel,
    Execute,
}

/// Something a command did. The transfer-bearing variants (`FeeCharged`,
/// `Deposited`, `Refunded`, `Paid`) are requests for the contract shell to
/// move funds; the core never moves funds itself.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VaultEffect {
    Lapsed,
    Activated,
    Renewed,
    Revived,
    HeirAdded(u64),
    HeirRemoved(u64),
    FeeCharged(i128),
    Deposited(i128),
    Refunded(Address, i128),
    Paid(Payout),
    Executed,
    Cancelled,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vault {
    pub id: u64,
    pub owner: Address,
    pub executor: Address,
    pub status: VaultStatus,
    pub deposit_balance: i128,
    pub created_at: u64,
    /// Zero until the vault reaches a terminal state.
    pub closed_at: u64,
    pub allocation: AllocationTable,
    pub clock: LivenessClock,
    /// Recorded payout plan; empty unless executed.
    pub payouts: Vec<Payout>,
}

/// Read model returned after every successful command.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultSnapshot {
    pub id: u64,
    pub owner: Address,
    pub executor: Address,
    pub status: VaultStatus,
    pub deposit_balance: i128,
    pub heirs: Vec<Heir>,
    pub total_allocated: u32,
    pub unallocated: u32,
    pub last_check_in: u64,
    pub lapses_at: u64,
    pub time_until_lapse: u64,
    pub lapse_margin: i128,
    pub renewal_fee_paid: bool,
    pub renewals: u32,
    pub payouts: Vec<Payout>,
}

/// A successful command: the next vault and what happened, in order.
#[derive(Clone, Debug)]
pub struct Transition {
    pub vault: Vault,
    pub effects: Vec<VaultEffect>,
}

impl Vault {
    /// Open a Draft vault holding `deposit`.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        env: &Env,
        id: u64,
        owner: Address,
        executor: Address,
        deposit: i128,
        grace_period_secs: u64,
        renewal_fee: i128,
        now: u64,
    ) -> Result<Self, VaultError> {
        validate_amount(deposit)?;
        Ok(Self {
            id,
            owner,
            executor,
            status: VaultStatus::Draft,
            deposit_balance: deposit,
            created_at: now,
            closed_at: 0,
            allocation: AllocationTable::new(env),
            clock: LivenessClock::new(grace_period_secs, renewal_fee, now),
            payouts: Vec::new(env),
        })
    }

    /// Active → Lapsed once the clock runs out. Returns whether it moved.
    pub fn tick(&mut self, now: u64) -> bool {
        if self.status == VaultStatus::Active && self.clock.status(now) == Liveness::Lapsed {
            self.status = VaultStatus::Lapsed;
            self.clock.expire();
            return true;
        }
        false
    }

    /// Status as of `now`, without mutating.
    pub fn status_at(&self, now: u64) -> VaultStatus {
        if self.status == VaultStatus::Active && self.clock.status(now) == Liveness::Lapsed {
            return VaultStatus::Lapsed;
        }
        self.status
    }

    pub fn activate(&mut self, now: u64) -> Result<(), VaultError> {
        if self.status != VaultStatus::Draft {
            return Err(VaultError::InvalidState);
        }
        if self.allocation.is_empty() {
            return Err(VaultError::NoHeirs);
        }
        self.clock.start(now);
        self.status = VaultStatus::Active;
        Ok(())
    }

    /// Returns `true` when the check-in revived a lapsed vault.
    pub fn check_in(&mut self, fee_paid: bool, now: u64) -> Result<bool, VaultError> {
        let revived = match self.status {
            VaultStatus::Active => false,
            VaultStatus::Lapsed => true,
            _ => return Err(VaultError::InvalidState),
        };
        self.clock.check_in(fee_paid, now)?;
        self.status = VaultStatus::Active;
        Ok(revived)
    }

    pub fn add_heir(&mut self, heir: NewHeir) -> Result<u64, VaultError> {
        self.require_editable()?;
        self.allocation.add(heir)
    }

    pub fn remove_heir(&mut self, heir_id: u64) -> Result<Heir, VaultError> {
        self.require_editable()?;
        self.allocation.remove(heir_id)
    }

    pub fn top_up(&mut self, amount: i128) -> Result<(), VaultError> {
        self.require_editable()?;
        validate_amount(amount)?;
        self.deposit_balance = self
            .deposit_balance
            .checked_add(amount)
            .ok_or(VaultError::InvalidInput)?;
        Ok(())
    }

    /// Refund the whole balance to the owner. Returns the refunded amount.
    pub fn cancel(&mut self, now: u64) -> Result<i128, VaultError> {
        if self.status.is_terminal() {
            return Err(VaultError::InvalidState);
        }
        let refund = self.deposit_balance;
        self.deposit_balance = 0;
        self.status = VaultStatus::Cancelled;
        self.closed_at = now;
        Ok(refund)
    }

    /// Distribute the balance per the allocation table. Only a lapsed vault
    /// can be executed.
    pub fn execute(&mut self, env: &Env, now: u64) -> Result<Vec<Payout>, VaultError> {
        if self.status != VaultStatus::Lapsed {
            return Err(VaultError::InvalidState);
        }
        let payouts = planner::plan(
            env,
            self.deposit_balance,
            &self.allocation.snapshot(),
            &self.executor,
        )?;
        self.deposit_balance = 0;
        self.payouts = payouts.clone();
        self.status = VaultStatus::Executed;
        self.closed_at = now;
        Ok(payouts)
    }

    pub fn snapshot(&self, now: u64) -> VaultSnapshot {
        let status = self.status_at(now);
        let (time_until_lapse, lapse_margin) = match status {
            // The clock has not started yet: a whole period remains.
            VaultStatus::Draft => (
                self.clock.grace_period_secs,
                self.clock.grace_period_secs as i128,
            ),
            VaultStatus::Executed | VaultStatus::Cancelled => (0, 0),
            VaultStatus::Active | VaultStatus::Lapsed => (
                self.clock.time_until_lapse(now),
                self.clock.lapse_margin(now),
            ),
        };

        VaultSnapshot {
            id: self.id,
            owner: self.owner.clone(),
            executor: self.executor.clone(),
            status,
            deposit_balance: self.deposit_balance,
            heirs: self.allocation.snapshot(),
            total_allocated: self.allocation.total_allocated(),
            unallocated: self.allocation.unallocated(),
            last_check_in: self.clock.last_check_in,
            lapses_at: self.clock.lapses_at(),
            time_until_lapse,
            lapse_margin,
            renewal_fee_paid: status == VaultStatus::Active
                && self.clock.fee_paid_for_period(now),
            renewals: self.clock.renewals,
            payouts: self.payouts.clone(),
        }
    }

    fn require_editable(&self) -> Result<(), VaultError> {
        match self.status {
            VaultStatus::Draft | VaultStatus::Active => Ok(()),
            _ => Err(VaultError::InvalidState),
        }
    }
}

/// Apply one command at `now`.
pub fn apply(
    env: &Env,
    vault: &Vault,
    command: &VaultCommand,
    now: u64,
) -> Result<Transition, VaultError> {
    let mut next = vault.clone();
    let mut effects = Vec::new(env);

    if next.tick(now) {
        effects.push_back(VaultEffect::Lapsed);
    }

    match command {
        VaultCommand::Activate => {
            next.activate(now)?;
            effects.push_back(VaultEffect::Activated);
        }
        VaultCommand::AddHeir(heir) => {
            let id = next.add_heir(heir.clone())?;
            effects.push_back(VaultEffect::HeirAdded(id));
        }
        VaultCommand::RemoveHeir(heir_id) => {
            let removed = next.remove_heir(*heir_id)?;
            effects.push_back(VaultEffect::HeirRemoved(removed.id));
        }
        VaultCommand::CheckIn(fee_paid) => {
            let revived = next.check_in(*fee_paid, now)?;
            if next.clock.renewal_fee > 0 {
                effects.push_back(VaultEffect::FeeCharged(next.clock.renewal_fee));
            }
            effects.push_back(if revived {
                VaultEffect::Revived
            } else {
                VaultEffect::Renewed
            });
        }
        VaultCommand::TopUp(amount) => {
            next.top_up(*amount)?;
            effects.push_back(VaultEffect::Deposited(*amount));
        }
        VaultCommand::Cancel => {
            let refund = next.cancel(now)?;
            effects.push_back(VaultEffect::Refunded(next.owner.clone(), refund));
            effects.push_back(VaultEffect::Cancelled);
        }
        VaultCommand::Execute => {
            let payouts = next.execute(env, now)?;
            for payout in payouts.iter() {
                effects.push_back(VaultEffect::Paid(payout));
            }
            effects.push_back(VaultEffect::Executed);
        }
    }

    Ok(Transition {
        vault: next,
        effects,
    })
}
