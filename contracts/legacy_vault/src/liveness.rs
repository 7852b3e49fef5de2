//! Check-in clock.
//!
//! Status is a pure function of the last check-in, the grace period and the
//! caller-supplied `now`. Nothing here reads the ledger.

use soroban_sdk::contracttype;

use crate::errors::VaultError;

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Liveness {
    Active,
    Lapsed,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LivenessClock {
    pub last_check_in: u64,
    pub grace_period_secs: u64,
    /// Fee owed for each renewal, fixed when the vault was created.
    pub renewal_fee: i128,
    /// Set by a paid check-in; only meaningful while the period it paid
    /// for is still running. See `fee_paid_for_period`.
    pub renewal_fee_paid: bool,
    pub renewals: u32,
    pub fees_paid: i128,
}

impl LivenessClock {
    pub fn new(grace_period_secs: u64, renewal_fee: i128, now: u64) -> Self {
        Self {
            last_check_in: now,
            grace_period_secs,
            renewal_fee,
            renewal_fee_paid: false,
            renewals: 0,
            fees_paid: 0,
        }
    }

    /// Start the first period at `now`.
    pub fn start(&mut self, now: u64) {
        self.last_check_in = now;
        self.renewal_fee_paid = false;
    }

    /// Record a check-in. Works whether or not the clock has lapsed; the
    /// state machine decides whether a check-in is allowed at all.
    pub fn check_in(&mut self, fee_paid: bool, now: u64) -> Result<(), VaultError> {
        if !fee_paid {
            return Err(VaultError::FeeNotPaid);
        }
        self.last_check_in = now;
        self.renewal_fee_paid = true;
        self.renewals = self.renewals.saturating_add(1);
        self.fees_paid = self.fees_paid.saturating_add(self.renewal_fee);
        Ok(())
    }

    /// Whether the period running at `now` has been paid for. A lapse ends
    /// the paid period, so this is false once `now` reaches `lapses_at`.
    pub fn fee_paid_for_period(&self, now: u64) -> bool {
        self.renewal_fee_paid && self.status(now) == Liveness::Active
    }

    /// Close the current period at a lapse.
    pub fn expire(&mut self) {
        self.renewal_fee_paid = false;
    }

    pub fn lapses_at(&self) -> u64 {
        self.last_check_in.saturating_add(self.grace_period_secs)
    }

    pub fn status(&self, now: u64) -> Liveness {
        if now < self.lapses_at() {
            Liveness::Active
        } else {
            Liveness::Lapsed
        }
    }

    /// Signed seconds until lapse; zero or negative once lapsed.
    pub fn lapse_margin(&self, now: u64) -> i128 {
        self.lapses_at() as i128 - now as i128
    }

    /// Seconds until lapse, clamped at zero.
    pub fn time_until_lapse(&self, now: u64) -> u64 {
        self.lapses_at().saturating_sub(now)
    }
}
