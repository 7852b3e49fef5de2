#![no_std]

//! # LegacyChain inheritance vault
//!
//! A custodial vault that holds a depositor's funds together with
//! instructions for distributing them to heirs:
//!
//! - **Allocation table**: heirs with whole-percentage shares, never more
//!   than 100% in total; the rest goes to the vault's executor.
//! - **Liveness clock**: the owner must check in (paying the renewal fee)
//!   within each grace period, otherwise the vault lapses.
//! - **Lifecycle**: Draft → Active → Lapsed → Executed, with Cancelled
//!   reachable from every non-terminal state.
//! - **Execution**: permissionless once lapsed; floor-per-heir payouts with
//!   the remainder to the executor, summing exactly to the balance.
//!
//! The state machine in [`vault`] is pure; this module loads a vault,
//! applies one command at the ledger timestamp, stores the result, and then
//! performs the token transfers and events the command asked for.

pub mod allocation;
pub mod config;
pub mod errors;
pub mod events;
pub mod liveness;
pub mod planner;
pub mod storage;
pub mod validation;
pub mod vault;


pub use allocation::{AllocationTable, Heir, HeirId, NewHeir};
pub use config::{VaultConfig, DEFAULT_GRACE_PERIOD_SECS, DEFAULT_MIN_DEPOSIT, DEFAULT_RENEWAL_FEE};
pub use errors::VaultError;
pub use liveness::{Liveness, LivenessClock};
pub use planner::{Payee, Payout};
pub use vault::{Transition, Vault, VaultCommand, VaultEffect, VaultSnapshot, VaultStatus};

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, String, Vec};

#[contract]
pub struct LegacyVaultContract;

#[contractimpl]
impl LegacyVaultContract {
    // ── Initialisation & config ───────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `token`: asset every vault deposit is held in.
    /// * `fee_collector`: receives renewal fees paid on check-in.
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        fee_collector: Address,
        config: VaultConfig,
    ) -> Result<(), VaultError> {
        admin.require_auth();
        config::init(&env, &admin, &token, &fee_collector, &config)?;
        events::publish_initialized(&env, &admin, &config);
        Ok(())
    }

    /// Replace the config used for vaults created from now on.
    pub fn set_config(env: Env, admin: Address, config: VaultConfig) -> Result<(), VaultError> {
        Self::require_init(&env)?;
        admin.require_auth();
        config::update(&env, &admin, &config)?;
        events::publish_config_updated(&env, &admin, &config);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<VaultConfig, VaultError> {
        config::get(&env)
    }

    // ── Vault commands ────────────────────────────────────────────────────────

    /// Open a Draft vault and pull `deposit` from the owner.
    ///
    /// The current grace period and renewal fee are fixed into the vault.
    pub fn create_vault(
        env: Env,
        owner: Address,
        executor: Address,
        deposit: i128,
    ) -> Result<VaultSnapshot, VaultError> {
        Self::require_init(&env)?;
        owner.require_auth();

        let cfg = config::get(&env)?;
        if deposit < cfg.min_deposit {
            return Err(VaultError::InvalidInput);
        }

        let now = env.ledger().timestamp();
        let id = storage::next_vault_id(&env);
        let vault = Vault::create(
            &env,
            id,
            owner.clone(),
            executor,
            deposit,
            cfg.grace_period_secs,
            cfg.renewal_fee,
            now,
        )?;

        storage::store_vault(&env, &vault);
        storage::index_owner(&env, &owner, id);
        Self::token_client(&env)?.transfer(&owner, &env.current_contract_address(), &deposit);

        let snapshot = vault.snapshot(now);
        events::publish_vault_created(&env, &snapshot);
        Ok(snapshot)
    }

    pub fn activate(env: Env, vault_id: u64) -> Result<VaultSnapshot, VaultError> {
        Self::dispatch(&env, vault_id, VaultCommand::Activate, true)
    }

    pub fn add_heir(
        env: Env,
        vault_id: u64,
        name: String,
        relation: String,
        wallet: Address,
        share: u32,
    ) -> Result<VaultSnapshot, VaultError> {
        let heir = NewHeir {
            name,
            relation,
            wallet,
            share,
        };
        Self::dispatch(&env, vault_id, VaultCommand::AddHeir(heir), true)
    }

    pub fn remove_heir(env: Env, vault_id: u64, heir_id: u64) -> Result<VaultSnapshot, VaultError> {
        Self::dispatch(&env, vault_id, VaultCommand::RemoveHeir(heir_id), true)
    }

    /// Prove liveness. With `pay_fee` the configured renewal fee is moved
    /// from the owner to the fee collector; without it the check-in fails
    /// with `FeeNotPaid`. A check-in on a lapsed vault revives it.
    pub fn check_in(env: Env, vault_id: u64, pay_fee: bool) -> Result<VaultSnapshot, VaultError> {
        Self::dispatch(&env, vault_id, VaultCommand::CheckIn(pay_fee), true)
    }

    pub fn top_up(env: Env, vault_id: u64, amount: i128) -> Result<VaultSnapshot, VaultError> {
        Self::dispatch(&env, vault_id, VaultCommand::TopUp(amount), true)
    }

    /// Refund the whole balance to the owner and close the vault.
    pub fn cancel(env: Env, vault_id: u64) -> Result<VaultSnapshot, VaultError> {
        Self::dispatch(&env, vault_id, VaultCommand::Cancel, true)
    }

    /// Pay out a lapsed vault. Anyone may call this once the owner has
    /// missed the check-in deadline.
    pub fn execute(env: Env, vault_id: u64) -> Result<VaultSnapshot, VaultError> {
        Self::dispatch(&env, vault_id, VaultCommand::Execute, false)
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    /// Current snapshot; Active/Lapsed is re-derived from the ledger time.
    pub fn get_vault(env: Env, vault_id: u64) -> Result<VaultSnapshot, VaultError> {
        let vault = storage::load_vault(&env, vault_id)?;
        Ok(vault.snapshot(env.ledger().timestamp()))
    }

    pub fn get_heirs(env: Env, vault_id: u64) -> Result<Vec<Heir>, VaultError> {
        Ok(storage::load_vault(&env, vault_id)?.allocation.snapshot())
    }

    /// The payout plan recorded at execution (empty before that).
    pub fn get_payouts(env: Env, vault_id: u64) -> Result<Vec<Payout>, VaultError> {
        Ok(storage::load_vault(&env, vault_id)?.payouts)
    }

    /// What execution would pay right now, given the current balance and
    /// table. Does not require the vault to have lapsed.
    pub fn preview_payouts(env: Env, vault_id: u64) -> Result<Vec<Payout>, VaultError> {
        let vault = storage::load_vault(&env, vault_id)?;
        planner::plan(
            &env,
            vault.deposit_balance,
            &vault.allocation.snapshot(),
            &vault.executor,
        )
    }

    /// Ids of the owner's vaults that are not yet executed or cancelled.
    pub fn vaults_of(env: Env, owner: Address) -> Vec<u64> {
        storage::vaults_of(&env, &owner)
    }
}

impl LegacyVaultContract {
    fn require_init(env: &Env) -> Result<(), VaultError> {
        if !config::is_initialized(env) {
            return Err(VaultError::NotInitialized);
        }
        Ok(())
    }

    fn token_client(env: &Env) -> Result<token::TokenClient<'_>, VaultError> {
        Ok(token::TokenClient::new(env, &config::token(env)?))
    }

    /// Load, apply, store, then settle. Nothing is written when the command
    /// is rejected.
    fn dispatch(
        env: &Env,
        vault_id: u64,
        command: VaultCommand,
        owner_only: bool,
    ) -> Result<VaultSnapshot, VaultError> {
        Self::require_init(env)?;
        let vault = storage::load_vault(env, vault_id)?;
        if owner_only {
            vault.owner.require_auth();
        }

        let now = env.ledger().timestamp();
        if matches!(command, VaultCommand::CheckIn(_) | VaultCommand::Execute) {
            log!(env, "lapse margin", vault_id, vault.clock.lapse_margin(now));
        }

        let transition = vault::apply(env, &vault, &command, now)?;
        storage::store_vault(env, &transition.vault);
        if transition.vault.status.is_terminal() {
            storage::unindex_owner(env, &transition.vault.owner, vault_id);
        }
        Self::settle(env, &transition)?;
        Ok(transition.vault.snapshot(now))
    }

    /// Carry out the transfers requested by the effects and publish one
    /// event per effect.
    fn settle(env: &Env, transition: &Transition) -> Result<(), VaultError> {
        let token = Self::token_client(env)?;
        let this = env.current_contract_address();
        let owner = &transition.vault.owner;

        for effect in transition.effects.iter() {
            match &effect {
                VaultEffect::FeeCharged(amount) => {
                    token.transfer(owner, &config::fee_collector(env)?, amount);
                }
                VaultEffect::Deposited(amount) => {
                    token.transfer(owner, &this, amount);
                }
                VaultEffect::Refunded(to, amount) if *amount > 0 => {
                    token.transfer(&this, to, amount);
                }
                VaultEffect::Paid(payout) if payout.amount > 0 => {
                    token.transfer(&this, &payout.recipient, &payout.amount);
                }
                _ => {}
            }
            events::publish_effect(env, transition.vault.id, &effect);
        }
        Ok(())
    }
}
