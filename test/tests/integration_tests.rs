//! # Vault Testing Framework: Integration Tests
//!
//! End-to-end checks of the inheritance vault through the framework:
//! - Property-based testing of allocation, payout and lifecycle rules
//! - Invariant verification over real and tampered snapshots
//! - State space exploration
//! - Scenario DSL

extern crate std;

use legacy_vault::{Payee, VaultConfig, VaultError, VaultStatus};
use proptest::prelude::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, String};

use test_framework::generators::*;
use test_framework::invariants::*;
use test_framework::scenario_dsl::{run_scenarios, Scenario};
use test_framework::state_explorer::*;
use test_framework::*;

fn config_with_grace(grace_period_secs: u64) -> VaultConfig {
    VaultConfig {
        grace_period_secs,
        ..VaultConfig::default()
    }
}

/// Keep only the shares that fit under 100%, in order; at least one heir.
fn fitting_shares(shares: &[u32]) -> std::vec::Vec<u32> {
    let mut total = 0u32;
    let mut kept = std::vec::Vec::new();
    for share in shares {
        if total + share <= 100 {
            total += share;
            kept.push(*share);
        }
    }
    if kept.is_empty() {
        kept.push(1);
    }
    kept
}

// ═════════════════════════════════════════════════════════════════════════════
//  Property-Based Tests
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// **Property**: an heir is accepted iff it keeps the table at or below
    /// 100%, and a rejected add leaves the table unchanged.
    #[test]
    fn prop_allocation_never_exceeds_100(shares in share_list_strategy(8)) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owner = harness.create_owner(1_000);
        let vault = harness.create_vault(&owner, 1_000);

        let mut expected = 0u32;
        for share in shares {
            let before = harness.vault(vault).heirs;
            let result = harness.client.try_add_heir(
                &vault,
                &String::from_str(&harness.env.env, "heir"),
                &String::from_str(&harness.env.env, ""),
                &Address::generate(&harness.env.env),
                &share,
            );
            if expected + share <= 100 {
                prop_assert!(result.is_ok(), "share {} rejected at {}%", share, expected);
                expected += share;
            } else {
                prop_assert_eq!(result, Err(Ok(VaultError::AllocationExceeded)));
                prop_assert_eq!(harness.vault(vault).heirs, before);
            }
        }

        let snapshot = harness.vault(vault);
        prop_assert_eq!(snapshot.total_allocated, expected);
        prop_assert_eq!(snapshot.unallocated, 100 - expected);
    }

    /// **Property**: execution pays every heir floor(balance × share / 100),
    /// the executor the rest, and nothing stays in custody.
    #[test]
    fn prop_execution_pays_exact_balance(
        deposit in deposit_strategy(),
        shares in share_list_strategy(6),
    ) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owner = harness.create_owner(deposit);
        let vault = harness.create_vault(&owner, deposit);

        let shares = fitting_shares(&shares);
        let wallets: std::vec::Vec<Address> =
            shares.iter().map(|s| harness.add_heir(vault, *s)).collect();

        harness.activate(vault);
        harness.lapse();
        let executed = harness.execute(vault);

        let mut heirs_total = 0i128;
        for (wallet, share) in wallets.iter().zip(shares.iter()) {
            let expected = deposit * (*share as i128) / 100;
            prop_assert_eq!(harness.token_balance(wallet), expected);
            heirs_total += expected;
        }
        prop_assert_eq!(
            harness.token_balance(&executed.executor),
            deposit - heirs_total
        );
        prop_assert_eq!(harness.custody_balance(), 0);

        let recorded: i128 = executed.payouts.iter().map(|p| p.amount).sum();
        prop_assert_eq!(recorded, deposit);
    }

    /// **Property**: cancelling from any live state refunds everything the
    /// owner deposited.
    #[test]
    fn prop_cancel_refunds_full_balance(
        deposit in deposit_strategy(),
        top_up in 1i128..=1_000_000i128,
        activate in any::<bool>(),
        lapse in any::<bool>(),
    ) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owner = harness.create_owner(deposit + top_up);
        let vault = harness.create_vault(&owner, deposit);
        harness.add_heir(vault, 10);
        harness.client.top_up(&vault, &top_up);

        if activate {
            harness.activate(vault);
            if lapse {
                harness.lapse();
                prop_assert_eq!(harness.vault(vault).status, VaultStatus::Lapsed);
            }
        }

        let cancelled = harness.cancel(vault);
        prop_assert_eq!(cancelled.status, VaultStatus::Cancelled);
        prop_assert_eq!(cancelled.deposit_balance, 0);
        prop_assert_eq!(harness.token_balance(&owner), deposit + top_up);
        prop_assert_eq!(harness.custody_balance(), 0);
    }

    /// **Property**: execution is rejected at every instant before the
    /// deadline and accepted exactly at it.
    #[test]
    fn prop_execute_waits_for_deadline(
        grace in grace_period_strategy(),
        elapsed_pct in 0u64..100u64,
    ) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, config_with_grace(grace));
        let owner = harness.create_owner(1_000);
        let vault = harness.create_vault(&owner, 1_000);
        harness.add_heir(vault, 50);
        let activated = harness.activate(vault);

        let early = grace / 100 * elapsed_pct;
        harness.env.advance_time(early);
        prop_assert_eq!(
            harness.client.try_execute(&vault),
            Err(Ok(VaultError::InvalidState))
        );

        harness.env.set_timestamp(activated.lapses_at);
        prop_assert_eq!(harness.execute(vault).status, VaultStatus::Executed);
    }

    /// **Property**: a check-in after the deadline revives the vault and
    /// restarts a full grace period from that moment.
    #[test]
    fn prop_late_check_in_revives(overdue in 0u64..=10_000_000u64) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owner = harness.create_owner(1_000);
        let vault = harness.create_vault(&owner, 1_000);
        harness.add_heir(vault, 70);
        harness.activate(vault);

        harness.lapse();
        harness.env.advance_time(overdue);
        prop_assert_eq!(harness.vault(vault).status, VaultStatus::Lapsed);

        let revived = harness.check_in(vault);
        let now = harness.env.timestamp();
        prop_assert_eq!(revived.status, VaultStatus::Active);
        prop_assert_eq!(revived.lapses_at, now + harness.config.grace_period_secs);
        prop_assert_eq!(
            harness.client.try_execute(&vault),
            Err(Ok(VaultError::InvalidState))
        );
    }

    /// **Property**: out-of-range shares are always rejected.
    #[test]
    fn prop_invalid_shares_rejected(share in invalid_share_strategy()) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owner = harness.create_owner(1_000);
        let vault = harness.create_vault(&owner, 1_000);

        let result = harness.client.try_add_heir(
            &vault,
            &String::from_str(&harness.env.env, "heir"),
            &String::from_str(&harness.env.env, ""),
            &Address::generate(&harness.env.env),
            &share,
        );
        prop_assert_eq!(result, Err(Ok(VaultError::InvalidShare)));
        prop_assert!(harness.vault(vault).heirs.is_empty());
    }

    /// **Property**: zero and negative deposits never open a vault.
    #[test]
    fn prop_invalid_deposits_rejected(amount in invalid_amount_strategy()) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owner = harness.create_owner(1_000);
        let executor = Address::generate(&harness.env.env);

        let result = harness.client.try_create_vault(&owner, &executor, &amount);
        prop_assert_eq!(result, Err(Ok(VaultError::InvalidInput)));
        prop_assert_eq!(harness.token_balance(&owner), 1_000);
    }

    /// **Property**: invariants hold after arbitrary action sequences.
    #[test]
    fn prop_invariants_hold_under_random_actions(
        actions in vault_action_sequence(3, 20),
    ) {
        let mut env = TestEnv::new();
        let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
        let owners: std::vec::Vec<Address> =
            (0..3).map(|_| harness.create_owner(1)).collect();

        let config = ExplorerConfig {
            max_steps: 20,
            fail_fast: true,
            record_snapshots: false,
        };
        let mut explorer = StateExplorer::new(
            &harness,
            InvariantSet::vault_defaults(),
            TransitionInvariantSet::vault_defaults(),
            config,
            owners,
        );

        let result = explorer.explore(&actions);

        prop_assert!(result.passed(),
            "Invariant violations: {:?}", result.summary.invariant_violations);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Invariant Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_all_invariants_hold_on_fresh_contract() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());

    let snapshot = harness.snapshot(&[]);
    InvariantSet::vault_defaults().assert_all(&snapshot);
    assert_eq!(snapshot.custody_balance, 0);
}

#[test]
fn test_invariants_through_full_lifecycle() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let invariants = InvariantSet::vault_defaults();
    let transitions = TransitionInvariantSet::vault_defaults();

    let owner = harness.create_owner(3_000);
    let a = harness.create_vault(&owner, 1_000);
    let b = harness.create_vault(&owner, 2_000);
    let ids = [a, b];

    let mut before = harness.snapshot(&ids);
    invariants.assert_all(&before);

    let steps: [&dyn Fn(); 6] = [
        &|| {
            harness.add_heir(a, 50);
            harness.add_heir(b, 100);
        },
        &|| {
            harness.activate(a);
            harness.activate(b);
        },
        &|| harness.lapse(),
        &|| {
            harness.execute(a);
        },
        &|| {
            harness.cancel(b);
        },
        &|| harness.env.advance_time(1),
    ];

    for step in steps.iter() {
        step();
        let after = harness.snapshot(&ids);
        invariants.assert_all(&after);
        transitions.assert_all(&before, &after);
        before = after;
    }

    assert_eq!(before.vaults[0].status, VaultStatus::Executed);
    assert_eq!(before.vaults[1].status, VaultStatus::Cancelled);
    assert_eq!(before.custody_balance, 0);
}

#[test]
fn test_custody_conservation_detects_leak() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owner = harness.create_owner(500);
    let vault = harness.create_vault(&owner, 500);

    let mut snapshot = harness.snapshot(&[vault]);
    assert!(CustodyConservation.check(&snapshot).is_ok());

    snapshot.custody_balance -= 1;
    assert!(CustodyConservation.check(&snapshot).is_err());
}

#[test]
fn test_execution_conservation_detects_short_payout() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owner = harness.create_owner(1_000);
    let vault = harness.create_vault(&owner, 1_000);
    harness.add_heir(vault, 30);
    harness.activate(vault);
    harness.lapse();

    let before = harness.snapshot(&[vault]);
    harness.execute(vault);
    let after = harness.snapshot(&[vault]);
    assert!(ExecutionConservation.check(&before, &after).is_ok());

    let mut inflated = before.clone();
    inflated.vaults[0].deposit_balance += 1;
    assert!(ExecutionConservation.check(&inflated, &after).is_err());
}

#[test]
fn test_allocation_invariant_detects_bad_totals() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owner = harness.create_owner(1_000);
    let vault = harness.create_vault(&owner, 1_000);
    harness.add_heir(vault, 40);

    let mut snapshot = harness.snapshot(&[vault]);
    assert!(AllocationWithinBounds.check(&snapshot).is_ok());

    snapshot.vaults[0].unallocated = 100;
    assert!(AllocationWithinBounds.check(&snapshot).is_err());
}

#[test]
fn test_terminal_states_final_detects_reopen() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owner = harness.create_owner(1_000);
    let vault = harness.create_vault(&owner, 1_000);
    harness.cancel(vault);

    let before = harness.snapshot(&[vault]);
    let mut reopened = before.clone();
    reopened.vaults[0].status = VaultStatus::Active;

    assert!(TerminalStatesFinal.check(&before, &before).is_ok());
    assert!(TerminalStatesFinal.check(&before, &reopened).is_err());
}

// ═════════════════════════════════════════════════════════════════════════════
//  State Space Explorer Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_explorer_simple_sequence() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owners: std::vec::Vec<Address> = (0..2).map(|_| harness.create_owner(1)).collect();
    let grace = harness.config.grace_period_secs;

    let actions = vec![
        VaultAction::CreateVault { owner_index: 0, deposit: 10_000 },
        VaultAction::AddHeir { vault_index: 0, share: 60 },
        VaultAction::Activate { vault_index: 0 },
        VaultAction::AdvanceTime { delta: grace },
        VaultAction::Execute { vault_index: 0 },
    ];

    let mut explorer = StateExplorer::with_defaults(&harness, owners);
    let result = explorer.explore(&actions);

    assert!(result.passed(), "Violations: {:?}", result.summary.invariant_violations);
    assert_eq!(result.summary.actions_executed, 5);
    assert_eq!(result.accepted(), 5);
    assert_eq!(explorer.vaults().len(), 1);
    assert_eq!(harness.vault(explorer.vaults()[0]).status, VaultStatus::Executed);
}

#[test]
fn test_explorer_records_rejections() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owners: std::vec::Vec<Address> = (0..2).map(|_| harness.create_owner(1)).collect();

    let actions = vec![
        // No vault exists yet.
        VaultAction::Activate { vault_index: 0 },
        VaultAction::CreateVault { owner_index: 1, deposit: 100 },
        VaultAction::Activate { vault_index: 0 },
        VaultAction::AddHeir { vault_index: 0, share: 101 },
        VaultAction::CheckIn { vault_index: 0, pay_fee: true },
        VaultAction::Execute { vault_index: 0 },
    ];

    let mut explorer = StateExplorer::with_defaults(&harness, owners);
    let result = explorer.explore(&actions);

    assert!(result.passed(), "Violations: {:?}", result.summary.invariant_violations);
    let codes: std::vec::Vec<Option<u32>> = result
        .action_log
        .iter()
        .map(|(_, outcome)| match outcome {
            ActionOutcome::ExpectedError(code) => Some(*code),
            _ => None,
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            Some(VaultError::VaultNotFound as u32),
            None,
            Some(VaultError::NoHeirs as u32),
            Some(VaultError::InvalidShare as u32),
            Some(VaultError::InvalidState as u32),
            Some(VaultError::InvalidState as u32),
        ]
    );
}

#[test]
fn test_explorer_coverage_tracking() {
    let mut env = TestEnv::new();
    let harness = VaultTestHarness::new(&mut env, VaultConfig::default());
    let owners: std::vec::Vec<Address> = (0..2).map(|_| harness.create_owner(1)).collect();
    let grace = harness.config.grace_period_secs;

    let actions = vec![
        VaultAction::CreateVault { owner_index: 0, deposit: 5_000 },
        VaultAction::CreateVault { owner_index: 1, deposit: 7_000 },
        VaultAction::AddHeir { vault_index: 0, share: 40 },
        VaultAction::AddHeir { vault_index: 0, share: 20 },
        VaultAction::RemoveHeir { vault_index: 0, heir_id: 2 },
        VaultAction::AddHeir { vault_index: 1, share: 100 },
        VaultAction::Activate { vault_index: 0 },
        VaultAction::Activate { vault_index: 1 },
        VaultAction::TopUp { vault_index: 0, amount: 500 },
        VaultAction::CheckIn { vault_index: 0, pay_fee: true },
        VaultAction::AdvanceTime { delta: grace },
        VaultAction::Cancel { vault_index: 1 },
        VaultAction::Execute { vault_index: 0 },
    ];

    let mut explorer = StateExplorer::with_defaults(&harness, owners);
    let result = explorer.explore(&actions);

    assert!(result.passed(), "Violations: {:?}", result.summary.invariant_violations);
    assert_eq!(result.accepted(), actions.len());
    assert_eq!(result.summary.entry_point_coverage(VAULT_ENTRY_POINTS), 1.0);
}

#[test]
fn test_explorer_with_lifecycle_patterns() {
    let patterns = vec![
        LifecyclePattern::DrawnOut,
        LifecyclePattern::DiligentOwner,
        LifecyclePattern::LateRevival,
        LifecyclePattern::CancelAfterLapse,
        LifecyclePattern::TableChurn,
    ];

    for pattern in &patterns {
        let mut local_env = TestEnv::new();
        let local_harness = VaultTestHarness::new(&mut local_env, VaultConfig::default());
        let owners: std::vec::Vec<Address> =
            (0..2).map(|_| local_harness.create_owner(1)).collect();

        let actions = pattern_to_actions(pattern, local_harness.config.grace_period_secs);
        let config = ExplorerConfig {
            record_snapshots: true,
            ..ExplorerConfig::default()
        };
        let mut explorer = StateExplorer::new(
            &local_harness,
            InvariantSet::vault_defaults(),
            TransitionInvariantSet::vault_defaults(),
            config,
            owners,
        );
        let result = explorer.explore(&actions);

        assert!(
            result.passed(),
            "Pattern {:?} failed: {:?}",
            pattern,
            result.summary.invariant_violations
        );
        assert_eq!(result.snapshots.len(), actions.len() + 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Scenario DSL Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scenario_remainder_to_executor() {
    Scenario::new("Unallocated remainder goes to the executor")
        .given_vault(1_000, &[60])
        .when_lapsed()
        .when_executed()
        .then_status(VaultStatus::Executed)
        .then_heir_received(0, 600)
        .then_executor_received(400)
        .then_custody(0)
        .then("the executor line closes the plan", |ctx| {
            let snapshot = ctx.harness.vault(ctx.vault().id);
            let last = snapshot.payouts.last().unwrap();
            assert_eq!(last.payee, Payee::Executor);
        })
        .with_invariants(InvariantSet::vault_defaults())
        .run();
}

#[test]
fn test_scenario_lapse_uses_configured_grace() {
    Scenario::new("A vault is alive one second before its deadline")
        .with_grace_period(7_200)
        .given_vault(500, &[50, 50])
        .when_time_passes(7_199)
        .then_status(VaultStatus::Active)
        .run();

    Scenario::new("A vault lapses after exactly its grace period")
        .with_grace_period(7_200)
        .given_vault(500, &[50, 50])
        .when_lapsed()
        .then_status(VaultStatus::Lapsed)
        .then_custody(500)
        .with_invariants(InvariantSet::vault_defaults())
        .run();
}

#[test]
fn test_scenario_renewal_fee_reaches_collector() {
    Scenario::new("Renewal fee is paid to the fee collector")
        .with_renewal_fee(25)
        .given_vault(1_000, &[100])
        .when_checked_in()
        .when_time_passes(3_600)
        .when_checked_in()
        .then_status(VaultStatus::Active)
        .then_owner_holds(0)
        .then_custody(1_000)
        .then("the collector holds both fees", |ctx| {
            let snapshot = ctx.harness.vault(ctx.vault().id);
            assert_eq!(ctx.harness.token_balance(&ctx.harness.fee_collector), 50);
            assert_eq!(snapshot.renewals, 2);
        })
        .with_invariants(InvariantSet::vault_defaults())
        .run();
}

#[test]
fn test_scenario_late_check_in_revives() {
    Scenario::new("A late check-in revives a lapsed vault")
        .with_grace_period(3_600)
        .given_vault(1_000, &[40, 40])
        .when_lapsed()
        .when_checked_in()
        .then_status(VaultStatus::Active)
        .then("execution is refused again", |ctx| {
            test_framework::assert_contract_error!(
                ctx.harness.client.try_execute(&ctx.vault().id),
                VaultError::InvalidState
            );
        })
        .run();
}

#[test]
fn test_scenario_cancel_after_lapse_refunds_owner() {
    Scenario::new("Cancelling a lapsed vault refunds the owner")
        .given_vault(800, &[100])
        .when_lapsed()
        .when_cancelled()
        .then_status(VaultStatus::Cancelled)
        .then_owner_holds(800)
        .then_heir_received(0, 0)
        .then_custody(0)
        .with_invariants(InvariantSet::vault_defaults())
        .run();
}

#[test]
fn test_scenario_lapsed_table_frozen_until_revived() {
    Scenario::new("Heir table is frozen while lapsed")
        .with_grace_period(3_600)
        .given_vault(1_000, &[50])
        .when_lapsed()
        .then_status(VaultStatus::Lapsed)
        .then("edits fail until a check-in revives it", |ctx| {
            let vault = ctx.vault().id;
            let env = &ctx.harness.env.env;
            test_framework::assert_contract_error!(
                ctx.harness.client.try_add_heir(
                    &vault,
                    &String::from_str(env, "late"),
                    &String::from_str(env, ""),
                    &Address::generate(env),
                    &10,
                ),
                VaultError::InvalidState
            );
            test_framework::assert_contract_error!(
                ctx.harness.client.try_remove_heir(&vault, &1),
                VaultError::InvalidState
            );

            ctx.check_in();
            ctx.harness.add_heir(vault, 10);
            assert_eq!(ctx.harness.vault(vault).total_allocated, 60);
        })
        .run();
}

#[test]
fn test_run_scenarios_batch() {
    let scenarios = vec![
        Scenario::new("Draft vault can be cancelled")
            .given_draft_vault(10, &[])
            .when_cancelled()
            .then_status(VaultStatus::Cancelled)
            .then_owner_holds(10),
        Scenario::new("Activation needs an heir")
            .given_draft_vault(10, &[])
            .then("NoHeirs is reported", |ctx| {
                test_framework::assert_contract_error!(
                    ctx.harness.client.try_activate(&ctx.vault().id),
                    VaultError::NoHeirs
                );
            }),
        Scenario::new("Executing a live vault is refused")
            .given_vault(10, &[100])
            .when_executed(),
    ];

    assert_eq!(run_scenarios(scenarios), (2, 1));
}
