#![no_main]

use arbitrary::Arbitrary;
use legacy_vault::{LegacyVaultContract, LegacyVaultContractClient, VaultConfig, VaultStatus};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{StellarAssetClient, TokenClient},
    Address, Env, String,
};

/// Actions covering every vault entry point plus the passage of time.
///
/// Indices select from small pools by modulo. Amounts are bounded so
/// owners can always be funded and failures come from the vault rules.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Create { owner: u8, deposit: u32 },
    AddHeir { vault: u8, share: u8 },
    RemoveHeir { vault: u8, heir_id: u8 },
    Activate { vault: u8 },
    CheckIn { vault: u8, pay_fee: bool },
    TopUp { vault: u8, amount: u32 },
    Cancel { vault: u8 },
    Execute { vault: u8 },
    AdvanceTime { delta: u32 },
}

const RENEWAL_FEE: i128 = 5;

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let fee_collector = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let minter = StellarAssetClient::new(&env, &token);
    let balances = TokenClient::new(&env, &token);

    let contract_id = env.register(LegacyVaultContract, ());
    let client = LegacyVaultContractClient::new(&env, &contract_id);

    // Short grace period so AdvanceTime can actually lapse vaults.
    let config = VaultConfig {
        grace_period_secs: 3_600,
        renewal_fee: RENEWAL_FEE,
        min_deposit: 1,
    };
    if client
        .try_initialize(&admin, &token, &fee_collector, &config)
        .is_err()
    {
        return;
    }

    let owners: Vec<Address> = (0..3).map(|_| Address::generate(&env)).collect();
    let mut vaults: Vec<u64> = Vec::new();
    let pick = |vaults: &Vec<u64>, i: u8| -> u64 {
        if vaults.is_empty() {
            0
        } else {
            vaults[i as usize % vaults.len()]
        }
    };

    for action in actions.into_iter() {
        let mut executing: Option<(u64, i128)> = None;

        match action {
            FuzzAction::Create { owner, deposit } => {
                let owner = &owners[owner as usize % owners.len()];
                let deposit = deposit as i128;
                if deposit > 0 {
                    minter.mint(owner, &deposit);
                }
                let executor = Address::generate(&env);
                if let Ok(Ok(snapshot)) = client.try_create_vault(owner, &executor, &deposit) {
                    vaults.push(snapshot.id);
                }
            }
            FuzzAction::AddHeir { vault, share } => {
                let _ = client.try_add_heir(
                    &pick(&vaults, vault),
                    &String::from_str(&env, "heir"),
                    &String::from_str(&env, ""),
                    &Address::generate(&env),
                    &(share as u32),
                );
            }
            FuzzAction::RemoveHeir { vault, heir_id } => {
                let _ = client.try_remove_heir(&pick(&vaults, vault), &(heir_id as u64));
            }
            FuzzAction::Activate { vault } => {
                let _ = client.try_activate(&pick(&vaults, vault));
            }
            FuzzAction::CheckIn { vault, pay_fee } => {
                let id = pick(&vaults, vault);
                if let Ok(Ok(snapshot)) = client.try_get_vault(&id) {
                    minter.mint(&snapshot.owner, &RENEWAL_FEE);
                }
                let _ = client.try_check_in(&id, &pay_fee);
            }
            FuzzAction::TopUp { vault, amount } => {
                let id = pick(&vaults, vault);
                let amount = amount as i128;
                if let Ok(Ok(snapshot)) = client.try_get_vault(&id) {
                    if amount > 0 {
                        minter.mint(&snapshot.owner, &amount);
                    }
                }
                let _ = client.try_top_up(&id, &amount);
            }
            FuzzAction::Cancel { vault } => {
                let _ = client.try_cancel(&pick(&vaults, vault));
            }
            FuzzAction::Execute { vault } => {
                let id = pick(&vaults, vault);
                if let Ok(Ok(snapshot)) = client.try_get_vault(&id) {
                    executing = Some((id, snapshot.deposit_balance));
                }
                let _ = client.try_execute(&id);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let mut held = 0i128;
        for id in &vaults {
            let v = client.get_vault(id);
            let shares: u32 = v.heirs.iter().map(|h| h.share).sum();
            assert!(shares <= 100, "INVARIANT VIOLATION: vault {} allocates {}%", id, shares);
            assert_eq!(v.total_allocated, shares, "INVARIANT VIOLATION: stale allocation total");
            assert!(v.deposit_balance >= 0, "INVARIANT VIOLATION: negative balance");
            if v.status.is_terminal() {
                assert_eq!(v.deposit_balance, 0, "INVARIANT VIOLATION: closed vault holds funds");
            }
            if v.status != VaultStatus::Executed {
                assert!(v.payouts.is_empty(), "INVARIANT VIOLATION: payouts without execution");
            }
            held += v.deposit_balance;
        }
        assert_eq!(
            balances.balance(&contract_id),
            held,
            "INVARIANT VIOLATION: custody does not match vault balances"
        );

        // An already-executed vault reports a zero balance, so `before > 0`
        // means this action did the execution.
        if let Some((id, before)) = executing {
            let v = client.get_vault(&id);
            if v.status == VaultStatus::Executed && before > 0 {
                let paid: i128 = v.payouts.iter().map(|p| p.amount).sum();
                assert_eq!(paid, before, "INVARIANT VIOLATION: payouts do not sum to balance");
            }
        }
    }
});
