use soroban_sdk::contracterror;

/// Error codes returned by the inheritance vault.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 20 – 29 | Resource not found             |
/// | 30 – 39 | Validation / input             |
/// | 40 – 49 | Vault state                    |
///
/// No variant is fatal: a rejected command leaves the vault exactly as it
/// was before the call.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VaultError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Caller is not the contract admin.
    Unauthorized = 10,
    VaultNotFound = 20,
    /// Unknown heir id.
    NotFound = 21,
    /// Malformed heir fields or a non-positive amount.
    InvalidInput = 30,
    /// Share outside 1–100.
    InvalidShare = 31,
    /// Adding the share would push the table over 100%.
    AllocationExceeded = 32,
    InvalidConfig = 33,
    /// Command is not legal in the vault's current lifecycle state.
    InvalidState = 40,
    /// Activation attempted with an empty allocation table.
    NoHeirs = 41,
    /// Check-in submitted without the renewal fee.
    FeeNotPaid = 42,
}
