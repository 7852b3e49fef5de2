use soroban_sdk::String;

use crate::config::VaultConfig;
use crate::errors::VaultError;

const MAX_NAME_LEN: u32 = 64;
const MAX_RELATION_LEN: u32 = 64;

pub const MIN_SHARE: u32 = 1;
pub const MAX_SHARE: u32 = 100;

const MIN_GRACE_PERIOD_SECS: u64 = 3_600; // 1 hour
const MAX_GRACE_PERIOD_SECS: u64 = 157_680_000; // 5 years

/// Rejects ASCII control bytes. Bytes >= 0x80 belong to multi-byte UTF-8
/// sequences and are accepted so that names are not limited to ASCII.
fn is_text_byte(b: u8) -> bool {
    b >= 32 && b != 127
}

fn check_text(text: &String, max_len: u32, required: bool) -> Result<(), VaultError> {
    let len = text.len();
    if len > max_len || (required && len == 0) {
        return Err(VaultError::InvalidInput);
    }
    if len == 0 {
        return Ok(());
    }

    let mut buf = [0u8; 64];
    let bytes = &mut buf[..len as usize];
    text.copy_into_slice(bytes);

    if !bytes.iter().all(|&b| is_text_byte(b)) {
        return Err(VaultError::InvalidInput);
    }
    if required && bytes.iter().all(|&b| b == b' ') {
        return Err(VaultError::InvalidInput);
    }
    Ok(())
}

/// Validate an heir's display name: 1–64 bytes, no control characters,
/// not blank.
pub fn validate_heir_name(name: &String) -> Result<(), VaultError> {
    check_text(name, MAX_NAME_LEN, true)
}

/// Validate the free-text relation label. It may be empty.
pub fn validate_relation(relation: &String) -> Result<(), VaultError> {
    check_text(relation, MAX_RELATION_LEN, false)
}

pub fn validate_share(share: u32) -> Result<(), VaultError> {
    if !(MIN_SHARE..=MAX_SHARE).contains(&share) {
        return Err(VaultError::InvalidShare);
    }
    Ok(())
}

/// Deposits and top-ups must move a strictly positive amount.
pub fn validate_amount(amount: i128) -> Result<(), VaultError> {
    if amount <= 0 {
        return Err(VaultError::InvalidInput);
    }
    Ok(())
}

pub fn validate_config(config: &VaultConfig) -> Result<(), VaultError> {
    if !(MIN_GRACE_PERIOD_SECS..=MAX_GRACE_PERIOD_SECS).contains(&config.grace_period_secs)
        || config.renewal_fee < 0
        || config.min_deposit < 1
    {
        return Err(VaultError::InvalidConfig);
    }
    Ok(())
}
