//! Input validation for agent metadata

use anchor_lang::prelude::*;

use crate::errors::EscrowError;
use crate::instructions::constants::MAX_METADATA_URI_LEN;

/// Returns true when every character is printable ASCII or a space.
pub fn is_printable_ascii(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_graphic() || c == ' ')
}

/// Checks a metadata URI before it is written to an `Agent` account.
/// An empty URI is allowed.
pub fn validate_metadata_uri(uri: &str) -> Result<()> {
    require!(
        uri.len() <= MAX_METADATA_URI_LEN,
        EscrowError::StringTooLong
    );
    require!(is_printable_ascii(uri), EscrowError::InvalidInput);
    Ok(())
}
