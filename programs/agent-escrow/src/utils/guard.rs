//! Critical-section flags for value-moving instructions
//!
//! A flag is taken before any state that guards a transfer is written and
//! released only after the transfer returns, whatever its outcome. The
//! protocol-wide flag lives in `ProtocolConfig::reentrancy_locked`; each
//! agent additionally carries `Agent::transfer_locked` for withdrawals.

use anchor_lang::prelude::*;

use crate::errors::EscrowError;

/// Takes the flag, failing with `ReentrancyDetected` if it is already held.
pub fn acquire(flag: &mut bool) -> Result<()> {
    if *flag {
        msg!("Re-entrant call rejected");
        return Err(error!(EscrowError::ReentrancyDetected));
    }
    *flag = true;
    Ok(())
}

pub fn release(flag: &mut bool) {
    *flag = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_then_release() {
        let mut flag = false;
        acquire(&mut flag).unwrap();
        assert!(flag);
        release(&mut flag);
        assert!(!flag);
        acquire(&mut flag).unwrap();
    }

    #[test]
    fn test_nested_acquire_is_rejected() {
        let mut flag = false;
        acquire(&mut flag).unwrap();
        assert_eq!(
            acquire(&mut flag).unwrap_err(),
            EscrowError::ReentrancyDetected.into()
        );
        assert!(flag);
    }
}
