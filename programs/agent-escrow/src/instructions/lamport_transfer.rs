//! Direct lamport moves out of program-owned accounts.
//!
//! The job and agent PDAs hold value on top of their rent-exempt minimum.
//! Every debit here keeps the source at or above that minimum and fails
//! with `TransferFailed` otherwise.

use crate::errors::EscrowError;
use anchor_lang::prelude::*;

/// Balance left in the source after debiting `amount`, if it stays at or
/// above `rent_floor`.
pub fn checked_debit(balance: u64, amount: u64, rent_floor: u64) -> Result<u64> {
    let remaining = balance
        .checked_sub(amount)
        .ok_or(EscrowError::TransferFailed)?;
    require!(remaining >= rent_floor, EscrowError::TransferFailed);
    Ok(remaining)
}

/// Moves `amount` lamports from a program-owned account to `to`.
///
/// A zero amount is a no-op.
pub fn transfer_above_rent<'info>(
    from: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    amount: u64,
    rent_floor: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let remaining = checked_debit(from.lamports(), amount, rent_floor)?;
    let credited = to
        .lamports()
        .checked_add(amount)
        .ok_or(EscrowError::TransferFailed)?;

    **from.try_borrow_mut_lamports()? = remaining;
    **to.try_borrow_mut_lamports()? = credited;
    Ok(())
}

/// Rent-exempt minimum for an account holding `data_len` bytes.
pub fn rent_floor(data_len: usize) -> Result<u64> {
    Ok(Rent::get()?.minimum_balance(data_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_keeps_rent() {
        assert_eq!(checked_debit(1_000, 400, 600).unwrap(), 600);
    }

    #[test]
    fn test_debit_below_rent_fails() {
        assert_eq!(
            checked_debit(1_000, 401, 600).unwrap_err(),
            EscrowError::TransferFailed.into()
        );
    }

    #[test]
    fn test_debit_more_than_balance_fails() {
        assert_eq!(
            checked_debit(10, 11, 0).unwrap_err(),
            EscrowError::TransferFailed.into()
        );
    }
}
