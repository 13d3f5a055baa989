//! Pull-based withdrawal of a worker's credited balance.

use crate::errors::EscrowError;
use crate::instructions::lamport_transfer::transfer_above_rent;
use crate::state::{Agent, ProtocolConfig};
use crate::utils::guard;
use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;

/// Rejects a withdrawal already in flight, authorizes `caller`, takes the
/// agent's transfer token and zeroes the balance. Returns the amount to
/// send.
///
/// The balance is zeroed before any lamports move. The caller must call
/// `finish_withdrawal` once the transfer has returned, whether or not it
/// succeeded.
pub fn begin_withdrawal(agent: &mut Agent, caller: &Pubkey) -> Result<u64> {
    require!(!agent.transfer_locked, EscrowError::ReentrancyDetected);
    require!(agent.owner == *caller, EscrowError::Unauthorized);
    require!(agent.available_balance > 0, EscrowError::NoBalance);
    guard::acquire(&mut agent.transfer_locked)?;

    let amount = agent.available_balance;
    agent.available_balance = 0;
    Ok(amount)
}

pub fn finish_withdrawal(agent: &mut Agent) {
    guard::release(&mut agent.transfer_locked);
}

pub fn record_withdrawal(config: &mut ProtocolConfig, amount: u64) -> Result<()> {
    config.total_withdrawn = config
        .total_withdrawn
        .checked_add(amount)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    Ok(())
}

/// Pays the agent's whole available balance to `owner` and returns the
/// amount.
///
/// Both flags are taken and the zeroed balance is written to the agent
/// account before any lamports move. The flags are released once the
/// transfer returns, whatever its outcome.
pub fn withdraw_to_owner<'info>(
    agent: &mut Account<'info, Agent>,
    config: &mut Account<'info, ProtocolConfig>,
    owner: &AccountInfo<'info>,
    agent_rent_floor: u64,
) -> Result<u64> {
    guard::acquire(&mut config.reentrancy_locked)?;
    let amount = match begin_withdrawal(agent, owner.key) {
        Ok(amount) => amount,
        Err(err) => {
            guard::release(&mut config.reentrancy_locked);
            return Err(err);
        }
    };

    let transfer = agent
        .exit(&crate::ID)
        .and_then(|_| config.exit(&crate::ID))
        .and_then(|_| {
            transfer_above_rent(&agent.to_account_info(), owner, amount, agent_rent_floor)
        });

    finish_withdrawal(agent);
    guard::release(&mut config.reentrancy_locked);
    transfer?;

    record_withdrawal(config, amount)?;
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::test_accounts::{load, TestAccount};

    const FLOOR: u64 = 1_000;

    fn accounts(owner: Pubkey, balance: u64, lamports: u64) -> (TestAccount, TestAccount) {
        let agent = TestAccount::program_owned(&funded_agent(owner, balance), Agent::SIZE, lamports);
        let config = TestAccount::program_owned(&ProtocolConfig::default(), ProtocolConfig::SIZE, FLOOR);
        (agent, config)
    }

    fn funded_agent(owner: Pubkey, balance: u64) -> Agent {
        Agent {
            worker: Pubkey::new_unique(),
            owner,
            available_balance: balance,
            total_earned: balance,
            ..Default::default()
        }
    }

    #[test]
    fn test_withdrawal_zeroes_balance_and_keeps_earnings() {
        let owner = Pubkey::new_unique();
        let mut agent = funded_agent(owner, 50);

        let amount = begin_withdrawal(&mut agent, &owner).unwrap();
        assert_eq!(amount, 50);
        assert_eq!(agent.available_balance, 0);
        assert_eq!(agent.total_earned, 50);
        assert!(agent.transfer_locked);

        finish_withdrawal(&mut agent);
        assert!(!agent.transfer_locked);
    }

    #[test]
    fn test_non_owner_rejected() {
        let mut agent = funded_agent(Pubkey::new_unique(), 50);
        assert_eq!(
            begin_withdrawal(&mut agent, &Pubkey::new_unique()).unwrap_err(),
            EscrowError::Unauthorized.into()
        );
        assert_eq!(agent.available_balance, 50);
    }

    #[test]
    fn test_empty_balance_rejected() {
        let owner = Pubkey::new_unique();
        let mut agent = funded_agent(owner, 0);
        assert_eq!(
            begin_withdrawal(&mut agent, &owner).unwrap_err(),
            EscrowError::NoBalance.into()
        );
    }

    #[test]
    fn test_unregistered_agent_has_no_owner() {
        let mut agent = Agent::default();
        assert_eq!(
            begin_withdrawal(&mut agent, &Pubkey::new_unique()).unwrap_err(),
            EscrowError::Unauthorized.into()
        );
    }

    #[test]
    fn test_reentrant_withdrawal_rejected() {
        let owner = Pubkey::new_unique();
        let mut agent = funded_agent(owner, 50);
        begin_withdrawal(&mut agent, &owner).unwrap();

        // Credited again while the first transfer is still in flight
        agent.available_balance = 10;
        assert_eq!(
            begin_withdrawal(&mut agent, &owner).unwrap_err(),
            EscrowError::ReentrancyDetected.into()
        );
        assert_eq!(agent.available_balance, 10);
    }

    #[test]
    fn test_reentrancy_checked_before_balance() {
        let owner = Pubkey::new_unique();
        let mut agent = funded_agent(owner, 50);
        begin_withdrawal(&mut agent, &owner).unwrap();

        assert_eq!(
            begin_withdrawal(&mut agent, &owner).unwrap_err(),
            EscrowError::ReentrancyDetected.into()
        );
    }

    #[test]
    fn test_record_withdrawal() {
        let mut config = ProtocolConfig::default();
        record_withdrawal(&mut config, 7).unwrap();
        assert_eq!(config.total_withdrawn, 7);
    }

    #[test]
    fn test_withdraw_to_owner_moves_lamports() {
        let mut owner_acc = TestAccount::wallet(0);
        let (mut agent_acc, mut config_acc) = accounts(owner_acc.key, 50, FLOOR + 50);

        let (agent_info, config_info) = (agent_acc.info(), config_acc.info());
        let owner = owner_acc.info();
        let mut agent = Account::<Agent>::try_from(&agent_info).unwrap();
        let mut config = Account::<ProtocolConfig>::try_from(&config_info).unwrap();

        assert_eq!(withdraw_to_owner(&mut agent, &mut config, &owner, FLOOR).unwrap(), 50);

        assert_eq!(owner.lamports(), 50);
        assert_eq!(agent_info.lamports(), FLOOR);
        assert_eq!(agent.available_balance, 0);
        assert_eq!(agent.total_earned, 50);
        assert!(!agent.transfer_locked);
        assert!(!config.reentrancy_locked);
        assert_eq!(config.total_withdrawn, 50);
    }

    #[test]
    fn test_withdraw_persists_zero_balance_before_transfer() {
        let mut owner_acc = TestAccount::wallet(0);
        // Too few lamports above rent, so the transfer itself fails
        let (mut agent_acc, mut config_acc) = accounts(owner_acc.key, 50, FLOOR + 49);

        let (agent_info, config_info) = (agent_acc.info(), config_acc.info());
        let owner = owner_acc.info();
        let mut agent = Account::<Agent>::try_from(&agent_info).unwrap();
        let mut config = Account::<ProtocolConfig>::try_from(&config_info).unwrap();

        assert_eq!(
            withdraw_to_owner(&mut agent, &mut config, &owner, FLOOR).unwrap_err(),
            EscrowError::TransferFailed.into()
        );

        let stored: Agent = load(&agent_info);
        assert_eq!(stored.available_balance, 0);
        assert!(stored.transfer_locked);
        assert!(load::<ProtocolConfig>(&config_info).reentrancy_locked);

        assert!(!agent.transfer_locked);
        assert!(!config.reentrancy_locked);
        assert_eq!(config.total_withdrawn, 0);
        assert_eq!(owner.lamports(), 0);
    }

    #[test]
    fn test_withdraw_rejected_while_protocol_locked() {
        let mut owner_acc = TestAccount::wallet(0);
        let (mut agent_acc, mut config_acc) = accounts(owner_acc.key, 50, FLOOR + 50);

        let (agent_info, config_info) = (agent_acc.info(), config_acc.info());
        let owner = owner_acc.info();
        let mut agent = Account::<Agent>::try_from(&agent_info).unwrap();
        let mut config = Account::<ProtocolConfig>::try_from(&config_info).unwrap();
        config.reentrancy_locked = true;

        assert_eq!(
            withdraw_to_owner(&mut agent, &mut config, &owner, FLOOR).unwrap_err(),
            EscrowError::ReentrancyDetected.into()
        );
        assert_eq!(agent.available_balance, 50);
        assert_eq!(agent_info.lamports(), FLOOR + 50);
    }

    #[test]
    fn test_withdraw_failure_releases_protocol_flag() {
        let mut owner_acc = TestAccount::wallet(0);
        let (mut agent_acc, mut config_acc) = accounts(owner_acc.key, 50, FLOOR + 50);

        let (agent_info, config_info) = (agent_acc.info(), config_acc.info());
        let owner = owner_acc.info();
        let mut agent = Account::<Agent>::try_from(&agent_info).unwrap();
        let mut config = Account::<ProtocolConfig>::try_from(&config_info).unwrap();
        agent.transfer_locked = true;

        assert_eq!(
            withdraw_to_owner(&mut agent, &mut config, &owner, FLOOR).unwrap_err(),
            EscrowError::ReentrancyDetected.into()
        );
        assert!(!config.reentrancy_locked);
        assert_eq!(agent.available_balance, 50);
    }
}
