//! Owner and pause checks

use anchor_lang::prelude::*;

use crate::errors::EscrowError;
use crate::state::ProtocolConfig;

/// Rejects the call while the protocol is paused.
pub fn require_not_paused(config: &ProtocolConfig) -> Result<()> {
    require!(!config.paused, EscrowError::ProtocolPaused);
    Ok(())
}

pub fn require_authority(config: &ProtocolConfig, caller: &Pubkey) -> Result<()> {
    require!(config.authority == *caller, EscrowError::Unauthorized);
    Ok(())
}

/// Flips the pause switch. Only the designated owner may call it, and
/// setting the switch to the value it already holds is rejected.
pub fn set_paused(config: &mut ProtocolConfig, caller: &Pubkey, paused: bool) -> Result<()> {
    require_authority(config, caller)?;
    require!(config.paused != paused, EscrowError::InvalidStatus);
    config.paused = paused;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_owned_by(authority: Pubkey) -> ProtocolConfig {
        ProtocolConfig {
            authority,
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_can_pause_and_unpause() {
        let owner = Pubkey::new_unique();
        let mut config = config_owned_by(owner);

        set_paused(&mut config, &owner, true).unwrap();
        assert!(config.paused);
        assert_eq!(
            require_not_paused(&config).unwrap_err(),
            EscrowError::ProtocolPaused.into()
        );

        set_paused(&mut config, &owner, false).unwrap();
        assert!(!config.paused);
        assert!(require_not_paused(&config).is_ok());
    }

    #[test]
    fn test_non_owner_cannot_pause() {
        let mut config = config_owned_by(Pubkey::new_unique());
        let stranger = Pubkey::new_unique();

        assert_eq!(
            set_paused(&mut config, &stranger, true).unwrap_err(),
            EscrowError::Unauthorized.into()
        );
        assert!(!config.paused);
    }

    #[test]
    fn test_pause_twice_is_rejected() {
        let owner = Pubkey::new_unique();
        let mut config = config_owned_by(owner);
        set_paused(&mut config, &owner, true).unwrap();

        assert_eq!(
            set_paused(&mut config, &owner, true).unwrap_err(),
            EscrowError::InvalidStatus.into()
        );
        assert!(config.paused);
    }
}
