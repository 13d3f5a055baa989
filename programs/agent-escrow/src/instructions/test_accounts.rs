//! In-memory accounts for exercising account-level helpers off-chain.

use anchor_lang::prelude::*;

/// Backing storage for one `AccountInfo`.
pub struct TestAccount {
    pub key: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
    pub writable: bool,
}

impl TestAccount {
    /// Program-owned account holding `state` in `space` bytes of data.
    pub fn program_owned<T: AccountSerialize>(state: &T, space: usize, lamports: u64) -> Self {
        let mut data = vec![0u8; space];
        let mut cursor: &mut [u8] = &mut data;
        state.try_serialize(&mut cursor).unwrap();
        Self {
            key: Pubkey::new_unique(),
            owner: crate::ID,
            lamports,
            data,
            writable: true,
        }
    }

    /// System-owned account without data.
    pub fn wallet(lamports: u64) -> Self {
        Self {
            key: Pubkey::new_unique(),
            owner: Pubkey::default(),
            lamports,
            data: Vec::new(),
            writable: true,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn owned_by(mut self, owner: Pubkey) -> Self {
        self.owner = owner;
        self
    }

    pub fn info(&mut self) -> AccountInfo<'_> {
        AccountInfo::new(
            &self.key,
            false,
            self.writable,
            &mut self.lamports,
            &mut self.data,
            &self.owner,
            false,
            0,
        )
    }
}

/// Deserializes the account state currently held by `info`.
pub fn load<T: AccountDeserialize>(info: &AccountInfo) -> T {
    let data = info.try_borrow_data().unwrap();
    T::try_deserialize(&mut &data[..]).unwrap()
}
