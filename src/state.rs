use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{entrypoint::ProgramResult, program_error::ProgramError, pubkey::Pubkey};

use crate::error::UpOnlyError;

pub const COUNTER_SEED: &[u8] = b"counter";

/// Step applied when `increment` carries no payload.
pub const DEFAULT_STEP: u64 = 1;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Simple,
    Capped { cap: u64 },
}

impl CounterKind {
    /// Highest value the counter may reach.
    pub fn limit(&self) -> u64 {
        match self {
            CounterKind::Simple => u64::MAX,
            CounterKind::Capped { cap } => *cap,
        }
    }
}

/// Counter record stored after the 8-byte discriminator.
///
/// `authority` and `kind` are written once by initialize. `value` only moves
/// through [`CounterAccount::increment`], which never lowers it.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CounterAccount {
    pub authority: Pubkey,
    pub value: u64,
    pub bump: u8,
    pub kind: CounterKind,
}

impl CounterAccount {
    pub const DISCRIMINATOR: [u8; 8] = *b"UPONLYCT";

    pub const SIZE: usize = 8 + // discriminator
        32 + // authority (Pubkey)
        8 +  // value (u64)
        1 +  // bump (u8)
        1 + 8; // kind (tag + cap)

    pub fn new(authority: Pubkey, bump: u8, kind: CounterKind) -> Result<Self, UpOnlyError> {
        if kind.limit() == 0 {
            return Err(UpOnlyError::InvalidCap);
        }
        Ok(Self {
            authority,
            value: 0,
            bump,
            kind,
        })
    }

    pub fn is_initialized(data: &[u8]) -> bool {
        data.len() >= Self::DISCRIMINATOR.len() && data[..8] == Self::DISCRIMINATOR
    }

    pub fn unpack(data: &[u8]) -> Result<Self, UpOnlyError> {
        if !Self::is_initialized(data) {
            return Err(UpOnlyError::NotInitialized);
        }
        // Trailing bytes are padding for the largest kind.
        let mut body = &data[8..];
        let counter =
            Self::deserialize(&mut body).map_err(|_| UpOnlyError::NotInitialized)?;
        if counter.value > counter.kind.limit() {
            return Err(UpOnlyError::NotInitialized);
        }
        Ok(counter)
    }

    pub fn pack(&self, dst: &mut [u8]) -> ProgramResult {
        if dst.len() < Self::SIZE {
            return Err(ProgramError::AccountDataTooSmall);
        }
        dst[..8].copy_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut &mut dst[8..])?;
        Ok(())
    }

    /// Advance the counter by `delta` on behalf of `signer`.
    ///
    /// Nothing is modified unless every check passes, so a rejected call
    /// leaves the record exactly as it was.
    pub fn increment(&mut self, signer: &Pubkey, delta: u64) -> Result<u64, UpOnlyError> {
        if *signer != self.authority {
            return Err(UpOnlyError::Unauthorized);
        }
        if delta == 0 {
            return Err(UpOnlyError::InvalidDelta);
        }
        let next = self
            .value
            .checked_add(delta)
            .ok_or(UpOnlyError::Overflow)?;
        if next > self.kind.limit() {
            return Err(UpOnlyError::CapExceeded);
        }
        self.value = next;
        Ok(next)
    }

    pub fn view(&self) -> CounterView {
        CounterView {
            authority: self.authority,
            value: self.value,
            kind: self.kind,
        }
    }
}

/// Return data of the `read` instruction.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CounterView {
    pub authority: Pubkey,
    pub value: u64,
    pub kind: CounterKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(authority: Pubkey) -> CounterAccount {
        CounterAccount::new(authority, 254, CounterKind::Simple).unwrap()
    }

    #[test]
    fn new_counter_starts_at_zero() {
        let alice = Pubkey::new_unique();
        let counter = simple(alice);
        assert_eq!(counter.authority, alice);
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let err = CounterAccount::new(Pubkey::new_unique(), 1, CounterKind::Capped { cap: 0 })
            .unwrap_err();
        assert_eq!(err, UpOnlyError::InvalidCap);
    }

    #[test]
    fn increments_are_strictly_increasing() {
        let alice = Pubkey::new_unique();
        let mut counter = simple(alice);
        let mut last = counter.value;
        for delta in [1, 5, 1, 1_000, 42] {
            let next = counter.increment(&alice, delta).unwrap();
            assert!(next > last);
            assert_eq!(next, last + delta);
            last = next;
        }
    }

    #[test]
    fn rejected_increments_leave_counter_untouched() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut counter = simple(alice);
        counter.increment(&alice, 7).unwrap();
        let before = counter.clone();

        assert_eq!(counter.increment(&bob, 1), Err(UpOnlyError::Unauthorized));
        assert_eq!(counter.increment(&alice, 0), Err(UpOnlyError::InvalidDelta));
        assert_eq!(
            counter.increment(&alice, u64::MAX),
            Err(UpOnlyError::Overflow)
        );
        assert_eq!(counter, before);
    }

    #[test]
    fn reaching_u64_max_is_allowed_but_not_beyond() {
        let alice = Pubkey::new_unique();
        let mut counter = simple(alice);
        assert_eq!(counter.increment(&alice, u64::MAX), Ok(u64::MAX));
        assert_eq!(counter.increment(&alice, 1), Err(UpOnlyError::Overflow));
        assert_eq!(counter.value, u64::MAX);
    }

    #[test]
    fn capped_counter_stops_at_cap() {
        let alice = Pubkey::new_unique();
        let mut counter =
            CounterAccount::new(alice, 1, CounterKind::Capped { cap: 10 }).unwrap();
        assert_eq!(counter.increment(&alice, 10), Ok(10));
        assert_eq!(counter.increment(&alice, 1), Err(UpOnlyError::CapExceeded));
        assert_eq!(counter.value, 10);
    }

    #[test]
    fn pack_then_unpack_in_padded_buffer() {
        let alice = Pubkey::new_unique();
        let mut counter = simple(alice);
        counter.increment(&alice, 3).unwrap();

        let mut data = vec![0u8; CounterAccount::SIZE];
        counter.pack(&mut data).unwrap();
        assert!(CounterAccount::is_initialized(&data));
        assert_eq!(CounterAccount::unpack(&data).unwrap(), counter);
    }

    #[test]
    fn capped_kind_fits_allocated_size() {
        let counter =
            CounterAccount::new(Pubkey::new_unique(), 1, CounterKind::Capped { cap: 9 }).unwrap();
        let mut data = vec![0u8; CounterAccount::SIZE];
        counter.pack(&mut data).unwrap();
        assert_eq!(borsh::to_vec(&counter).unwrap().len() + 8, CounterAccount::SIZE);
    }

    #[test]
    fn zeroed_or_short_data_is_not_initialized() {
        assert_eq!(
            CounterAccount::unpack(&[0u8; CounterAccount::SIZE]),
            Err(UpOnlyError::NotInitialized)
        );
        assert_eq!(
            CounterAccount::unpack(&CounterAccount::DISCRIMINATOR),
            Err(UpOnlyError::NotInitialized)
        );
        assert_eq!(CounterAccount::unpack(&[]), Err(UpOnlyError::NotInitialized));
    }

    #[test]
    fn pack_into_small_buffer_fails() {
        let counter = simple(Pubkey::new_unique());
        let mut data = vec![0u8; CounterAccount::SIZE - 1];
        assert_eq!(
            counter.pack(&mut data),
            Err(ProgramError::AccountDataTooSmall)
        );
    }
}
