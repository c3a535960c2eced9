use borsh::BorshDeserialize;
use solana_program::{msg, program_error::ProgramError};

use crate::state::DEFAULT_STEP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramInstruction {
    /// Create the counter PDA for the signing authority.
    ///
    /// Accounts: `[signer, writable] authority`, `[writable] counter`, `[] system_program`.
    Initialize,
    /// Raise the counter by `delta` (defaults to one step).
    ///
    /// Accounts: `[signer] authority`, `[writable] counter`.
    Increment { delta: u64 },
    /// Publish `(authority, value, kind)` as return data.
    ///
    /// Accounts: `[] counter`.
    Read,
    /// Same as `Initialize`, with an upper bound on the value.
    InitializeCapped { cap: u64 },
}

pub const INITIALIZE: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 0];
pub const INCREMENT: [u8; 8] = [1, 0, 0, 0, 0, 0, 0, 0];
pub const READ: [u8; 8] = [2, 0, 0, 0, 0, 0, 0, 0];
pub const INITIALIZE_CAPPED: [u8; 8] = [3, 0, 0, 0, 0, 0, 0, 0];

impl ProgramInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        if input.len() < 8 {
            msg!("Instruction data too short: {} byte(s)", input.len());
            return Err(ProgramError::InvalidInstructionData);
        }

        let (ix_discriminator, rest) = input.split_at(8);

        let ix_discriminator: [u8; 8] = ix_discriminator
            .try_into()
            .map_err(|_| ProgramError::InvalidInstructionData)?;

        Ok(match ix_discriminator {
            INITIALIZE => {
                expect_empty(rest)?;
                Self::Initialize
            }
            INCREMENT => {
                let delta = if rest.is_empty() {
                    DEFAULT_STEP
                } else {
                    u64::try_from_slice(rest)
                        .map_err(|_| ProgramError::InvalidInstructionData)?
                };
                Self::Increment { delta }
            }
            READ => {
                expect_empty(rest)?;
                Self::Read
            }
            INITIALIZE_CAPPED => {
                let cap =
                    u64::try_from_slice(rest).map_err(|_| ProgramError::InvalidInstructionData)?;
                Self::InitializeCapped { cap }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }
}

fn expect_empty(rest: &[u8]) -> Result<(), ProgramError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ProgramError::InvalidInstructionData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(discriminator: [u8; 8], payload: &[u8]) -> Vec<u8> {
        let mut data = discriminator.to_vec();
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn unpacks_initialize() {
        assert_eq!(
            ProgramInstruction::unpack(&INITIALIZE),
            Ok(ProgramInstruction::Initialize)
        );
    }

    #[test]
    fn increment_without_payload_uses_default_step() {
        assert_eq!(
            ProgramInstruction::unpack(&INCREMENT),
            Ok(ProgramInstruction::Increment { delta: DEFAULT_STEP })
        );
    }

    #[test]
    fn increment_reads_le_delta() {
        assert_eq!(
            ProgramInstruction::unpack(&data(INCREMENT, &5u64.to_le_bytes())),
            Ok(ProgramInstruction::Increment { delta: 5 })
        );
    }

    #[test]
    fn initialize_capped_requires_cap() {
        assert_eq!(
            ProgramInstruction::unpack(&data(INITIALIZE_CAPPED, &100u64.to_le_bytes())),
            Ok(ProgramInstruction::InitializeCapped { cap: 100 })
        );
        assert_eq!(
            ProgramInstruction::unpack(&INITIALIZE_CAPPED),
            Err(ProgramError::InvalidInstructionData)
        );
    }

    #[test]
    fn rejects_malformed_data() {
        // too short
        assert_eq!(
            ProgramInstruction::unpack(&[0, 0, 0]),
            Err(ProgramError::InvalidInstructionData)
        );
        // unknown discriminator
        assert_eq!(
            ProgramInstruction::unpack(&[9, 0, 0, 0, 0, 0, 0, 0]),
            Err(ProgramError::InvalidInstructionData)
        );
        // truncated delta
        assert_eq!(
            ProgramInstruction::unpack(&data(INCREMENT, &[1, 0, 0])),
            Err(ProgramError::InvalidInstructionData)
        );
        // trailing bytes
        assert_eq!(
            ProgramInstruction::unpack(&data(INCREMENT, &[1, 0, 0, 0, 0, 0, 0, 0, 9])),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            ProgramInstruction::unpack(&data(READ, &[1])),
            Err(ProgramError::InvalidInstructionData)
        );
    }
}
