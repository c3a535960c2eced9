use solana_program::{msg, program_error::ProgramError};
use thiserror::Error;

/// Errors returned by the up-only program.
///
/// Discriminants are stable: clients match on `ProgramError::Custom(code)`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum UpOnlyError {
    #[error("Counter already initialized")]
    AlreadyInitialized = 0,
    #[error("Counter not initialized")]
    NotInitialized = 1,
    #[error("Signer is not the counter authority")]
    Unauthorized = 2,
    #[error("Counter overflow")]
    Overflow = 3,
    #[error("Invalid counter account")]
    InvalidAccount = 4,
    #[error("Increment must be greater than zero")]
    InvalidDelta = 5,
    #[error("Cap must be greater than zero")]
    InvalidCap = 6,
    #[error("Counter cap exceeded")]
    CapExceeded = 7,
}

impl UpOnlyError {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl From<UpOnlyError> for ProgramError {
    fn from(e: UpOnlyError) -> Self {
        msg!("Error: {}", e);
        ProgramError::Custom(e.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_custom_program_error() {
        assert_eq!(
            ProgramError::from(UpOnlyError::AlreadyInitialized),
            ProgramError::Custom(0)
        );
        assert_eq!(
            ProgramError::from(UpOnlyError::CapExceeded),
            ProgramError::Custom(7)
        );
    }

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            UpOnlyError::Unauthorized.to_string(),
            "Signer is not the counter authority"
        );
    }
}
