#![allow(unexpected_cfgs)]

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint; // entrypoint where the Solana program process starts
pub mod error; // program error codes surfaced as ProgramError::Custom
pub mod instruction; // instruction discriminators and payload decoding
pub mod processor; // account checks and state transitions per instruction
pub mod state; // on-chain counter record and its up-only rules

pub use crate::processor::process_instruction;
