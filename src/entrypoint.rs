use crate::processor;
use solana_program::{
    account_info::AccountInfo, entrypoint, entrypoint::ProgramResult, msg, pubkey::Pubkey,
};

// declare and export the program's entrypoint
entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    msg!(
        "process_instruction: Program {} is executed with {} account(s) and {} byte(s) of data",
        program_id,
        accounts.len(),
        instruction_data.len()
    );
    processor::process_instruction(program_id, accounts, instruction_data)
}
