#![allow(dead_code)]

use borsh::BorshDeserialize;
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    instruction::{AccountMeta, Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
    transaction::{Transaction, TransactionError},
};
use up_only::{
    error::UpOnlyError,
    instruction::{INCREMENT, INITIALIZE, INITIALIZE_CAPPED, READ},
    state::{CounterAccount, CounterView, COUNTER_SEED},
};

pub const PROGRAM: Pubkey = Pubkey::new_from_array([7u8; 32]);

pub fn program_test() -> ProgramTest {
    ProgramTest::new(
        "up_only",
        PROGRAM,
        processor!(up_only::process_instruction),
    )
}

pub async fn start() -> ProgramTestContext {
    program_test().start_with_context().await
}

pub fn counter_pda(authority: Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[COUNTER_SEED, authority.as_ref()], &PROGRAM)
}

pub fn initialize_ix(authority: Pubkey) -> Instruction {
    let (counter, _bump) = counter_pda(authority);
    Instruction {
        program_id: PROGRAM,
        accounts: vec![
            AccountMeta::new(authority, true),
            AccountMeta::new(counter, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: INITIALIZE.to_vec(),
    }
}

pub fn initialize_capped_ix(authority: Pubkey, cap: u64) -> Instruction {
    let mut ix = initialize_ix(authority);
    ix.data = INITIALIZE_CAPPED.to_vec();
    ix.data.extend_from_slice(&cap.to_le_bytes());
    ix
}

/// `None` sends the bare discriminator so the program applies its default step.
pub fn increment_ix(signer: Pubkey, counter: Pubkey, delta: Option<u64>) -> Instruction {
    let mut data = INCREMENT.to_vec();
    if let Some(delta) = delta {
        data.extend_from_slice(&delta.to_le_bytes());
    }
    Instruction {
        program_id: PROGRAM,
        accounts: vec![
            AccountMeta::new_readonly(signer, true),
            AccountMeta::new(counter, false),
        ],
        data,
    }
}

pub fn read_ix(counter: Pubkey) -> Instruction {
    Instruction {
        program_id: PROGRAM,
        accounts: vec![AccountMeta::new_readonly(counter, false)],
        data: READ.to_vec(),
    }
}

/// Sign with the context payer plus `signers` on a fresh blockhash, so that
/// repeating an identical instruction is never deduplicated.
pub async fn send(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let blockhash = context.get_new_latest_blockhash().await.unwrap();
    let mut all_signers = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &all_signers,
        blockhash,
    );
    context.banks_client.process_transaction(tx).await
}

pub fn assert_program_error(result: Result<(), BanksClientError>, expected: UpOnlyError) {
    assert_instruction_error(result, InstructionError::Custom(expected.code()));
}

pub fn assert_instruction_error(result: Result<(), BanksClientError>, expected: InstructionError) {
    let err = result.expect_err("transaction should fail").unwrap();
    assert_eq!(err, TransactionError::InstructionError(0, expected));
}

pub async fn counter_data(context: &mut ProgramTestContext, counter: Pubkey) -> Option<Vec<u8>> {
    context
        .banks_client
        .get_account(counter)
        .await
        .unwrap()
        .map(|account| account.data)
}

pub async fn get_counter(context: &mut ProgramTestContext, counter: Pubkey) -> CounterAccount {
    let data = counter_data(context, counter)
        .await
        .expect("counter account must exist");
    CounterAccount::unpack(&data).unwrap()
}

/// Simulate `instruction` and return the program's return data.
///
/// The bank strips trailing zero bytes from return data, so it is padded back
/// to `len` before decoding.
pub async fn simulate_return_data(
    context: &mut ProgramTestContext,
    instruction: Instruction,
    signers: &[&Keypair],
    len: usize,
) -> Result<Vec<u8>, TransactionError> {
    let mut all_signers = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let tx = Transaction::new_signed_with_payer(
        &[instruction],
        Some(&context.payer.pubkey()),
        &all_signers,
        context.last_blockhash,
    );
    let simulation = context.banks_client.simulate_transaction(tx).await.unwrap();
    simulation.result.expect("simulation must run")?;

    let return_data = simulation
        .simulation_details
        .and_then(|details| details.return_data)
        .expect("program must set return data");
    assert_eq!(return_data.program_id, PROGRAM);

    let mut data = return_data.data;
    data.resize(len, 0);
    Ok(data)
}

pub async fn read_counter(
    context: &mut ProgramTestContext,
    counter: Pubkey,
) -> Result<CounterView, TransactionError> {
    // largest view: authority + value + capped kind
    let data = simulate_return_data(context, read_ix(counter), &[], 32 + 8 + 1 + 8).await?;
    Ok(CounterView::deserialize(&mut &data[..]).unwrap())
}
