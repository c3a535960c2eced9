use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::rent::Rent,
    sysvar::Sysvar,
};

use crate::{
    error::UpOnlyError,
    instruction::ProgramInstruction,
    state::{CounterAccount, CounterKind, COUNTER_SEED},
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = ProgramInstruction::unpack(instruction_data)?;

    match instruction {
        // 0: Initialize
        ProgramInstruction::Initialize => {
            msg!("Instruction: Initialize");
            process_initialize(program_id, accounts, CounterKind::Simple)
        }

        // 1: Increment
        ProgramInstruction::Increment { delta } => {
            msg!("Instruction: Increment");
            process_increment(program_id, accounts, delta)
        }

        // 2: Read
        ProgramInstruction::Read => {
            msg!("Instruction: Read");
            process_read(program_id, accounts)
        }

        // 3: InitializeCapped
        ProgramInstruction::InitializeCapped { cap } => {
            msg!("Instruction: InitializeCapped");
            process_initialize(program_id, accounts, CounterKind::Capped { cap })
        }
    }
}

/// Create the counter PDA of the signing authority and write a zeroed record.
pub fn process_initialize(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    kind: CounterKind,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let authority = next_account_info(accounts_iter)?;
    let counter_account = next_account_info(accounts_iter)?;
    let system_program_account = next_account_info(accounts_iter)?;

    if !authority.is_signer {
        msg!("Authority {} should be the signer", authority.key);
        return Err(ProgramError::MissingRequiredSignature);
    }

    let (counter_pda, bump) =
        Pubkey::find_program_address(&[COUNTER_SEED, authority.key.as_ref()], program_id);
    if counter_pda != *counter_account.key {
        msg!("Invalid seeds for PDA");
        return Err(UpOnlyError::InvalidAccount.into());
    }
    if !system_program::check_id(system_program_account.key) {
        msg!("Unexpected system program {}", system_program_account.key);
        return Err(UpOnlyError::InvalidAccount.into());
    }
    check_writable(counter_account)?;

    if counter_account.owner == program_id {
        if CounterAccount::is_initialized(&counter_account.try_borrow_data()?[..]) {
            msg!("Counter {} already initialized", counter_pda);
            return Err(UpOnlyError::AlreadyInitialized.into());
        }
        msg!("Counter {} is owned by the program but holds no record", counter_pda);
        return Err(UpOnlyError::InvalidAccount.into());
    }
    if !system_program::check_id(counter_account.owner) {
        msg!("Counter {} is owned by {}", counter_pda, counter_account.owner);
        return Err(UpOnlyError::InvalidAccount.into());
    }

    let counter = CounterAccount::new(*authority.key, bump, kind)?;

    let bump_seed = [bump];
    let signer_seeds: &[&[u8]] = &[COUNTER_SEED, authority.key.as_ref(), &bump_seed];
    create_counter_account(
        program_id,
        authority,
        counter_account,
        system_program_account,
        signer_seeds,
    )?;

    counter.pack(&mut counter_account.try_borrow_mut_data()?[..])?;
    msg!(
        "PDA {} value: {} authority: {}",
        counter_account.key,
        counter.value,
        counter.authority
    );

    Ok(())
}

/// Raise the counter by `delta`. The record is written only once the new
/// value has been fully validated.
pub fn process_increment(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    delta: u64,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let authority = next_account_info(accounts_iter)?;
    let counter_account = next_account_info(accounts_iter)?;

    let mut counter = load_counter(program_id, counter_account)?;
    check_writable(counter_account)?;

    if !authority.is_signer {
        msg!("Authority {} should be the signer", authority.key);
        return Err(UpOnlyError::Unauthorized.into());
    }

    let value = counter.increment(authority.key, delta)?;
    counter.pack(&mut counter_account.try_borrow_mut_data()?[..])?;
    msg!("PDA {} value: {}", counter_account.key, value);

    set_return_data(&value.to_le_bytes());
    Ok(())
}

pub fn process_read(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();
    let counter_account = next_account_info(accounts_iter)?;

    let counter = load_counter(program_id, counter_account)?;
    msg!(
        "PDA {} value: {} authority: {}",
        counter_account.key,
        counter.value,
        counter.authority
    );

    set_return_data(&borsh::to_vec(&counter.view())?);
    Ok(())
}

/// Decode a counter owned by this program and check it sits at its own PDA.
fn load_counter(
    program_id: &Pubkey,
    counter_account: &AccountInfo,
) -> Result<CounterAccount, ProgramError> {
    if counter_account.owner != program_id {
        msg!("Counter {} is not owned by the program", counter_account.key);
        return Err(UpOnlyError::NotInitialized.into());
    }

    let counter = CounterAccount::unpack(&counter_account.try_borrow_data()?[..])?;

    let expected = Pubkey::create_program_address(
        &[COUNTER_SEED, counter.authority.as_ref(), &[counter.bump]],
        program_id,
    )
    .map_err(|_| UpOnlyError::InvalidAccount)?;
    if expected != *counter_account.key {
        msg!("Invalid seeds for PDA");
        return Err(UpOnlyError::InvalidAccount.into());
    }

    Ok(counter)
}

fn check_writable(counter_account: &AccountInfo) -> ProgramResult {
    if !counter_account.is_writable {
        msg!("Counter {} should be writable", counter_account.key);
        return Err(UpOnlyError::InvalidAccount.into());
    }
    Ok(())
}

fn create_counter_account<'a>(
    program_id: &Pubkey,
    payer: &AccountInfo<'a>,
    counter_account: &AccountInfo<'a>,
    system_program_account: &AccountInfo<'a>,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    let rent_lamports = rent.minimum_balance(CounterAccount::SIZE);
    let current_lamports = counter_account.lamports();

    if current_lamports == 0 {
        msg!(
            "Initializing counter account {} with {} lamports",
            counter_account.key,
            rent_lamports
        );
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                counter_account.key,
                rent_lamports,
                CounterAccount::SIZE as u64,
                program_id,
            ),
            &[
                payer.clone(),
                counter_account.clone(),
                system_program_account.clone(),
            ],
            &[signer_seeds],
        )?;
        return Ok(());
    }

    // create_account refuses funded addresses, so build it in steps.
    msg!(
        "Counter account {} already holds {} lamports",
        counter_account.key,
        current_lamports
    );
    let top_up = rent_lamports.saturating_sub(current_lamports);
    if top_up > 0 {
        invoke(
            &system_instruction::transfer(payer.key, counter_account.key, top_up),
            &[
                payer.clone(),
                counter_account.clone(),
                system_program_account.clone(),
            ],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(counter_account.key, CounterAccount::SIZE as u64),
        &[counter_account.clone(), system_program_account.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(counter_account.key, program_id),
        &[counter_account.clone(), system_program_account.clone()],
        &[signer_seeds],
    )?;

    Ok(())
}
