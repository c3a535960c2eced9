use solana_program_test::tokio;
use solana_sdk::{
    account::Account,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use up_only::{
    error::UpOnlyError,
    state::{CounterAccount, CounterKind},
};

mod utils;

#[tokio::test]
async fn initialize_counter() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let (counter_pda, bump) = utils::counter_pda(alice);

    utils::send(&mut context, &[utils::initialize_ix(alice)], &[])
        .await
        .unwrap();

    let account = context
        .banks_client
        .get_account(counter_pda)
        .await
        .unwrap()
        .expect("counter account must exist");

    assert_eq!(account.owner, utils::PROGRAM);
    assert_eq!(account.data.len(), CounterAccount::SIZE);
    let rent = context.banks_client.get_rent().await.unwrap();
    assert!(rent.is_exempt(account.lamports, account.data.len()));

    let counter = CounterAccount::unpack(&account.data).unwrap();
    assert_eq!(counter.authority, alice);
    assert_eq!(counter.value, 0);
    assert_eq!(counter.bump, bump);
    assert_eq!(counter.kind, CounterKind::Simple);

    let view = utils::read_counter(&mut context, counter_pda).await.unwrap();
    assert_eq!((view.authority, view.value), (alice, 0));
}

#[tokio::test]
async fn second_initialize_fails_and_keeps_first_record() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    utils::send(&mut context, &[utils::initialize_ix(alice)], &[])
        .await
        .unwrap();
    utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, Some(4))], &[])
        .await
        .unwrap();
    let before = utils::counter_data(&mut context, counter_pda).await;

    let result = utils::send(&mut context, &[utils::initialize_ix(alice)], &[]).await;
    utils::assert_program_error(result, UpOnlyError::AlreadyInitialized);

    // a capped re-initialize is rejected the same way
    let result = utils::send(&mut context, &[utils::initialize_capped_ix(alice, 50)], &[]).await;
    utils::assert_program_error(result, UpOnlyError::AlreadyInitialized);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
    let counter = utils::get_counter(&mut context, counter_pda).await;
    assert_eq!((counter.authority, counter.value), (alice, 4));
}

#[tokio::test]
async fn initialize_capped_counter() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    utils::send(&mut context, &[utils::initialize_capped_ix(alice, 3)], &[])
        .await
        .unwrap();

    let counter = utils::get_counter(&mut context, counter_pda).await;
    assert_eq!(counter.value, 0);
    assert_eq!(counter.kind, CounterKind::Capped { cap: 3 });
}

#[tokio::test]
async fn zero_cap_is_rejected_without_creating_account() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    let result = utils::send(&mut context, &[utils::initialize_capped_ix(alice, 0)], &[]).await;
    utils::assert_program_error(result, UpOnlyError::InvalidCap);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, None);
}

#[tokio::test]
async fn counter_address_must_be_authority_pda() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let mut ix = utils::initialize_ix(alice);
    let (other_pda, _bump) = utils::counter_pda(Pubkey::new_unique());
    ix.accounts[1].pubkey = other_pda;

    let result = utils::send(&mut context, &[ix], &[]).await;
    utils::assert_program_error(result, UpOnlyError::InvalidAccount);
    assert_eq!(utils::counter_data(&mut context, other_pda).await, None);
}

#[tokio::test]
async fn system_program_must_be_genuine() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let mut ix = utils::initialize_ix(alice);
    ix.accounts[2].pubkey = utils::PROGRAM;

    let result = utils::send(&mut context, &[ix], &[]).await;
    utils::assert_program_error(result, UpOnlyError::InvalidAccount);
}

#[tokio::test]
async fn authority_must_sign_initialize() {
    let mut context = utils::start().await;

    let alice = Keypair::new();
    let mut ix = utils::initialize_ix(alice.pubkey());
    ix.accounts[0].is_signer = false;

    let result = utils::send(&mut context, &[ix], &[]).await;
    utils::assert_instruction_error(result, InstructionError::MissingRequiredSignature);
}

#[tokio::test]
async fn initialize_prefunded_counter_address() {
    let mut program_test = utils::program_test();

    let alice = Keypair::new();
    let (counter_pda, _bump) = utils::counter_pda(alice.pubkey());
    program_test.add_account(
        alice.pubkey(),
        Account {
            lamports: 1_000_000_000,
            ..Account::default()
        },
    );
    // someone sent lamports to the PDA before it was created
    program_test.add_account(
        counter_pda,
        Account {
            lamports: 1_000,
            ..Account::default()
        },
    );
    let mut context = program_test.start_with_context().await;

    utils::send(&mut context, &[utils::initialize_ix(alice.pubkey())], &[&alice])
        .await
        .unwrap();

    let account = context
        .banks_client
        .get_account(counter_pda)
        .await
        .unwrap()
        .expect("counter account must exist");
    assert_eq!(account.owner, utils::PROGRAM);
    assert_eq!(account.data.len(), CounterAccount::SIZE);
    let rent = context.banks_client.get_rent().await.unwrap();
    assert!(rent.is_exempt(account.lamports, account.data.len()));

    let counter = CounterAccount::unpack(&account.data).unwrap();
    assert_eq!((counter.authority, counter.value), (alice.pubkey(), 0));
}

#[tokio::test]
async fn readonly_counter_cannot_be_initialized() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);
    let mut ix = utils::initialize_ix(alice);
    ix.accounts[1].is_writable = false;

    let result = utils::send(&mut context, &[ix], &[]).await;
    utils::assert_program_error(result, UpOnlyError::InvalidAccount);
    assert_eq!(utils::counter_data(&mut context, counter_pda).await, None);
}

#[tokio::test]
async fn reinitialize_with_zero_cap_reports_already_initialized() {
    let mut context = utils::start().await;

    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    utils::send(&mut context, &[utils::initialize_ix(alice)], &[])
        .await
        .unwrap();
    let before = utils::counter_data(&mut context, counter_pda).await;

    let result = utils::send(&mut context, &[utils::initialize_capped_ix(alice, 0)], &[]).await;
    utils::assert_program_error(result, UpOnlyError::AlreadyInitialized);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
}
