use solana_program_test::tokio;
use solana_sdk::{
    account::Account,
    instruction::InstructionError,
    signature::Signer,
    transaction::TransactionError,
};
use up_only::{
    error::UpOnlyError,
    state::{CounterAccount, CounterKind},
};

mod utils;

fn custom(err: UpOnlyError) -> TransactionError {
    TransactionError::InstructionError(0, InstructionError::Custom(err.code()))
}

#[tokio::test]
async fn read_reports_authority_value_and_kind() {
    let mut context = utils::start().await;
    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    utils::send(
        &mut context,
        &[
            utils::initialize_capped_ix(alice, 1_000),
            utils::increment_ix(alice, counter_pda, Some(256)),
        ],
        &[],
    )
    .await
    .unwrap();

    let view = utils::read_counter(&mut context, counter_pda).await.unwrap();
    assert_eq!(view.authority, alice);
    assert_eq!(view.value, 256);
    assert_eq!(view.kind, CounterKind::Capped { cap: 1_000 });
}

#[tokio::test]
async fn read_does_not_modify_counter() {
    let mut context = utils::start().await;
    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    utils::send(&mut context, &[utils::initialize_ix(alice)], &[])
        .await
        .unwrap();
    let before = utils::counter_data(&mut context, counter_pda).await;

    utils::send(&mut context, &[utils::read_ix(counter_pda)], &[])
        .await
        .unwrap();

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
}

#[tokio::test]
async fn read_missing_counter_fails() {
    let mut context = utils::start().await;
    let (counter_pda, _bump) = utils::counter_pda(context.payer.pubkey());

    let err = utils::read_counter(&mut context, counter_pda)
        .await
        .unwrap_err();
    assert_eq!(err, custom(UpOnlyError::NotInitialized));
}

#[tokio::test]
async fn read_rejects_foreign_or_malformed_accounts() {
    let mut program_test = utils::program_test();

    let foreign = solana_sdk::pubkey::Pubkey::new_unique();
    let mut data = vec![0u8; CounterAccount::SIZE];
    data[..8].copy_from_slice(&CounterAccount::DISCRIMINATOR);
    program_test.add_account(
        foreign,
        Account {
            lamports: 1_000_000,
            data: data.clone(),
            owner: solana_sdk::pubkey::Pubkey::new_unique(),
            ..Account::default()
        },
    );

    let garbage = solana_sdk::pubkey::Pubkey::new_unique();
    program_test.add_account(
        garbage,
        Account {
            lamports: 1_000_000,
            data: vec![0xff; CounterAccount::SIZE],
            owner: utils::PROGRAM,
            ..Account::default()
        },
    );
    let mut context = program_test.start_with_context().await;

    let err = utils::read_counter(&mut context, foreign).await.unwrap_err();
    assert_eq!(err, custom(UpOnlyError::NotInitialized));

    let err = utils::read_counter(&mut context, garbage).await.unwrap_err();
    assert_eq!(err, custom(UpOnlyError::NotInitialized));
}

#[tokio::test]
async fn read_rejects_record_away_from_its_pda() {
    let mut context = utils::start().await;
    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    utils::send(&mut context, &[utils::initialize_ix(alice)], &[])
        .await
        .unwrap();
    let data = utils::counter_data(&mut context, counter_pda).await.unwrap();

    // a well-formed record copied to an address the program never derived
    let copy = solana_sdk::pubkey::Pubkey::new_unique();
    context.set_account(
        &copy,
        &Account {
            lamports: 1_000_000,
            data,
            owner: utils::PROGRAM,
            ..Account::default()
        }
        .into(),
    );

    let err = utils::read_counter(&mut context, copy).await.unwrap_err();
    assert_eq!(err, custom(UpOnlyError::InvalidAccount));
}
