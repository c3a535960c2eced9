use solana_program_test::{tokio, ProgramTestContext};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use up_only::error::UpOnlyError;

mod utils;

async fn initialized(cap: Option<u64>) -> (ProgramTestContext, Pubkey, Pubkey) {
    let mut context = utils::start().await;
    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    let ix = match cap {
        Some(cap) => utils::initialize_capped_ix(alice, cap),
        None => utils::initialize_ix(alice),
    };
    utils::send(&mut context, &[ix], &[]).await.unwrap();

    (context, alice, counter_pda)
}

#[tokio::test]
async fn increase_counter() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, Some(5))], &[])
        .await
        .unwrap();

    let view = utils::read_counter(&mut context, counter_pda).await.unwrap();
    assert_eq!((view.authority, view.value), (alice, 5));
}

#[tokio::test]
async fn increment_without_delta_adds_one() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, None)], &[])
        .await
        .unwrap();
    utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, None)], &[])
        .await
        .unwrap();

    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 2);
}

#[tokio::test]
async fn successive_increments_strictly_increase() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    let mut last = 0;
    for delta in [1, 2, 3, 100] {
        utils::send(
            &mut context,
            &[utils::increment_ix(alice, counter_pda, Some(delta))],
            &[],
        )
        .await
        .unwrap();
        let value = utils::get_counter(&mut context, counter_pda).await.value;
        assert!(value > last);
        assert_eq!(value, last + delta);
        last = value;
    }
}

#[tokio::test]
async fn increments_in_one_transaction_apply_in_order() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    utils::send(
        &mut context,
        &[
            utils::increment_ix(alice, counter_pda, Some(2)),
            utils::increment_ix(alice, counter_pda, None),
            utils::increment_ix(alice, counter_pda, Some(7)),
        ],
        &[],
    )
    .await
    .unwrap();

    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 10);
}

#[tokio::test]
async fn failing_instruction_rolls_back_whole_transaction() {
    let (mut context, alice, counter_pda) = initialized(None).await;
    let before = utils::counter_data(&mut context, counter_pda).await;

    let result = utils::send(
        &mut context,
        &[
            utils::increment_ix(alice, counter_pda, Some(3)),
            utils::increment_ix(alice, counter_pda, Some(0)),
        ],
        &[],
    )
    .await;
    let err = result.expect_err("transaction should fail").unwrap();
    assert_eq!(
        err,
        solana_sdk::transaction::TransactionError::InstructionError(
            1,
            solana_sdk::instruction::InstructionError::Custom(UpOnlyError::InvalidDelta.code()),
        )
    );

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
}

#[tokio::test]
async fn other_signer_is_unauthorized() {
    let (mut context, alice, counter_pda) = initialized(None).await;
    let before = utils::counter_data(&mut context, counter_pda).await;

    let bob = Keypair::new();
    let result = utils::send(
        &mut context,
        &[utils::increment_ix(bob.pubkey(), counter_pda, Some(1))],
        &[&bob],
    )
    .await;
    utils::assert_program_error(result, UpOnlyError::Unauthorized);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
    let view = utils::read_counter(&mut context, counter_pda).await.unwrap();
    assert_eq!((view.authority, view.value), (alice, 0));
}

#[tokio::test]
async fn authority_must_sign_increment() {
    let mut context = utils::start().await;

    // alice is funded so she can create her counter, then the payer submits
    // an increment naming her without her signature
    let alice = Keypair::new();
    let (counter_pda, _bump) = utils::counter_pda(alice.pubkey());
    let fund = solana_sdk::system_instruction::transfer(
        &context.payer.pubkey(),
        &alice.pubkey(),
        1_000_000_000,
    );
    utils::send(
        &mut context,
        &[fund, utils::initialize_ix(alice.pubkey())],
        &[&alice],
    )
    .await
    .unwrap();

    let mut ix = utils::increment_ix(alice.pubkey(), counter_pda, Some(1));
    ix.accounts[0].is_signer = false;
    let result = utils::send(&mut context, &[ix], &[]).await;
    utils::assert_program_error(result, UpOnlyError::Unauthorized);

    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 0);
}

#[tokio::test]
async fn zero_delta_is_rejected() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    let result = utils::send(
        &mut context,
        &[utils::increment_ix(alice, counter_pda, Some(0))],
        &[],
    )
    .await;
    utils::assert_program_error(result, UpOnlyError::InvalidDelta);

    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 0);
}

#[tokio::test]
async fn overflow_is_rejected_without_wrapping() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    utils::send(
        &mut context,
        &[utils::increment_ix(alice, counter_pda, Some(u64::MAX - 1))],
        &[],
    )
    .await
    .unwrap();
    let before = utils::counter_data(&mut context, counter_pda).await;

    let result = utils::send(
        &mut context,
        &[utils::increment_ix(alice, counter_pda, Some(2))],
        &[],
    )
    .await;
    utils::assert_program_error(result, UpOnlyError::Overflow);
    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);

    utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, None)], &[])
        .await
        .unwrap();
    assert_eq!(
        utils::get_counter(&mut context, counter_pda).await.value,
        u64::MAX
    );
}

#[tokio::test]
async fn capped_counter_rejects_increment_past_cap() {
    let (mut context, alice, counter_pda) = initialized(Some(10)).await;

    utils::send(
        &mut context,
        &[utils::increment_ix(alice, counter_pda, Some(10))],
        &[],
    )
    .await
    .unwrap();
    let before = utils::counter_data(&mut context, counter_pda).await;

    let result = utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, None)], &[]).await;
    utils::assert_program_error(result, UpOnlyError::CapExceeded);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 10);
}

#[tokio::test]
async fn increment_uninitialized_counter_fails() {
    let mut context = utils::start().await;
    let alice = context.payer.pubkey();
    let (counter_pda, _bump) = utils::counter_pda(alice);

    let result = utils::send(
        &mut context,
        &[utils::increment_ix(alice, counter_pda, Some(1))],
        &[],
    )
    .await;
    utils::assert_program_error(result, UpOnlyError::NotInitialized);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, None);
}

#[tokio::test]
async fn increment_returns_new_value() {
    let (mut context, alice, counter_pda) = initialized(None).await;

    utils::send(&mut context, &[utils::increment_ix(alice, counter_pda, Some(4))], &[])
        .await
        .unwrap();

    let data = utils::simulate_return_data(
        &mut context,
        utils::increment_ix(alice, counter_pda, Some(3)),
        &[],
        8,
    )
    .await
    .unwrap();
    assert_eq!(u64::from_le_bytes(data.try_into().unwrap()), 7);

    // simulation does not commit
    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 4);
}

#[tokio::test]
async fn readonly_counter_is_rejected() {
    let (mut context, alice, counter_pda) = initialized(None).await;
    let before = utils::counter_data(&mut context, counter_pda).await;

    let mut ix = utils::increment_ix(alice, counter_pda, Some(5));
    ix.accounts[1].is_writable = false;

    let err = utils::simulate_return_data(&mut context, ix.clone(), &[], 8)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        solana_sdk::transaction::TransactionError::InstructionError(
            0,
            solana_sdk::instruction::InstructionError::Custom(UpOnlyError::InvalidAccount.code()),
        )
    );

    let result = utils::send(&mut context, &[ix], &[]).await;
    utils::assert_program_error(result, UpOnlyError::InvalidAccount);

    assert_eq!(utils::counter_data(&mut context, counter_pda).await, before);
    assert_eq!(utils::get_counter(&mut context, counter_pda).await.value, 0);
}
