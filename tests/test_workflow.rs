mod common;

use alloy::primitives::U256;
use alloy::sol_types::SolValue;
use common::*;
use farm_flow::actions::{
    AmountSource, Deposit, Exchange, Mow, Plant, RawCall, Shift, WrapEth,
};
use farm_flow::clipboard::{self, ClipboardRef};
use farm_flow::model::{Amount, FromMode, ToMode};
use farm_flow::workflow::{DecodeError, DecodedCall, DecodedResult, RunMode, StepOptions};
use farm_flow::{Action, ContractSet, FarmWorkflow, WorkflowError};

fn dai_to_bean_workflow(contracts: ContractSet) -> FarmWorkflow {
    let mut wf = FarmWorkflow::new("dai-to-bean", contracts);
    wf.add(Action::Exchange(Exchange {
        venue: curve_venue(),
        token_in: dai(),
        token_out: usdc(),
        from_mode: FromMode::External,
        to_mode: ToMode::Internal,
    }))
    .unwrap()
    .add(Action::Exchange(Exchange {
        venue: tricrypto_venue(),
        token_in: usdc(),
        token_out: bean(),
        from_mode: FromMode::InternalTolerant,
        to_mode: ToMode::External,
    }))
    .unwrap();
    wf
}

fn two_hop_quoter() -> MockQuoter {
    MockQuoter::new()
        // 1 DAI (18 dec) -> 1 USDC (6 dec)
        .with_rate(&curve_venue(), &dai(), &usdc(), 1, 1_000_000_000_000)
        // 1 USDC -> 2 BEAN
        .with_rate(&tricrypto_venue(), &usdc(), &bean(), 2, 1)
}

#[tokio::test]
async fn threads_each_output_into_the_next_input() {
    let quoter = two_hop_quoter();
    let wf = dai_to_bean_workflow(ContractSet::mainnet());
    let prepared = wf
        .build(Amount::from_human("100", 18).unwrap(), forward_opts(&quoter))
        .await
        .unwrap();

    assert_eq!(prepared.steps.len(), 2);
    let first_out = prepared.steps[0].amount_out.clone();
    assert_eq!(first_out.raw(), U256::from(100_000_000u64)); // 100 USDC

    match prepared.steps[1].decode().unwrap() {
        DecodedCall::Exchange { amount_in, .. } => assert_eq!(amount_in, first_out.raw()),
        other => panic!("unexpected call: {other:?}"),
    }
    // 200 BEAN out
    assert_eq!(prepared.amount_out.raw(), U256::from(200_000_000u64));
    assert_eq!(prepared.amount_out.decimals(), 6);
}

#[tokio::test]
async fn prepare_is_idempotent() {
    let quoter = two_hop_quoter();
    let wf = dai_to_bean_workflow(ContractSet::mainnet());
    let prepared = wf
        .build(Amount::from_human("100", 18).unwrap(), forward_opts(&quoter))
        .await
        .unwrap();
    for step in &prepared.steps {
        assert_eq!(step.prepare(), step.prepare());
    }
}

#[tokio::test]
async fn reverse_estimate_matches_forward_and_reads_forward() {
    let quoter = two_hop_quoter();
    let wf = dai_to_bean_workflow(ContractSet::mainnet());

    let desired = Amount::from_human("200", 6).unwrap(); // 200 BEAN
    let reversed = wf
        .build(
            desired.clone(),
            opts(RunMode::ReverseEstimate, Some(0.5), &quoter),
        )
        .await
        .unwrap();

    // required input is 100 DAI
    assert_eq!(reversed.amount_out, Amount::from_human("100", 18).unwrap());

    // steps are presented in forward order with forward amounts
    assert_eq!(reversed.steps[0].amount_out.raw(), U256::from(100_000_000u64));
    assert_eq!(reversed.steps[1].amount_out, desired);
    match reversed.steps[0].decode().unwrap() {
        DecodedCall::Exchange {
            token_in, amount_in, ..
        } => {
            assert_eq!(token_in, dai().address);
            assert_eq!(amount_in, U256::from(10u64).pow(U256::from(20u64)));
        }
        other => panic!("unexpected call: {other:?}"),
    }

    // the final hop's minimum out guards the requested target amount
    match reversed.steps[1].decode().unwrap() {
        DecodedCall::Exchange { min_amount_out, .. } => {
            // 0.5% under 200 BEAN
            assert_eq!(min_amount_out, U256::from(199_000_000u64));
        }
        other => panic!("unexpected call: {other:?}"),
    }

    // feeding the required input forward reproduces the desired output
    let forward = wf
        .build(reversed.amount_out.clone(), forward_opts(&quoter))
        .await
        .unwrap();
    assert_eq!(forward.amount_out, desired);
}

#[tokio::test]
async fn execution_returns_decode_step_by_step() {
    let quoter = MockQuoter::new().with_rate(&well_venue(), &weth(), &bean(), 1, 1);
    let contracts = ContractSet::mainnet();
    let mut wf = FarmWorkflow::new("approve-and-shift", contracts.clone());
    wf.add(Action::Approve(farm_flow::actions::Approve {
        token: weth(),
        spender: well_venue().pool,
    }))
    .unwrap()
    .add(Action::Shift(Shift {
        venue: well_venue(),
        token_in: weth(),
        token_out: bean(),
        recipient: contracts.pipeline,
    }))
    .unwrap();
    let prepared = wf
        .build(Amount::from_human("1", 18).unwrap(), forward_opts(&quoter))
        .await
        .unwrap();

    let shifted = U256::from(987_654u64);
    let returns = vec![true.abi_encode().into(), shifted.abi_encode().into()];
    let results = prepared.decode_results(&returns).unwrap();
    assert_eq!(results[0], DecodedResult::Bool(true));
    assert_eq!(results[1], DecodedResult::Amount(shifted));

    let err = prepared.decode_results(&returns[..1]).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::LengthMismatch { expected: 2, got: 1 }
    ));
}

#[tokio::test]
async fn shift_refuses_reverse_estimation() {
    let quoter = MockQuoter::new().with_rate(&well_venue(), &weth(), &bean(), 1, 1);
    let mut wf = FarmWorkflow::new("shift", ContractSet::mainnet());
    wf.add(Action::Shift(Shift {
        venue: well_venue(),
        token_in: weth(),
        token_out: bean(),
        recipient: ContractSet::mainnet().pipeline,
    }))
    .unwrap();

    let err = wf
        .build(
            Amount::from_human("1", 6).unwrap(),
            opts(RunMode::ReverseEstimate, Some(0.5), &quoter),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::NotInvertible { index: 0, ref name } if name == "shift"
    ));
}

#[tokio::test]
async fn missing_slippage_fails_before_any_quote() {
    let quoter = two_hop_quoter();
    let wf = dai_to_bean_workflow(ContractSet::mainnet());
    let err = wf
        .build(
            Amount::from_human("100", 18).unwrap(),
            opts(RunMode::Forward, None, &quoter),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::MissingSlippage { index: 0, .. }));
    assert_eq!(quoter.call_count(), 0);
}

#[test]
fn duplicate_tags_are_rejected_when_added() {
    let mut wf = FarmWorkflow::new("tags", ContractSet::mainnet());
    wf.add_tagged(Action::Plant(Plant {}), "claim").unwrap();
    let err = wf
        .add_tagged(Action::Plant(Plant {}), "claim")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateTag { ref tag } if tag == "claim"));
}

#[tokio::test]
async fn unknown_tag_fails_at_build() {
    let quoter = MockQuoter::new();
    let mut wf = FarmWorkflow::new("tags", ContractSet::mainnet());
    wf.add(Action::Deposit(Deposit {
        token: bean(),
        from_mode: FromMode::Internal,
        amount_source: AmountSource::Tag {
            tag: "nope".into(),
            copy_slot: 0,
        },
    }))
    .unwrap();
    let err = wf
        .build(Amount::from_human("1", 6).unwrap(), forward_opts(&quoter))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownTag { ref tag, .. } if tag == "nope"));
}

#[tokio::test]
async fn tag_source_splices_planted_amount_into_deposit() {
    let quoter = MockQuoter::new();
    let mut wf = FarmWorkflow::new("plant-and-deposit", ContractSet::mainnet());
    wf.add_tagged(Action::Plant(Plant {}), "planted")
        .unwrap()
        .add(Action::Deposit(Deposit {
            token: bean(),
            from_mode: FromMode::Internal,
            amount_source: AmountSource::Tag {
                tag: "planted".into(),
                copy_slot: 0,
            },
        }))
        .unwrap();

    let prepared = wf
        .build(Amount::zero(6), forward_opts(&quoter))
        .await
        .unwrap();

    let clip = clipboard::decode(&prepared.steps[1].prepare().clipboard).unwrap();
    assert_eq!(clip.refs, vec![ClipboardRef::slot(0, 0, 1)]);
    // exact wire bytes: single-param header, copy byte 0x20, paste byte 0x44
    let expected = hex::decode(concat!(
        "0100",
        "0000",
        "00000000000000000000",
        "00000000000000000020",
        "00000000000000000044",
    ))
    .unwrap();
    assert_eq!(prepared.steps[1].prepare().clipboard.as_ref(), &expected[..]);
    match prepared.steps[1].decode().unwrap() {
        DecodedCall::Deposit { amount, .. } => assert_eq!(amount, U256::MAX),
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn skipped_steps_occupy_no_index() {
    let quoter = MockQuoter::new();
    let mut wf = FarmWorkflow::new("skips", ContractSet::mainnet());
    wf.add_with(
        Action::Mow(Mow {
            account: ContractSet::mainnet().pipeline,
            token: bean(),
        }),
        StepOptions {
            skip: true,
            ..StepOptions::default()
        },
    )
    .unwrap()
    .add_tagged(Action::Plant(Plant {}), "planted")
    .unwrap()
    .add(Action::Deposit(Deposit {
        token: bean(),
        from_mode: FromMode::Internal,
        amount_source: AmountSource::Tag {
            tag: "planted".into(),
            copy_slot: 0,
        },
    }))
    .unwrap();

    let prepared = wf
        .build(Amount::zero(6), forward_opts(&quoter))
        .await
        .unwrap();
    assert_eq!(prepared.steps.len(), 2);
    // the tag resolves to the realized index, not the generator index
    let clip = clipboard::decode(&prepared.steps[1].prepare().clipboard).unwrap();
    assert_eq!(clip.refs[0].copy_from_step_index, 0);
}

#[tokio::test]
async fn only_execute_steps_are_left_out_of_estimates() {
    let quoter = MockQuoter::new();
    let mut wf = FarmWorkflow::new("mow-on-execute", ContractSet::mainnet());
    wf.add(Action::Plant(Plant {}))
        .unwrap()
        .add_with(
            Action::Mow(Mow {
                account: ContractSet::mainnet().pipeline,
                token: bean(),
            }),
            StepOptions {
                only_execute: true,
                ..StepOptions::default()
            },
        )
        .unwrap();

    let estimate = wf
        .build(Amount::zero(6), forward_opts(&quoter))
        .await
        .unwrap();
    assert_eq!(estimate.steps.len(), 1);

    let execute = wf
        .build(Amount::zero(6), opts(RunMode::Execute, Some(0.5), &quoter))
        .await
        .unwrap();
    assert_eq!(execute.steps.len(), 2);
}

#[tokio::test]
async fn wrap_attaches_and_accumulates_native_value() {
    let quoter = MockQuoter::new();
    let mut wf = FarmWorkflow::new("wrap-and-deposit", ContractSet::mainnet());
    wf.add(Action::WrapEth(WrapEth {
        to_mode: ToMode::Internal,
    }))
    .unwrap()
    .add(Action::Deposit(Deposit {
        token: weth(),
        from_mode: FromMode::Internal,
        amount_source: AmountSource::Flow,
    }))
    .unwrap();

    let one_eth = Amount::from_human("1", 18).unwrap();
    let prepared = wf
        .build(one_eth.clone(), forward_opts(&quoter))
        .await
        .unwrap();
    assert_eq!(prepared.steps[0].value, Some(one_eth.clone()));
    assert_eq!(prepared.total_value, one_eth);
}

#[tokio::test]
async fn tag_on_a_later_step_cannot_feed_an_earlier_one() {
    let quoter = MockQuoter::new();
    let mut wf = FarmWorkflow::new("backwards", ContractSet::mainnet());
    wf.add(Action::Deposit(Deposit {
        token: bean(),
        from_mode: FromMode::Internal,
        amount_source: AmountSource::Tag {
            tag: "later".into(),
            copy_slot: 0,
        },
    }))
    .unwrap()
    .add_tagged(Action::Plant(Plant {}), "later")
    .unwrap();

    let err = wf
        .build(Amount::zero(6), forward_opts(&quoter))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::ForwardClipboardRef { index: 0, copy_from: 1, .. }
    ));
}

#[tokio::test]
async fn clipboard_violations_surface_before_any_quote() {
    let quoter = two_hop_quoter();
    let mut wf = FarmWorkflow::new("backwards-after-swap", ContractSet::mainnet());
    wf.add(Action::Exchange(Exchange {
        venue: curve_venue(),
        token_in: dai(),
        token_out: usdc(),
        from_mode: FromMode::External,
        to_mode: ToMode::Internal,
    }))
    .unwrap()
    .add(Action::Deposit(Deposit {
        token: usdc(),
        from_mode: FromMode::Internal,
        amount_source: AmountSource::Tag {
            tag: "later".into(),
            copy_slot: 0,
        },
    }))
    .unwrap()
    .add_tagged(Action::Plant(Plant {}), "later")
    .unwrap();

    let err = wf
        .build(Amount::from_human("100", 18).unwrap(), forward_opts(&quoter))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::ForwardClipboardRef { index: 1, copy_from: 2, .. }
    ));
    // the violation is structural, so the swap ahead of it never quoted
    assert_eq!(quoter.call_count(), 0);
}

#[test]
fn raw_call_with_dangling_clipboard_is_rejected_when_added() {
    let mut wf = FarmWorkflow::new("raw", ContractSet::mainnet());
    let err = wf
        .add(Action::Raw(RawCall {
            name: "custom".into(),
            target: ContractSet::mainnet().diamond,
            call_data: vec![0xde, 0xad, 0xbe, 0xef].into(),
            clipboard: clipboard::encode_slot(0, 0, 0),
        }))
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::ForwardClipboardRef { index: 0, copy_from: 0, .. }
    ));
}
