//! Behavioral tests for building and resolving transactions.

mod mock;

mod pipeline_tests {
    use super::mock::{id, reference, MockLedger};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use sui_txn_builder::api::{
        DryRunTransactionBlockResponse, GasCostSummary, SuiMoveNormalizedFunction,
        SuiMoveNormalizedType,
    };
    use sui_txn_builder::transaction::{GasConfig, Input, TransactionOverrides, TransactionState};
    use sui_txn_builder::{BuildOptions, BuilderError, ResolveConfig, Transaction};
    use sui_txn_types::transaction::TransactionDataV1;
    use sui_txn_types::{ObjectArg, SuiAddress, TransactionData, TransactionDigest};

    fn sender() -> SuiAddress {
        SuiAddress::new([0xa1; 32])
    }

    fn tx_context() -> SuiMoveNormalizedType {
        SuiMoveNormalizedType::MutableReference(Box::new(SuiMoveNormalizedType::datatype(
            "0x2",
            "tx_context",
            "TxContext",
        )))
    }

    fn consume_fn() -> SuiMoveNormalizedFunction {
        SuiMoveNormalizedFunction::new(vec![
            SuiMoveNormalizedType::datatype("0x2", "pool", "Pool"),
            tx_context(),
        ])
    }

    fn options(ledger: &Arc<MockLedger>) -> BuildOptions {
        BuildOptions::new().with_client(ledger.clone())
    }

    #[tokio::test]
    async fn owned_object_resolves_to_fetched_reference() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_owned_object(7, 42, sender())
                .with_function("pool", "consume", consume_fn()),
        );
        let mut tx = Transaction::new();
        let pool = tx.object(id(7)).unwrap();
        tx.move_call("0x2::pool::consume", &[], vec![pool]).unwrap();

        tx.build(&options(&ledger).kind_only()).await.unwrap();

        assert_eq!(
            tx.data().inputs[0],
            Input::Object(ObjectArg::ImmOrOwnedObject(reference(7, 42)))
        );
        assert_eq!(ledger.function_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shared_object_used_by_value_is_mutable() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_shared_object(7, 42, 3)
                .with_function("pool", "consume", consume_fn()),
        );
        let mut tx = Transaction::new();
        let pool = tx.object(id(7)).unwrap();
        tx.move_call("0x2::pool::consume", &[], vec![pool]).unwrap();

        tx.build(&options(&ledger).kind_only()).await.unwrap();

        assert_eq!(
            tx.data().inputs[0],
            Input::Object(ObjectArg::SharedObject {
                id: id(7),
                initial_shared_version: 3,
                mutable: true,
            })
        );
    }

    #[tokio::test]
    async fn shared_object_behind_immutable_reference_stays_immutable() {
        let read = SuiMoveNormalizedFunction::new(vec![SuiMoveNormalizedType::Reference(
            Box::new(SuiMoveNormalizedType::datatype("0x2", "pool", "Pool")),
        )]);
        let ledger = Arc::new(
            MockLedger::new()
                .with_shared_object(7, 42, 3)
                .with_function("pool", "read", read),
        );
        let mut tx = Transaction::new();
        let pool = tx.object(id(7)).unwrap();
        tx.move_call("0x2::pool::read", &[], vec![pool]).unwrap();

        tx.build(&options(&ledger).kind_only()).await.unwrap();

        assert!(matches!(
            tx.data().inputs[0],
            Input::Object(ObjectArg::SharedObject { mutable: false, .. })
        ));
    }

    #[tokio::test]
    async fn receiving_parameter_produces_receiving_reference() {
        let receive = SuiMoveNormalizedFunction::new(vec![
            SuiMoveNormalizedType::MutableReference(Box::new(SuiMoveNormalizedType::datatype(
                "0x2", "pool", "Pool",
            ))),
            SuiMoveNormalizedType::Struct {
                address: "0x2".to_string(),
                module: "transfer".to_string(),
                name: "Receiving".to_string(),
                type_arguments: vec![SuiMoveNormalizedType::datatype("0x2", "coin", "Coin")],
            },
        ]);
        let ledger = Arc::new(
            MockLedger::new()
                .with_owned_object(7, 42, sender())
                .with_owned_object(8, 9, sender())
                .with_function("pool", "receive", receive),
        );
        let mut tx = Transaction::new();
        let pool = tx.object(id(7)).unwrap();
        let coin = tx.object(id(8)).unwrap();
        tx.move_call("0x2::pool::receive", &[], vec![pool, coin])
            .unwrap();

        tx.build(&options(&ledger).kind_only()).await.unwrap();

        assert_eq!(
            tx.data().inputs[1],
            Input::Object(ObjectArg::Receiving(reference(8, 9)))
        );
    }

    #[tokio::test]
    async fn split_and_transfer_builds_full_transaction() {
        let ledger = Arc::new(MockLedger::new().with_coin(0xc0, 5, 10_000_000_000));
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let amount = tx.pure(json!("100")).unwrap();
        let recipient = tx.pure(json!("0xbeef")).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]).unwrap();
        tx.transfer_objects(vec![coin.nested_result(0)], recipient)
            .unwrap();

        let bytes = tx.build(&options(&ledger)).await.unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(tx.state(), TransactionState::Serialized);

        let digest = tx.get_digest(&options(&ledger)).await.unwrap();
        assert_eq!(digest, TransactionDigest::of_transaction_data(&bytes));
        let encoded = digest.to_base58();
        assert_eq!(
            TransactionDigest::from_base58(&encoded)
                .unwrap()
                .as_bytes()
                .len(),
            32
        );

        let TransactionData::V1(TransactionDataV1 { gas_data, .. }) =
            TransactionData::from_bytes(&bytes).unwrap();
        assert_eq!(gas_data.price, 1000);
        assert_eq!(gas_data.budget, 2_300_000);
        assert_eq!(gas_data.owner, sender());
        assert_eq!(gas_data.payment, vec![reference(0xc0, 5)]);

        assert_eq!(tx.data().inputs[0], Input::Pure(100u64.to_le_bytes().to_vec()));
        let mut address = [0u8; 32];
        address[30] = 0xbe;
        address[31] = 0xef;
        assert_eq!(tx.data().inputs[1], Input::Pure(address.to_vec()));
    }

    #[tokio::test]
    async fn simulation_runs_with_maximum_budget_and_no_payment() {
        let ledger = Arc::new(MockLedger::new().with_coin(0xc0, 5, 1));
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let amount = tx.pure_u64(1).unwrap();
        tx.split_coins(tx.gas(), vec![amount]).unwrap();

        tx.build(&options(&ledger)).await.unwrap();

        let simulated = ledger.dry_run_bytes.lock().unwrap()[0].clone();
        let TransactionData::V1(TransactionDataV1 { gas_data, .. }) =
            TransactionData::from_bytes(&simulated).unwrap();
        assert_eq!(gas_data.budget, 50_000_000_000);
        assert!(gas_data.payment.is_empty());
    }

    #[tokio::test]
    async fn budget_from_simulated_costs() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_gas_price(1)
                .with_coin(0xc0, 5, 1)
                .with_dry_run(DryRunTransactionBlockResponse::success(GasCostSummary::new(
                    1000, 500, 200,
                ))),
        );
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let amount = tx.pure_u64(1).unwrap();
        tx.split_coins(tx.gas(), vec![amount]).unwrap();

        tx.prepare(&options(&ledger)).await.unwrap();
        assert_eq!(tx.data().gas_data.budget, Some(2300));
        assert_eq!(tx.data().gas_data.price, Some(1));
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_shared_object(7, 42, 3)
                .with_function("pool", "consume", consume_fn())
                .with_coin(0xc0, 5, 1),
        );
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let pool = tx.object(id(7)).unwrap();
        tx.move_call("0x2::pool::consume", &[], vec![pool]).unwrap();

        tx.prepare(&options(&ledger)).await.unwrap();
        let first = tx.data().clone();
        let calls = ledger.total_calls();

        tx.prepare(&options(&ledger)).await.unwrap();
        assert_eq!(tx.data(), &first);
        assert_eq!(ledger.total_calls(), calls);
        assert_eq!(tx.state(), TransactionState::Resolved);
    }

    #[tokio::test]
    async fn objects_are_fetched_in_batches() {
        let mut ledger = MockLedger::new();
        for byte in 1..=120u8 {
            ledger = ledger.with_owned_object(byte, u64::from(byte), sender());
        }
        let ledger = Arc::new(ledger);
        let mut tx = Transaction::new();
        for byte in 1..=120u8 {
            tx.object(id(byte)).unwrap();
        }

        tx.build(&options(&ledger).kind_only()).await.unwrap();

        let mut batches = ledger.object_batches.lock().unwrap().clone();
        batches.sort_unstable();
        assert_eq!(batches, vec![20, 50, 50]);
        assert!(tx.data().inputs.iter().all(Input::is_resolved));
    }

    #[tokio::test]
    async fn batch_size_is_configurable() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_owned_object(1, 1, sender())
                .with_owned_object(2, 1, sender())
                .with_owned_object(3, 1, sender()),
        );
        let mut tx = Transaction::new();
        for byte in 1..=3u8 {
            tx.object(id(byte)).unwrap();
        }
        let options = options(&ledger)
            .kind_only()
            .with_config(ResolveConfig::default().with_max_objects_per_fetch(1));

        tx.build(&options).await.unwrap();
        assert_eq!(ledger.object_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn every_missing_object_is_reported() {
        let ledger = Arc::new(MockLedger::new().with_owned_object(1, 1, sender()));
        let mut tx = Transaction::new();
        for byte in 1..=3u8 {
            tx.object(id(byte)).unwrap();
        }

        let err = tx
            .build(&options(&ledger).kind_only())
            .await
            .unwrap_err();
        match err {
            BuilderError::LedgerLookup { failures } => {
                let ids: Vec<_> = failures.iter().map(|failure| failure.object_id).collect();
                assert_eq!(ids, vec![id(2), id(3)]);
                assert!(failures[0].reason.contains("notExists"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn coins_used_as_inputs_are_not_used_for_gas() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_coin(0xc0, 5, 1)
                .with_coin(0xc1, 6, 1),
        );
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let coin = tx.object_ref(reference(0xc0, 5)).unwrap();
        let recipient = tx.pure_address(SuiAddress::new([2; 32])).unwrap();
        tx.transfer_objects(vec![coin], recipient).unwrap();

        tx.prepare(&options(&ledger)).await.unwrap();
        assert_eq!(
            tx.data().gas_data.payment,
            Some(vec![reference(0xc1, 6)])
        );
    }

    #[tokio::test]
    async fn build_overrides_pick_the_sender_and_gas_owner() {
        let sponsor = SuiAddress::new([0x5b; 32]);
        let ledger = Arc::new(MockLedger::new().with_coin(0xc1, 6, 1));
        let mut tx = Transaction::new();
        let amount = tx.pure_u64(1).unwrap();
        tx.split_coins(tx.gas(), vec![amount]).unwrap();

        let overrides = TransactionOverrides {
            sender: Some(sender()),
            gas_data: GasConfig {
                owner: Some(sponsor),
                ..Default::default()
            },
            ..Default::default()
        };
        let bytes = tx
            .build(&options(&ledger).with_overrides(overrides))
            .await
            .unwrap();

        assert_eq!(*ledger.coin_owners.lock().unwrap(), vec![sponsor]);
        let TransactionData::V1(v1) = TransactionData::from_bytes(&bytes).unwrap();
        assert_eq!(v1.sender, sender());
        assert_eq!(v1.gas_data.owner, sponsor);
        assert_eq!(v1.gas_data.payment, vec![reference(0xc1, 6)]);

        let simulated = ledger.dry_run_bytes.lock().unwrap();
        let TransactionData::V1(dry) = TransactionData::from_bytes(&simulated[0]).unwrap();
        assert_eq!(dry.sender, sender());
        assert_eq!(dry.gas_data.owner, sponsor);
    }

    #[tokio::test]
    async fn no_spendable_coins_is_an_error() {
        let ledger = Arc::new(MockLedger::new().with_coin(0xc0, 5, 1));
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let coin = tx.object_ref(reference(0xc0, 5)).unwrap();
        tx.merge_coins(coin, vec![]).unwrap();

        let err = tx.build(&options(&ledger)).await.unwrap_err();
        assert!(matches!(err, BuilderError::NoGasCoins { owner } if owner == sender()));
    }

    #[tokio::test]
    async fn failed_simulation_carries_the_ledger_error() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_coin(0xc0, 5, 1)
                .with_dry_run(DryRunTransactionBlockResponse::failure("InsufficientGas")),
        );
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let amount = tx.pure_u64(1).unwrap();
        tx.split_coins(tx.gas(), vec![amount]).unwrap();

        let err = tx.build(&options(&ledger)).await.unwrap_err();
        match &err {
            BuilderError::SimulationFailed { error } => assert_eq!(error, "InsufficientGas"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_retryable());
        assert_eq!(tx.state(), TransactionState::Open);
    }

    #[tokio::test]
    async fn argument_count_mismatch_is_rejected() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_owned_object(7, 1, sender())
                .with_function("pool", "consume", consume_fn()),
        );
        let mut tx = Transaction::new();
        let pool = tx.object(id(7)).unwrap();
        let extra = tx.pure(json!(1)).unwrap();
        tx.move_call("0x2::pool::consume", &[], vec![pool, extra])
            .unwrap();

        let err = tx
            .build(&options(&ledger).kind_only())
            .await
            .unwrap_err();
        assert!(matches!(err, BuilderError::InvalidArgument(_)));
    }

    #[test]
    fn build_without_resolution_names_the_unresolved_input() {
        let mut tx = Transaction::new();
        tx.pure_u64(1).unwrap();
        let raw = tx.pure(json!("5")).unwrap();
        tx.make_move_vec(Some("u64"), vec![raw]).unwrap();

        let err = tx
            .data()
            .build(&Default::default())
            .unwrap_err();
        assert!(matches!(err, BuilderError::UnresolvedInput { index: 1 }));
        assert!(err.is_caller_bug());
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_any_call() {
        let ledger = Arc::new(MockLedger::new());
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let options = options(&ledger);
        options.cancellation.cancel();

        let err = tx.build(&options).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(ledger.total_calls(), 0);
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_pending_call() {
        let ledger = Arc::new(MockLedger::new().hanging_on_gas_price());
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let options = options(&ledger);

        let token = options.cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = tx.build(&options).await.unwrap_err();
        assert!(matches!(err, BuilderError::Cancelled));
        assert_eq!(ledger.price_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loaded_transaction_builds_identically() {
        let ledger = Arc::new(MockLedger::new().with_coin(0xc0, 5, 1));
        let mut tx = Transaction::new();
        tx.set_sender(sender()).unwrap();
        let amount = tx.pure_u64(10).unwrap();
        let recipient = tx.pure_address(SuiAddress::new([2; 32])).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]).unwrap();
        tx.transfer_objects(vec![coin.nested_result(0)], recipient)
            .unwrap();
        let bytes = tx.build(&options(&ledger)).await.unwrap();

        let json = tx.serialize().unwrap();
        let mut restored = Transaction::from_json(&json).unwrap();
        assert_eq!(restored.build(&options(&ledger)).await.unwrap(), bytes);

        let mut loaded = Transaction::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.build(&BuildOptions::new()).await.unwrap(), bytes);
    }
}

mod plugin_tests {
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use sui_txn_builder::transaction::{
        Command, Input, IntentArgs, Next, Plugin, ResolveContext, TransactionData,
        TransactionIntent,
    };
    use sui_txn_builder::{BuildOptions, BuilderError, BuilderResult, Transaction};
    use sui_txn_types::{Argument, SuiAddress};

    /// Expands `SplitToSender` into a split of the gas coin and a transfer back to the sender.
    struct SplitToSender;

    #[async_trait]
    impl Plugin<TransactionData, ResolveContext> for SplitToSender {
        fn name(&self) -> &str {
            "split-to-sender"
        }

        async fn run(
            &self,
            data: &mut TransactionData,
            context: &ResolveContext,
            next: Next<'_, TransactionData, ResolveContext>,
        ) -> BuilderResult<()> {
            while let Some(index) = data.find_intent("SplitToSender") {
                let Command::Intent(intent) = &data.commands[index] else {
                    unreachable!("find_intent returned a non-intent command");
                };
                let amount = intent.data["amount"]
                    .as_u64()
                    .ok_or_else(|| BuilderError::invalid_argument("amount must be a u64"))?;
                let sender = data.sender.ok_or(BuilderError::MissingSender)?;

                let amount = data.add_input(Input::Pure(amount.to_le_bytes().to_vec()))?;
                let recipient = data.add_input(Input::Pure(sender.to_vec()))?;
                let split = u16::try_from(index).unwrap_or(u16::MAX);
                data.replace_command(
                    index,
                    vec![
                        Command::SplitCoins {
                            coin: Argument::GasCoin,
                            amounts: vec![amount],
                        },
                        Command::TransferObjects {
                            objects: vec![Argument::NestedResult(split, 0)],
                            address: recipient,
                        },
                    ],
                )?;
            }
            next.run(data, context).await
        }
    }

    /// Returns without continuing the chain.
    struct Truncating;

    #[async_trait]
    impl Plugin<TransactionData, ResolveContext> for Truncating {
        fn name(&self) -> &str {
            "truncating"
        }

        async fn run(
            &self,
            _data: &mut TransactionData,
            _context: &ResolveContext,
            _next: Next<'_, TransactionData, ResolveContext>,
        ) -> BuilderResult<()> {
            Ok(())
        }
    }

    fn intent(amount: u64) -> TransactionIntent {
        let mut data = Map::new();
        data.insert("amount".to_string(), json!(amount));
        TransactionIntent {
            name: "SplitToSender".to_string(),
            inputs: BTreeMap::new(),
            data,
        }
    }

    #[tokio::test]
    async fn intent_is_expanded_by_its_resolver() {
        let sender = SuiAddress::new([3; 32]);
        let mut tx = Transaction::new();
        tx.set_sender(sender).unwrap();
        tx.add_intent_resolver("SplitToSender", Arc::new(SplitToSender))
            .unwrap();
        tx.add_intent(intent(10)).unwrap();
        let merged = tx.merge_coins(tx.gas(), vec![]).unwrap();
        assert_eq!(merged.index(), 1);

        tx.build(&BuildOptions::new().kind_only()).await.unwrap();

        let commands = &tx.data().commands;
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], Command::SplitCoins { .. }));
        assert!(matches!(commands[1], Command::TransferObjects { .. }));
        assert!(matches!(commands[2], Command::MergeCoins { .. }));
        assert_eq!(tx.data().inputs.len(), 2);
    }

    #[tokio::test]
    async fn intent_without_resolver_fails() {
        let mut tx = Transaction::new();
        tx.add_intent(intent(1)).unwrap();

        let err = tx
            .build(&BuildOptions::new().kind_only())
            .await
            .unwrap_err();
        assert!(matches!(err, BuilderError::IntentUnresolved(name) if name == "SplitToSender"));
    }

    #[test]
    fn intent_names_are_listed() {
        let mut tx = Transaction::new();
        let first = tx.merge_coins(tx.gas(), vec![]).unwrap();
        let mut inputs = BTreeMap::new();
        inputs.insert("coin".to_string(), IntentArgs::One(first.argument()));
        tx.add_intent(TransactionIntent {
            name: "Noop".to_string(),
            inputs,
            data: Map::new(),
        })
        .unwrap();
        let names = tx.data().intent_names();
        assert_eq!(names, vec!["Noop".to_string()]);
    }

    #[tokio::test]
    async fn resolver_registration_conflicts_are_rejected() {
        let mut tx = Transaction::new();
        let resolver: Arc<dyn Plugin<TransactionData, ResolveContext>> = Arc::new(SplitToSender);
        tx.add_intent_resolver("SplitToSender", resolver.clone())
            .unwrap();
        tx.add_intent_resolver("SplitToSender", resolver).unwrap();

        let err = tx
            .add_intent_resolver("SplitToSender", Arc::new(SplitToSender))
            .unwrap_err();
        assert!(matches!(err, BuilderError::Config(_)));
    }

    #[tokio::test]
    async fn plugin_that_skips_the_chain_is_reported() {
        let mut tx = Transaction::new();
        tx.add_build_plugin(Arc::new(Truncating));

        let err = tx
            .build(&BuildOptions::new().kind_only())
            .await
            .unwrap_err();
        match &err {
            BuilderError::ProtocolViolation { plugin, .. } => assert_eq!(plugin, "truncating"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_caller_bug());
    }
}

mod property_tests {
    use proptest::prelude::*;
    use sui_txn_builder::transaction::{compute_gas_budget, Command, TransactionData};
    use sui_txn_types::Argument;

    fn chain(references: &[u16]) -> TransactionData {
        let mut data = TransactionData::new();
        data.add_command(Command::SplitCoins {
            coin: Argument::GasCoin,
            amounts: vec![],
        })
        .unwrap();
        for (position, reference) in references.iter().enumerate() {
            let target = reference % (position as u16 + 1);
            data.add_command(Command::MergeCoins {
                destination: Argument::Result(target),
                sources: vec![Argument::NestedResult(target, 1)],
            })
            .unwrap();
        }
        data
    }

    fn targets(command: &Command) -> Vec<u16> {
        command
            .arguments()
            .into_iter()
            .filter_map(|argument| match argument {
                Argument::Result(index) | Argument::NestedResult(index, _) => Some(*index),
                _ => None,
            })
            .collect()
    }

    proptest! {
        #[test]
        fn replacing_a_command_shifts_later_references(
            references in proptest::collection::vec(any::<u16>(), 1..12),
            replaced in any::<prop::sample::Index>(),
            inserted in 1usize..5,
        ) {
            let before = chain(&references);
            let index = replaced.index(before.commands.len());
            let replacement = (0..inserted)
                .map(|_| Command::SplitCoins { coin: Argument::GasCoin, amounts: vec![] })
                .collect::<Vec<_>>();

            let mut after = before.clone();
            after.replace_command(index, replacement).unwrap();
            prop_assert_eq!(after.commands.len(), before.commands.len() + inserted - 1);

            for (position, command) in before.commands.iter().enumerate() {
                if position < index {
                    prop_assert_eq!(&after.commands[position], command);
                    continue;
                }
                if position == index {
                    continue;
                }
                let moved = &after.commands[position + inserted - 1];
                let expected: Vec<u16> = targets(command)
                    .into_iter()
                    .map(|target| match usize::from(target) {
                        t if t > index => (t + inserted - 1) as u16,
                        t => t as u16,
                    })
                    .collect();
                prop_assert_eq!(targets(moved), expected);
            }
            after.validate_arguments().unwrap();
        }

        #[test]
        fn budget_never_decreases_with_cost(
            computation in 0u64..1_000_000_000,
            storage in 0u64..1_000_000_000,
            rebate in 0u64..1_000_000_000,
            price in 1u64..10_000,
            extra in 0u64..1_000_000,
        ) {
            let budget = compute_gas_budget(computation, storage, rebate, price, 1000);
            prop_assert!(budget >= computation + 1000 * price);
            prop_assert!(compute_gas_budget(computation + extra, storage, rebate, price, 1000) >= budget);
            prop_assert!(compute_gas_budget(computation, storage + extra, rebate, price, 1000) >= budget);
            prop_assert!(compute_gas_budget(computation, storage, rebate + extra, price, 1000) <= budget);
        }
    }
}
