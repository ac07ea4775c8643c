//! Behavioral tests for the schema codec and the transaction wire types.

mod roundtrip_tests {
    use num_bigint::BigUint;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use sui_txn_types::bcs::{self, BcsType};

    fn check<T>(schema: &BcsType<T>, value: &T)
    where
        T: PartialEq + std::fmt::Debug + 'static,
    {
        let bytes = schema.serialize(value).unwrap().into_bytes();
        if let Some(size) = schema.serialized_size(value) {
            assert_eq!(size, bytes.len(), "size of {value:?} under {}", schema.name());
        }
        assert_eq!(&schema.parse(&bytes).unwrap(), value);
    }

    proptest! {
        #[test]
        fn unsigned_integers(a: u8, b: u16, c: u32, d: u64, e: u128) {
            check(&bcs::u8(), &a);
            check(&bcs::u16(), &b);
            check(&bcs::u32(), &c);
            check(&bcs::u64(), &d);
            check(&bcs::u128(), &e);
        }

        #[test]
        fn u256_values(bytes in proptest::collection::vec(any::<u8>(), 0..=32)) {
            check(&bcs::u256(), &BigUint::from_bytes_le(&bytes));
        }

        #[test]
        fn uleb128_values(value: u64) {
            check(&bcs::uleb128(), &value);
        }

        #[test]
        fn strings(value in ".{0,64}") {
            check(&bcs::string(), &value);
        }

        #[test]
        fn vectors_of_options(value in proptest::collection::vec(proptest::option::of(any::<u32>()), 0..40)) {
            check(&bcs::vector(bcs::option(bcs::u32())), &value);
        }

        #[test]
        fn tuples(a: bool, b: u64, c in ".{0,8}") {
            check(&bcs::tuple3(bcs::bool(), bcs::u64(), bcs::string()), &(a, b, c));
        }

        #[test]
        fn fixed_arrays(value in proptest::collection::vec(any::<u16>(), 4)) {
            check(&bcs::fixed_array(4, bcs::u16()), &value);
        }

        #[test]
        fn maps(value in proptest::collection::btree_map(any::<u16>(), any::<bool>(), 0..20)) {
            check(&bcs::map(bcs::u16(), bcs::bool()), &value);
        }
    }

    #[test]
    fn test_map_order_ignores_insertion_order() {
        let schema = bcs::map(bcs::string(), bcs::u8());
        let mut forward = BTreeMap::new();
        forward.insert("b".to_string(), 1);
        forward.insert("aa".to_string(), 2);
        let mut backward = BTreeMap::new();
        backward.insert("aa".to_string(), 2);
        backward.insert("b".to_string(), 1);
        assert_eq!(
            schema.serialize(&forward).unwrap().into_bytes(),
            schema.serialize(&backward).unwrap().into_bytes()
        );
        // "b" encodes as [1, b'b'], before [2, b'a', b'a']
        let bytes = schema.serialize(&forward).unwrap().into_bytes();
        assert_eq!(&bytes[..3], &[2, 1, b'b']);
    }
}

mod struct_enum_tests {
    use proptest::prelude::*;
    use sui_txn_types::bcs::{self, BcsType, BcsValue};

    fn shape() -> BcsType<BcsValue> {
        bcs::enum_(
            "Shape",
            [
                ("Empty", None),
                (
                    "Circle",
                    Some(bcs::struct_("Circle", [("radius", bcs::u32().dynamic())])),
                ),
                (
                    "Label",
                    Some(bcs::struct_(
                        "Label",
                        [
                            ("text", bcs::string().dynamic()),
                            ("tags", bcs::vector(bcs::u8()).dynamic()),
                        ],
                    )),
                ),
            ],
        )
    }

    fn arb_shape() -> impl Strategy<Value = BcsValue> {
        prop_oneof![
            Just(BcsValue::unit_variant("Empty")),
            any::<u32>().prop_map(|r| {
                BcsValue::variant("Circle", BcsValue::structure([("radius", BcsValue::U32(r))]))
            }),
            (".{0,16}", proptest::collection::vec(any::<u8>(), 0..8)).prop_map(|(text, tags)| {
                BcsValue::variant(
                    "Label",
                    BcsValue::structure([
                        ("text", BcsValue::String(text)),
                        ("tags", BcsValue::Vector(tags.into_iter().map(BcsValue::U8).collect())),
                    ]),
                )
            }),
        ]
    }

    proptest! {
        #[test]
        fn enum_values_roundtrip(value in arb_shape()) {
            let schema = shape();
            let bytes = schema.serialize(&value).unwrap().into_bytes();
            prop_assert_eq!(schema.serialized_size(&value), Some(bytes.len()));
            prop_assert_eq!(schema.parse(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_field_order_follows_declaration() {
        let schema = bcs::struct_(
            "Pair",
            [("first", bcs::u8().dynamic()), ("second", bcs::u8().dynamic())],
        );
        let value = BcsValue::structure([("second", BcsValue::U8(2)), ("first", BcsValue::U8(1))]);
        assert_eq!(schema.serialize(&value).unwrap().as_bytes(), &[1, 2]);
    }

    #[test]
    fn test_unknown_variant_index_is_a_decode_error() {
        let err = shape().parse(&[3]).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_payload_mismatch_is_a_validation_error() {
        let err = shape()
            .serialize(&BcsValue::variant("Empty", BcsValue::U8(0)))
            .unwrap_err();
        assert!(err.is_validation());
    }
}

mod oracle_tests {
    //! Byte-for-byte agreement with the reference `bcs` crate using mirror
    //! types derived through serde.

    use serde::Serialize;
    use sui_txn_types::{
        bcs as schema, Argument, CallArg, Command, GasData, ObjectArg, ObjectDigest, ObjectRef,
        ProgrammableMoveCall, ProgrammableTransaction, StructTag, SuiAddress, TransactionData,
        TransactionExpiration, TransactionKind, TypeTag,
    };

    #[derive(Serialize)]
    enum MirrorArgument {
        GasCoin,
        Input(u16),
        Result(u16),
        NestedResult(u16, u16),
    }

    #[derive(Serialize)]
    struct MirrorObjectRef([u8; 32], u64, Vec<u8>);

    #[derive(Serialize)]
    enum MirrorObjectArg {
        ImmOrOwnedObject(MirrorObjectRef),
        SharedObject {
            id: [u8; 32],
            initial_shared_version: u64,
            mutable: bool,
        },
        #[allow(dead_code)]
        Receiving(MirrorObjectRef),
    }

    #[derive(Serialize)]
    enum MirrorCallArg {
        Pure(Vec<u8>),
        Object(MirrorObjectArg),
    }

    #[derive(Serialize)]
    enum MirrorTypeTag {
        Bool,
        U8,
        U64,
        U128,
        Address,
        Signer,
        Vector(Box<MirrorTypeTag>),
        Struct(MirrorStructTag),
        U16,
        U32,
        U256,
    }

    #[derive(Serialize)]
    struct MirrorStructTag {
        address: [u8; 32],
        module: String,
        name: String,
        type_params: Vec<MirrorTypeTag>,
    }

    #[derive(Serialize)]
    struct MirrorMoveCall {
        package: [u8; 32],
        module: String,
        function: String,
        type_arguments: Vec<MirrorTypeTag>,
        arguments: Vec<MirrorArgument>,
    }

    #[derive(Serialize)]
    #[allow(dead_code)]
    enum MirrorCommand {
        MoveCall(MirrorMoveCall),
        TransferObjects(Vec<MirrorArgument>, MirrorArgument),
        SplitCoins(MirrorArgument, Vec<MirrorArgument>),
        MergeCoins(MirrorArgument, Vec<MirrorArgument>),
        Publish(Vec<Vec<u8>>, Vec<[u8; 32]>),
        MakeMoveVec(Option<MirrorTypeTag>, Vec<MirrorArgument>),
        Upgrade(Vec<Vec<u8>>, Vec<[u8; 32]>, [u8; 32], MirrorArgument),
    }

    #[derive(Serialize)]
    struct MirrorProgrammable {
        inputs: Vec<MirrorCallArg>,
        commands: Vec<MirrorCommand>,
    }

    #[derive(Serialize)]
    #[allow(dead_code)]
    enum MirrorKind {
        ProgrammableTransaction(MirrorProgrammable),
        ChangeEpoch,
        Genesis,
        ConsensusCommitPrologue,
    }

    #[derive(Serialize)]
    struct MirrorGasData {
        payment: Vec<MirrorObjectRef>,
        owner: [u8; 32],
        price: u64,
        budget: u64,
    }

    #[derive(Serialize)]
    #[allow(dead_code)]
    enum MirrorExpiration {
        None,
        Epoch(u64),
    }

    #[derive(Serialize)]
    struct MirrorDataV1 {
        kind: MirrorKind,
        sender: [u8; 32],
        gas_data: MirrorGasData,
        expiration: MirrorExpiration,
    }

    #[derive(Serialize)]
    enum MirrorData {
        V1(MirrorDataV1),
    }

    const SENDER: [u8; 32] = [0xab; 32];

    fn coin_ref(byte: u8) -> ObjectRef {
        ObjectRef {
            object_id: SuiAddress::new([byte; 32]),
            version: u64::from(byte) * 10,
            digest: ObjectDigest::new([byte.wrapping_add(1); 32]),
        }
    }

    fn mirror_ref(byte: u8) -> MirrorObjectRef {
        MirrorObjectRef([byte; 32], u64::from(byte) * 10, vec![byte.wrapping_add(1); 32])
    }

    fn sui_coin_tag() -> TypeTag {
        TypeTag::struct_tag(StructTag::gas_coin())
    }

    fn mirror_sui_coin_tag() -> MirrorTypeTag {
        let mut framework = [0u8; 32];
        framework[31] = 2;
        MirrorTypeTag::Struct(MirrorStructTag {
            address: framework,
            module: "coin".into(),
            name: "Coin".into(),
            type_params: vec![MirrorTypeTag::Struct(MirrorStructTag {
                address: framework,
                module: "sui".into(),
                name: "SUI".into(),
                type_params: vec![],
            })],
        })
    }

    fn ours() -> TransactionData {
        let mut framework = [0u8; 32];
        framework[31] = 2;
        TransactionData::v1(
            TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
                inputs: vec![
                    CallArg::Pure(1_000u64.to_le_bytes().to_vec()),
                    CallArg::Object(ObjectArg::ImmOrOwnedObject(coin_ref(3))),
                    CallArg::Object(ObjectArg::SharedObject {
                        id: SuiAddress::new([6; 32]),
                        initial_shared_version: 1,
                        mutable: true,
                    }),
                    CallArg::Pure(SENDER.to_vec()),
                ],
                commands: vec![
                    Command::SplitCoins {
                        coin: Argument::GasCoin,
                        amounts: vec![Argument::Input(0)],
                    },
                    Command::MergeCoins {
                        destination: Argument::NestedResult(0, 0),
                        sources: vec![Argument::Input(1)],
                    },
                    Command::MoveCall(Box::new(ProgrammableMoveCall {
                        package: SuiAddress::new(framework),
                        module: "pay".into(),
                        function: "keep".into(),
                        type_arguments: vec![sui_coin_tag(), TypeTag::vector(TypeTag::U256)],
                        arguments: vec![Argument::Input(2), Argument::Result(0)],
                    })),
                    Command::MakeMoveVec {
                        element_type: Some(TypeTag::U16),
                        elements: vec![],
                    },
                    Command::TransferObjects {
                        objects: vec![Argument::NestedResult(0, 0)],
                        address: Argument::Input(3),
                    },
                ],
            }),
            SuiAddress::new(SENDER),
            GasData {
                payment: vec![coin_ref(4), coin_ref(5)],
                owner: SuiAddress::new(SENDER),
                price: 750,
                budget: 10_000_000,
            },
            TransactionExpiration::Epoch(42),
        )
    }

    fn mirror() -> MirrorData {
        let mut framework = [0u8; 32];
        framework[31] = 2;
        MirrorData::V1(MirrorDataV1 {
            kind: MirrorKind::ProgrammableTransaction(MirrorProgrammable {
                inputs: vec![
                    MirrorCallArg::Pure(1_000u64.to_le_bytes().to_vec()),
                    MirrorCallArg::Object(MirrorObjectArg::ImmOrOwnedObject(mirror_ref(3))),
                    MirrorCallArg::Object(MirrorObjectArg::SharedObject {
                        id: [6; 32],
                        initial_shared_version: 1,
                        mutable: true,
                    }),
                    MirrorCallArg::Pure(SENDER.to_vec()),
                ],
                commands: vec![
                    MirrorCommand::SplitCoins(MirrorArgument::GasCoin, vec![MirrorArgument::Input(0)]),
                    MirrorCommand::MergeCoins(
                        MirrorArgument::NestedResult(0, 0),
                        vec![MirrorArgument::Input(1)],
                    ),
                    MirrorCommand::MoveCall(MirrorMoveCall {
                        package: framework,
                        module: "pay".into(),
                        function: "keep".into(),
                        type_arguments: vec![
                            mirror_sui_coin_tag(),
                            MirrorTypeTag::Vector(Box::new(MirrorTypeTag::U256)),
                        ],
                        arguments: vec![MirrorArgument::Input(2), MirrorArgument::Result(0)],
                    }),
                    MirrorCommand::MakeMoveVec(Some(MirrorTypeTag::U16), vec![]),
                    MirrorCommand::TransferObjects(
                        vec![MirrorArgument::NestedResult(0, 0)],
                        MirrorArgument::Input(3),
                    ),
                ],
            }),
            sender: SENDER,
            gas_data: MirrorGasData {
                payment: vec![mirror_ref(4), mirror_ref(5)],
                owner: SENDER,
                price: 750,
                budget: 10_000_000,
            },
            expiration: MirrorExpiration::Epoch(42),
        })
    }

    #[test]
    fn test_transaction_data_matches_reference_encoding() {
        let expected = bcs::to_bytes(&mirror()).unwrap();
        let actual = ours().to_bytes().unwrap();
        assert_eq!(actual, expected);
        assert_eq!(TransactionData::from_bytes(&expected).unwrap(), ours());
    }

    #[test]
    fn test_type_tags_match_reference_encoding() {
        let ours = sui_txn_types::type_tag::type_tag()
            .serialize(&sui_coin_tag())
            .unwrap()
            .into_bytes();
        assert_eq!(ours, bcs::to_bytes(&mirror_sui_coin_tag()).unwrap());

        let tags = [
            (TypeTag::Bool, MirrorTypeTag::Bool),
            (TypeTag::U8, MirrorTypeTag::U8),
            (TypeTag::U64, MirrorTypeTag::U64),
            (TypeTag::U128, MirrorTypeTag::U128),
            (TypeTag::Address, MirrorTypeTag::Address),
            (TypeTag::Signer, MirrorTypeTag::Signer),
            (TypeTag::U16, MirrorTypeTag::U16),
            (TypeTag::U32, MirrorTypeTag::U32),
            (TypeTag::U256, MirrorTypeTag::U256),
        ];
        for (tag, mirror) in tags {
            let ours = sui_txn_types::type_tag::type_tag()
                .serialize(&tag)
                .unwrap()
                .into_bytes();
            assert_eq!(ours, bcs::to_bytes(&mirror).unwrap(), "{tag}");
        }
    }

    #[test]
    fn test_primitives_match_reference_encoding() {
        assert_eq!(
            schema::u128().serialize(&(u128::MAX - 7)).unwrap().into_bytes(),
            bcs::to_bytes(&(u128::MAX - 7)).unwrap()
        );
        assert_eq!(
            schema::string().serialize(&"héllo".to_string()).unwrap().into_bytes(),
            bcs::to_bytes("héllo").unwrap()
        );
        let long = vec![7u8; 300];
        assert_eq!(
            schema::byte_vector().serialize(&long).unwrap().into_bytes(),
            bcs::to_bytes(&long).unwrap()
        );
        let nested = vec![Some(1u64), None, Some(u64::MAX)];
        assert_eq!(
            schema::vector(schema::option(schema::u64()))
                .serialize(&nested)
                .unwrap()
                .into_bytes(),
            bcs::to_bytes(&nested).unwrap()
        );
        let mut map = std::collections::BTreeMap::new();
        map.insert(300u16, true);
        map.insert(2u16, false);
        map.insert(1u16, true);
        assert_eq!(
            schema::map(schema::u16(), schema::bool())
                .serialize(&map)
                .unwrap()
                .into_bytes(),
            bcs::to_bytes(&map).unwrap()
        );
    }
}

mod pure_tests {
    use serde_json::json;
    use sui_txn_types::{serialize_pure_json, PureType};

    #[test]
    fn test_pure_bytes_match_reference_encoding() {
        let ty: PureType = "vector<u64>".parse().unwrap();
        let ours = serialize_pure_json(&ty, &json!([1, "2", 18446744073709551615u64])).unwrap();
        assert_eq!(ours, bcs::to_bytes(&vec![1u64, 2, u64::MAX]).unwrap());

        let ty: PureType = "option<string>".parse().unwrap();
        let ours = serialize_pure_json(&ty, &json!("sui")).unwrap();
        assert_eq!(ours, bcs::to_bytes(&Some("sui".to_string())).unwrap());
    }
}
