use bson_doc::{
    Binary, BinarySubtype, BsonDecoder, BsonEncoder, BsonError, Container, ObjectId, Regular,
    Value,
};

/// Structural equality that treats two NaN doubles as equal.
fn assert_value_eq(actual: &Value, expected: &Value) {
    match (actual, expected) {
        (Value::Double(a), Value::Double(b)) if a.is_nan() && b.is_nan() => {}
        (Value::Document(a), Value::Document(b)) | (Value::Array(a), Value::Array(b)) => {
            assert_container_eq(a, b);
        }
        _ => assert_eq!(actual, expected),
    }
}

fn assert_container_eq(actual: &Container, expected: &Container) {
    assert_eq!(actual.kind(), expected.kind());
    assert_eq!(actual.len(), expected.len(), "pair count mismatch");
    for ((ak, av), (bk, bv)) in actual.iter().zip(expected.iter()) {
        assert_eq!(ak, bk, "key mismatch");
        assert_value_eq(av, bv);
    }
}

fn roundtrip(doc: &Container) -> Container {
    let bytes = BsonEncoder::new().encode(doc).expect("encode");
    assert_eq!(bytes.len(), doc.encoded_size(), "size accounting");
    BsonDecoder::new().decode(&bytes).expect("decode")
}

#[test]
fn single_int32_document_has_documented_bytes() {
    let doc = Container::document_from([("a", 1i32)]);
    let bytes = doc.to_bson().unwrap();
    assert_eq!(
        bytes,
        [0x0C, 0x00, 0x00, 0x00, 0x10, 0x61, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
    );
    let back = Container::from_bson(&bytes).unwrap();
    assert_container_eq(&back, &doc);
}

#[test]
fn bool_and_null_document_has_documented_bytes() {
    let doc = Container::document_from([("x", Value::Boolean(true)), ("y", Value::Null)]);
    let bytes = doc.to_bson().unwrap();
    // 4 (prefix) + 4 ("x" element) + 3 ("y" element) + 1 (terminator)
    assert_eq!(
        bytes,
        [0x0C, 0x00, 0x00, 0x00, 0x08, 0x78, 0x00, 0x01, 0x0A, 0x79, 0x00, 0x00]
    );
    let back = Container::from_bson(&bytes).unwrap();
    assert_container_eq(&back, &doc);
}

#[test]
fn every_kind_roundtrips() {
    let payload: Vec<u8> = (0..25u8).map(|i| i + b'a').collect();
    let doc = Container::document_from([
        ("null", Value::Null),
        ("int32", Value::Int32(i32::MIN)),
        ("int64", Value::Int64(i64::MAX)),
        ("double", Value::Double(123456.654321)),
        ("nan", Value::Double(f64::NAN)),
        ("inf", Value::Double(f64::INFINITY)),
        ("neg_inf", Value::Double(f64::NEG_INFINITY)),
        ("string", Value::from("hello world!")),
        ("boolean", Value::Boolean(false)),
        ("min_key", Value::MinKey),
        ("max_key", Value::MaxKey),
        ("binary", Value::Binary(Binary::new(payload.clone()))),
        (
            "user_binary",
            Value::Binary(Binary::with_subtype(BinarySubtype::User, vec![0xDE, 0xAD])),
        ),
        ("regular", Value::Regular(Regular::new("^H", "i"))),
        ("datetime", Value::DateTime(1_642_982_400_000)),
        ("timestamp", Value::Timestamp(u64::MAX)),
        (
            "object_id",
            Value::ObjectId(ObjectId::parse_hex("a1b2c3d4e5f66f5e4d3c2b1a").unwrap()),
        ),
        (
            "array",
            Value::Array(Container::array_from([
                Value::Null,
                Value::Int32(-1),
                Value::from("nested"),
            ])),
        ),
        (
            "document",
            Value::Document(Container::document_from([("inner", 42i32)])),
        ),
    ]);
    let back = roundtrip(&doc);
    assert_container_eq(&back, &doc);
}

#[test]
fn boundary_values_roundtrip() {
    let doc = Container::document_from([
        ("i32_min", Value::Int32(i32::MIN)),
        ("i32_max", Value::Int32(i32::MAX)),
        ("i64_min", Value::Int64(i64::MIN)),
        ("i64_max", Value::Int64(i64::MAX)),
        ("empty_str", Value::Str(String::new())),
        ("empty_bin", Value::Binary(Binary::new(Vec::new()))),
        ("empty_doc", Value::Document(Container::document())),
        ("empty_arr", Value::Array(Container::array())),
        (
            "one_elem",
            Value::Array(Container::array_from([Value::Boolean(true)])),
        ),
    ]);
    let back = roundtrip(&doc);
    assert_container_eq(&back, &doc);
}

#[test]
fn encoded_size_matches_encoding_for_each_kind() {
    let cases = vec![
        Value::Null,
        Value::Int32(7),
        Value::Int64(-7),
        Value::Double(0.5),
        Value::Boolean(true),
        Value::from("text"),
        Value::Binary(Binary::new(vec![1, 2, 3])),
        Value::ObjectId(ObjectId::default()),
        Value::DateTime(0),
        Value::Timestamp(1),
        Value::Regular(Regular::new("a+", "im")),
        Value::MinKey,
        Value::MaxKey,
        Value::Array(Container::array_from([1i32, 2, 3])),
        Value::Document(Container::document_from([("k", "v")])),
    ];
    for value in cases {
        let doc = Container::document_from([("k", value)]);
        let bytes = doc.to_bson().unwrap();
        assert_eq!(bytes.len(), doc.encoded_size(), "doc: {doc:?}");
    }
}

#[test]
fn empty_document_is_five_bytes() {
    let doc = Container::document();
    let bytes = doc.to_bson().unwrap();
    assert_eq!(bytes, [0x05, 0x00, 0x00, 0x00, 0x00]);
    assert!(Container::from_bson(&bytes).unwrap().is_empty());
}

#[test]
fn duplicate_keys_survive_the_wire() {
    let doc = Container::document_from([("k", 1i32), ("k", 2i32)]);
    let back = roundtrip(&doc);
    assert_eq!(back.len(), 2);
    assert_eq!(back.get("k"), Some(&Value::Int32(1)));
    assert_eq!(back[1], Value::Int32(2));
}

#[test]
fn nonzero_boolean_bytes_read_as_false() {
    // 0x02 is not a valid boolean write, but decode tolerates it: only
    // exactly 0x01 is true.
    let bytes = [
        0x09, 0x00, 0x00, 0x00, 0x08, b'b', 0x00, 0x02, 0x00,
    ];
    let doc = BsonDecoder::new().decode(&bytes).unwrap();
    assert_eq!(doc.get("b"), Some(&Value::Boolean(false)));
}

#[test]
fn truncated_stream_is_an_error() {
    let full = Container::document_from([("a", 1i32)]).to_bson().unwrap();
    for cut in 0..full.len() {
        let err = BsonDecoder::new().decode(&full[..cut]).unwrap_err();
        assert!(
            matches!(err, BsonError::UnexpectedEof | BsonError::LengthMismatch { .. }),
            "cut at {cut}: {err:?}"
        );
    }
}

#[test]
fn unknown_tag_is_an_error() {
    // 0x06 (deprecated undefined) is outside the supported sum.
    let bytes = [0x08, 0x00, 0x00, 0x00, 0x06, b'k', 0x00, 0x00];
    let err = BsonDecoder::new().decode(&bytes).unwrap_err();
    assert_eq!(err, BsonError::UnknownKind(0x06));
}

#[test]
fn sentinel_tag_is_rejected() {
    let bytes = [0x08, 0x00, 0x00, 0x00, 0xEF, b'k', 0x00, 0x00];
    let err = BsonDecoder::new().decode(&bytes).unwrap_err();
    assert_eq!(err, BsonError::UnknownKind(0xEF));
}

#[test]
fn mismatched_length_prefix_is_an_error() {
    let mut bytes = Container::document_from([("a", 1i32)]).to_bson().unwrap();
    bytes[0] = 0x0D; // one more than the actual 12 bytes
    let err = BsonDecoder::new().decode(&bytes).unwrap_err();
    assert_eq!(
        err,
        BsonError::LengthMismatch {
            declared: 13,
            actual: 12
        }
    );
}

#[test]
fn missing_key_terminator_is_an_error() {
    // Key bytes run to the end of input without a NUL.
    let bytes = [0x0A, 0x00, 0x00, 0x00, 0x10, b'a', b'b', b'c'];
    let err = BsonDecoder::new().decode(&bytes).unwrap_err();
    assert_eq!(err, BsonError::UnexpectedEof);
}

#[test]
fn untyped_placeholder_refuses_to_encode() {
    let mut doc = Container::document();
    doc.entry("pending").unwrap();
    assert_eq!(doc.to_bson().unwrap_err(), BsonError::EmptyNode);
}

#[test]
fn array_keys_come_back_dense() {
    let arr = Container::array_from([10i32, 20, 30]);
    let doc = Container::document_from([("a", Value::Array(arr))]);
    let back = roundtrip(&doc);
    let arr = back.get("a").and_then(Value::as_array).unwrap();
    for i in 0..arr.len() {
        assert_eq!(arr.key_at(i), Some(i.to_string().as_str()));
    }
}

#[test]
fn deep_nesting_roundtrips() {
    let mut inner = Container::document_from([("leaf", Value::Boolean(true))]);
    for depth in 0..16 {
        inner = Container::document_from([(format!("level{depth}"), Value::Document(inner))]);
    }
    let back = roundtrip(&inner);
    assert_container_eq(&back, &inner);
}
