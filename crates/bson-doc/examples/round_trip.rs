//! Builds a document covering every value kind, renders it as Extended
//! JSON, parses that text back, and round-trips the result through the
//! binary codec.

use bson_doc::{Binary, Container, ObjectId, Regular, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let payload: Vec<u8> = (0..25u8).map(|i| i + b'a').collect();

    let doc = Container::document_from([
        ("null", Value::Null),
        ("int32", Value::from(i32::MIN)),
        ("int64", Value::from(i64::MAX)),
        ("float", Value::from(123456.654321f32)),
        ("double", Value::from(123456.654321)),
        ("double-NaN", Value::from(f64::NAN)),
        ("double-Infinity", Value::from(f64::INFINITY)),
        ("string", Value::from("hello world!")),
        ("boolean", Value::from(false)),
        ("min_key", Value::MinKey),
        ("max_key", Value::MaxKey),
        ("binary", Value::from(Binary::new(payload))),
        ("regular", Value::from(Regular::new("^H", "i"))),
        ("datetime", Value::DateTime(1_642_982_400_000)),
        ("timestamp", Value::from(u64::MAX)),
        (
            "object_id",
            Value::from(ObjectId::parse_hex("A1B2C3D4E5F66F5E4D3C2B1A").ok_or("bad hex")?),
        ),
        (
            "array",
            Value::from(Container::array_from([
                Value::Null,
                Value::from(i32::MIN),
                Value::from(i64::MAX),
                Value::from(123456.654321),
                Value::from("hello world!"),
                Value::from(true),
                Value::MinKey,
                Value::MaxKey,
                Value::from(Regular::new("^H", "i")),
                Value::DateTime(1_642_982_400_000),
                Value::from(u64::MAX),
            ])),
        ),
    ]);

    let text = doc.to_ejson()?;
    println!("{text}");

    let parsed = Container::from_ejson(&text)?;
    println!();
    println!("{}", parsed.to_ejson()?);

    let bytes = parsed.to_bson()?;
    println!();
    println!("binary encoding: {} bytes", bytes.len());

    let decoded = Container::from_bson(&bytes)?;
    println!("binary round-trip pairs: {}", decoded.len());

    Ok(())
}
