//! Property-based tests for the value codec and whole-unit round trips.
//!
//! Every generated value is written with `Display` and decoded again; the decoded
//! value must equal the original. Floats are drawn with a fractional part, since
//! whole floats are written in integer form and read back as integers.

use num_bigint::BigInt;
use proptest::prelude::*;
use sii_unit::{from_slice, from_str, to_binary, to_string, Object, Placement, SealOptions, Value};

fn roundtrip(value: &Value) -> bool {
    let text = value.to_string();
    let decoded = Value::parse(&text);
    if &decoded != value {
        eprintln!("Decoding {:?} gave {:?}", text, decoded);
        return false;
    }
    true
}

fn fractional_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("needs a finite fractional value", |f| {
        f.is_finite() && f.fract() != 0.0
    })
}

fn identifier() -> impl Strategy<Value = String> {
    "[._a-zA-Z][._a-zA-Z0-9]{0,24}".prop_filter("not a keyword or a number", |s| {
        let decimal = s.len() > 1 && s.starts_with('.') && s[1..].bytes().all(|b| b.is_ascii_digit());
        s != "true" && s != "false" && !decimal
    })
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        fractional_f32().prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        "[a-zA-Z0-9 _.,:;#/()-]{0,32}".prop_map(Value::String),
        identifier().prop_map(Value::Identifier),
    ]
}

proptest! {
    #[test]
    fn prop_integer(n in any::<i64>()) {
        prop_assert!(roundtrip(&Value::from(n)));
    }

    #[test]
    fn prop_hex_integer(n in any::<i64>()) {
        let text = if n < 0 {
            format!("-0x{:x}", -(n as i128))
        } else {
            format!("0x{:x}", n)
        };
        prop_assert_eq!(Value::parse(&text), Value::from(n));
    }

    #[test]
    fn prop_big_integer(digits in "[1-9][0-9]{19,40}") {
        let value = Value::parse(&digits);
        prop_assert_eq!(value.as_bigint().map(ToString::to_string), Some(digits));
    }

    #[test]
    fn prop_float(f in fractional_f32()) {
        prop_assert!(roundtrip(&Value::Float(f)));
    }

    #[test]
    fn prop_float_bits(bits in any::<u32>()) {
        let f = f32::from_bits(bits);
        prop_assume!(f.is_finite());
        let decoded = Value::parse(&format!("&{:08x}", bits));
        prop_assert_eq!(decoded.as_f32(), Some(f));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&Value::Bool(b)));
    }

    #[test]
    fn prop_string(s in "[^\"\\\\\n\r]{0,40}") {
        prop_assert!(roundtrip(&Value::String(s)));
    }

    #[test]
    fn prop_identifier(s in identifier()) {
        prop_assert!(roundtrip(&Value::Identifier(s)));
    }

    #[test]
    fn prop_int_vector(items in prop::collection::vec(any::<i64>(), 1..6)) {
        let vector = Value::IntVector(items.into_iter().map(BigInt::from).collect());
        prop_assert!(roundtrip(&vector));
    }

    #[test]
    fn prop_float_vector(
        first in fractional_f32(),
        rest in prop::collection::vec(any::<f32>().prop_filter("finite", |f| f.is_finite()), 0..5),
    ) {
        let mut items = vec![first];
        items.extend(rest);
        prop_assert!(roundtrip(&Value::FloatVector(items)));
    }

    #[test]
    fn prop_placement(
        location in prop::array::uniform3(-1.0e6f32..1.0e6),
        rotation in prop::array::uniform4(-1.0f32..1.0),
    ) {
        prop_assert!(roundtrip(&Value::Placement(Placement::new(location, rotation))));
    }

    #[test]
    fn prop_object_roundtrip(
        scalars in prop::collection::vec(scalar(), 0..6),
        list in prop::collection::vec(scalar(), 1..4),
        fixed in prop::collection::vec(scalar(), 1..4),
    ) {
        let mut object = Object::new("item.0", "item");
        for (i, value) in scalars.into_iter().enumerate() {
            object = object.with_attribute(format!("attr_{}", i), value);
        }
        object = object
            .with_attribute("list", Value::List(list))
            .with_attribute("fixed", Value::Array(fixed));
        let unit = Object::new("SiiNunit", "").with_child(object);

        let text = to_string(&unit);
        prop_assert_eq!(from_str(&text).unwrap(), unit.clone());

        let sealed = to_binary(&unit, &SealOptions::new()).unwrap();
        prop_assert_eq!(from_slice(&sealed).unwrap(), unit);
    }
}
