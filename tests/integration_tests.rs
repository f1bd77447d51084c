use sii_unit::envelope::{self, SiiHeader, ENCRYPTED_SIGNATURE};
use sii_unit::{
    from_reader, from_slice, from_str, to_binary, to_string, to_string_with_options, Compression,
    Error, FsIncludeProvider, Object, Reader, SealOptions, Value, WriteOptions,
};
use std::fs::{self, File};
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn read_fixture(name: &str) -> Vec<u8> {
    fs::read(data_dir().join(name)).unwrap()
}

fn parse_fixture(name: &str) -> Object {
    Reader::new().read(File::open(data_dir().join(name)).unwrap()).unwrap()
}

/// Builds a container the way the game does: zlib stream, encrypted, zeroed tag.
fn game_container(text: &[u8]) -> Vec<u8> {
    let compressed = envelope::compress(text, Compression::Zlib).unwrap();
    let (cipher, iv) = envelope::encrypt(&compressed, Some([0x5a; 16]));
    let header = SiiHeader {
        signature: ENCRYPTED_SIGNATURE,
        hmac: [0; 32],
        iv,
        data_size: text.len() as u32,
    };

    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(&cipher);
    out
}

fn assert_roundtrip(object: &Object) {
    let text = to_string(object);
    let reparsed = from_str(&text).unwrap();
    assert_eq!(&reparsed, object, "reparsing:\n{}", text);
}

#[test]
fn test_text_and_binary_samples_agree() {
    let text = parse_fixture("sample.sii");
    let binary = from_slice(&game_container(&read_fixture("sample_compact.sii"))).unwrap();

    assert_eq!(text.child_count(), binary.child_count());
    for (left, right) in text.children().zip(binary.children()) {
        assert_eq!(left.name(), right.name());
        assert_eq!(left.attributes(), right.attributes());
    }
    assert_eq!(text, binary);
}

#[test]
fn test_sample_contents() {
    let unit = parse_fixture("sample.sii");
    let company = unit.child("company.permanent.aaa_mcm").unwrap();

    assert_eq!(company.attribute("name").and_then(Value::as_str), Some("AAA MCM #1"));
    assert_eq!(
        company.attribute("cities"),
        Some(&Value::Array(vec![
            Value::from("donna"),
            Value::from("cavallo"),
            Value::from("re"),
        ]))
    );
    assert_eq!(company.attribute("founded").and_then(Value::as_i64), Some(2000));

    let depot = company.child("company.permanent.aaa_mcm.depot").unwrap();
    assert_eq!(depot.class_name(), "company_depot");
    assert_eq!(depot.attribute("capacity").and_then(Value::as_i64), Some(12));

    let job = unit.child("job.0").unwrap();
    assert_eq!(job.attribute("ratio"), Some(&Value::Float(0.625)));
    assert_eq!(
        job.attribute("cargo").and_then(Value::as_identifier),
        Some("cargo.logs")
    );
}

#[test]
fn test_children_by_class_name() {
    let unit = parse_fixture("sample.sii");

    let companies: Vec<_> = unit
        .children_by_class_name("company_permanent")
        .map(Object::name)
        .collect();
    assert_eq!(companies, vec!["company.permanent.aaa_mcm"]);
    assert_eq!(unit.children_by_class_name("job_offer").count(), 1);
    assert_eq!(unit.children_by_class_name("company_depot").count(), 0);
}

#[test]
fn test_serialize_roundtrip() {
    assert_roundtrip(&parse_fixture("sample.sii"));
    assert_roundtrip(&parse_fixture("sample_compact.sii"));
}

#[test]
fn test_serialize_roundtrip_with_indent() {
    let unit = parse_fixture("sample.sii");
    let text = to_string_with_options(&unit, &WriteOptions::new().with_indent(4));

    assert!(text.contains("\n    company_permanent : company.permanent.aaa_mcm {\n"));
    assert_eq!(from_str(&text).unwrap(), unit);
}

#[test]
fn test_binary_roundtrip() {
    let unit = parse_fixture("sample.sii");

    for compression in [Compression::None, Compression::Gzip, Compression::Zlib] {
        let options = SealOptions::new().with_compression(compression);
        let sealed = to_binary(&unit, &options).unwrap();

        assert_eq!(Reader::new().read_binary(sealed.as_slice()).unwrap(), unit);
        assert_eq!(from_reader(sealed.as_slice()).unwrap(), unit);
    }
}

#[test]
fn test_binary_errors() {
    let sealed = game_container(&read_fixture("sample.sii"));

    let truncated = &sealed[..SiiHeader::SIZE - 1];
    assert!(matches!(
        Reader::new().read_binary(truncated),
        Err(Error::InvalidFormat { .. })
    ));

    let mut misaligned = sealed.clone();
    misaligned.pop();
    assert!(matches!(from_slice(&misaligned), Err(Error::Crypto(_))));

    let mut wrong_signature = sealed;
    wrong_signature[0] = b'X';
    assert!(matches!(
        Reader::new().read_binary(wrong_signature.as_slice()),
        Err(Error::InvalidFormat { .. })
    ));
}

#[test]
fn test_includes_from_disk() {
    let reader = Reader::with_include_provider(FsIncludeProvider::new(data_dir()));
    let unit = reader.read(read_fixture("includer.sii").as_slice()).unwrap();

    let names: Vec<_> = unit.children_by_class_name("part").map(Object::name).collect();
    assert_eq!(names, vec!["engine.0", "chassis.0"]);
    assert_eq!(
        unit.child("chassis.0").and_then(|o| o.attribute("axles")),
        Some(&Value::from(3))
    );
    assert_eq!(
        unit.child("truck.0").and_then(|o| o.attribute("brand")),
        Some(&Value::from("scania"))
    );
}

#[test]
fn test_includes_inside_binary() {
    let reader = Reader::with_include_provider(FsIncludeProvider::new(data_dir()));
    let sealed = game_container(&read_fixture("includer.sii"));

    assert_eq!(reader.read(sealed.as_slice()).unwrap().child_count(), 3);
}

#[test]
fn test_include_errors() {
    let text = read_fixture("includer.sii");

    assert!(matches!(
        Reader::new().read(text.as_slice()),
        Err(Error::UnsupportedOperation(_))
    ));

    let empty = tempfile::tempdir().unwrap();
    let reader = Reader::with_include_provider(FsIncludeProvider::new(empty.path()));
    assert!(matches!(
        reader.read(text.as_slice()),
        Err(Error::NotFound(ref path)) if path == "def/parts.sii"
    ));

    let reader = Reader::with_include_provider(|_: &str| -> sii_unit::Result<Vec<u8>> {
        Ok(b"@include nowhere".to_vec())
    });
    assert!(matches!(
        reader.read(text.as_slice()),
        Err(Error::InvalidInclude(_))
    ));
}

#[test]
fn test_structural_errors() {
    assert!(matches!(
        from_str("SiiNunit\n{\nclass : a {\nx: 1\n"),
        Err(Error::UnexpectedEndOfObject { ref object }) if object == "a"
    ));
    assert!(matches!(
        from_str("SiiNunit\n{\nclass : a {\nx: 1 /* open\n}\n}"),
        Err(Error::Parse { line: 4, .. })
    ));
    assert!(matches!(
        from_str("SiiNunit\n{\nclass : a {\nnot an attribute\n}\n}"),
        Err(Error::InvalidAttribute(_))
    ));
    assert!(matches!(
        from_str("SiiNunit\n{\nclass : a {\nitems: 1\nitems[3]: 0\n}\n}"),
        Err(Error::ArrayIndexOutOfBounds { index: 3, len: 1, .. })
    ));
    assert!(matches!(from_str(""), Err(Error::InvalidFormat { .. })));
}

#[test]
fn test_unknown_values_survive() {
    let unit = from_str("SiiNunit\n{\nthing : t {\nodd: 1,2,3\nweird: (a, b)\n}\n}\n").unwrap();
    let thing = unit.child("t").unwrap();

    assert_eq!(thing.attribute("odd"), Some(&Value::Unknown("1,2,3".to_string())));
    assert_eq!(thing.attribute("weird"), Some(&Value::Unknown("(a, b)".to_string())));
    assert_roundtrip(&unit);
}

#[test]
fn test_escaped_strings_survive() {
    let unit = from_str(
        "SiiNunit\n{\nthing : t {\npath: \"c:\\\\dir\\\\\"\nquote: \"a \\\"b\\\" // c\"\n}\n}\n",
    )
    .unwrap();
    let thing = unit.child("t").unwrap();

    assert_eq!(thing.attribute("path").and_then(Value::as_str), Some("c:\\\\dir\\\\"));
    assert_eq!(
        thing.attribute("quote").and_then(Value::as_str),
        Some("a \\\"b\\\" // c")
    );
    assert_roundtrip(&unit);
}
