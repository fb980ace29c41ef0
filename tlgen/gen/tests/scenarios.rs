//! Behavioral scenarios for the generated code.
//!
//! The fast tests inspect the emitted source. The ignored test writes the
//! generated crate to disk together with a runtime test suite and runs
//! `cargo test` on it.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

use tlgen_gen::builder::build_schema;
use tlgen_gen::cargo_gen::write_cargo_toml;
use tlgen_gen::output::{generate_and_write, generate_fragments, group_fragments};
use tlgen_gen::parser::parse_schema;

const SCENARIO_SCHEMA: &str = r#"
//@description A standalone record @value Some text
testA value:string = TestA;

//@class AbstractX @description An abstract family

//@description The first variant @flag A flag
variantOne flag:Bool = AbstractX;

//@description The second variant @id A large identifier
variantTwo id:int64 = AbstractX;

//@description Holds abstract values @inner Single value @items Several values
holder inner:AbstractX items:vector<AbstractX> = Holder;

---functions---

//@description Looks up an abstract value @key Lookup key
getAbstract key:string = AbstractX;

//@description Returns a record @value Value to echo
echoTestA value:string = TestA;
"#;

const RUNTIME_TESTS: &str = r#"
use std::cell::RefCell;

use scenario::*;
use serde_json::{json, Value};

struct Canned {
    response: Value,
    sent: RefCell<Vec<Value>>,
}

impl Canned {
    fn new(response: Value) -> Self {
        Self { response, sent: RefCell::new(Vec::new()) }
    }
}

impl Transport for Canned {
    fn send(&self, request: Value) -> Result<Value, TdError> {
        self.sent.borrow_mut().push(request);
        Ok(self.response.clone())
    }

    fn execute(&self, request: Value) -> Result<Value, TdError> {
        self.send(request)
    }
}

#[test]
fn record_sets_wire_discriminant() {
    let value = serde_json::to_value(TestA::new("hello".to_string())).unwrap();
    assert_eq!(value, json!({ "@type": "testA", "value": "hello" }));
}

#[test]
fn dispatch_routes_known_discriminant() {
    let payload = json!({ "@type": "variantOne", "flag": true });
    let decoded = unmarshal_abstract_x(Some(&payload)).unwrap().unwrap();
    assert_eq!(decoded, AbstractX::from(VariantOne::new(true)));
    assert_eq!(decoded.abstract_x_enum(), AbstractXEnum::VariantOne);
}

#[test]
fn dispatch_rejects_unknown_discriminant() {
    let payload = json!({ "@type": "variantThree" });
    let err = unmarshal_abstract_x(Some(&payload)).unwrap_err();
    assert!(matches!(err, TdError::UnknownDiscriminant { discriminant, .. } if discriminant == "variantThree"));
}

#[test]
fn dispatch_treats_null_as_absent() {
    assert!(unmarshal_abstract_x(None).unwrap().is_none());
    assert!(unmarshal_abstract_x(Some(&Value::Null)).unwrap().is_none());
}

#[test]
fn error_response_is_a_request_error() {
    let client = Client::new(Canned::new(json!({
        "@type": "error",
        "code": 404,
        "message": "Not Found"
    })));
    let err = client.get_abstract("missing".to_string()).unwrap_err();
    assert!(matches!(err, TdError::Request { code: 404, ref message } if message == "Not Found"));
}

#[test]
fn request_carries_raw_names() {
    let client = Client::new(Canned::new(json!({ "@type": "variantOne", "flag": false })));
    let value = client.get_abstract("k".to_string()).unwrap();
    assert_eq!(value, AbstractX::from(VariantOne::new(false)));

    let sent = client.transport().sent.borrow();
    assert_eq!(sent[0], json!({ "@type": "getAbstract", "key": "k" }));
}

#[test]
fn large_int64_survives_round_trip() {
    let original = VariantTwo::new(JsonInt64(i64::MAX));
    let value = serde_json::to_value(&original).unwrap();
    assert_eq!(value["id"], json!("9223372036854775807"));
    let decoded: VariantTwo = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn record_with_interface_fields_round_trips() {
    let original = Holder::new(
        Some(VariantTwo::new(JsonInt64(1 << 60)).into()),
        vec![VariantOne::new(true).into(), VariantTwo::new(JsonInt64(-7)).into()],
    );
    let value = serde_json::to_value(&original).unwrap();
    let decoded: Holder = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, original);
}
"#;

fn generated_files() -> HashMap<PathBuf, String> {
    let schema = build_schema(parse_schema(SCENARIO_SCHEMA).unwrap()).unwrap();
    let fragments = generate_fragments(&schema).unwrap();
    group_fragments(&fragments).into_iter().collect()
}

fn file(files: &HashMap<PathBuf, String>, path: &str) -> String {
    files
        .get(&PathBuf::from(path))
        .unwrap_or_else(|| panic!("missing generated file {path}"))
        .clone()
}

fn compact(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn standalone_record_has_single_string_field() {
    let files = generated_files();
    let code = file(&files, "types/test_a.rs");

    assert!(code.contains("pub struct TestA {"));
    assert!(code.contains("#[serde(rename = \"value\", default)]"));
    assert!(code.contains("pub value: String,"));
    assert_eq!(code.matches("pub value:").count(), 1);

    let compact = compact(&code);
    assert!(compact.contains("pubfnnew(value:String)->Self"));
    assert!(compact.contains("header:Header::new(\"testA\")"));
    assert!(compact.contains("fnmessage_type(&self)->&'staticstr{\"testA\"}"));
}

#[test]
fn interface_has_one_constant_per_variant() {
    let files = generated_files();
    let compact = compact(&file(&files, "types/abstract_x.rs"));

    assert!(compact.contains("pubenumAbstractXEnum{VariantOne,VariantTwo,}"));
    assert!(compact.contains("AbstractXEnum::VariantOne=>\"variantOne\""));
    assert!(compact.contains("AbstractXEnum::VariantTwo=>\"variantTwo\""));
}

#[test]
fn dispatch_registry_maps_discriminants_to_decoders() {
    let files = generated_files();
    let compact = compact(&file(&files, "types/abstract_x.rs"));

    let insert = compact
        .find("registry.insert(\"variantOne\",|payload|")
        .expect("variantOne is registered");
    assert!(compact[insert..].contains("AbstractX::VariantOne(Box::new(serde_json::from_value(payload)?))"));
    assert!(compact.contains("registry.insert(\"variantTwo\",|payload|"));
    assert!(compact.contains("HashMap::with_capacity(2usize)"));
    assert!(compact.contains("TdError::UnknownDiscriminant{interface:\"AbstractX\""));
    assert!(!compact.contains("variantThree"));
}

#[test]
fn error_discriminant_is_checked_before_decoding() {
    let files = generated_files();
    let compact = compact(&file(&files, "methods/abstract_x.rs"));

    let check = compact
        .find("check_response(self.transport().send(request)?)?")
        .expect("response is checked");
    let decode = compact
        .find("unmarshal_abstract_x(Some(&response))")
        .expect("response is dispatched");
    assert!(check < decode);

    let shared = compact_shared(&files);
    assert!(shared.contains("!=Some(\"error\")"));
    assert!(shared.contains("Err(TdError::Request{code,message})"));
}

fn compact_shared(files: &HashMap<PathBuf, String>) -> String {
    compact(&file(files, "shared.rs"))
}

#[test]
fn variants_share_the_interface_file() {
    let files = generated_files();
    let code = file(&files, "types/abstract_x.rs");

    assert!(code.contains("pub struct VariantOne {"));
    assert!(code.contains("pub struct VariantTwo {"));
    assert!(!files.contains_key(&PathBuf::from("types/variant_one.rs")));
    assert_eq!(code.matches("use super::*;").count(), 1);
}

/// Runs the generated crate's own tests against the scenario schema.
#[test]
#[ignore = "slow: compiles and tests generated code"]
fn generated_code_behaves_at_runtime() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crate_dir = temp_dir.path().join("scenario");
    let src_dir = crate_dir.join("src");

    let schema = build_schema(parse_schema(SCENARIO_SCHEMA).unwrap()).unwrap();
    generate_and_write(&schema, &src_dir, false).expect("Failed to generate code");
    write_cargo_toml(&crate_dir, "scenario", false).expect("Failed to write Cargo.toml");

    let tests_dir = crate_dir.join("tests");
    fs::create_dir_all(&tests_dir).unwrap();
    fs::write(tests_dir.join("runtime.rs"), RUNTIME_TESTS).unwrap();

    let output = Command::new("cargo")
        .args(["test", "--manifest-path"])
        .arg(crate_dir.join("Cargo.toml"))
        .output()
        .expect("Failed to run cargo test");

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "Generated code failed its runtime tests:\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
            stdout, stderr
        );
    }
}
