//! Whole-document tests for the canonical emitter.
//!
//! These drive the public API only: decode a module document, emit it, and
//! check the bytes (or the JSON they parse back into).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use apicanon_core::{ApiModule, EmissionError, TypeKind, emit, emit_json, emit_to_vec};
use serde_json::{Map, Value, json};

fn canonical(document: &Value) -> String {
    let module = ApiModule::from_value(document).unwrap();
    String::from_utf8(emit_to_vec(&module).unwrap()).unwrap()
}

fn reparse(output: &str) -> Value {
    serde_json::from_str(output).expect("canonical output is valid JSON")
}

fn keys(object: &Map<String, Value>) -> Vec<&str> {
    object.keys().map(String::as_str).collect()
}

fn minimal_type(kind: &str) -> Value {
    let common = json!({"Name": format!("T_{kind}"), "Architectures": [], "Platform": null, "Kind": kind});
    let extra = match kind {
        "Enum" => json!({"Flags": false, "Scoped": false, "Values": [], "IntegerBase": null}),
        "Struct" | "Union" => json!({"Size": 0, "PackingSize": 0, "Fields": [], "NestedTypes": []}),
        "Com" => json!({"Guid": null, "Interface": null, "Methods": []}),
        other => panic!("no fixture for {other}"),
    };

    // Put the variant fields first to show input order does not matter
    let mut merged = extra.as_object().unwrap().clone();
    merged.extend(common.as_object().unwrap().clone());
    Value::Object(merged)
}

fn sample_module() -> Value {
    json!({
        "Constants": [
            {"Name": "K1", "Type": {"Kind": "Native", "Name": "Int32"}, "ValueType": "Int32", "Value": 5, "Attrs": []}
        ],
        "Types": [
            {
                "Name": "E1", "Architectures": [], "Platform": null, "Kind": "Enum",
                "Flags": false, "Scoped": false,
                "Values": [{"Name": "E1_A", "Value": 0}, {"Name": "E1_B", "Value": 1}],
                "IntegerBase": null
            },
            {
                "Kind": "Struct", "Name": "S1", "Platform": "windows5.0", "Architectures": ["X64", "Arm64"],
                "Size": 16, "PackingSize": 8,
                "Fields": [
                    {"Name": "a", "Type": {"Kind": "Native", "Name": "UInt64"}, "Attrs": []},
                    {"Attrs": ["Const"], "Type": {"Kind": "PointerTo", "Child": {"Kind": "Native", "Name": "Void"}}, "Name": "b"}
                ],
                "NestedTypes": [
                    {
                        "Name": "_u_e__Union", "Architectures": [], "Platform": null, "Kind": "Union",
                        "Size": 8, "PackingSize": 0,
                        "Fields": [{"Name": "x", "Type": {"Kind": "Native", "Name": "Int64"}, "Attrs": []}],
                        "NestedTypes": []
                    }
                ]
            },
            {
                "Name": "IThing", "Architectures": [], "Platform": null, "Kind": "Com",
                "Guid": "00000000-0000-0000-0000-000000000001",
                "Interface": {"Kind": "ApiRef", "Name": "IUnknown", "TargetKind": "Com", "Api": "System.Com", "Parents": []},
                "Methods": [
                    {
                        "Name": "Do", "SetLastError": false,
                        "ReturnType": {"Kind": "ApiRef", "Name": "HRESULT", "TargetKind": "Default", "Api": "Foundation", "Parents": []},
                        "ReturnAttrs": [],
                        "Architectures": [], "Platform": null, "Attrs": [],
                        "Params": [
                            {"Name": "flags", "Type": {"Kind": "Native", "Name": "UInt32"}, "Attrs": ["In"]},
                            {"Name": "result", "Type": {"Kind": "Native", "Name": "Int32"}, "Attrs": ["Out", "RetVal"]}
                        ]
                    }
                ]
            }
        ],
        "Functions": [{"Name": "Deferred"}],
        "UnicodeAliases": ["DeferredW"]
    })
}

#[test]
fn test_end_to_end_enum_and_constant() {
    let output = reparse(&canonical(&sample_module()));

    let constants = output["Constants"].as_array().unwrap();
    assert_eq!(constants.len(), 1);
    assert_eq!(constants[0]["Name"], "K1");
    assert_eq!(constants[0]["Value"], 5);

    let enums: Vec<&Value> = output["Types"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["Kind"] == "Enum")
        .collect();
    assert_eq!(enums.len(), 1);
    assert_eq!(enums[0]["Name"], "E1");
    assert_eq!(enums[0]["Values"].as_array().unwrap().len(), 2);

    assert_eq!(output["Functions"], json!([]));
    assert_eq!(output["UnicodeAliases"], json!([]));
}

#[test]
fn test_emission_is_deterministic() {
    let module = ApiModule::from_value(&sample_module()).unwrap();
    let first = emit_to_vec(&module).unwrap();
    let second = emit_to_vec(&module).unwrap();
    assert_eq!(first, second);

    let mut via_sink = Vec::new();
    emit(&mut via_sink, &module).unwrap();
    assert_eq!(first, via_sink);
}

#[test]
fn test_canonical_form_is_a_fixed_point() {
    let once = canonical(&sample_module());
    let twice = canonical(&reparse(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_order_is_preserved() {
    let output = reparse(&canonical(&sample_module()));

    let type_names: Vec<&str> = output["Types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["Name"].as_str().unwrap())
        .collect();
    assert_eq!(type_names, vec!["E1", "S1", "IThing"]);

    let field_names: Vec<&str> = output["Types"][1]["Fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["Name"].as_str().unwrap())
        .collect();
    assert_eq!(field_names, vec!["a", "b"]);

    let params: Vec<&str> = output["Types"][2]["Methods"][0]["Params"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["Name"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["flags", "result"]);
}

#[test]
fn test_field_order_ignores_input_order() {
    let output = reparse(&canonical(&sample_module()));
    let s1 = output["Types"][1].as_object().unwrap();
    assert_eq!(
        keys(s1),
        vec![
            "Name",
            "Architectures",
            "Platform",
            "Kind",
            "Size",
            "PackingSize",
            "Fields",
            "NestedTypes"
        ]
    );
    let field_b = output["Types"][1]["Fields"][1].as_object().unwrap();
    assert_eq!(keys(field_b), vec!["Name", "Type", "Attrs"]);
}

#[test]
fn test_each_kind_emits_exactly_its_fields() {
    let expected: [(&str, &[&str]); 4] = [
        ("Enum", &["Flags", "Scoped", "Values", "IntegerBase"]),
        ("Struct", &["Size", "PackingSize", "Fields", "NestedTypes"]),
        ("Union", &["Size", "PackingSize", "Fields", "NestedTypes"]),
        ("Com", &["Guid", "Interface", "Methods"]),
    ];
    assert_eq!(expected.map(|(kind, _)| kind), TypeKind::NAMES);

    for (kind, variant_fields) in expected {
        let document = json!({"Constants": [], "Types": [minimal_type(kind)]});
        let output = reparse(&canonical(&document));
        let ty = output["Types"][0].as_object().unwrap();

        let mut fields = vec!["Name", "Architectures", "Platform", "Kind"];
        fields.extend_from_slice(variant_fields);
        assert_eq!(keys(ty), fields, "field list for {kind}");
    }
}

#[test]
fn test_method_drops_unmodelled_fields() {
    let output = reparse(&canonical(&sample_module()));
    let method = output["Types"][2]["Methods"][0].as_object().unwrap();
    assert_eq!(
        keys(method),
        vec![
            "Name",
            "SetLastError",
            "ReturnType",
            "Architectures",
            "Platform",
            "Attrs",
            "Params"
        ]
    );
}

#[test]
fn test_unknown_kind_writes_nothing() {
    let mut document = json!({"Constants": [], "Types": [minimal_type("Enum")]});
    document["Types"][0]["Kind"] = json!("NativeTypedef");

    let mut sink = Vec::new();
    let err = emit_json(&mut sink, &document.to_string()).unwrap_err();
    assert!(matches!(
        err,
        EmissionError::UnknownVariantKind { ref kind, .. } if kind == "NativeTypedef"
    ));
    assert!(sink.is_empty());
}

#[test]
fn test_exact_bytes_for_small_module() {
    let document = json!({
        "Constants": [
            {"Name": "K1", "Type": {"Kind": "Native", "Name": "Int32"}, "ValueType": "Int32", "Value": 5, "Attrs": []}
        ],
        "Types": [
            {"Name": "E1", "Architectures": [], "Platform": null, "Kind": "Enum", "Flags": false, "Scoped": false,
             "Values": [{"Name": "E1_A", "Value": 0}, {"Name": "E1_B", "Value": 1}], "IntegerBase": null}
        ]
    });

    let expected = concat!(
        "{\r\n",
        "\r\n",
        "\"Constants\":[\r\n",
        "\t{\r\n",
        "\t\t\"Name\":\"K1\"\r\n",
        "\t\t,\"Type\":{\"Kind\":\"Native\",\"Name\":\"Int32\"}\r\n",
        "\t\t,\"ValueType\":\"Int32\"\r\n",
        "\t\t,\"Value\":5\r\n",
        "\t\t,\"Attrs\":[]\r\n",
        "\t}\r\n",
        "]\r\n",
        "\r\n",
        ",\"Types\":[\r\n",
        "\t{\r\n",
        "\t\t\"Name\":\"E1\"\r\n",
        "\t\t,\"Architectures\":[]\r\n",
        "\t\t,\"Platform\":null\r\n",
        "\t\t,\"Kind\":\"Enum\"\r\n",
        "\t\t,\"Flags\":false\r\n",
        "\t\t,\"Scoped\":false\r\n",
        "\t\t,\"Values\":[\r\n",
        "\t\t\t{\"Name\":\"E1_A\",\"Value\":0}\r\n",
        "\t\t\t,{\"Name\":\"E1_B\",\"Value\":1}\r\n",
        "\t\t]\r\n",
        "\t\t,\"IntegerBase\":null\r\n",
        "\t}\r\n",
        "]\r\n",
        "\r\n",
        ",\"Functions\":[\r\n",
        "]\r\n",
        "\r\n",
        ",\"UnicodeAliases\":[\r\n",
        "]\r\n",
        "\r\n",
        "}\r\n",
    );
    assert_eq!(canonical(&document), expected);
}

#[test]
fn test_only_crlf_line_endings() {
    let output = canonical(&sample_module());
    assert_eq!(output.matches('\n').count(), output.matches("\r\n").count());
    assert!(!output.contains("    "), "indentation must be tabs");
}
