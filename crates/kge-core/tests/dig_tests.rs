use kge_core::{DigError, DigOptions, DigPath, Dug, Expected, Sanitizer, Segment, dig};
use serde_json::{Value, json};

#[test]
fn get_nested_value() {
    let mut v = json!({"a": {"b": 1}});
    let found = dig(&mut v, "a.b", &DigOptions::new()).unwrap();
    assert_eq!(found.key(), Some("b"));
    assert_eq!(found.value(), Some(&json!(1)));
}

#[test]
fn empty_path_is_root() {
    let mut v = json!({"a": 1});
    let found = dig(&mut v, "", &DigOptions::new()).unwrap();
    assert!(matches!(found, Dug::Root(_)));
    assert_eq!(found.to_json(), json!({"a": 1}));
}

#[test]
fn set_and_mutate_destination() {
    let mut v = json!({"a": {"b": 1}});
    dig(&mut v, "a.b", &DigOptions::new().set(2)).unwrap();
    assert_eq!(v["a"]["b"], json!(2));

    let bump = |x: Value| json!(x.as_i64().unwrap_or(0) + 10);
    dig(&mut v, "a.b", &DigOptions::new().mutate(bump)).unwrap();
    assert_eq!(v["a"]["b"], json!(12));

    // set happens first, mutate sees the new value
    dig(&mut v, "a.b", &DigOptions::new().set(1).mutate(bump)).unwrap();
    assert_eq!(v["a"]["b"], json!(11));
}

#[test]
fn numeric_segments_index_arrays() {
    let mut v = json!({"a": [10, 20, 30]});
    let found = dig(&mut v, "a.1", &DigOptions::new()).unwrap().to_json();
    assert_eq!(found, json!(20));
    let err = dig(&mut v, "a.3", &DigOptions::new()).unwrap_err();
    assert_eq!(err, DigError::NoSuchKey { key: "3".into() });
    let err = dig(&mut v, "a.01", &DigOptions::new()).unwrap_err();
    assert_eq!(err, DigError::NoSuchKey { key: "01".into() });
}

#[test]
fn missing_key_and_type_errors() {
    let mut v = json!({"a": 1, "list": {"x": 1}});
    assert_eq!(
        dig(&mut v, "b", &DigOptions::new()).unwrap_err(),
        DigError::NoSuchKey { key: "b".into() }
    );
    assert_eq!(
        dig(&mut v, "a.b", &DigOptions::new()).unwrap_err(),
        DigError::TypeMismatch {
            key: "a".into(),
            expected: Expected::Object
        }
    );
    assert_eq!(
        dig(&mut v, "list[]", &DigOptions::new()).unwrap_err(),
        DigError::TypeMismatch {
            key: "list".into(),
            expected: Expected::Array
        }
    );
}

#[test]
fn scalar_root_is_rejected() {
    let mut v = json!(1);
    assert_eq!(
        dig(&mut v, "a", &DigOptions::new()).unwrap_err(),
        DigError::InvalidArgument
    );
}

#[test]
fn malformed_paths() {
    for bad in ["a..b", ".a", "a.", "[]", "a.[]"] {
        assert!(
            matches!(DigPath::parse(bad), Err(DigError::InvalidPath { .. })),
            "{bad}"
        );
    }
    let path = DigPath::parse("a.*.b[]").unwrap();
    assert_eq!(
        path.segments(),
        &[
            Segment::Key("a".into()),
            Segment::Wildcard,
            Segment::Array("b".into())
        ]
    );
    assert_eq!(path.to_string(), "a.*.b[]");
}

#[test]
fn make_path_creates_objects() {
    let mut v = json!({"a": 1});
    dig(&mut v, "x.y.z", &DigOptions::new().set(true).make_path()).unwrap();
    assert_eq!(v, json!({"a": 1, "x": {"y": {"z": true}}}));

    // destination without a value is created as null
    dig(&mut v, "x.w", &DigOptions::new().make_path()).unwrap();
    assert_eq!(v["x"]["w"], Value::Null);
    assert!(v["x"].as_object().unwrap().contains_key("w"));
}

#[test]
fn make_path_with_factory() {
    let mut v = json!({});
    let opts = DigOptions::new()
        .set(1)
        .make_path_with(|_, key, depth| json!({ "made": format!("{key}@{depth}") }));
    dig(&mut v, "p.q", &opts).unwrap();
    assert_eq!(v, json!({"p": {"made": "p@0", "q": 1}}));
}

#[test]
fn make_path_cannot_insert_into_arrays() {
    let mut v = json!({"a": [1]});
    let err = dig(&mut v, "a.x", &DigOptions::new().set(1).make_path()).unwrap_err();
    assert_eq!(
        err,
        DigError::TypeMismatch {
            key: "x".into(),
            expected: Expected::Object
        }
    );
}

#[test]
fn custom_has_overrides_existence() {
    let mut v = json!({"a": {"b": 1}});
    let opts = DigOptions::new()
        .has(|_, _| false)
        .make_path()
        .set(2);
    dig(&mut v, "a.c", &opts).unwrap();
    assert_eq!(v, json!({"a": {"c": 2}}));
}

#[test]
fn wildcard_collects_by_key_and_skips_failed_branches() {
    let mut v = json!({
        "devices": {
            "kb": {"id": 1},
            "mouse": {"id": 2},
            "pad": {"name": "x"},
            "count": 3
        }
    });
    {
        let found = dig(&mut v, "devices.*.id", &DigOptions::new()).unwrap();
        let Dug::Keyed(entries) = &found else {
            panic!("expected keyed result, got {:?}", found);
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["kb", "mouse"]);
        assert_eq!(found.to_json(), json!({"kb": 1, "mouse": 2}));
    }

    // the same miss outside a wildcard is an error
    assert!(dig(&mut v, "devices.pad.id", &DigOptions::new()).is_err());
}

#[test]
fn wildcard_as_destination_writes_every_child() {
    let mut v = json!({"a": {"x": 1, "y": 2}, "b": [1, 2]});
    dig(&mut v, "a.*", &DigOptions::new().set(0)).unwrap();
    assert_eq!(v["a"], json!({"x": 0, "y": 0}));
    let found = dig(&mut v, "b.*", &DigOptions::new()).unwrap().to_json();
    assert_eq!(found, json!({"0": 1, "1": 2}));
}

#[test]
fn array_segment_expands_elements() {
    let mut v = json!({"profiles": [{"name": "a"}, {"name": "b"}, {"x": 1}, 5]});
    let names = dig(&mut v, "profiles[].name", &DigOptions::new())
        .unwrap()
        .to_json();
    assert_eq!(names, json!(["a", "b"]));

    dig(
        &mut v,
        "profiles[].selected",
        &DigOptions::new().set(false).make_path(),
    )
    .unwrap();
    assert_eq!(v["profiles"][0]["selected"], json!(false));
    assert_eq!(v["profiles"][2]["selected"], json!(false));
    assert_eq!(v["profiles"][3], json!(5));

    let found = dig(&mut v, "profiles[]", &DigOptions::new()).unwrap();
    let Dug::Listed(items) = found else {
        panic!("expected listed result");
    };
    assert_eq!(items.len(), 4);
    assert_eq!(items[1].key(), Some("1"));
}

#[test]
fn into_value_gives_a_mutable_handle() {
    let mut v = json!({"a": {"b": [1]}});
    if let Some(slot) = dig(&mut v, "a.b", &DigOptions::new()).unwrap().into_value() {
        slot.as_array_mut().unwrap().push(json!(2));
    }
    assert_eq!(v, json!({"a": {"b": [1, 2]}}));
}

#[test]
fn sanitizer_applies_filters_in_order() {
    let sanitizer = Sanitizer::new()
        .add_filter(["a", "b[]", "missing.path"], |v| {
            json!(v.as_i64().unwrap_or(0) * 2)
        })
        .unwrap()
        .add_filter(["a"], |v| json!(v.as_i64().unwrap_or(0) + 1))
        .unwrap();
    let out = sanitizer.sanitize(json!({"a": 1, "b": [1, 2]}));
    assert_eq!(out, json!({"a": 3, "b": [2, 4]}));

    // scalars pass through untouched
    assert_eq!(sanitizer.sanitize(json!("x")), json!("x"));
}

#[test]
fn sanitizer_rejects_bad_paths() {
    let res = Sanitizer::new().add_filter(["a..b"], |v| v);
    assert!(matches!(res, Err(DigError::InvalidPath { .. })));
}

#[test]
fn wildcard_at_root_returns_every_value() {
    let mut v = json!({"x": 1, "y": 2});
    let found = dig(&mut v, "*", &DigOptions::new()).unwrap().to_json();
    assert_eq!(found, json!({"x": 1, "y": 2}));

    let mut v = json!({"a": {"x": 1, "y": 2}});
    let found = dig(&mut v, "a.*", &DigOptions::new()).unwrap().to_json();
    assert_eq!(found, json!({"x": 1, "y": 2}));
}

#[test]
fn created_chain_is_found_without_make_path() {
    let mut v = json!({});
    assert!(dig(&mut v, "a.b.c", &DigOptions::new()).is_err());
    dig(&mut v, "a.b.c", &DigOptions::new().set(1).make_path()).unwrap();
    let found = dig(&mut v, "a.b.c", &DigOptions::new()).unwrap().to_json();
    assert_eq!(found, json!(1));
}
