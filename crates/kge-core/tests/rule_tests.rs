use kge_core::{IoOptions, Rule, RuleSet, if_var, key, set_var};
use serde_json::json;

fn no_backup() -> IoOptions {
    IoOptions {
        backup: false,
        ..IoOptions::default()
    }
}

#[test]
fn rule_from_json() {
    let data = json!({
        "description": "Test Rule",
        "manipulators": [
            {"type": "basic", "from": {"key_code": "a"}, "to": [{"key_code": "b"}]}
        ]
    });
    let rule = Rule::from_json(&data).unwrap();
    assert_eq!(rule.description, "Test Rule");
    assert_eq!(
        rule.manipulators(),
        &[json!({"type": "basic", "from": {"key_code": "a"}, "to": [{"key_code": "b"}]})]
    );

    let parsed: Rule = data.to_string().parse().unwrap();
    assert_eq!(parsed, rule);
    assert_eq!(rule.to_json(), data);

    assert!(Rule::from_json(&json!([1])).is_err());
}

#[test]
fn remap_defaults_type_to_basic() {
    let mut rule = Rule::new("This is a test rule.");
    rule.remap(json!({"from": {"key_code": "a"}, "to": [{"key_code": "b"}]}));
    assert_eq!(
        rule.manipulators(),
        &[json!({"type": "basic", "from": {"key_code": "a"}, "to": [{"key_code": "b"}]})]
    );

    let mut rule = Rule::new("typed");
    rule.remap(json!({"type": "", "from": "a"}))
        .remap(json!({"type": "mouse_motion_to_scroll", "from": "a"}));
    assert_eq!(rule.manipulators()[0]["type"], json!("basic"));
    assert_eq!(rule.manipulators()[1]["type"], json!("mouse_motion_to_scroll"));
}

#[test]
fn remap_chains() {
    let mut rule = Rule::new("chain");
    rule.remap(json!({"from": {"key_code": "a"}, "to": [{"key_code": "b"}]}))
        .remap(json!({"from": {"key_code": "b"}, "to": [{"key_code": "c"}]}))
        .remap(json!({"from": {"key_code": "c"}, "to": [{"key_code": "d"}]}));
    let froms: Vec<_> = rule
        .manipulators()
        .iter()
        .map(|m| m["from"]["key_code"].clone())
        .collect();
    assert_eq!(froms, [json!("a"), json!("b"), json!("c")]);
}

#[test]
fn remap_with_string_expressions() {
    let mut rule = Rule::new("strings");
    rule.remap(json!({"from": "a", "to": "b"}));
    assert_eq!(
        rule.manipulators()[0],
        json!({"type": "basic", "from": {"key_code": "a"}, "to": [{"key_code": "b"}]})
    );

    let mut rule = Rule::new("modifiers");
    rule.remap(json!({"from": "shift + a", "to": "control + b"}));
    assert_eq!(
        rule.manipulators()[0],
        json!({
            "type": "basic",
            "from": {"key_code": "a", "modifiers": {"mandatory": ["shift"]}},
            "to": [{"key_code": "b", "modifiers": ["control"]}]
        })
    );

    let mut rule = Rule::new("optional");
    rule.remap(json!({
        "from": "shift + (control) + a",
        "to": ["control + b", "shift + command + c"]
    }));
    assert_eq!(
        rule.manipulators()[0],
        json!({
            "type": "basic",
            "from": {
                "key_code": "a",
                "modifiers": {"mandatory": ["shift"], "optional": ["control"]}
            },
            "to": [
                {"key_code": "b", "modifiers": ["control"]},
                {"key_code": "c", "modifiers": ["shift", "command"]}
            ]
        })
    );
}

#[test]
fn remap_normalizes_modifier_shorthand_and_event_lists() {
    let mut rule = Rule::new("shorthand");
    rule.remap(json!({
        "from": {"key_code": "a", "modifiers": "fn"},
        "to": {"key_code": "b", "modifiers": "shift"},
        "to_if_alone": key("escape"),
        "to_delayed_action": {"to_if_invoked": set_var("x", 0, None)}
    }));
    let m = &rule.manipulators()[0];
    assert_eq!(m["from"]["modifiers"], json!({"mandatory": ["fn"]}));
    assert_eq!(m["to"], json!([{"key_code": "b", "modifiers": ["shift"]}]));
    assert_eq!(m["to_if_alone"], json!([{"key_code": "escape"}]));
    assert_eq!(
        m["to_delayed_action"]["to_if_invoked"],
        json!([{"set_variable": {"name": "x", "value": 0}}])
    );
}

#[test]
fn remap_drops_empty_members() {
    let mut rule = Rule::new("empty");
    rule.remap(json!({"from": "a", "to": "b", "to_if_alone": [], "parameters": {}}));
    let m = rule.manipulators()[0].as_object().unwrap();
    assert!(!m.contains_key("to_if_alone"));
    assert!(!m.contains_key("parameters"));

    rule.remap(json!(null));
    assert_eq!(rule.manipulators().len(), 1);
}

#[test]
fn conditions_attach_to_later_remaps() {
    let mut rule = Rule::new("conditional");
    rule.remap(json!({"from": "a", "to": "b"}))
        .cond(if_var("mode", 1))
        .cond(json!({}))
        .remap(json!({"from": "c", "to": "d"}));
    assert_eq!(rule.conditions().len(), 1);
    assert!(rule.manipulators()[0].get("conditions").is_none());
    assert_eq!(
        rule.manipulators()[1]["conditions"],
        json!([{"type": "variable_if", "name": "mode", "value": 1}])
    );
    // conditions are builder state, not output
    assert!(rule.to_json().get("conditions").is_none());
}

#[test]
fn ruleset_builds_and_serializes() {
    let mut set = RuleSet::new("My Rules");
    set.add("first").remap(json!({"from": "a", "to": "b"}));
    set.add(Rule::new("second"));
    assert_eq!(set.rules().len(), 2);
    assert_eq!(set.rules()[1].description, "second");

    let out = set.to_json();
    assert_eq!(out["title"], json!("My Rules"));
    assert_eq!(out["rules"][0]["description"], json!("first"));
    assert_eq!(out["rules"][1]["manipulators"], json!([]));

    let text = set.to_json_string().unwrap();
    assert!(text.starts_with("{\n  \"title\": \"My Rules\","));
    let back: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back, out);
}

#[test]
fn ruleset_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mine.json");

    let mut set = RuleSet::new("Saved");
    set.set_io(&path, no_backup());
    set.add("swap").remap(json!({"from": "a", "to": "b"}));
    set.save().unwrap();

    let loaded = RuleSet::from_file(&path, no_backup()).unwrap();
    assert_eq!(loaded.title, "Saved");
    assert_eq!(loaded.rules(), set.rules());
    assert_eq!(loaded.io().unwrap().path(), path.as_path());
}

#[test]
fn ruleset_without_io_cannot_save() {
    let mut set = RuleSet::new("nowhere");
    assert!(matches!(set.save(), Err(kge_core::Error::IoNotSet)));
}

#[test]
fn ruleset_from_str_appends_rules() {
    let set: RuleSet = r#"{"title": "T", "rules": [{"description": "r", "manipulators": []}]}"#
        .parse()
        .unwrap();
    assert_eq!(set.title, "T");
    assert_eq!(set.rules()[0].description, "r");

    let bad: Result<RuleSet, _> = "[]".parse();
    assert!(bad.is_err());
}
