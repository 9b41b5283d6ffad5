//! Condition objects for [`crate::Rule::cond`].

use serde_json::{Value, json};

pub fn if_var(name: &str, value: impl Into<Value>) -> Value {
    variable("variable_if", name, value.into())
}

pub fn unless_var(name: &str, value: impl Into<Value>) -> Value {
    variable("variable_unless", name, value.into())
}

/// Matches when the frontmost application is one of `bundle_ids`.
pub fn if_app<I, S>(bundle_ids: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    app("frontmost_application_if", bundle_ids)
}

pub fn unless_app<I, S>(bundle_ids: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    app("frontmost_application_unless", bundle_ids)
}

/// Matches when the input source language is one of `languages`.
pub fn if_lang<I, S>(languages: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lang("input_source_if", languages)
}

pub fn unless_lang<I, S>(languages: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lang("input_source_unless", languages)
}

fn variable(kind: &str, name: &str, value: Value) -> Value {
    json!({
        "type": kind,
        "name": name,
        "value": value,
    })
}

fn app<I, S>(kind: &str, bundle_ids: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let ids: Vec<String> = bundle_ids.into_iter().map(Into::into).collect();
    json!({
        "type": kind,
        "bundle_identifiers": ids,
    })
}

fn lang<I, S>(kind: &str, languages: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let sources: Vec<Value> = languages
        .into_iter()
        .map(Into::into)
        .map(|language: String| json!({ "language": language }))
        .collect();
    json!({
        "type": kind,
        "input_sources": sources,
    })
}
