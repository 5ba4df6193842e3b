use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::StoreError;

/// category -> canonical value -> aliases
pub type AliasTable = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Decoded dataset as produced by the container codec.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub schema_version: String,
    pub actions_catalog: BTreeMap<String, ActionSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: AliasTable,
    /// Cases grouped by difficulty bucket.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cases: BTreeMap<String, Vec<CaseRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionSpec {
    pub input_args: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: BTreeMap<String, ActionScript>,
    #[serde(default)]
    pub solution: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionScript {
    #[serde(default, deserialize_with = "null_as_default")]
    pub responses: ScriptedResponses,
}

/// Authored `(encoded key, response)` pairs in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedResponses(pub Vec<(String, String)>);

impl ScriptedResponses {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ScriptedResponses {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = ScriptedResponses;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of scripted argument keys to responses")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, response)) = map.next_entry::<String, String>()? {
                    pairs.push((key, response));
                }
                Ok(ScriptedResponses(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

impl Dataset {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_json_slice(&bytes)
    }

    /// Every case with the difficulty bucket it was filed under.
    pub fn iter_cases(&self) -> impl Iterator<Item = (&str, &CaseRecord)> {
        self.cases
            .iter()
            .flat_map(|(bucket, cases)| cases.iter().map(move |case| (bucket.as_str(), case)))
    }
}

/// Splits an authored key into positional values. Keys are JSON arrays; any
/// other JSON scalar, or text that is not JSON at all, is one raw value.
pub fn parse_scripted_key(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items.into_iter().map(value_text).collect(),
        Ok(Value::String(s)) => vec![s],
        _ => vec![raw.to_string()],
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_keys_accept_arrays_scalars_and_raw_text() {
        assert_eq!(
            parse_scripted_key(r#"["Market Road", "20:10-20:20"]"#),
            vec!["Market Road", "20:10-20:20"]
        );
        assert_eq!(parse_scripted_key(r#"["S-7", 42]"#), vec!["S-7", "42"]);
        assert_eq!(parse_scripted_key(r#""Imran""#), vec!["Imran"]);
        assert_eq!(parse_scripted_key("Imran the Vendor"), vec!["Imran the Vendor"]);
    }

    #[test]
    fn responses_keep_document_order_and_tolerate_null() {
        let raw = br#"{
            "schema_version": "1.2",
            "actions_catalog": { "interview_witness": { "input_args": ["witness_name"] } },
            "aliases": null,
            "cases": {
                "easy": [{
                    "case_id": "C1",
                    "actions": {
                        "interview_witness": {
                            "responses": { "[\"Zed\"]": "z", "[\"Amy\"]": "a" }
                        }
                    },
                    "solution": "Zed"
                }],
                "hard": [{ "case_id": "C2", "actions": { "interview_witness": { "responses": null } } }]
            }
        }"#;
        let dataset = Dataset::from_json_slice(raw).expect("parse dataset");
        assert_eq!(dataset.schema_version, "1.2");
        assert!(dataset.aliases.is_empty());

        let cases: Vec<_> = dataset.iter_cases().collect();
        assert_eq!(cases.len(), 2);
        let (bucket, c1) = cases[0];
        assert_eq!(bucket, "easy");
        let keys: Vec<_> = c1.actions["interview_witness"]
            .responses
            .iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![r#"["Zed"]"#, r#"["Amy"]"#]);
        assert!(cases[1].1.actions["interview_witness"].responses.is_empty());
    }

    #[test]
    fn missing_catalog_is_a_load_error() {
        let err = Dataset::from_json_slice(br#"{ "cases": {} }"#).expect_err("must fail");
        assert!(matches!(err, StoreError::Serde(_)));
    }
}
