use std::collections::{BTreeMap, HashMap};

use crate::alias::AliasResolver;
use crate::config::FieldCategories;
use crate::dataset::{parse_scripted_key, ActionSpec, Dataset};
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedEntry {
    pub key: Vec<String>,
    pub response: String,
}

/// Canonical tuples for one action of one case, in authoring order.
#[derive(Debug, Clone, Default)]
pub struct ActionIndex {
    entries: Vec<ScriptedEntry>,
    by_key: HashMap<Vec<String>, usize>,
}

impl ActionIndex {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            by_key: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts or overwrites; returns `true` when an existing key was
    /// replaced. A replaced entry keeps its original position.
    fn insert(&mut self, key: Vec<String>, response: String) -> bool {
        if let Some(entry) = self
            .by_key
            .get(&key)
            .and_then(|&idx| self.entries.get_mut(idx))
        {
            entry.response = response;
            return true;
        }
        self.by_key.insert(key.clone(), self.entries.len());
        self.entries.push(ScriptedEntry { key, response });
        false
    }

    pub fn get(&self, key: &[String]) -> Option<&str> {
        self.by_key
            .get(key)
            .and_then(|&idx| self.entries.get(idx))
            .map(|entry| entry.response.as_str())
    }

    pub fn entries(&self) -> &[ScriptedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaseIndex {
    pub difficulty: String,
    pub solution: Option<String>,
    actions: BTreeMap<String, ActionIndex>,
}

impl CaseIndex {
    pub fn action(&self, name: &str) -> Option<&ActionIndex> {
        self.actions.get(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

/// case id -> action -> canonical tuple -> response. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIndex {
    cases: HashMap<String, CaseIndex>,
}

impl ScriptedIndex {
    pub fn build(
        dataset: &Dataset,
        aliases: &AliasResolver,
        fields: &FieldCategories,
    ) -> Result<Self, StoreError> {
        let mut cases = HashMap::new();
        for (bucket, case) in dataset.iter_cases() {
            let mut actions = BTreeMap::new();
            for (action, script) in &case.actions {
                let spec = dataset.actions_catalog.get(action).ok_or_else(|| {
                    StoreError::UndeclaredAction {
                        case_id: case.case_id.clone(),
                        action: action.clone(),
                    }
                })?;

                let mut index = ActionIndex::with_capacity(script.responses.len());
                for (raw_key, response) in script.responses.iter() {
                    let values = parse_scripted_key(raw_key);
                    if values.len() != spec.input_args.len() {
                        return Err(StoreError::ArityMismatch {
                            case_id: case.case_id.clone(),
                            action: action.clone(),
                            expected: spec.input_args.len(),
                            found: values.len(),
                        });
                    }
                    let key = canonical_tuple(spec, &values, aliases, fields);
                    if index.insert(key, response.to_string()) {
                        tracing::warn!(
                            case_id = %case.case_id,
                            action = %action,
                            "duplicate scripted key after canonicalization; keeping the later response"
                        );
                    }
                }
                actions.insert(action.clone(), index);
            }

            let entry = CaseIndex {
                difficulty: bucket.to_string(),
                solution: case.solution.clone(),
                actions,
            };
            if cases.insert(case.case_id.clone(), entry).is_some() {
                tracing::warn!(
                    case_id = %case.case_id,
                    "case id appears twice; keeping the later case"
                );
            }
        }
        Ok(Self { cases })
    }

    pub fn case(&self, case_id: &str) -> Option<&CaseIndex> {
        self.cases.get(case_id)
    }

    pub fn case_ids(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Runs each positional value through its argument's alias category.
pub(crate) fn canonical_tuple<S: AsRef<str>>(
    spec: &ActionSpec,
    values: &[S],
    aliases: &AliasResolver,
    fields: &FieldCategories,
) -> Vec<String> {
    spec.input_args
        .iter()
        .zip(values)
        .map(|(name, value)| {
            let value = value.as_ref();
            match fields.category(name) {
                Some(category) => aliases.canonicalize(category, value).to_string(),
                None => value.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(raw: &str) -> Dataset {
        Dataset::from_json_slice(raw.as_bytes()).expect("dataset")
    }

    const BASE: &str = r#"{
        "actions_catalog": {
            "interview_witness": { "input_args": ["witness_name"] },
            "review_traffic_cctv": { "input_args": ["location", "timeframe"] }
        },
        "aliases": {
            "people": { "Imran the Vendor": ["Imran", "vendor imran"] },
            "locations": { "Market Road": ["market rd"] }
        },
        "cases": {
            "easy": [{
                "case_id": "C1",
                "solution": "Imran the Vendor",
                "actions": {
                    "interview_witness": {
                        "responses": {
                            "[\"imran\"]": "first",
                            "[\"Vendor Imran\"]": "second"
                        }
                    },
                    "review_traffic_cctv": {
                        "responses": { "[\"market rd\", \"20:10-20:20\"]": "a blue van" }
                    }
                }
            }]
        }
    }"#;

    #[test]
    fn authored_keys_are_canonicalized_positionally() {
        let ds = dataset(BASE);
        let aliases = AliasResolver::build(&ds.aliases);
        let index =
            ScriptedIndex::build(&ds, &aliases, &FieldCategories::default()).expect("index");

        let case = index.case("C1").expect("case");
        assert_eq!(case.difficulty, "easy");
        assert_eq!(case.solution.as_deref(), Some("Imran the Vendor"));

        let cctv = case.action("review_traffic_cctv").expect("cctv");
        let key = vec!["Market Road".to_string(), "20:10-20:20".to_string()];
        assert_eq!(cctv.get(&key), Some("a blue van"));
    }

    #[test]
    fn colliding_keys_keep_the_later_response() {
        let ds = dataset(BASE);
        let aliases = AliasResolver::build(&ds.aliases);
        let index =
            ScriptedIndex::build(&ds, &aliases, &FieldCategories::default()).expect("index");

        let witness = index
            .case("C1")
            .and_then(|c| c.action("interview_witness"))
            .expect("witness action");
        assert_eq!(witness.len(), 1);
        assert_eq!(witness.get(&["Imran the Vendor".to_string()]), Some("second"));
    }

    #[test]
    fn arguments_without_category_stay_verbatim() {
        let ds = dataset(BASE);
        let aliases = AliasResolver::build(&ds.aliases);
        let index = ScriptedIndex::build(&ds, &aliases, &FieldCategories::empty()).expect("index");
        let cctv = index
            .case("C1")
            .and_then(|c| c.action("review_traffic_cctv"))
            .expect("cctv");
        assert_eq!(cctv.entries()[0].key, vec!["market rd", "20:10-20:20"]);
    }

    #[test]
    fn undeclared_action_fails_the_load() {
        let ds = dataset(
            r#"{
                "actions_catalog": {},
                "cases": { "easy": [{ "case_id": "C9", "actions": { "dig": { "responses": {} } } }] }
            }"#,
        );
        let err = ScriptedIndex::build(&ds, &AliasResolver::default(), &FieldCategories::default())
            .expect_err("undeclared action");
        assert!(matches!(err, StoreError::UndeclaredAction { ref action, .. } if action == "dig"));
    }

    #[test]
    fn wrong_arity_fails_the_load() {
        let ds = dataset(
            r#"{
                "actions_catalog": { "review_wifi_logs": { "input_args": ["area", "timeframe"] } },
                "cases": { "easy": [{
                    "case_id": "C9",
                    "actions": { "review_wifi_logs": { "responses": { "[\"Lobby\"]": "x" } } }
                }] }
            }"#,
        );
        let err = ScriptedIndex::build(&ds, &AliasResolver::default(), &FieldCategories::default())
            .expect_err("arity mismatch");
        assert!(matches!(
            err,
            StoreError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }
}
