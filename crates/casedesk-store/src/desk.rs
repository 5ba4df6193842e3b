use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use crate::alias::AliasResolver;
use crate::config::{DeskConfig, MatchMode, MatchPolicy};
use crate::dataset::{ActionSpec, Dataset};
use crate::error::StoreError;
use crate::index::{canonical_tuple, ScriptedIndex};
use crate::outcome::{Candidate, MatchOutcome, MatchStage};
use crate::scoring::{select_match, ScoredCandidate, Selection};

/// Caller arguments keyed by argument name.
pub type ToolArgs = BTreeMap<String, String>;

/// One tool call with its raw arguments in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub case_id: String,
    pub action: String,
    pub args: Vec<String>,
}

impl MatchQuery {
    pub fn new(case_id: impl Into<String>, action: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            case_id: case_id.into(),
            action: action.into(),
            args,
        }
    }

    /// Orders named arguments by `arg_order`. On failure returns the first
    /// argument name that was not supplied.
    pub fn from_named(
        case_id: impl Into<String>,
        action: impl Into<String>,
        arg_order: &[String],
        args: &ToolArgs,
    ) -> Result<Self, String> {
        let values = arg_order
            .iter()
            .map(|name| args.get(name).cloned().ok_or_else(|| name.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(case_id, action, values))
    }
}

#[derive(Debug)]
struct DeskInner {
    schema_version: String,
    catalog: BTreeMap<String, ActionSpec>,
    aliases: AliasResolver,
    index: ScriptedIndex,
    config: DeskConfig,
}

/// Read-only view over one loaded dataset. Cloning shares the same index,
/// so a desk can be handed to any number of threads.
#[derive(Debug, Clone)]
pub struct CaseDesk {
    inner: Arc<DeskInner>,
}

impl CaseDesk {
    pub fn from_dataset(dataset: Dataset, config: DeskConfig) -> Result<Self, StoreError> {
        let aliases = AliasResolver::build(&dataset.aliases);
        let index = ScriptedIndex::build(&dataset, &aliases, &config.field_categories)?;
        if index.is_empty() {
            tracing::warn!(schema_version = %dataset.schema_version, "dataset has no cases");
        }
        let alias_entries: usize = aliases
            .categories()
            .map(|category| aliases.alias_count(category))
            .sum();
        tracing::info!(
            schema_version = %dataset.schema_version,
            cases = index.len(),
            actions = dataset.actions_catalog.len(),
            alias_entries,
            "case desk loaded"
        );

        Ok(Self {
            inner: Arc::new(DeskInner {
                schema_version: dataset.schema_version,
                catalog: dataset.actions_catalog,
                aliases,
                index,
                config,
            }),
        })
    }

    pub fn from_json_slice(bytes: &[u8], config: DeskConfig) -> Result<Self, StoreError> {
        Self::from_dataset(Dataset::from_json_slice(bytes)?, config)
    }

    pub fn open(path: impl AsRef<Path>, config: DeskConfig) -> Result<Self, StoreError> {
        Self::from_dataset(Dataset::open(path)?, config)
    }

    pub fn schema_version(&self) -> &str {
        &self.inner.schema_version
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.inner.config.policy
    }

    pub fn case_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.inner.index.case_ids().collect();
        ids.sort_unstable();
        ids
    }

    pub fn case_exists(&self, case_id: &str) -> bool {
        self.inner.index.case(case_id).is_some()
    }

    /// Actions enabled on `case_id`; empty for unknown cases.
    pub fn actions_for_case(&self, case_id: &str) -> BTreeSet<&str> {
        self.inner
            .index
            .case(case_id)
            .map(|case| case.action_names().collect())
            .unwrap_or_default()
    }

    pub fn input_arg_order(&self, action: &str) -> Result<&[String], StoreError> {
        self.inner
            .catalog
            .get(action)
            .map(|spec| spec.input_args.as_slice())
            .ok_or_else(|| StoreError::UnknownAction(action.to_string()))
    }

    pub fn difficulty(&self, case_id: &str) -> Option<&str> {
        self.inner
            .index
            .case(case_id)
            .map(|case| case.difficulty.as_str())
    }

    /// Culprit recorded for grading. Not part of any tool response.
    pub fn solution(&self, case_id: &str) -> Option<&str> {
        self.inner
            .index
            .case(case_id)
            .and_then(|case| case.solution.as_deref())
    }

    pub fn canonicalize<'a>(&'a self, category: &str, value: &'a str) -> &'a str {
        self.inner.aliases.canonicalize(category, value)
    }

    /// Canonicalizes `value` through the alias category bound to `arg_name`.
    pub fn canonicalize_field<'a>(&'a self, arg_name: &str, value: &'a str) -> &'a str {
        match self.inner.config.field_categories.category(arg_name) {
            Some(category) => self.canonicalize(category, value),
            None => value,
        }
    }

    pub fn match_action(&self, case_id: &str, action: &str, args: &ToolArgs) -> MatchOutcome {
        self.match_action_with_mode(case_id, action, args, self.policy().mode)
    }

    pub fn match_action_with_mode(
        &self,
        case_id: &str,
        action: &str,
        args: &ToolArgs,
        mode: MatchMode,
    ) -> MatchOutcome {
        if !self.case_exists(case_id) {
            return MatchOutcome::UnknownCase;
        }
        let Ok(arg_order) = self.input_arg_order(action) else {
            return MatchOutcome::UnknownAction;
        };
        match MatchQuery::from_named(case_id, action, arg_order, args) {
            Ok(query) => self.lookup(&query, mode),
            Err(name) => MatchOutcome::MissingArgument {
                name,
                required: arg_order.to_vec(),
            },
        }
    }

    /// Resolves a positional query: exact canonical tuple first, then the
    /// scored fallback when `mode` allows it.
    pub fn lookup(&self, query: &MatchQuery, mode: MatchMode) -> MatchOutcome {
        if !self.case_exists(&query.case_id) {
            return MatchOutcome::UnknownCase;
        }
        let Some(spec) = self.inner.catalog.get(&query.action) else {
            return MatchOutcome::UnknownAction;
        };
        if let Some(name) = spec.input_args.get(query.args.len()) {
            return MatchOutcome::MissingArgument {
                name: name.clone(),
                required: spec.input_args.clone(),
            };
        }

        let canonical = canonical_tuple(
            spec,
            &query.args,
            &self.inner.aliases,
            &self.inner.config.field_categories,
        );

        let outcome = match self.lookup_exact(&query.case_id, &query.action, &canonical) {
            Some(response) => MatchOutcome::ExactHit {
                response: response.to_string(),
            },
            None if mode == MatchMode::Exact => MatchOutcome::NoMatch {
                stage: MatchStage::Exact,
            },
            None => self.lookup_fuzzy(&query.case_id, &query.action, &canonical),
        };
        tracing::debug!(
            case_id = %query.case_id,
            action = %query.action,
            outcome = outcome.kind(),
            "scripted lookup resolved"
        );
        outcome
    }

    pub fn lookup_exact(
        &self,
        case_id: &str,
        action: &str,
        canonical_args: &[String],
    ) -> Option<&str> {
        self.inner
            .index
            .case(case_id)?
            .action(action)?
            .get(canonical_args)
    }

    /// Scores every scripted tuple of the action against `canonical_args`.
    /// Yields `FuzzyHit`, `Ambiguous` or a fuzzy-stage `NoMatch`.
    pub fn lookup_fuzzy(
        &self,
        case_id: &str,
        action: &str,
        canonical_args: &[String],
    ) -> MatchOutcome {
        let Some(scripts) = self
            .inner
            .index
            .case(case_id)
            .and_then(|case| case.action(action))
            .filter(|scripts| !scripts.is_empty())
        else {
            tracing::debug!(case_id, action, "no scripted calls for this action in this case");
            return MatchOutcome::NoMatch {
                stage: MatchStage::Fuzzy,
            };
        };
        let arg_names = self
            .inner
            .catalog
            .get(action)
            .map(|spec| spec.input_args.as_slice())
            .unwrap_or_default();

        let policy = &self.inner.config.policy;
        let scoring = self.inner.config.scorers.resolve(action, policy);
        let scored: Vec<ScoredCandidate<'_>> = scripts
            .entries()
            .iter()
            .map(|entry| ScoredCandidate {
                key: &entry.key,
                response: &entry.response,
                score: scoring.scorer.score(arg_names, canonical_args, &entry.key),
            })
            .collect();
        let total = scored.len();

        match select_match(scored, scoring.threshold, policy) {
            Selection::Hit(best) => {
                tracing::debug!(
                    case_id,
                    action,
                    scored = total,
                    score = best.score,
                    "fuzzy scripted hit"
                );
                MatchOutcome::FuzzyHit {
                    response: best.response.to_string(),
                    score: best.score,
                }
            }
            Selection::Ambiguous(top) => {
                let candidates: Vec<Candidate> = top
                    .iter()
                    .map(|c| Candidate {
                        key: c.key.to_vec(),
                        score: c.score,
                    })
                    .collect();
                tracing::debug!(
                    case_id,
                    action,
                    scored = total,
                    close = candidates.len(),
                    "ambiguous fuzzy match"
                );
                tracing::trace!(case_id, action, ?candidates, "ambiguous candidates");
                MatchOutcome::Ambiguous { candidates }
            }
            Selection::Empty => {
                tracing::debug!(
                    case_id,
                    action,
                    scored = total,
                    threshold = scoring.threshold,
                    "no candidate cleared the threshold"
                );
                MatchOutcome::NoMatch {
                    stage: MatchStage::Fuzzy,
                }
            }
        }
    }
}
