use std::collections::HashMap;

use casedesk_core::{
    person_name_similarity, phone_similarity, plate_similarity, text_similarity, timeframe_score,
};

use crate::config::MatchPolicy;

const TIME_GRACE_MINUTES: u32 = 10;
/// Ledgers are queried with coarser windows than camera or door logs.
const LEDGER_GRACE_MINUTES: u32 = 60;
const STRICT_THRESHOLD: f64 = 0.85;
const STANDARD_THRESHOLD: f64 = 0.75;

/// Argument shapes with a dedicated similarity blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    LocationTime,
    AreaTime,
    Plate,
    Phone,
    PartyTime,
    Person,
    /// Mean text similarity over every position.
    Argwise,
}

impl ScorerKind {
    /// Scores caller `input` against an authored `key`; both are ordered as
    /// `arg_names`.
    pub fn score(self, arg_names: &[String], input: &[String], key: &[String]) -> f64 {
        match self {
            Self::LocationTime => {
                let loc = position_of(arg_names, &["location", "facility_or_room"]).unwrap_or(0);
                let tf = position_of(arg_names, &["timeframe"])
                    .unwrap_or_else(|| arg_names.len().saturating_sub(1));
                0.55 * text_similarity(at(input, loc), at(key, loc))
                    + 0.45 * timeframe_score(at(input, tf), at(key, tf), TIME_GRACE_MINUTES)
            }
            Self::AreaTime => {
                0.5 * text_similarity(at(input, 0), at(key, 0))
                    + 0.5 * timeframe_score(at(input, 1), at(key, 1), TIME_GRACE_MINUTES)
            }
            Self::Plate => plate_similarity(at(input, 0), at(key, 0)),
            Self::Phone => phone_similarity(at(input, 0), at(key, 0)),
            Self::PartyTime => {
                0.6 * text_similarity(at(input, 0), at(key, 0))
                    + 0.4 * timeframe_score(at(input, 1), at(key, 1), LEDGER_GRACE_MINUTES)
            }
            Self::Person => person_name_similarity(at(input, 0), at(key, 0)),
            Self::Argwise => {
                let sims: Vec<f64> = input
                    .iter()
                    .zip(key)
                    .map(|(i, k)| text_similarity(i, k))
                    .collect();
                sims.iter().sum::<f64>() / sims.len().max(1) as f64
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionScoring {
    pub scorer: ScorerKind,
    pub threshold: f64,
}

/// Action name -> scorer and acceptance threshold.
#[derive(Debug, Clone)]
pub struct ScorerRegistry {
    entries: HashMap<String, ActionScoring>,
}

impl Default for ScorerRegistry {
    fn default() -> Self {
        let standard = [
            ("review_traffic_cctv", ScorerKind::LocationTime),
            ("review_access_logs", ScorerKind::LocationTime),
            ("review_wifi_logs", ScorerKind::AreaTime),
            ("check_upi_transactions", ScorerKind::PartyTime),
        ];
        let strict = [
            ("check_vehicle_registration", ScorerKind::Plate),
            ("trace_mobile_number", ScorerKind::Phone),
            ("interrogate_suspect", ScorerKind::Person),
            ("interrogate_suspect_final", ScorerKind::Person),
            ("interview_witness", ScorerKind::Person),
            ("verify_alibi", ScorerKind::Person),
            ("interrogate_suspect_3rd_degree", ScorerKind::Person),
        ];

        let mut registry = Self::empty();
        for (action, scorer) in standard {
            registry = registry.register(action, scorer, STANDARD_THRESHOLD);
        }
        for (action, scorer) in strict {
            registry = registry.register(action, scorer, STRICT_THRESHOLD);
        }
        registry
    }
}

impl ScorerRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(
        mut self,
        action: impl Into<String>,
        scorer: ScorerKind,
        threshold: f64,
    ) -> Self {
        self.entries
            .insert(action.into(), ActionScoring { scorer, threshold });
        self
    }

    pub fn get(&self, action: &str) -> Option<&ActionScoring> {
        self.entries.get(action)
    }

    /// Registered scoring for `action`, or mean text similarity at the
    /// policy's default threshold.
    pub fn resolve(&self, action: &str, policy: &MatchPolicy) -> ActionScoring {
        self.get(action).copied().unwrap_or(ActionScoring {
            scorer: ScorerKind::Argwise,
            threshold: policy.default_threshold,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub key: &'a [String],
    pub response: &'a str,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Hit(ScoredCandidate<'a>),
    Ambiguous(Vec<ScoredCandidate<'a>>),
    Empty,
}

/// Ranks scored candidates and applies threshold, ambiguity gap and cap.
/// The gap is checked on everything above the threshold; the cap only
/// bounds the reported ambiguous set.
pub fn select_match<'a>(
    mut scored: Vec<ScoredCandidate<'a>>,
    threshold: f64,
    policy: &MatchPolicy,
) -> Selection<'a> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut top: Vec<ScoredCandidate<'a>> =
        scored.into_iter().filter(|c| c.score >= threshold).collect();

    let ambiguous = match top.as_slice() {
        [best, runner_up, ..] => best.score - runner_up.score < policy.ambiguity_gap,
        _ => false,
    };
    if ambiguous {
        top.truncate(policy.max_candidates.max(1));
        return Selection::Ambiguous(top);
    }
    top.into_iter().next().map_or(Selection::Empty, Selection::Hit)
}

fn position_of(arg_names: &[String], wanted: &[&str]) -> Option<usize> {
    wanted
        .iter()
        .find_map(|w| arg_names.iter().position(|name| name == w))
}

fn at(values: &[String], idx: usize) -> &str {
    values.get(idx).map_or("", String::as_str)
}
