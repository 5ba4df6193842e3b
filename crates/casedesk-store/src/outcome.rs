use std::borrow::Cow;

const UNKNOWN_CASE_TEXT: &str = "[error] Unknown case_id.";
const UNKNOWN_ACTION_TEXT: &str = "[error] Unknown action.";
const NO_MATCH_TEXT: &str = "[no-match] Inputs not recognized. Check spelling, use full names, and standard time ranges (e.g., '20:10-20:20').";
const NOT_CONFIDENT_TEXT: &str =
    "[no-match] Could not confidently match your inputs. Try exact location names and full person names.";

/// A scripted tuple that cleared the threshold. Internal only: never part of
/// the caller-visible text.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub key: Vec<String>,
    pub score: f64,
}

/// Lookup stage that gave up on a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    ExactHit {
        response: String,
    },
    FuzzyHit {
        response: String,
        score: f64,
    },
    NoMatch {
        stage: MatchStage,
    },
    Ambiguous {
        candidates: Vec<Candidate>,
    },
    UnknownCase,
    UnknownAction,
    MissingArgument {
        name: String,
        required: Vec<String>,
    },
}

impl MatchOutcome {
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::ExactHit { response } | Self::FuzzyHit { response, .. } => {
                Some(response.as_str())
            }
            _ => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.response().is_some()
    }

    /// Stable snake_case label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExactHit { .. } => "exact_hit",
            Self::FuzzyHit { .. } => "fuzzy_hit",
            Self::NoMatch { .. } => "no_match",
            Self::Ambiguous { .. } => "ambiguous",
            Self::UnknownCase => "unknown_case",
            Self::UnknownAction => "unknown_action",
            Self::MissingArgument { .. } => "missing_argument",
        }
    }

    /// Text safe to hand back to the caller: the scripted response on a hit,
    /// otherwise a generic message that names no scripted values.
    pub fn caller_text(&self) -> Cow<'_, str> {
        match self {
            Self::ExactHit { response } | Self::FuzzyHit { response, .. } => {
                Cow::Borrowed(response.as_str())
            }
            Self::NoMatch {
                stage: MatchStage::Exact,
            } => Cow::Borrowed(NO_MATCH_TEXT),
            Self::NoMatch {
                stage: MatchStage::Fuzzy,
            }
            | Self::Ambiguous { .. } => Cow::Borrowed(NOT_CONFIDENT_TEXT),
            Self::UnknownCase => Cow::Borrowed(UNKNOWN_CASE_TEXT),
            Self::UnknownAction => Cow::Borrowed(UNKNOWN_ACTION_TEXT),
            Self::MissingArgument { name, required } => {
                let listed = required
                    .iter()
                    .map(|arg| format!("'{arg}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                Cow::Owned(format!(
                    "[error] Missing required argument '{name}'. Required args: [{listed}]"
                ))
            }
        }
    }
}
