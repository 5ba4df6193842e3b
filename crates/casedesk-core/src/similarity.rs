use std::collections::BTreeSet;

use crate::normalize::{
    normalize_phone, normalize_plate, normalize_text, parse_timeframe, tokenize, Timeframe,
    MINUTES_PER_DAY,
};

const PLATE_SUFFIX_LEN: usize = 6;
const PHONE_SUFFIX_TIERS: [(usize, f64); 3] = [(8, 0.9), (6, 0.8), (4, 0.6)];
const MIN_NAME_TOKEN_LEN: usize = 4;
const NEAR_MISS_SCORE: f64 = 0.7;

pub fn jaccard_token_similarity(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<String> = tokenize(a, false).into_iter().collect();
    let tb: BTreeSet<String> = tokenize(b, false).into_iter().collect();
    match (ta.is_empty(), tb.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let inter = ta.intersection(&tb).count();
            let union = ta.union(&tb).count();
            inter as f64 / union as f64
        }
    }
}

/// `1 - levenshtein / max_len` over the normalized text, measured in chars.
pub fn edit_distance_ratio(a: &str, b: &str) -> f64 {
    let na = normalize_text(a);
    let nb = normalize_text(b);
    let longest = na.chars().count().max(nb.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&na, &nb);
    1.0 - distance as f64 / longest as f64
}

pub fn text_similarity(a: &str, b: &str) -> f64 {
    0.6 * jaccard_token_similarity(a, b) + 0.4 * edit_distance_ratio(a, b)
}

/// Half edit ratio, half exact match on the trailing characters, which carry
/// the registration digits.
pub fn plate_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_plate(a);
    let nb = normalize_plate(b);
    match (na.is_empty(), nb.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let suffix_len = PLATE_SUFFIX_LEN.min(na.len()).min(nb.len());
    let suffix_bonus = if suffix(&na, suffix_len) == suffix(&nb, suffix_len) {
        1.0
    } else {
        0.0
    };
    0.5 * edit_distance_ratio(&na, &nb) + 0.5 * suffix_bonus
}

/// Compares trailing digits so country codes and trunk prefixes don't matter.
pub fn phone_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_phone(a);
    let nb = normalize_phone(b);
    match (na.is_empty(), nb.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    PHONE_SUFFIX_TIERS
        .iter()
        .find(|(k, _)| match (suffix(&na, *k), suffix(&nb, *k)) {
            (Some(sa), Some(sb)) => sa == sb,
            _ => false,
        })
        .map_or(0.0, |(_, score)| *score)
}

/// Strict: 1.0 only when a token of at least four chars from `a` appears
/// verbatim among the tokens of `b`. No prefixes, no typo tolerance.
pub fn person_name_similarity(a: &str, b: &str) -> f64 {
    let ta = tokenize(a, true);
    let tb = tokenize(b, true);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let hit = ta
        .iter()
        .filter(|t| t.chars().count() >= MIN_NAME_TOKEN_LEN)
        .any(|t| tb.binary_search(t).is_ok());
    if hit {
        1.0
    } else {
        0.0
    }
}

/// Minutes shared by `a` and `b`, also trying `b` shifted forward one day.
pub fn overlap_minutes(a: Timeframe, b: Timeframe) -> u32 {
    [0, MINUTES_PER_DAY]
        .iter()
        .map(|shift| {
            let (b1, b2) = (b.start + shift, b.end + shift);
            a.end.min(b2).saturating_sub(a.start.max(b1))
        })
        .max()
        .unwrap_or(0)
}

pub fn timeframe_score(input: &str, candidate: &str, grace_minutes: u32) -> f64 {
    let (Some(ta), Some(tb)) = (parse_timeframe(input), parse_timeframe(candidate)) else {
        return text_similarity(input, candidate);
    };

    let overlap = overlap_minutes(ta, tb);
    if overlap > 0 {
        let longest = ta.len_minutes().max(tb.len_minutes());
        return (0.5 + 0.5 * f64::from(overlap) / f64::from(longest)).min(1.0);
    }

    let day = i64::from(MINUTES_PER_DAY);
    let (sa, sb) = (i64::from(ta.start), i64::from(tb.start));
    let start_delta = [(sa - sb).abs(), (sa + day - sb).abs(), (sa - sb - day).abs()]
        .into_iter()
        .min()
        .unwrap_or(i64::MAX);
    if start_delta <= i64::from(grace_minutes) {
        NEAR_MISS_SCORE
    } else {
        0.0
    }
}

fn suffix(s: &str, len: usize) -> Option<&str> {
    s.len().checked_sub(len).and_then(|start| s.get(start..))
}
