//! # Filter State Codec
//!
//! Translates between the feed's flat query-string parameters and
//! [`FilterState`]. Both directions are total: absent or malformed values
//! fall back to defaults instead of failing.
//!
//! | key        | shape                                   |
//! |------------|-----------------------------------------|
//! | `brands`   | comma-separated, exact brand labels     |
//! | `minPrice` | non-negative integer                    |
//! | `maxPrice` | non-negative integer                    |
//! | `ai`       | comma-separated recommendation labels   |
//! | `sort`     | `newest` \| `price-asc` \| `price-desc` |

use domains::{AiRecommendation, FilterState, SortOrder};

pub const BRANDS_KEY: &str = "brands";
pub const MIN_PRICE_KEY: &str = "minPrice";
pub const MAX_PRICE_KEY: &str = "maxPrice";
pub const AI_KEY: &str = "ai";
pub const SORT_KEY: &str = "sort";

/// Decodes query parameters into a normalized [`FilterState`].
///
/// The first occurrence of a key wins. Multi-valued fields are split on
/// commas, trimmed, de-duplicated and stripped of empty segments; unknown
/// recommendation labels are dropped. When both price bounds are present
/// and inverted they are swapped.
pub fn decode<I, K, V>(params: I) -> FilterState
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut brands = None;
    let mut min_price = None;
    let mut max_price = None;
    let mut ai = None;
    let mut sort = None;

    for (key, value) in params {
        let value = value.as_ref();
        match key.as_ref() {
            BRANDS_KEY if brands.is_none() => brands = Some(split_list(value)),
            MIN_PRICE_KEY if min_price.is_none() => min_price = Some(parse_price(value)),
            MAX_PRICE_KEY if max_price.is_none() => max_price = Some(parse_price(value)),
            AI_KEY if ai.is_none() => {
                ai = Some(
                    split_list(value)
                        .iter()
                        .filter_map(|label| label.parse::<AiRecommendation>().ok())
                        .fold(Vec::new(), |mut acc, rec| {
                            if !acc.contains(&rec) {
                                acc.push(rec);
                            }
                            acc
                        }),
                )
            }
            SORT_KEY if sort.is_none() => sort = Some(SortOrder::from_param(value)),
            _ => {}
        }
    }

    let mut min_price = min_price.flatten();
    let mut max_price = max_price.flatten();
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            min_price = Some(max);
            max_price = Some(min);
        }
    }

    FilterState {
        brands: brands.unwrap_or_default(),
        min_price,
        max_price,
        ai: ai.unwrap_or_default(),
        sort: sort.unwrap_or_default(),
    }
}

/// Decodes a raw query string (with or without the leading `?`).
/// An unparseable string decodes to the default state.
pub fn decode_query_string(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => decode(pairs),
        Err(err) => {
            tracing::debug!(error = %err, "unparseable filter query, using defaults");
            FilterState::default()
        }
    }
}

/// Encodes a state into query parameters in a fixed key order. Empty sets,
/// absent bounds and the default sort are omitted.
pub fn encode(state: &FilterState) -> Vec<(String, String)> {
    let mut params = Vec::new();

    let brands: Vec<&str> = state
        .brands
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect();
    if !brands.is_empty() {
        params.push((BRANDS_KEY.to_string(), brands.join(",")));
    }
    if let Some(min) = state.min_price {
        params.push((MIN_PRICE_KEY.to_string(), min.to_string()));
    }
    if let Some(max) = state.max_price {
        params.push((MAX_PRICE_KEY.to_string(), max.to_string()));
    }
    if !state.ai.is_empty() {
        let labels: Vec<&str> = state.ai.iter().map(|r| r.as_str()).collect();
        params.push((AI_KEY.to_string(), labels.join(",")));
    }
    if state.sort != SortOrder::Newest {
        params.push((SORT_KEY.to_string(), state.sort.as_param().to_string()));
    }

    params
}

/// Encodes a state into a query string without the leading `?`.
pub fn encode_query_string(state: &FilterState) -> String {
    // Serializing a sequence of string pairs cannot fail.
    serde_urlencoded::to_string(encode(state)).unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for segment in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|existing| existing == segment) {
            out.push(segment.to_string());
        }
    }
    out
}

/// Negative values clamp to zero, fractions are truncated, anything
/// non-numeric counts as absent.
fn parse_price(value: &str) -> Option<u32> {
    let parsed: f64 = value.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(parsed.max(0.0).min(u32::MAX as f64).trunc() as u32)
}
