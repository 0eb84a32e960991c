//! Boundary parsing for loosely typed values.
//!
//! Profile and vehicle-selection flows hand the engine strings such as
//! `"$26,420 - $28,500"`, `"$85,000"` or `"$450/mo"`. These helpers pull the
//! numeric content out and report a tagged [`ParseResult`] instead of
//! guessing, so each calculation can decide whether to skip or default.

use std::str::FromStr;

use log::debug;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::Money;

/// Outcome of parsing a loosely typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseResult<T> {
    Parsed { value: T },
    Missing,
    Invalid { raw: String, reason: String },
}

impl<T> ParseResult<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            ParseResult::Parsed { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseResult::Parsed { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        match self {
            ParseResult::Parsed { value } => ParseResult::Parsed { value: f(value) },
            ParseResult::Missing => ParseResult::Missing,
            ParseResult::Invalid { raw, reason } => ParseResult::Invalid { raw, reason },
        }
    }
}

/// Lower and (optional) upper bound of a quoted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Money>,
}

/// A value that may arrive either as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Amount(Decimal),
    Text(String),
}

impl NumericInput {
    /// Resolve to a single amount. Text takes its first numeric token.
    pub fn parse(&self) -> ParseResult<Money> {
        match self {
            NumericInput::Amount(value) => ParseResult::Parsed { value: *value },
            NumericInput::Text(text) => parse_amount(text),
        }
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        NumericInput::Amount(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Shapes a credit score arrives in from profile data.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Whole(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserialize a credit score leniently.
///
/// Whole numbers, including numeric strings such as `"720"`, become the
/// score. Anything else (`"unknown"`, negatives, fractions, objects) is
/// treated as no score so tier resolution falls back with a warning.
pub fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawScore>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let score = match &raw {
        RawScore::Whole(n) => u32::try_from(*n).ok(),
        RawScore::Float(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f) => {
            Some(*f as u32)
        }
        RawScore::Text(text) => text.trim().parse::<u32>().ok(),
        RawScore::Signed(_) | RawScore::Float(_) | RawScore::Other(_) => None,
    };
    if score.is_none() {
        debug!("credit score is not a whole number; treating it as missing");
    }
    Ok(score)
}

/// Parse an optional loosely typed input; `None` is `Missing`.
pub fn parse_optional(input: Option<&NumericInput>) -> ParseResult<Money> {
    input.map_or(ParseResult::Missing, NumericInput::parse)
}

/// Extract the first numeric token from `raw`.
pub fn parse_amount(raw: &str) -> ParseResult<Money> {
    parse_price_range(raw).map(|range| range.low)
}

/// Extract the first two numeric tokens from `raw` as a price range.
///
/// `"$26,420 - $28,500"` yields `low = 26420, high = Some(28500)`. The dash
/// between bounds is a separator, not a sign.
pub fn parse_price_range(raw: &str) -> ParseResult<PriceRange> {
    if raw.trim().is_empty() {
        return ParseResult::Missing;
    }

    let tokens = numeric_tokens(raw);
    let mut values = Vec::with_capacity(2);
    for token in tokens.iter().take(2) {
        match Decimal::from_str(token) {
            Ok(v) => values.push(v),
            Err(e) => {
                return ParseResult::Invalid {
                    raw: raw.to_string(),
                    reason: format!("'{token}' is not a number: {e}"),
                }
            }
        }
    }

    match values.as_slice() {
        [] => ParseResult::Invalid {
            raw: raw.to_string(),
            reason: "no numeric value found".into(),
        },
        [low] => ParseResult::Parsed {
            value: PriceRange {
                low: *low,
                high: None,
            },
        },
        [low, high, ..] => ParseResult::Parsed {
            value: PriceRange {
                low: *low,
                high: Some(*high),
            },
        },
    }
}

/// Split `raw` into numeric tokens with thousands separators removed.
///
/// A minus sign only counts when it directly precedes the first token and
/// is not preceded by a digit, so ranges like `"100-200"` stay positive.
fn numeric_tokens(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let mut token = String::new();
        if tokens.is_empty() && is_leading_minus(&chars, i) {
            token.push('-');
        }

        let mut seen_point = false;
        while i < chars.len() {
            let c = chars[i];
            let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if c.is_ascii_digit() {
                token.push(c);
            } else if c == ',' && next_is_digit {
                // thousands separator
            } else if c == '.' && !seen_point && next_is_digit {
                seen_point = true;
                token.push(c);
            } else {
                break;
            }
            i += 1;
        }
        tokens.push(token);
    }

    tokens
}

fn is_leading_minus(chars: &[char], digit_index: usize) -> bool {
    let mut j = digit_index;
    // allow a currency symbol between the sign and the digits: "-$500"
    while j > 0 && chars[j - 1] == '$' {
        j -= 1;
    }
    if j == 0 || chars[j - 1] != '-' {
        return false;
    }
    j < 2 || !chars[j - 2].is_ascii_digit()
}
