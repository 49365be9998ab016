//! Rate tables as served by the provider and the conversions derived from them.
//!
//! All money values are [`Decimal`]s. Provider numbers are decoded from their exact textual form
//! and never pass through `f64`.

use std::{collections::BTreeMap, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::error::{ConvertError, RenderError};

/// Number of decimal places every converted amount is rounded to.
pub const ROUND_PLACES: u32 = 2;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Exchange rates for a base currency, in the provider's wire shape.
///
/// The cache keeps the provider payload verbatim, so the same decoder serves both cache hits and
/// fresh fetches.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RateTable {
    #[serde(default)]
    pub base: String,
    /// Passed through as-is. The provider does not promise ISO-8601 here.
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_rates")]
    pub rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Multiplies every rate by `amount`, rounding each result to [`ROUND_PLACES`]. The amount
    /// itself is echoed back unrounded.
    pub fn convert(&self, amount: Decimal, currency: &str) -> Result<Conversion, ConvertError> {
        let converted = self
            .rates
            .iter()
            .map(|(code, rate)| {
                rate.checked_mul(amount)
                    .and_then(round_money)
                    .map(|value| (code.clone(), value))
                    .ok_or_else(|| ConvertError::Overflow(code.clone()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Conversion {
            amount,
            currency: currency.to_string(),
            converted,
        })
    }
}

/// The answer to a single convert request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Conversion {
    #[serde(serialize_with = "serialize_number")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(serialize_with = "serialize_number_map")]
    pub converted: BTreeMap<String, Decimal>,
}

#[derive(Serialize)]
#[serde(rename = "Rates")]
struct XmlConversion<'a> {
    amount: String,
    currency: &'a str,
    converted: BTreeMap<&'a str, String>,
}

impl Conversion {
    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Renders the conversion as an XML document, one element per converted currency.
    pub fn to_xml(&self) -> Result<String, RenderError> {
        let doc = XmlConversion {
            amount: self.amount.to_string(),
            currency: &self.currency,
            converted: self
                .converted
                .iter()
                .map(|(code, value)| (code.as_str(), value.to_string()))
                .collect(),
        };
        let body =
            quick_xml::se::to_string(&doc).map_err(|e| RenderError::Xml(e.to_string()))?;
        Ok(format!("{XML_HEADER}{body}"))
    }
}

/// Parses user or provider supplied text as an exact decimal. Plain and scientific notation are
/// accepted. Text that a [`Decimal`] can only hold after rounding is rejected.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() || text.contains('_') {
        return None;
    }
    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()?;
    let parsed_digits = value.mantissa().unsigned_abs().to_string();
    (significant_digits(text) == significant_digits(&parsed_digits)).then_some(value)
}

// Digits of the mantissa without sign, decimal point, or leading and trailing zeros.
fn significant_digits(text: &str) -> String {
    let mantissa = text.split(['e', 'E']).next().unwrap_or_default();
    let digits = mantissa.chars().filter(char::is_ascii_digit).collect::<String>();
    digits.trim_start_matches('0').trim_end_matches('0').to_string()
}

/// Rounds half away from zero and pins the scale, so `200` becomes `200.00`. `None` when the value
/// is too large to carry two decimal places.
pub fn round_money(value: Decimal) -> Option<Decimal> {
    let mut rounded =
        value.round_dp_with_strategy(ROUND_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(ROUND_PLACES);
    (rounded.scale() == ROUND_PLACES).then_some(rounded)
}

fn deserialize_rates<'de, D>(deserializer: D) -> Result<BTreeMap<String, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Number>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(code, number)| {
            let text = number.to_string();
            let rate = parse_decimal(&text).ok_or_else(|| {
                D::Error::custom(format!("rate for {code} is not an exact decimal: {text}"))
            })?;
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(D::Error::custom(format!("rate for {code} is negative: {text}")));
            }
            Ok((code, rate))
        })
        .collect()
}

// Decimals go out as bare JSON numbers rather than quoted strings.
fn serialize_number<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    rust_decimal::serde::arbitrary_precision::serialize(value, serializer)
}

fn serialize_number_map<S>(
    map: &BTreeMap<String, Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    struct Number<'a>(&'a Decimal);

    impl Serialize for Number<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_number(self.0, serializer)
        }
    }

    serializer.collect_map(map.iter().map(|(code, value)| (code, Number(value))))
}
