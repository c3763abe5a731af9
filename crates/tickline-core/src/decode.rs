//! Response decoders: tabular rows, structured JSON, fixed-point prices.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Upstream prices are integers scaled by 10^9.
pub const PRICE_SCALE: f64 = 1e9;

const SNIPPET_LEN: usize = 120;

/// Decode failure; never retried, the payload will not change.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON response: {cause}; body begins {snippet:?}")]
    Json {
        #[source]
        cause: serde_json::Error,
        snippet: String,
    },
    #[error("row {row} is missing field '{field}'")]
    MissingField { row: usize, field: String },
    #[error("row {row} field '{field}' has unparseable value {value:?}")]
    BadField {
        row: usize,
        field: String,
        value: String,
    },
}

/// Convert a fixed-point wire price to its human-readable value.
///
/// The single place the scale division happens.
pub fn decode_price(raw: i64) -> f64 {
    raw as f64 / PRICE_SCALE
}

/// One decoded tabular row, keyed by header field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    index: usize,
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn require(&self, field: &str) -> Result<&str, DecodeError> {
        self.get(field).ok_or_else(|| DecodeError::MissingField {
            row: self.index,
            field: field.to_owned(),
        })
    }

    pub fn require_i64(&self, field: &str) -> Result<i64, DecodeError> {
        let value = self.require(field)?;
        value.parse().map_err(|_| self.bad_field(field, value))
    }

    pub fn require_u64(&self, field: &str) -> Result<u64, DecodeError> {
        let value = self.require(field)?;
        value.parse().map_err(|_| self.bad_field(field, value))
    }

    /// Fixed-point-decode a scaled integer price field.
    pub fn price(&self, field: &str) -> Result<f64, DecodeError> {
        Ok(decode_price(self.require_i64(field)?))
    }

    fn bad_field(&self, field: &str, value: &str) -> DecodeError {
        DecodeError::BadField {
            row: self.index,
            field: field.to_owned(),
            value: value.to_owned(),
        }
    }
}

/// Decode comma-delimited tabular text into string-keyed records.
///
/// The first non-blank line is the header. Blank lines are dropped, fields
/// are trimmed, rows shorter than the header are padded with empty strings,
/// values beyond the header length are ignored. A header-only or empty input
/// decodes to an empty sequence, not an error.
pub fn parse_table(text: &str) -> Vec<Record> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<&str> = header_line.split(',').map(str::trim).collect();

    lines
        .enumerate()
        .map(|(index, line)| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            let fields = header
                .iter()
                .enumerate()
                .map(|(column, name)| {
                    let value = values.get(column).copied().unwrap_or("");
                    ((*name).to_owned(), value.to_owned())
                })
                .collect();
            Record { index, fields }
        })
        .collect()
}

/// Decode JSON text into a typed value, wrapping the cause on failure.
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, DecodeError> {
    serde_json::from_str(text).map_err(|cause| DecodeError::Json {
        cause,
        snippet: text.chars().take(SNIPPET_LEN).collect(),
    })
}

/// Shape of a decoded upstream response, selected by the calling endpoint
/// rather than inferred from content.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Tabular(Vec<Record>),
    Structured(serde_json::Value),
}

/// Expected wire format of an endpoint's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Tabular,
    Json,
}

pub fn decode_response(
    format: ResponseFormat,
    text: &str,
) -> Result<DecodedResponse, DecodeError> {
    match format {
        ResponseFormat::Tabular => Ok(DecodedResponse::Tabular(parse_table(text))),
        ResponseFormat::Json => Ok(DecodedResponse::Structured(decode_json(text)?)),
    }
}
