//! Request shapes accepted by the bulk endpoint and their validation.
//!
//! A body is either a JSON array of location strings or an object with a
//! `location` string and optional display `params`. Shape and type errors
//! are rejected here, before any resolution starts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SearchError;

/// Optional display filters for a single-location request.
///
/// Accepted and carried through, but not yet applied to extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParams {
    /// Desired aspect ratio, e.g. `"16:9"`.
    pub aspect_ratio: Option<String>,
    /// Minimum width in pixels.
    pub min_width: Option<u32>,
    /// Minimum height in pixels.
    pub min_height: Option<u32>,
    /// `"landscape"`, `"portrait"` or `"square"`.
    pub preferred_orientation: Option<String>,
    /// Prefer high-quality images.
    pub high_quality: Option<bool>,
}

/// A single-location request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    /// The location to find images for.
    pub location: String,
    /// Display filters, if any were sent.
    pub params: Option<ImageParams>,
}

/// A validated request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    /// An ordered list of locations, duplicates allowed.
    Locations(Vec<String>),
    /// One location plus optional display filters.
    Single(LocationRequest),
}

impl BatchRequest {
    /// Classify and validate a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidInput`] for an empty array, a
    /// non-string array element, more than `max_batch_size` elements, a
    /// missing, non-string or empty `location`, malformed `params`, or any
    /// other JSON value.
    pub fn from_json(body: Value, max_batch_size: usize) -> Result<Self, SearchError> {
        match body {
            Value::Array(items) => parse_locations(items, max_batch_size),
            Value::Object(mut fields) if fields.contains_key("location") => {
                let location = match fields.remove("location") {
                    Some(Value::String(location)) => location,
                    _ => return Err(invalid("The 'location' field must be a string.")),
                };
                if location.is_empty() {
                    return Err(invalid("Location cannot be empty"));
                }
                let params = match fields.remove("params") {
                    None | Some(Value::Null) => None,
                    Some(raw) => Some(
                        serde_json::from_value::<ImageParams>(raw)
                            .map_err(|e| invalid(&format!("Invalid 'params' object: {e}")))?,
                    ),
                };
                Ok(Self::Single(LocationRequest { location, params }))
            }
            _ => Err(invalid(
                "Invalid request format. Expected JSON array of strings or object with location property.",
            )),
        }
    }

    /// The queries this request resolves, in input order.
    pub fn queries(&self) -> Vec<&str> {
        match self {
            Self::Locations(locations) => locations.iter().map(String::as_str).collect(),
            Self::Single(request) => vec![request.location.as_str()],
        }
    }
}

fn parse_locations(items: Vec<Value>, max_batch_size: usize) -> Result<BatchRequest, SearchError> {
    if items.is_empty() {
        return Err(invalid("Empty location list provided"));
    }

    let locations = items
        .into_iter()
        .map(|item| match item {
            Value::String(location) => Ok(location),
            _ => Err(invalid("When sending an array, all items must be strings.")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if locations.len() > max_batch_size {
        return Err(invalid(&format!(
            "Maximum {max_batch_size} locations allowed per request"
        )));
    }

    Ok(BatchRequest::Locations(locations))
}

fn invalid(reason: &str) -> SearchError {
    SearchError::InvalidInput(reason.to_owned())
}
