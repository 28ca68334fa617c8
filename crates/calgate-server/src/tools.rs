//! The operation table.
//!
//! Each [`Operation`] owns its argument schema, its scope requirement and the
//! builder that turns validated arguments into an [`ApiRequest`].

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Map, Value, json};

use calgate_core::ScopeRequirement;
use calgate_protocol::ToolDescriptor;
use calgate_providers::ApiRequest;

use crate::error::DispatchError;

/// Path of the primary calendar's event collection.
const EVENTS_PATH: &str = "/calendars/primary/events";
const ORDERING: &str = "orderBy=startTime&singleEvents=true";

/// Default for `max_results`.
pub const DEFAULT_MAX_RESULTS: u64 = 10;

/// Bounds for `max_results`.
pub const MAX_RESULTS_RANGE: std::ops::RangeInclusive<u64> = 1..=50;

/// Scope for reading events.
pub const SCOPE_READ: &str = "calendar:read";
/// Scope for searching events.
pub const SCOPE_SEARCH: &str = "calendar:search";
/// Scope for creating events.
pub const SCOPE_WRITE: &str = "calendar:write";

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

/// A named tool operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Upcoming events on the primary calendar.
    ListUpcoming,
    /// Events between two dates.
    ListByRange,
    /// Free-text event search.
    Search,
    /// Create an event.
    Create,
}

impl Operation {
    /// Every operation, in listing order.
    pub const ALL: [Operation; 4] = [
        Operation::ListUpcoming,
        Operation::ListByRange,
        Operation::Search,
        Operation::Create,
    ];

    /// Returns the tool name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListUpcoming => "get_upcoming_events",
            Self::ListByRange => "get_events_by_date_range",
            Self::Search => "search_events",
            Self::Create => "create_calendar_event",
        }
    }

    /// Returns the short alias also accepted as a tool name.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::ListUpcoming => "list-upcoming",
            Self::ListByRange => "list-by-range",
            Self::Search => "search",
            Self::Create => "create",
        }
    }

    /// Looks an operation up by tool name or alias.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name || op.alias() == name)
    }

    /// Returns the tool description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ListUpcoming => "gets upcoming events from the primary calendar",
            Self::ListByRange => "gets events within a specific date range",
            Self::Search => "searches for events with a specific query",
            Self::Create => "creates a new calendar event",
        }
    }

    /// Returns the scopes a caller needs for this operation.
    pub fn required_scopes(&self) -> ScopeRequirement {
        match self {
            Self::ListUpcoming | Self::ListByRange => ScopeRequirement::one(SCOPE_READ),
            Self::Search => ScopeRequirement::one(SCOPE_SEARCH),
            Self::Create => ScopeRequirement::one(SCOPE_WRITE),
        }
    }

    /// Returns the argument names this operation accepts.
    pub fn arguments(&self) -> &'static [&'static str] {
        match self {
            Self::ListUpcoming => &["max_results"],
            Self::ListByRange => &["start_date", "end_date"],
            Self::Search => &["query"],
            Self::Create => &["event_data"],
        }
    }

    /// Returns the JSON Schema of the arguments object.
    pub fn input_schema(&self) -> Value {
        match self {
            Self::ListUpcoming => json!({
                "type": "object",
                "properties": {
                    "max_results": {
                        "type": "integer",
                        "minimum": MAX_RESULTS_RANGE.start(),
                        "maximum": MAX_RESULTS_RANGE.end(),
                        "default": DEFAULT_MAX_RESULTS,
                    }
                },
                "required": [],
                "additionalProperties": false,
            }),
            Self::ListByRange => json!({
                "type": "object",
                "properties": {
                    "start_date": { "type": "string", "pattern": DATE_REGEX.as_str() },
                    "end_date": { "type": "string", "pattern": DATE_REGEX.as_str() },
                },
                "required": ["start_date", "end_date"],
                "additionalProperties": false,
            }),
            Self::Search => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "minLength": 1 }
                },
                "required": ["query"],
                "additionalProperties": false,
            }),
            Self::Create => json!({
                "type": "object",
                "properties": {
                    "event_data": {
                        "type": "string",
                        "description": "JSON string containing event details",
                    }
                },
                "required": ["event_data"],
                "additionalProperties": false,
            }),
        }
    }

    /// Returns the tool descriptor.
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Validates `args` and builds the downstream request.
    ///
    /// Arguments not listed in [`Operation::arguments`] are rejected. `now`
    /// is the lower bound used by [`Operation::ListUpcoming`].
    pub fn build_request(
        &self,
        args: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<ApiRequest, DispatchError> {
        let known = self.arguments();
        if let Some(unknown) = args.keys().find(|k| !known.contains(&k.as_str())) {
            return Err(DispatchError::invalid_argument(unknown.as_str(), "unknown argument"));
        }

        match self {
            Self::ListUpcoming => {
                let max_results = max_results(args)?;
                let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);
                Ok(ApiRequest::get(format!(
                    "{EVENTS_PATH}?maxResults={max_results}&timeMin={}&{ORDERING}",
                    urlencoding::encode(&time_min)
                )))
            }
            Self::ListByRange => {
                let start = date(args, "start_date")?;
                let end = date(args, "end_date")?;
                if end < start {
                    return Err(DispatchError::invalid_argument(
                        "end_date",
                        "must not be before start_date",
                    ));
                }
                let time_min = format!("{}T00:00:00Z", start.format("%Y-%m-%d"));
                let time_max = format!("{}T23:59:59Z", end.format("%Y-%m-%d"));
                Ok(ApiRequest::get(format!(
                    "{EVENTS_PATH}?timeMin={}&timeMax={}&{ORDERING}",
                    urlencoding::encode(&time_min),
                    urlencoding::encode(&time_max)
                )))
            }
            Self::Search => {
                let query = non_empty_string(args, "query")?;
                Ok(ApiRequest::get(format!(
                    "{EVENTS_PATH}?q={}&{ORDERING}",
                    urlencoding::encode(query.trim())
                )))
            }
            Self::Create => {
                let event_data = non_empty_string(args, "event_data")?;
                Ok(ApiRequest::post(EVENTS_PATH, event_data))
            }
        }
    }
}

/// Returns every tool descriptor.
pub fn descriptors() -> Vec<ToolDescriptor> {
    Operation::ALL.iter().map(Operation::descriptor).collect()
}

fn max_results(args: &Map<String, Value>) -> Result<u64, DispatchError> {
    let value = match args.get("max_results") {
        None | Some(Value::Null) => return Ok(DEFAULT_MAX_RESULTS),
        Some(value) => value,
    };

    let n = value
        .as_u64()
        .ok_or_else(|| DispatchError::invalid_argument("max_results", "must be an integer"))?;

    if !MAX_RESULTS_RANGE.contains(&n) {
        let reason = format!(
            "must be between {} and {}, got {n}",
            MAX_RESULTS_RANGE.start(),
            MAX_RESULTS_RANGE.end()
        );
        return Err(DispatchError::invalid_argument("max_results", reason));
    }
    Ok(n)
}

fn date(args: &Map<String, Value>, field: &str) -> Result<NaiveDate, DispatchError> {
    let raw = args
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| DispatchError::invalid_argument(field, "expected a YYYY-MM-DD string"))?;

    if !DATE_REGEX.is_match(raw) {
        return Err(DispatchError::invalid_argument(
            field,
            format!("expected YYYY-MM-DD, got '{raw}'"),
        ));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DispatchError::invalid_argument(field, format!("'{raw}' is not a valid date")))
}

fn non_empty_string<'a>(
    args: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, DispatchError> {
    match args.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) => Err(DispatchError::invalid_argument(field, "must not be empty")),
        _ => Err(DispatchError::invalid_argument(field, "expected a string")),
    }
}
