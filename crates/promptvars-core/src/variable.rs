//! Prompt variable data model
//!
//! Three shapes of the same business record:
//!
//! - [`PersistedVariable`] - a row already in storage, owned by one prompt
//! - [`DesiredVariable`] - caller input describing the target state
//! - [`UpsertRecord`] - what the diff hands to storage for insert/update
//!
//! Field names serialize in camelCase so JSON produced by the web application
//! (`defaultValue`, `orderIndex`, `type`) round-trips without adapters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Variable Type
// ============================================================================

/// Closed set of value kinds a prompt variable can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VariableType {
    #[default]
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "NUMBER")]
    Number,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "ENUM")]
    Enum,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "MULTISTRING")]
    MultiString,
}

impl VariableType {
    /// Every variant, in declaration order
    pub const ALL: [VariableType; 6] = [
        VariableType::String,
        VariableType::Number,
        VariableType::Boolean,
        VariableType::Enum,
        VariableType::Date,
        VariableType::MultiString,
    ];

    /// Storage tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "STRING",
            VariableType::Number => "NUMBER",
            VariableType::Boolean => "BOOLEAN",
            VariableType::Enum => "ENUM",
            VariableType::Date => "DATE",
            VariableType::MultiString => "MULTISTRING",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a storage tag names no known [`VariableType`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variable type: {0}")]
pub struct UnknownVariableType(pub String);

impl FromStr for VariableType {
    type Err = UnknownVariableType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariableType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariableType(s.to_string()))
    }
}

// ============================================================================
// Persisted Variable
// ============================================================================

/// A variable row as it exists in storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedVariable {
    /// Stable identifier, unique across all prompts
    pub id: String,

    /// Owning prompt
    pub parent_id: String,

    /// Unique within `parent_id`
    pub name: String,

    #[serde(rename = "type")]
    pub var_type: VariableType,

    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Validation regex applied to supplied values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Allowed values when `var_type` is [`VariableType::Enum`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Display and application order, `0..N-1` within a prompt
    pub order_index: u32,

    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Desired Variable
// ============================================================================

/// Caller-supplied target state for one variable
///
/// `id` is a hint: when present it names the existing row this entry
/// continues, even if the name changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DesiredVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(rename = "type", default)]
    pub var_type: VariableType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl DesiredVariable {
    /// Create an optional string variable with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style: reference an existing row by id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style: set the value type
    #[must_use]
    pub fn with_type(mut self, var_type: VariableType) -> Self {
        self.var_type = var_type;
        self
    }

    /// Builder-style: set the required flag
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Builder-style: set the default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Builder-style: set help text
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Builder-style: set the validation pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Builder-style: set enum options
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

impl From<&PersistedVariable> for DesiredVariable {
    /// Re-read a stored row as desired input, keeping its id
    fn from(row: &PersistedVariable) -> Self {
        Self {
            id: Some(row.id.clone()),
            name: row.name.clone(),
            var_type: row.var_type,
            required: row.required,
            default_value: row.default_value.clone(),
            help: row.help.clone(),
            pattern: row.pattern.clone(),
            options: row.options.clone(),
        }
    }
}

// ============================================================================
// Upsert Record
// ============================================================================

/// A record handed to storage by the diff
///
/// Records without an `id` are inserts; storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub parent_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub order_index: u32,
}

impl UpsertRecord {
    /// Build a record from desired input at list position `order_index`
    ///
    /// The record takes `id` as given, not from `desired.id`; the diff decides
    /// which identity survives.
    pub fn from_desired(
        id: Option<String>,
        parent_id: &str,
        desired: &DesiredVariable,
        order_index: u32,
    ) -> Self {
        Self {
            id,
            parent_id: parent_id.to_string(),
            name: desired.name.clone(),
            var_type: desired.var_type,
            required: desired.required,
            default_value: desired.default_value.clone(),
            help: desired.help.clone(),
            pattern: desired.pattern.clone(),
            options: desired.options.clone(),
            order_index,
        }
    }

    /// True when this is an insert (storage assigns the id)
    pub fn is_insert(&self) -> bool {
        self.id.is_none()
    }

    /// True when applying this record would leave `row` unchanged
    pub fn matches_persisted(&self, row: &PersistedVariable) -> bool {
        self.id.as_deref() == Some(row.id.as_str())
            && self.parent_id == row.parent_id
            && self.name == row.name
            && self.var_type == row.var_type
            && self.required == row.required
            && self.default_value == row.default_value
            && self.help == row.help
            && self.pattern == row.pattern
            && self.options == row.options
            && self.order_index == row.order_index
    }

    /// Materialize the stored row for this record
    ///
    /// Storage backends call this after assigning `id` and choosing
    /// `created_at` (kept from the existing row on update).
    pub fn into_persisted(self, id: String, created_at: DateTime<Utc>) -> PersistedVariable {
        PersistedVariable {
            id,
            parent_id: self.parent_id,
            name: self.name,
            var_type: self.var_type,
            required: self.required,
            default_value: self.default_value,
            help: self.help,
            pattern: self.pattern,
            options: self.options,
            order_index: self.order_index,
            created_at,
        }
    }
}
