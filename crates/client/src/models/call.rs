//! Logical API calls.
//!
//! Invariants:
//! - Optional filter members that are `None` are never serialized, so an empty
//!   filter is the JSON object `{}`.
//! - Field names on the wire are camelCase.

use serde::{Deserialize, Serialize};

/// Reference to another entity by id, e.g. `{"id": "b12"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Search filter of a `Get` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_search: Option<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_driver: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic_search: Option<IdRef>,
}

impl SearchFilter {
    /// True when no member is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Parameters of a `Get` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
    pub type_name: String,
    pub search: SearchFilter,
    pub results_limit: u32,
}

/// One logical call inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCall {
    pub method: String,
    pub params: GetParams,
}

impl ApiCall {
    /// A `Get` call for `params.type_name`.
    pub fn get(params: GetParams) -> Self {
        Self {
            method: "Get".to_string(),
            params,
        }
    }

    /// Remote type name this call reads.
    pub fn type_name(&self) -> &str {
        &self.params.type_name
    }
}
