//! Lookup cache: identifier to display-name resolution for reference entities.
//!
//! Responsibilities:
//! - Bulk-load devices, zones, rules and users in one batched call.
//! - Resolve identifiers synchronously, with readable fallbacks for misses.
//! - Collect diagnostic names incrementally from row payloads.
//!
//! Does NOT handle:
//! - Refreshing or invalidating loaded entries.
//! - Fetching the diagnostic catalog in bulk.
//!
//! Invariants:
//! - Once `is_loaded()` is true it stays true; later `initialize` calls
//!   return without a round trip.
//! - A failed load leaves the cache empty and unloaded, so it can be retried.
//! - `resolve` never fails: misses come back as the identifier's own text.

use std::collections::HashMap;

use fleet_client::{ApiCall, ClientError, DataSource, GetParams, SearchFilter};
use fleet_config::constants::{DEVICE_CACHE_LIMIT, REFERENCE_CACHE_LIMIT};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::registry::ResolverKind;
use crate::values::{is_truthy, plain_text, truthy_member};

const DIAGNOSTIC_PREFIX: &str = "Diagnostic";

/// Identifier to name mappings for the reference entities.
#[derive(Debug, Default, Clone)]
pub struct LookupCache {
    devices: HashMap<String, String>,
    zones: HashMap<String, String>,
    rules: HashMap<String, String>,
    users: HashMap<String, String>,
    diagnostics: HashMap<String, String>,
    loaded: bool,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load devices, zones, rules and users with a single batched call.
    ///
    /// Returns immediately once a previous call has succeeded.
    pub async fn initialize<D: DataSource>(&mut self, source: &D) -> Result<(), ClientError> {
        if self.loaded {
            debug!("Lookup cache already loaded, skipping fetch");
            return Ok(());
        }

        let calls = [
            reference_call("Device", DEVICE_CACHE_LIMIT),
            reference_call("Zone", REFERENCE_CACHE_LIMIT),
            reference_call("Rule", REFERENCE_CACHE_LIMIT),
            reference_call("User", REFERENCE_CACHE_LIMIT),
        ];
        let mut slots = source.batch_fetch(&calls).await?.into_iter();
        let mut next = || slots.next().flatten();

        let (devices, zones, rules, users) = (next(), next(), next(), next());
        self.devices = index_by_id(devices.as_ref(), device_name);
        self.zones = index_by_id(zones.as_ref(), named_or_id);
        self.rules = index_by_id(rules.as_ref(), named_or_id);
        self.users = index_by_id(users.as_ref(), user_name);
        self.loaded = true;

        info!(
            devices = self.devices.len(),
            zones = self.zones.len(),
            rules = self.rules.len(),
            users = self.users.len(),
            "Lookup cache loaded"
        );
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Display name for `id` under `kind`.
    ///
    /// Empty ids give an empty string. Misses fall back to a readable form of
    /// built-in `Diagnostic...` identifiers, and otherwise to the id itself.
    pub fn resolve(&self, kind: ResolverKind, id: &str) -> String {
        if id.is_empty() {
            return String::new();
        }
        if let Some(name) = self.map(kind).get(id).filter(|name| !name.is_empty()) {
            return name.clone();
        }
        if id.starts_with(DIAGNOSTIC_PREFIX) {
            return prettify_diagnostic_id(id);
        }
        id.to_string()
    }

    /// [`resolve`](Self::resolve) for a raw row value.
    pub fn resolve_value(&self, kind: ResolverKind, value: &Value) -> String {
        if !is_truthy(value) {
            return String::new();
        }
        self.resolve(kind, &plain_text(value))
    }

    /// Record one diagnostic name, replacing any earlier entry for `id`.
    pub fn cache_diagnostic(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.diagnostics.insert(id.into(), name.into());
    }

    /// Harvest `diagnostic: {id, name}` pairs carried inside rows.
    ///
    /// Returns the number of rows that contributed a name.
    pub fn backfill_diagnostics<'a>(&mut self, rows: impl IntoIterator<Item = &'a Value>) -> usize {
        let mut harvested = 0;
        for row in rows {
            let Some(diagnostic) = row.get("diagnostic") else {
                continue;
            };
            let id = truthy_member(diagnostic, "id").and_then(Value::as_str);
            let name = truthy_member(diagnostic, "name").and_then(Value::as_str);
            if let (Some(id), Some(name)) = (id, name) {
                self.cache_diagnostic(id, name);
                harvested += 1;
            }
        }
        if harvested > 0 {
            debug!(harvested, "Backfilled diagnostic names from rows");
        }
        harvested
    }

    /// Devices as `(id, name)`, ordered by name for pickers.
    pub fn devices(&self) -> Vec<(&str, &str)> {
        sorted_entries(&self.devices)
    }

    /// Users as `(id, name)`, ordered by name.
    pub fn users(&self) -> Vec<(&str, &str)> {
        sorted_entries(&self.users)
    }

    /// Number of cached entries for `kind`.
    pub fn len(&self, kind: ResolverKind) -> usize {
        self.map(kind).len()
    }

    fn map(&self, kind: ResolverKind) -> &HashMap<String, String> {
        match kind {
            ResolverKind::Device => &self.devices,
            ResolverKind::Zone => &self.zones,
            ResolverKind::Rule => &self.rules,
            ResolverKind::User => &self.users,
            ResolverKind::Diagnostic => &self.diagnostics,
        }
    }
}

fn reference_call(type_name: &str, limit: u32) -> ApiCall {
    ApiCall::get(GetParams {
        type_name: type_name.to_string(),
        search: SearchFilter::default(),
        results_limit: limit,
    })
}

fn index_by_id(slot: Option<&Value>, name_of: fn(&Value, &str) -> String) -> HashMap<String, String> {
    let Some(entities) = slot.and_then(Value::as_array) else {
        if slot.is_some() {
            warn!("Reference slot is not an array, treating as empty");
        }
        return HashMap::new();
    };

    entities
        .iter()
        .filter_map(|entity| {
            let id = truthy_member(entity, "id").map(plain_text)?;
            let name = name_of(entity, &id);
            Some((id, name))
        })
        .collect()
}

fn member_text(entity: &Value, key: &str) -> Option<String> {
    truthy_member(entity, key).map(plain_text)
}

fn device_name(entity: &Value, id: &str) -> String {
    member_text(entity, "name")
        .or_else(|| member_text(entity, "serialNumber"))
        .unwrap_or_else(|| id.to_string())
}

fn named_or_id(entity: &Value, id: &str) -> String {
    member_text(entity, "name").unwrap_or_else(|| id.to_string())
}

fn user_name(entity: &Value, id: &str) -> String {
    let first = member_text(entity, "firstName");
    let last = member_text(entity, "lastName");

    let full = if first.is_some() || last.is_some() {
        let joined = format!(
            "{} {}",
            first.unwrap_or_default(),
            last.unwrap_or_default()
        );
        Some(joined.trim().to_string()).filter(|s| !s.is_empty())
    } else {
        None
    };

    full.or_else(|| member_text(entity, "name"))
        .unwrap_or_else(|| id.to_string())
}

fn sorted_entries(map: &HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut entries: Vec<(&str, &str)> = map
        .iter()
        .map(|(id, name)| (id.as_str(), name.as_str()))
        .collect();
    entries.sort_by(|a, b| {
        a.1.to_lowercase()
            .cmp(&b.1.to_lowercase())
            .then_with(|| a.1.cmp(b.1))
            .then_with(|| a.0.cmp(b.0))
    });
    entries
}

/// `DiagnosticEngineSpeedId` becomes `Diagnostic Engine Speed`.
fn prettify_diagnostic_id(id: &str) -> String {
    let stem = id.strip_suffix("Id").unwrap_or(id);
    let mut spaced = String::with_capacity(stem.len() + 8);
    for ch in stem.chars() {
        if ch.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }
    spaced.trim().to_string()
}
