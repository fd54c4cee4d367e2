//! Category registry: the static catalog of queryable record categories.
//!
//! Responsibilities:
//! - Describe every category the remote API can be asked for, in display order.
//! - Describe each category's fields: key path, label, value type, default
//!   visibility and optional name resolver.
//!
//! Does NOT handle:
//! - Building remote calls (see `query`).
//! - Formatting values (see `format`).
//!
//! Invariants:
//! - The catalog is immutable and lives for the whole process.
//! - Category keys are unique; field keys are unique within a category.

use serde::Serialize;
use std::fmt;

use self::ResolverKind as R;
use self::ValueType as T;

/// Value type of a field; drives formatting, sorting and chart options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Date,
    Boolean,
    Id,
    Duration,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Id => "id",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup used to turn an identifier into a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Device,
    Zone,
    Rule,
    User,
    Diagnostic,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Zone => "zone",
            Self::Rule => "rule",
            Self::User => "user",
            Self::Diagnostic => "diagnostic",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One displayable, exportable column of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    /// Dot-separated path into a row, e.g. `device.id`.
    pub key: &'static str,
    pub label: &'static str,
    pub default_visible: bool,
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverKind>,
}

/// A queryable record category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDefinition {
    pub key: &'static str,
    pub label: &'static str,
    /// Type name sent to the remote API.
    pub type_name: &'static str,
    pub needs_date_range: bool,
    pub needs_diagnostic: bool,
    /// Only principals flagged as drivers are returned (`isDriver = true`).
    pub is_principal_filter_only: bool,
    pub fields: &'static [FieldDefinition],
}

impl CategoryDefinition {
    /// Fields shown when the category is first selected.
    pub fn default_fields(&self) -> Vec<FieldDefinition> {
        self.fields
            .iter()
            .filter(|f| f.default_visible)
            .copied()
            .collect()
    }

    /// Look up a field by key path.
    pub fn field(&self, key: &str) -> Option<&'static FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }
}

const fn plain(
    key: &'static str,
    label: &'static str,
    default_visible: bool,
    value_type: ValueType,
) -> FieldDefinition {
    FieldDefinition {
        key,
        label,
        default_visible,
        value_type,
        resolver: None,
    }
}

const fn resolved(
    key: &'static str,
    label: &'static str,
    default_visible: bool,
    resolver: ResolverKind,
) -> FieldDefinition {
    FieldDefinition {
        key,
        label,
        default_visible,
        value_type: ValueType::Id,
        resolver: Some(resolver),
    }
}

const TRIP_FIELDS: &[FieldDefinition] = &[
    plain("id", "Trip ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    resolved("driver.id", "Driver", true, R::User),
    plain("start", "Start Time", true, T::Date),
    plain("stop", "Stop Time", true, T::Date),
    plain("distance", "Distance (km)", true, T::Number),
    plain("drivingDuration", "Driving Duration", true, T::Duration),
    plain("stopDuration", "Stop Duration", false, T::Duration),
    plain("idlingDuration", "Idling Duration", false, T::Duration),
    plain("maximumSpeed", "Max Speed (km/h)", true, T::Number),
    plain("averageSpeed", "Avg Speed (km/h)", false, T::Number),
    plain("stopPoint.x", "Stop Longitude", false, T::Number),
    plain("stopPoint.y", "Stop Latitude", false, T::Number),
    plain(
        "nextTripDrivingDuration",
        "Next Trip Driving Duration",
        false,
        T::Duration,
    ),
];

const DEVICE_FIELDS: &[FieldDefinition] = &[
    plain("id", "Device ID", false, T::String),
    plain("name", "Name", true, T::String),
    plain("serialNumber", "Serial Number", true, T::String),
    plain("deviceType", "Device Type", true, T::String),
    plain("vehicleIdentificationNumber", "VIN", true, T::String),
    plain("licensePlate", "License Plate", true, T::String),
    plain("comment", "Comment", false, T::String),
    plain(
        "engineVehicleIdentificationNumber",
        "Engine VIN",
        false,
        T::String,
    ),
    plain("activeFrom", "Active From", true, T::Date),
    plain("activeTo", "Active To", false, T::Date),
    plain("productId", "Product ID", false, T::Number),
];

const FAULT_DATA_FIELDS: &[FieldDefinition] = &[
    plain("id", "Fault ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    resolved("diagnostic.id", "Diagnostic", true, R::Diagnostic),
    plain("dateTime", "Date/Time", true, T::Date),
    plain("failureMode.id", "Failure Mode", true, T::String),
    plain("faultState", "Fault State", true, T::String),
    plain("controller.id", "Controller", false, T::String),
    plain("count", "Count", false, T::Number),
    plain("malfunction", "Malfunction", false, T::Boolean),
];

const EXCEPTION_EVENT_FIELDS: &[FieldDefinition] = &[
    plain("id", "Event ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    resolved("driver.id", "Driver", true, R::User),
    resolved("rule.id", "Rule", true, R::Rule),
    plain("activeFrom", "Start", true, T::Date),
    plain("activeTo", "End", true, T::Date),
    plain("duration", "Duration", true, T::Duration),
    plain("distance", "Distance (km)", false, T::Number),
    plain("state", "State", true, T::String),
];

const LOG_RECORD_FIELDS: &[FieldDefinition] = &[
    plain("id", "Log ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    plain("dateTime", "Date/Time", true, T::Date),
    plain("latitude", "Latitude", true, T::Number),
    plain("longitude", "Longitude", true, T::Number),
    plain("speed", "Speed (km/h)", true, T::Number),
];

const STATUS_DATA_FIELDS: &[FieldDefinition] = &[
    plain("id", "Record ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    resolved("diagnostic.id", "Diagnostic", true, R::Diagnostic),
    plain("dateTime", "Date/Time", true, T::Date),
    plain("data", "Value", true, T::Number),
];

const ZONE_FIELDS: &[FieldDefinition] = &[
    plain("id", "Zone ID", false, T::String),
    plain("name", "Name", true, T::String),
    plain("comment", "Comment", false, T::String),
    plain("displayed", "Displayed", true, T::Boolean),
    plain("mustIdentifyStops", "Must Identify Stops", false, T::Boolean),
    plain("activeFrom", "Active From", true, T::Date),
    plain("activeTo", "Active To", false, T::Date),
    plain("externalReference", "External Reference", false, T::String),
    plain("zoneTypes", "Zone Types", true, T::String),
];

const USER_FIELDS: &[FieldDefinition] = &[
    plain("id", "User ID", false, T::String),
    plain("name", "Username", true, T::String),
    plain("firstName", "First Name", true, T::String),
    plain("lastName", "Last Name", true, T::String),
    plain("employeeNo", "Employee #", true, T::String),
    plain("isDriver", "Is Driver", false, T::Boolean),
    plain("driverGroups", "Driver Groups", false, T::String),
    plain("activeFrom", "Active From", true, T::Date),
    plain("activeTo", "Active To", false, T::Date),
    plain("phoneNumber", "Phone", false, T::String),
];

const DRIVER_CHANGE_FIELDS: &[FieldDefinition] = &[
    plain("id", "Change ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    resolved("driver.id", "Driver", true, R::User),
    plain("dateTime", "Date/Time", true, T::Date),
    plain("type", "Type", true, T::String),
];

const DUTY_STATUS_LOG_FIELDS: &[FieldDefinition] = &[
    plain("id", "Log ID", false, T::String),
    resolved("driver.id", "Driver", true, R::User),
    resolved("device.id", "Device", true, R::Device),
    plain("dateTime", "Date/Time", true, T::Date),
    plain("status", "Status", true, T::String),
    plain("origin", "Origin", true, T::String),
    plain("state", "State", false, T::String),
    plain("location.x", "Longitude", false, T::Number),
    plain("location.y", "Latitude", false, T::Number),
    plain("annotations", "Annotations", false, T::String),
    plain("malfunction", "Malfunction", false, T::Boolean),
];

const DVIR_LOG_FIELDS: &[FieldDefinition] = &[
    plain("id", "DVIR ID", false, T::String),
    resolved("device.id", "Device", true, R::Device),
    resolved("driver.id", "Driver", true, R::User),
    plain("dateTime", "Date/Time", true, T::Date),
    plain("logType", "Log Type", true, T::String),
    plain("isSafe", "Is Safe", true, T::Boolean),
    resolved("certifiedBy.id", "Certified By", false, R::User),
    resolved("repairedBy.id", "Repaired By", false, R::User),
    plain("certifyDate", "Certify Date", false, T::Date),
    plain("repairDate", "Repair Date", false, T::Date),
];

const fn define(
    key: &'static str,
    label: &'static str,
    needs_date_range: bool,
    fields: &'static [FieldDefinition],
) -> CategoryDefinition {
    CategoryDefinition {
        key,
        label,
        type_name: key,
        needs_date_range,
        needs_diagnostic: false,
        is_principal_filter_only: false,
        fields,
    }
}

static CATEGORIES: [CategoryDefinition; 11] = [
    define("Trip", "Trips", true, TRIP_FIELDS),
    define("Device", "Devices", false, DEVICE_FIELDS),
    define("FaultData", "Faults", true, FAULT_DATA_FIELDS),
    define(
        "ExceptionEvent",
        "Exception Events",
        true,
        EXCEPTION_EVENT_FIELDS,
    ),
    define("LogRecord", "GPS Logs", true, LOG_RECORD_FIELDS),
    CategoryDefinition {
        needs_diagnostic: true,
        ..define(
            "StatusData",
            "Engine / Status Data",
            true,
            STATUS_DATA_FIELDS,
        )
    },
    define("Zone", "Zones", false, ZONE_FIELDS),
    CategoryDefinition {
        is_principal_filter_only: true,
        ..define("User", "Drivers", false, USER_FIELDS)
    },
    define(
        "DriverChange",
        "Driver Changes",
        true,
        DRIVER_CHANGE_FIELDS,
    ),
    define(
        "DutyStatusLog",
        "HOS / Duty Status",
        true,
        DUTY_STATUS_LOG_FIELDS,
    ),
    define("DVIRLog", "DVIR Logs", true, DVIR_LOG_FIELDS),
];

/// Every category, in display order.
pub fn categories() -> &'static [CategoryDefinition] {
    &CATEGORIES
}

/// Look up a category by key (case-sensitive).
pub fn category(key: &str) -> Option<&'static CategoryDefinition> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Category keys in display order.
pub fn category_keys() -> Vec<&'static str> {
    CATEGORIES.iter().map(|c| c.key).collect()
}
