//! Row types for the `servers` table.
//!
//! Field names and serialized shapes match the hosted table exactly:
//! `ip_data` entries use camelCase keys (`useGlobal`, `customDomains`)
//! and statuses serialize as their display labels (`"Timed Out"`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a server record. Immutable once created.
pub type ServerId = String;

/// Liveness status of a server.
///
/// The sweep only ever produces `Active` or `Down`; `TimedOut` is a
/// manual/legacy state set by direct user edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServerStatus {
    Active,
    Down,
    #[serde(rename = "Timed Out")]
    TimedOut,
}

impl ServerStatus {
    /// The label stored in the table and shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            ServerStatus::Active => "Active",
            ServerStatus::Down => "Down",
            ServerStatus::TimedOut => "Timed Out",
        }
    }
}

/// Inventory category. Fixed label set; the UI renders one tab per label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Production,
    Issues,
    Others,
    #[serde(rename = "Low Delivery")]
    LowDelivery,
    #[serde(rename = "To Return")]
    ToReturn,
    Test,
    New,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Production => "Production",
            Category::Issues => "Issues",
            Category::Others => "Others",
            Category::LowDelivery => "Low Delivery",
            Category::ToReturn => "To Return",
            Category::Test => "Test",
            Category::New => "New",
        }
    }
}

/// One IP entry on a server record.
///
/// The first entry in `ip_data` is the record's primary address — the
/// only one the sweep probes. Order is otherwise insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpEntry {
    /// Generated local identifier (unique within the record).
    pub id: String,
    /// Hostname or literal IP.
    pub address: String,
    /// When true the record's `global_domains` list applies to this entry.
    #[serde(rename = "useGlobal")]
    pub use_global: bool,
    /// Newline-delimited domain list, used only when `use_global` is false.
    #[serde(rename = "customDomains")]
    pub custom_domains: String,
}

/// A full inventory row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerRecord {
    pub id: ServerId,
    pub provider: String,
    pub category: Category,
    pub status: ServerStatus,
    pub ip_data: Vec<IpEntry>,
    /// Free-text, newline-delimited domain list shared by entries with
    /// `use_global` set.
    pub global_domains: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServerRecord {
    /// The address the sweep probes: the first IP entry's address.
    ///
    /// `None` when the record has no entries or the first address is empty.
    pub fn primary_address(&self) -> Option<&str> {
        let addr = self.ip_data.first()?.address.as_str();
        (!addr.is_empty()).then_some(addr)
    }
}

/// The projection the sweep fetches: `select("id, status, ip_data")`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepSnapshot {
    pub id: ServerId,
    pub status: ServerStatus,
    pub ip_data: Vec<IpEntry>,
}

impl SweepSnapshot {
    /// Same skip rule as [`ServerRecord::primary_address`].
    pub fn primary_address(&self) -> Option<&str> {
        let addr = self.ip_data.first()?.address.as_str();
        (!addr.is_empty()).then_some(addr)
    }
}
