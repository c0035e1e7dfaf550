use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::deserialize_id;

/// Indicators each organisation node reports, keyed by node id.
pub type NodeIndicatorMapping = BTreeMap<String, Vec<String>>;

/// A raw measured quantity as captured by the data-collection forms: a JSON
/// number, or text that may be empty or not numeric at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuantity {
    Number(Decimal),
    Text(String),
}

impl RawQuantity {
    /// Numeric value; anything that does not parse counts as zero.
    pub fn as_decimal(&self) -> Decimal {
        match self {
            RawQuantity::Number(d) => *d,
            RawQuantity::Text(s) => {
                let trimmed = s.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .unwrap_or(Decimal::ZERO)
            }
        }
    }
}

impl From<Decimal> for RawQuantity {
    fn from(d: Decimal) -> Self {
        RawQuantity::Number(d)
    }
}

/// One measured activity value for `(inventory year, node, indicator)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub inventory_year_id: String,
    pub org_node_id: String,
    pub indicator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawQuantity>,
    #[serde(default)]
    pub unit: String,
}

impl ActivityRecord {
    pub fn quantity(&self) -> Decimal {
        self.value
            .as_ref()
            .map(RawQuantity::as_decimal)
            .unwrap_or(Decimal::ZERO)
    }
}

type ActivityKey = (String, String, String);

/// Serialised form of [`ActivityStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecords {
    /// Caller-maintained revision counter; bumped on every edit.
    pub version: u64,
    pub records: Vec<ActivityRecord>,
}

/// Read-only snapshot of activity data, indexed by
/// `(inventory_year_id, org_node_id, indicator_id)`.
///
/// A later record with the same key replaces an earlier one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "ActivityRecords")]
pub struct ActivityStore {
    version: u64,
    records: HashMap<ActivityKey, ActivityRecord>,
}

impl ActivityStore {
    pub fn new(records: Vec<ActivityRecord>, version: u64) -> Self {
        let records = records
            .into_iter()
            .map(|r| {
                let key = (
                    r.inventory_year_id.clone(),
                    r.org_node_id.clone(),
                    r.indicator_id.clone(),
                );
                (key, r)
            })
            .collect();
        Self { version, records }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, year_id: &str, node_id: &str, indicator_id: &str) -> Option<&ActivityRecord> {
        let key = (year_id.to_string(), node_id.to_string(), indicator_id.to_string());
        self.records.get(&key)
    }
}

impl From<ActivityRecords> for ActivityStore {
    fn from(input: ActivityRecords) -> Self {
        ActivityStore::new(input.records, input.version)
    }
}
