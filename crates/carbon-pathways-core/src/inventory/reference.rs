use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{deserialize_id, ScopeTag, Year};

/// An inventory (reporting) year. Selects which activity snapshot is the
/// baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryYear {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(alias = "year")]
    pub calendar_year: Year,
}

/// How a raw activity quantity becomes emissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub scope_tag: ScopeTag,
    #[serde(default)]
    pub default_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_factor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_factor_id: Option<String>,
}

/// Multiplicative unit conversion into kWh: `target = source * factor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFactor {
    pub id: String,
    pub source_unit: String,
    #[serde(default = "default_target_unit")]
    pub target_unit: String,
    #[serde(alias = "conversion_factor")]
    pub factor: Decimal,
}

fn default_target_unit() -> String {
    "kWh".to_string()
}

/// Emission factor in kgCO2e per kWh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub id: String,
    #[serde(default)]
    pub scope_tag: ScopeTag,
    pub value: Decimal,
}

/// Plain list form of the reference tables, as supplied by the table
/// editors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLists {
    pub indicators: Vec<Indicator>,
    pub conversion_factors: Vec<ConversionFactor>,
    pub emission_factors: Vec<EmissionFactor>,
}

/// Immutable id-keyed lookup over indicators and factors.
///
/// Later entries with a duplicate id replace earlier ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "ReferenceLists")]
pub struct ReferenceTables {
    indicators: HashMap<String, Indicator>,
    conversion_factors: HashMap<String, ConversionFactor>,
    emission_factors: HashMap<String, EmissionFactor>,
}

impl ReferenceTables {
    pub fn new(
        indicators: Vec<Indicator>,
        conversion_factors: Vec<ConversionFactor>,
        emission_factors: Vec<EmissionFactor>,
    ) -> Self {
        Self {
            indicators: indicators.into_iter().map(|i| (i.id.clone(), i)).collect(),
            conversion_factors: conversion_factors
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            emission_factors: emission_factors
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
        }
    }

    pub fn indicator(&self, id: &str) -> Option<&Indicator> {
        self.indicators.get(id)
    }

    pub fn conversion_factor(&self, id: &str) -> Option<&ConversionFactor> {
        self.conversion_factors.get(id)
    }

    pub fn emission_factor(&self, id: &str) -> Option<&EmissionFactor> {
        self.emission_factors.get(id)
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }
}

impl From<ReferenceLists> for ReferenceTables {
    fn from(lists: ReferenceLists) -> Self {
        ReferenceTables::new(lists.indicators, lists.conversion_factors, lists.emission_factors)
    }
}
