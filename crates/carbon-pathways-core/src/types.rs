use rust_decimal::Decimal;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Emissions in tonnes of CO2-equivalent.
pub type Tonnes = Decimal;

/// Emissions in kilograms of CO2-equivalent (converter output).
pub type Kilograms = Decimal;

/// Monetary amounts (capex, opex, NPV).
pub type Money = Decimal;

/// Percentage points, 0-100. Growth rates and reduction shares use this.
pub type Percent = Decimal;

/// Rates expressed as decimals (0.07 = 7%). Used for discounting only.
pub type Rate = Decimal;

/// Calendar year.
pub type Year = i32;

/// GHG Protocol scope an abatement measure acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "scope1", alias = "Scope1", alias = "Scope 1")]
    Scope1,
    #[serde(rename = "scope2", alias = "Scope2", alias = "Scope 2")]
    Scope2,
}

/// Scope classification carried by indicators and emission factors.
/// `General` indicators (revenue, floor area, ...) carry no emissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeTag {
    #[default]
    General,
    Scope1,
    Scope2,
}

impl ScopeTag {
    pub fn scope(self) -> Option<Scope> {
        match self {
            ScopeTag::General => None,
            ScopeTag::Scope1 => Some(Scope::Scope1),
            ScopeTag::Scope2 => Some(Scope::Scope2),
        }
    }
}

/// Identifiers arrive from the editors either as strings or as integers
/// (timestamps, sequence numbers). Both become a `String`.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Int(i64),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Text(s) => s,
            IdRepr::Int(n) => n.to_string(),
        }
    }
}

pub fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    IdRepr::deserialize(deserializer).map(String::from)
}

pub fn deserialize_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let id = Option::<IdRepr>::deserialize(deserializer)?;
    Ok(id.map(String::from).filter(|s| !s.is_empty()))
}

pub fn deserialize_id_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let ids = Option::<Vec<IdRepr>>::deserialize(deserializer)?;
    Ok(ids.unwrap_or_default().into_iter().map(String::from).collect())
}

/// A pair of Scope 1 / Scope 2 quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSplit {
    pub scope1: Tonnes,
    pub scope2: Tonnes,
}

impl ScopeSplit {
    pub fn new(scope1: Tonnes, scope2: Tonnes) -> Self {
        Self { scope1, scope2 }
    }

    pub fn total(&self) -> Tonnes {
        self.scope1.saturating_add(self.scope2)
    }

    pub fn get(&self, scope: Scope) -> Tonnes {
        match scope {
            Scope::Scope1 => self.scope1,
            Scope::Scope2 => self.scope2,
        }
    }

    pub fn add(&mut self, scope: Scope, amount: Tonnes) {
        match scope {
            Scope::Scope1 => self.scope1 = self.scope1.saturating_add(amount),
            Scope::Scope2 => self.scope2 = self.scope2.saturating_add(amount),
        }
    }

    pub fn accumulate(&mut self, other: &ScopeSplit) {
        self.add(Scope::Scope1, other.scope1);
        self.add(Scope::Scope2, other.scope2);
    }
}

/// Annual growth assumptions for the three projection periods, in percent
/// per year: `p1` up to 2030, `p2` for 2031-2040, `p3` for 2041-2050.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub p1: Percent,
    pub p2: Percent,
    pub p3: Percent,
}

impl GrowthRates {
    pub fn new(p1: Percent, p2: Percent, p3: Percent) -> Self {
        Self { p1, p2, p3 }
    }

    pub fn flat() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }
}

impl Default for GrowthRates {
    fn default() -> Self {
        Self::new(Decimal::new(20, 1), Decimal::new(15, 1), Decimal::new(10, 1))
    }
}

/// A year-indexed emissions series. `years` is strictly ascending and
/// `values[i]` belongs to `years[i]`.
///
/// Serialises as `{"years": [...], "values": [...]}` with values rounded to
/// two decimals and written as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsTrajectory {
    pub years: Vec<Year>,
    #[serde(serialize_with = "serialize_two_dp")]
    pub values: Vec<Tonnes>,
}

impl EmissionsTrajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            years: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, year: Year, value: Tonnes) {
        self.years.push(year);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first_year(&self) -> Option<Year> {
        self.years.first().copied()
    }

    pub fn last_value(&self) -> Option<Tonnes> {
        self.values.last().copied()
    }

    /// Value for a calendar year, if the year is covered.
    pub fn value_at(&self, year: Year) -> Option<Tonnes> {
        let first = self.first_year()?;
        let idx = usize::try_from(i64::from(year) - i64::from(first)).ok()?;
        match (self.years.get(idx), self.values.get(idx)) {
            (Some(y), Some(v)) if *y == year => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Year, Tonnes)> + '_ {
        self.years.iter().copied().zip(self.values.iter().copied())
    }

    /// Element-wise sum of two series covering the same years.
    pub fn combine(&self, other: &EmissionsTrajectory) -> EmissionsTrajectory {
        let mut out = EmissionsTrajectory::with_capacity(self.len());
        for ((year, a), b) in self.iter().zip(other.values.iter()) {
            out.push(year, a.saturating_add(*b));
        }
        out
    }

    /// Sum of all values (tonne-years), saturating.
    pub fn cumulative(&self) -> Tonnes {
        self.values.iter().fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }
}

fn serialize_two_dp<S: Serializer>(values: &[Tonnes], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for v in values {
        let rounded: f64 = v.round_dp(2).to_string().parse().unwrap_or_default();
        seq.serialize_element(&rounded)?;
    }
    seq.end()
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> EmissionsTrajectory {
        let mut t = EmissionsTrajectory::default();
        t.push(2024, dec!(100.456));
        t.push(2025, dec!(101.004));
        t.push(2026, dec!(99.995));
        t
    }

    #[test]
    fn test_value_at_covered_and_uncovered_years() {
        let t = sample();
        assert_eq!(t.value_at(2025), Some(dec!(101.004)));
        assert_eq!(t.value_at(2023), None);
        assert_eq!(t.value_at(2027), None);
    }

    #[test]
    fn test_serialises_years_and_two_dp_numbers() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["years"], serde_json::json!([2024, 2025, 2026]));
        assert_eq!(json["values"], serde_json::json!([100.46, 101.0, 100.0]));
    }

    #[test]
    fn test_combine_sums_elementwise() {
        let t = sample();
        let sum = t.combine(&t);
        assert_eq!(sum.years, t.years);
        assert_eq!(sum.values[0], dec!(200.912));
    }

    #[test]
    fn test_scope_accepts_legacy_labels() {
        let s: Scope = serde_json::from_str("\"Scope 1\"").unwrap();
        assert_eq!(s, Scope::Scope1);
        let s: Scope = serde_json::from_str("\"scope2\"").unwrap();
        assert_eq!(s, Scope::Scope2);
    }

    #[derive(Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_opt_id")]
        node: Option<String>,
        #[serde(default, deserialize_with = "deserialize_id_list")]
        others: Vec<String>,
    }

    #[test]
    fn test_ids_accept_strings_and_integers() {
        let ids: Ids =
            serde_json::from_str(r#"{"id": 1717000000000, "node": "", "others": ["m1", 7]}"#)
                .unwrap();
        assert_eq!(ids.id, "1717000000000");
        assert_eq!(ids.node, None);
        assert_eq!(ids.others, vec!["m1".to_string(), "7".to_string()]);
    }

    #[test]
    fn test_scope_split_total() {
        let mut split = ScopeSplit::new(dec!(10), dec!(5));
        split.add(Scope::Scope2, dec!(2.5));
        assert_eq!(split.total(), dec!(17.5));
        assert_eq!(split.get(Scope::Scope2), dec!(7.5));
    }
}
