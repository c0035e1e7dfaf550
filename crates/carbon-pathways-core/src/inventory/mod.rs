//! Inventory side of the engine: reference tables, the organisation tree,
//! raw activity data, and the conversion of activity into a per-scope,
//! per-site baseline.

pub mod activity;
pub mod baseline;
pub mod conversion;
pub mod org;
pub mod reference;

pub use activity::{ActivityRecord, ActivityStore, NodeIndicatorMapping, RawQuantity};
pub use baseline::{
    aggregate_baseline, calculate_baseline, BaselineInput, BaselineMemo, BaselineSnapshot,
    IndicatorBreakdown,
};
pub use conversion::convert_to_co2e;
pub use org::{NodeType, OrgIndex, OrgNode};
pub use reference::{ConversionFactor, EmissionFactor, Indicator, InventoryYear, ReferenceTables};
