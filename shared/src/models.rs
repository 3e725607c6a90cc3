use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AggregatorError;

pub const DEFAULT_METER_NAME: &str = "Meter 1";
pub const SINGLE_SOURCE_NAME: &str = "Total";

/// Most meters a metered utility can be split into.
pub const MAX_METERS: usize = 10;

/// The fixed set of shared expenses a bill can be made of.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UtilityKind {
    #[serde(rename = "Electric Bill")]
    Electric,
    #[serde(rename = "Water Bill")]
    Water,
    #[serde(rename = "Extra")]
    Extra,
    #[serde(rename = "Others")]
    Others,
}

impl UtilityKind {
    pub const ALL: [UtilityKind; 4] = [
        UtilityKind::Electric,
        UtilityKind::Water,
        UtilityKind::Extra,
        UtilityKind::Others,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UtilityKind::Electric => "Electric Bill",
            UtilityKind::Water => "Water Bill",
            UtilityKind::Extra => "Extra",
            UtilityKind::Others => "Others",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            UtilityKind::Electric => "electric_bill",
            UtilityKind::Water => "water_bill",
            UtilityKind::Extra => "extra",
            UtilityKind::Others => "others",
        }
    }

    /// Only electricity is read from several meters.
    pub fn is_metered(&self) -> bool {
        matches!(self, UtilityKind::Electric)
    }

    pub fn default_source_name(&self) -> &'static str {
        if self.is_metered() {
            DEFAULT_METER_NAME
        } else {
            SINGLE_SOURCE_NAME
        }
    }
}

impl fmt::Display for UtilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UtilityKind {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        UtilityKind::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(wanted) || kind.key().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| AggregatorError::UnknownUtility(wanted.to_string()))
    }
}

/// One metered reading contributing to a utility's cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterSource {
    pub meter_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl MeterSource {
    pub fn new(meter_name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            meter_name: meter_name.into(),
            amount,
        }
    }

    pub fn meter(position: usize, amount: Decimal) -> Self {
        Self::new(format!("Meter {}", position), amount)
    }
}

/// A utility being edited in the calculator form.
///
/// `total_amount` is kept equal to the sum of `sources` by every mutation, so
/// the fields stay private.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityEntry {
    kind: UtilityKind,
    sources: Vec<MeterSource>,
    total_amount: Decimal,
}

impl UtilityEntry {
    /// A fresh entry with its single default source at zero.
    pub fn new(kind: UtilityKind) -> Self {
        Self {
            kind,
            sources: vec![MeterSource::new(kind.default_source_name(), Decimal::ZERO)],
            total_amount: Decimal::ZERO,
        }
    }

    /// Builds an entry from explicit sources. Meter names must be unique and
    /// at least one source is required.
    pub fn with_sources(kind: UtilityKind, sources: Vec<MeterSource>) -> Result<Self, AggregatorError> {
        if sources.is_empty() {
            return Err(AggregatorError::EmptySources(kind.label().to_string()));
        }
        for (idx, source) in sources.iter().enumerate() {
            if sources[..idx].iter().any(|s| s.meter_name == source.meter_name) {
                return Err(AggregatorError::DuplicateMeter {
                    utility: kind.label().to_string(),
                    meter: source.meter_name.clone(),
                });
            }
        }
        let mut entry = Self {
            kind,
            sources,
            total_amount: Decimal::ZERO,
        };
        entry.recompute_total();
        Ok(entry)
    }

    pub fn kind(&self) -> UtilityKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn sources(&self) -> &[MeterSource] {
        &self.sources
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub(crate) fn sources_mut(&mut self) -> &mut Vec<MeterSource> {
        &mut self.sources
    }

    pub(crate) fn recompute_total(&mut self) {
        self.total_amount = self
            .sources
            .iter()
            .fold(Decimal::ZERO, |total, s| total.saturating_add(s.amount));
    }
}

/// Per-utility line of a saved bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDetail {
    pub utility: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub sources: Vec<MeterSource>,
}

impl From<&UtilityEntry> for BillDetail {
    fn from(entry: &UtilityEntry) -> Self {
        BillDetail {
            utility: entry.label().to_string(),
            total_amount: entry.total_amount(),
            sources: entry.sources().to_vec(),
        }
    }
}

/// The computed summary of one month's shared expenses, in the shape the
/// bills API stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub month: String,
    pub made_by: String,
    pub total_members: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_bill: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bill_per_person: Decimal,
    pub issue_time: DateTime<Utc>,
    #[serde(default)]
    pub bill_details: Vec<BillDetail>,
}

/// Raised alongside a record whose total came out as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroTotalWarning;

impl fmt::Display for ZeroTotalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("total bill is zero — enter amounts before calculating")
    }
}

/// Result of a calculation: the record plus any advisory.
#[derive(Debug, Clone, PartialEq)]
pub struct BillSummary {
    pub record: BillRecord,
    pub warning: Option<ZeroTotalWarning>,
}
