// Bill aggregation: calculator form state and the pure split calculation.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::AggregatorError;
use crate::models::{
    BillDetail, BillRecord, BillSummary, MeterSource, UtilityEntry, UtilityKind, ZeroTotalWarning,
    MAX_METERS, SINGLE_SOURCE_NAME,
};
use crate::utils::{coerce_amount, coerce_count, coerce_members, current_month, round_money};

pub const DEFAULT_MADE_BY: &str = "Admin User";

/// Transient state of the calculator form.
#[derive(Debug, Clone, PartialEq)]
pub struct BillForm {
    pub month: String,
    pub made_by: String,
    /// Raw member count as typed; coerced when calculating.
    pub total_members: i64,
    utilities: Vec<UtilityEntry>,
}

impl Default for BillForm {
    fn default() -> Self {
        Self::new(DEFAULT_MADE_BY, 0)
    }
}

impl BillForm {
    pub fn new(made_by: impl Into<String>, total_members: i64) -> Self {
        Self {
            month: current_month(),
            made_by: made_by.into(),
            total_members,
            utilities: Vec::new(),
        }
    }

    pub fn utilities(&self) -> &[UtilityEntry] {
        &self.utilities
    }

    pub fn is_empty(&self) -> bool {
        self.utilities.is_empty()
    }

    pub fn position_of(&self, kind: UtilityKind) -> Option<usize> {
        self.utilities.iter().position(|u| u.kind() == kind)
    }

    /// Kinds not yet on the form, in selection order.
    pub fn available_utilities(&self) -> Vec<UtilityKind> {
        UtilityKind::ALL
            .into_iter()
            .filter(|kind| self.position_of(*kind).is_none())
            .collect()
    }

    pub fn next_available_utility(&self) -> Option<UtilityKind> {
        self.available_utilities().into_iter().next()
    }

    /// Appends a utility by label with its default source. Returns the new
    /// entry's position.
    pub fn add_utility(&mut self, label: &str) -> Result<usize, AggregatorError> {
        let kind: UtilityKind = label.parse()?;
        if self.position_of(kind).is_some() {
            tracing::warn!(utility = %kind, "Rejected duplicate utility");
            return Err(AggregatorError::DuplicateUtility(kind.label().to_string()));
        }
        self.utilities.push(UtilityEntry::new(kind));
        tracing::debug!(utility = %kind, count = self.utilities.len(), "Utility added");
        Ok(self.utilities.len() - 1)
    }

    /// Resizes the meters of the electric utility to `count` (at least one, at
    /// most `MAX_METERS`), keeping existing amounts by position.
    pub fn set_meter_count(&mut self, utility_index: usize, count: i64) -> Result<(), AggregatorError> {
        let count = coerce_count(count);
        let entry = self.entry_mut(utility_index)?;
        if !entry.kind().is_metered() {
            return Err(AggregatorError::NotMetered(entry.label().to_string()));
        }
        if count > MAX_METERS {
            tracing::warn!(utility = %entry.kind(), requested = count, max = MAX_METERS, "Rejected meter count");
            return Err(AggregatorError::TooManyMeters {
                utility: entry.label().to_string(),
                requested: count,
                max: MAX_METERS,
            });
        }
        let previous = std::mem::take(entry.sources_mut());
        let resized: Vec<MeterSource> = (0..count)
            .map(|i| {
                let amount = previous.get(i).map_or(Decimal::ZERO, |s| s.amount);
                MeterSource::meter(i + 1, amount)
            })
            .collect();
        *entry.sources_mut() = resized;
        entry.recompute_total();
        tracing::debug!(utility = %entry.kind(), meters = count, total = %entry.total_amount(), "Meter count changed");
        Ok(())
    }

    pub fn set_source_amount(
        &mut self,
        utility_index: usize,
        source_index: usize,
        raw_value: &str,
    ) -> Result<(), AggregatorError> {
        let amount = coerce_amount(raw_value);
        let entry = self.entry_mut(utility_index)?;
        let len = entry.sources().len();
        let label = entry.label();
        let source = entry
            .sources_mut()
            .get_mut(source_index)
            .ok_or_else(|| AggregatorError::SourceIndexOutOfRange {
                utility: label.to_string(),
                index: source_index,
                len,
            })?;
        source.amount = amount;
        entry.recompute_total();
        Ok(())
    }

    /// Sets the single `Total` amount of a non-metered utility.
    pub fn set_single_amount(&mut self, utility_index: usize, raw_value: &str) -> Result<(), AggregatorError> {
        let amount = coerce_amount(raw_value);
        let entry = self.entry_mut(utility_index)?;
        if entry.kind().is_metered() {
            return Err(AggregatorError::Metered(entry.label().to_string()));
        }
        *entry.sources_mut() = vec![MeterSource::new(SINGLE_SOURCE_NAME, amount)];
        entry.recompute_total();
        Ok(())
    }

    /// Removes and returns the entry. Any summary computed from the previous
    /// state is stale after this.
    pub fn remove_utility(&mut self, utility_index: usize) -> Result<UtilityEntry, AggregatorError> {
        self.check_index(utility_index)?;
        let removed = self.utilities.remove(utility_index);
        tracing::debug!(utility = %removed.kind(), "Utility removed");
        Ok(removed)
    }

    pub fn calculate(&self) -> BillSummary {
        self.calculate_at(Utc::now())
    }

    pub fn calculate_at(&self, issue_time: DateTime<Utc>) -> BillSummary {
        calculate_bill(
            &self.month,
            &self.made_by,
            self.total_members,
            &self.utilities,
            issue_time,
        )
    }

    fn check_index(&self, utility_index: usize) -> Result<(), AggregatorError> {
        if utility_index >= self.utilities.len() {
            return Err(AggregatorError::UtilityIndexOutOfRange {
                index: utility_index,
                len: self.utilities.len(),
            });
        }
        Ok(())
    }

    fn entry_mut(&mut self, utility_index: usize) -> Result<&mut UtilityEntry, AggregatorError> {
        self.check_index(utility_index)?;
        Ok(&mut self.utilities[utility_index])
    }
}

/// Aggregates utility entries into a bill record: zero-cost utilities are
/// dropped from the breakdown, the total and per-person split are rounded to
/// two decimals and members below one count as one.
pub fn calculate_bill(
    month: &str,
    made_by: &str,
    total_members: i64,
    entries: &[UtilityEntry],
    issue_time: DateTime<Utc>,
) -> BillSummary {
    let members = coerce_members(total_members);
    let bill_details: Vec<BillDetail> = entries
        .iter()
        .filter(|entry| entry.total_amount() > Decimal::ZERO)
        .map(BillDetail::from)
        .collect();

    let total_bill = round_money(
        bill_details
            .iter()
            .fold(Decimal::ZERO, |total, d| total.saturating_add(d.total_amount)),
    );
    let bill_per_person = round_money(total_bill / Decimal::from(members));

    let warning = if total_bill.is_zero() {
        tracing::warn!(month = %month, utilities = entries.len(), "Calculated bill total is zero");
        Some(ZeroTotalWarning)
    } else {
        None
    };

    let month = if month.trim().is_empty() {
        current_month()
    } else {
        month.to_string()
    };

    tracing::info!(
        month = %month,
        members,
        total_bill = %total_bill,
        bill_per_person = %bill_per_person,
        details = bill_details.len(),
        "Bill calculated"
    );

    BillSummary {
        record: BillRecord {
            id: None,
            month,
            made_by: made_by.to_string(),
            total_members: members,
            total_bill,
            bill_per_person,
            issue_time,
            bill_details,
        },
        warning,
    }
}
