// Calculator session: the form being edited, the last computed summary and
// saving that summary through a bill store.
use shared::{BillForm, BillRecord, BillSummary, UtilityEntry};

use crate::error::{EngineError, Result};
use crate::services::bill_store::BillStore;

/// Owns one editing session. Every mutation and `save` needs `&mut self`, so a
/// second save cannot start while one is still awaiting the store.
#[derive(Debug, Clone, Default)]
pub struct CalculatorSession {
    form: BillForm,
    summary: Option<BillSummary>,
}

impl CalculatorSession {
    pub fn new(form: BillForm) -> Self {
        Self { form, summary: None }
    }

    pub fn form(&self) -> &BillForm {
        &self.form
    }

    /// Direct access for the header fields (month, author, members).
    pub fn form_mut(&mut self) -> &mut BillForm {
        &mut self.form
    }

    pub fn summary(&self) -> Option<&BillSummary> {
        self.summary.as_ref()
    }

    pub fn add_utility(&mut self, label: &str) -> Result<usize> {
        Ok(self.form.add_utility(label)?)
    }

    pub fn set_meter_count(&mut self, utility_index: usize, count: i64) -> Result<()> {
        Ok(self.form.set_meter_count(utility_index, count)?)
    }

    pub fn set_source_amount(&mut self, utility_index: usize, source_index: usize, raw_value: &str) -> Result<()> {
        Ok(self.form.set_source_amount(utility_index, source_index, raw_value)?)
    }

    pub fn set_single_amount(&mut self, utility_index: usize, raw_value: &str) -> Result<()> {
        Ok(self.form.set_single_amount(utility_index, raw_value)?)
    }

    /// Removing a utility invalidates the summary computed before it.
    pub fn remove_utility(&mut self, utility_index: usize) -> Result<UtilityEntry> {
        let removed = self.form.remove_utility(utility_index)?;
        if self.summary.take().is_some() {
            tracing::debug!(utility = %removed.kind(), "Summary cleared after utility removal");
        }
        Ok(removed)
    }

    /// Recomputes the summary from the form. A zero total is reported on the
    /// summary's `warning`.
    pub fn calculate(&mut self) -> &BillSummary {
        self.summary.insert(self.form.calculate())
    }

    pub fn clear_summary(&mut self) {
        self.summary = None;
    }

    /// Sends the current summary to the store. On success the summary is
    /// cleared; on failure it is kept so the save can be retried.
    pub async fn save(&mut self, store: &dyn BillStore) -> Result<BillRecord> {
        let summary = self.summary.as_ref().ok_or(EngineError::NoSummary)?;
        tracing::info!(month = %summary.record.month, total_bill = %summary.record.total_bill, "Saving bill summary");
        match store.create(&summary.record).await {
            Ok(stored) => {
                self.summary = None;
                Ok(stored)
            }
            Err(e) => {
                tracing::error!(error = %e, "Saving bill failed; summary kept for retry");
                Err(e)
            }
        }
    }
}
