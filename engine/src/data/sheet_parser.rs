use csv::{ReaderBuilder, StringRecord, Trim};
use shared::{BillForm, UtilityKind};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{EngineError, Result};

pub const UTILITY_HEADER: &str = "Utility";
pub const METER_HEADER: &str = "Meter";
pub const AMOUNT_HEADER: &str = "Amount";

/// Reads bill sheets: one row per meter reading, applied to a calculator form.
///
/// ```text
/// Utility;Meter;Amount
/// Electric Bill;Meter 1;100
/// Electric Bill;Meter 2;50
/// Water Bill;Total;30
/// ```
///
/// Repeated electric rows become successive meters, named `Meter 1`,
/// `Meter 2`, ... in row order. The meter column is not used for naming; a
/// label that differs from the positional name is logged and replaced.
pub struct BillSheetParser;

impl BillSheetParser {
    pub fn load_into_form(file_path: impl AsRef<Path>, delimiter: u8, form: &mut BillForm) -> Result<usize> {
        let file_path = file_path.as_ref();
        let file = File::open(file_path)?;
        tracing::info!(path = %file_path.display(), "Loading bill sheet");
        Self::read_into_form(BufReader::new(file), delimiter, form)
    }

    /// Applies every row or none: the form is only replaced once the whole
    /// sheet has been accepted. Returns the number of rows applied.
    pub fn read_into_form<R: Read>(reader: R, delimiter: u8, form: &mut BillForm) -> Result<usize> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        for required in [UTILITY_HEADER, AMOUNT_HEADER] {
            if Self::column(&headers, required).is_none() {
                return Err(EngineError::SheetFormatError(format!(
                    "missing '{}' column in header '{}'",
                    required,
                    headers.iter().collect::<Vec<_>>().join(",")
                )));
            }
        }

        let mut draft = form.clone();
        let mut applied = 0;
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;

            let utility_str = Self::get_field(&record, &headers, UTILITY_HEADER)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| EngineError::SheetFormatError(format!("Missing '{}' at line {}", UTILITY_HEADER, line)))?;
            let amount_str = Self::get_field(&record, &headers, AMOUNT_HEADER)
                .ok_or_else(|| EngineError::SheetFormatError(format!("Missing '{}' at line {}", AMOUNT_HEADER, line)))?;
            let meter_str = Self::get_field(&record, &headers, METER_HEADER).unwrap_or_default();

            let kind: UtilityKind = utility_str
                .parse()
                .map_err(|e| EngineError::SheetFormatError(format!("line {}: {}", line, e)))?;

            Self::apply_row(&mut draft, kind, amount_str)
                .map_err(|e| EngineError::SheetFormatError(format!("line {}: {}", line, e)))?;
            if kind.is_metered() && !meter_str.is_empty() {
                let assigned = draft
                    .position_of(kind)
                    .and_then(|idx| draft.utilities()[idx].sources().last())
                    .map(|source| source.meter_name.as_str())
                    .unwrap_or_default();
                if !assigned.eq_ignore_ascii_case(meter_str) {
                    tracing::warn!(line, sheet_meter = %meter_str, meter = %assigned, "Sheet meter label replaced by positional name");
                }
            }
            tracing::debug!(line, utility = %kind, meter = %meter_str, amount = %amount_str, "Sheet row applied");
            applied += 1;
        }

        *form = draft;
        tracing::info!(rows = applied, utilities = form.utilities().len(), "Bill sheet loaded");
        Ok(applied)
    }

    fn apply_row(form: &mut BillForm, kind: UtilityKind, amount: &str) -> std::result::Result<(), shared::AggregatorError> {
        match form.position_of(kind) {
            Some(idx) if kind.is_metered() => {
                let meters = form.utilities()[idx].sources().len() + 1;
                form.set_meter_count(idx, meters as i64)?;
                form.set_source_amount(idx, meters - 1, amount)
            }
            Some(_) => form.add_utility(kind.label()).map(|_| ()),
            None => {
                let idx = form.add_utility(kind.label())?;
                if kind.is_metered() {
                    form.set_source_amount(idx, 0, amount)
                } else {
                    form.set_single_amount(idx, amount)
                }
            }
        }
    }

    fn column(headers: &StringRecord, name: &str) -> Option<usize> {
        headers.iter().position(|header| header.eq_ignore_ascii_case(name))
    }

    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        Self::column(headers, name).and_then(|pos| record.get(pos))
    }
}
