// Text rendering for summaries and the bill history dashboard.
use shared::utils::format_amount;
use shared::{BillRecord, BillSummary, UtilityKind};
use std::fmt::Write;

pub fn render_utilities(kinds: &[UtilityKind]) -> String {
    let mut out = String::new();
    for kind in kinds {
        let meters = if kind.is_metered() { "  (per meter)" } else { "" };
        let _ = writeln!(out, "{:<14} {}{}", kind.label(), kind.key(), meters);
    }
    out
}

fn render_breakdown(out: &mut String, record: &BillRecord) {
    if record.bill_details.is_empty() {
        let _ = writeln!(out, "  No utilities with costs to display.");
        return;
    }
    for detail in &record.bill_details {
        let _ = writeln!(out, "  {:<28} {:>12}", detail.utility, format_amount(detail.total_amount));
        for source in &detail.sources {
            let _ = writeln!(out, "    • {:<24} {:>12}", source.meter_name, format_amount(source.amount));
        }
    }
}

fn render_totals(out: &mut String, record: &BillRecord) {
    let _ = writeln!(out, "  {:<28} {:>12}", "Total Bill:", format_amount(record.total_bill));
    let _ = writeln!(out, "  {:<28} {:>12}", "Bill per Person:", format_amount(record.bill_per_person));
}

pub fn render_summary(summary: &BillSummary) -> String {
    let record = &summary.record;
    let mut out = String::new();
    let _ = writeln!(out, "Bill Summary");
    let _ = writeln!(out, "  Month:          {}", record.month);
    let _ = writeln!(out, "  Calculated By:  {}", record.made_by);
    let _ = writeln!(out, "  Total Members:  {}", record.total_members);
    let _ = writeln!(out, "  Issued:         {}", record.issue_time.to_rfc3339());
    let _ = writeln!(out, "Utilities Breakdown");
    render_breakdown(&mut out, record);
    render_totals(&mut out, record);
    if let Some(warning) = summary.warning {
        let _ = writeln!(out, "Warning: {}", warning);
    }
    out
}

pub fn render_bill(record: &BillRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bill {}", record.id.as_deref().unwrap_or("(unsaved)"));
    let _ = writeln!(
        out,
        "  {} by {} for {} members, issued {}",
        record.month,
        record.made_by,
        record.total_members,
        record.issue_time.to_rfc3339()
    );
    render_breakdown(&mut out, record);
    render_totals(&mut out, record);
    out
}

pub fn render_history(bills: &[BillRecord]) -> String {
    if bills.is_empty() {
        return "No Bills Yet. Calculate a bill and save it to see it here.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<26} {:<8} {:>12} {:>12} {:<16} {}",
        "ID", "MONTH", "TOTAL", "PER PERSON", "MADE BY", "ISSUED"
    );
    for bill in bills {
        let _ = writeln!(
            out,
            "{:<26} {:<8} {:>12} {:>12} {:<16} {}",
            bill.id.as_deref().unwrap_or("-"),
            bill.month,
            format_amount(bill.total_bill),
            format_amount(bill.bill_per_person),
            bill.made_by,
            bill.issue_time.format("%Y-%m-%d %H:%M")
        );
    }
    out
}
