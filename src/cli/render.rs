//! Plain-text rendering of summaries for the terminal

use ccdaily::services::normalizer::{join_short_names, model_family};
use ccdaily::services::RefreshReport;
use ccdaily::types::{DailySummary, PeriodTotals};
use std::fmt::Write;

/// Dollar amount rounded to cents, e.g. `$0.05`.
pub fn format_cost(cost: f64) -> String {
    format!("${:.2}", cost)
}

/// Integer with `,` thousands separators.
pub fn format_tokens(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Table cell: `-` for zero, grouped digits otherwise.
fn token_cell(n: u64) -> String {
    if n == 0 {
        "-".to_string()
    } else {
        format_tokens(n)
    }
}

/// Detail view of one day.
pub fn render_day(summary: &DailySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Date:                {}", summary.date);
    let _ = writeln!(out, "Total Cost:          {}", format_cost(summary.total_cost_usd));
    let _ = writeln!(out, "Input Tokens:        {}", format_tokens(summary.total_input_tokens));
    let _ = writeln!(out, "Output Tokens:       {}", format_tokens(summary.total_output_tokens));
    let _ = writeln!(out, "Cache Create Tokens: {}", format_tokens(summary.total_cache_creation_tokens));
    let _ = writeln!(out, "Cache Read Tokens:   {}", format_tokens(summary.total_cache_read_tokens));
    let _ = writeln!(out, "Total Tokens:        {}", format_tokens(summary.total_tokens));

    if summary.models.is_empty() {
        let _ = writeln!(out, "Models:              -");
    } else {
        let _ = writeln!(out, "Models:");
        for model in &summary.models {
            let _ = writeln!(out, "  {} ({})", model_family(model), model);
        }
    }
    out
}

/// One row per day plus a total row.
pub fn render_table(summaries: &[DailySummary]) -> String {
    const HEADER: [&str; 8] = [
        "Date",
        "Models",
        "Input",
        "Output",
        "Cache Create",
        "Cache Read",
        "Total Tokens",
        "Cost",
    ];

    let mut rows: Vec<[String; 8]> = summaries
        .iter()
        .map(|s| {
            [
                s.date.to_string(),
                join_short_names(&s.models),
                token_cell(s.total_input_tokens),
                token_cell(s.total_output_tokens),
                token_cell(s.total_cache_creation_tokens),
                token_cell(s.total_cache_read_tokens),
                token_cell(s.total_tokens),
                format_cost(s.total_cost_usd),
            ]
        })
        .collect();

    let totals = PeriodTotals::from_daily_summaries(summaries);
    rows.push([
        "Total".to_string(),
        String::new(),
        format_tokens(totals.total_input_tokens),
        format_tokens(totals.total_output_tokens),
        format_tokens(totals.total_cache_creation_tokens),
        format_tokens(totals.total_cache_read_tokens),
        format_tokens(totals.total_tokens),
        format_cost(totals.total_cost_usd),
    ]);

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize; 8]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            // Date and models left-aligned, numbers right-aligned
            if i < 2 {
                format!("{:<w$}", cell, w = *w)
            } else {
                format!("{:>w$}", cell, w = *w)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Status line for one scheduler refresh.
pub fn render_report(report: &RefreshReport) -> String {
    match &report.result {
        Ok(snapshot) => {
            let week = PeriodTotals::from_daily_summaries(&snapshot.recent);
            format!(
                "[{}] today {} ({} tokens) | last {} days {}",
                snapshot.generated_at.format("%H:%M:%S"),
                format_cost(snapshot.today.total_cost_usd),
                format_tokens(snapshot.today.total_tokens),
                snapshot.recent.len(),
                format_cost(week.total_cost_usd),
            )
        }
        Err(e) => format!("$-- ({})", e),
    }
}
