//! CSV rendering for the full-view export.
//!
//! Empty string for nulls, ISO dates, and double-quote escaping only when
//! a field contains a comma, quote or newline.

use crate::api::{FullViewRow, FULL_VIEW_COLUMNS};

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render full-view rows as a CSV document, header first.
pub fn render_full_view(rows: &[FullViewRow]) -> String {
    let mut out = String::new();
    out.push_str(&FULL_VIEW_COLUMNS.join(","));
    out.push('\n');

    for row in rows {
        let fields = [
            escape(&row.forecast_name),
            row.date.format("%Y-%m-%d").to_string(),
            number(row.value),
            escape(row.model_name.as_deref().unwrap_or("")),
            number(row.fv),
            number(row.fv_mape),
            number(row.fv_mean_mape),
            number(row.fv_mean_mape_c),
            number(row.ci85_low),
            number(row.ci85_high),
            number(row.ci90_low),
            number(row.ci90_high),
            number(row.ci95_low),
            number(row.ci95_high),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}
