//! Terminal output: toasts on stderr, tables and JSON on stdout.

use megui_core::{Notification, Notifier, Record, Severity};
use megui_crud::{ReferenceData, cell_text};
use megui_schema::{EntitySchema, FieldKind};

/// Prints every notification as one stderr line.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        eprintln!("{}", toast_line(&n));
    }
}

fn toast_line(n: &Notification) -> String {
    let tag = match n.severity {
        Severity::Success => "ok",
        Severity::Info => "info",
        Severity::Warning => "aviso",
        Severity::Error => "error",
    };
    if n.detail.is_empty() {
        format!("[{}] {}", tag, n.summary)
    } else {
        format!("[{}] {}: {}", tag, n.summary, n.detail)
    }
}

/// Columns shown in table output: every field except audit metadata.
pub fn columns(schema: &EntitySchema) -> Vec<&str> {
    schema
        .fields
        .iter()
        .filter(|f| f.kind != FieldKind::Audit)
        .map(|f| f.name.as_str())
        .collect()
}

/// Render rows as an aligned text table. Foreign keys show their labels.
pub fn render_table(schema: &EntitySchema, refs: &ReferenceData, rows: &[Record]) -> String {
    let cols = columns(schema);
    let header: Vec<String> = cols.iter().map(|c| c.to_uppercase()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| cols.iter().map(|c| cell_text(schema, refs, c, r)).collect())
        .collect();

    let widths: Vec<usize> = (0..cols.len())
        .map(|i| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(header.as_slice())];
    out.extend(cells.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}

/// One record as `LABEL: value` lines.
pub fn render_record(schema: &EntitySchema, refs: &ReferenceData, record: &Record) -> String {
    let width = schema.fields.iter().map(|f| f.label.chars().count()).max().unwrap_or(0);
    schema
        .fields
        .iter()
        .map(|f| {
            format!(
                "{:<width$}  {}",
                f.label,
                cell_text(schema, refs, &f.name, record),
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
