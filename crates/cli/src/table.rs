// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal fixed-width text table renderer for `fm list`/`fm show` output.
//!
//! Grounded on the usage shape seen throughout the teacher's command
//! handlers (`Column::muted`/`Column::left(...).with_max(...)`, `Table::new`,
//! `table.row(...)`, `table.render(out)`) — columns carry their own color
//! and truncation policy so a handler only supplies header names and rows.

use std::io::Write;

#[derive(Clone, Copy, PartialEq)]
enum Style {
    Plain,
    Muted,
    Status,
}

pub struct Column {
    header: &'static str,
    style: Style,
    max: Option<usize>,
}

impl Column {
    pub fn left(header: &'static str) -> Self {
        Self { header, style: Style::Plain, max: None }
    }

    pub fn muted(header: &'static str) -> Self {
        Self { header, style: Style::Muted, max: None }
    }

    pub fn status(header: &'static str) -> Self {
        Self { header, style: Style::Status, max: None }
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row(&mut self, values: Vec<String>) {
        self.rows.push(values);
    }

    pub fn render(&self, out: &mut dyn Write) {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.header.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let truncated = truncate(cell, self.columns.get(i).and_then(|c| c.max));
                widths[i] = widths[i].max(truncated.len());
            }
        }

        let header_line: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c.header, width = widths[i]))
            .collect();
        let _ = writeln!(out, "{}", crate::color::header(&header_line.join("  ").trim_end()));

        for row in &self.rows {
            let mut cells = Vec::with_capacity(row.len());
            for (i, cell) in row.iter().enumerate() {
                let column = &self.columns[i];
                let truncated = truncate(cell, column.max);
                let padded = format!("{:<width$}", truncated, width = widths[i]);
                cells.push(match column.style {
                    Style::Plain => padded,
                    Style::Muted => crate::color::muted(&padded),
                    Style::Status => crate::color::literal(&padded),
                });
            }
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
    }
}

fn truncate(s: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if s.len() > max && max > 1 => format!("{}…", &s[..max - 1]),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_rows() {
        let mut table = Table::new(vec![Column::muted("ID"), Column::left("NAME")]);
        table.row(vec!["hst-abc".into(), "box".into()]);
        let mut buf = Vec::new();
        table.render(&mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ID"));
        assert!(text.contains("hst-abc"));
    }

    #[test]
    fn truncates_long_cells() {
        let mut table = Table::new(vec![Column::left("NAME").with_max(5)]);
        table.row(vec!["averylongname".into()]);
        let mut buf = Vec::new();
        table.render(&mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().trim().starts_with("aver"));
    }
}
