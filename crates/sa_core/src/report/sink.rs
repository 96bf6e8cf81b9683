//! Document sinks: the outer-format collaborators.
//!
//! A sink turns a finished result document into one text artifact. It
//! never localizes and never formats numbers; by the time a document
//! reaches a sink every cell is already a final string.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::result::{ResultDocument, Section, TableSection};

/// Renders a result document to one output format.
pub trait DocumentSink: Send + Sync {
    /// File extension of the artifact, without the dot.
    fn extension(&self) -> &'static str;

    /// Renders the document. `images` maps each figure name to the
    /// relative path of its already-rendered image file.
    fn render(
        &self,
        document: &ResultDocument,
        images: &BTreeMap<String, String>,
    ) -> Result<String>;
}

/// The shipped Markdown sink.
pub struct MarkdownSink;

impl DocumentSink for MarkdownSink {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(
        &self,
        document: &ResultDocument,
        images: &BTreeMap<String, String>,
    ) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!("# {}\n", document.title));
        for section in &document.sections {
            out.push('\n');
            match section {
                Section::Table(table) => {
                    out.push_str(&format!("## {}\n\n", table.title));
                    out.push_str(&markdown_table(table));
                }
                Section::Figure(figure) => {
                    out.push_str(&format!("## {}\n\n", figure.title));
                    match images.get(&figure.figure_name) {
                        Some(path) => {
                            out.push_str(&format!("![{}]({})\n", figure.caption, path));
                        }
                        // Plot-less assembly still yields a complete document.
                        None => out.push_str(&format!("*{}*\n", figure.caption)),
                    }
                }
                Section::Prose(prose) => {
                    out.push_str(&format!("## {}\n\n{}\n", prose.title, prose.text));
                }
            }
        }
        Ok(out)
    }
}

fn markdown_table(table: &TableSection) -> String {
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows.len() + 1);
    grid.push(table.header.clone());
    grid.extend(table.rows.iter().cloned());
    if table.transposed {
        grid = transpose(&grid);
    }
    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        out.push_str("| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |\n");
        if i == 0 {
            out.push('|');
            for _ in row {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }
    out
}

fn transpose(grid: &[Vec<String>]) -> Vec<Vec<String>> {
    let cols = grid.first().map(|r| r.len()).unwrap_or(0);
    (0..cols)
        .map(|c| grid.iter().map(|row| row[c].clone()).collect())
        .collect()
}
