//! The result document: the frozen, localized, self-contained output
//! of one analysis run, prior to rendering.

pub mod builder;
pub mod format;

use serde::{Deserialize, Serialize};

use crate::plot::PlotRecipe;

pub use builder::build;
pub use format::FormatPolicy;

/// A rendered table: all strings localized, all numbers formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSection {
    pub title: String,
    /// First header cell is the row-label column and may be empty.
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Render the table transposed; some procedures read better that way.
    pub transposed: bool,
}

/// A figure: the declarative recipe with its labels already localized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSection {
    pub title: String,
    /// File-name-safe figure identifier within the document.
    pub figure_name: String,
    pub recipe: PlotRecipe,
    pub caption: String,
}

/// A localized prose paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProseSection {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Section {
    Table(TableSection),
    Figure(FigureSection),
    Prose(ProseSection),
}

/// Ordered sections of one run's output. Once built it carries no
/// references into the input frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

impl ResultDocument {
    pub fn tables(&self) -> impl Iterator<Item = &TableSection> {
        self.sections.iter().filter_map(|s| match s {
            Section::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn figures(&self) -> impl Iterator<Item = &FigureSection> {
        self.sections.iter().filter_map(|s| match s {
            Section::Figure(f) => Some(f),
            _ => None,
        })
    }
}
