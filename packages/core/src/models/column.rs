//! Column Descriptors and Cell Behaviors
//!
//! Each column pairs a renderer with an editor. The pair is chosen from a
//! closed behavior table: adding a `FieldType` variant without extending
//! `ColumnBehavior::cell_behaviors` is a compile error.
//!
//! | kind      | render                         | edit                         |
//! |-----------|--------------------------------|------------------------------|
//! | text      | plain value                    | inline text                  |
//! | longtext  | plain value                    | multi-line popup             |
//! | reference | resolved target title (async)  | choice list of category docs |
//! | select    | pill, omitted if empty         | fixed choice list            |
//! | url       | hyperlink, new context         | inline text                  |
//! | color     | swatch + raw value             | inline text                  |
//! | number    | right-aligned, monospaced      | integer input                |
//! | date      | raw value                      | date picker, `[[value]]`     |
//! | image     | inline thumbnail               | inline text (URL)            |
//! | default   | plain value                    | inline text                  |

use crate::models::{FieldType, RowTarget};
use crate::utils::tokens;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the grid pins a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    Left,
    Right,
}

/// Behavior a column was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "camelCase")]
pub enum ColumnBehavior {
    /// The derived title column: pinned, fixed width, expandable detail
    Title,

    /// Any schema-typed (or default) column
    Typed { field_type: FieldType },
}

impl ColumnBehavior {
    /// Renderer and editor for this behavior.
    pub fn cell_behaviors(&self) -> (CellRenderer, CellEditor) {
        match self {
            ColumnBehavior::Title => (CellRenderer::Title, CellEditor::InlineText),
            ColumnBehavior::Typed { field_type } => match field_type {
                FieldType::Text => (CellRenderer::Plain, CellEditor::InlineText),
                FieldType::LongText => (CellRenderer::Plain, CellEditor::MultilineText),
                FieldType::Reference { target_category } => (
                    CellRenderer::ReferenceTitle,
                    CellEditor::ReferenceChoice {
                        target_category: target_category.clone(),
                    },
                ),
                FieldType::Select { options } => (
                    CellRenderer::Pill,
                    CellEditor::Choice {
                        options: options.clone(),
                    },
                ),
                FieldType::Url => (CellRenderer::Link, CellEditor::InlineText),
                FieldType::Color => (CellRenderer::ColorSwatch, CellEditor::InlineText),
                FieldType::Number => (CellRenderer::Numeric, CellEditor::NumericInput),
                FieldType::Date => (CellRenderer::Date, CellEditor::DatePicker),
                FieldType::Image => (CellRenderer::Thumbnail, CellEditor::InlineText),
                FieldType::Default => (CellRenderer::Plain, CellEditor::InlineText),
            },
        }
    }
}

/// How a cell value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellRenderer {
    Title,
    Plain,
    ReferenceTitle,
    Pill,
    Link,
    ColorSwatch,
    Numeric,
    Date,
    Thumbnail,
}

/// Display model of one cell, consumed by the grid adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderedCell {
    /// Nothing to show
    Empty,
    Text { text: String },
    /// Title cell with the detail-expansion affordance
    Title { text: String, expandable: bool },
    Pill { text: String },
    /// Hyperlink; `new_context` asks the grid to open it outside the table
    #[serde(rename_all = "camelCase")]
    Link {
        href: String,
        text: String,
        new_context: bool,
    },
    Swatch { color: String, text: String },
    /// Right-aligned, monospaced
    Numeric { text: String },
    Thumbnail { src: String },
    /// Reference still to be resolved to its target's title
    Reference { id: String },
}

impl CellRenderer {
    /// Display model for a raw cell value.
    ///
    /// Reference cells come back as `RenderedCell::Reference` and need the
    /// reference resolver to finish; malformed tokens render empty.
    pub fn render(&self, value: Option<&Value>) -> RenderedCell {
        let text = value.map(tokens::format_property_value).unwrap_or_default();
        if text.is_empty() {
            return match self {
                CellRenderer::Title => RenderedCell::Title {
                    text,
                    expandable: true,
                },
                _ => RenderedCell::Empty,
            };
        }

        match self {
            CellRenderer::Title => RenderedCell::Title {
                text,
                expandable: true,
            },
            CellRenderer::Plain | CellRenderer::Date => RenderedCell::Text { text },
            CellRenderer::ReferenceTitle => match tokens::parse_reference(&text) {
                Some(id) => RenderedCell::Reference { id },
                None => RenderedCell::Empty,
            },
            CellRenderer::Pill => RenderedCell::Pill { text },
            CellRenderer::Link => RenderedCell::Link {
                href: text.clone(),
                text,
                new_context: true,
            },
            CellRenderer::ColorSwatch => RenderedCell::Swatch {
                color: text.clone(),
                text,
            },
            CellRenderer::Numeric => RenderedCell::Numeric { text },
            CellRenderer::Thumbnail => RenderedCell::Thumbnail { src: text },
        }
    }
}

/// How a cell value is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellEditor {
    InlineText,
    /// Multi-line text in a popup
    MultilineText,
    #[serde(rename_all = "camelCase")]
    ReferenceChoice { target_category: Option<String> },
    Choice { options: Vec<String> },
    /// Integer input
    NumericInput,
    /// Date picker storing `[[yyyy-mm-dd]]`
    DatePicker,
}

/// Everything the grid needs to know about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub field: String,
    pub header_name: String,
    pub hidden: bool,
    /// Not editable on rows backed by a document (staging row is always editable)
    pub read_only_when_bound: bool,
    pub behavior: ColumnBehavior,
    pub renderer: CellRenderer,
    pub editor: CellEditor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<PinSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl ColumnDescriptor {
    /// Build a descriptor; renderer and editor follow from `behavior`.
    pub fn new(field: impl Into<String>, behavior: ColumnBehavior) -> Self {
        let field = field.into();
        let (renderer, editor) = behavior.cell_behaviors();
        Self {
            header_name: field.clone(),
            field,
            hidden: false,
            read_only_when_bound: false,
            behavior,
            renderer,
            editor,
            pinned: None,
            width: None,
        }
    }

    /// Editability predicate for a row.
    pub fn is_editable(&self, target: &RowTarget) -> bool {
        match target {
            RowTarget::Staging => true,
            RowTarget::Bound { .. } => !self.read_only_when_bound,
        }
    }
}
