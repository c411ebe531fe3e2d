//! Field Type Declarations
//!
//! A category's configuration record declares column types through
//! properties named `field.<name>`. The value is a small declaration string:
//!
//! ```text
//! select(Open;Closed;Blocked)
//! reference(Person)
//! number
//! ```
//!
//! The text before the first `(` (or first whitespace) is the kind; an
//! optional parenthesized, `;`-delimited list supplies arguments.
//!
//! `FieldTypeDeclaration` keeps the parsed kind and raw argument list;
//! `FieldType` is the closed, typed view column building matches on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every declarable column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    LongText,
    Reference,
    Select,
    Url,
    Color,
    Number,
    Date,
    Image,
    Default,
}

impl FieldKind {
    /// Parse a kind keyword. `ref` is accepted for `reference`.
    ///
    /// Returns `None` for unknown keywords.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword.trim().to_lowercase().as_str() {
            "text" => FieldKind::Text,
            "longtext" => FieldKind::LongText,
            "reference" | "ref" => FieldKind::Reference,
            "select" => FieldKind::Select,
            "url" => FieldKind::Url,
            "color" => FieldKind::Color,
            "number" => FieldKind::Number,
            "date" => FieldKind::Date,
            "image" => FieldKind::Image,
            "default" => FieldKind::Default,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::LongText => "longtext",
            FieldKind::Reference => "reference",
            FieldKind::Select => "select",
            FieldKind::Url => "url",
            FieldKind::Color => "color",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Image => "image",
            FieldKind::Default => "default",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `field.<name>` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeDeclaration {
    pub kind: FieldKind,
    pub arguments: Vec<String>,
}

impl FieldTypeDeclaration {
    pub fn new(kind: FieldKind, arguments: Vec<String>) -> Self {
        Self { kind, arguments }
    }

    /// Parse a declaration string.
    ///
    /// Unknown kinds degrade to `default` so a typo in configuration never
    /// takes the table down. Empty arguments are dropped.
    ///
    /// ```
    /// use docgrid_core::models::{FieldKind, FieldTypeDeclaration};
    ///
    /// let decl = FieldTypeDeclaration::parse("select(Open;Closed;Blocked)");
    /// assert_eq!(decl.kind, FieldKind::Select);
    /// assert_eq!(decl.arguments, vec!["Open", "Closed", "Blocked"]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (head, rest) = match raw.find('(') {
            Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
            None => (raw, None),
        };
        let keyword = head.split_whitespace().next().unwrap_or_default();

        let kind = FieldKind::from_keyword(keyword).unwrap_or_else(|| {
            tracing::debug!("Unknown field kind '{}', using default", keyword);
            FieldKind::Default
        });

        let arguments = rest
            .map(|rest| {
                let inner = rest.split(')').next().unwrap_or_default();
                inner
                    .split(';')
                    .map(str::trim)
                    .filter(|arg| !arg.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { kind, arguments }
    }

    /// Typed view of this declaration.
    pub fn field_type(&self) -> FieldType {
        match self.kind {
            FieldKind::Text => FieldType::Text,
            FieldKind::LongText => FieldType::LongText,
            FieldKind::Reference => FieldType::Reference {
                target_category: self.arguments.first().cloned(),
            },
            FieldKind::Select => FieldType::Select {
                options: self.arguments.clone(),
            },
            FieldKind::Url => FieldType::Url,
            FieldKind::Color => FieldType::Color,
            FieldKind::Number => FieldType::Number,
            FieldKind::Date => FieldType::Date,
            FieldKind::Image => FieldType::Image,
            FieldKind::Default => FieldType::Default,
        }
    }
}

/// Closed union over column kinds, each carrying its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldType {
    Text,
    LongText,
    Reference {
        #[serde(rename = "targetCategory")]
        target_category: Option<String>,
    },
    Select {
        options: Vec<String>,
    },
    Url,
    Color,
    Number,
    Date,
    Image,
    Default,
}

/// Per-category field name -> declaration mapping.
pub type FieldSchema = BTreeMap<String, FieldTypeDeclaration>;
