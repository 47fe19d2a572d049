use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// Kind of form control under inspection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Single-line text input (and every other typed input without options)
    Text,
    /// Multi-line text area
    Textarea,
    /// Drop-down `select`
    Select,
    /// Radio inputs sharing one `name`
    RadioGroup,
    /// Single checkbox, always treated as a yes/no choice
    Checkbox,
    /// Date-like input (`date`, `datetime-local`, `month`)
    Date,
}

impl FieldKind {
    /// Wire name sent to the guidance backend as `field_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::RadioGroup => "radio-group",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
        }
    }

    /// Whether the control has a finite set of answers that can be read from markup
    pub fn is_enumerable(&self) -> bool {
        matches!(
            self,
            FieldKind::Select | FieldKind::RadioGroup | FieldKind::Checkbox
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a field across one interaction cycle.
///
/// Derived from the control's structural position (or its radio group name),
/// so it can be compared after the snapshot borrow has ended.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey(pub String);

impl FieldKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A form control borrowed from a page snapshot.
///
/// The handle lives only as long as the snapshot borrow; nothing outside a
/// single extraction call holds on to it.
#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor<'a> {
    /// The underlying control element
    pub handle: ElementRef<'a>,
    /// Control kind
    pub kind: FieldKind,
    /// Shared `name` for radio groups
    pub group_key: Option<&'a str>,
}

/// One selectable choice of an enumerable control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCandidate {
    /// Cleaned display text
    pub label: String,
    /// Underlying machine value
    pub value: String,
    /// Control state at extraction time
    pub is_currently_selected: bool,
}

impl OptionCandidate {
    pub fn new(label: impl Into<String>, value: impl Into<String>, selected: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            is_currently_selected: selected,
        }
    }
}

/// What the interpreter made of a control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldQuery {
    /// Human-readable question; empty means the field is skipped
    pub question: String,
    pub kind: FieldKind,
    /// Ordered choices; empty for free-text fields
    pub options: Vec<OptionCandidate>,
}

impl FieldQuery {
    /// A query the caller should silently ignore
    pub fn is_empty(&self) -> bool {
        self.question.is_empty()
    }

    /// Option labels joined the way the backend expects `field_options`
    pub fn joined_option_labels(&self) -> String {
        self.options
            .iter()
            .map(|o| o.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A field found while scanning a whole page
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScannedField {
    /// Field identity within the snapshot
    pub key: FieldKey,
    /// Interpretation result
    #[serde(flatten)]
    pub query: FieldQuery,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
