//! Field interpretation: from a control in a page snapshot to a `FieldQuery`
//!
//! Everything here is synchronous and read-only. Element handles are borrowed
//! from the snapshot for the duration of one call and never stored.

pub(crate) mod dom;
mod options;
mod question;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::types::{FieldDescriptor, FieldKey, FieldKind, FieldQuery, ScannedField};
use question::Probe;

/// Element id of the helper panel; controls inside it never trigger guidance
pub const DEFAULT_PANEL_ID: &str = "gov-helper-panel";

const EXCLUDED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Turns form controls into questions and options
#[derive(Debug, Clone)]
pub struct Interpreter {
    panel_id: String,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_ID)
    }
}

impl Interpreter {
    pub fn new(panel_id: impl Into<String>) -> Self {
        Self {
            panel_id: panel_id.into(),
        }
    }

    /// Whether `el` lives in the helper panel's own subtree
    pub fn is_inside_panel(&self, el: ElementRef<'_>) -> bool {
        dom::attr(el, "id") == Some(self.panel_id.as_str())
            || dom::ancestors(el).any(|a| dom::attr(a, "id") == Some(self.panel_id.as_str()))
    }

    /// Classify an element; `None` when it is not an eligible form control
    pub fn describe<'a>(&self, el: ElementRef<'a>) -> Option<FieldDescriptor<'a>> {
        let kind = match dom::tag(el) {
            "select" => FieldKind::Select,
            "textarea" => FieldKind::Textarea,
            "input" => {
                let input_type = dom::input_type(el);
                if EXCLUDED_INPUT_TYPES.contains(&input_type.as_str()) {
                    return None;
                }
                match input_type.as_str() {
                    "radio" => FieldKind::RadioGroup,
                    "checkbox" => FieldKind::Checkbox,
                    "date" | "datetime-local" | "month" => FieldKind::Date,
                    _ => FieldKind::Text,
                }
            }
            _ => return None,
        };

        if self.is_inside_panel(el) {
            return None;
        }

        let group_key = if kind == FieldKind::RadioGroup {
            dom::attr_nonempty(el, "name")
        } else {
            None
        };

        Some(FieldDescriptor {
            handle: el,
            kind,
            group_key,
        })
    }

    /// Map an event target to the control it stands for.
    ///
    /// Labels (and elements inside labels) resolve to their bound control,
    /// eligible controls resolve to themselves.
    pub fn resolve_target<'a>(&self, html: &'a Html, target: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if self.describe(target).is_some() {
            return Some(target);
        }
        if self.is_inside_panel(target) {
            return None;
        }

        let label = dom::closest(target, "label")?;
        let bound = match dom::attr_nonempty(label, "for") {
            Some(id) => html
                .select(&dom::CONTROLS)
                .find(|c| dom::attr(*c, "id").map(str::trim) == Some(id)),
            None => label.select(&dom::CONTROLS).next(),
        };

        bound.filter(|control| self.describe(*control).is_some())
    }

    /// Field identity used to match guidance responses to the active field
    pub fn field_key(&self, field: &FieldDescriptor<'_>) -> FieldKey {
        match field.group_key {
            Some(name) => FieldKey(format!("radio-group:{}", name)),
            None => FieldKey(dom::structural_path(field.handle)),
        }
    }

    /// Interpret one control.
    ///
    /// Returns `None` for ineligible elements. An eligible control whose
    /// question cannot be reconstructed yields a query with an empty question,
    /// which callers treat as "do nothing".
    pub fn interpret(&self, html: &Html, control: ElementRef<'_>) -> Option<FieldQuery> {
        let field = self.describe(control)?;
        Some(self.interpret_field(html, &field))
    }

    pub fn interpret_field(&self, html: &Html, field: &FieldDescriptor<'_>) -> FieldQuery {
        let options = options::extract_options(html, field.handle, field.kind, field.group_key);

        let group = if field.kind == FieldKind::RadioGroup {
            options::radio_group_members(html, field.handle, field.group_key)
        } else {
            vec![field.handle]
        };

        // Every member of a radio group asks the same question, so the chain
        // always starts from the first member in document order
        let anchor = group.first().copied().unwrap_or(field.handle);

        let probe = Probe {
            html,
            control: anchor,
            kind: field.kind,
            group,
            option_labels: options.iter().map(|o| o.label.clone()).collect(),
        };

        let question = question::extract_question(&probe);
        if question.is_empty() {
            debug!("Skipping uninterpretable {} field", field.kind);
            return FieldQuery {
                question,
                kind: field.kind,
                options: Vec::new(),
            };
        }

        debug!(
            "Interpreted {} field '{}' with {} options",
            field.kind,
            question,
            options.len()
        );

        FieldQuery {
            question,
            kind: field.kind,
            options,
        }
    }

    /// Interpret every eligible control on the page, in document order.
    ///
    /// Radio groups are reported once, at their first member. Controls
    /// without a recoverable question are left out.
    pub fn scan(&self, html: &Html) -> Vec<ScannedField> {
        let mut seen_groups: Vec<String> = Vec::new();
        let mut fields = Vec::new();

        for control in html.select(&dom::CONTROLS) {
            let Some(field) = self.describe(control) else {
                continue;
            };

            if let Some(name) = field.group_key {
                if seen_groups.iter().any(|g| g == name) {
                    continue;
                }
                seen_groups.push(name.to_string());
            }

            let query = self.interpret_field(html, &field);
            if query.is_empty() {
                continue;
            }

            fields.push(ScannedField {
                key: self.field_key(&field),
                query,
            });
        }

        debug!("Scanned {} interpretable fields", fields.len());
        fields
    }
}

#[cfg(test)]
#[path = "../interpreter_test.rs"]
mod interpreter_test;
