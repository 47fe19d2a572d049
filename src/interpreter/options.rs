//! Option enumeration for selects, radio groups and checkboxes

use scraper::{ElementRef, Html, Node};

use super::dom::{self, INPUTS, OPTIONS};
use crate::text::{OPTION_CAP, clean_label, is_placeholder_choice};
use crate::types::{FieldKind, OptionCandidate};

/// Enumerate the choices of a control; empty for free-text kinds
pub(crate) fn extract_options(
    html: &Html,
    control: ElementRef<'_>,
    kind: FieldKind,
    group_key: Option<&str>,
) -> Vec<OptionCandidate> {
    match kind {
        FieldKind::Select => select_options(control),
        FieldKind::RadioGroup => {
            let members = radio_group_members(html, control, group_key);
            radio_options(html, &members)
        }
        FieldKind::Checkbox => checkbox_options(control),
        FieldKind::Text | FieldKind::Textarea | FieldKind::Date => Vec::new(),
    }
}

fn select_options(select: ElementRef<'_>) -> Vec<OptionCandidate> {
    select
        .select(&OPTIONS)
        .filter_map(|option| {
            let mut text = clean_label(&option.text().collect::<String>(), OPTION_CAP);
            if text.is_empty() {
                text = dom::attr(option, "label")
                    .map(|l| clean_label(l, OPTION_CAP))
                    .unwrap_or_default();
            }
            // Without a value attribute the option submits its text
            let value = match dom::attr(option, "value") {
                Some(v) => v.trim().to_string(),
                None => text.clone(),
            };

            if text.is_empty() || is_placeholder_choice(&text, &value) {
                return None;
            }

            Some(OptionCandidate::new(
                text,
                value,
                dom::attr(option, "selected").is_some(),
            ))
        })
        .collect()
}

fn checkbox_options(checkbox: ElementRef<'_>) -> Vec<OptionCandidate> {
    let checked = dom::attr(checkbox, "checked").is_some();
    vec![
        OptionCandidate::new("Yes", "yes", checked),
        OptionCandidate::new("No", "no", !checked),
    ]
}

/// Every radio input in the document sharing the control's `name`, in
/// document order. A radio without a name is a group of one.
pub(crate) fn radio_group_members<'a>(
    html: &'a Html,
    control: ElementRef<'a>,
    group_key: Option<&str>,
) -> Vec<ElementRef<'a>> {
    let Some(name) = group_key else {
        return vec![control];
    };

    html.select(&INPUTS)
        .filter(|input| dom::is_radio(*input) && dom::attr(*input, "name") == Some(name))
        .collect()
}

fn radio_options(html: &Html, members: &[ElementRef<'_>]) -> Vec<OptionCandidate> {
    members
        .iter()
        .filter_map(|radio| {
            let label = radio_label(html, *radio, members);
            if label.is_empty() {
                return None;
            }
            let value = dom::attr(*radio, "value").unwrap_or("on").trim().to_string();
            Some(OptionCandidate::new(
                label,
                value,
                dom::attr(*radio, "checked").is_some(),
            ))
        })
        .collect()
}

/// Display text for one radio button: associated label, wrapping label,
/// following text or inline element, then the raw value.
pub(crate) fn radio_label(html: &Html, radio: ElementRef<'_>, members: &[ElementRef<'_>]) -> String {
    if let Some(id) = dom::attr_nonempty(radio, "id") {
        for label in dom::labels_for(html, id) {
            let text = clean_label(&dom::plain_text(label), OPTION_CAP);
            if !text.is_empty() {
                return text;
            }
        }
    }

    if let Some(wrapper) = dom::closest(radio, "label") {
        // The wrapper may hold other members of the group; keep only this radio's text
        let owns_others = members
            .iter()
            .any(|m| m.id() != radio.id() && dom::contains(wrapper, *m));
        if !owns_others {
            let text = clean_label(&dom::plain_text(wrapper), OPTION_CAP);
            if !text.is_empty() {
                return text;
            }
        }
    }

    if let Some(text) = following_text(radio) {
        return text;
    }

    dom::attr_nonempty(radio, "value")
        .filter(|v| *v != "on")
        .map(|v| clean_label(v, OPTION_CAP))
        .unwrap_or_default()
}

/// Text right after a control: a text node, or an inline element such as a
/// `span`, `label` or `b` that holds no controls of its own.
fn following_text(control: ElementRef<'_>) -> Option<String> {
    for sibling in control.next_siblings() {
        match sibling.value() {
            Node::Text(text) => {
                let cleaned = clean_label(text, OPTION_CAP);
                if !cleaned.is_empty() {
                    return Some(cleaned);
                }
            }
            Node::Element(_) => {
                let el = ElementRef::wrap(sibling)?;
                if !matches!(
                    dom::tag(el),
                    "span" | "label" | "b" | "strong" | "font" | "i" | "em" | "small"
                ) || dom::has_control(el)
                {
                    return None;
                }
                let cleaned = clean_label(&dom::plain_text(el), OPTION_CAP);
                return if cleaned.is_empty() { None } else { Some(cleaned) };
            }
            _ => {}
        }
    }
    None
}
