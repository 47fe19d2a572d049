//! Ordered fallback chain that reconstructs the question a control asks
//!
//! Each step looks at the control from one angle and either produces raw
//! candidate text or gives up. Candidates are cleaned, stripped of the
//! group's own option labels and length-checked before they win; the first
//! usable one ends the chain.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

use super::dom;
use crate::text::{
    MIN_LABEL_LEN, QUESTION_CAP, clean_label, first_question_sentence, humanize_identifier,
    label_len, strip_option_labels,
};
use crate::types::FieldKind;

/// Everything a step may look at for one control
pub(crate) struct Probe<'a> {
    pub html: &'a Html,
    pub control: ElementRef<'a>,
    pub kind: FieldKind,
    /// Radio inputs in the same group (just the control for other kinds)
    pub group: Vec<ElementRef<'a>>,
    /// Labels already derived for the group's options
    pub option_labels: Vec<String>,
}

impl Probe<'_> {
    fn is_group_member(&self, el: ElementRef<'_>) -> bool {
        self.group.iter().any(|m| m.id() == el.id())
    }

    /// Text of `el` without the control or the other inputs of its group
    fn text_of(&self, el: ElementRef<'_>) -> String {
        dom::text_excluding(el, &|child| {
            child.id() == self.control.id() || self.is_group_member(child)
        })
    }

    /// Clean a raw candidate and decide whether it is usable
    fn accept(&self, raw: &str) -> Option<String> {
        let mut text = clean_label(raw, QUESTION_CAP);
        if self.kind == FieldKind::RadioGroup && !self.option_labels.is_empty() {
            text = clean_label(&strip_option_labels(&text, &self.option_labels), QUESTION_CAP);
        }
        if label_len(&text) >= MIN_LABEL_LEN {
            Some(text)
        } else {
            None
        }
    }
}

pub(crate) type QuestionStep = fn(&Probe<'_>) -> Option<String>;

/// The chain, in priority order
pub(crate) const QUESTION_CHAIN: &[(&str, QuestionStep)] = &[
    ("explicit-label", explicit_label),
    ("wrapping-label", wrapping_label),
    ("table-row", table_row),
    ("preceding-text", preceding_text),
    ("fieldset-legend", fieldset_legend),
    ("question-mark", question_mark),
    ("attributes", attribute_fallback),
];

/// Run the chain; an empty string means the control is not interpretable
pub(crate) fn extract_question(probe: &Probe<'_>) -> String {
    for (name, step) in QUESTION_CHAIN {
        if let Some(question) = step(probe) {
            debug!("Question from {} step: {}", name, question);
            return question;
        }
    }
    debug!(
        "No question found for <{}> control",
        dom::tag(probe.control)
    );
    String::new()
}

fn explicit_label(probe: &Probe<'_>) -> Option<String> {
    let id = dom::attr_nonempty(probe.control, "id")?;
    dom::labels_for(probe.html, id).find_map(|label| probe.accept(&probe.text_of(label)))
}

fn wrapping_label(probe: &Probe<'_>) -> Option<String> {
    let label = dom::ancestors(probe.control).find(|a| dom::tag(*a) == "label")?;
    probe.accept(&probe.text_of(label))
}

fn table_row(probe: &Probe<'_>) -> Option<String> {
    if probe.kind == FieldKind::RadioGroup {
        // A group split across rows may carry its question on any member's row
        return probe.group.iter().find_map(|member| row_question(probe, *member));
    }
    row_question(probe, probe.control)
}

fn row_question(probe: &Probe<'_>, control: ElementRef<'_>) -> Option<String> {
    let cell = dom::ancestors(control).find(|a| matches!(dom::tag(*a), "td" | "th"))?;
    let row = dom::ancestors(cell).find(|a| dom::tag(*a) == "tr")?;

    let cells: Vec<ElementRef<'_>> = dom::child_elements(row)
        .filter(|c| matches!(dom::tag(*c), "td" | "th"))
        .collect();
    let index = cells.iter().position(|c| c.id() == cell.id())?;

    // Nearest preceding cell first; empty spacer cells are skipped, but a
    // cell holding another control ends the search
    for candidate in cells[..index].iter().rev() {
        if let Some(text) = probe.accept(&probe.text_of(*candidate)) {
            return Some(text);
        }
        if dom::has_control(*candidate) {
            break;
        }
    }

    if probe.kind == FieldKind::RadioGroup {
        // The first cell may hold the question, possibly next to the options
        return probe.accept(&probe.text_of(cells[0]));
    }

    None
}

fn preceding_text(probe: &Probe<'_>) -> Option<String> {
    let mut anchor = probe.control;

    for _ in 0..3 {
        for sibling in anchor.prev_siblings() {
            let candidate = match sibling.value() {
                Node::Text(text) => Some(text.to_string()),
                Node::Element(_) => ElementRef::wrap(sibling)
                    .filter(|el| {
                        !dom::has_control(*el)
                            && dom::tag(*el) != "script"
                            && !labels_another_control(*el, probe.control)
                    })
                    .map(|el| probe.text_of(el)),
                _ => None,
            };

            if let Some(found) = candidate
                .and_then(|raw| probe.accept(&raw))
                .filter(|text| label_len(text) > MIN_LABEL_LEN)
            {
                return Some(found);
            }
        }

        let parent = anchor.parent().and_then(ElementRef::wrap)?;
        // Table cells and fieldsets have their own steps; forms and the body are too broad
        if matches!(
            dom::tag(parent),
            "td" | "th" | "tr" | "table" | "fieldset" | "form" | "body" | "html"
        ) {
            return None;
        }
        anchor = parent;
    }

    None
}

/// A `label` bound by `for` to some other control belongs to that control
fn labels_another_control(el: ElementRef<'_>, control: ElementRef<'_>) -> bool {
    if dom::tag(el) != "label" {
        return false;
    }
    match dom::attr_nonempty(el, "for") {
        Some(target) => dom::attr(control, "id").map(str::trim) != Some(target),
        None => false,
    }
}

fn fieldset_legend(probe: &Probe<'_>) -> Option<String> {
    if probe.kind != FieldKind::RadioGroup {
        return None;
    }

    probe.group.iter().find_map(|member| {
        let fieldset = dom::ancestors(*member).find(|a| dom::tag(*a) == "fieldset")?;
        let legend = dom::child_elements(fieldset).find(|c| dom::tag(*c) == "legend")?;
        probe.accept(&dom::plain_text(legend))
    })
}

fn question_mark(probe: &Probe<'_>) -> Option<String> {
    for container in dom::ancestors(probe.control).take(4) {
        if matches!(dom::tag(container), "table" | "tbody" | "form" | "body" | "html") {
            break;
        }
        let text = probe.text_of(container);
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some(sentence) = first_question_sentence(&collapsed) {
            return probe.accept(sentence);
        }
    }
    None
}

fn attribute_fallback(probe: &Probe<'_>) -> Option<String> {
    for name in ["aria-label", "title", "placeholder"] {
        if let Some(value) = dom::attr_nonempty(probe.control, name)
            && let Some(text) = probe.accept(value)
        {
            return Some(text);
        }
    }

    for name in ["name", "id"] {
        if let Some(value) = dom::attr_nonempty(probe.control, name)
            && let Some(text) = probe.accept(&humanize_identifier(value))
        {
            return Some(text);
        }
    }

    None
}
