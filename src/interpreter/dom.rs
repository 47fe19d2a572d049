//! Read-only traversal helpers over a parsed snapshot

use scraper::{ElementRef, Html, Node, Selector};

lazy_static::lazy_static! {
    pub(crate) static ref LABELS: Selector = selector("label");
    pub(crate) static ref INPUTS: Selector = selector("input");
    pub(crate) static ref OPTIONS: Selector = selector("option");
    pub(crate) static ref CONTROLS: Selector = selector("input, select, textarea");
    pub(crate) static ref TITLE: Selector = selector("title");
    pub(crate) static ref BODY: Selector = selector("body");
}

fn selector(css: &str) -> Selector {
    // Only called with literal selectors above
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Lowercase tag name
pub(crate) fn tag<'a>(el: ElementRef<'a>) -> &'a str {
    el.value().name()
}

pub(crate) fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// Non-empty trimmed attribute value
pub(crate) fn attr_nonempty<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    attr(el, name).map(str::trim).filter(|v| !v.is_empty())
}

/// `type` attribute of an input, lowercased, defaulting to `text`
pub(crate) fn input_type(el: ElementRef<'_>) -> String {
    attr(el, "type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

pub(crate) fn is_form_control(el: ElementRef<'_>) -> bool {
    matches!(tag(el), "input" | "select" | "textarea" | "button")
}

pub(crate) fn is_radio(el: ElementRef<'_>) -> bool {
    tag(el) == "input" && input_type(el) == "radio"
}

/// Element ancestors, nearest first, excluding `el` itself
pub(crate) fn ancestors<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

/// Nearest ancestor (or `el` itself) with the given tag
pub(crate) fn closest<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    if tag(el) == name {
        return Some(el);
    }
    ancestors(el).find(|a| tag(*a) == name)
}

/// Whether `el` is `container` or lies inside it
pub(crate) fn contains(container: ElementRef<'_>, el: ElementRef<'_>) -> bool {
    container.id() == el.id() || el.ancestors().any(|a| a.id() == container.id())
}

/// Whether any form control lives inside `el` (including `el` itself)
pub(crate) fn has_control(el: ElementRef<'_>) -> bool {
    is_form_control(el) || el.select(&CONTROLS).next().is_some()
}

/// Direct element children
pub(crate) fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

fn skipped_by_default(el: ElementRef<'_>) -> bool {
    is_form_control(el) || matches!(tag(el), "script" | "style" | "noscript" | "template")
}

/// Text content of `el`, leaving out form controls (and everything in them),
/// scripts, and any element matched by `skip`.
pub(crate) fn text_excluding(el: ElementRef<'_>, skip: &dyn Fn(ElementRef<'_>) -> bool) -> String {
    let mut out = String::new();
    collect_text(el, skip, &mut out);
    out
}

fn collect_text(el: ElementRef<'_>, skip: &dyn Fn(ElementRef<'_>) -> bool, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if skipped_by_default(child_el) || skip(child_el) {
                        out.push(' ');
                        continue;
                    }
                    if tag(child_el) == "br" {
                        out.push(' ');
                    }
                    collect_text(child_el, skip, out);
                }
            }
            _ => {}
        }
    }
}

/// Text content without any control text
pub(crate) fn plain_text(el: ElementRef<'_>) -> String {
    text_excluding(el, &|_| false)
}

/// All `label` elements whose `for` attribute names `id`
pub(crate) fn labels_for<'a>(html: &'a Html, id: &str) -> impl Iterator<Item = ElementRef<'a>> {
    let id = id.to_string();
    html.select(&LABELS)
        .filter(move |l| attr(*l, "for").map(str::trim) == Some(id.as_str()))
}

/// Element position among its element siblings
fn element_index(el: ElementRef<'_>) -> usize {
    el.prev_siblings().filter(|n| n.value().is_element()).count()
}

/// Structural path such as `html[0]/body[1]/form[0]/input[3]`
pub(crate) fn structural_path(el: ElementRef<'_>) -> String {
    let mut segments: Vec<String> = ancestors(el)
        .map(|a| format!("{}[{}]", tag(a), element_index(a)))
        .collect();
    segments.reverse();
    segments.push(format!("{}[{}]", tag(el), element_index(el)));
    segments.join("/")
}

/// The page title, whitespace collapsed
pub(crate) fn page_title(html: &Html) -> String {
    html.select(&TITLE)
        .next()
        .map(|t| t.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}
