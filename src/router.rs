//! Event routing: debounces focus and click events and drives one
//! interpret → request → render cycle per qualifying field
//!
//! The controller owns the page snapshot and the session. Interpretation
//! happens synchronously on the loop; backend calls run in a `JoinSet` and
//! report back with the ticket they were issued under.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::guidance::{GuidanceBackend, GuidanceError, GuidanceResponse};
use crate::interpreter::{Interpreter, dom};
use crate::panel::{PanelView, render};
use crate::session::{Action, Session, Ticket};
use crate::types::{FieldKey, FieldQuery};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    FocusIn,
    Click,
}

/// A user interaction with the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    pub kind: EventKind,
    /// CSS selector of the event target
    pub selector: String,
}

impl DomEvent {
    pub fn focus(selector: impl Into<String>) -> Self {
        Self {
            kind: EventKind::FocusIn,
            selector: selector.into(),
        }
    }

    pub fn click(selector: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Click,
            selector: selector.into(),
        }
    }
}

/// Trailing-edge debounce: only the last item pushed within the delay fires
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace whatever is pending and restart the delay
    pub fn push(&mut self, item: T, now: Instant) {
        self.pending = Some((item, now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Take the pending item once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(at) if now >= at => self.pending.take().map(|(item, _)| item),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Inputs accepted by the controller loop
#[derive(Debug, Clone)]
pub enum RouterInput {
    Event(DomEvent),
    /// User picked a clarification option by index
    SelectOption(usize),
    Close,
    /// The host page changed; interpret against new markup from now on
    Replace(String),
}

type Completion = (Ticket, Result<GuidanceResponse, GuidanceError>);

pub struct Controller {
    html: Html,
    interpreter: Interpreter,
    session: Session,
    backend: Option<Arc<dyn GuidanceBackend>>,
    debouncer: Debouncer<DomEvent>,
}

impl Controller {
    pub fn new(
        html: Html,
        interpreter: Interpreter,
        session: Session,
        backend: Option<Arc<dyn GuidanceBackend>>,
        debounce: Duration,
    ) -> Self {
        Self {
            html,
            interpreter,
            session,
            backend,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Decide whether an event starts a cycle, and interpret its field.
    ///
    /// Focus qualifies on any eligible control. Clicks qualify on radio
    /// buttons, checkboxes and labels bound to a control; other clicks are
    /// left to the focus event that follows them.
    pub fn qualify(&self, event: &DomEvent) -> Option<(FieldKey, FieldQuery)> {
        let selector = match Selector::parse(&event.selector) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Ignoring event with invalid selector '{}': {:?}", event.selector, e);
                return None;
            }
        };

        let Some(target) = self.html.select(&selector).next() else {
            debug!("No element matches {}", event.selector);
            return None;
        };
        if self.interpreter.is_inside_panel(target) {
            return None;
        }

        let control = match event.kind {
            EventKind::FocusIn => target,
            EventKind::Click => {
                let is_choice = dom::tag(target) == "input"
                    && matches!(dom::input_type(target).as_str(), "radio" | "checkbox");
                if is_choice {
                    target
                } else if dom::closest(target, "label").is_some() {
                    self.interpreter.resolve_target(&self.html, target)?
                } else {
                    return None;
                }
            }
        };

        let field = self.interpreter.describe(control)?;
        let query = self.interpreter.interpret_field(&self.html, &field);
        Some((self.interpreter.field_key(&field), query))
    }

    /// Run one interaction cycle for an event, bypassing the debounce.
    ///
    /// Returns `Action::Request` untouched so the caller decides how to
    /// deliver the backend call.
    pub fn trigger(&mut self, event: &DomEvent) -> Action {
        match self.qualify(event) {
            Some((key, query)) => self.session.begin(key, query),
            None => Action::Ignore,
        }
    }

    pub fn view(&self) -> PanelView {
        render(self.session.state())
    }

    async fn emit(&self, views: &mpsc::Sender<PanelView>) {
        if views.send(self.view()).await.is_err() {
            debug!("Panel receiver dropped");
        }
    }

    fn spawn_request(&self, pending: &mut JoinSet<Completion>, action: Action) -> Option<Completion> {
        let Action::Request { ticket, request } = action else {
            return None;
        };
        match &self.backend {
            Some(backend) => {
                let backend = Arc::clone(backend);
                pending.spawn(async move {
                    let result = backend.form_help(&request).await;
                    (ticket, result)
                });
                None
            }
            None => Some((ticket, Err(GuidanceError::NotConfigured))),
        }
    }

    async fn dispatch(
        &mut self,
        event: DomEvent,
        pending: &mut JoinSet<Completion>,
        views: &mpsc::Sender<PanelView>,
    ) {
        debug!("Dispatching {:?} on {}", event.kind, event.selector);
        let action = self.trigger(&event);
        if action == Action::Ignore {
            return;
        }

        self.emit(views).await;
        if let Some((ticket, result)) = self.spawn_request(pending, action)
            && self.session.complete(&ticket, result)
        {
            self.emit(views).await;
        }
    }

    /// Drive the loop until `inputs` closes and every pending event and
    /// request has settled. Each panel change is sent to `views`.
    pub async fn run(
        mut self,
        mut inputs: mpsc::Receiver<RouterInput>,
        views: mpsc::Sender<PanelView>,
    ) -> Session {
        let mut pending: JoinSet<Completion> = JoinSet::new();
        let mut inputs_open = true;

        loop {
            let deadline = self.debouncer.deadline();
            if !inputs_open && deadline.is_none() && pending.is_empty() {
                break;
            }

            tokio::select! {
                input = inputs.recv(), if inputs_open => match input {
                    Some(RouterInput::Event(event)) => self.debouncer.push(event, Instant::now()),
                    Some(RouterInput::SelectOption(index)) => {
                        if let Some(option) = self.session.select_option(index) {
                            debug!("Selected clarification option '{}'", option.label);
                            self.emit(&views).await;
                        }
                    }
                    Some(RouterInput::Close) => {
                        self.debouncer.cancel();
                        self.session.close();
                        self.emit(&views).await;
                    }
                    Some(RouterInput::Replace(markup)) => {
                        self.html = Html::parse_document(&markup);
                        self.debouncer.cancel();
                        debug!("Page snapshot replaced");
                        if self.session.reset_page() {
                            self.emit(&views).await;
                        }
                    }
                    None => inputs_open = false,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(event) = self.debouncer.poll(Instant::now()) {
                        self.dispatch(event, &mut pending, &views).await;
                    }
                }
                Some(joined) = pending.join_next(), if !pending.is_empty() => match joined {
                    Ok((ticket, result)) => {
                        if self.session.complete(&ticket, result) {
                            self.emit(&views).await;
                        }
                    }
                    Err(e) => warn!("Guidance task failed: {}", e),
                },
            }
        }

        self.session
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;
