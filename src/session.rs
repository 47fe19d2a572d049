//! Panel state for one browsing session
//!
//! All mutation happens on the event loop between synchronous
//! interpretation and asynchronous response delivery. Responses are matched
//! to the field that was active when they were requested, so a late answer
//! for an old field never replaces the current one.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::guidance::{FormHelpRequest, GuidanceError, GuidanceResponse, QuestionOption};
use crate::types::{FieldKey, FieldKind, FieldQuery, OptionCandidate};

/// How enumerable fields are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GuidanceMode {
    /// Always ask the backend, passing extracted options as context
    #[default]
    Assisted,
    /// Render selects, radios and checkboxes from markup without a request
    LocalOnly,
}

/// Tag attached to an outstanding request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub field: FieldKey,
    pub seq: u64,
}

/// What the caller should do after a field was interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing changed
    Ignore,
    /// The panel changed without a backend call
    Render,
    /// The panel shows loading; send `request` and report back with `ticket`
    Request {
        ticket: Ticket,
        request: FormHelpRequest,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Idle,
    Loading {
        field: String,
    },
    Error {
        field: String,
        message: String,
    },
    LocalOptions {
        field: String,
        kind: FieldKind,
        options: Vec<OptionCandidate>,
    },
    Guidance {
        field: String,
        response: GuidanceResponse,
        /// Clarification option the user picked, if any
        selected: Option<usize>,
    },
}

#[derive(Debug, Clone)]
struct ActiveField {
    ticket: Ticket,
    question: String,
}

pub struct Session {
    mode: GuidanceMode,
    form_context: String,
    backend_configured: bool,
    state: PanelState,
    active: Option<ActiveField>,
    next_seq: u64,
    cached: Option<(FieldKey, GuidanceResponse)>,
}

impl Session {
    pub fn new(mode: GuidanceMode, form_context: impl Into<String>, backend_configured: bool) -> Self {
        Self {
            mode,
            form_context: form_context.into(),
            backend_configured,
            state: PanelState::Idle,
            active: None,
            next_seq: 0,
            cached: None,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn active_ticket(&self) -> Option<&Ticket> {
        self.active.as_ref().map(|a| &a.ticket)
    }

    fn activate(&mut self, key: FieldKey, question: &str) -> Ticket {
        self.next_seq += 1;
        let ticket = Ticket {
            field: key,
            seq: self.next_seq,
        };
        self.active = Some(ActiveField {
            ticket: ticket.clone(),
            question: question.to_string(),
        });
        ticket
    }

    /// Start a new interaction cycle for an interpreted field
    pub fn begin(&mut self, key: FieldKey, query: FieldQuery) -> Action {
        if query.is_empty() {
            debug!("Ignoring uninterpretable field {}", key);
            return Action::Ignore;
        }

        // Same field again while its answer is pending or shown
        if let Some(active) = &self.active
            && active.ticket.field == key
            && !matches!(self.state, PanelState::Idle | PanelState::Error { .. })
        {
            debug!("Field {} already active", key);
            return Action::Ignore;
        }

        let local_only = self.mode == GuidanceMode::LocalOnly || !self.backend_configured;
        if local_only && query.kind.is_enumerable() && !query.options.is_empty() {
            self.activate(key, &query.question);
            self.state = PanelState::LocalOptions {
                field: query.question,
                kind: query.kind,
                options: query.options,
            };
            return Action::Render;
        }

        if !self.backend_configured {
            debug!("No guidance backend for free-text field {}", key);
            self.active = None;
            if self.state == PanelState::Idle {
                return Action::Ignore;
            }
            self.state = PanelState::Idle;
            return Action::Render;
        }

        if let Some((cached_key, response)) = &self.cached
            && *cached_key == key
        {
            let response = response.clone();
            self.activate(key, &query.question);
            self.state = PanelState::Guidance {
                field: query.question,
                response,
                selected: None,
            };
            return Action::Render;
        }

        let request = FormHelpRequest::from_query(&query, &self.form_context);
        let ticket = self.activate(key, &query.question);
        info!("Requesting guidance for '{}'", query.question);
        self.state = PanelState::Loading {
            field: query.question,
        };

        Action::Request { ticket, request }
    }

    /// Apply a backend result; returns false when the result is stale
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        result: Result<GuidanceResponse, GuidanceError>,
    ) -> bool {
        let Some(active) = &self.active else {
            debug!("Discarding response for {}: panel closed", ticket.field);
            return false;
        };
        if active.ticket != *ticket {
            debug!(
                "Discarding stale response for {} (active: {})",
                ticket.field, active.ticket.field
            );
            return false;
        }

        let field = active.question.clone();
        self.state = match result {
            Ok(response) => {
                self.cached = Some((ticket.field.clone(), response.clone()));
                PanelState::Guidance {
                    field,
                    response,
                    selected: None,
                }
            }
            Err(e) => {
                warn!("Guidance request for '{}' failed: {}", field, e);
                PanelState::Error {
                    field,
                    message: e.user_message().to_string(),
                }
            }
        };
        true
    }

    /// Pick one of the clarification options; returns it when the panel is interactive
    pub fn select_option(&mut self, index: usize) -> Option<&QuestionOption> {
        match &mut self.state {
            PanelState::Guidance {
                response, selected, ..
            } if response.is_interactive() && index < response.question_options.len() => {
                *selected = Some(index);
                response.question_options.get(index)
            }
            _ => None,
        }
    }

    /// Close the panel; outstanding responses will be discarded
    pub fn close(&mut self) {
        self.state = PanelState::Idle;
        self.active = None;
    }

    /// Forget everything tied to the previous page.
    ///
    /// Field keys are structural paths, so neither the active field nor the
    /// cached answer may carry over to new markup. Returns true when the
    /// panel changed.
    pub fn reset_page(&mut self) -> bool {
        self.cached = None;
        self.active = None;
        if self.state == PanelState::Idle {
            return false;
        }
        self.state = PanelState::Idle;
        true
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
