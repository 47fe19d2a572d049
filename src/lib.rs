//! # formaid
#![allow(clippy::uninlined_format_args)]
//!
//! Contextual guidance for government web forms, inferred from page markup.
//!
//! Government portals such as Passport Seva lay their forms out in tables
//! with labels in neighbouring cells, loose text, fieldset legends and
//! inconsistent `for` attributes. formaid reconstructs the question each
//! control asks and the options it offers, sends that to a guidance backend,
//! and renders the answer as a small panel.
//!
//! ## CLI Usage
//!
//! ```bash
//! # What does this control ask?
//! formaid interpret form.html "#dob"
//!
//! # Every interpretable field on the page
//! formaid scan "https://portal.example.gov.in/form" --format simple
//!
//! # Full guidance cycle for one field (needs a backend)
//! formaid --api-url http://localhost:5000/api help form.html "select[name=gender]"
//!
//! # Answer the clarification question with option 2
//! formaid help form.html "input[name=born]" --select 2
//!
//! # Replay a scripted sequence of focus and click events
//! formaid replay form.html script.json
//!
//! # Capture a live page from a running WebDriver
//! formaid scan "https://portal.example.gov.in/form" --live --browser chrome
//!
//! # Ask about the page and keep a per-site transcript
//! formaid chat form.html "Which documents do I need?"
//! formaid history show local
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use formaid::{Interpreter, Session, GuidanceMode, render};
//! use scraper::{Html, Selector};
//!
//! let html = Html::parse_document(r#"<table><tr><td>Gender</td>
//!     <td><select><option>Male</option><option>Female</option></select></td></tr></table>"#);
//! let selector = Selector::parse("select").unwrap();
//! let control = html.select(&selector).next().unwrap();
//!
//! let interpreter = Interpreter::default();
//! let field = interpreter.describe(control).unwrap();
//! let query = interpreter.interpret_field(&html, &field);
//! assert_eq!(query.question, "Gender");
//!
//! let mut session = Session::new(GuidanceMode::LocalOnly, "passport_application", false);
//! session.begin(interpreter.field_key(&field), query);
//! println!("{}", render(session.state()));
//! ```

/// Free-form chat about the current page
pub mod chat;

/// Layered settings
pub mod config;

/// Error type with process exit codes
pub mod errors;

/// Client for the guidance backend
pub mod guidance;

/// Question and option reconstruction from markup
pub mod interpreter;

/// Panel rendering
pub mod panel;

/// Event debouncing and the interaction loop
pub mod router;

/// Panel state and the stale-response guard
pub mod session;

/// Page snapshots from files, URLs or WebDriver
pub mod snapshot;

/// Label cleanup helpers
pub mod text;

/// Shared type definitions
pub mod types;

pub use errors::FormaidError;
pub use guidance::{FormHelpRequest, GuidanceBackend, GuidanceClient, GuidanceError, GuidanceResponse};
pub use interpreter::Interpreter;
pub use panel::{PanelView, render};
pub use router::{Controller, DomEvent, EventKind, RouterInput};
pub use session::{GuidanceMode, PanelState, Session};
pub use types::{FieldKey, FieldKind, FieldQuery, OptionCandidate, OutputFormat, ScannedField};
