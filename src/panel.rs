//! Turns panel state into something a user can read
//!
//! `PanelView` serializes to JSON for `--format json` and implements
//! `Display` for the simple text format.

use serde::Serialize;
use std::fmt;

use crate::guidance::QuestionOption;
use crate::session::PanelState;
use crate::types::{FieldKind, OptionCandidate};

pub const IDLE_MESSAGE: &str = "Ready to help! Focus any form field to get guidance.";
pub const LOADING_MESSAGE: &str = "Analyzing field...";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum PanelView {
    Idle {
        message: String,
    },
    Loading {
        field: String,
        message: String,
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
    Interactive {
        field: String,
        question: String,
        options: Vec<QuestionOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        selected: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        recommendation: Option<String>,
        advice: String,
        warning: String,
    },
    Advice {
        field: String,
        advice: String,
        warning: String,
    },
}

pub fn render(state: &PanelState) -> PanelView {
    match state {
        PanelState::Idle => PanelView::Idle {
            message: IDLE_MESSAGE.to_string(),
        },
        PanelState::Loading { field } => PanelView::Loading {
            field: field.clone(),
            message: LOADING_MESSAGE.to_string(),
        },
        PanelState::Error { field, message } => PanelView::Error {
            field: field.clone(),
            message: message.clone(),
        },
        PanelState::LocalOptions {
            field,
            kind,
            options,
        } => PanelView::LocalOptions {
            field: field.clone(),
            kind: *kind,
            options: options.clone(),
        },
        PanelState::Guidance {
            field,
            response,
            selected,
        } => {
            // Anything short of a full question with options degrades to advice
            if response.is_interactive() {
                let recommendation = selected
                    .and_then(|i| response.question_options.get(i))
                    .map(|o| o.recommendation.clone())
                    .filter(|r| !r.trim().is_empty());
                PanelView::Interactive {
                    field: field.clone(),
                    question: response.clarification_question.clone().unwrap_or_default(),
                    options: response.question_options.clone(),
                    selected: *selected,
                    recommendation,
                    advice: response.advice.clone(),
                    warning: response.warning.clone(),
                }
            } else {
                PanelView::Advice {
                    field: field.clone(),
                    advice: response.advice.clone(),
                    warning: response.warning.clone(),
                }
            }
        }
    }
}

fn write_optional(f: &mut fmt::Formatter<'_>, heading: &str, text: &str) -> fmt::Result {
    if text.trim().is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    write!(f, "{}: {}", heading, text.trim())
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelView::Idle { message } => write!(f, "{}", message),
            PanelView::Loading { field, message } => {
                write!(f, "Field: {}\n{}", field, message)
            }
            PanelView::Error { field, message } => {
                write!(f, "Field: {}\nError: {}", field, message)
            }
            PanelView::LocalOptions { field, options, .. } => {
                write!(f, "Field: {}\nOptions:", field)?;
                for option in options {
                    let mark = if option.is_currently_selected { "x" } else { " " };
                    write!(f, "\n  [{}] {}", mark, option.label)?;
                    if option.value != option.label {
                        write!(f, " ({})", option.value)?;
                    }
                }
                Ok(())
            }
            PanelView::Interactive {
                field,
                question,
                options,
                selected,
                recommendation,
                advice,
                warning,
            } => {
                write!(f, "Field: {}\nQuick Question: {}", field, question)?;
                for (i, option) in options.iter().enumerate() {
                    let mark = if *selected == Some(i) { "*" } else { " " };
                    write!(f, "\n  {}{}. {}", mark, i + 1, option.label)?;
                }
                if let Some(recommendation) = recommendation {
                    write_optional(f, "Recommendation", recommendation)?;
                }
                write_optional(f, "Additional Context", advice)?;
                write_optional(f, "Avoid This Mistake", warning)
            }
            PanelView::Advice {
                field,
                advice,
                warning,
            } => {
                write!(f, "Field: {}", field)?;
                write_optional(f, "Expert Advice", advice)?;
                write_optional(f, "Common Mistake to Avoid", warning)
            }
        }
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;
