// Unit tests for panel state transitions

use super::*;
use pretty_assertions::assert_eq;

fn text_query(question: &str) -> FieldQuery {
    FieldQuery {
        question: question.to_string(),
        kind: FieldKind::Text,
        options: Vec::new(),
    }
}

fn gender_query() -> FieldQuery {
    FieldQuery {
        question: "Gender".to_string(),
        kind: FieldKind::Select,
        options: vec![
            OptionCandidate::new("Male", "M", false),
            OptionCandidate::new("Female", "F", true),
        ],
    }
}

fn key(path: &str) -> FieldKey {
    FieldKey(path.to_string())
}

fn advice(text: &str) -> GuidanceResponse {
    GuidanceResponse {
        advice: text.to_string(),
        warning: "Check your documents".to_string(),
        ..Default::default()
    }
}

fn assisted() -> Session {
    Session::new(GuidanceMode::Assisted, "passport_application", true)
}

fn expect_request(action: Action) -> (Ticket, FormHelpRequest) {
    match action {
        Action::Request { ticket, request } => (ticket, request),
        other => panic!("expected a request, got {:?}", other),
    }
}

#[test]
fn test_uninterpretable_field_is_ignored() {
    let mut session = assisted();
    assert_eq!(session.begin(key("input[0]"), text_query("")), Action::Ignore);
    assert_eq!(session.state(), &PanelState::Idle);
    assert!(session.active_ticket().is_none());
}

#[test]
fn test_request_then_response() {
    let mut session = assisted();
    let (ticket, request) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));

    assert_eq!(request.field_label, "Given Name");
    assert_eq!(request.form_context, "passport_application");
    assert_eq!(
        session.state(),
        &PanelState::Loading {
            field: "Given Name".to_string()
        }
    );

    assert!(session.complete(&ticket, Ok(advice("As on your birth certificate"))));
    match session.state() {
        PanelState::Guidance {
            field, response, selected,
        } => {
            assert_eq!(field, "Given Name");
            assert_eq!(response.advice, "As on your birth certificate");
            assert_eq!(*selected, None);
        }
        other => panic!("unexpected state {:?}", other),
    }
}

#[test]
fn test_stale_response_is_discarded() {
    let mut session = assisted();
    let (first, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));
    let (second, _) = expect_request(session.begin(key("input[1]"), text_query("Surname")));

    assert!(!session.complete(&first, Ok(advice("late answer"))));
    assert_eq!(
        session.state(),
        &PanelState::Loading {
            field: "Surname".to_string()
        }
    );

    assert!(session.complete(&second, Ok(advice("current answer"))));
    assert!(matches!(
        session.state(),
        PanelState::Guidance { response, .. } if response.advice == "current answer"
    ));
}

#[test]
fn test_refocus_same_field_while_loading_is_ignored() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));

    assert_eq!(session.begin(key("input[0]"), text_query("Given Name")), Action::Ignore);
    assert_eq!(session.active_ticket(), Some(&ticket));
}

#[test]
fn test_error_shows_generic_message_and_allows_retry() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));

    assert!(session.complete(&ticket, Err(GuidanceError::Status(502))));
    assert_eq!(
        session.state(),
        &PanelState::Error {
            field: "Given Name".to_string(),
            message: "Unable to connect to AI service".to_string(),
        }
    );

    let (retry, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));
    assert_ne!(retry, ticket);
}

#[test]
fn test_response_cached_per_field() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));
    assert!(session.complete(&ticket, Ok(advice("cached"))));

    session.close();
    assert_eq!(session.begin(key("input[0]"), text_query("Given Name")), Action::Render);
    assert!(matches!(
        session.state(),
        PanelState::Guidance { response, .. } if response.advice == "cached"
    ));

    // A different field with the same question is a different key
    assert!(matches!(
        session.begin(key("input[5]"), text_query("Given Name")),
        Action::Request { .. }
    ));
}

#[test]
fn test_close_discards_outstanding_response() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));

    session.close();
    assert!(!session.complete(&ticket, Ok(advice("too late"))));
    assert_eq!(session.state(), &PanelState::Idle);
}

#[test]
fn test_reset_page_forgets_active_field_and_cache() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));
    assert!(session.complete(&ticket, Ok(advice("Use your passport spelling"))));

    assert!(session.reset_page());
    assert_eq!(session.state(), &PanelState::Idle);
    assert!(session.active_ticket().is_none());

    // Same structural path on the new page asks again instead of reusing the answer
    let (_, request) = expect_request(session.begin(key("input[0]"), text_query("First Name")));
    assert_eq!(request.field_label, "First Name");

    // Nothing changes on an idle panel
    let mut idle = assisted();
    assert!(!idle.reset_page());
}

#[test]
fn test_reset_page_discards_outstanding_response() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));

    assert!(session.reset_page());
    assert!(!session.complete(&ticket, Ok(advice("too late"))));
    assert_eq!(session.state(), &PanelState::Idle);
}

#[test]
fn test_assisted_mode_sends_options_as_context() {
    let mut session = assisted();
    let (_, request) = expect_request(session.begin(key("select[0]"), gender_query()));

    assert_eq!(request.field_type, "select");
    assert_eq!(request.field_options.as_deref(), Some("Male, Female"));
}

#[test]
fn test_local_only_mode_renders_options() {
    let mut session = Session::new(GuidanceMode::LocalOnly, "passport_application", true);
    assert_eq!(session.begin(key("select[0]"), gender_query()), Action::Render);
    assert_eq!(
        session.state(),
        &PanelState::LocalOptions {
            field: "Gender".to_string(),
            kind: FieldKind::Select,
            options: gender_query().options,
        }
    );

    // Free-text fields still go to the backend
    assert!(matches!(
        session.begin(key("input[0]"), text_query("Given Name")),
        Action::Request { .. }
    ));
}

#[test]
fn test_without_backend_free_text_stays_quiet() {
    let mut session = Session::new(GuidanceMode::Assisted, "passport_application", false);

    assert_eq!(session.begin(key("input[0]"), text_query("Given Name")), Action::Ignore);

    assert_eq!(session.begin(key("select[0]"), gender_query()), Action::Render);
    assert!(matches!(session.state(), PanelState::LocalOptions { .. }));

    // Moving to a free-text field clears the options panel
    assert_eq!(session.begin(key("input[0]"), text_query("Given Name")), Action::Render);
    assert_eq!(session.state(), &PanelState::Idle);
}

#[test]
fn test_select_option_only_when_interactive() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("radio-group:born"), text_query("Born in India")));

    let response = GuidanceResponse {
        advice: "Select your place of birth".to_string(),
        needs_interaction: true,
        clarification_question: Some("Were you born in India?".to_string()),
        question_options: vec![
            QuestionOption {
                label: "Yes".to_string(),
                value: "yes".to_string(),
                recommendation: "Choose your district".to_string(),
            },
            QuestionOption {
                label: "No".to_string(),
                value: "no".to_string(),
                recommendation: "Enter the country of birth".to_string(),
            },
        ],
        ..Default::default()
    };
    assert!(session.complete(&ticket, Ok(response)));

    assert!(session.select_option(5).is_none());
    let picked = session.select_option(1).unwrap();
    assert_eq!(picked.recommendation, "Enter the country of birth");
    assert!(matches!(
        session.state(),
        PanelState::Guidance { selected: Some(1), .. }
    ));
}

#[test]
fn test_select_option_ignored_for_plain_advice() {
    let mut session = assisted();
    let (ticket, _) = expect_request(session.begin(key("input[0]"), text_query("Given Name")));
    assert!(session.complete(&ticket, Ok(advice("plain"))));

    assert!(session.select_option(0).is_none());
}
