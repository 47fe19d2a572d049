// Unit tests for debouncing, event qualification and the controller loop

use super::*;
use crate::chat::{ChatReply, ChatRequest};
use crate::guidance::FormHelpRequest;
use crate::session::{GuidanceMode, PanelState};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Mutex;

const PAGE: &str = r#"
<html><body>
  <form>
    <label for="given">Given Name</label><input id="given" type="text">
    <label for="surname">Surname</label><input id="surname" type="text">
    <input type="checkbox" id="alias"><label for="alias">Are you known by any other names?</label>
    <div class="note">Fill all mandatory fields</div>
  </form>
  <div id="gov-helper-panel"><textarea id="chat-box"></textarea></div>
</body></html>"#;

/// Backend that answers after a per-field delay and records what it was asked
#[derive(Default)]
struct FakeBackend {
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn with_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(label, ms)| (label.to_string(), Duration::from_millis(*ms)))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GuidanceBackend for FakeBackend {
    async fn form_help(&self, request: &FormHelpRequest) -> Result<GuidanceResponse, GuidanceError> {
        self.calls.lock().unwrap().push(request.field_label.clone());
        let delay = self
            .delays
            .get(&request.field_label)
            .copied()
            .unwrap_or(Duration::from_millis(50));
        tokio::time::sleep(delay).await;
        Ok(GuidanceResponse {
            advice: format!("advice for {}", request.field_label),
            ..Default::default()
        })
    }

    async fn chat(&self, _request: &ChatRequest) -> Result<ChatReply, GuidanceError> {
        Err(GuidanceError::NotConfigured)
    }
}

fn controller(backend: Option<Arc<FakeBackend>>) -> Controller {
    let session = Session::new(GuidanceMode::Assisted, "passport_application", backend.is_some());
    Controller::new(
        Html::parse_document(PAGE),
        Interpreter::default(),
        session,
        backend.map(|b| b as Arc<dyn GuidanceBackend>),
        DEFAULT_DEBOUNCE,
    )
}

/// Feed scripted inputs with pauses in between, then collect every view
async fn drive(
    controller: Controller,
    script: Vec<(RouterInput, u64)>,
) -> (Session, Vec<PanelView>) {
    let (input_tx, input_rx) = mpsc::channel(16);
    let (view_tx, mut view_rx) = mpsc::channel(64);

    let feed = async move {
        for (input, pause_ms) in script {
            input_tx.send(input).await.unwrap();
            tokio::time::sleep(Duration::from_millis(pause_ms)).await;
        }
    };
    let (session, ()) = tokio::join!(controller.run(input_rx, view_tx), feed);

    let mut views = Vec::new();
    while let Some(view) = view_rx.recv().await {
        views.push(view);
    }
    (session, views)
}

fn loading(field: &str) -> PanelView {
    PanelView::Loading {
        field: field.to_string(),
        message: "Analyzing field...".to_string(),
    }
}

fn advice(field: &str) -> PanelView {
    PanelView::Advice {
        field: field.to_string(),
        advice: format!("advice for {}", field),
        warning: String::new(),
    }
}

#[test]
fn test_debouncer_fires_last_item_after_delay() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(300));
    assert_eq!(debouncer.deadline(), None);

    debouncer.push("given", start);
    debouncer.push("surname", start + Duration::from_millis(100));
    assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(400)));

    assert_eq!(debouncer.poll(start + Duration::from_millis(399)), None);
    assert_eq!(debouncer.poll(start + Duration::from_millis(400)), Some("surname"));
    assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
}

#[test]
fn test_debouncer_cancel() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(300));
    debouncer.push(1, start);
    debouncer.cancel();
    assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
}

#[test]
fn test_focus_qualifies_eligible_controls() {
    let controller = controller(None);

    let (key, query) = controller.qualify(&DomEvent::focus("#given")).unwrap();
    assert_eq!(query.question, "Given Name");
    assert!(!key.as_str().is_empty());

    assert!(controller.qualify(&DomEvent::focus("div.note")).is_none());
    assert!(controller.qualify(&DomEvent::focus("#missing")).is_none());
    assert!(controller.qualify(&DomEvent::focus("##bad")).is_none());
}

#[test]
fn test_panel_events_never_qualify() {
    let controller = controller(None);
    assert!(controller.qualify(&DomEvent::focus("#chat-box")).is_none());
    assert!(controller.qualify(&DomEvent::click("#gov-helper-panel")).is_none());
}

#[test]
fn test_click_rules() {
    let controller = controller(None);

    // Clicking into a text box is handled by the focus event that follows
    assert!(controller.qualify(&DomEvent::click("#given")).is_none());

    let (_, query) = controller.qualify(&DomEvent::click("#alias")).unwrap();
    assert_eq!(query.question, "Are you known by any other names?");

    let (label_key, label_query) = controller
        .qualify(&DomEvent::click("label[for=alias]"))
        .unwrap();
    let (focus_key, _) = controller.qualify(&DomEvent::focus("#alias")).unwrap();
    assert_eq!(label_key, focus_key);
    assert_eq!(label_query.question, "Are you known by any other names?");

    let (_, query) = controller.qualify(&DomEvent::click("label[for=surname]")).unwrap();
    assert_eq!(query.question, "Surname");
}

#[tokio::test(start_paused = true)]
async fn test_rapid_focus_changes_send_one_request() {
    let backend = Arc::new(FakeBackend::default());
    let script = vec![
        (RouterInput::Event(DomEvent::focus("#given")), 100),
        (RouterInput::Event(DomEvent::focus("#surname")), 0),
    ];

    let (session, views) = drive(controller(Some(Arc::clone(&backend))), script).await;

    assert_eq!(backend.calls(), vec!["Surname".to_string()]);
    assert_eq!(views, vec![loading("Surname"), advice("Surname")]);
    assert!(matches!(session.state(), PanelState::Guidance { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_late_response_for_previous_field_is_dropped() {
    let backend = Arc::new(FakeBackend::with_delays(&[("Given Name", 2000), ("Surname", 100)]));
    let script = vec![
        (RouterInput::Event(DomEvent::focus("#given")), 400),
        (RouterInput::Event(DomEvent::focus("#surname")), 0),
    ];

    let (session, views) = drive(controller(Some(Arc::clone(&backend))), script).await;

    assert_eq!(
        backend.calls(),
        vec!["Given Name".to_string(), "Surname".to_string()]
    );
    assert_eq!(
        views,
        vec![loading("Given Name"), loading("Surname"), advice("Surname")]
    );
    match session.state() {
        PanelState::Guidance { field, .. } => assert_eq!(field, "Surname"),
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_close_discards_pending_response() {
    let backend = Arc::new(FakeBackend::with_delays(&[("Given Name", 1000)]));
    let script = vec![
        (RouterInput::Event(DomEvent::focus("#given")), 500),
        (RouterInput::Close, 0),
    ];

    let (session, views) = drive(controller(Some(backend)), script).await;

    assert_eq!(
        views,
        vec![
            loading("Given Name"),
            PanelView::Idle {
                message: crate::panel::IDLE_MESSAGE.to_string()
            }
        ]
    );
    assert_eq!(session.state(), &PanelState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_replaced_snapshot_is_used_for_later_events() {
    let backend = Arc::new(FakeBackend::default());
    let updated = PAGE.replace(
        r#"<label for="given">Given Name</label>"#,
        r#"<label for="given">First Name</label>"#,
    );
    let script = vec![
        (RouterInput::Replace(updated), 0),
        (RouterInput::Event(DomEvent::focus("#given")), 0),
    ];

    let (_, views) = drive(controller(Some(Arc::clone(&backend))), script).await;

    assert_eq!(backend.calls(), vec!["First Name".to_string()]);
    assert_eq!(views, vec![loading("First Name"), advice("First Name")]);
}

#[tokio::test(start_paused = true)]
async fn test_replaced_snapshot_drops_previous_answer() {
    let backend = Arc::new(FakeBackend::default());
    let updated = PAGE.replace(
        r#"<label for="given">Given Name</label>"#,
        r#"<label for="given">First Name</label>"#,
    );
    let script = vec![
        (RouterInput::Event(DomEvent::focus("#given")), 1000),
        (RouterInput::Replace(updated), 0),
        (RouterInput::Event(DomEvent::focus("#given")), 0),
    ];

    let (_, views) = drive(controller(Some(Arc::clone(&backend))), script).await;

    assert_eq!(
        backend.calls(),
        vec!["Given Name".to_string(), "First Name".to_string()]
    );
    assert_eq!(
        views,
        vec![
            loading("Given Name"),
            advice("Given Name"),
            PanelView::Idle {
                message: crate::panel::IDLE_MESSAGE.to_string()
            },
            loading("First Name"),
            advice("First Name"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_without_backend_free_text_focus_is_silent() {
    let script = vec![(RouterInput::Event(DomEvent::focus("#given")), 0)];
    let (session, views) = drive(controller(None), script).await;

    assert!(views.is_empty());
    assert_eq!(session.state(), &PanelState::Idle);
}
