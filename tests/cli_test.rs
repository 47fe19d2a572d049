// End-to-end tests of the formaid binary on saved pages
use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

mod common;
use common::fixtures::APPLICANT_PAGE;
use common::{TestPage, run_formaid};

#[test]
fn test_interpret_select_json() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(APPLICANT_PAGE);

    let output = run_formaid(home.path(), &["interpret", page.path_str(), "#gender"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);

    let result = output.json();
    assert_eq!(result["question"], json!("Gender"));
    assert_eq!(result["kind"], json!("select"));
    assert_eq!(
        result["options"],
        json!([
            {"label": "Male", "value": "M", "is_currently_selected": false},
            {"label": "Female", "value": "F", "is_currently_selected": true}
        ])
    );
    Ok(())
}

#[test]
fn test_interpret_radio_group_simple() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(APPLICANT_PAGE);

    let output = run_formaid(
        home.path(),
        &["interpret", page.path_str(), "input[name=pob]", "--format", "simple"],
    )?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);
    assert_eq!(
        output.stdout,
        "Is your Place of Birth out of India? (radio-group)\n  [ ] Yes = yes\n  [ ] No = no\n"
    );
    Ok(())
}

#[test]
fn test_scan_lists_fields_in_order() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(APPLICANT_PAGE);

    let output = run_formaid(home.path(), &["scan", page.path_str()])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);

    let result = output.json();
    let questions: Vec<&str> = result
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["question"].as_str().unwrap())
        .collect();
    assert_eq!(
        questions,
        vec![
            "Given Name",
            "Gender",
            "Is your Place of Birth out of India?",
            "Orphan"
        ]
    );
    assert_eq!(result[2]["key"], json!("radio-group:pob"));
    Ok(())
}

#[test]
fn test_non_control_selector_exit_code() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(APPLICANT_PAGE);

    let output = run_formaid(home.path(), &["interpret", page.path_str(), "#next"])?;
    assert_eq!(output.exit_code, 3);

    let result = output.json();
    assert_eq!(result["error"], json!(true));
    assert!(
        result["message"]
            .as_str()
            .unwrap()
            .contains("No form control found matching selector: #next")
    );
    Ok(())
}

#[test]
fn test_uninterpretable_control_exit_code() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(r#"<html><body><div><input type="text" class="x"></div></body></html>"#);

    let output = run_formaid(home.path(), &["interpret", page.path_str(), "input.x"])?;
    assert_eq!(output.exit_code, 2);
    assert_eq!(output.json()["exit_code"], json!(2));
    Ok(())
}

#[test]
fn test_missing_page_is_generic_error() -> Result<()> {
    let home = TempDir::new()?;

    let output = run_formaid(home.path(), &["scan", "/nonexistent/form.html"])?;
    assert_eq!(output.exit_code, 1);
    assert!(output.json()["message"].as_str().unwrap().contains("Failed to read page"));
    Ok(())
}

#[test]
fn test_help_without_backend_uses_local_options() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(APPLICANT_PAGE);

    let output = run_formaid(home.path(), &["help", page.path_str(), "#gender"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);
    assert_eq!(
        output.stdout,
        "Field: Gender\nOptions:\n  [ ] Male (M)\n  [x] Female (F)\n"
    );
    Ok(())
}

#[test]
fn test_help_without_backend_on_text_field() -> Result<()> {
    let home = TempDir::new()?;
    let page = TestPage::new(APPLICANT_PAGE);

    let output = run_formaid(home.path(), &["help", page.path_str(), "#givenName"])?;
    assert_eq!(output.exit_code, 4);
    assert!(
        output.json()["message"]
            .as_str()
            .unwrap()
            .starts_with("Unable to connect to AI service")
    );
    Ok(())
}

#[test]
fn test_config_layers_flags_over_file() -> Result<()> {
    let home = TempDir::new()?;
    let config_path = home.path().join("custom.json");
    std::fs::write(
        &config_path,
        r#"{"api_url": "http://file.example/api", "debounce_ms": 450}"#,
    )?;

    let output = run_formaid(
        home.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "--api-url",
            "http://flag.example/api",
            "config",
            "show",
        ],
    )?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);

    let result = output.json();
    assert_eq!(result["api_url"], json!("http://flag.example/api"));
    assert_eq!(result["debounce_ms"], json!(450));
    assert_eq!(result["mode"], json!("assisted"));
    Ok(())
}

#[test]
fn test_config_init_writes_default_location() -> Result<()> {
    let home = TempDir::new()?;

    let output = run_formaid(home.path(), &["config", "init"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);
    assert!(home.path().join(".formaid").join("config.json").exists());

    // A second init refuses to overwrite
    let output = run_formaid(home.path(), &["config", "init"])?;
    assert_eq!(output.exit_code, 1);
    Ok(())
}

#[test]
fn test_history_empty() -> Result<()> {
    let home = TempDir::new()?;

    let output = run_formaid(home.path(), &["history", "list"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);
    assert_eq!(output.stdout, "No chat history\n");

    let output = run_formaid(home.path(), &["history", "clear", "local"])?;
    assert_eq!(output.stdout, "No chat history for local\n");
    Ok(())
}
