// Common test utilities and fixtures

use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Mock HTML pages for testing
pub mod fixtures {
    /// Applicant section laid out the way the passport portal does it
    #[allow(dead_code)]
    pub const APPLICANT_PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Applicant Details</title></head>
    <body>
      <table>
        <tr>
          <td>Given Name <span class="req">*</span></td>
          <td><input type="text" name="givenName" id="givenName" value="Asha"></td>
        </tr>
        <tr>
          <td>Gender</td>
          <td>
            <select name="gender" id="gender">
              <option value="">Select</option>
              <option value="M">Male</option>
              <option value="F" selected>Female</option>
            </select>
          </td>
        </tr>
        <tr>
          <td>Is your Place of Birth out of India?</td>
          <td>
            <input type="radio" name="pob" value="yes"> Yes
            <input type="radio" name="pob" value="no"> No
          </td>
        </tr>
      </table>
      <button id="next">Next</button>
      <input type="text" id="orphan">
    </body>
    </html>
    "#;
}

/// A temporary directory holding one HTML page
#[allow(dead_code)]
pub struct TestPage {
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestPage {
    pub fn new(content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("form.html");
        std::fs::write(&path, content).expect("Failed to write test HTML");
        Self { dir, path }
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("temp path is valid UTF-8")
    }

    /// Write another file next to the page
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }
}

/// Output of one CLI invocation
#[allow(dead_code)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

#[allow(dead_code)]
impl CliOutput {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, self.stdout))
    }
}

/// Run the formaid binary with an isolated home directory and no backend
/// configured from the environment
#[allow(dead_code)]
pub fn run_formaid(home: &Path, args: &[&str]) -> Result<CliOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_formaid"))
        .args(args)
        .env("HOME", home)
        .env_remove("FORMAID_API_URL")
        .env("RUST_LOG", "formaid=warn")
        .output()?;

    Ok(CliOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}
