//! Agent subprocess wire protocol: a single JSON object written to the
//! child's stdin, a single JSON object read back from its stdout. The
//! child is free to interleave log lines on stdout around the result;
//! the protocol tolerates that by scanning backward for the last line
//! that parses as a JSON object.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Which phase a subprocess invocation represents, passed as
/// `--phase <name>` on the child's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Learning,
    Testing,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Learning => "learning",
            Phase::Testing => "testing",
        }
    }
}

/// Scans `stdout` from the last line to the first, returning the first
/// line that both starts with `{` and ends with `}` and parses as
/// JSON. A child that logs progress to stdout around its result is
/// expected to emit the result as the final such line; earlier log
/// noise never shadows it. Returns `{}` if no line qualifies, matching
/// a child that produced no result.
#[must_use]
pub fn extract_json_line(stdout: &str) -> Value {
    for line in stdout.trim().lines().rev() {
        let candidate = line.trim();
        if candidate.starts_with('{') && candidate.ends_with('}') {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return value;
            }
        }
    }
    Value::Object(serde_json::Map::new())
}

/// Runs one agent subprocess invocation: serializes `input` to JSON,
/// writes it to the child's stdin, and parses the child's stdout with
/// [`extract_json_line`]. On a non-zero exit code, returns
/// [`Error::AgentPhaseFailure`] with the captured stderr rather than
/// attempting to parse stdout.
pub async fn run_phase<T: Serialize>(
    program: &str,
    args: &[&str],
    phase: Phase,
    input: &T,
) -> Result<Value> {
    let payload = serde_json::to_vec(input).map_err(Error::Serialization)?;

    let mut full_args: Vec<&str> = args.to_vec();
    full_args.extend(["--phase", phase.as_str()]);

    let mut child = Command::new(program)
        .args(&full_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(Error::Io)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&payload).await.map_err(Error::Io)?;
    }

    let output = child.wait_with_output().await.map_err(Error::Io)?;

    if !output.status.success() {
        return Err(Error::AgentPhaseFailure {
            phase: phase.as_str().to_string(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(extract_json_line(&stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_line_trailing_log_noise() {
        let stdout = "loading model...\nwarming up cache\n{\"answer\": \"42\"}\n";
        let value = extract_json_line(stdout);
        assert_eq!(value["answer"], "42");
    }

    #[test]
    fn extracts_last_valid_json_line_when_multiple_present() {
        let stdout = "{\"stale\": true}\nsome progress line\n{\"answer\": \"final\"}";
        let value = extract_json_line(stdout);
        assert_eq!(value["answer"], "final");
    }

    #[test]
    fn returns_empty_object_when_no_line_qualifies() {
        let stdout = "just some log output\nno json here";
        assert_eq!(extract_json_line(stdout), Value::Object(serde_json::Map::new()));
    }

    #[test]
    fn ignores_lines_that_look_like_json_but_fail_to_parse() {
        let stdout = "{not actually json}\n{\"answer\": \"ok\"}";
        let value = extract_json_line(stdout);
        assert_eq!(value["answer"], "ok");
    }

    #[test]
    fn phase_as_str_matches_cli_convention() {
        assert_eq!(Phase::Learning.as_str(), "learning");
        assert_eq!(Phase::Testing.as_str(), "testing");
    }
}
