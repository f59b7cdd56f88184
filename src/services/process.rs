use std::{
    io::Write as _,
    process::{Command, Output, Stdio},
};

use crate::foundation::error::{FanframeError, FanframeResult};

/// Run `cmd`, feeding `input` on stdin while stdout and stderr are collected.
///
/// A non-zero exit is reported with the trimmed stderr.
pub(crate) fn run_with_stdin(
    mut cmd: Command,
    input: Vec<u8>,
    what: &str,
) -> FanframeResult<Output> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| {
        FanframeError::service(format!(
            "failed to spawn {what} (is it installed and on PATH?): {e}"
        ))
    })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| FanframeError::service(format!("failed to open {what} stdin")))?;
    // Feed stdin from a separate thread so a chatty child cannot fill its stdout pipe and stall.
    let feeder = std::thread::spawn(move || stdin.write_all(&input));

    let out = child
        .wait_with_output()
        .map_err(|e| FanframeError::service(format!("failed to wait for {what}: {e}")))?;
    let fed = feeder
        .join()
        .map_err(|_| FanframeError::service(format!("{what} stdin thread panicked")))?;

    if !out.status.success() {
        return Err(FanframeError::service(format!(
            "{what} exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    fed.map_err(|e| FanframeError::service(format!("failed to write {what} stdin: {e}")))?;
    Ok(out)
}
