//! Child process execution
//!
//! Runs a descriptor to completion with stdout and stderr wired to the same
//! pipe, so the captured buffer keeps the order the kernel delivered writes in.
//! Blocking: callers on the async runtime go through `spawn_blocking`.

use std::fmt::Display;
use std::io::{self, PipeReader, Read};
use std::process::{Child, Command, Stdio};

use crate::types::{CommandDescriptor, ExecutionOutcome};

/// Run the command and capture its combined output
///
/// Never fails: spawn, read and wait errors are folded into
/// [`ExecutionOutcome::failure`].
pub fn execute(descriptor: CommandDescriptor) -> ExecutionOutcome {
    let (mut child, mut reader) = match spawn(&descriptor) {
        Ok(spawned) => spawned,
        Err(e) => {
            return ExecutionOutcome {
                combined_output: Vec::new(),
                exit_code: None,
                failure: Some(failure_message(
                    None,
                    format!("spawn {}: {}", descriptor.program(), e),
                )),
            };
        }
    };

    let mut combined_output = Vec::new();
    // EOF arrives once every holder of the write end (the child and anything
    // it forked) has exited or closed it.
    let read_result = reader.read_to_end(&mut combined_output);

    // Always reap, even when reading failed
    let status = match child.wait() {
        Ok(status) => status,
        Err(e) => {
            return ExecutionOutcome {
                combined_output,
                exit_code: None,
                failure: Some(failure_message(None, format!("wait: {}", e))),
            };
        }
    };

    let exit_code = status.code();

    let failure = match read_result {
        Err(e) => Some(failure_message(exit_code, format!("read output: {}", e))),
        Ok(_) if !status.success() => Some(failure_message(exit_code, status)),
        Ok(_) => None,
    };

    ExecutionOutcome {
        combined_output,
        exit_code,
        failure,
    }
}

fn spawn(descriptor: &CommandDescriptor) -> io::Result<(Child, PipeReader)> {
    let (reader, writer) = io::pipe()?;
    let stderr = writer.try_clone()?;

    let mut command = Command::new(descriptor.program());
    command
        .args(descriptor.args())
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr);

    let child = command.spawn()?;
    // Dropping `command` here closes our copies of the write end
    Ok((child, reader))
}

/// Exit status 0 stands in when no code could be read (signal, spawn failure)
pub(crate) fn failure_message(exit_code: Option<i32>, detail: impl Display) -> String {
    format!(
        "exec error: exit_status={}: {}",
        exit_code.unwrap_or(0),
        detail
    )
}
