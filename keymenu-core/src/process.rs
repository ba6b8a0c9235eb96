//! Helpers for running external helper programs (xsel, xdotool, rofi)

use std::io::{self, Write};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};

/// Spawns `program` with piped standard streams
///
/// # Errors
/// Returns the spawn error; `io::ErrorKind::NotFound` means the program is
/// not installed
pub fn spawn_piped(program: &str, args: &[String]) -> io::Result<Child> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
}

/// Writes `input` to the child's stdin from a helper thread and closes it
///
/// Writing from a separate thread keeps a child that produces output
/// before consuming all of its input from blocking on a full pipe.
pub fn feed_stdin(child: &mut Child, input: Vec<u8>) -> Option<JoinHandle<io::Result<()>>> {
    let mut stdin = child.stdin.take()?;
    Some(thread::spawn(move || {
        let result = stdin.write_all(&input);
        drop(stdin);
        match result {
            // The child may exit without reading everything (e.g. cancelled)
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    }))
}

/// Runs `program`, feeding `input` on stdin, and waits for it to exit
///
/// # Errors
/// Returns an error if the program cannot be spawned or its pipes fail
pub fn run_with_input(program: &str, args: &[String], input: &[u8]) -> io::Result<Output> {
    let mut child = spawn_piped(program, args)?;
    let writer = feed_stdin(&mut child, input.to_vec());
    let output = child.wait_with_output()?;
    if let Some(handle) = writer {
        handle
            .join()
            .map_err(|_| io::Error::other("stdin writer thread panicked"))??;
    }
    Ok(output)
}

/// Returns true if the error means the program is not installed
#[must_use]
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}
