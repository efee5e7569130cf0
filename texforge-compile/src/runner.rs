//! Process execution with a timeout.
//!
//! [`CommandRunner`] is the seam between the compiler and the operating
//! system; tests substitute a scripted runner so fallback behavior can be
//! checked without a TeX installation.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A program, its arguments, and the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The process exited by itself. `None` when killed by a signal.
    Code(Option<i32>),
    /// The timeout expired and the process was killed.
    TimedOut,
}

impl Exit {
    pub fn success(self) -> bool {
        self == Exit::Code(Some(0))
    }
}

/// Everything a finished process produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub exit: Exit,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Runs one process to completion or timeout.
pub trait CommandRunner {
    /// Run `invocation`, killing it once `timeout` has passed.
    ///
    /// A program that cannot be found is reported as an
    /// [`std::io::ErrorKind::NotFound`] error.
    fn run(&self, invocation: &Invocation, timeout: Duration) -> std::io::Result<RunOutput>;
}

/// Runs processes on the host, polling for exit.
///
/// On Unix each process leads its own process group, and a timeout kills
/// the whole group so helpers spawned by the engine die with it. Output is
/// read on background threads; once the process is gone the readers get
/// `read_grace` to reach end of file before whatever they captured is
/// returned.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    poll_interval: Duration,
    read_grace: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        SystemRunner {
            poll_interval: Duration::from_millis(50),
            read_grace: Duration::from_millis(500),
        }
    }
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> std::io::Result<RunOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        tracing::debug!(program = %invocation.program, args = ?invocation.args, "spawning");
        let started = Instant::now();
        let mut child = command.spawn()?;

        // Drain both pipes so a chatty engine cannot fill one and stall.
        let stdout = child.stdout.take().map(Capture::start);
        let stderr = child.stderr.take().map(Capture::start);

        let exit = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Exit::Code(status.code()),
                Ok(None) if started.elapsed() >= timeout => {
                    kill_tree(&mut child);
                    break Exit::TimedOut;
                }
                Ok(None) => thread::sleep(self.poll_interval),
                Err(err) => {
                    kill_tree(&mut child);
                    return Err(err);
                }
            }
        };

        let deadline = Instant::now() + self.read_grace;
        Ok(RunOutput {
            exit,
            stdout: Capture::finish(stdout, deadline),
            stderr: Capture::finish(stderr, deadline),
            duration: started.elapsed(),
        })
    }
}

/// Kill the child and, on Unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            if let Err(err) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!("killpg {pid} failed: {err}");
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Output of one pipe, collected on a background thread.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(mut pipe: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Capture { buf, done }
    }

    /// Whatever was read by `deadline`. A pipe still held open by a
    /// leftover descendant is abandoned at that point.
    fn finish(capture: Option<Capture>, deadline: Instant) -> String {
        let Some(capture) = capture else {
            return String::new();
        };
        let _ = capture
            .done
            .recv_timeout(deadline.saturating_duration_since(Instant::now()));
        let bytes = capture.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_output_and_exit_code() {
        let inv = Invocation::new("sh", ["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemRunner::new().run(&inv, Duration::from_secs(10)).unwrap();
        assert_eq!(output.exit, Exit::Code(Some(3)));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[test]
    fn runs_in_the_given_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut inv = Invocation::new("sh", ["-c", "pwd"]);
        inv.cwd = Some(dir.path().to_path_buf());
        let output = SystemRunner::new().run(&inv, Duration::from_secs(10)).unwrap();
        let reported = PathBuf::from(output.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn slow_process_is_killed_at_the_timeout() {
        let inv = Invocation::new("sleep", ["5"]);
        let output = SystemRunner::new()
            .run(&inv, Duration::from_millis(200))
            .unwrap();
        assert_eq!(output.exit, Exit::TimedOut);
        assert!(output.duration < Duration::from_secs(4), "took {:?}", output.duration);
    }

    #[test]
    fn timeout_kills_processes_the_engine_started() {
        let inv = Invocation::new("sh", ["-c", "sleep 4 & wait"]);
        let output = SystemRunner::new()
            .run(&inv, Duration::from_millis(300))
            .unwrap();
        assert_eq!(output.exit, Exit::TimedOut);
        assert!(output.duration < Duration::from_secs(2), "took {:?}", output.duration);
    }

    #[test]
    fn lingering_child_does_not_hold_up_a_finished_run() {
        let inv = Invocation::new("sh", ["-c", "echo done; sleep 4 &"]);
        let output = SystemRunner::new().run(&inv, Duration::from_secs(10)).unwrap();
        assert_eq!(output.exit, Exit::Code(Some(0)));
        assert_eq!(output.stdout, "done\n");
        assert!(output.duration < Duration::from_secs(2), "took {:?}", output.duration);
    }

    #[test]
    fn missing_program_is_not_found() {
        let inv = Invocation::new("texforge-no-such-engine", Vec::<String>::new());
        let err = SystemRunner::new().run(&inv, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
