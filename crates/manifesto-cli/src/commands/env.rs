//! Env command implementation.

use manifesto_core::ManifestDocument;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Quiet period after the last manifest event before regenerating.
const DEBOUNCE: Duration = Duration::from_millis(200);

pub fn run(manifest: &ManifestDocument, output: &Path) -> ExitCode {
    match manifest.generate_technology_env_file(output) {
        Ok(()) => {
            let count = manifest.technology_env_lines().len();
            println!("generated: {} ({count} layer(s))", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn regenerate(manifest_path: &Path, output: &Path) -> ExitCode {
    match ManifestDocument::load(manifest_path) {
        Ok(manifest) => run(&manifest, output),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub fn watch(manifest_path: &Path, output: &Path) -> ExitCode {
    let Some(file_name) = manifest_path.file_name() else {
        eprintln!("error: not a file: {}", manifest_path.display());
        return ExitCode::FAILURE;
    };
    // Watch the directory: saving via rename replaces the manifest's inode.
    let dir = match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    println!("watching: {}", manifest_path.display());
    if regenerate(manifest_path, output) == ExitCode::FAILURE {
        eprintln!("initial generation failed, continuing to watch...");
    }

    let (tx, rx) = mpsc::channel();

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => tracing::warn!("watcher error: {e}"),
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    ) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: failed to create watcher: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        eprintln!("error: failed to watch {}: {e}", dir.display());
        return ExitCode::FAILURE;
    }

    println!("press Ctrl+C to stop");

    while wait_for_quiet(&rx, DEBOUNCE, |event| touches(event, file_name)) {
        println!("\ndetected change, regenerating...");
        if regenerate(manifest_path, output) == ExitCode::FAILURE {
            eprintln!("generation failed");
        }
    }

    eprintln!("error: watcher stopped");
    ExitCode::FAILURE
}

/// Whether `event` concerns a file called `file_name`.
fn touches(event: &Event, file_name: &OsStr) -> bool {
    event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name))
}

/// Block until a relevant event arrives, then until no relevant event has
/// arrived for `quiet`. Returns `false` if the channel closed with nothing
/// pending.
fn wait_for_quiet<T>(
    rx: &Receiver<T>,
    quiet: Duration,
    mut relevant: impl FnMut(&T) -> bool,
) -> bool {
    loop {
        match rx.recv() {
            Ok(event) if relevant(&event) => break,
            Ok(_) => continue,
            Err(_) => return false,
        }
    }

    let mut deadline = Instant::now() + quiet;
    loop {
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(event) => {
                if relevant(&event) {
                    deadline = Instant::now() + quiet;
                }
            }
            // Disconnected: the pending change is still reported once.
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use notify::event::{CreateKind, ModifyKind};
    use std::path::PathBuf;
    use std::sync::mpsc::TryRecvError;
    use std::thread;

    #[test]
    fn waits_for_the_last_of_a_burst() {
        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            for chunk in 0..3 {
                tx.send(chunk).unwrap();
                thread::sleep(Duration::from_millis(20));
            }
            tx
        });

        let start = Instant::now();
        assert!(wait_for_quiet(&rx, Duration::from_millis(150), |_| true));
        // Returns only after the quiet window that follows the final write.
        assert!(start.elapsed() >= Duration::from_millis(180));
        let tx = sender.join().unwrap();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        drop(tx);
    }

    #[test]
    fn ignores_irrelevant_events() {
        let (tx, rx) = mpsc::channel();
        tx.send("other.yml").unwrap();
        tx.send("notes.txt").unwrap();
        drop(tx);

        let relevant = |name: &&str| *name == "manifesto.yml";
        assert!(!wait_for_quiet(&rx, Duration::from_millis(10), relevant));
    }

    #[test]
    fn pending_change_survives_closed_channel() {
        let (tx, rx) = mpsc::channel();
        tx.send("manifesto.yml").unwrap();
        drop(tx);

        assert!(wait_for_quiet(&rx, Duration::from_secs(5), |name| *name == "manifesto.yml"));
        assert!(!wait_for_quiet(&rx, Duration::from_secs(5), |name| *name == "manifesto.yml"));
    }

    #[test]
    fn matches_manifest_by_file_name() {
        let name = OsStr::new("manifesto.yml");

        let renamed = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/project/manifesto.yml"));
        assert!(touches(&renamed, name));

        let temp = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/project/.manifesto.yml.swp"));
        assert!(!touches(&temp, name));

        let moved = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/project/tmp.yml"))
            .add_path(PathBuf::from("/project/manifesto.yml"));
        assert!(touches(&moved, name));
    }
}
