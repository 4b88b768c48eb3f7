// src/infrastructure/console.rs
// Operator input read off the async runtime

use std::io::{BufRead, BufReader};
use std::thread;
use tokio::sync::{mpsc, Mutex};

struct LineReader {
    source: Option<Box<dyn BufRead + Send>>,
    lines: Option<mpsc::UnboundedReceiver<String>>,
}

/// Lines typed by the operator.
///
/// The blocking read runs on its own thread, started on first use, so a
/// pending `next_line` can be dropped or aborted and the runtime can shut
/// down while the thread is still waiting for input.
pub struct ConsoleInput {
    reader: Mutex<LineReader>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Mutex::new(LineReader {
                source: Some(Box::new(reader)),
                lines: None,
            }),
        }
    }

    /// The next line without its terminator, or `None` once input ends.
    pub async fn next_line(&self) -> Option<String> {
        let mut reader = self.reader.lock().await;

        if reader.lines.is_none() {
            let source = reader.source.take()?;
            reader.lines = Some(spawn_reader(source));
        }

        reader.lines.as_mut()?.recv().await
    }
}

fn spawn_reader(source: Box<dyn BufRead + Send>) -> mpsc::UnboundedReceiver<String> {
    let (sender, receiver) = mpsc::unbounded_channel();

    let spawned = thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in source.lines() {
                let Ok(line) = line else {
                    break;
                };
                if sender.send(line).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        log::error!("Failed to start console reader: {}", e);
    }

    receiver
}
