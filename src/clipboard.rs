// SPDX-License-Identifier: GPL-3.0-only

use std::thread;

use anywho::anywho;
use tokio::sync::mpsc;

/// Something that can hold copied text
pub trait ClipboardSink {
    fn set_text(&mut self, text: String) -> Result<(), anywho::Error>;
}

/// The system clipboard
pub struct ArboardSink(arboard::Clipboard);

impl ArboardSink {
    pub fn new() -> Result<Self, anywho::Error> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|e| anywho!("Clipboard unavailable: {}", e))
    }
}

impl ClipboardSink for ArboardSink {
    fn set_text(&mut self, text: String) -> Result<(), anywho::Error> {
        self.0
            .set_text(text)
            .map_err(|e| anywho!("Failed to copy to clipboard: {}", e))
    }
}

/// Fire-and-forget copying on a dedicated worker thread.
///
/// The worker owns the sink for as long as the handle lives, some platforms
/// drop the clipboard contents together with their owner.
pub struct Clipboard {
    tx: mpsc::UnboundedSender<String>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Clipboard {
    /// Starts the worker. `make_sink` runs on the worker thread so the sink
    /// does not need to be `Send`.
    pub fn spawn<S, F>(make_sink: F) -> Self
    where
        S: ClipboardSink,
        F: FnOnce() -> Result<S, anywho::Error> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        // the worker logs through whatever subscriber its creator uses
        let dispatch = tracing::dispatcher::get_default(|dispatch| dispatch.clone());

        let worker = thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    let mut sink = make_sink()
                        .inspect_err(|err| tracing::warn!("{}", err))
                        .ok();

                    while let Some(text) = rx.blocking_recv() {
                        match sink.as_mut() {
                            Some(sink) => match sink.set_text(text) {
                                Ok(()) => tracing::info!("Copied!"),
                                Err(err) => tracing::warn!("{}", err),
                            },
                            None => tracing::debug!("No clipboard, copy dropped"),
                        }
                    }
                })
            })
            .inspect_err(|err| tracing::warn!("Failed to start clipboard worker: {}", err))
            .ok();

        Self { tx, worker }
    }

    /// Queues `text` and returns immediately, failures are only logged
    pub fn copy(&self, text: impl Into<String>) {
        if self.tx.send(text.into()).is_err() {
            tracing::debug!("Clipboard worker is gone, copy dropped");
        }
    }

    /// Waits for queued copies to finish and stops the worker
    pub fn close(self) {
        let Clipboard { tx, worker } = self;
        drop(tx);
        if let Some(worker) = worker {
            if worker.join().is_err() {
                tracing::warn!("Clipboard worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        copied: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
    }

    impl ClipboardSink for RecordingSink {
        fn set_text(&mut self, text: String) -> Result<(), anywho::Error> {
            if self.fail_on == Some(text.as_str()) {
                return Err(anywho!("refused {}", text));
            }
            self.copied.lock().unwrap().push(text);
            Ok(())
        }
    }

    #[test]
    fn test_copies_in_order() {
        let sink = RecordingSink::default();
        let copied = Arc::clone(&sink.copied);

        let clipboard = Clipboard::spawn(move || Ok(sink));
        clipboard.copy("287082");
        clipboard.copy(String::from("081804"));
        clipboard.close();

        assert_eq!(*copied.lock().unwrap(), vec!["287082", "081804"]);
    }

    #[test]
    fn test_failed_copy_is_swallowed() {
        let sink = RecordingSink {
            fail_on: Some("000000"),
            ..Default::default()
        };
        let copied = Arc::clone(&sink.copied);

        let clipboard = Clipboard::spawn(move || Ok(sink));
        clipboard.copy("000000");
        clipboard.copy("123456");
        clipboard.close();

        assert_eq!(*copied.lock().unwrap(), vec!["123456"]);
    }

    #[test]
    fn test_missing_clipboard_is_swallowed() {
        let clipboard =
            Clipboard::spawn(|| Err::<RecordingSink, _>(anywho!("no display")));
        clipboard.copy("123456");
        clipboard.close();
    }

    #[test]
    fn test_successful_copy_is_confirmed_at_info() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let clipboard = Clipboard::spawn(|| Ok(RecordingSink::default()));
            clipboard.copy("287082");
            clipboard.close();
        });

        let output = logs.contents();
        assert!(output.contains("Copied!"), "{output}");
        assert!(!output.contains("287082"));
    }
}
