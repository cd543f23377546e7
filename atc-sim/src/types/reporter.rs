use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use avn_protocol::frame::Frame;
use avn_protocol::messages::report::ViolationReport;
use channel::ChannelWriter;
use logger::Logger;

/// Forwards violation reports from flight tasks to the notice service.
///
/// Flight tasks hand reports to an in-process channel; a single forwarder
/// thread owns the outbound connection and serializes the writes, so tasks
/// never block on the wire.
pub struct ViolationReporter {
    sender: Sender<ViolationReport>,
    forwarder: Option<JoinHandle<()>>,
}

impl ViolationReporter {
    pub fn start(mut writer: ChannelWriter, logger: Logger) -> Self {
        let (sender, receiver) = mpsc::channel::<ViolationReport>();

        let forwarder = thread::spawn(move || {
            while let Ok(report) = receiver.recv() {
                if let Err(e) = writer.send(&Frame::Report(report)) {
                    let _ = logger.error(&format!("Failed to forward violation: {}", e), true);
                }
            }
        });

        ViolationReporter {
            sender,
            forwarder: Some(forwarder),
        }
    }

    /// A clonable handle for flight tasks to submit reports through.
    pub fn sender(&self) -> Sender<ViolationReport> {
        self.sender.clone()
    }

    /// Drops the submission side and waits for queued reports to drain.
    pub fn shutdown(mut self) {
        let (closed, _) = mpsc::channel();
        self.sender = closed;
        if let Some(forwarder) = self.forwarder.take() {
            let _ = forwarder.join();
        }
    }
}
