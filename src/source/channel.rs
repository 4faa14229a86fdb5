//! Channel-based report source.
//!
//! Receives node reports via a tokio mpsc channel. This is how a receiver
//! that accepts agent uploads (in any order, from any number of tasks)
//! hands them to collection without touching the filesystem.

use tokio::sync::mpsc;

use super::{NodeReport, ReportSource};

/// A source that receives node reports via a channel.
///
/// # Example
///
/// ```
/// use fleetmap::{ChannelSource, NodeReport, ReportSource};
///
/// let (tx, mut source) = ChannelSource::create("uploads", 16);
/// tx.try_send(NodeReport::from_text("web-1", "", "")).unwrap();
/// assert_eq!(source.poll().unwrap().node, "web-1");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<NodeReport>,
    description: String,
    disconnected: bool,
}

impl ChannelSource {
    /// Create a new channel source from the receiving end of a channel.
    pub fn new(receiver: mpsc::Receiver<NodeReport>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            disconnected: false,
        }
    }

    /// Create a channel pair; the sender goes to whatever accepts uploads.
    pub fn create(source_description: &str, capacity: usize) -> (mpsc::Sender<NodeReport>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, source_description))
    }
}

impl ReportSource for ChannelSource {
    fn poll(&mut self) -> Option<NodeReport> {
        match self.receiver.try_recv() {
            Ok(report) => Some(report),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.disconnected
    }

    fn description(&self) -> &str {
        &self.description
    }

    /// Every message on the channel is already a report; a closed channel
    /// just finishes the source.
    fn error(&self) -> Option<&str> {
        None
    }
}
