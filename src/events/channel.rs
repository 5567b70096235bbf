//! Crossbeam-backed event channel.
//!
//! The session and pipeline publish through an [`EventSender`]; a CLI
//! spinner or a GUI listens on the matching [`EventReceiver`] from its
//! own thread.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Publishing end, cloned freely into worker threads.
///
/// A disabled sender (see [`null_sender`]) has no channel at all, so
/// publishing costs nothing when nobody listens.
#[derive(Clone, Default)]
pub struct EventSender {
    channel: Option<Sender<Event>>,
}

impl EventSender {
    /// Publish an event. Dropped once the receiver is gone.
    pub fn send(&self, event: Event) {
        if let Some(channel) = &self.channel {
            let _ = channel.send(event);
        }
    }
}

/// Listening end of an [`EventChannel`]
pub struct EventReceiver {
    channel: Receiver<Event>,
}

impl EventReceiver {
    /// Events in publish order; ends when every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.channel.iter()
    }
}

/// Unbounded channel between the session and a UI.
pub struct EventChannel;

impl EventChannel {
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender {
                channel: Some(sender),
            },
            EventReceiver { channel: receiver },
        )
    }
}

/// Sender for callers that do not listen to events
pub fn null_sender() -> EventSender {
    EventSender::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, PipelineStage, RegistryEvent};
    use std::thread;

    #[test]
    fn events_arrive_in_order_from_another_thread() {
        let (sender, receiver) = EventChannel::new();

        let worker = thread::spawn(move || {
            sender.send(Event::Registry(RegistryEvent::SignatureStored {
                name: "alice".to_string(),
                replaced: false,
            }));
            sender.send(Event::Registry(RegistryEvent::LookupFailed {
                name: "bob".to_string(),
            }));
        });
        worker.join().unwrap();

        let events: Vec<Event> = receiver.iter().collect();

        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            Event::Registry(RegistryEvent::SignatureStored { name, .. }) if name == "alice"
        ));
        assert!(matches!(
            &events[1],
            Event::Registry(RegistryEvent::LookupFailed { name }) if name == "bob"
        ));
    }

    #[test]
    fn null_sender_has_no_channel() {
        let sender = null_sender();

        sender.send(Event::Pipeline(PipelineEvent::StageCompleted {
            stage: PipelineStage::Grayscale,
        }));

        assert!(sender.channel.is_none());
    }

    #[test]
    fn send_after_receiver_dropped_is_ignored() {
        let (sender, receiver) = EventChannel::new();
        drop(receiver);

        sender.send(Event::Pipeline(PipelineEvent::StageCompleted {
            stage: PipelineStage::Resize,
        }));
    }
}
