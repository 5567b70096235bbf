//! # Events Module
//!
//! Event stream so any UI (CLI, GUI, web) can follow uploads and
//! comparisons as they happen.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let mut session = Session::new().with_events(sender);
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Pipeline(PipelineEvent::StageCompleted { stage }) = event {
//!             println!("{} done", stage);
//!         }
//!     }
//! });
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
