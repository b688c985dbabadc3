pub mod client;
pub mod poller;
pub mod sink;
pub mod submit;

pub use client::{AutoContentClient, ContentApi};
pub use poller::{PollOptions, PollRegistry, StatusPoller};
pub use sink::{EventSink, JobTransition, NullSink, TracingSink};
pub use submit::SubmissionService;
