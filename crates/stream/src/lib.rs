pub mod event;
pub mod transport;
pub mod wire;

pub use event::{ContentBlock, Event, EventKind, Task, TaskStatus, tasks_from_input};
pub use transport::{AgentSession, SessionOptions, TransportError};
pub use wire::parse_line;
