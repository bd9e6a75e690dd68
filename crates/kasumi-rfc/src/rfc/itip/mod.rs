//! iTIP scheduling (RFC 5546): methods, messages and the organizer-side
//! broker that derives messages from object changes.

mod broker;
mod message;
mod method;

pub use broker::{Broker, BrokerOptions};
pub use message::{Message, PENDING_STATUS};
pub use method::Method;
