//! Named-event publish/subscribe decoupling storage mutations from
//! listeners (text-index updates, analytics, external collaborators).

pub mod bus;

pub use bus::{EventBus, EventPayload, FilteredView, ListenerId, Namespace};
