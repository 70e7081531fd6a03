//! Appointment scheduling core.
//!
//! Weekly availability templates are turned into concrete slots for a date,
//! reconciled against booked appointments and guarded against double
//! booking. The pure pieces ([`slots`], [`resolver`], [`transitions`]) do no
//! I/O; [`SchedulingService`] ties them to the stores.

pub mod clock;
mod error;
pub mod resolver;
mod service;
pub mod slots;
pub mod sweep;
mod transitions;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{SchedulingError, SchedulingResult};
pub use resolver::{SlotRejection, SlotView};
pub use service::{SchedulingService, SlotCheck};
pub use transitions::Transition;
