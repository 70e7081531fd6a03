mod appointment;
mod availability;
mod consultant_terms;
mod notification;

pub use appointment::*;
pub use availability::*;
pub use consultant_terms::*;
pub use notification::*;
