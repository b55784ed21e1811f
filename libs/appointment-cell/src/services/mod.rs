pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod notifications;
pub mod slots;
pub mod stats;
