pub mod approval;
pub mod conflict;
pub mod lifecycle;
pub mod notifications;
pub mod productivity;
pub mod status;
