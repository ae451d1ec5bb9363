pub mod activity_log;
pub mod attendance;
pub mod dtrp;
pub mod employee;
pub mod leave_request;
pub mod overtime;
pub mod request;
pub mod role;
