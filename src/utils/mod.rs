pub mod constants;
mod timeout;
mod wait_for_element;

pub use timeout::{validate_navigation_timeout, validate_settle_timeout};
pub use wait_for_element::wait_for_any;
