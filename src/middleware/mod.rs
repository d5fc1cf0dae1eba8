pub mod request_tracking;
pub mod security_headers;

pub use request_tracking::RequestTracking;
pub use security_headers::SecurityHeaders;
