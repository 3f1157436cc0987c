pub mod language;
pub mod pipeline;
pub mod request;
pub mod transport;
