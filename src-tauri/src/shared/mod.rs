pub mod emit;
pub mod error;
pub mod events;
pub mod observable;
pub mod settings;
pub mod types;
