pub mod appointment;
pub mod client;
pub mod enums;
pub mod filters;
pub mod professional;
pub mod service;
pub mod slot;

pub use appointment::*;
pub use client::*;
pub use enums::*;
pub use filters::*;
pub use professional::*;
pub use service::*;
pub use slot::*;
