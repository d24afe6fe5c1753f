//! Domain layer: wire shapes exchanged with the host and the lobby server, payment
//! value objects, and the ports through which the bridge reaches the outside world.

pub mod event;
pub mod message;
pub mod payment;
pub mod ports;
