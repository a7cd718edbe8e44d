// Domain layer: records exchanged with the backend and the ports the core depends on.

pub mod model;
pub mod ports;
