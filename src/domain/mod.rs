// Domain layer: models, statistics and pure computations. No I/O here.

pub mod analysis;
pub mod dashboard;
pub mod model;
pub mod ports;
pub mod statistics;
pub mod synthetic;
