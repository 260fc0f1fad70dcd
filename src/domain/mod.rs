// Domain layer: records flowing through the correlator and the ports the pipeline depends on.

pub mod model;
pub mod ports;
