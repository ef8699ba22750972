// Domain layer: camp records, export rows and the ports the pipeline is built on.

pub mod model;
pub mod ports;
