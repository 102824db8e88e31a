// Domain layer: record shapes and the store port. No adapters here.

pub mod model;
pub mod ports;
