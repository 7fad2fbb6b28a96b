pub mod crop_resolver;
pub mod telemetry;
