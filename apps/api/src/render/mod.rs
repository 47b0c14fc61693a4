// PDF export: the render-service boundary and the export endpoint.

pub mod client;
pub mod handlers;
