pub mod api;
pub mod app;
pub mod integrations;
pub mod mask;
