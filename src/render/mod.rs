//! Rendering pipeline.

pub mod renderer;

pub use renderer::InPlaceRenderer;
