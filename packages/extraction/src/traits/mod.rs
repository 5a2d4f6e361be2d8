//! Seams to the external collaborators: page rendering and the model.

pub mod extractor;
pub mod renderer;
