//! Schedule renderer: the half-hour grid, clock glyphs, and line layout.

pub mod clock;
pub mod glyph;
pub mod render;

#[cfg(test)]
mod test_properties;
