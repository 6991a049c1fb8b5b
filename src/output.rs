//! Scene output: each drawn frame becomes one JSON line.

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;

use std::io::Write;

use geometry::render::{Renderer, Scene};

/// A [`Renderer`] that serializes every frame it is asked to draw.
pub struct SceneWriter<W: Write> {
    out: W,
    frames: usize,
}

impl<W: Write> SceneWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl<W: Write> Renderer for SceneWriter<W> {
    type Error = serde_json::Error;

    fn draw(&mut self, scene: &Scene) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.out, scene)?;
        self.out.write_all(b"\n").map_err(serde_json::Error::io)?;
        self.out.flush().map_err(serde_json::Error::io)?;
        self.frames += 1;
        Ok(())
    }
}
