//! The host surface scenes draw on: z-ordered canvas layers, pending frame requests and
//! compiled fragment programs, all owned in one place so teardown can be checked.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::ui::canvas::Canvas;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("terminal cannot display shaded layers")]
    ShadingUnavailable,
    #[error("layer {0:?} is not attached")]
    UnknownLayer(LayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramId(u32);

#[derive(Debug)]
struct Layer {
    id: LayerId,
    z: i32,
    canvas: Canvas,
}

#[derive(Debug)]
pub struct Stage {
    width: u16,
    height: u16,
    shading: bool,
    seed: u64,
    next_id: u32,
    layers: Vec<Layer>,
    frames: BTreeSet<LayerId>,
    programs: BTreeMap<ProgramId, LayerId>,
}

impl Stage {
    #[must_use]
    pub fn new(width: u16, height: u16, shading: bool) -> Self {
        Self {
            width,
            height,
            shading,
            seed: 0x5eed_cafe,
            next_id: 1,
            layers: Vec::new(),
            frames: BTreeSet::new(),
            programs: BTreeMap::new(),
        }
    }

    /// Fixes the base seed renderers draw their particle layouts from.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn supports_shading(&self) -> bool {
        self.shading
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Seed for a freshly built particle set; differs per call but is reproducible per stage.
    pub fn layout_seed(&mut self) -> u64 {
        let salt = u64::from(self.next_id());
        self.seed ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }

    /// Resizes the stage and every attached layer.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        for layer in &mut self.layers {
            layer.canvas.resize(width, height);
        }
    }

    pub fn attach_layer(&mut self, z: i32) -> LayerId {
        let id = LayerId(self.next_id());
        let idx = self.layers.partition_point(|layer| layer.z <= z);
        self.layers.insert(
            idx,
            Layer {
                id,
                z,
                canvas: Canvas::new(self.width, self.height),
            },
        );
        id
    }

    /// Removes the layer along with its frame request and any programs bound to it.
    pub fn detach_layer(&mut self, id: LayerId) {
        self.layers.retain(|layer| layer.id != id);
        self.frames.remove(&id);
        self.programs.retain(|_, owner| *owner != id);
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    pub fn canvas_mut(&mut self, id: LayerId) -> Result<&mut Canvas, StageError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .map(|layer| &mut layer.canvas)
            .ok_or(StageError::UnknownLayer(id))
    }

    #[must_use]
    pub fn canvas(&self, id: LayerId) -> Option<&Canvas> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .map(|layer| &layer.canvas)
    }

    /// z values of attached layers, bottom first.
    #[must_use]
    pub fn layer_order(&self) -> Vec<i32> {
        self.layers.iter().map(|layer| layer.z).collect()
    }

    /// At most one pending request per layer; repeated requests collapse.
    pub fn request_frame(&mut self, id: LayerId) {
        if self.has_layer(id) {
            self.frames.insert(id);
        }
    }

    pub fn cancel_frame(&mut self, id: LayerId) {
        self.frames.remove(&id);
    }

    /// Consumes the request for `id`; true when one was pending.
    pub fn take_frame(&mut self, id: LayerId) -> bool {
        self.frames.remove(&id)
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn create_program(&mut self, layer: LayerId) -> Result<ProgramId, StageError> {
        if !self.shading {
            return Err(StageError::ShadingUnavailable);
        }
        if !self.has_layer(layer) {
            return Err(StageError::UnknownLayer(layer));
        }
        let id = ProgramId(self.next_id());
        self.programs.insert(id, layer);
        Ok(id)
    }

    pub fn delete_program(&mut self, id: ProgramId) {
        self.programs.remove(&id);
    }

    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Flattens all layers bottom to top into one canvas.
    #[must_use]
    pub fn compose(&self) -> Canvas {
        let mut out = Canvas::new(self.width, self.height);
        for layer in &self.layers {
            layer.canvas.composite_onto(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::canvas::{BlendMode, Rgba};

    #[test]
    fn layers_are_kept_in_z_order() {
        let mut stage = Stage::new(4, 2, true);
        stage.attach_layer(2);
        stage.attach_layer(0);
        stage.attach_layer(1);
        assert_eq!(stage.layer_order(), vec![0, 1, 2]);
    }

    #[test]
    fn detaching_drops_frames_and_programs() {
        let mut stage = Stage::new(4, 2, true);
        let layer = stage.attach_layer(0);
        stage.request_frame(layer);
        stage.create_program(layer).unwrap();
        stage.detach_layer(layer);
        assert_eq!(stage.layer_count(), 0);
        assert_eq!(stage.pending_frames(), 0);
        assert_eq!(stage.program_count(), 0);
    }

    #[test]
    fn frame_requests_collapse_and_are_consumed() {
        let mut stage = Stage::new(4, 2, true);
        let layer = stage.attach_layer(0);
        stage.request_frame(layer);
        stage.request_frame(layer);
        assert_eq!(stage.pending_frames(), 1);
        assert!(stage.take_frame(layer));
        assert!(!stage.take_frame(layer));
    }

    #[test]
    fn requests_for_missing_layers_are_ignored() {
        let mut stage = Stage::new(4, 2, true);
        let layer = stage.attach_layer(0);
        stage.detach_layer(layer);
        stage.request_frame(layer);
        assert_eq!(stage.pending_frames(), 0);
        assert_eq!(stage.canvas_mut(layer).err(), Some(StageError::UnknownLayer(layer)));
    }

    #[test]
    fn programs_need_shading() {
        let mut stage = Stage::new(4, 2, false);
        let layer = stage.attach_layer(0);
        assert_eq!(
            stage.create_program(layer),
            Err(StageError::ShadingUnavailable)
        );
    }

    #[test]
    fn resize_reaches_every_layer() {
        let mut stage = Stage::new(4, 2, true);
        let a = stage.attach_layer(0);
        let b = stage.attach_layer(1);
        stage.resize(10, 5);
        for id in [a, b] {
            let canvas = stage.canvas(id).unwrap();
            assert_eq!((canvas.width(), canvas.height()), (10, 5));
        }
    }

    #[test]
    fn compose_stacks_upper_layers_last() {
        let mut stage = Stage::new(1, 1, true);
        let low = stage.attach_layer(0);
        let high = stage.attach_layer(1);
        stage
            .canvas_mut(high)
            .unwrap()
            .fill_rect_px(0.0, 0.0, 8.0, 16.0, Rgba::new(0, 0, 255, 1.0), BlendMode::Normal);
        stage
            .canvas_mut(low)
            .unwrap()
            .fill_rect_px(0.0, 0.0, 8.0, 16.0, Rgba::new(255, 0, 0, 1.0), BlendMode::Normal);
        let out = stage.compose();
        assert_eq!(out.cell(0, 0).unwrap().bg.rgb().b, 255);
    }

    #[test]
    fn layout_seeds_are_reproducible_per_stage() {
        let mut a = Stage::new(1, 1, true).with_seed(7);
        let mut b = Stage::new(1, 1, true).with_seed(7);
        let first = a.layout_seed();
        assert_eq!(first, b.layout_seed());
        assert_ne!(first, a.layout_seed());
    }
}
