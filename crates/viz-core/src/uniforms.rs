//! GPU layout for `field.wgsl`: one uniform block plus a flat record buffer.

use crate::layers::LayerFrame;
use crate::marshal::Record;

/// Record sets the shader can address per frame.
pub const MAX_SETS: usize = 3;
/// Size of the record storage buffer, in records.
pub const MAX_RECORDS: usize = 512;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub layer: u32,
    pub params: [[f32; 4]; 2],
    /// offset, len, kind, unused
    pub sets: [[u32; 4]; MAX_SETS],
}

/// Flatten `frame` into `records` (geometry then tint per set) and return the
/// matching uniform block. Sets past `MAX_SETS` or records past
/// `max_records` are skipped with a warning.
pub fn pack_frame(frame: &LayerFrame, records: &mut Vec<Record>, max_records: usize) -> FieldUniforms {
    records.clear();
    let mut uniforms = FieldUniforms {
        resolution: frame.resolution,
        time: frame.time_sec,
        layer: frame.kind.index() as u32,
        params: frame.params,
        sets: [[0; 4]; MAX_SETS],
    };
    for (i, set) in frame.sets.iter().enumerate() {
        if i >= MAX_SETS {
            log::warn!("[uniforms] {} has more than {MAX_SETS} sets", frame.kind);
            break;
        }
        let len = set.geometry.len().min(set.tint.len());
        if records.len() + 2 * len > max_records {
            log::warn!("[uniforms] set {} does not fit in the record buffer", set.name);
            continue;
        }
        let offset = records.len();
        records.extend_from_slice(&set.geometry[..len]);
        records.extend_from_slice(&set.tint[..len]);
        uniforms.sets[i] = [offset as u32, len as u32, set.kind as u32, 0];
    }
    uniforms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{create_layer, LayerKind, LayerOptions};
    use crate::note::NoteEvent;

    #[test]
    fn uniform_block_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 96);
    }

    #[test]
    fn every_layer_fits_the_record_buffer() {
        let options = LayerOptions::seeded(1);
        let mut records = Vec::new();
        for kind in LayerKind::ALL {
            let mut layer = create_layer(kind, &options).expect("layer");
            layer.note_on(&NoteEvent::new(60, 100, 0.0));
            let frame = layer.frame();
            let u = pack_frame(&frame, &mut records, MAX_RECORDS);
            assert_eq!(u.layer as usize, kind.index());
            let used: u32 = u.sets.iter().map(|s| 2 * s[1]).sum();
            assert_eq!(used as usize, records.len());
            for (set, packed) in frame.sets.iter().zip(u.sets) {
                assert_eq!(packed[1] as usize, set.geometry.len(), "{kind}: {} skipped", set.name);
                assert_eq!(records[packed[0] as usize..][..set.geometry.len()], set.geometry[..]);
            }
        }
    }

    #[test]
    fn oversized_sets_are_skipped() {
        let options = LayerOptions::seeded(1);
        let frame = create_layer(LayerKind::Solar, &options).expect("solar").frame();
        let mut records = Vec::new();
        let u = pack_frame(&frame, &mut records, 60);
        // wavefronts (24 slots) fit, flares (32) and embers (60) do not
        assert_eq!(u.sets[0][1], 24);
        assert_eq!(u.sets[1], [0; 4]);
        assert_eq!(records.len(), 48);
    }
}
