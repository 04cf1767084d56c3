//! Computer keyboard as a fallback note source.
//!
//! The home row plays a chromatic octave from C (A W S E D F T G Y H U J K),
//! Z/X shift the octave and 1-6 pick the layer.

use std::collections::HashMap;
use viz_core::{LayerKind, NoteEvent, NoteInput};
use winit::keyboard::KeyCode;

const BASE_NOTE: i32 = 60;
const KEY_VELOCITY: i32 = 100;
const OCTAVE_RANGE: i32 = 4;

pub enum KeyAction {
    Note(NoteInput),
    Layer(LayerKind),
    Octave(i32),
}

fn semitone(code: KeyCode) -> Option<i32> {
    Some(match code {
        KeyCode::KeyA => 0,
        KeyCode::KeyW => 1,
        KeyCode::KeyS => 2,
        KeyCode::KeyE => 3,
        KeyCode::KeyD => 4,
        KeyCode::KeyF => 5,
        KeyCode::KeyT => 6,
        KeyCode::KeyG => 7,
        KeyCode::KeyY => 8,
        KeyCode::KeyH => 9,
        KeyCode::KeyU => 10,
        KeyCode::KeyJ => 11,
        KeyCode::KeyK => 12,
        _ => return None,
    })
}

fn layer(code: KeyCode) -> Option<LayerKind> {
    let i = match code {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        _ => return None,
    };
    LayerKind::ALL.get(i).copied()
}

#[derive(Default)]
pub struct Keyboard {
    octave: i32,
    // the note each key started, so octave shifts never orphan a release
    sounding: HashMap<KeyCode, u8>,
}

impl Keyboard {
    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn press(&mut self, code: KeyCode, now_ms: f64) -> Option<KeyAction> {
        if let Some(kind) = layer(code) {
            return Some(KeyAction::Layer(kind));
        }
        match code {
            KeyCode::KeyZ => {
                self.octave = (self.octave - 1).max(-OCTAVE_RANGE);
                return Some(KeyAction::Octave(self.octave));
            }
            KeyCode::KeyX => {
                self.octave = (self.octave + 1).min(OCTAVE_RANGE);
                return Some(KeyAction::Octave(self.octave));
            }
            _ => {}
        }
        let st = semitone(code)?;
        if self.sounding.contains_key(&code) {
            return None;
        }
        let ev = NoteEvent::new(BASE_NOTE + self.octave * 12 + st, KEY_VELOCITY, now_ms);
        self.sounding.insert(code, ev.note);
        Some(KeyAction::Note(NoteInput::On(ev)))
    }

    pub fn release(&mut self, code: KeyCode, now_ms: f64) -> Option<KeyAction> {
        let note = self.sounding.remove(&code)?;
        let ev = NoteEvent::new(note as i32, KEY_VELOCITY, now_ms);
        Some(KeyAction::Note(NoteInput::Off(ev)))
    }
}
