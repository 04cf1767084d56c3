//! MIDI input: port enumeration, connection and note message decoding.
//!
//! Decoded notes are sent over a channel and drained by the render loop, so
//! the midir callback thread never touches visual state.

use anyhow::{anyhow, Context};
use midir::{MidiInput, MidiInputConnection};
use std::sync::mpsc::Sender;
use std::time::Instant;
use viz_core::{NoteEvent, NoteInput};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

pub fn list_ports() -> anyhow::Result<Vec<String>> {
    let midi_in = MidiInput::new("viz-enumerate").context("failed to create MIDI input")?;
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {i}"))
        })
        .collect())
}

/// Connect to the port named by `selector` (an index or a name fragment),
/// or the first port when `selector` is `None`. Returns `Ok(None)` when no
/// ports exist. The connection must be kept alive for notes to flow.
pub fn connect(
    selector: Option<&str>,
    clock: Instant,
    tx: Sender<NoteInput>,
) -> anyhow::Result<Option<MidiInputConnection<()>>> {
    let midi_in = MidiInput::new("viz-input").context("failed to create MIDI input")?;
    let ports = midi_in.ports();
    if ports.is_empty() {
        log::warn!("[midi] no input ports available");
        return Ok(None);
    }
    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_default())
        .collect();
    let index = match selector {
        None => 0,
        Some(sel) => select_port(&names, sel)
            .ok_or_else(|| anyhow!("no MIDI port matches '{sel}' (have: {})", names.join(", ")))?,
    };
    let name = names[index].clone();
    log::info!("[midi] connecting to {name}");

    let connection = midi_in
        .connect(
            &ports[index],
            "viz-midi-in",
            move |_stamp, message, _| {
                let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
                if let Some(input) = decode(message, now_ms) {
                    // receiver gone means the window closed
                    let _ = tx.send(input);
                }
            },
            (),
        )
        .map_err(|e| anyhow!("failed to connect to MIDI port {name}: {e}"))?;
    Ok(Some(connection))
}

fn select_port(names: &[String], selector: &str) -> Option<usize> {
    if let Ok(i) = selector.parse::<usize>() {
        return (i < names.len()).then_some(i);
    }
    let wanted = selector.to_lowercase();
    names.iter().position(|n| n.to_lowercase().contains(&wanted))
}

/// Decode a raw MIDI message. Note-on with velocity 0 is a note-off; every
/// other message type is ignored.
pub fn decode(message: &[u8], timestamp_ms: f64) -> Option<NoteInput> {
    let [status, note, velocity, ..] = *message else {
        return None;
    };
    let ev = NoteEvent::new((note & 0x7F) as i32, (velocity & 0x7F) as i32, timestamp_ms);
    match status & 0xF0 {
        NOTE_ON if ev.velocity > 0 => Some(NoteInput::On(ev)),
        NOTE_ON | NOTE_OFF => {
            log::trace!("[midi] note off {}", ev.note);
            Some(NoteInput::Off(ev))
        }
        _ => None,
    }
}
