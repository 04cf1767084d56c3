mod cli;
mod gpu;
mod keys;
mod midi;

use clap::Parser;
use std::sync::mpsc;
use std::time::Instant;
use viz_core::constants::MAX_FRAME_DT_MS;
use viz_core::{LayerOptions, LayerStack};
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use cli::Args;
use gpu::GpuState;
use keys::{KeyAction, Keyboard};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if args.list_midi {
        for (i, name) in midi::list_ports()?.iter().enumerate() {
            println!("{i}: {name}");
        }
        return Ok(());
    }

    let options = match args.seed {
        Some(seed) => LayerOptions::seeded(seed),
        None => LayerOptions::default(),
    };
    let mut stack = LayerStack::new(args.layer, &options)?;

    let clock = Instant::now();
    let (tx, rx) = mpsc::channel();
    let _midi_connection = if args.no_midi {
        None
    } else {
        // keyboard input still works when MIDI is unavailable
        midi::connect(args.midi_port.as_deref(), clock, tx).unwrap_or_else(|err| {
            log::warn!("[midi] {err:#}; using the computer keyboard only");
            None
        })
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(format!("Layered Visualizer - {}", stack.active_kind()))
        .with_inner_size(LogicalSize::new(1280.0, 720.0))
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let size = window.inner_size();
    stack.resize(size.width, size.height);

    let mut keyboard = Keyboard::default();
    let mut last_frame_ms = 0.0;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => {
            gpu.resize(size);
            stack.resize(size.width, size.height);
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => {
            if code == KeyCode::Escape {
                elwt.exit();
                return;
            }
            let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
            let action = match state {
                ElementState::Pressed => keyboard.press(code, now_ms),
                ElementState::Released => keyboard.release(code, now_ms),
            };
            match action {
                Some(KeyAction::Note(input)) => stack.queue(input),
                Some(KeyAction::Layer(kind)) => {
                    stack.select(kind);
                    gpu.window.set_title(&format!("Layered Visualizer - {kind}"));
                }
                Some(KeyAction::Octave(octave)) => log::info!("[keys] octave {octave:+}"),
                None => {}
            }
        }
        Event::AboutToWait => {
            for input in rx.try_iter() {
                stack.queue(input);
            }
            let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
            let delta_ms = now_ms - last_frame_ms;
            last_frame_ms = now_ms;
            if delta_ms > MAX_FRAME_DT_MS {
                log::debug!("[frame] long frame ({delta_ms:.1} ms) clamped");
            }
            stack.advance(delta_ms, now_ms);

            match gpu.render(&stack.frame()) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(err) => log::debug!("[gpu] skipped frame: {err}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}
