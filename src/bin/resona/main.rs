//! resona - plays a short arpeggio on the default output device
//!
//! Run with: cargo run --bin resona

use std::{thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use resona::{
    io::{
        midi::{MidiEvent, CC_ALL_NOTES_OFF},
        midi_to_synth,
    },
    synth::{ModalSynth, SynthHandle},
    EngineConfig, MAX_BLOCK_SIZE,
};

const BLOCK_SIZE: usize = 512;
const MIDI_CHANNEL: u8 = 0;
const ARPEGGIO: [u8; 8] = [60, 64, 67, 71, 72, 71, 67, 64];

/// Feed one raw MIDI message through the adapter into the engine.
fn play_midi(handle: &mut SynthHandle, bytes: &[u8]) -> EyreResult<()> {
    match MidiEvent::parse(bytes).and_then(|event| midi_to_synth(event, MIDI_CHANNEL)) {
        Some(msg) => handle.send_message(msg)?,
        None => tracing::debug!(?bytes, "midi message ignored"),
    }
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt().with_target(false).init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (mut synth, mut handle) = ModalSynth::with_queue(EngineConfig {
        sample_rate,
        max_block_size: BLOCK_SIZE.min(MAX_BLOCK_SIZE),
        polyphony: 16,
    })?;

    handle.set_parameter("decayMs", 2_500.0)?;
    handle.set_parameter("exciterColor", 6_000.0)?;
    handle.set_parameter("feedbackAmount", 0.4)?;
    handle.set_parameter("feedbackTracking", 1.0)?;

    tracing::info!(sample_rate, channels, "opening output stream");

    let mut left = vec![0.0f32; BLOCK_SIZE];
    let mut right = vec![0.0f32; BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(BLOCK_SIZE);
                {
                    let mut outputs: [&mut [f32]; 2] = [&mut left[..frames], &mut right[..frames]];
                    synth.process(&mut outputs, frames);
                }

                let out_off = frames_written * channels;
                for i in 0..frames {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = if ch % 2 == 0 { left[i] } else { right[i] };
                    }
                }

                frames_written += frames;
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;

    let note_on = 0x90 | MIDI_CHANNEL;
    let note_off = 0x80 | MIDI_CHANNEL;
    for (step, &note) in ARPEGGIO.iter().enumerate() {
        let velocity = if step % 2 == 0 { 64 } else { 127 };
        play_midi(&mut handle, &[note_on, note, velocity])?;
        thread::sleep(Duration::from_millis(250));
        play_midi(&mut handle, &[note_off, note, 0])?;
        tracing::info!(note, voices = handle.active_voice_count(), "note played");
    }

    thread::sleep(Duration::from_secs(3));
    play_midi(&mut handle, &[0xB0 | MIDI_CHANNEL, CC_ALL_NOTES_OFF, 0])?;
    thread::sleep(Duration::from_millis(500));
    Ok(())
}
