use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::EngineConfig,
    error::{check_note, check_velocity, EngineError},
    synth::{
        message::{NoteEvent, SynthMessage},
        params::ParamId,
        poly::{EngineStatus, ModalSynth},
    },
};

/// Capacity of the control → audio command queue.
pub const CONTROL_QUEUE_SIZE: usize = 1024;

/// Control-thread side of a [`ModalSynth`].
///
/// Validates everything before it reaches the queue, so the audio thread
/// only ever sees well-formed commands.
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
    status: Arc<EngineStatus>,
}

impl ModalSynth<Consumer<SynthMessage>> {
    /// Build and prepare an engine together with its control handle.
    pub fn with_queue(config: EngineConfig) -> Result<(Self, SynthHandle), EngineError> {
        config.validate()?;

        let (tx, rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE_SIZE);
        let mut synth = ModalSynth::new(&config, rx);
        synth.prepare(config.sample_rate, config.max_block_size)?;

        let handle = SynthHandle {
            tx,
            status: synth.status(),
        };
        Ok((synth, handle))
    }
}

impl SynthHandle {
    pub fn note_on(&mut self, note: u8, velocity: f32) -> Result<(), EngineError> {
        self.note_on_at(note, velocity, 0)
    }

    /// Note-on placed `offset` samples into the block that picks it up.
    pub fn note_on_at(&mut self, note: u8, velocity: f32, offset: usize) -> Result<(), EngineError> {
        check_note(note).and_then(|_| check_velocity(velocity)).inspect_err(|err| {
            tracing::warn!(note, velocity, %err, "note-on rejected");
        })?;
        self.send(SynthMessage::Note(NoteEvent::note_on(note, velocity).at(offset)))
    }

    pub fn note_off(&mut self, note: u8, release_velocity: f32) -> Result<(), EngineError> {
        self.note_off_at(note, release_velocity, 0)
    }

    pub fn note_off_at(
        &mut self,
        note: u8,
        release_velocity: f32,
        offset: usize,
    ) -> Result<(), EngineError> {
        check_note(note)
            .and_then(|_| check_velocity(release_velocity))
            .inspect_err(|err| {
                tracing::warn!(note, release_velocity, %err, "note-off rejected");
            })?;
        self.send(SynthMessage::Note(
            NoteEvent::note_off(note, release_velocity).at(offset),
        ))
    }

    /// Set a parameter by string id. Unknown ids and non-finite values are
    /// reported here rather than silently dropped on the audio thread.
    pub fn set_parameter(&mut self, id: &str, value: f32) -> Result<(), EngineError> {
        let param = id.parse::<ParamId>().inspect_err(|err| {
            tracing::warn!(id, %err, "parameter rejected");
        })?;
        if !value.is_finite() {
            tracing::warn!(id, value, "non-finite parameter value rejected");
            return Err(EngineError::InvalidParameterValue {
                param: param.id(),
                value,
            });
        }
        self.send(SynthMessage::SetParam { param, value })
    }

    /// Forward an already-built message, e.g. one translated from MIDI, with
    /// the same checks as the typed methods.
    pub fn send_message(&mut self, msg: SynthMessage) -> Result<(), EngineError> {
        match msg {
            SynthMessage::Note(NoteEvent::NoteOn {
                note,
                velocity,
                offset,
            }) => self.note_on_at(note, velocity, offset),
            SynthMessage::Note(NoteEvent::NoteOff {
                note,
                release_velocity,
                offset,
            }) => self.note_off_at(note, release_velocity, offset),
            SynthMessage::SetParam { param, value } => self.set_parameter(param.id(), value),
            SynthMessage::AllNotesOff | SynthMessage::Panic => self.send(msg),
        }
    }

    /// Soft release of every held note.
    pub fn all_notes_off(&mut self) -> Result<(), EngineError> {
        self.send(SynthMessage::AllNotesOff)
    }

    /// Hard mute, applied at the start of the next block.
    pub fn panic(&mut self) -> Result<(), EngineError> {
        self.send(SynthMessage::Panic)
    }

    /// Voice count as of the last rendered block.
    pub fn active_voice_count(&self) -> usize {
        self.status.active_voices()
    }

    pub fn dropped_events(&self) -> u64 {
        self.status.dropped_events()
    }

    fn send(&mut self, msg: SynthMessage) -> Result<(), EngineError> {
        self.tx.push(msg).map_err(|_| {
            tracing::warn!(?msg, "control queue full");
            EngineError::EventQueueFull
        })
    }
}
