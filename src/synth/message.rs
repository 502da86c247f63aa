#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::synth::params::ParamId;

/// A note event placed `offset` samples into the next block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NoteEvent {
    NoteOn { note: u8, velocity: f32, offset: usize },
    NoteOff { note: u8, release_velocity: f32, offset: usize },
}

impl NoteEvent {
    pub fn note_on(note: u8, velocity: f32) -> Self {
        NoteEvent::NoteOn {
            note,
            velocity,
            offset: 0,
        }
    }

    pub fn note_off(note: u8, release_velocity: f32) -> Self {
        NoteEvent::NoteOff {
            note,
            release_velocity,
            offset: 0,
        }
    }

    pub fn at(mut self, sample_offset: usize) -> Self {
        match &mut self {
            NoteEvent::NoteOn { offset, .. } | NoteEvent::NoteOff { offset, .. } => {
                *offset = sample_offset;
            }
        }
        self
    }

    pub fn offset(&self) -> usize {
        match *self {
            NoteEvent::NoteOn { offset, .. } | NoteEvent::NoteOff { offset, .. } => offset,
        }
    }

    pub fn note(&self) -> u8 {
        match *self {
            NoteEvent::NoteOn { note, .. } | NoteEvent::NoteOff { note, .. } => note,
        }
    }
}

/// Commands sent from the control thread to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Note(NoteEvent),
    SetParam { param: ParamId, value: f32 },
    /// Soft release of every held note.
    AllNotesOff,
    /// Hard mute of every voice.
    Panic,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Receiver for engines driven only through direct calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}
