use crate::{
    io::midi::{MidiEvent, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF},
    synth::message::{NoteEvent, SynthMessage},
};

/// Translate a MIDI event on `channel_filter` into an engine message.
///
/// Note-on with velocity 0 becomes a note-off. CC 120 (all sound off) maps
/// to a panic and CC 123 (all notes off) to a soft release.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 0,
        } if channel == channel_filter => {
            Some(SynthMessage::Note(NoteEvent::note_off(key, 0.0)))
        }
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::Note(NoteEvent::note_on(
            key,
            midi_velocity(velocity),
        ))),
        MidiEvent::NoteOff {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::Note(NoteEvent::note_off(
            key,
            midi_velocity(velocity),
        ))),
        MidiEvent::ControlChange {
            channel,
            controller,
            ..
        } if channel == channel_filter => match controller {
            CC_ALL_SOUND_OFF => Some(SynthMessage::Panic),
            CC_ALL_NOTES_OFF => Some(SynthMessage::AllNotesOff),
            _ => None,
        },
        _ => None,
    }
}

/// 7-bit MIDI velocity to [0, 1].
pub fn midi_velocity(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
