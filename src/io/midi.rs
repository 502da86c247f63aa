#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

/// CC 120: silence everything immediately.
pub const CC_ALL_SOUND_OFF: u8 = 120;
/// CC 123: release every held note.
pub const CC_ALL_NOTES_OFF: u8 = 123;

impl MidiEvent {
    /// Decode one channel-voice message from raw bytes.
    ///
    /// System messages and statuses the engine has no use for (program
    /// change, pitch bend, aftertouch) yield `None`. Note-on with
    /// velocity 0 is kept as a note-on here; the converter treats it as a
    /// note-off.
    pub fn parse(data: &[u8]) -> Option<MidiEvent> {
        let status_byte = *data.first()?;
        if status_byte < 0x80 || status_byte >= 0xF0 {
            return None;
        }

        let channel = status_byte & 0x0F;
        let data1 = data.get(1).copied().unwrap_or(0) & 0x7F;
        let data2 = data.get(2).copied().unwrap_or(0) & 0x7F;

        match status_byte & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data1,
                velocity: data2,
            }),
            0x90 => Some(MidiEvent::NoteOn {
                channel,
                key: data1,
                velocity: data2,
            }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            _ => None,
        }
    }
}
