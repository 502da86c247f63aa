// Purpose: Voice management, polyphony, note and parameter handling
// This layer sits above the DSP primitives and owns the voice pool

pub mod allocator;
#[cfg(feature = "rtrb")]
pub mod handle;
pub mod message;
pub mod params;
pub mod poly;
pub mod voice;

pub use allocator::VoiceAllocator;
#[cfg(feature = "rtrb")]
pub use handle::SynthHandle;
pub use message::{MessageReceiver, NoMessages, NoteEvent, SynthMessage};
pub use params::{ParamId, VoiceParams};
pub use poly::{EngineStatus, ModalSynth};
pub use voice::{Voice, VoiceState};
