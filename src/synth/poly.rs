use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use crate::{
    config::EngineConfig,
    dsp::smooth::SmoothedValue,
    error::{check_note, check_velocity, EngineError},
    synth::{
        allocator::VoiceAllocator,
        message::{MessageReceiver, NoteEvent, SynthMessage},
        params::{ParamId, VoiceParams},
    },
};

/// Note events that can be queued for a single block.
pub const MAX_PENDING_EVENTS: usize = 256;

/// State the audio thread publishes for the control side.
#[derive(Debug, Default)]
pub struct EngineStatus {
    active_voices: AtomicUsize,
    dropped_events: AtomicU64,
}

impl EngineStatus {
    pub fn active_voices(&self) -> usize {
        self.active_voices.load(Ordering::Acquire)
    }

    /// Note events dropped because the pending buffer was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Acquire)
    }

    fn publish(&self, active_voices: usize) {
        self.active_voices.store(active_voices, Ordering::Release);
    }

    fn record_drop(&self) {
        self.dropped_events.fetch_add(1, Ordering::Release);
    }
}

/// Polyphonic modal synthesizer.
///
/// Runs entirely on the audio thread. Note events carry a sample offset and
/// are applied at that position within the next block, so timing is exact
/// regardless of block size.
pub struct ModalSynth<R: MessageReceiver> {
    allocator: VoiceAllocator,
    rx: R,
    pending: Vec<NoteEvent>,
    params: VoiceParams,
    output_gain: SmoothedValue,
    status: Arc<EngineStatus>,
    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl<R: MessageReceiver> ModalSynth<R> {
    /// Build an unprepared engine. Call `prepare` before `process`.
    pub fn new(config: &EngineConfig, rx: R) -> Self {
        let params = VoiceParams::default();
        Self {
            allocator: VoiceAllocator::new(config.voice_count()),
            rx,
            pending: Vec::with_capacity(MAX_PENDING_EVENTS),
            params,
            output_gain: SmoothedValue::new(params.output_gain),
            status: Arc::new(EngineStatus::default()),
            sample_rate: config.sample_rate,
            max_block_size: config.max_block_size,
            prepared: false,
        }
    }

    /// Allocate every buffer for the given stream format. Not realtime-safe.
    ///
    /// On error nothing changes.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> Result<(), EngineError> {
        EngineConfig {
            sample_rate,
            max_block_size,
            polyphony: self.allocator.polyphony(),
        }
        .validate()?;

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.allocator.prepare(sample_rate);
        self.allocator.set_params(&self.params);
        self.pending.clear();
        self.pending.reserve(MAX_PENDING_EVENTS);
        self.output_gain.snap(self.params.output_gain);
        self.status.publish(0);
        self.prepared = true;

        tracing::info!(
            sample_rate,
            max_block_size,
            voices = self.allocator.polyphony(),
            "modal synth prepared"
        );
        Ok(())
    }

    /// Queue a note event for the next block.
    ///
    /// Invalid notes and velocities are rejected without touching any state.
    pub fn handle_event(&mut self, event: NoteEvent) -> Result<(), EngineError> {
        if !self.prepared {
            return Err(EngineError::NotPrepared);
        }

        check_note(event.note())?;
        match event {
            NoteEvent::NoteOn { velocity, .. } => check_velocity(velocity)?,
            NoteEvent::NoteOff {
                release_velocity, ..
            } => check_velocity(release_velocity)?,
        }

        if self.pending.len() >= MAX_PENDING_EVENTS {
            return Err(EngineError::EventQueueFull);
        }
        self.pending.push(event);
        Ok(())
    }

    /// Set a parameter by string id. Unknown ids and non-finite values are
    /// ignored.
    pub fn set_parameter(&mut self, id: &str, value: f32) {
        if let Some(param) = ParamId::from_id(id) {
            self.set_param(param, value);
        }
    }

    pub fn set_param(&mut self, param: ParamId, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.params.set(param, value);
        self.allocator.set_params(&self.params);
    }

    /// Replace every voice setting at once.
    pub fn set_params(&mut self, params: &VoiceParams) {
        self.params = *params;
        self.allocator.set_params(&self.params);
    }

    /// Render `num_samples` frames into `outputs`, one slice per channel.
    ///
    /// Requests longer than the prepared maximum are rendered in chunks of at
    /// most `max_block_size`; requests longer than the shortest channel are
    /// truncated to it. An unprepared engine outputs silence.
    pub fn process(&mut self, outputs: &mut [&mut [f32]], num_samples: usize) {
        let shortest = outputs.iter().map(|c| c.len()).min().unwrap_or(0);
        let num_samples = num_samples.min(shortest);

        for channel in outputs.iter_mut() {
            channel[..num_samples].fill(0.0);
        }
        if !self.prepared {
            return;
        }

        self.drain_messages();
        sort_by_offset(&mut self.pending);

        let mut next_event = 0;
        let mut block_start = 0;
        while block_start < num_samples {
            let block_end = (block_start + self.max_block_size).min(num_samples);
            let last_block = block_end == num_samples;
            let mut cursor = block_start;

            while let Some(&event) = self.pending.get(next_event) {
                let offset = event.offset().min(num_samples);
                if offset >= block_end && !last_block {
                    break;
                }
                let offset = offset.min(block_end);
                if offset > cursor {
                    self.allocator
                        .process_range(outputs, cursor, offset - cursor);
                    cursor = offset;
                }
                self.apply_event(event);
                next_event += 1;
            }

            if block_end > cursor {
                self.allocator
                    .process_range(outputs, cursor, block_end - cursor);
            }
            self.allocator.finish_block();
            block_start = block_end;
        }

        // Zero-length calls still apply what was queued.
        while let Some(&event) = self.pending.get(next_event) {
            self.apply_event(event);
            next_event += 1;
        }
        self.pending.clear();

        self.apply_output_gain(outputs, num_samples);
        self.status.publish(self.allocator.active_voice_count());
    }

    fn apply_output_gain(&mut self, outputs: &mut [&mut [f32]], num_samples: usize) {
        self.output_gain.set_ramp_length(num_samples);
        self.output_gain.set_target(self.params.output_gain);

        if !self.output_gain.is_smoothing() {
            let gain = self.output_gain.current();
            for channel in outputs.iter_mut() {
                channel[..num_samples].iter_mut().for_each(|x| *x *= gain);
            }
            return;
        }

        for i in 0..num_samples {
            let gain = self.output_gain.next_sample();
            for channel in outputs.iter_mut() {
                channel[i] *= gain;
            }
        }
    }

    /// Hard mute: every voice Idle and pending notes discarded.
    pub fn panic(&mut self) {
        self.pending.clear();
        self.allocator.panic();
        self.status.publish(0);
    }

    pub fn active_voice_count(&self) -> usize {
        self.allocator.active_voice_count()
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    pub fn status(&self) -> Arc<EngineStatus> {
        Arc::clone(&self.status)
    }

    pub fn allocator(&self) -> &VoiceAllocator {
        &self.allocator
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::Note(event) => {
                    if self.pending.len() < MAX_PENDING_EVENTS {
                        self.pending.push(event);
                    } else {
                        self.status.record_drop();
                    }
                }
                SynthMessage::SetParam { param, value } => self.set_param(param, value),
                SynthMessage::AllNotesOff => self.allocator.release_all(),
                SynthMessage::Panic => self.panic(),
            }
        }
    }

    fn apply_event(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::NoteOn { note, velocity, .. } => self.allocator.note_on(note, velocity),
            NoteEvent::NoteOff {
                note,
                release_velocity,
                ..
            } => self.allocator.note_off(note, release_velocity),
        }
    }
}

/// Stable in-place insertion sort; the pending list is short and must not
/// allocate.
fn sort_by_offset(events: &mut [NoteEvent]) {
    for i in 1..events.len() {
        let mut j = i;
        while j > 0 && events[j - 1].offset() > events[j].offset() {
            events.swap(j - 1, j);
            j -= 1;
        }
    }
}
