pub use crate::audio::{EffectSpec, SampleBuffer, SampleId};

#[derive(Clone, Debug)]
pub struct TriggerParams {
    pub sample_id: SampleId,
    pub rate: f32, // playback speed, 2.0 = an octave up
    pub gain: f32,
    pub effect_chain: Vec<EffectSpec>,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // Decoding happens on the UI side; the engine only ever receives ready
    // buffers, then refers to them by id.
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    Trigger(TriggerParams),

    // cut every sounding voice, used when switching gardens
    Silence,
}
