use std::collections::HashMap;

use crate::audio_api::{AudioCommand, TriggerParams};

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::Voice;

pub const MAX_VOICES: usize = 32; // oldest voice is stolen past this
pub const MAX_BLOCK: usize = 1024;
const MASTER_GAIN: f32 = 0.6;

pub struct Engine {
    samples: HashMap<SampleId, SampleBuffer>,
    voices: Vec<Voice>,
    scratch: Vec<StereoFrame>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
            voices: Vec::with_capacity(MAX_VOICES),
            scratch: vec![StereoFrame::zero(); MAX_BLOCK],
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::Trigger(t) => self.start_voice(t),
            AudioCommand::Silence => self.voices.clear(),
        }
    }

    fn start_voice(&mut self, t: TriggerParams) {
        if !self.samples.contains_key(&t.sample_id) {
            return;
        }
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        let effects = t.effect_chain.iter().map(|spec| spec.build()).collect();
        self.voices.push(Voice::new(t.sample_id, t.rate, t.gain, effects));
    }

    /// Fills `out` with the mix of all sounding voices.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.iter_mut().for_each(|f| *f = StereoFrame::zero());
        let Engine { samples, voices, scratch } = self;

        for chunk in out.chunks_mut(MAX_BLOCK) {
            let scratch = &mut scratch[..chunk.len()];
            for voice in voices.iter_mut() {
                let Some(buffer) = samples.get(&voice.sample_id) else {
                    continue;
                };
                voice.render(buffer, scratch);
                for (o, s) in chunk.iter_mut().zip(scratch.iter()) {
                    *o += *s;
                }
            }
        }
        voices.retain(|v| v.is_active());

        for f in out.iter_mut() {
            *f = f.scaled(MASTER_GAIN).map(|x| x.clamp(-1.0, 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(engine: &mut Engine, len: usize, value: f32) -> SampleId {
        let id = SampleId::next();
        engine.handle_cmd(AudioCommand::RegisterSample {
            id,
            buffer: SampleBuffer { data: vec![StereoFrame::mono(value); len] },
        });
        id
    }

    fn trigger(id: SampleId) -> AudioCommand {
        AudioCommand::Trigger(TriggerParams {
            sample_id: id,
            rate: 1.0,
            gain: 1.0,
            effect_chain: Vec::new(),
        })
    }

    #[test]
    fn voices_mix_and_expire() {
        let mut engine = Engine::new();
        let id = register(&mut engine, 4, 0.5);
        engine.handle_cmd(trigger(id));
        engine.handle_cmd(trigger(id));
        let mut out = vec![StereoFrame::zero(); 8];
        engine.render_block(&mut out);
        assert!((out[0].left - 1.0 * MASTER_GAIN).abs() < 1e-6);
        assert_eq!(out[5], StereoFrame::zero());
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn unknown_sample_is_ignored() {
        let mut engine = Engine::new();
        engine.handle_cmd(trigger(SampleId(u64::MAX)));
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn voice_pool_is_capped() {
        let mut engine = Engine::new();
        let id = register(&mut engine, 10_000, 0.1);
        for _ in 0..MAX_VOICES + 5 {
            engine.handle_cmd(trigger(id));
        }
        assert_eq!(engine.active_voices(), MAX_VOICES);
        engine.handle_cmd(AudioCommand::Silence);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn long_blocks_render_in_chunks() {
        let mut engine = Engine::new();
        let id = register(&mut engine, MAX_BLOCK * 3, 0.25);
        engine.handle_cmd(trigger(id));
        let mut out = vec![StereoFrame::zero(); MAX_BLOCK * 2 + 10];
        engine.render_block(&mut out);
        let expected = 0.25 * MASTER_GAIN;
        assert!((out[MAX_BLOCK * 2 + 5].left - expected).abs() < 1e-6);
        assert_eq!(engine.active_voices(), 1);
    }
}
