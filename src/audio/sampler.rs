// Pitch -> sample resolution on the UI side, plus the bridge that lets the
// sequencer queue engine commands.

use crate::audio_api::{AudioCommand, TriggerParams};
use crate::pipeline::effects::EffectParams;
use crate::sequencer::{NotePlayer, Pitch, TriggerError};

use super::sample_id::SampleId;

#[derive(Clone, Debug, Default)]
pub struct Sampler {
    zones: Vec<(Pitch, SampleId)>, // root pitch of each recorded sample
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, root: Pitch, id: SampleId) {
        self.zones.retain(|(p, _)| *p != root);
        self.zones.push((root, id));
        self.zones.sort_by_key(|(p, _)| p.midi());
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.zones.iter().map(|(p, _)| *p)
    }

    /// Nearest recorded sample and the playback rate that shifts it to `pitch`.
    pub fn resolve(&self, pitch: Pitch) -> Option<(SampleId, f32)> {
        let target = pitch.midi();
        let (root, id) = self
            .zones
            .iter()
            .min_by_key(|(p, _)| (p.midi() - target).abs())?;
        let semitones = (target - root.midi()) as f32;
        Some((*id, 2f32.powf(semitones / 12.0)))
    }
}

pub struct SamplerBridge {
    sampler: Sampler,
    outbox: Vec<AudioCommand>,
}

impl SamplerBridge {
    pub fn new(sampler: Sampler) -> Self {
        Self {
            sampler,
            outbox: Vec::new(),
        }
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut Sampler {
        &mut self.sampler
    }

    pub fn queue(&mut self, cmd: AudioCommand) {
        self.outbox.push(cmd);
    }

    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.outbox)
    }
}

impl NotePlayer for SamplerBridge {
    fn trigger_note(
        &mut self,
        pitch: Pitch,
        time: f64,
        params: Option<&EffectParams>,
    ) -> Result<(), TriggerError> {
        let (sample_id, rate) = self.sampler.resolve(pitch).ok_or(TriggerError::NoSamples)?;
        let params = params.copied().unwrap_or_default();
        log::trace!("{pitch} at {time:.3}s rate {rate:.3}");
        self.outbox.push(AudioCommand::Trigger(TriggerParams {
            sample_id,
            rate,
            gain: params.gain(),
            effect_chain: params.effect_chain(),
        }));
        Ok(())
    }
}
