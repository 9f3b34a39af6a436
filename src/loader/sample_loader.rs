use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::audio::{SampleBuffer, SampleId, SamplerBridge};
use crate::audio_api::AudioCommand;
use crate::sequencer::Pitch;

// Every `<pitch>.wav` in `dir` (A1.wav, C2.wav, ...), lowest pitch first.
// Files whose stem isn't a pitch are skipped.
pub fn index_pitched_wavs(dir: &Path) -> anyhow::Result<Vec<(Pitch, PathBuf)>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if !is_wav {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        match stem.parse::<Pitch>() {
            Ok(pitch) => found.push((pitch, path)),
            Err(_) => log::debug!("ignoring {}: name is not a pitch", path.display()),
        }
    }
    found.sort_by_key(|(p, _)| p.midi());
    Ok(found)
}

// Load a WAV from disk, prepare for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<(SampleId, SampleBuffer)> {
    let buffer = SampleBuffer::load_wav(path, target_rate)?;
    Ok((SampleId::next(), buffer))
}

/// Loads the sample set into the bridge's sampler and queues the engine
/// registrations. A bad file is logged and skipped; returns how many loaded.
pub fn load_sample_set(dir: &Path, target_rate: u32, bridge: &mut SamplerBridge) -> anyhow::Result<usize> {
    let mut loaded = 0;
    for (pitch, path) in index_pitched_wavs(dir)? {
        match load(&path, target_rate) {
            Ok((id, buffer)) => {
                log::info!("sample {pitch}: {} ({} frames)", path.display(), buffer.len());
                bridge.queue(AudioCommand::RegisterSample { id, buffer });
                bridge.sampler_mut().add(pitch, id);
                loaded += 1;
            }
            Err(e) => log::warn!("could not load {}: {e:#}", path.display()),
        }
    }
    Ok(loaded)
}
