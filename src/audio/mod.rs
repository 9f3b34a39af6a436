use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::AudioCommand;

mod effect;
mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
pub mod sampler;
mod voice;

pub use effect::{Effect, EffectSpec};
pub use engine::Engine;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::SampleId;
pub use sampler::{Sampler, SamplerBridge};

const COMMAND_QUEUE: usize = 1024;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate().into();
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream = build_output_stream_f32(&device, &config.into(), rx, channels)?;
            stream.play().context("failed to play output stream")?;
            log::info!("audio running: {sample_rate} Hz, {channels} channels");
            Ok(AudioHandle {
                tx,
                sample_rate,
                _output_stream: stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    let mut mix = vec![StereoFrame::zero(); engine::MAX_BLOCK];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            for out in data.chunks_mut(engine::MAX_BLOCK * channels) {
                let frames = &mut mix[..out.len() / channels];
                engine.render_block(frames);
                write_interleaved(frames, out, channels);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// stereo mix -> device layout; mono devices get the average, extra channels silence
fn write_interleaved(frames: &[StereoFrame], out: &mut [f32], channels: usize) {
    for (frame, slot) in frames.iter().zip(out.chunks_exact_mut(channels)) {
        match slot {
            [mono] => *mono = (frame.left + frame.right) * 0.5,
            [left, right, rest @ ..] => {
                *left = frame.left;
                *right = frame.right;
                rest.iter_mut().for_each(|s| *s = 0.0);
            }
            [] => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaves_for_surround_and_mono() {
        let frames = [StereoFrame { left: 0.2, right: 0.4 }];
        let mut quad = [9.0f32; 4];
        write_interleaved(&frames, &mut quad, 4);
        assert_eq!(quad, [0.2, 0.4, 0.0, 0.0]);
        let mut mono = [9.0f32; 1];
        write_interleaved(&frames, &mut mono, 1);
        assert!((mono[0] - 0.3).abs() < 1e-6);
    }
}
