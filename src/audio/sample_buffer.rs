use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    /// Decodes a WAV file to stereo f32 frames at `target_rate`.
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / full_scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| match c {
                [mono] => StereoFrame::mono(*mono),
                [left, right, ..] => StereoFrame { left: *left, right: *right },
                [] => StereoFrame::zero(),
            })
            .collect();

        Ok(Self {
            data: resample_linear(&frames, spec.sample_rate, target_rate),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Linear interpolation is plenty for one-shot plant samples.
fn resample_linear(frames: &[StereoFrame], from_rate: u32, to_rate: u32) -> Vec<StereoFrame> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || frames.is_empty() {
        return frames.to_vec();
    }
    let step = from_rate as f64 / to_rate as f64; // source frames per output frame
    let out_len = (frames.len() as f64 / step).ceil() as usize;
    let last = frames.len() - 1;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos as usize;
            if idx >= last {
                frames[last]
            } else {
                frames[idx].lerp(frames[idx + 1], (pos - idx as f64) as f32)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_keeps_duration() {
        let frames: Vec<StereoFrame> = (0..100).map(|i| StereoFrame::mono(i as f32)).collect();
        let up = resample_linear(&frames, 22_050, 44_100);
        assert_eq!(up.len(), 200);
        assert_eq!(up[1], StereoFrame::mono(0.5));
        let same = resample_linear(&frames, 44_100, 44_100);
        assert_eq!(same.len(), 100);
    }

    #[test]
    fn loads_mono_wav_as_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("C2.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0i16, 16_384, -16_384] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.data[1], StereoFrame::mono(0.5));
        assert_eq!(buf.data[2], StereoFrame::mono(-0.5));
    }
}
