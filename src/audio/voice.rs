use super::effect::Effect;
use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

// one sounding note: a read head moving through a sample at `rate`
pub struct Voice {
    pub sample_id: SampleId,
    pos: f64,
    rate: f64,
    gain: f32,
    active: bool,
    effects: Vec<Box<dyn Effect>>,
}

impl Voice {
    pub fn new(sample_id: SampleId, rate: f32, gain: f32, effects: Vec<Box<dyn Effect>>) -> Self {
        Self {
            sample_id,
            pos: 0.0,
            rate: rate.max(0.0) as f64,
            gain,
            active: true,
            effects,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // Writes (not mixes) this voice into `scratch`, then runs the effect chain.
    // Frames past the end of the sample are silent.
    pub fn render(&mut self, buffer: &SampleBuffer, scratch: &mut [StereoFrame]) {
        let data = &buffer.data;
        for frame in scratch.iter_mut() {
            let i = self.pos as usize;
            if !self.active || i >= data.len() {
                self.active = false;
                *frame = StereoFrame::zero();
                continue;
            }
            let frac = (self.pos - i as f64) as f32;
            let s0 = data[i];
            let s1 = data.get(i + 1).copied().unwrap_or(s0);
            *frame = s0.lerp(s1, frac).scaled(self.gain);
            self.pos += self.rate;
        }
        for effect in self.effects.iter_mut() {
            effect.process(scratch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> SampleBuffer {
        SampleBuffer {
            data: (0..n).map(|i| StereoFrame::mono(i as f32)).collect(),
        }
    }

    #[test]
    fn unit_rate_copies_sample() {
        let buf = ramp(4);
        let mut v = Voice::new(SampleId(0), 1.0, 1.0, Vec::new());
        let mut out = [StereoFrame::zero(); 6];
        v.render(&buf, &mut out);
        assert_eq!(out[3], StereoFrame::mono(3.0));
        assert_eq!(out[4], StereoFrame::zero());
        assert!(!v.is_active());
    }

    #[test]
    fn half_rate_interpolates() {
        let buf = ramp(4);
        let mut v = Voice::new(SampleId(0), 0.5, 1.0, Vec::new());
        let mut out = [StereoFrame::zero(); 3];
        v.render(&buf, &mut out);
        assert_eq!(out[1], StereoFrame::mono(0.5));
        assert_eq!(out[2], StereoFrame::mono(1.0));
        assert!(v.is_active());
    }
}
