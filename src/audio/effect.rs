use super::frame::StereoFrame;

// Effect descriptions travel through the command channel; the engine turns
// them into processors when a voice starts.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectSpec {
    Distortion { drive: f32 },
    Bitcrusher { levels: u32 },
}

impl EffectSpec {
    pub fn build(&self) -> Box<dyn Effect> {
        match *self {
            EffectSpec::Distortion { drive } => Box::new(Distortion::new(drive)),
            EffectSpec::Bitcrusher { levels } => Box::new(Bitcrusher::new(levels)),
        }
    }
}

pub trait Effect: Send {
    fn process(&mut self, buf: &mut [StereoFrame]);
}

pub struct Distortion {
    pre_gain: f32,
    makeup: f32,
}

impl Distortion {
    pub fn new(drive: f32) -> Self {
        let drive = drive.clamp(0.0, 1.0);
        let pre_gain = 1.0 + drive * 10.0;
        Self {
            pre_gain,
            makeup: 1.0 / pre_gain.tanh(), // full-scale input stays full-scale
        }
    }
}

impl Effect for Distortion {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        let (pre, makeup) = (self.pre_gain, self.makeup);
        for f in buf.iter_mut() {
            *f = f.map(|x| (x.clamp(-1.0, 1.0) * pre).tanh() * makeup);
        }
    }
}

pub struct Bitcrusher {
    steps: f32, // quantisation steps per unit amplitude
}

impl Bitcrusher {
    pub fn new(levels: u32) -> Self {
        let levels = levels.clamp(2, 65536) as f32;
        Self { steps: (levels - 1.0) * 0.5 }
    }
}

impl Effect for Bitcrusher {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        let steps = self.steps;
        for f in buf.iter_mut() {
            *f = f.map(|x| (x.clamp(-1.0, 1.0) * steps).round() / steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crusher_quantises() {
        let mut crush = EffectSpec::Bitcrusher { levels: 3 }.build();
        let mut buf = [StereoFrame::mono(0.4), StereoFrame::mono(-0.6)];
        crush.process(&mut buf);
        assert_eq!(buf[0], StereoFrame::mono(0.0));
        assert_eq!(buf[1], StereoFrame::mono(-1.0));
    }

    #[test]
    fn distortion_keeps_full_scale_and_sign() {
        let mut dist = EffectSpec::Distortion { drive: 0.7 }.build();
        let mut buf = [StereoFrame::mono(1.0), StereoFrame::mono(-0.1), StereoFrame::zero()];
        dist.process(&mut buf);
        assert!((buf[0].left - 1.0).abs() < 1e-5);
        assert!(buf[1].left < -0.1);
        assert_eq!(buf[2], StereoFrame::zero());
    }
}
