// Host-driven transport clock. The app loop feeds it elapsed wall time and it
// calls back once per subdivision with the transport time of that tick.

pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 240.0;
pub const DEFAULT_BPM: f32 = 80.0;
const TEMPO_RAMP_SECS: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subdivision {
    Quarter,
    Eighth,
    Sixteenth,
}

impl Subdivision {
    pub fn seconds(self, bpm: f32) -> f64 {
        let beat = 60.0 / bpm as f64;
        match self {
            Subdivision::Quarter => beat,
            Subdivision::Eighth => beat / 2.0,
            Subdivision::Sixteenth => beat / 4.0,
        }
    }
}

pub trait Transport {
    fn start(&mut self);
    fn pause(&mut self);
    fn schedule_repeat(&mut self, subdivision: Subdivision);
    fn set_tempo(&mut self, bpm: f32);
    fn is_running(&self) -> bool;
    fn bpm(&self) -> f32;
}

#[derive(Clone, Copy, Debug)]
struct TempoRamp {
    from: f32,
    to: f32,
    start: f64,
}

#[derive(Clone, Debug)]
pub struct ClockTransport {
    bpm: f32,
    ramp: Option<TempoRamp>,
    subdivision: Subdivision,
    running: bool,
    position: f64,     // transport seconds
    next_tick_at: f64, // transport seconds
}

impl Default for ClockTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl ClockTransport {
    pub fn new(bpm: f32) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            ramp: None,
            subdivision: Subdivision::Sixteenth,
            running: false,
            position: 0.0,
            next_tick_at: 0.0,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Pause and rewind to zero.
    pub fn stop(&mut self) {
        self.running = false;
        self.settle_ramp();
        self.position = 0.0;
        self.next_tick_at = 0.0;
    }

    // tempo in effect at transport time `t`
    fn bpm_at(&self, t: f64) -> f32 {
        match self.ramp {
            Some(r) => {
                let progress = ((t - r.start) / TEMPO_RAMP_SECS).clamp(0.0, 1.0) as f32;
                r.from + (r.to - r.from) * progress
            }
            None => self.bpm,
        }
    }

    fn settle_ramp(&mut self) {
        if let Some(r) = self.ramp.take() {
            self.bpm = r.to;
        }
    }

    /// Moves transport time forward by `elapsed` seconds, calling `on_tick`
    /// for every subdivision boundary crossed. Returns the tick count.
    pub fn advance(&mut self, elapsed: f64, mut on_tick: impl FnMut(f64)) -> usize {
        if !self.running || elapsed <= 0.0 {
            return 0;
        }
        let end = self.position + elapsed;
        let mut fired = 0;
        while self.next_tick_at <= end {
            let t = self.next_tick_at;
            on_tick(t);
            fired += 1;
            self.next_tick_at = t + self.subdivision.seconds(self.bpm_at(t));
        }
        self.position = end;
        if let Some(r) = self.ramp {
            if self.position - r.start >= TEMPO_RAMP_SECS {
                self.settle_ramp();
            }
        }
        fired
    }
}

impl Transport for ClockTransport {
    fn start(&mut self) {
        self.running = true;
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn schedule_repeat(&mut self, subdivision: Subdivision) {
        self.subdivision = subdivision;
    }

    fn set_tempo(&mut self, bpm: f32) {
        let target = bpm.clamp(MIN_BPM, MAX_BPM);
        if !self.running {
            self.ramp = None;
            self.bpm = target;
            return;
        }
        let from = self.bpm_at(self.position);
        self.ramp = Some(TempoRamp { from, to: target, start: self.position });
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn bpm(&self) -> f32 {
        self.ramp.map(|r| r.to).unwrap_or(self.bpm)
    }
}
