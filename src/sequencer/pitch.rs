use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Layout;

pub const NOTES_PER_OCTAVE: usize = 7;

// natural notes only, the garden is a diatonic C major instrument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; NOTES_PER_OCTAVE] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    // semitones above C
    fn semitone(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    fn letter(self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

/// A scale degree plus octave, e.g. `C1` or `G4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub name: NoteName,
    pub octave: u8,
}

impl Pitch {
    pub fn new(name: NoteName, octave: u8) -> Self {
        Self { name, octave }
    }

    /// MIDI note number, C4 = 60.
    pub fn midi(self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.name.semitone()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name.letter(), self.octave)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a natural pitch: {0:?}")]
pub struct ParsePitchError(pub String);

impl FromStr for Pitch {
    type Err = ParsePitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let name = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => NoteName::C,
            Some('D') => NoteName::D,
            Some('E') => NoteName::E,
            Some('F') => NoteName::F,
            Some('G') => NoteName::G,
            Some('A') => NoteName::A,
            Some('B') => NoteName::B,
            _ => return Err(ParsePitchError(s.to_string())),
        };
        let octave = chars
            .as_str()
            .parse::<u8>()
            .map_err(|_| ParsePitchError(s.to_string()))?;
        Ok(Pitch { name, octave })
    }
}

/// Track 0 is the top lane and therefore the highest pitch; each track below
/// it drops one scale step.
pub fn pitch_for_track(layout: &Layout, track: usize) -> Pitch {
    let note_position = (layout.n_tracks - 1).saturating_sub(track);
    let octave = layout.base_octave as usize + note_position / NOTES_PER_OCTAVE;
    Pitch {
        name: NoteName::ALL[note_position % NOTES_PER_OCTAVE],
        octave: octave as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_track_is_lowest_pitch() {
        let layout = Layout::default();
        let p = pitch_for_track(&layout, 27);
        assert_eq!(p, Pitch::new(NoteName::C, 1));
        assert_eq!(p.to_string(), "C1");
    }

    #[test]
    fn top_track_is_b4() {
        let layout = Layout::default();
        let p = pitch_for_track(&layout, 0);
        assert_eq!(p.octave, 4);
        assert_eq!(p.name, NoteName::ALL[6]);
        assert_eq!(p.to_string(), "B4");
    }

    #[test]
    fn pitch_falls_strictly_with_track_index() {
        let layout = Layout::default();
        for track in 1..layout.n_tracks {
            let above = pitch_for_track(&layout, track - 1);
            let below = pitch_for_track(&layout, track);
            assert!(below.midi() < above.midi(), "track {track}");
        }
    }

    #[test]
    fn parses_sample_names() {
        assert_eq!("A1".parse::<Pitch>(), Ok(Pitch::new(NoteName::A, 1)));
        assert_eq!("g2".parse::<Pitch>(), Ok(Pitch::new(NoteName::G, 2)));
        assert!("H2".parse::<Pitch>().is_err());
        assert!("C".parse::<Pitch>().is_err());
        assert!("kick".parse::<Pitch>().is_err());
    }

    #[test]
    fn midi_numbers() {
        assert_eq!(Pitch::new(NoteName::C, 4).midi(), 60);
        assert_eq!(Pitch::new(NoteName::A, 1).midi(), 33);
    }
}
