// the saved garden document and the summary the explore page shows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::effects::EffectParams;
use crate::sequencer::Sequencer;

pub const DEFAULT_OWNER: &str = "Anonymous";
pub const DEFAULT_NAME: &str = "Untitled Garden";
pub const DEFAULT_TEMPO: u32 = 80;

pub type GardenId = Uuid;

/// One placed plant. `params` is absent for plants nobody has edited.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub track: usize,
    pub step: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<EffectParams>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Garden {
    pub id: GardenId,
    pub owner: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub timestamp: i64, // ms since epoch, sort key
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    #[serde(default)]
    pub plants: Vec<Plant>,
}

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}

fn or_default(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

impl Garden {
    pub fn new(owner: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: or_default(owner, DEFAULT_OWNER),
            name: or_default(name, DEFAULT_NAME),
            created_at: now,
            timestamp: now.timestamp_millis(),
            last_modified: None,
            tempo: DEFAULT_TEMPO,
            plants: Vec::new(),
        }
    }

    // snapshot of the grid as a list of plants
    pub fn plants_from(sequencer: &Sequencer) -> Vec<Plant> {
        sequencer
            .occupied_cells()
            .into_iter()
            .map(|(track, step, params)| Plant {
                track,
                step,
                params: (!params.is_default()).then_some(params),
            })
            .collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Option<EffectParams>)> + '_ {
        self.plants.iter().map(|p| (p.track, p.step, p.params))
    }

    pub fn summary(&self) -> GardenSummary {
        GardenSummary {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner.clone(),
            plants_count: self.plants.len(),
            created_at: self.created_at,
        }
    }

    pub fn matches(&self, term: &str) -> bool {
        matches_term(&self.name, &self.owner, term)
    }
}

// case-insensitive substring on name or owner; a blank term matches all
fn matches_term(name: &str, owner: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty() || name.to_lowercase().contains(&term) || owner.to_lowercase().contains(&term)
}

#[derive(Clone, Debug, PartialEq)]
pub struct GardenSummary {
    pub id: GardenId,
    pub name: String,
    pub owner: String,
    pub plants_count: usize,
    pub created_at: DateTime<Utc>,
}

impl GardenSummary {
    pub fn matches(&self, term: &str) -> bool {
        matches_term(&self.name, &self.owner, term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Layout;

    #[test]
    fn blank_fields_get_defaults() {
        let g = Garden::new("  ", "");
        assert_eq!(g.owner, DEFAULT_OWNER);
        assert_eq!(g.name, DEFAULT_NAME);
        assert_eq!(g.tempo, 80);
        assert!(g.plants.is_empty());
    }

    #[test]
    fn snapshot_omits_untouched_params() {
        let mut seq = Sequencer::new(Layout::default());
        seq.set_cell(27, 0, true).unwrap();
        let edited = EffectParams { drive: 0.3, ..Default::default() };
        seq.set_cell_with(2, 5, edited).unwrap();
        let plants = Garden::plants_from(&seq);
        assert_eq!(
            plants,
            vec![
                Plant { track: 2, step: 5, params: Some(edited) },
                Plant { track: 27, step: 0, params: None },
            ]
        );
        let json = serde_json::to_string(&plants[1]).unwrap();
        assert_eq!(json, r#"{"track":27,"step":0}"#);
    }

    #[test]
    fn search_is_case_insensitive_on_name_and_owner() {
        let mut g = Garden::new("Mira", "Moss Hollow");
        assert!(g.matches("moss"));
        assert!(g.matches("MIR"));
        assert!(g.matches(""));
        assert!(!g.matches("fern"));
        g.name = "Fern Gully".into();
        assert!(g.summary().matches("fern"));
    }

    #[test]
    fn older_documents_without_optional_fields_load() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "owner": "ana",
            "name": "Old",
            "createdAt": "2025-03-01T10:00:00Z",
            "timestamp": 1740823200000
        }"#;
        let g: Garden = serde_json::from_str(json).unwrap();
        assert_eq!(g.tempo, DEFAULT_TEMPO);
        assert!(g.plants.is_empty());
        assert_eq!(g.last_modified, None);
    }
}
