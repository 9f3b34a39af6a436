// Gardens on disk, one JSON document each:
// <project_dir>/.garden/gardens/<id>.json

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::pipeline::garden::{Garden, GardenId, GardenSummary, Plant};

pub const GARDEN_DIR: &str = ".garden";
const GARDENS_SUBDIR: &str = "gardens";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("garden {0} not found")]
    NotFound(GardenId),

    #[error("garden name cannot be empty")]
    EmptyName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct GardenStore {
    dir: PathBuf,
}

impl GardenStore {
    pub fn open(project_dir: &Path) -> Result<Self, StoreError> {
        let dir = project_dir.join(GARDEN_DIR).join(GARDENS_SUBDIR);
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: GardenId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    // temp file + rename so a crash mid-write never leaves half a garden
    fn write(&self, garden: &Garden) -> Result<(), StoreError> {
        let path = self.path_for(garden.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(garden)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn create(&self, owner: &str, name: &str) -> Result<Garden, StoreError> {
        let garden = Garden::new(owner, name);
        self.write(&garden)?;
        log::info!("created garden {} ({:?} by {})", garden.id, garden.name, garden.owner);
        Ok(garden)
    }

    pub fn get(&self, id: GardenId) -> Result<Garden, StoreError> {
        let data = match std::fs::read_to_string(self.path_for(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }

    /// Replaces plants and tempo; last write wins.
    pub fn update(&self, id: GardenId, plants: Vec<Plant>, tempo: u32) -> Result<Garden, StoreError> {
        let mut garden = self.get(id)?;
        garden.plants = plants;
        garden.tempo = tempo;
        garden.last_modified = Some(Utc::now());
        self.write(&garden)?;
        log::debug!("saved garden {id}: {} plants at {tempo} bpm", garden.plants.len());
        Ok(garden)
    }

    pub fn rename(&self, id: GardenId, name: &str) -> Result<Garden, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let mut garden = self.get(id)?;
        garden.name = name.to_string();
        garden.last_modified = Some(Utc::now());
        self.write(&garden)?;
        Ok(garden)
    }

    /// Every readable garden, newest first. Broken documents are skipped.
    pub fn all(&self) -> Result<Vec<Garden>, StoreError> {
        let mut gardens = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|data| serde_json::from_str::<Garden>(&data).map_err(StoreError::from));
            match parsed {
                Ok(garden) => gardens.push(garden),
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }
        }
        gardens.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(gardens)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<Garden>, StoreError> {
        let mut gardens = self.all()?;
        gardens.truncate(limit);
        Ok(gardens)
    }

    pub fn search(&self, term: &str) -> Result<Vec<GardenSummary>, StoreError> {
        Ok(self
            .all()?
            .iter()
            .filter(|g| g.matches(term))
            .map(Garden::summary)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::open(dir.path()).unwrap();
        let id = uuid::Uuid::new_v4();
        assert!(matches!(store.get(id), Err(StoreError::NotFound(missing)) if missing == id));
        assert!(matches!(store.update(id, vec![], 90), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn rename_rejects_blank_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::open(dir.path()).unwrap();
        let g = store.create("ana", "Moss").unwrap();
        assert!(matches!(store.rename(g.id, "   "), Err(StoreError::EmptyName)));
        let renamed = store.rename(g.id, " Fern ").unwrap();
        assert_eq!(renamed.name, "Fern");
        assert_eq!(store.get(g.id).unwrap().name, "Fern");
    }

    #[test]
    fn corrupt_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::open(dir.path()).unwrap();
        store.create("ana", "Moss").unwrap();
        std::fs::write(store.dir().join("broken.json"), "{ nope").unwrap();
        assert_eq!(store.all().unwrap().len(), 1);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::open(dir.path()).unwrap();
        let g = store.create("ana", "Moss").unwrap();
        store.update(g.id, vec![], 100).unwrap();
        let names: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![format!("{}.json", g.id)]);
    }
}
