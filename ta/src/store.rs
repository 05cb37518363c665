//! Core TripArchive implementation

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::ArchiveError;

/// Unique identifier for an archived trip (`YYYYMMDD_HHMMSS`)
pub type TripId = String;

/// Format used to derive trip ids from the save time
const ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One archived itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Trip id, derived from the save timestamp
    pub id: TripId,
    /// ISO-8601 creation timestamp; empty when missing or not a string
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: String,
    /// Departure location label
    pub from_city: String,
    /// Destination location label
    pub to_city: String,
    /// Trip duration in days
    pub days: u32,
    /// Number of travelers
    pub people: u32,
    /// Group type (Solo, Couple, Friends, Family, Business)
    pub group_type: String,
    /// Full generated itinerary
    pub plan_text: String,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Fields supplied by the caller when saving a trip
#[derive(Debug, Clone)]
pub struct NewTrip<'a> {
    pub from_city: &'a str,
    pub to_city: &'a str,
    pub days: u32,
    pub people: u32,
    pub group_type: &'a str,
    pub plan_text: &'a str,
}

/// JSON-file backed trip history
///
/// The backing file always holds a pretty-printed JSON array of
/// [`TripRecord`]s. Every mutation reads the whole array, modifies it and
/// atomically replaces the file. Entries that do not decode as a record are
/// hidden from readers but written back untouched. There is no locking:
/// callers must serialize writers themselves.
#[derive(Debug, Clone)]
pub struct TripArchive {
    path: PathBuf,
}

impl TripArchive {
    /// Open the archive at `path`, creating the directory and an empty file if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "TripArchive::open: called");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        let archive = Self { path };
        if !archive.path.exists() {
            debug!("TripArchive::open: file missing, initializing empty archive");
            archive.write_entries(&[])?;
        }

        info!(path = %archive.path.display(), "TripArchive opened");
        Ok(archive)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a generated plan; returns the new trip id, or `None` if the write failed
    pub fn save(
        &self,
        from_city: &str,
        to_city: &str,
        days: u32,
        people: u32,
        group_type: &str,
        plan_text: &str,
    ) -> Option<TripId> {
        let trip = NewTrip {
            from_city,
            to_city,
            days,
            people,
            group_type,
            plan_text,
        };
        self.insert(Local::now(), trip)
    }

    fn insert(&self, now: DateTime<Local>, trip: NewTrip<'_>) -> Option<TripId> {
        debug!(from = %trip.from_city, to = %trip.to_city, days = trip.days, "TripArchive::insert: called");
        let mut entries = self.read_entries();

        let id = unique_id(&entries, &now.format(ID_FORMAT).to_string());
        let record = TripRecord {
            id: id.clone(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            from_city: trip.from_city.to_string(),
            to_city: trip.to_city.to_string(),
            days: trip.days,
            people: trip.people,
            group_type: trip.group_type.to_string(),
            plan_text: trip.plan_text.to_string(),
        };
        match serde_json::to_value(&record) {
            Ok(value) => entries.push(value),
            Err(e) => {
                error!(error = %e, "Failed to encode trip");
                return None;
            }
        }

        match self.write_entries(&entries) {
            Ok(()) => {
                info!(%id, "Trip saved");
                Some(id)
            }
            Err(e) => {
                error!(error = %e, "Failed to save trip");
                None
            }
        }
    }

    /// Look up a trip by id
    pub fn get(&self, id: &str) -> Option<TripRecord> {
        debug!(%id, "TripArchive::get: called");
        self.read_records().into_iter().find(|r| r.id == id)
    }

    /// All trips, newest first, optionally truncated to `limit`
    ///
    /// `Some(0)` yields an empty list; pass `None` for everything.
    pub fn list(&self, limit: Option<usize>) -> Vec<TripRecord> {
        debug!(?limit, "TripArchive::list: called");
        let mut records = self.read_records();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(limit) = limit {
            records.truncate(limit);
        }
        records
    }

    /// Remove a trip; returns whether a record was actually removed
    pub fn delete(&self, id: &str) -> bool {
        debug!(%id, "TripArchive::delete: called");
        let mut entries = self.read_entries();
        let before = entries.len();
        entries.retain(|entry| entry_id(entry) != Some(id));

        if entries.len() == before {
            debug!(%id, "TripArchive::delete: no such trip");
            return false;
        }

        match self.write_entries(&entries) {
            Ok(()) => {
                info!(%id, "Trip deleted");
                true
            }
            Err(e) => {
                error!(%id, error = %e, "Failed to delete trip");
                false
            }
        }
    }

    /// Remove every trip
    pub fn clear(&self) -> bool {
        debug!("TripArchive::clear: called");
        match self.write_entries(&[]) {
            Ok(()) => {
                info!("All trips cleared");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to clear trips");
                false
            }
        }
    }

    /// Every decodable record; entries of the wrong shape are skipped
    fn read_records(&self) -> Vec<TripRecord> {
        self.read_entries()
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<TripRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(path = %self.path.display(), index, error = %e, "Skipping malformed trip record");
                    None
                }
            })
            .collect()
    }

    /// Raw array entries; unreadable content or a non-array reads as empty history
    fn read_entries(&self) -> Vec<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to read archive file");
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(path = %self.path.display(), "Archive file is not a JSON array, treating as empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to decode archive file, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the file contents via a sibling temp file and rename
    fn write_entries(&self, entries: &[Value]) -> Result<(), ArchiveError> {
        debug!(count = entries.len(), "TripArchive::write_entries: called");
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ArchiveError::io(dir, e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| ArchiveError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| ArchiveError::io(tmp.path(), e))?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

/// Second-granularity ids can collide; later saves get a numeric suffix
fn unique_id(entries: &[Value], base: &str) -> TripId {
    let taken = |candidate: &str| entries.iter().any(|entry| entry_id(entry) == Some(candidate));
    if !taken(base) {
        return base.to_string();
    }

    let mut n = 2u32;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
