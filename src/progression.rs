//! Persistent progression: currency, best distance, unlocked level and
//! upgrade levels, plus the storage backends that hold the JSON blob.
//!
//! ## Flow
//!
//! 1. [`ProgressionStore::open`] loads the blob at startup. Missing data gives
//!    the default record; malformed data is logged and also gives defaults.
//! 2. Every mutation that should survive a restart (reward merge, level
//!    unlock, purchase, reset) writes the whole record straight back.
//! 3. A failed write is logged and ignored; the next mutation retries it.
//!
//! ## Wire format
//!
//! ```json
//! {"currency":0,"maxDistance":0,"level":1,
//!  "upgrades":{"power":1,"bounce":1,"stompPower":1,"stompCooldown":1}}
//! ```
//!
//! Missing keys take their defaults and out-of-range numbers are clamped, so
//! older or hand-edited saves still load. Anything that is not an object of
//! numbers is corrupt.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::MAX_UPGRADE_LEVEL;
use crate::error::{GameError, GameResult};
use crate::upgrades::{self, UpgradeCategory};

// ── Record ────────────────────────────────────────────────────────────────────

/// Per-category upgrade levels, each in `1..=MAX_UPGRADE_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeLevels {
    pub power: u32,
    pub bounce: u32,
    pub stomp_power: u32,
    pub stomp_cooldown: u32,
}

impl Default for UpgradeLevels {
    fn default() -> Self {
        Self {
            power: 1,
            bounce: 1,
            stomp_power: 1,
            stomp_cooldown: 1,
        }
    }
}

impl UpgradeLevels {
    #[inline]
    pub fn get(&self, category: UpgradeCategory) -> u32 {
        match category {
            UpgradeCategory::Power => self.power,
            UpgradeCategory::Bounce => self.bounce,
            UpgradeCategory::StompPower => self.stomp_power,
            UpgradeCategory::StompCooldown => self.stomp_cooldown,
        }
    }

    #[inline]
    fn get_mut(&mut self, category: UpgradeCategory) -> &mut u32 {
        match category {
            UpgradeCategory::Power => &mut self.power,
            UpgradeCategory::Bounce => &mut self.bounce,
            UpgradeCategory::StompPower => &mut self.stomp_power,
            UpgradeCategory::StompCooldown => &mut self.stomp_cooldown,
        }
    }

    /// Current gameplay multiplier for `category`.
    #[inline]
    pub fn multiplier(&self, category: UpgradeCategory) -> f32 {
        upgrades::multiplier(category, self.get(category))
    }
}

/// Everything that carries over between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionRecord {
    pub currency: u32,
    /// Best distance ever reached, in metres.
    pub best_distance: u32,
    /// Highest gate level the player may pass; starts at 1.
    pub unlocked_level: u32,
    pub upgrades: UpgradeLevels,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            currency: 0,
            best_distance: 0,
            unlocked_level: 1,
            upgrades: UpgradeLevels::default(),
        }
    }
}

// ── JSON codec ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
struct UpgradesWire {
    power: f64,
    bounce: f64,
    #[serde(rename = "stompPower")]
    stomp_power: f64,
    #[serde(rename = "stompCooldown")]
    stomp_cooldown: f64,
}

impl Default for UpgradesWire {
    fn default() -> Self {
        Self {
            power: 1.0,
            bounce: 1.0,
            stomp_power: 1.0,
            stomp_cooldown: 1.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
struct ProgressionWire {
    currency: f64,
    #[serde(rename = "maxDistance")]
    max_distance: f64,
    level: f64,
    upgrades: UpgradesWire,
}

impl Default for ProgressionWire {
    fn default() -> Self {
        Self {
            currency: 0.0,
            max_distance: 0.0,
            level: 1.0,
            upgrades: UpgradesWire::default(),
        }
    }
}

/// Clamp a decoded number into `min..=max` and truncate it to an integer.
fn sanitize(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() {
        return min;
    }
    value.floor().clamp(min as f64, max as f64) as u32
}

fn sanitize_level(value: f64) -> u32 {
    sanitize(value, 1, MAX_UPGRADE_LEVEL)
}

impl From<ProgressionWire> for ProgressionRecord {
    fn from(wire: ProgressionWire) -> Self {
        Self {
            currency: sanitize(wire.currency, 0, u32::MAX),
            best_distance: sanitize(wire.max_distance, 0, u32::MAX),
            unlocked_level: sanitize(wire.level, 1, u32::MAX),
            upgrades: UpgradeLevels {
                power: sanitize_level(wire.upgrades.power),
                bounce: sanitize_level(wire.upgrades.bounce),
                stomp_power: sanitize_level(wire.upgrades.stomp_power),
                stomp_cooldown: sanitize_level(wire.upgrades.stomp_cooldown),
            },
        }
    }
}

/// Decode a persisted blob. Fails with `CorruptProgressionData` on anything
/// that is not a JSON object of numbers.
pub fn decode_record(bytes: &[u8]) -> GameResult<ProgressionRecord> {
    let corrupt = |reason: String| GameError::CorruptProgressionData { reason };

    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|err| corrupt(err.to_string()))?;
    // Serde would happily read a struct from an array; only objects are records.
    if !value.is_object() {
        return Err(corrupt("progression record is not a JSON object".to_string()));
    }
    let wire: ProgressionWire =
        serde_json::from_value(value).map_err(|err| corrupt(err.to_string()))?;
    Ok(ProgressionRecord::from(wire))
}

/// Encode the full record; integral values are written without a fraction.
pub fn encode_record(record: &ProgressionRecord) -> GameResult<Vec<u8>> {
    let value = serde_json::json!({
        "currency": record.currency,
        "maxDistance": record.best_distance,
        "level": record.unlocked_level,
        "upgrades": {
            "power": record.upgrades.power,
            "bounce": record.upgrades.bounce,
            "stompPower": record.upgrades.stomp_power,
            "stompCooldown": record.upgrades.stomp_cooldown,
        },
    });
    serde_json::to_vec(&value).map_err(|err| GameError::Persistence {
        context: "encode progression record".to_string(),
        source: io::Error::other(err),
    })
}

// ── Storage backends ──────────────────────────────────────────────────────────

/// Flat blob store for the progression record.
pub trait ProgressionStorage: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> GameResult<Option<Vec<u8>>>;
    /// Replace the stored blob wholesale.
    fn save(&mut self, bytes: &[u8]) -> GameResult<()>;
}

/// Stores the blob in a single file, creating its directory on first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProgressionStorage for FileStorage {
    fn load(&self) -> GameResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(GameError::Persistence {
                context: format!("failed to read {}", self.path.display()),
                source: err,
            }),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> GameResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| GameError::Persistence {
                context: format!("failed to create {}", dir.display()),
                source: err,
            })?;
        }
        fs::write(&self.path, bytes).map_err(|err| GameError::Persistence {
            context: format!("failed to write {}", self.path.display()),
            source: err,
        })
    }
}

#[derive(Debug, Default)]
struct MemoryBlob {
    bytes: Option<Vec<u8>>,
    fail_writes: bool,
    writes: usize,
}

/// In-memory blob store. Clones share the same blob, so a test can keep a
/// handle after giving one to a [`ProgressionStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryBlob>>,
}

impl MemoryStorage {
    pub fn with_blob(bytes: impl Into<Vec<u8>>) -> Self {
        let storage = Self::default();
        storage.lock().bytes = Some(bytes.into());
        storage
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryBlob> {
        // A poisoned lock only means a test panicked mid-write; the blob is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        self.lock().bytes.clone()
    }

    /// Make every following `save` fail with a persistence error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

impl ProgressionStorage for MemoryStorage {
    fn load(&self) -> GameResult<Option<Vec<u8>>> {
        Ok(self.lock().bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> GameResult<()> {
        let mut blob = self.lock();
        if blob.fail_writes {
            return Err(GameError::Persistence {
                context: "memory storage write".to_string(),
                source: io::Error::other("writes disabled"),
            });
        }
        blob.bytes = Some(bytes.to_vec());
        blob.writes += 1;
        Ok(())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// The single process-wide progression instance, passed explicitly to every
/// component that reads or changes it.
#[derive(Resource)]
pub struct ProgressionStore {
    record: ProgressionRecord,
    storage: Box<dyn ProgressionStorage>,
}

impl ProgressionStore {
    /// Load from `storage`, falling back to defaults on missing or bad data.
    pub fn open(storage: impl ProgressionStorage + 'static) -> Self {
        let record = Self::load(&storage);
        Self {
            record,
            storage: Box::new(storage),
        }
    }

    /// Fail-soft load: never returns an error to the caller.
    pub fn load(storage: &dyn ProgressionStorage) -> ProgressionRecord {
        let bytes = match storage.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("No saved progression; starting fresh");
                return ProgressionRecord::default();
            }
            Err(err) => {
                warn!("{err}; using default progression");
                return ProgressionRecord::default();
            }
        };

        match decode_record(&bytes) {
            Ok(record) => {
                info!(
                    "Loaded progression: {} hearts, best {}m, level {}",
                    record.currency, record.best_distance, record.unlocked_level
                );
                record
            }
            Err(err) => {
                warn!("{err}; using default progression");
                ProgressionRecord::default()
            }
        }
    }

    #[inline]
    pub fn record(&self) -> &ProgressionRecord {
        &self.record
    }

    #[inline]
    pub fn upgrades(&self) -> &UpgradeLevels {
        &self.record.upgrades
    }

    /// Write the full record, replacing whatever was stored.
    pub fn save(&mut self) -> GameResult<()> {
        let bytes = encode_record(&self.record)?;
        self.storage.save(&bytes)
    }

    /// Save, logging instead of propagating failures.
    fn persist(&mut self) {
        if let Err(err) = self.save() {
            error!("Failed to save progression: {err}");
        }
    }

    pub fn add_currency(&mut self, amount: u32) {
        self.record.currency = self.record.currency.saturating_add(amount);
        self.persist();
    }

    /// Raise the best distance if `distance` beats it.
    pub fn record_distance(&mut self, distance: u32) {
        self.record.best_distance = self.record.best_distance.max(distance);
        self.persist();
    }

    /// Fold a finished (or abandoned) run into the record with a single write.
    pub fn merge_run(&mut self, session_currency: u32, best_distance: u32) {
        self.record.currency = self.record.currency.saturating_add(session_currency);
        self.record.best_distance = self.record.best_distance.max(best_distance);
        self.persist();
    }

    /// Buy the next level of `category`. Returns the amount spent.
    ///
    /// Either both the currency and the level change, or nothing does.
    pub fn apply_upgrade_purchase(&mut self, category: UpgradeCategory) -> GameResult<u32> {
        let level = self.record.upgrades.get(category);
        let cost = upgrades::cost_for_next_level(level).ok_or(GameError::MaxLevel { category })?;
        if self.record.currency < cost {
            return Err(GameError::InsufficientFunds {
                category,
                cost,
                currency: self.record.currency,
            });
        }

        self.record.currency -= cost;
        *self.record.upgrades.get_mut(category) += 1;
        info!(
            "Purchased {} level {} for {} hearts",
            category.label(),
            level + 1,
            cost
        );
        self.persist();
        Ok(cost)
    }

    /// Open the next gate level. Returns the new unlocked level.
    pub fn unlock_next_level(&mut self) -> u32 {
        self.record.unlocked_level += 1;
        info!("Unlocked level {}", self.record.unlocked_level);
        self.persist();
        self.record.unlocked_level
    }

    /// Wipe all progress back to the defaults.
    pub fn reset(&mut self) {
        self.record = ProgressionRecord::default();
        info!("Progression reset to defaults");
        self.persist();
    }
}
