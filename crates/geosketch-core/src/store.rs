//! Feature store: the ordered collection of features and the active selection.

use crate::feature::{Feature, FeatureDraft, FeatureId, FeatureKind, FeatureUpdate, default_label};
use crate::storage::{STORAGE_KEY, Storage};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// The record written to storage on every mutation.
///
/// Decoding is per feature: an entry that fails to decode is logged and
/// skipped so the rest of the collection still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, deserialize_with = "lenient_features")]
    pub features: Vec<Feature>,
    /// Snapshot of the selected feature at save time.
    #[serde(default, deserialize_with = "lenient_active")]
    pub active_feature: Option<Feature>,
}

fn lenient_features<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Feature>, D::Error> {
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Feature>(entry) {
            Ok(feature) => Some(feature),
            Err(e) => {
                log::warn!("Dropping saved feature #{index}: {e}");
                None
            }
        })
        .collect())
}

fn lenient_active<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Feature>, D::Error> {
    let entry = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(entry.and_then(|entry| serde_json::from_value(entry).ok()))
}

impl PersistedState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Owns every feature plus the (optional) active selection.
///
/// When constructed with a storage backend the whole collection is written
/// back after each mutation. Save failures are logged and never undo the
/// in-memory change.
pub struct FeatureStore {
    features: Vec<Feature>,
    active: Option<FeatureId>,
    storage: Option<Arc<dyn Storage>>,
    key: String,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStore")
            .field("features", &self.features.len())
            .field("active", &self.active)
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl FeatureStore {
    /// An empty store with no persistence.
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
            active: None,
            storage: None,
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Open a persistent store under the default key, rehydrating saved state.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    /// Open a persistent store under `key`.
    ///
    /// A missing record starts empty. A record that is not a feature
    /// collection at all is logged and also starts empty; it is overwritten
    /// by the next mutation. Individual bad features are dropped on load.
    pub fn open_with_key(storage: Arc<dyn Storage>, key: &str) -> Self {
        let state = if matches!(storage.exists(key), Ok(false)) {
            log::debug!("No saved features under {key}, starting empty");
            PersistedState::default()
        } else {
            storage.load(key).unwrap_or_else(|e| {
                log::warn!("Failed to load saved features: {e}");
                PersistedState::default()
            })
        };

        let mut store = Self {
            storage: Some(storage),
            key: key.to_string(),
            ..Self::new()
        };
        store.restore(state);
        log::info!("Loaded {} features", store.features.len());
        store
    }

    /// Replace the in-memory state with a loaded snapshot.
    ///
    /// Features whose geometry does not match their declared type, and
    /// duplicate ids, are dropped. The selection is restored only if the
    /// active feature is still present.
    fn restore(&mut self, state: PersistedState) {
        self.features.clear();
        for feature in state.features {
            if let Err(e) = feature.validate() {
                log::warn!("Dropping saved feature {}: {e}", feature.id);
                continue;
            }
            if self.get(&feature.id).is_some() {
                log::warn!("Dropping duplicate saved feature {}", feature.id);
                continue;
            }
            self.features.push(feature);
        }
        self.active = state
            .active_feature
            .map(|f| f.id)
            .filter(|id| self.get(id).is_some());
    }

    /// Current state as the persisted record.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            features: self.features.clone(),
            active_feature: self.active().cloned(),
        }
    }

    /// Write the snapshot back, or drop the record once nothing is left.
    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let result = if self.features.is_empty() && self.active.is_none() {
            storage.delete(&self.key)
        } else {
            storage.save(&self.key, &self.snapshot())
        };
        if let Err(e) = result {
            log::warn!("Failed to persist features: {e}");
        }
    }

    /// Store a new feature, assigning its id and creation time.
    pub fn add(&mut self, draft: FeatureDraft) -> &Feature {
        let feature = Feature::from_draft(draft);
        log::info!("Created {} {} ({})", feature.kind, feature.id, feature.label);
        self.features.push(feature);
        self.persist();
        &self.features[self.features.len() - 1]
    }

    /// Merge `update` into the feature with `id`.
    ///
    /// Returns false (and changes nothing) if no such feature exists.
    pub fn update(&mut self, id: &FeatureId, update: FeatureUpdate) -> bool {
        let Some(feature) = self.features.iter_mut().find(|f| &f.id == id) else {
            log::debug!("Ignoring update for unknown feature {id}");
            return false;
        };
        update.apply(feature);
        self.persist();
        true
    }

    /// Delete the feature with `id`, clearing the selection if it was active.
    pub fn remove(&mut self, id: &FeatureId) -> Option<Feature> {
        let index = self.features.iter().position(|f| &f.id == id)?;
        let removed = self.features.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        log::info!("Deleted {} {}", removed.kind, removed.id);
        self.persist();
        Some(removed)
    }

    /// Select a feature. Returns false if `id` is unknown.
    pub fn set_active(&mut self, id: &FeatureId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id.clone());
        self.persist();
        true
    }

    pub fn clear_active(&mut self) {
        if self.active.take().is_some() {
            self.persist();
        }
    }

    /// All features in insertion order.
    pub fn list(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| &f.id == id)
    }

    pub fn active(&self) -> Option<&Feature> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<&FeatureId> {
        self.active.as_ref()
    }

    pub fn count_of(&self, kind: FeatureKind) -> usize {
        self.features.iter().filter(|f| f.kind == kind).count()
    }

    /// Label a new feature of `kind` would get right now.
    pub fn default_label(&self, kind: FeatureKind) -> String {
        default_label(kind, &self.features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
