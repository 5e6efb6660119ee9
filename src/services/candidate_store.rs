use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::database::slot::SnapshotSlot;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidatePatch, PersistedCandidate};
use crate::models::status::CandidateStatus;

/// Result of looking a candidate up by id.
///
/// `Loading` is distinct from `NotFound` so callers never report a missing
/// candidate before the snapshot has been read.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateLookup {
    Loading,
    NotFound,
    Found(Candidate),
}

impl CandidateLookup {
    pub fn into_result(self) -> Result<Candidate> {
        match self {
            CandidateLookup::Loading => Err(Error::NotReady),
            CandidateLookup::NotFound => Err(Error::NotFound("Candidate not found".into())),
            CandidateLookup::Found(candidate) => Ok(candidate),
        }
    }
}

#[derive(Debug)]
struct StoreState {
    loading: bool,
    candidates: Vec<Candidate>,
}

/// Authoritative in-memory candidate list with write-through persistence of
/// the full list to a single snapshot slot.
pub struct CandidateStore {
    slot: Arc<dyn SnapshotSlot>,
    key: String,
    state: RwLock<StoreState>,
}

impl CandidateStore {
    pub fn new(slot: Arc<dyn SnapshotSlot>, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
            state: RwLock::new(StoreState {
                loading: true,
                candidates: Vec::new(),
            }),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Reads the persisted snapshot once. A missing, unreadable or corrupt
    /// snapshot yields an empty list; the store is ready afterwards either way.
    pub async fn load(&self) {
        if !self.is_loading().await {
            debug!("Candidate store already loaded, skipping reload");
            return;
        }

        let candidates = match self.slot.read(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<PersistedCandidate>>(&raw) {
                Ok(records) => records.into_iter().map(Candidate::from).collect(),
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Candidate snapshot is corrupt, starting with an empty list");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read candidate snapshot, starting with an empty list");
                Vec::new()
            }
        };

        let mut state = self.state.write().await;
        if !state.loading {
            return;
        }
        info!("Candidate store ready with {} candidates", candidates.len());
        state.candidates = candidates;
        state.loading = false;
    }

    pub async fn add_candidate(&self, name: String, email: String) -> Result<Candidate> {
        let mut state = self.state.write().await;
        if state.loading {
            return Err(Error::NotReady);
        }

        let candidate = Candidate::new(name, email);
        state.candidates.push(candidate.clone());
        info!(candidate_id = %candidate.id, "Candidate added");

        self.persist(&state.candidates).await;
        Ok(candidate)
    }

    /// Merges `patch` into the candidate with `id`. Unknown ids are a silent
    /// no-op and return `None`.
    pub async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> Result<Option<Candidate>> {
        let mut state = self.state.write().await;
        if state.loading {
            return Err(Error::NotReady);
        }

        let Some(candidate) = state.candidates.iter_mut().find(|c| c.id == id) else {
            debug!(candidate_id = %id, "Update for unknown candidate ignored");
            return Ok(None);
        };
        candidate.apply(patch);
        let updated = candidate.clone();

        self.persist(&state.candidates).await;
        Ok(Some(updated))
    }

    pub async fn update_candidate_status(
        &self,
        id: Uuid,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>> {
        self.update_candidate(id, CandidatePatch::status(status)).await
    }

    pub async fn get_candidate_by_id(&self, id: Uuid) -> CandidateLookup {
        let state = self.state.read().await;
        if state.loading {
            return CandidateLookup::Loading;
        }
        match state.candidates.iter().find(|c| c.id == id) {
            Some(candidate) => CandidateLookup::Found(candidate.clone()),
            None => CandidateLookup::NotFound,
        }
    }

    /// All candidates, newest first.
    pub async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let state = self.state.read().await;
        if state.loading {
            return Err(Error::NotReady);
        }
        let mut candidates = state.candidates.clone();
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(candidates)
    }

    pub async fn status_counts(&self) -> Result<BTreeMap<CandidateStatus, usize>> {
        let state = self.state.read().await;
        if state.loading {
            return Err(Error::NotReady);
        }
        let mut counts: BTreeMap<CandidateStatus, usize> =
            CandidateStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for candidate in &state.candidates {
            *counts.entry(candidate.status).or_default() += 1;
        }
        Ok(counts)
    }

    // Called with the write lock held so snapshot writes land in mutation order.
    async fn persist(&self, candidates: &[Candidate]) {
        let snapshot: Vec<PersistedCandidate> = candidates.iter().map(PersistedCandidate::from).collect();
        let raw = match serde_json::to_string(&snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Failed to serialize candidate snapshot");
                return;
            }
        };
        if let Err(e) = self.slot.write(&self.key, &raw).await {
            error!(key = %self.key, error = %e, "Failed to persist candidate snapshot, continuing in memory");
        }
    }
}
