// src/services/session_store.rs
use crate::brief::Brief;
use crate::errors::CreatorError;
use crate::models::{GenerationResult, ReconciledAnalysis};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct StoredResult {
    pub result: GenerationResult,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub brief: Brief,
    /// Token of the most recent analysis started for this session.
    #[serde(skip)]
    pub analysis_seq: u64,
    pub analysis_pending: bool,
    pub last_result: Option<StoredResult>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Applied,
    Stale,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            brief: Brief::new(),
            analysis_seq: 0,
            analysis_pending: false,
            last_result: None,
            created_at: Utc::now(),
        }
    }

    pub fn update_brief(&mut self, transition: impl FnOnce(Brief) -> Brief) {
        let brief = std::mem::take(&mut self.brief);
        self.brief = transition(brief);
    }

    /// Starts a new analysis and returns its token. Any analysis still in
    /// flight becomes stale.
    pub fn begin_analysis(&mut self) -> u64 {
        self.analysis_seq += 1;
        self.analysis_pending = true;
        self.analysis_seq
    }

    /// Applies a finished analysis if `token` is still the latest one.
    pub fn complete_analysis(
        &mut self,
        token: u64,
        analysis: &ReconciledAnalysis,
    ) -> AnalysisOutcome {
        if token != self.analysis_seq {
            warn!(
                "Discarding stale analysis {} for session {} (latest is {})",
                token, self.id, self.analysis_seq
            );
            return AnalysisOutcome::Stale;
        }
        self.analysis_pending = false;
        self.update_brief(|brief| brief.replace_from_analysis(analysis));
        AnalysisOutcome::Applied
    }

    /// Records a failed analysis and returns whether it was still the latest.
    /// The brief is left untouched.
    pub fn fail_analysis(&mut self, token: u64) -> bool {
        let current = token == self.analysis_seq;
        if current {
            self.analysis_pending = false;
        }
        current
    }

    /// Makes every analysis in flight stale without starting a new one.
    pub fn cancel_analysis(&mut self) {
        if self.analysis_pending {
            info!("Cancelling analysis {} for session {}", self.analysis_seq, self.id);
        }
        self.analysis_seq += 1;
        self.analysis_pending = false;
    }

    pub fn record_result(&mut self, result: GenerationResult) -> &StoredResult {
        self.last_result.insert(StoredResult {
            result,
            generated_at: Utc::now(),
        })
    }
}

/// Session-transient storage. Nothing outlives the process.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.sessions.lock().await.insert(session.id, session.clone());
        info!("Created session {}", session.id);
        session
    }

    pub async fn get(&self, id: &Uuid) -> Result<Session, CreatorError> {
        self.sessions
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or(CreatorError::SessionNotFound(*id))
    }

    /// Runs `f` against the session under the lock. The lock is never held
    /// across an external call.
    pub async fn with_session<T>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, CreatorError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id)
            .ok_or(CreatorError::SessionNotFound(*id))?;
        Ok(f(session))
    }

    pub async fn remove(&self, id: &Uuid) -> Result<(), CreatorError> {
        self.sessions
            .lock()
            .await
            .remove(id)
            .map(|_| info!("Removed session {}", id))
            .ok_or(CreatorError::SessionNotFound(*id))
    }
}
