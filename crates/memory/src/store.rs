use crate::config::{MemoryOptions, StorageBackend};
use crate::error::{MemoryError, Result};
use crate::persist::{JsonFileMirror, NullMirror, SessionMap, SessionMirror};
use crate::types::{
    ConversationTurn, Message, Metadata, Role, Session, SessionInfo, StoreStats,
};
use crate::window;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Conversation sessions for one process
///
/// Every mutation and the snapshot write that mirrors it happen under one
/// lock. Two processes sharing a snapshot file can still overwrite each
/// other's updates.
pub struct SessionStore {
    options: MemoryOptions,
    sessions: Mutex<SessionMap>,
    mirror: Box<dyn SessionMirror>,
}

impl SessionStore {
    /// Store with the mirror selected by `options.backend`
    pub fn open(options: MemoryOptions) -> Result<Self> {
        let mirror: Box<dyn SessionMirror> = match options.backend {
            StorageBackend::File => Box::new(JsonFileMirror::new(options.store_path.clone())),
            StorageBackend::Memory => Box::new(NullMirror),
        };
        Self::with_mirror(options, mirror)
    }

    pub fn with_mirror(options: MemoryOptions, mirror: Box<dyn SessionMirror>) -> Result<Self> {
        options.validate().map_err(MemoryError::InvalidOptions)?;
        let sessions = mirror.load();
        log::info!(
            "Session store initialized ({} backend, {} sessions)",
            mirror.describe(),
            sessions.len()
        );
        Ok(Self {
            options,
            sessions: Mutex::new(sessions),
            mirror,
        })
    }

    pub fn options(&self) -> &MemoryOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, SessionMap> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, sessions: &SessionMap) {
        if let Err(err) = self.mirror.save(sessions) {
            log::error!("Failed to save sessions: {err}");
        }
    }

    /// Create (or reset) a session; a missing or empty id gets a fresh UUID
    pub fn create_session(&self, id: Option<&str>) -> String {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let mut sessions = self.lock();
        if sessions.insert(id.clone(), Session::new(id.clone())).is_some() {
            log::debug!("Session {id} reset");
        }
        self.persist(&sessions);
        log::info!("Created new session: {id}");
        id
    }

    /// Append a message, creating the session if it does not exist
    pub fn add_message(&self, session_id: &str, role: Role, content: &str, metadata: Metadata) {
        let max = self.options.max_messages;
        let mut sessions = self.lock();

        let session = sessions.entry(session_id.to_string()).or_insert_with(|| {
            log::warn!("Session {session_id} not found, creating new session");
            Session::new(session_id)
        });

        let message = Message::new(role, content, metadata);
        session.metadata.last_active = message.timestamp;
        session.metadata.message_count += 1;
        session.messages.push(message);
        log::debug!(
            "Added {role} message to session {session_id} ({} stored)",
            session.messages.len()
        );

        if session.messages.len() > max * 2 {
            let dropped = window::trim(
                session,
                max,
                self.options.summary_scan,
                self.options.summary_preview_chars,
            );
            log::info!("Trimmed {dropped} messages from session {session_id}");
        }

        self.persist(&sessions);
    }

    /// Recent turns for a session; empty for an unknown id
    pub fn conversation_context(&self, session_id: &str) -> Vec<ConversationTurn> {
        let sessions = self.lock();
        match sessions.get(session_id) {
            Some(session) => window::conversation_context(session, self.options.max_messages),
            None => {
                log::debug!("Session {session_id} not found");
                Vec::new()
            }
        }
    }

    pub fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        self.lock()
            .get(session_id)
            .map(|s| self.info_of(s))
    }

    fn info_of(&self, session: &Session) -> SessionInfo {
        SessionInfo {
            id: session.id.clone(),
            created_at: session.metadata.created_at,
            last_active: session.metadata.last_active,
            message_count: session.metadata.message_count,
            has_summary: session.has_summary(),
            current_context_size: window::context_window(
                &session.messages,
                self.options.max_messages,
            )
            .len(),
        }
    }

    /// Remove a session; false if it did not exist
    pub fn clear_session(&self, session_id: &str) -> bool {
        let mut sessions = self.lock();
        let removed = sessions.remove(session_id).is_some();
        if removed {
            self.persist(&sessions);
            log::info!("Cleared session: {session_id}");
        }
        removed
    }

    /// Deep copy of a session's state
    pub fn export_session(&self, session_id: &str) -> Option<Session> {
        self.lock().get(session_id).cloned()
    }

    /// All sessions, most recently active first
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.lock();
        let mut infos: Vec<SessionInfo> = sessions.values().map(|s| self.info_of(s)).collect();
        infos.sort_by(|a, b| b.last_active.cmp(&a.last_active).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    /// Drop sessions idle for longer than `timeout`; returns how many went
    pub fn cleanup_expired(&self, timeout: chrono::Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now - s.metadata.last_active <= timeout);
        let removed = before - sessions.len();

        if removed > 0 {
            self.persist(&sessions);
            log::info!("Cleaned up {removed} expired sessions");
        }
        removed
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.lock().contains_key(session_id)
    }

    pub fn stats(&self) -> StoreStats {
        let sessions = self.lock();
        StoreStats {
            active_sessions: sessions.len(),
            total_messages: sessions.values().map(|s| s.metadata.message_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(max_messages: usize) -> SessionStore {
        SessionStore::open(MemoryOptions {
            max_messages,
            ..MemoryOptions::in_memory()
        })
        .unwrap()
    }

    #[test]
    fn generated_ids_are_unique() {
        let store = store(10);
        let a = store.create_session(None);
        let b = store.create_session(Some(""));
        assert_ne!(a, b);
        assert!(store.contains(&a) && store.contains(&b));
    }

    #[test]
    fn creating_an_existing_id_resets_it() {
        let store = store(10);
        store.add_message("s", Role::User, "hello", Metadata::new());
        store.create_session(Some("s"));
        assert_eq!(store.session_info("s").unwrap().message_count, 0);
    }

    #[test]
    fn add_message_auto_creates_session() {
        let store = store(10);
        store.add_message("fresh", Role::User, "hi", Metadata::new());
        let info = store.session_info("fresh").unwrap();
        assert_eq!(info.message_count, 1);
        assert_eq!(info.current_context_size, 1);
    }

    #[test]
    fn unknown_sessions_read_as_empty() {
        let store = store(10);
        assert!(store.conversation_context("nope").is_empty());
        assert!(store.session_info("nope").is_none());
        assert!(store.export_session("nope").is_none());
        assert!(!store.clear_session("nope"));
    }

    #[test]
    fn cleanup_drops_only_idle_sessions() {
        let store = store(10);
        store.create_session(Some("old"));
        store.create_session(Some("new"));
        {
            let mut sessions = store.lock();
            let old = sessions.get_mut("old").unwrap();
            old.metadata.last_active = Utc::now() - chrono::Duration::hours(30);
        }

        assert_eq!(store.cleanup_expired(chrono::Duration::hours(24)), 1);
        assert!(!store.contains("old"));
        assert!(store.contains("new"));
    }

    #[test]
    fn listing_is_most_recent_first() {
        let store = store(10);
        store.create_session(Some("a"));
        store.create_session(Some("b"));
        {
            let mut sessions = store.lock();
            sessions.get_mut("a").unwrap().metadata.last_active =
                Utc::now() + chrono::Duration::seconds(5);
        }
        let ids: Vec<String> = store.list_sessions().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn stats_sum_message_counts() {
        let store = store(2);
        for i in 0..7 {
            store.add_message("a", Role::User, &format!("q{i}"), Metadata::new());
        }
        store.add_message("b", Role::User, "q", Metadata::new());
        assert_eq!(
            store.stats(),
            StoreStats {
                active_sessions: 2,
                total_messages: 8
            }
        );
    }
}
