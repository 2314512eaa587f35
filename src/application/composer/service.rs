//! In-memory registry of composer sessions, one per page visit.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use lru::LruCache;
use metrics::counter;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::lock::mutex_lock,
    config::ComposerSettings,
    domain::composer::PostComposer,
    infra::telemetry::METRIC_SESSIONS_OPENED,
};

const SOURCE: &str = "application::composer::service";

struct ComposerSession {
    composer: PostComposer,
    last_seen: Instant,
}

impl ComposerSession {
    fn fresh(now: Instant) -> Self {
        Self {
            composer: PostComposer::new(),
            last_seen: now,
        }
    }
}

/// Holds the form state of every open composer page.
///
/// Capacity is bounded: the least recently touched page is forgotten first. A page that
/// comes back after being forgotten, or after sitting idle past the timeout, continues
/// with a blank composer rather than an error.
pub struct ComposerService {
    sessions: Mutex<LruCache<Uuid, ComposerSession>>,
    idle_timeout: Duration,
}

impl ComposerService {
    pub fn new(settings: &ComposerSettings) -> Self {
        Self {
            sessions: Mutex::new(LruCache::new(settings.max_sessions)),
            idle_timeout: settings.session_idle,
        }
    }

    /// Start a composer for a new page visit.
    pub fn open(&self) -> (Uuid, PostComposer) {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let session = ComposerSession::fresh(now);
        let composer = session.composer.clone();

        let evicted = mutex_lock(&self.sessions, SOURCE, "open").push(id, session);
        if let Some((evicted_id, _)) = evicted {
            debug!(
                target = SOURCE,
                session_id = %evicted_id,
                "composer session evicted to make room"
            );
        }

        counter!(METRIC_SESSIONS_OPENED).increment(1);
        (id, composer)
    }

    /// Run `op` against the composer of `id`, creating a blank one when none is live.
    pub fn update<R>(&self, id: Uuid, op: impl FnOnce(&mut PostComposer) -> R) -> R {
        let now = Instant::now();
        let mut sessions = mutex_lock(&self.sessions, SOURCE, "update");

        let expired = sessions
            .peek(&id)
            .is_some_and(|session| now.duration_since(session.last_seen) > self.idle_timeout);
        if expired {
            sessions.pop(&id);
            debug!(target = SOURCE, session_id = %id, "composer session expired");
        }

        let mut created = false;
        let session = sessions.get_or_insert_mut(id, || {
            created = true;
            ComposerSession::fresh(now)
        });
        session.last_seen = now;
        let result = op(&mut session.composer);

        if created {
            debug!(target = SOURCE, session_id = %id, "composer session started lazily");
        }
        result
    }

    /// Forget a composer; returns whether one was live.
    pub fn discard(&self, id: Uuid) -> bool {
        mutex_lock(&self.sessions, SOURCE, "discard")
            .pop(&id)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::domain::types::Visibility;

    fn settings(max_sessions: usize, idle: Duration) -> ComposerSettings {
        ComposerSettings {
            max_sessions: NonZeroUsize::new(max_sessions).expect("non-zero"),
            session_idle: idle,
        }
    }

    fn title_of(service: &ComposerService, id: Uuid) -> String {
        service.update(id, |composer| composer.title().to_string())
    }

    #[test]
    fn updates_persist_within_a_session() {
        let service = ComposerService::new(&settings(4, Duration::from_secs(60)));
        let (id, composer) = service.open();
        assert_eq!(composer.title(), "");

        service.update(id, |composer| composer.update_title("Hello"));
        service.update(id, |composer| composer.select_visibility(Visibility::Collectors));

        assert_eq!(title_of(&service, id), "Hello");
        assert_eq!(
            service.update(id, |composer| composer.visibility()),
            Visibility::Collectors
        );
    }

    #[test]
    fn sessions_are_isolated() {
        let service = ComposerService::new(&settings(4, Duration::from_secs(60)));
        let (first, _) = service.open();
        let (second, _) = service.open();

        service.update(first, |composer| composer.update_content("first"));

        let content_of = |id| service.update(id, |composer| composer.content().to_string());
        assert_eq!(content_of(first), "first");
        assert_eq!(content_of(second), "");
    }

    #[test]
    fn unknown_session_starts_blank() {
        let service = ComposerService::new(&settings(4, Duration::from_secs(60)));
        let id = Uuid::new_v4();

        let count = service.update(id, |composer| composer.character_count());
        assert_eq!(count, 0);
        assert!(service.discard(id), "lazily created session should be live");
    }

    #[test]
    fn least_recent_session_is_evicted_at_capacity() {
        let service = ComposerService::new(&settings(2, Duration::from_secs(60)));
        let (oldest, _) = service.open();
        service.update(oldest, |composer| composer.update_title("kept?"));
        let (middle, _) = service.open();
        let (newest, _) = service.open();

        assert!(!service.discard(oldest));
        assert!(service.discard(middle));
        assert!(service.discard(newest));
    }

    #[test]
    fn idle_session_is_reset() {
        let service = ComposerService::new(&settings(4, Duration::from_millis(1)));
        let (id, _) = service.open();
        service.update(id, |composer| composer.update_title("draft"));

        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(title_of(&service, id), "");
    }

    #[test]
    fn discard_forgets_the_session() {
        let service = ComposerService::new(&settings(4, Duration::from_secs(60)));
        let (id, _) = service.open();

        assert!(service.discard(id));
        assert!(!service.discard(id));
        assert_eq!(title_of(&service, id), "");
    }
}
