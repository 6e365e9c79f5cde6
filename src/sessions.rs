//! Cookie-keyed store of per-visitor forecast contexts.

use axum::http::{HeaderMap, header::COOKIE};
use compute::SessionContext;
use moka::future::Cache;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "brentcast_session";

/// A visitor's session as seen by one request.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub context: SessionContext,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    cache: Cache<Uuid, SessionContext>,
}

impl SessionStore {
    /// A store holding at most `capacity` sessions, each dropped after `idle`
    /// without access.
    pub fn new(capacity: u64, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .build();
        Self { cache }
    }

    /// The session named by the request cookie. Unknown, expired or missing
    /// sessions come back with a fresh context, under a new id when the
    /// request carried none.
    pub async fn load(&self, headers: &HeaderMap) -> Session {
        match session_id(headers) {
            Some(id) => {
                let context = self.cache.get(&id).await.unwrap_or_else(|| {
                    debug!(%id, "Unknown or expired session");
                    SessionContext::new()
                });
                Session { id, context }
            }
            None => {
                let id = Uuid::new_v4();
                trace!(%id, "Starting new session");
                Session {
                    id,
                    context: SessionContext::new(),
                }
            }
        }
    }

    /// The context stored for `headers`' session, without creating one.
    pub async fn existing(&self, headers: &HeaderMap) -> Option<SessionContext> {
        let id = session_id(headers)?;
        self.cache.get(&id).await
    }

    pub async fn save(&self, session: Session) {
        self.cache.insert(session.id, session.context).await;
    }
}

/// Value of the `Set-Cookie` header naming `id`.
pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Session id carried by the `Cookie` headers, if any parses.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use compute::Horizon;
    use compute::testing::fixture_model;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_id_among_other_cookies() {
        let id = Uuid::new_v4();
        let headers = headers_with_cookie(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=pt"));

        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_session_id_rejects_malformed_values() {
        assert_eq!(session_id(&HeaderMap::new()), None);
        assert_eq!(session_id(&headers_with_cookie(&format!("{SESSION_COOKIE}=abc"))), None);
        assert_eq!(session_id(&headers_with_cookie("other=1")), None);
    }

    #[test]
    fn test_session_cookie_round_trips() {
        let id = Uuid::new_v4();
        let cookie = session_cookie(id);
        let name_value = cookie.split(';').next().unwrap();

        assert_eq!(session_id(&headers_with_cookie(name_value)), Some(id));
    }

    #[tokio::test]
    async fn test_load_without_cookie_starts_fresh_session() {
        let store = SessionStore::new(10, Duration::from_secs(60));
        let session = store.load(&HeaderMap::new()).await;

        assert!(!session.context.forecast_requested);
        assert!(store.existing(&HeaderMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_saved_context_is_returned_for_its_cookie_only() {
        let store = SessionStore::new(10, Duration::from_secs(60));
        let model = fixture_model();

        let mut session = store.load(&HeaderMap::new()).await;
        session
            .context
            .submit(&model, Horizon::new(3).unwrap())
            .unwrap();
        let id = session.id;
        store.save(session).await;

        let mine = headers_with_cookie(&format!("{SESSION_COOKIE}={id}"));
        let loaded = store.load(&mine).await;
        assert_eq!(loaded.id, id);
        assert!(loaded.context.forecast_requested);
        assert_eq!(loaded.context.horizon().days(), 3);

        let other = headers_with_cookie(&format!("{SESSION_COOKIE}={}", Uuid::new_v4()));
        assert!(store.existing(&other).await.is_none());
        assert!(!store.load(&other).await.context.forecast_requested);
    }
}
