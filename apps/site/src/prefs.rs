//! Per-client preferences carried in cookies.
//!
//! Only the last selected display locale is stored today (`LOCALE_KEY`). A store is
//! built from one request's `Cookie` headers; values set while handling it come back
//! as `Set-Cookie` headers on the response, so clients never see each other's choice.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::warn;

pub const LOCALE_KEY: &str = "lang";

/// One year.
const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference {key} cannot hold {value:?}")]
    InvalidValue { key: String, value: String },
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Cookie-backed store scoped to a single request.
#[derive(Debug, Default)]
pub struct CookiePrefs {
    incoming: HashMap<String, String>,
    staged: Mutex<BTreeMap<String, String>>,
}

impl CookiePrefs {
    /// Reads every `Cookie` header. The first occurrence of a name wins.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut incoming = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(text) = header.to_str() else {
                continue;
            };
            for pair in text.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    let value = value.trim().trim_matches('"');
                    incoming
                        .entry(name.trim().to_string())
                        .or_insert_with(|| value.to_string());
                }
            }
        }
        Self {
            incoming,
            staged: Mutex::new(BTreeMap::new()),
        }
    }

    /// `Set-Cookie` values for everything set on this store.
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.staged
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|(key, value)| {
                let cookie =
                    format!("{key}={value}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax");
                HeaderValue::from_str(&cookie)
                    .map_err(|e| warn!("Dropping preference cookie {key}: {e}"))
                    .ok()
            })
            .collect()
    }

    /// Appends the staged cookies to `headers`.
    pub fn write_to(&self, headers: &mut HeaderMap) {
        for cookie in self.set_cookie_headers() {
            headers.append(SET_COOKIE, cookie);
        }
    }
}

impl KeyValueStore for CookiePrefs {
    fn get(&self, key: &str) -> Option<String> {
        let staged = self.staged.lock().unwrap_or_else(|e| e.into_inner());
        let value = staged
            .get(key)
            .or_else(|| self.incoming.get(key))
            .filter(|v| !v.is_empty())
            .cloned();
        value
    }

    /// Rejects anything that is not a plain cookie token; nothing is staged then.
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        if !is_cookie_token(key) || !is_cookie_token(value) {
            return Err(PrefsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        self.staged
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn is_cookie_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for c in cookies {
            headers.append(COOKIE, HeaderValue::from_static(*c));
        }
        headers
    }

    #[test]
    fn test_reads_locale_from_cookie_header() {
        let prefs = CookiePrefs::from_headers(&headers(&["theme=dark; lang=en", "lang=fr"]));
        assert_eq!(prefs.get(LOCALE_KEY).as_deref(), Some("en"));
        assert_eq!(CookiePrefs::from_headers(&HeaderMap::new()).get(LOCALE_KEY), None);
        assert_eq!(CookiePrefs::from_headers(&headers(&["lang="])).get(LOCALE_KEY), None);
    }

    #[test]
    fn test_set_is_visible_and_emitted_as_set_cookie() {
        let prefs = CookiePrefs::from_headers(&headers(&["lang=fr"]));
        prefs.set(LOCALE_KEY, "en").unwrap();
        assert_eq!(prefs.get(LOCALE_KEY).as_deref(), Some("en"));

        let mut out = HeaderMap::new();
        prefs.write_to(&mut out);
        let cookies: Vec<_> = out.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert_eq!(
            cookies[0].to_str().unwrap(),
            "lang=en; Path=/; Max-Age=31536000; SameSite=Lax"
        );
    }

    #[test]
    fn test_invalid_value_is_rejected_and_not_staged() {
        let prefs = CookiePrefs::default();
        assert!(matches!(
            prefs.set(LOCALE_KEY, "en; Path=/admin"),
            Err(PrefsError::InvalidValue { .. })
        ));
        assert_eq!(prefs.get(LOCALE_KEY), None);
        assert!(prefs.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_stores_are_independent() {
        let a = CookiePrefs::default();
        let b = CookiePrefs::default();
        a.set(LOCALE_KEY, "en").unwrap();
        assert_eq!(b.get(LOCALE_KEY), None);
    }
}
