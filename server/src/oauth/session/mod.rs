use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;

/// Key the anti-CSRF value is stored under
pub const STATE_KEY: &str = "state";

const STATE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const STATE_LEN: usize = 16;

/// Session-scoped key/value storage that outlives the redirect to the
/// identity provider.
///
/// The page server backs this with a private session cookie
/// ([`crate::cookies::CookieSessionStore`]); the CLI and tests use
/// [`MemorySessionStore`].
pub trait SessionStore {
    fn set_item(&self, key: &str, value: &str);

    fn get_item(&self, key: &str) -> Option<String>;
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }
}

/// In-process session store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore for MemorySessionStore {
    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
    }

    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.get(key).cloned()
    }
}

/// Generate an opaque base-36 `state` value
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_LEN)
        .map(|_| STATE_ALPHABET[rng.gen_range(0..STATE_ALPHABET.len())] as char)
        .collect()
}

/// Compare a returned `state` with the stored one.
///
/// Only used for logging; a mismatch does not stop the flow.
pub fn state_matches(stored: Option<&str>, returned: Option<&str>) -> bool {
    matches!((stored, returned), (Some(s), Some(r)) if s == r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_state_is_base36() {
        let state = generate_state();

        assert_eq!(state.len(), STATE_LEN);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn generated_states_differ() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemorySessionStore::default();
        let other = store.clone();

        store.set_item(STATE_KEY, "abc");

        assert_eq!(other.get_item(STATE_KEY).as_deref(), Some("abc"));
        assert_eq!(other.get_item("missing"), None);
    }

    #[test]
    fn state_comparison() {
        assert!(state_matches(Some("a"), Some("a")));
        assert!(!state_matches(Some("a"), Some("b")));
        assert!(!state_matches(None, Some("a")));
        assert!(!state_matches(Some("a"), None));
    }
}
