//! Session cookie formatting

use crate::config::app_config::SessionConfig;

pub const DEFAULT_COOKIE_NAME: &str = "authToken";

/// Builds `Set-Cookie` values for the session token. Issuing and clearing
/// use identical attributes so browsers treat them as the same cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: &'static str,
    config: SessionConfig,
}

impl SessionCookie {
    pub fn new(config: SessionConfig) -> Self {
        // warp's cookie filter wants a 'static name; a custom one is
        // resolved once per server
        let name = if config.cookie_name == DEFAULT_COOKIE_NAME {
            DEFAULT_COOKIE_NAME
        } else {
            Box::leak(config.cookie_name.clone().into_boxed_str())
        };
        Self { name, config }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn format(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name, value, max_age, self.config.path
        );
        if let Some(domain) = &self.config.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        if self.config.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.config.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(&self.config.same_site);
        cookie
    }

    /// Cookie carrying a freshly issued session token
    pub fn issue(&self, token: &str) -> String {
        self.format(token, self.config.max_age_seconds)
    }

    /// Empty, immediately expiring cookie
    pub fn clear(&self) -> String {
        self.format("", 0)
    }
}
