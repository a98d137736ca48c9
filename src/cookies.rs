use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};

pub const TOKEN_COOKIE: &str = "token";

/// Carries the identity token in a signed, HTTP-only cookie.
#[derive(Clone)]
pub struct CookieTransport {
    key: Key,
    secure: bool,
    max_age: time::Duration,
}

impl CookieTransport {
    /// `secret` must be at least 32 bytes; `Config` enforces this at startup.
    pub fn new(secret: &[u8], secure: bool, max_age: time::Duration) -> Self {
        Self {
            key: Key::derive_from(secret),
            secure,
            max_age,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .build()
    }

    pub fn attach(&self, jar: SignedCookieJar, token: String) -> SignedCookieJar {
        let mut cookie = self.build(token);
        cookie.set_max_age(self.max_age);
        jar.add(cookie)
    }

    /// Missing cookies and cookies whose signature does not check out both read as `None`.
    pub fn read(&self, jar: &SignedCookieJar) -> Option<String> {
        jar.get(TOKEN_COOKIE).map(|cookie| cookie.value().to_string())
    }

    /// Always emits an expired cookie, even when the request carried none.
    pub fn clear(&self, jar: SignedCookieJar) -> SignedCookieJar {
        let mut cookie = self.build(String::new());
        cookie.make_removal();
        jar.add(cookie)
    }
}
