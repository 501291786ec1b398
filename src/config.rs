use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub host: String,
    pub port: u16,

    pub token_cookie_name: String,
    pub cookie_secure: bool,

    // none means requests may hang until the backend answers
    pub api_timeout_secs: Option<u64>,

    pub static_dir: String,
}

fn default_static_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string()
}

impl Settings {
    /// Settings pointing the panel at the given backend, everything else default.
    pub fn for_backend(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            token_cookie_name: "authToken".to_string(),
            cookie_secure: false,
            api_timeout_secs: None,
            static_dir: default_static_dir(),
        }
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let api_base_url = env::var("API_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let token_cookie_name = env::var("TOKEN_COOKIE_NAME").unwrap_or_else(|_| "authToken".to_string());

    let cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let api_timeout_secs = env::var("API_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&s| s > 0);

    let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| default_static_dir());

    Settings {
        api_base_url: api_base_url.trim_end_matches('/').to_string(),
        host,
        port,
        token_cookie_name,
        cookie_secure,
        api_timeout_secs,
        static_dir,
    }
}
