use rollcall_core::checkin::DEFAULT_SWEEP_INTERVAL_SECS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks to stop (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Page students land on after scanning; the session code is appended
    /// as `?session=<code>`.
    pub checkin_base_url: String,
    /// Period of the expiry sweeper in seconds (default: `60`).
    pub session_sweep_interval_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                         |
    /// |-------------------------------|---------------------------------|
    /// | `HOST`                        | `0.0.0.0`                       |
    /// | `PORT`                        | `3000`                          |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                            |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                            |
    /// | `CHECKIN_BASE_URL`            | `http://localhost:5173/checkin` |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `60`                            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let checkin_base_url = std::env::var("CHECKIN_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173/checkin".into());

        let session_sweep_interval_secs: u64 = std::env::var("SESSION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse()
            .expect("SESSION_SWEEP_INTERVAL_SECS must be a valid u64");
        assert!(
            session_sweep_interval_secs > 0,
            "SESSION_SWEEP_INTERVAL_SECS must be greater than zero"
        );

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            checkin_base_url,
            session_sweep_interval_secs,
            jwt,
        }
    }

    /// Link encoded into the session QR code.
    pub fn checkin_url(&self, session_code: &str) -> String {
        format!(
            "{}?session={session_code}",
            self.checkin_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkin_url_appends_session_code() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            checkin_base_url: "https://attend.example.edu/checkin/".into(),
            session_sweep_interval_secs: 60,
            jwt: JwtConfig {
                secret: "s".into(),
                access_token_expiry_mins: 15,
            },
        };
        assert_eq!(
            config.checkin_url("S20261018ABCDEFGH"),
            "https://attend.example.edu/checkin?session=S20261018ABCDEFGH"
        );
    }
}
