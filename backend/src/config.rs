use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,

    pub claude_api_key: String,
    pub claude_model: String,

    // Per-user guard in front of the chat proxy
    pub chat_rate_limit: u32,
    pub chat_rate_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| parse_origin_list(&v))
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            claude_api_key: env::var("CLAUDE_API_KEY").unwrap_or_else(|_| String::new()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),

            chat_rate_limit: env::var("CHAT_RATE_LIMIT")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
            chat_rate_window_secs: env::var("CHAT_RATE_WINDOW_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Frontend origin first, then any extra origins (e.g. LAN testing).
    pub fn allowed_origins(&self) -> Vec<&str> {
        std::iter::once(self.frontend_url.as_str())
            .chain(self.cors_extra_origins.iter().map(String::as_str))
            .collect()
    }
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_list_trims_and_drops_empty() {
        let origins = parse_origin_list(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_allowed_origins_puts_frontend_first() {
        let config = Config {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 9000,
            frontend_url: "http://localhost:5173".into(),
            cors_extra_origins: vec!["http://192.168.1.20:5173".into()],
            jwt_secret: "secret".into(),
            claude_api_key: String::new(),
            claude_model: "model".into(),
            chat_rate_limit: 20,
            chat_rate_window_secs: 60,
        };
        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:5173", "http://192.168.1.20:5173"]
        );
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }
}
