use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub default_slot_minutes: i64,
    pub slot_step_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_host: env::var("BIND_HOST").unwrap_or_else(|_| {
                warn!("BIND_HOST not set, using 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            bind_port: env::var("BIND_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| {
                    warn!("BIND_PORT not set, using 3000");
                    3000
                }),
            default_slot_minutes: env::var("DEFAULT_SLOT_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(30),
            slot_step_minutes: env::var("SLOT_STEP_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(15),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
            default_slot_minutes: 30,
            slot_step_minutes: 15,
        }
    }
}
