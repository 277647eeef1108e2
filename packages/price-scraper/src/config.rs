use anyhow::{bail, Result};
use secrecy::SecretString;
use std::env;
use supabase_client::SupabaseOptions;

pub const SUPABASE_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_service_role_key: SecretString,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env files if present (development)
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let url = read(SUPABASE_URL_VAR);
        let key = read(SERVICE_ROLE_KEY_VAR);

        match (url, key) {
            (Some(supabase_url), Some(key)) => Ok(Self {
                supabase_url,
                supabase_service_role_key: SecretString::from(key),
            }),
            (url, key) => {
                let missing: Vec<&str> = [
                    (SUPABASE_URL_VAR, url.is_none()),
                    (SERVICE_ROLE_KEY_VAR, key.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                bail!(
                    "Missing required environment variables: {}",
                    missing.join(", ")
                )
            }
        }
    }

    pub fn supabase_options(&self) -> SupabaseOptions {
        SupabaseOptions {
            url: self.supabase_url.clone(),
            service_role_key: self.supabase_service_role_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_loads_both_values() {
        let config = Config::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "https://project.supabase.co"),
            (SERVICE_ROLE_KEY_VAR, "service-key"),
        ]))
        .unwrap();

        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(config.supabase_service_role_key.expose_secret(), "service-key");
        assert!(!format!("{:?}", config).contains("service-key"));
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[(
            SUPABASE_URL_VAR,
            "https://project.supabase.co",
        )]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: SUPABASE_SERVICE_ROLE_KEY"
        );
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let err = Config::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, " "),
            (SERVICE_ROLE_KEY_VAR, ""),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: NEXT_PUBLIC_SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY"
        );
    }
}
