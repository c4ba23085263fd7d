//! Per-module preferred window sizes.
//!
//! The sizes live outside the engine. [`HttpModuleDefaults`] talks to the
//! quotation backend's `module-defaults` resource; [`InMemoryModuleDefaults`]
//! keeps them in memory for offline use and tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSize {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error("module defaults request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("module defaults service answered with status {0}")]
    Status(u16),
    #[error("invalid module defaults payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("module defaults store is poisoned")]
    Poisoned,
}

pub trait ModuleDefaults {
    /// Stored size for `module`; `Ok(None)` when nothing has been saved.
    fn fetch(&self, module: &str) -> Result<Option<ModuleSize>, DefaultsError>;

    /// Persist `size` for `module`, returning what the backend recorded.
    fn save(&self, module: &str, size: ModuleSize) -> Result<ModuleSize, DefaultsError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest<'a> {
    module_type: &'a str,
    width: u16,
    height: u16,
}

#[derive(Debug)]
pub struct HttpModuleDefaults {
    client: Client,
    base_url: String,
}

impl HttpModuleDefaults {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DefaultsError> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/module-defaults{}", self.base_url, path)
    }
}

impl ModuleDefaults for HttpModuleDefaults {
    fn fetch(&self, module: &str) -> Result<Option<ModuleSize>, DefaultsError> {
        let response = self.client.get(self.url(&format!("/{module}"))).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(module, "no stored module defaults");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DefaultsError::Status(status.as_u16()));
        }
        let size: ModuleSize = serde_json::from_str(&response.text()?)?;
        tracing::debug!(module, width = size.width, height = size.height, "fetched module defaults");
        Ok(Some(size))
    }

    fn save(&self, module: &str, size: ModuleSize) -> Result<ModuleSize, DefaultsError> {
        let body = serde_json::to_string(&SaveRequest {
            module_type: module,
            width: size.width,
            height: size.height,
        })?;
        let response = self
            .client
            .post(self.url(""))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DefaultsError::Status(status.as_u16()));
        }
        let saved: ModuleSize = serde_json::from_str(&response.text()?)?;
        tracing::info!(module, width = saved.width, height = saved.height, "saved module defaults");
        Ok(saved)
    }
}

/// Cloneable in-memory defaults; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModuleDefaults {
    sizes: Arc<Mutex<BTreeMap<String, ModuleSize>>>,
}

impl InMemoryModuleDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(self, module: &str, size: ModuleSize) -> Self {
        if let Ok(mut sizes) = self.sizes.lock() {
            sizes.insert(module.to_string(), size);
        }
        self
    }

    pub fn get(&self, module: &str) -> Option<ModuleSize> {
        self.sizes.lock().ok()?.get(module).copied()
    }
}

impl ModuleDefaults for InMemoryModuleDefaults {
    fn fetch(&self, module: &str) -> Result<Option<ModuleSize>, DefaultsError> {
        let sizes = self.sizes.lock().map_err(|_| DefaultsError::Poisoned)?;
        Ok(sizes.get(module).copied())
    }

    fn save(&self, module: &str, size: ModuleSize) -> Result<ModuleSize, DefaultsError> {
        let mut sizes = self.sizes.lock().map_err(|_| DefaultsError::Poisoned)?;
        sizes.insert(module.to_string(), size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_defaults_share_state_between_clones() {
        let defaults = InMemoryModuleDefaults::new();
        let handle = defaults.clone();
        assert_eq!(defaults.fetch("parts").unwrap(), None);
        let size = ModuleSize {
            width: 50,
            height: 20,
        };
        assert_eq!(defaults.save("parts", size).unwrap(), size);
        assert_eq!(handle.get("parts"), Some(size));
    }

    #[test]
    fn save_request_uses_backend_field_names() {
        let json = serde_json::to_string(&SaveRequest {
            module_type: "pricing",
            width: 60,
            height: 18,
        })
        .unwrap();
        assert_eq!(json, r#"{"moduleType":"pricing","width":60,"height":18}"#);
    }

    #[test]
    fn saved_record_ignores_extra_fields() {
        let size: ModuleSize =
            serde_json::from_str(r#"{"id":4,"moduleType":"parts","width":70,"height":22}"#).unwrap();
        assert_eq!(
            size,
            ModuleSize {
                width: 70,
                height: 22
            }
        );
    }

    #[test]
    fn http_urls_are_joined_without_double_slashes() {
        let defaults = HttpModuleDefaults::new("http://localhost:8000/api/").unwrap();
        assert_eq!(
            defaults.url("/parts"),
            "http://localhost:8000/api/module-defaults/parts"
        );
        assert_eq!(defaults.url(""), "http://localhost:8000/api/module-defaults");
    }
}
