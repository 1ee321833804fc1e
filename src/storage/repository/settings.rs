// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Singleton settings document.
//!
//! Every section is a fully typed struct; after `load()` all fields are
//! present, with missing stored sections (or fields) filled from defaults.
//! Reads never traverse optional chains. Updates replace exactly one
//! validated section at a time.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::super::{DocumentStore, StorageError, StorageResult};

/// Site-wide general settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    #[validate(length(min = 1, message = "Site name is required"))]
    pub site_name: String,
    pub site_description: String,
    #[validate(custom(function = validate_http_url))]
    pub site_url: String,
    #[validate(email(message = "Admin email must be a valid email"))]
    pub admin_email: String,
    #[validate(length(min = 1, message = "Timezone is required"))]
    pub timezone: String,
    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            site_name: "Opsdesk".to_string(),
            site_description: "Business administration panel".to_string(),
            site_url: "https://admin.example.com".to_string(),
            admin_email: "admin@example.com".to_string(),
            timezone: "UTC".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Notification toggles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub inquiry_alerts: bool,
    pub project_updates: bool,
    pub system_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            inquiry_alerts: true,
            project_updates: true,
            system_alerts: true,
        }
    }
}

/// Password policy nested in the security section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordPolicy {
    #[validate(range(min = 6, max = 32))]
    pub min_length: u8,
    pub require_uppercase: bool,
    pub require_numbers: bool,
    pub require_symbols: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_numbers: true,
            require_symbols: false,
        }
    }
}

/// Security settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettings {
    pub two_factor_auth: bool,
    /// Idle session timeout in minutes.
    #[validate(range(min = 5, max = 480))]
    pub session_timeout: u32,
    #[validate(nested)]
    pub password_policy: PasswordPolicy,
    pub ip_whitelist: Vec<String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_auth: false,
            session_timeout: 30,
            password_policy: PasswordPolicy::default(),
            ip_whitelist: Vec::new(),
        }
    }
}

/// UI theme choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::System
    }
}

/// Appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearanceSettings {
    pub theme: Theme,
    /// Hex color, `#RRGGBB`.
    #[validate(custom(function = validate_hex_color))]
    pub primary_color: String,
    pub logo: String,
    pub favicon: String,
}

fn validate_hex_color(value: &str) -> Result<(), validator::ValidationError> {
    let ok = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if ok {
        Ok(())
    } else {
        Err(validator::ValidationError::new("hex_color"))
    }
}

fn validate_http_url(value: &str) -> Result<(), validator::ValidationError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(validator::ValidationError::new("http_url"))
    }
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            primary_color: "#4B49AC".to_string(),
            logo: String::new(),
            favicon: String::new(),
        }
    }
}

/// Third-party integration keys. Empty string means "not configured".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationSettings {
    pub google_analytics: String,
    pub facebook_pixel: String,
    pub mailchimp_api_key: String,
    pub slack_webhook: String,
}

/// Backup cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl Default for BackupFrequency {
    fn default() -> Self {
        BackupFrequency::Daily
    }
}

/// Backup settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupSettings {
    pub auto_backup: bool,
    pub backup_frequency: BackupFrequency,
    /// Retention in days.
    #[validate(range(min = 1, max = 365))]
    pub backup_retention: u16,
    pub last_backup: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            backup_frequency: BackupFrequency::Daily,
            backup_retention: 30,
            last_backup: String::new(),
        }
    }
}

/// The singleton settings document. All sections present after load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub notifications: NotificationSettings,
    pub security: SecuritySettings,
    pub appearance: AppearanceSettings,
    pub integrations: IntegrationSettings,
    pub backup: BackupSettings,
}

/// Repository for the settings singleton.
pub struct SettingsRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new SettingsRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Load the settings document, materializing defaults when the file is
    /// missing or partial.
    pub fn load(&self) -> StorageResult<Settings> {
        let path = self.storage.paths().settings_file();
        if !self.storage.exists(&path) {
            return Ok(Settings::default());
        }
        self.storage.read_json(path)
    }

    /// Persist the full settings document.
    pub fn save(&self, settings: &Settings) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().settings_file(), settings)
    }

    /// Validate and replace a single named section.
    ///
    /// Returns the updated document. Unknown sections and payloads that do
    /// not validate are rejected.
    pub fn update_section(
        &self,
        section: &str,
        data: serde_json::Value,
    ) -> StorageResult<Settings> {
        let mut settings = self.load()?;

        match section {
            "general" => settings.general = parse_section(data)?,
            "notifications" => settings.notifications = parse_section(data)?,
            "security" => settings.security = parse_section(data)?,
            "appearance" => settings.appearance = parse_section(data)?,
            "integrations" => settings.integrations = parse_section(data)?,
            "backup" => settings.backup = parse_section(data)?,
            other => {
                return Err(StorageError::SerializationError(format!(
                    "Unknown settings section: {other}"
                )))
            }
        }

        self.save(&settings)?;
        Ok(settings)
    }
}

fn parse_section<T>(data: serde_json::Value) -> StorageResult<T>
where
    T: serde::de::DeserializeOwned + Validate,
{
    let section: T = serde_json::from_value(data)
        .map_err(|e| StorageError::SerializationError(format!("Invalid section payload: {e}")))?;
    section
        .validate()
        .map_err(|e| StorageError::SerializationError(format!("Section validation failed: {e}")))?;
    Ok(section)
}
