//! Wire DTOs for the preferences resource.

use std::collections::BTreeMap;

use preferences_sdk::{FormValidationMode, Preferences, PreferencesPatch, Theme};
use serde::{Deserialize, Serialize};

/// Full preferences record as sent in a `PUT`.
#[derive(Debug, Clone, Serialize)]
pub struct PreferencesDto {
    pub theme: String,
    pub accent_color: String,
    pub sidebar_collapsed: bool,
    pub compact_mode: bool,
    pub dense_tables: bool,
    pub company_documents_order: Vec<String>,
    pub safety_documents_order: Vec<String>,
    pub dashboard_widgets: BTreeMap<String, bool>,
    pub notifications: BTreeMap<String, bool>,
    pub table_page_size: u32,
    pub table_sort_preferences: BTreeMap<String, serde_json::Value>,
    pub auto_save_forms: bool,
    pub form_validation_mode: String,
    pub high_contrast: bool,
    pub large_text: bool,
    pub reduced_motion: bool,
    pub language: String,
    pub timezone: String,
    pub date_format: String,
    pub time_format: String,
}

impl From<Preferences> for PreferencesDto {
    fn from(p: Preferences) -> Self {
        Self {
            theme: p.theme.as_str().to_owned(),
            accent_color: p.accent_color,
            sidebar_collapsed: p.sidebar_collapsed,
            compact_mode: p.compact_mode,
            dense_tables: p.dense_tables,
            company_documents_order: p.company_documents_order,
            safety_documents_order: p.safety_documents_order,
            dashboard_widgets: p.dashboard_widgets,
            notifications: p.notifications,
            table_page_size: p.table_page_size,
            table_sort_preferences: p.table_sort_preferences,
            auto_save_forms: p.auto_save_forms,
            form_validation_mode: p.form_validation_mode.as_str().to_owned(),
            high_contrast: p.high_contrast,
            large_text: p.large_text,
            reduced_motion: p.reduced_motion,
            language: p.language,
            timezone: p.timezone,
            date_format: p.date_format,
            time_format: p.time_format,
        }
    }
}

/// Preferences record as received from the server.
///
/// Every field is optional: absent and `null` fields alike are completed
/// from the baseline. Enum fields travel as strings; unknown values, and a
/// zero page size, fall back to the baseline too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferencesRecordDto {
    pub theme: Option<String>,
    pub accent_color: Option<String>,
    pub sidebar_collapsed: Option<bool>,
    pub compact_mode: Option<bool>,
    pub dense_tables: Option<bool>,
    pub company_documents_order: Option<Vec<String>>,
    pub safety_documents_order: Option<Vec<String>>,
    pub dashboard_widgets: Option<BTreeMap<String, bool>>,
    pub notifications: Option<BTreeMap<String, bool>>,
    pub table_page_size: Option<u32>,
    pub table_sort_preferences: Option<BTreeMap<String, serde_json::Value>>,
    pub auto_save_forms: Option<bool>,
    pub form_validation_mode: Option<String>,
    pub high_contrast: Option<bool>,
    pub large_text: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
}

impl From<PreferencesRecordDto> for Preferences {
    fn from(dto: PreferencesRecordDto) -> Self {
        let base = Preferences::default();

        let theme = dto.theme.map_or(base.theme, |raw| {
            raw.parse::<Theme>().unwrap_or_else(|e| {
                tracing::debug!(error = %e, "unknown theme from server; using baseline");
                base.theme
            })
        });
        let form_validation_mode =
            dto.form_validation_mode
                .map_or(base.form_validation_mode, |raw| {
                    raw.parse::<FormValidationMode>().unwrap_or_else(|e| {
                        tracing::debug!(error = %e, "unknown validation mode from server; using baseline");
                        base.form_validation_mode
                    })
                });
        let table_page_size = match dto.table_page_size {
            Some(0) => {
                tracing::debug!("zero table page size from server; using baseline");
                base.table_page_size
            }
            Some(size) => size,
            None => base.table_page_size,
        };

        Self {
            theme,
            accent_color: dto.accent_color.unwrap_or(base.accent_color),
            sidebar_collapsed: dto.sidebar_collapsed.unwrap_or(base.sidebar_collapsed),
            compact_mode: dto.compact_mode.unwrap_or(base.compact_mode),
            dense_tables: dto.dense_tables.unwrap_or(base.dense_tables),
            company_documents_order: dto
                .company_documents_order
                .unwrap_or(base.company_documents_order),
            safety_documents_order: dto
                .safety_documents_order
                .unwrap_or(base.safety_documents_order),
            dashboard_widgets: dto.dashboard_widgets.unwrap_or(base.dashboard_widgets),
            notifications: dto.notifications.unwrap_or(base.notifications),
            table_page_size,
            table_sort_preferences: dto
                .table_sort_preferences
                .unwrap_or(base.table_sort_preferences),
            auto_save_forms: dto.auto_save_forms.unwrap_or(base.auto_save_forms),
            form_validation_mode,
            high_contrast: dto.high_contrast.unwrap_or(base.high_contrast),
            large_text: dto.large_text.unwrap_or(base.large_text),
            reduced_motion: dto.reduced_motion.unwrap_or(base.reduced_motion),
            language: dto.language.unwrap_or(base.language),
            timezone: dto.timezone.unwrap_or(base.timezone),
            date_format: dto.date_format.unwrap_or(base.date_format),
            time_format: dto.time_format.unwrap_or(base.time_format),
        }
    }
}

/// PATCH body. Only present fields are serialized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreferencesPatchDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dense_tables: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_documents_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_documents_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_widgets: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_sort_preferences: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save_forms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_validation_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
}

impl From<PreferencesPatch> for PreferencesPatchDto {
    fn from(p: PreferencesPatch) -> Self {
        Self {
            theme: p.theme.map(|t| t.as_str().to_owned()),
            accent_color: p.accent_color,
            sidebar_collapsed: p.sidebar_collapsed,
            compact_mode: p.compact_mode,
            dense_tables: p.dense_tables,
            company_documents_order: p.company_documents_order,
            safety_documents_order: p.safety_documents_order,
            dashboard_widgets: p.dashboard_widgets,
            notifications: p.notifications,
            table_page_size: p.table_page_size,
            table_sort_preferences: p.table_sort_preferences,
            auto_save_forms: p.auto_save_forms,
            form_validation_mode: p.form_validation_mode.map(|m| m.as_str().to_owned()),
            high_contrast: p.high_contrast,
            large_text: p.large_text,
            reduced_motion: p.reduced_motion,
            language: p.language,
            timezone: p.timezone,
            date_format: p.date_format,
            time_format: p.time_format,
        }
    }
}
