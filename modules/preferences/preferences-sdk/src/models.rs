//! Public models for the preferences module.
//!
//! These are transport-agnostic data structures; wire DTOs live in the
//! implementation crate.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::PreferencesError;

/// Theme as stored in the preferences record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Declared by the schema but rendered as [`Appearance::Light`].
    System,
}

impl Theme {
    /// Collapse to the binary appearance the UI actually renders.
    ///
    /// `System` renders as light; OS-level preference following is not
    /// implemented.
    #[must_use]
    pub fn appearance(self) -> Appearance {
        match self {
            Self::Dark => Appearance::Dark,
            Self::Light | Self::System => Appearance::Light,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(UnknownVariant::new("theme", s)),
        }
    }
}

impl From<Appearance> for Theme {
    fn from(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::Light,
            Appearance::Dark => Self::Dark,
        }
    }
}

/// Rendered light/dark mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When form fields are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormValidationMode {
    #[default]
    RealTime,
    OnSubmit,
}

impl FormValidationMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RealTime => "real_time",
            Self::OnSubmit => "on_submit",
        }
    }
}

impl fmt::Display for FormValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormValidationMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "real_time" | "realtime" => Ok(Self::RealTime),
            "on_submit" | "onsubmit" => Ok(Self::OnSubmit),
            _ => Err(UnknownVariant::new("form_validation_mode", s)),
        }
    }
}

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.field, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// The full preferences record.
///
/// Always fully populated; [`Preferences::default`] is the baseline used to
/// fill anything the server omits.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub theme: Theme,
    pub accent_color: String,

    pub sidebar_collapsed: bool,
    pub compact_mode: bool,
    pub dense_tables: bool,

    /// Ordered, unique document codes.
    pub company_documents_order: Vec<String>,
    pub safety_documents_order: Vec<String>,

    /// Widget name -> visible.
    pub dashboard_widgets: BTreeMap<String, bool>,
    /// Channel name -> enabled.
    pub notifications: BTreeMap<String, bool>,

    pub table_page_size: u32,
    /// Table id -> sort settings. Opaque to the client core.
    pub table_sort_preferences: BTreeMap<String, serde_json::Value>,

    pub auto_save_forms: bool,
    pub form_validation_mode: FormValidationMode,

    pub high_contrast: bool,
    pub large_text: bool,
    pub reduced_motion: bool,

    pub language: String,
    pub timezone: String,
    pub date_format: String,
    pub time_format: String,
}

impl Default for Preferences {
    fn default() -> Self {
        let flags = |names: &[(&str, bool)]| {
            names
                .iter()
                .map(|(name, on)| ((*name).to_owned(), *on))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            theme: Theme::Light,
            accent_color: "blue".to_owned(),
            sidebar_collapsed: false,
            compact_mode: false,
            dense_tables: false,
            company_documents_order: Vec::new(),
            safety_documents_order: Vec::new(),
            dashboard_widgets: flags(&[
                ("active_jobs", true),
                ("recent_documents", true),
                ("team_overview", true),
                ("upcoming_deadlines", true),
            ]),
            notifications: flags(&[("email", true), ("push", true), ("sms", false)]),
            table_page_size: 10,
            table_sort_preferences: BTreeMap::new(),
            auto_save_forms: true,
            form_validation_mode: FormValidationMode::RealTime,
            high_contrast: false,
            large_text: false,
            reduced_motion: false,
            language: "en".to_owned(),
            timezone: "UTC".to_owned(),
            date_format: "MM/DD/YYYY".to_owned(),
            time_format: "12h".to_owned(),
        }
    }
}

/// Partial update. Only `Some` fields are sent to the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
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
    pub form_validation_mode: Option<FormValidationMode>,
    pub high_contrast: Option<bool>,
    pub large_text: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
}

impl PreferencesPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every `Some` field onto `target`.
    pub fn apply_to(self, target: &mut Preferences) {
        macro_rules! merge {
            ($($field:ident),+ $(,)?) => {
                $(if let Some(value) = self.$field {
                    target.$field = value;
                })+
            };
        }
        merge!(
            theme,
            accent_color,
            sidebar_collapsed,
            compact_mode,
            dense_tables,
            company_documents_order,
            safety_documents_order,
            dashboard_widgets,
            notifications,
            table_page_size,
            table_sort_preferences,
            auto_save_forms,
            form_validation_mode,
            high_contrast,
            large_text,
            reduced_motion,
            language,
            timezone,
            date_format,
            time_format,
        );
    }
}

/// A single-field update: the key is the variant, the value its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceUpdate {
    Theme(Theme),
    AccentColor(String),
    SidebarCollapsed(bool),
    CompactMode(bool),
    DenseTables(bool),
    CompanyDocumentsOrder(Vec<String>),
    SafetyDocumentsOrder(Vec<String>),
    DashboardWidgets(BTreeMap<String, bool>),
    Notifications(BTreeMap<String, bool>),
    TablePageSize(u32),
    TableSortPreferences(BTreeMap<String, serde_json::Value>),
    AutoSaveForms(bool),
    FormValidationMode(FormValidationMode),
    HighContrast(bool),
    LargeText(bool),
    ReducedMotion(bool),
    Language(String),
    Timezone(String),
    DateFormat(String),
    TimeFormat(String),
}

impl PreferenceUpdate {
    /// Wire name of the field this update targets.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Theme(_) => "theme",
            Self::AccentColor(_) => "accent_color",
            Self::SidebarCollapsed(_) => "sidebar_collapsed",
            Self::CompactMode(_) => "compact_mode",
            Self::DenseTables(_) => "dense_tables",
            Self::CompanyDocumentsOrder(_) => "company_documents_order",
            Self::SafetyDocumentsOrder(_) => "safety_documents_order",
            Self::DashboardWidgets(_) => "dashboard_widgets",
            Self::Notifications(_) => "notifications",
            Self::TablePageSize(_) => "table_page_size",
            Self::TableSortPreferences(_) => "table_sort_preferences",
            Self::AutoSaveForms(_) => "auto_save_forms",
            Self::FormValidationMode(_) => "form_validation_mode",
            Self::HighContrast(_) => "high_contrast",
            Self::LargeText(_) => "large_text",
            Self::ReducedMotion(_) => "reduced_motion",
            Self::Language(_) => "language",
            Self::Timezone(_) => "timezone",
            Self::DateFormat(_) => "date_format",
            Self::TimeFormat(_) => "time_format",
        }
    }
}

impl PreferenceUpdate {
    /// Build an update from a wire key and an untyped JSON value.
    ///
    /// # Errors
    /// Returns [`PreferencesError::Validation`] for an unknown key or a value
    /// of the wrong shape.
    pub fn from_json(key: &str, value: serde_json::Value) -> Result<Self, PreferencesError> {
        fn typed<T: serde::de::DeserializeOwned>(
            key: &str,
            value: serde_json::Value,
        ) -> Result<T, PreferencesError> {
            serde_json::from_value(value)
                .map_err(|e| PreferencesError::validation(key, e.to_string()))
        }

        fn parsed<T>(key: &str, value: serde_json::Value) -> Result<T, PreferencesError>
        where
            T: FromStr<Err = UnknownVariant>,
        {
            typed::<String>(key, value)?
                .parse()
                .map_err(|e: UnknownVariant| PreferencesError::validation(key, e.to_string()))
        }

        Ok(match key {
            "theme" => Self::Theme(parsed(key, value)?),
            "accent_color" => Self::AccentColor(typed(key, value)?),
            "sidebar_collapsed" => Self::SidebarCollapsed(typed(key, value)?),
            "compact_mode" => Self::CompactMode(typed(key, value)?),
            "dense_tables" => Self::DenseTables(typed(key, value)?),
            "company_documents_order" => Self::CompanyDocumentsOrder(typed(key, value)?),
            "safety_documents_order" => Self::SafetyDocumentsOrder(typed(key, value)?),
            "dashboard_widgets" => Self::DashboardWidgets(typed(key, value)?),
            "notifications" => Self::Notifications(typed(key, value)?),
            "table_page_size" => Self::TablePageSize(typed(key, value)?),
            "table_sort_preferences" => Self::TableSortPreferences(typed(key, value)?),
            "auto_save_forms" => Self::AutoSaveForms(typed(key, value)?),
            "form_validation_mode" => Self::FormValidationMode(parsed(key, value)?),
            "high_contrast" => Self::HighContrast(typed(key, value)?),
            "large_text" => Self::LargeText(typed(key, value)?),
            "reduced_motion" => Self::ReducedMotion(typed(key, value)?),
            "language" => Self::Language(typed(key, value)?),
            "timezone" => Self::Timezone(typed(key, value)?),
            "date_format" => Self::DateFormat(typed(key, value)?),
            "time_format" => Self::TimeFormat(typed(key, value)?),
            other => {
                return Err(PreferencesError::validation(other, "unknown preference key"));
            }
        })
    }
}

impl From<PreferenceUpdate> for PreferencesPatch {
    fn from(update: PreferenceUpdate) -> Self {
        let mut patch = Self::default();
        match update {
            PreferenceUpdate::Theme(v) => patch.theme = Some(v),
            PreferenceUpdate::AccentColor(v) => patch.accent_color = Some(v),
            PreferenceUpdate::SidebarCollapsed(v) => patch.sidebar_collapsed = Some(v),
            PreferenceUpdate::CompactMode(v) => patch.compact_mode = Some(v),
            PreferenceUpdate::DenseTables(v) => patch.dense_tables = Some(v),
            PreferenceUpdate::CompanyDocumentsOrder(v) => patch.company_documents_order = Some(v),
            PreferenceUpdate::SafetyDocumentsOrder(v) => patch.safety_documents_order = Some(v),
            PreferenceUpdate::DashboardWidgets(v) => patch.dashboard_widgets = Some(v),
            PreferenceUpdate::Notifications(v) => patch.notifications = Some(v),
            PreferenceUpdate::TablePageSize(v) => patch.table_page_size = Some(v),
            PreferenceUpdate::TableSortPreferences(v) => patch.table_sort_preferences = Some(v),
            PreferenceUpdate::AutoSaveForms(v) => patch.auto_save_forms = Some(v),
            PreferenceUpdate::FormValidationMode(v) => patch.form_validation_mode = Some(v),
            PreferenceUpdate::HighContrast(v) => patch.high_contrast = Some(v),
            PreferenceUpdate::LargeText(v) => patch.large_text = Some(v),
            PreferenceUpdate::ReducedMotion(v) => patch.reduced_motion = Some(v),
            PreferenceUpdate::Language(v) => patch.language = Some(v),
            PreferenceUpdate::Timezone(v) => patch.timezone = Some(v),
            PreferenceUpdate::DateFormat(v) => patch.date_format = Some(v),
            PreferenceUpdate::TimeFormat(v) => patch.time_format = Some(v),
        }
        patch
    }
}
