//! Preference reconciler.
//!
//! Keeps the visible theme local-first (instant, no flicker) while the
//! server-held preferences record converges in the background, and projects
//! accent color and accessibility flags onto the render root.

pub mod config;
pub mod domain;
pub mod infra;


pub use config::PreferencesConfig;
pub use domain::error::DomainError;
pub use domain::local_theme::{LocalThemeStore, THEME_KEY};
pub use domain::notifier::{Notifier, TracingNotifier};
pub use domain::render_root::{
    ACCENT_ATTRIBUTE, DARK_CLASS, DocumentRoot, HIGH_CONTRAST_CLASS, LARGE_TEXT_CLASS,
    REDUCED_MOTION_CLASS, RenderRoot,
};
pub use domain::service::{PreferencesService, ServiceConfig};
pub use domain::theme_channel::ThemeChannel;
pub use infra::rest::RestPreferencesClient;
