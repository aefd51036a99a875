pub mod error;
pub mod local_theme;
pub mod notifier;
pub mod render_root;
pub mod service;
pub mod theme_channel;

#[cfg(test)]
mod service_test;
