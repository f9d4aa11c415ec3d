mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod server_config;
mod ui_config;

pub(crate) use {
    audio_config::AudioConfig, config::Config, server_config::ServerConfig, ui_config::UiConfig,
};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:2024";
pub(crate) const DEFAULT_THEME: &str = "dark";

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}
