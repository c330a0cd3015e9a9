//! Optional host shell integration
//!
//! When the camera test runs embedded in a chat client, the client exposes
//! theme colours, haptics and the signed-in user. Every call here degrades to
//! a no-op when no shell is attached.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Haptic impact strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    /// Countdown ticks, gallery selection
    Light,
    /// Mute toggle, camera switch
    Medium,
}

/// Haptic notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

/// Theme colours as delivered by the host, any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeParams {
    /// Background colour
    #[serde(default)]
    pub bg_color: Option<String>,
    /// Text colour
    #[serde(default)]
    pub text_color: Option<String>,
    /// Button colour
    #[serde(default)]
    pub button_color: Option<String>,
    /// Button text colour
    #[serde(default)]
    pub button_text_color: Option<String>,
}

/// Resolved theme colours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeVariables {
    /// Background colour
    pub bg_color: String,
    /// Text colour
    pub text_color: String,
    /// Button colour
    pub button_color: String,
    /// Button text colour
    pub button_text_color: String,
}

impl Default for ThemeVariables {
    fn default() -> Self {
        Self::from_params(&ThemeParams::default())
    }
}

impl ThemeVariables {
    /// Fill missing colours with the light theme
    pub fn from_params(params: &ThemeParams) -> Self {
        let pick = |value: &Option<String>, fallback: &str| {
            value.clone().unwrap_or_else(|| fallback.to_string())
        };
        Self {
            bg_color: pick(&params.bg_color, "#ffffff"),
            text_color: pick(&params.text_color, "#000000"),
            button_color: pick(&params.button_color, "#2481cc"),
            button_text_color: pick(&params.button_text_color, "#ffffff"),
        }
    }

    /// CSS custom properties to apply on the document root
    pub fn css_variables(&self) -> [(&'static str, &str); 4] {
        [
            ("--tg-theme-bg-color", self.bg_color.as_str()),
            ("--tg-theme-text-color", self.text_color.as_str()),
            ("--tg-theme-button-color", self.button_color.as_str()),
            ("--tg-theme-button-text-color", self.button_text_color.as_str()),
        ]
    }
}

/// Capabilities of an embedding host
pub trait HostShell: Send + Sync {
    /// Signal that the app finished loading
    fn ready(&self);

    /// Ask the host to give the app its full height
    fn expand(&self);

    /// Theme colours, if the host has any
    fn theme(&self) -> Option<ThemeParams>;

    /// Fire a haptic impact
    fn impact(&self, style: ImpactStyle);

    /// Fire a haptic notification
    fn notify(&self, kind: NotificationKind);

    /// Identifier of the signed-in user
    fn user_id(&self) -> Option<String>;
}

/// Optional [`HostShell`]
#[derive(Clone, Default)]
pub struct Host {
    shell: Option<Arc<dyn HostShell>>,
}

impl Host {
    /// Attach a host shell
    pub fn new(shell: Arc<dyn HostShell>) -> Self {
        Self { shell: Some(shell) }
    }

    /// Standalone, every call is a no-op
    pub fn none() -> Self {
        Self { shell: None }
    }

    /// Whether a shell is attached
    pub fn is_present(&self) -> bool {
        self.shell.is_some()
    }

    /// Announce readiness and expand the viewport
    pub fn ready(&self) {
        match &self.shell {
            Some(shell) => {
                shell.ready();
                shell.expand();
                debug!("📱 Host shell initialized");
            }
            None => debug!("Not running inside a host shell"),
        }
    }

    /// Theme colours with defaults applied
    pub fn theme(&self) -> ThemeVariables {
        let params = self
            .shell
            .as_ref()
            .and_then(|shell| shell.theme())
            .unwrap_or_default();
        ThemeVariables::from_params(&params)
    }

    /// Fire a haptic impact
    pub fn impact(&self, style: ImpactStyle) {
        if let Some(shell) = &self.shell {
            shell.impact(style);
        }
    }

    /// Fire a haptic notification
    pub fn notify(&self, kind: NotificationKind) {
        if let Some(shell) = &self.shell {
            shell.notify(kind);
        }
    }

    /// Identifier of the signed-in user
    pub fn user_id(&self) -> Option<String> {
        self.shell.as_ref().and_then(|shell| shell.user_id())
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_defaults() {
        let theme = ThemeVariables::default();
        assert_eq!(theme.bg_color, "#ffffff");
        assert_eq!(theme.text_color, "#000000");
        assert_eq!(theme.button_color, "#2481cc");
        assert_eq!(theme.button_text_color, "#ffffff");
    }

    #[test]
    fn test_theme_partial_params() {
        let params: ThemeParams =
            serde_json::from_str(r##"{"bg_color": "#17212b", "text_color": "#f5f5f5"}"##).unwrap();
        let theme = ThemeVariables::from_params(&params);
        assert_eq!(theme.bg_color, "#17212b");
        assert_eq!(theme.button_color, "#2481cc");

        let vars = theme.css_variables();
        assert_eq!(vars[0], ("--tg-theme-bg-color", "#17212b"));
        assert_eq!(vars[1], ("--tg-theme-text-color", "#f5f5f5"));
    }

    #[test]
    fn test_absent_host_is_noop() {
        let host = Host::none();
        assert!(!host.is_present());
        host.ready();
        host.impact(ImpactStyle::Light);
        host.notify(NotificationKind::Error);
        assert!(host.user_id().is_none());
        assert_eq!(host.theme(), ThemeVariables::default());
    }
}
