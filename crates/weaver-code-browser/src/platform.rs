//! Platform detection from the navigator.
//!
//! Decides the primary shortcut modifier (Cmd on Apple platforms, Ctrl
//! elsewhere) and a few engine flags used for workarounds.

use std::sync::OnceLock;

/// Cached platform detection results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    pub ios: bool,
    pub mac: bool,
    pub android: bool,
    pub chrome: bool,
    pub safari: bool,
    pub gecko: bool,
    pub mobile: bool,
}

impl Platform {
    /// Classify from a user agent and `navigator.platform` string.
    pub fn from_navigator_strings(user_agent: &str, platform: &str, touch: bool) -> Self {
        let ua = user_agent.to_lowercase();
        let platform = platform.to_lowercase();

        // iPadOS reports a Mac platform; touch support gives it away.
        let ios = ["iphone", "ipad", "ipod"].iter().any(|d| ua.contains(d))
            || (platform.contains("mac") && touch);
        let android = ua.contains("android");

        Self {
            ios,
            mac: platform.contains("mac") && !ios,
            android,
            chrome: ua.contains("chrome") && !ua.contains("edg"),
            safari: ua.contains("safari") && !ua.contains("chrome"),
            gecko: ua.contains("gecko/") && !ua.contains("like gecko"),
            mobile: ios || android || ua.contains("mobile"),
        }
    }

    /// Shortcuts use Cmd instead of Ctrl.
    pub fn uses_meta_shortcuts(&self) -> bool {
        self.mac || self.ios
    }
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Get cached platform info. Detection runs once on first call.
pub fn platform() -> &'static Platform {
    PLATFORM.get_or_init(detect_platform)
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn detect_platform() -> Platform {
    let Some(window) = web_sys::window() else {
        return Platform::default();
    };
    let navigator = window.navigator();
    let platform = Platform::from_navigator_strings(
        &navigator.user_agent().unwrap_or_default(),
        &navigator.platform().unwrap_or_default(),
        navigator.max_touch_points() > 0,
    );
    tracing::debug!(target: "weaver_code::editor", ?platform, "detected platform");
    platform
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn detect_platform() -> Platform {
    Platform::default()
}
