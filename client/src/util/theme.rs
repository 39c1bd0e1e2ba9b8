//! Light/dark theme preference.
//!
//! Stored under [`THEME_KEY`] as `light`, `dark` or `auto`. `auto` resolves
//! against the terminal's background once and the resolved value is saved.

use tracing::debug;

use super::preferences::PreferenceStore;
use crate::error::ClientError;

pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Resolve the stored theme, writing back the resolved value when the
/// stored one is `auto`, unknown or missing.
///
/// # Errors
///
/// Returns an error if the resolved value cannot be persisted.
pub fn read_preference(
    store: &mut impl PreferenceStore,
    system_prefers_dark: bool,
) -> Result<Theme, ClientError> {
    match store.get(THEME_KEY).as_deref() {
        Some("dark") => Ok(Theme::Dark),
        Some("auto") => {
            let theme = if system_prefers_dark { Theme::Dark } else { Theme::Light };
            set(store, theme)?;
            Ok(theme)
        }
        _ => {
            set(store, Theme::Light)?;
            Ok(Theme::Light)
        }
    }
}

/// Persist `theme`.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn set(store: &mut impl PreferenceStore, theme: Theme) -> Result<(), ClientError> {
    debug!(theme = theme.as_str(), "saving theme");
    store.set(THEME_KEY, theme.as_str())
}

/// Flip `current`, persist and return the new theme.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn toggle(store: &mut impl PreferenceStore, current: Theme) -> Result<Theme, ClientError> {
    let next = current.toggled();
    set(store, next)?;
    Ok(next)
}

/// Whether the terminal advertises a dark background through `COLORFGBG`.
#[must_use]
pub fn system_prefers_dark() -> bool {
    colorfgbg_is_dark(std::env::var("COLORFGBG").ok().as_deref())
}

fn colorfgbg_is_dark(raw: Option<&str>) -> bool {
    raw.and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
