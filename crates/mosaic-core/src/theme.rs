//! Light/dark theme preference.

use tracing::warn;

use crate::error::PreferenceError;
use crate::preference::PreferenceStore;

/// Class toggled on the document root for the light theme.
pub const LIGHT_MODE_CLASS: &str = "light-mode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// The toggle is a checkbox: checked means light.
    #[must_use]
    pub const fn from_checked(checked: bool) -> Self {
        if checked { Self::Light } else { Self::Dark }
    }

    #[must_use]
    pub const fn is_light(self) -> bool {
        matches!(self, Self::Light)
    }

    /// Resolve a stored value. Absent or unrecognized values mean dark.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            None => Self::Dark,
            Some(raw) => Self::parse(raw).unwrap_or_else(|| {
                warn!(value = raw, "unrecognized stored theme; using dark");
                Self::Dark
            }),
        }
    }

    /// Read the theme from `store`, falling back to dark on any failure.
    #[must_use]
    pub fn restore(store: &dyn PreferenceStore, key: &str) -> Self {
        match store.load(key) {
            Ok(value) => Self::from_stored(value.as_deref()),
            Err(err) => {
                warn!(store = store.name(), %err, "theme preference unreadable");
                Self::Dark
            }
        }
    }

    /// Write the theme to `store`.
    pub fn persist(self, store: &dyn PreferenceStore, key: &str) -> Result<(), PreferenceError> {
        store.save(key, self.as_str())
    }
}
