//! Application-wide preferences: locale, theme, last open tab, onboarding.
//!
//! Each preference is stored as a plain string under its own key rather
//! than as a JSON record, and every setter writes through immediately.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, ValidationError};
use crate::events::Event;
use crate::storage::{get_string, KeyValueStore};

const LOCALE_KEY: &str = "locale";
const THEME_KEY: &str = "color-scheme";
const TAB_KEY: &str = "lastTab";
const ONBOARDING_KEY: &str = "onboardingCompleted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Pt, Locale::Es];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
            Locale::Es => "es",
        }
    }

    /// Map a system locale such as `pt-BR` or `es_ES.UTF-8` onto a
    /// supported language. Anything unrecognised is English.
    pub fn detect(tag: &str) -> Self {
        let base = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == base)
            .unwrap_or_default()
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "locale".to_string(),
                message: format!("unsupported locale '{s}' (expected en, pt or es)"),
            })
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::InvalidValue {
                field: "theme".to_string(),
                message: format!("unknown theme '{other}' (expected light or dark)"),
            }),
        }
    }
}

/// Top-level screens, stored by route path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    TableJudge,
    DeckCheck,
    RoundTimer,
    TimeExtensions,
    Docs,
    Credits,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::TableJudge,
        Tab::DeckCheck,
        Tab::RoundTimer,
        Tab::TimeExtensions,
        Tab::Docs,
        Tab::Credits,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Tab::TableJudge => "/table-judge",
            Tab::DeckCheck => "/deck-check",
            Tab::RoundTimer => "/round-timer",
            Tab::TimeExtensions => "/time-extensions",
            Tab::Docs => "/docs",
            Tab::Credits => "/credits",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.path() == path)
    }
}

impl FromStr for Tab {
    type Err = ValidationError;

    /// Accepts either the route path (`/deck-check`) or its bare name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let path = if s.starts_with('/') { s.to_string() } else { format!("/{s}") };
        Self::from_path(&path).ok_or_else(|| ValidationError::InvalidValue {
            field: "tab".to_string(),
            message: format!("unknown tab '{s}'"),
        })
    }
}

/// Preferences shared by every screen. Built once at startup and passed
/// to whatever needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppContext {
    pub locale: Locale,
    pub theme: Theme,
    pub last_tab: Tab,
    pub onboarding_completed: bool,
}

impl AppContext {
    /// Read saved preferences. A saved locale wins over `system_locale`;
    /// unknown or missing values fall back to defaults.
    pub fn load(store: &impl KeyValueStore, system_locale: Option<&str>) -> Self {
        let locale = get_string(store, LOCALE_KEY)
            .and_then(|s| s.parse().ok())
            .or_else(|| system_locale.map(Locale::detect))
            .unwrap_or_default();
        let theme = get_string(store, THEME_KEY)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let last_tab = get_string(store, TAB_KEY)
            .and_then(|s| Tab::from_path(&s))
            .unwrap_or_default();
        let onboarding_completed = get_string(store, ONBOARDING_KEY).as_deref() == Some("true");
        Self {
            locale,
            theme,
            last_tab,
            onboarding_completed,
        }
    }

    pub fn set_locale(&mut self, store: &impl KeyValueStore, locale: Locale) -> Result<Event, StorageError> {
        store.set(LOCALE_KEY, locale.code().as_bytes())?;
        self.locale = locale;
        Ok(Event::LocaleChanged {
            locale,
            at: Utc::now(),
        })
    }

    pub fn set_theme(&mut self, store: &impl KeyValueStore, theme: Theme) -> Result<Event, StorageError> {
        store.set(THEME_KEY, theme.as_str().as_bytes())?;
        self.theme = theme;
        Ok(Event::ThemeChanged {
            theme,
            at: Utc::now(),
        })
    }

    pub fn toggle_theme(&mut self, store: &impl KeyValueStore) -> Result<Event, StorageError> {
        self.set_theme(store, self.theme.toggled())
    }

    pub fn set_last_tab(&mut self, store: &impl KeyValueStore, tab: Tab) -> Result<Event, StorageError> {
        store.set(TAB_KEY, tab.path().as_bytes())?;
        self.last_tab = tab;
        Ok(Event::TabChanged { tab, at: Utc::now() })
    }

    /// Mark onboarding done. `None` if it already was.
    pub fn complete_onboarding(&mut self, store: &impl KeyValueStore) -> Result<Option<Event>, StorageError> {
        if self.onboarding_completed {
            return Ok(None);
        }
        store.set(ONBOARDING_KEY, b"true")?;
        self.onboarding_completed = true;
        Ok(Some(Event::OnboardingCompleted { at: Utc::now() }))
    }
}
