//! Everything related to the settings and the parsing of settings.toml.

use std::{
    convert::TryFrom,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use app_dirs2::{app_root, AppDataType, AppDirsError, AppInfo};
use druid::{Color, FontDescriptor, FontFamily, FontStyle, FontWeight};
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::config::TooltipConfig;

/// The hovertip directory used to store the settings.toml file.
pub const APP_INFO: AppInfo = AppInfo {
    name: "hovertip",
    author: "truelossless",
};

/// The default settings.toml file.
pub const DEFAULT_SETTINGS: &str = include_str!("../res/settings.toml");

/// The default font size, in points.
const DEFAULT_FONT_SIZE: f64 = 9.;

/// The parsed settings, or the defaults if settings.toml is unusable.
pub static SETTINGS: Lazy<Settings> = Lazy::new(|| {
    Settings::load().unwrap_or_else(|err| {
        tracing::warn!("{}. Using default settings.", err);
        Settings::default()
    })
});

/// The errors which can happen while loading the settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings directory couldn't be found or created.
    #[error("settings directory unavailable: {0}")]
    AppDir(#[from] AppDirsError),

    /// settings.toml couldn't be read or written.
    #[error("settings.toml I/O error: {0}")]
    Io(#[from] io::Error),

    /// settings.toml is not valid.
    #[error("errors in settings.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// A color is not a hex color.
    #[error("{0} is not a valid color")]
    InvalidColor(String),

    /// A font weight is not known.
    #[error("{0} is not a valid font weight")]
    InvalidFontWeight(String),

    /// A font style is not known.
    #[error("{0} is not a valid font style")]
    InvalidFontStyle(String),
}

/// Representation of the hovertip settings, which is the settings.toml file.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// The tooltip defaults.
    pub tooltip: TooltipSettings,
}

/// The defaults applied to every tooltip built from the settings.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TooltipSettings {
    /// The hover delay, in seconds.
    pub delay: u64,
    /// Whether the tooltip follows the pointer.
    pub follow: bool,
    /// The visible duration in seconds, 0 meaning no auto-hide.
    pub visible_duration: u64,
    /// The background color, as a hex string.
    pub background: String,
    /// The font of the tooltip text.
    pub font: Font,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            delay: 1,
            follow: true,
            visible_duration: 0,
            background: "#FFFFFF".to_owned(),
            font: Font::FullFont {
                name: "Microsoft YaHei UI".to_owned(),
                size: Some(DEFAULT_FONT_SIZE),
                weight: Some("normal".to_owned()),
                style: None,
            },
        }
    }
}

/// Representation of a system font in Serde.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Font {
    /// The font name as a string.
    FontName(String),
    /// A more detailed font object.
    FullFont {
        /// The font name as a string.
        name: String,
        /// The font size.
        size: Option<f64>,
        /// The font weight.
        weight: Option<String>,
        /// The font style.
        style: Option<String>,
    },
}

impl TryFrom<&Font> for FontDescriptor {
    type Error = SettingsError;

    fn try_from(font: &Font) -> Result<Self, Self::Error> {
        match font {
            Font::FontName(name) => Ok(FontDescriptor::new(FontFamily::new_unchecked(
                name.as_str(),
            ))
            .with_size(DEFAULT_FONT_SIZE)),
            Font::FullFont {
                name,
                size,
                weight,
                style,
            } => {
                let weight = weight
                    .as_deref()
                    .map(|weight_str| match weight_str {
                        "thin" => Ok(FontWeight::THIN),
                        "hairline" => Ok(FontWeight::HAIRLINE),
                        "extralight" => Ok(FontWeight::EXTRA_LIGHT),
                        "light" => Ok(FontWeight::LIGHT),
                        "regular" => Ok(FontWeight::REGULAR),
                        "normal" => Ok(FontWeight::NORMAL),
                        "medium" => Ok(FontWeight::MEDIUM),
                        "semibold" => Ok(FontWeight::SEMI_BOLD),
                        "bold" => Ok(FontWeight::BOLD),
                        "extrabold" => Ok(FontWeight::EXTRA_BOLD),
                        "black" => Ok(FontWeight::BLACK),
                        "heavy" => Ok(FontWeight::HEAVY),
                        "extrablack" => Ok(FontWeight::EXTRA_BLACK),
                        _ => Err(SettingsError::InvalidFontWeight(weight_str.to_owned())),
                    })
                    .transpose()?
                    .unwrap_or_default();

                let style = style
                    .as_deref()
                    .map(|style_str| match style_str {
                        "regular" => Ok(FontStyle::Regular),
                        "italic" => Ok(FontStyle::Italic),
                        _ => Err(SettingsError::InvalidFontStyle(style_str.to_owned())),
                    })
                    .transpose()?
                    .unwrap_or_default();

                Ok(FontDescriptor::new(FontFamily::new_unchecked(name.as_str()))
                    .with_size(size.unwrap_or(DEFAULT_FONT_SIZE))
                    .with_weight(weight)
                    .with_style(style))
            }
        }
    }
}

impl Settings {
    /// Parses the content of a settings.toml file.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads the settings from a file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        Settings::parse(&fs::read_to_string(path)?)
    }

    /// The path of the user settings.toml file.
    pub fn path() -> Result<PathBuf, SettingsError> {
        Ok(app_root(AppDataType::UserData, &APP_INFO)?.join("settings.toml"))
    }

    /// Loads the user settings.toml, writing the default one first if it doesn't exist.
    pub fn load() -> Result<Self, SettingsError> {
        Settings::load_from(&Settings::path()?)
    }

    /// Loads the settings at `path`, writing the default settings there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("creating default settings at {}", path.display());
            fs::write(path, DEFAULT_SETTINGS)?;
        }
        Settings::from_file(path)
    }
}

impl TooltipSettings {
    /// Builds a tooltip configuration with these defaults and no message.
    pub fn tooltip_config(&self) -> Result<TooltipConfig, SettingsError> {
        let background = Color::from_hex_str(&self.background)
            .map_err(|_| SettingsError::InvalidColor(self.background.clone()))?;

        Ok(TooltipConfig::default()
            .with_delay(Duration::from_secs(self.delay))
            .with_follow(self.follow)
            .with_visible_duration(Duration::from_secs(self.visible_duration))
            .with_background(background)
            .with_font(FontDescriptor::try_from(&self.font)?))
    }
}
