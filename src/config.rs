//! The construction-time configuration of a tooltip.

use std::{fmt, sync::Arc, time::Duration};

use druid::{ArcStr, Color, FontDescriptor, FontFamily};

/// The text displayed when a tooltip has neither a message nor a producer.
pub const PLACEHOLDER_TEXT: &str = "None";

/// The error a text producer can fail with.
pub type TextError = Box<dyn std::error::Error + Send + Sync>;

/// A function computing the tooltip text, re-evaluated on every pointer motion.
pub type TextProducer = Arc<dyn Fn() -> Result<String, TextError> + Send + Sync>;

/// Where the text of a tooltip comes from.
#[derive(Clone)]
pub enum TextSource {
    /// A fixed message.
    Static(ArcStr),
    /// A message recomputed on pointer motion.
    Dynamic(TextProducer),
}

impl fmt::Debug for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Static(text) => write!(f, "Static({:?})", text),
            TextSource::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

/// Everything a tooltip needs to know, read once when it is attached to a widget.
#[derive(Clone)]
pub struct TooltipConfig {
    /// A static message.
    pub message: Option<String>,
    /// A function producing the message. Takes precedence over `message`.
    pub producer: Option<TextProducer>,
    /// How long the pointer must rest before the tooltip shows up.
    pub delay: Duration,
    /// Whether the tooltip tracks the pointer while shown.
    /// When unset, moving the pointer hides the tooltip instead.
    pub follow: bool,
    /// How long a shown tooltip stays visible. Zero means until the pointer leaves.
    pub visible_duration: Duration,
    /// The background color of the popup.
    pub background: Color,
    /// The font of the popup text.
    pub font: FontDescriptor,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            message: None,
            producer: None,
            delay: Duration::from_secs(1),
            follow: true,
            visible_duration: Duration::from_secs(0),
            background: Color::WHITE,
            font: FontDescriptor::new(FontFamily::new_unchecked("Microsoft YaHei UI"))
                .with_size(9.),
        }
    }
}

impl fmt::Debug for TooltipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipConfig")
            .field("message", &self.message)
            .field("producer", &self.producer.as_ref().map(|_| ".."))
            .field("delay", &self.delay)
            .field("follow", &self.follow)
            .field("visible_duration", &self.visible_duration)
            .field("font", &self.font)
            .finish()
    }
}

impl TooltipConfig {
    /// A tooltip showing a static message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::default().with_message(message)
    }

    /// A tooltip showing the output of `producer`.
    pub fn dynamic(
        producer: impl Fn() -> Result<String, TextError> + Send + Sync + 'static,
    ) -> Self {
        Self::default().with_producer(producer)
    }

    /// Sets the static message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the text producer.
    pub fn with_producer(
        mut self,
        producer: impl Fn() -> Result<String, TextError> + Send + Sync + 'static,
    ) -> Self {
        self.producer = Some(Arc::new(producer));
        self
    }

    /// Sets the hover delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets whether the tooltip follows the pointer.
    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Sets the visible duration, zero meaning no auto-hide.
    pub fn with_visible_duration(mut self, duration: Duration) -> Self {
        self.visible_duration = duration;
        self
    }

    /// Sets the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Sets the font.
    pub fn with_font(mut self, font: FontDescriptor) -> Self {
        self.font = font;
        self
    }

    /// Resolves where the text comes from: the producer, the message, or the placeholder.
    pub fn text_source(&self) -> TextSource {
        match (&self.producer, &self.message) {
            (Some(producer), _) => TextSource::Dynamic(producer.clone()),
            (None, Some(message)) => TextSource::Static(message.as_str().into()),
            (None, None) => TextSource::Static(PLACEHOLDER_TEXT.into()),
        }
    }
}
