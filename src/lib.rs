//! Hovertip attaches tooltips to druid widgets: a small floating window showing a static
//! or computed message after the pointer rested over the widget, optionally following
//! the pointer and hiding itself after a while.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use druid::widget::Button;
//! use hovertip::{TooltipConfig, TooltipExt};
//!
//! let button = Button::<()>::new("hover me")
//!     .tooltip(TooltipConfig::new("hi").with_delay(Duration::from_secs(0)));
//! ```

#![deny(clippy::missing_docs_in_private_items)]

pub mod config;
pub mod hover;
pub mod settings;
pub mod tooltip;
pub mod utils;

pub use config::{TextError, TextProducer, TooltipConfig};
pub use hover::{HoverTip, PopupState, TimerQueue, Visibility};
pub use tooltip::{ToolTip, TooltipExt};
