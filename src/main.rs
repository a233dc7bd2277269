//! A grid of buttons, each decorated with a tooltip exercising a different combination
//! of delay, follow, message and visible duration.

#![windows_subsystem = "windows"]
#![deny(clippy::missing_docs_in_private_items)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use druid::{
    widget::{Button, Flex},
    AppLauncher, PlatformError, Widget, WidgetExt, WindowDesc, WindowSizePolicy,
};
use hovertip::{
    settings::SETTINGS,
    utils::{range2d, ButtonController},
    TextError, TooltipConfig, TooltipExt,
};

/// The number of rows of the grid. The row index is the delay of its tooltips.
const ROWS: usize = 6;

/// The number of columns of the grid.
const COLUMNS: usize = 4;

/// The current time in seconds, as the tooltip text.
fn current_time() -> Result<String, TextError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(format!("{:.6}", now.as_secs_f64()))
}

/// Builds the button at `(row, column)` with its tooltip.
fn demo_button(row: usize, column: usize, base: &TooltipConfig) -> impl Widget<()> {
    let follow = column >= 2;
    let mut label = format!(
        "delay={}\n{}follow\n",
        row,
        if follow { "+" } else { "-" }
    );

    let config = base
        .clone()
        .with_delay(Duration::from_secs(row as u64))
        .with_follow(follow);

    let config = if column % 2 == 0 {
        label.push_str("Message Function\nstime=0");
        config
            .with_producer(current_time)
            .with_visible_duration(Duration::from_secs(0))
    } else {
        label.push_str("Static Message\nstime=2");
        config
            .with_message(format!("Button at ({}, {})", row, column))
            .with_visible_duration(Duration::from_secs(2))
    };

    Button::new(label)
        .controller(ButtonController)
        .tooltip(config)
        .expand()
}

/// Builds the demo UI.
fn ui_builder() -> impl Widget<()> {
    let base = SETTINGS.tooltip.tooltip_config().unwrap_or_else(|err| {
        tracing::warn!("{}. Using default tooltip settings.", err);
        TooltipConfig::default()
    });

    let mut grid = Flex::column();
    let mut row = Flex::row();

    for (i, j) in range2d(ROWS, COLUMNS) {
        row.add_flex_child(demo_button(i, j, &base).padding(1.), 1.);
        if j == COLUMNS - 1 {
            grid.add_flex_child(std::mem::replace(&mut row, Flex::row()), 1.);
        }
    }

    grid.fix_size(520., 480.)
}

fn main() -> Result<(), PlatformError> {
    let window = WindowDesc::new(ui_builder())
        .title("Hovertip")
        .resizable(false)
        .window_size_policy(WindowSizePolicy::Content);

    let mut launcher = AppLauncher::with_window(window);

    if cfg!(debug_assertions) {
        launcher = launcher.log_to_console()
    }

    launcher.launch(())
}
