//! A tooltip controller which can be attached to any widget to display
//! a small floating window on hover.
//!
//! The popup is a druid sub-window, the approach is based off
//! https://github.com/linebender/druid/blob/master/druid/examples/sub_window.rs.
//! Sub-window positions are relative to the parent window, so every popup position
//! handled here is in window coordinates.

use std::time::{Duration, Instant};

use druid::{
    commands::CLOSE_WINDOW,
    widget::{Controller, ControllerHost, Label},
    ArcStr, Color, Data, Env, Event, EventCtx, FontDescriptor, LifeCycle, LifeCycleCtx, MouseEvent,
    Point, Selector, TimerToken, Widget, WidgetExt, WindowConfig, WindowId, WindowLevel,
    WindowSizePolicy,
};

use crate::{
    config::TooltipConfig,
    hover::{HoverTip, PopupState, TimerQueue},
};

/// Moves a popup window to the given position, relative to its parent window.
pub const MOVE_POPUP: Selector<Point> = Selector::new("hovertip.tooltip.move_popup");

/// Replaces the text of a popup window.
pub const SET_POPUP_TEXT: Selector<ArcStr> = Selector::new("hovertip.tooltip.set_popup_text");

impl TimerQueue for EventCtx<'_, '_> {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.request_timer(delay)
    }
}

/// The popup window as it is currently on screen.
struct PopupWindow {
    /// The id of the sub-window.
    id: WindowId,
    /// Where the window was last placed.
    position: Point,
    /// The text the window was last given.
    text: ArcStr,
}

/// A controller displaying a tooltip when hovering its child.
///
/// It never swallows pointer events: everything is forwarded to the child,
/// so the bindings of the decorated widget keep working.
pub struct ToolTip {
    /// The hover logic.
    hover: HoverTip,
    /// The background color of the popup.
    background: Color,
    /// The font of the popup.
    font: FontDescriptor,
    /// The popup window, while it is shown.
    window: Option<PopupWindow>,
    /// Whether the pointer is over the child.
    inside: bool,
}

impl ToolTip {
    /// Creates a tooltip from its configuration.
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            hover: HoverTip::new(&config),
            background: config.background,
            font: config.font,
            window: None,
            inside: false,
        }
    }

    /// Brings the popup window in line with the state of the hover logic.
    fn sync(&mut self, ctx: &mut EventCtx, env: &Env) {
        let popup = self.hover.popup();

        if !popup.visible {
            if let Some(window) = self.window.take() {
                ctx.submit_command(CLOSE_WINDOW.to(window.id));
            }
            return;
        }

        if let Some(window) = &mut self.window {
            update_window(ctx, window, popup);
            return;
        }

        let parent = ctx.window().clone();
        let id = ctx.new_sub_window(
            WindowConfig::default()
                .show_titlebar(false)
                .resizable(false)
                .window_size_policy(WindowSizePolicy::Content)
                .set_level(WindowLevel::Tooltip(parent))
                .set_position(popup.position),
            popup_builder(self.background.clone(), self.font.clone()),
            popup.text.clone(),
            env.clone(),
        );

        self.window = Some(PopupWindow {
            id,
            position: popup.position,
            text: popup.text.clone(),
        });
    }

    /// Closes the popup window if it is open.
    fn close(&mut self, ctx: &mut LifeCycleCtx) {
        if let Some(window) = self.window.take() {
            ctx.submit_command(CLOSE_WINDOW.to(window.id));
        }
    }
}

/// Where the pointer of `me` is, in the coordinates popup windows are placed in.
fn pointer_position(me: &MouseEvent) -> Point {
    me.window_pos
}

/// Sends the position and text changes to an open popup window.
fn update_window(ctx: &mut EventCtx, window: &mut PopupWindow, popup: &PopupState) {
    if window.position != popup.position {
        ctx.submit_command(MOVE_POPUP.with(popup.position).to(window.id));
        window.position = popup.position;
    }

    if window.text != popup.text {
        ctx.submit_command(SET_POPUP_TEXT.with(popup.text.clone()).to(window.id));
        window.text = popup.text.clone();
    }
}

impl<T, W: Widget<T>> Controller<T, W> for ToolTip {
    fn event(
        &mut self,
        child: &mut W,
        ctx: &mut EventCtx,
        event: &Event,
        data: &mut T,
        env: &Env,
    ) {
        match event {
            Event::MouseMove(me) if ctx.is_hot() => {
                let pointer = pointer_position(me);
                if !self.inside {
                    self.inside = true;
                    self.hover.enter(pointer, ctx);
                }
                self.hover.motion(Instant::now(), pointer, ctx);
            }
            Event::MouseMove(_) if self.inside => {
                self.inside = false;
                self.hover.leave();
            }
            Event::MouseDown(me) if self.inside && me.button.is_left() => self.hover.click(),
            Event::Timer(token) => {
                if self.hover.timer(Instant::now(), *token, ctx) {
                    ctx.set_handled();
                }
            }
            _ => (),
        }

        self.sync(ctx, env);

        if !ctx.is_handled() {
            child.event(ctx, event, data, env);
        }
    }

    fn lifecycle(
        &mut self,
        child: &mut W,
        ctx: &mut LifeCycleCtx,
        event: &LifeCycle,
        data: &T,
        env: &Env,
    ) {
        // the pointer can leave the window without any mouse move reaching us.
        if let LifeCycle::HotChanged(false) = event {
            if self.inside {
                self.inside = false;
                self.hover.leave();
            }
            self.close(ctx);
        }
        child.lifecycle(ctx, event, data, env)
    }
}

/// A controller applying the position and text commands sent to a popup window.
struct PopupController;

impl<W: Widget<ArcStr>> Controller<ArcStr, W> for PopupController {
    fn event(
        &mut self,
        child: &mut W,
        ctx: &mut EventCtx,
        event: &Event,
        data: &mut ArcStr,
        env: &Env,
    ) {
        if let Event::Command(cmd) = event {
            if let Some(position) = cmd.get(MOVE_POPUP) {
                ctx.window().set_position(*position);
                ctx.set_handled();
                return;
            }

            if let Some(text) = cmd.get(SET_POPUP_TEXT) {
                *data = text.clone();
                ctx.set_handled();
                return;
            }
        }
        child.event(ctx, event, data, env);
    }
}

/// Builds the content of a popup window: the text on a bordered background.
fn popup_builder(background: Color, font: FontDescriptor) -> impl Widget<ArcStr> {
    Label::raw()
        .with_font(font)
        .with_text_color(Color::BLACK)
        .padding((4., 2.))
        .background(background)
        .border(Color::BLACK, 1.)
        .controller(PopupController)
}

/// A trait to attach a tooltip to any widget.
pub trait TooltipExt<T: Data>: Widget<T> + Sized + 'static {
    /// Displays a tooltip configured by `config` when hovering this widget.
    fn tooltip(self, config: TooltipConfig) -> ControllerHost<Self, ToolTip> {
        self.controller(ToolTip::new(config))
    }
}

impl<T: Data, W: Widget<T> + 'static> TooltipExt<T> for W {}

/// Tests of the pointer conversion.
#[cfg(test)]
mod tests {
    use druid::{Modifiers, MouseButton, MouseButtons, Vec2};

    use super::*;

    /// A mouse move at `pos` in the widget and `window_pos` in the window.
    fn mouse_move(pos: Point, window_pos: Point) -> MouseEvent {
        MouseEvent {
            pos,
            window_pos,
            buttons: MouseButtons::new(),
            mods: Modifiers::empty(),
            count: 0,
            focus: false,
            button: MouseButton::None,
            wheel_delta: Vec2::ZERO,
        }
    }

    /// The popup is anchored in window coordinates, not widget nor screen ones.
    #[test]
    fn pointer_in_window_coordinates() {
        let me = mouse_move(Point::new(10., 10.), Point::new(110., 60.));
        assert_eq!(pointer_position(&me), Point::new(110., 60.));
    }
}
