//! Canvas engine: input listeners, the animation-frame loop, and lifecycle
//!
//! The engine owns the drawing surface and drives the simulation once per
//! display frame. It is embeddable: the host supplies a canvas plus two
//! callbacks (per-frame stats, game over) and calls `start`/`destroy`.
//!
//! The frame loop is a self-rescheduling `requestAnimationFrame` callback
//! guarded by an `armed` flag, so `destroy` can deterministically prevent any
//! further update or draw, including one already scheduled but not yet run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent};

use crate::consts::{DOUBLE_TAP_WINDOW_MS, FIRST_FRAME_DT, MAX_FRAME_DT};
use crate::render;
use crate::sim::{GameEvent, GamePhase, GameState, GameStats, TickInput, tick};
use crate::tuning::Tuning;

/// Construction failures; everything past construction is infallible
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no window object available")]
    NoWindow,
    #[error("canvas does not supply a 2d drawing context")]
    ContextUnavailable,
}

/// A registered DOM listener, kept so `destroy` can remove it
struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

struct Inner {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    state: RefCell<GameState>,
    input: RefCell<TickInput>,
    /// Checked before every frame; disarming stops the loop
    armed: Cell<bool>,
    /// Pending animation-frame handle, for defensive cancellation
    raf_handle: Cell<Option<i32>>,
    last_time: Cell<f64>,
    /// Timestamp of the previous touchstart, for double-tap detection
    last_tap_ms: Cell<f64>,
    /// Latch so the game-over callback fires exactly once per run
    game_over_sent: Cell<bool>,
    on_stats: Box<dyn Fn(GameStats)>,
    on_game_over: Box<dyn Fn(f32)>,
}

/// The simulation/presentation engine
pub struct Engine {
    inner: Rc<Inner>,
    listeners: RefCell<Vec<Listener>>,
}

impl Engine {
    /// Build an engine on the given canvas with default tuning
    pub fn new(
        canvas: HtmlCanvasElement,
        on_stats: impl Fn(GameStats) + 'static,
        on_game_over: impl Fn(f32) + 'static,
    ) -> Result<Self, EngineError> {
        Self::with_tuning(canvas, Tuning::default(), on_stats, on_game_over)
    }

    /// Build an engine with a host-supplied tuning table
    pub fn with_tuning(
        canvas: HtmlCanvasElement,
        tuning: Tuning,
        on_stats: impl Fn(GameStats) + 'static,
        on_game_over: impl Fn(f32) + 'static,
    ) -> Result<Self, EngineError> {
        let window = web_sys::window().ok_or(EngineError::NoWindow)?;

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| EngineError::ContextUnavailable)?
            .ok_or(EngineError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::ContextUnavailable)?;

        let view = Vec2::new(canvas.client_width() as f32, canvas.client_height() as f32);
        let seed = js_sys::Date::now() as u64;

        let inner = Rc::new(Inner {
            canvas,
            ctx,
            state: RefCell::new(GameState::new(seed, view, tuning)),
            input: RefCell::new(TickInput::default()),
            armed: Cell::new(false),
            raf_handle: Cell::new(None),
            last_time: Cell::new(0.0),
            last_tap_ms: Cell::new(f64::NEG_INFINITY),
            game_over_sent: Cell::new(false),
            on_stats: Box::new(on_stats),
            on_game_over: Box::new(on_game_over),
        });
        inner.resize_surface();

        let engine = Self {
            inner,
            listeners: RefCell::new(Vec::new()),
        };
        engine.attach_listeners(&window);
        Ok(engine)
    }

    /// Begin (or restart) a run. Idempotent with respect to the frame loop:
    /// calling while already playing just resets the state.
    pub fn start(&self) {
        let seed = js_sys::Date::now() as u64;
        {
            let mut state = self.inner.state.borrow_mut();
            let view = state.view;
            let tuning = state.tuning.clone();
            *state = GameState::new(seed, view, tuning);
            state.start_run();
        }
        *self.inner.input.borrow_mut() = TickInput::default();
        self.inner.game_over_sent.set(false);
        self.inner.last_time.set(0.0);
        log::info!("run started with seed {seed}");

        if !self.inner.armed.get() {
            self.inner.armed.set(true);
            Inner::schedule(self.inner.clone());
        }
    }

    /// Tear down: disarm the loop, cancel any pending frame, remove all
    /// input listeners. Idempotent and safe without a prior `start`.
    pub fn destroy(&self) {
        self.inner.armed.set(false);
        if let Some(handle) = self.inner.raf_handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
        for listener in self.listeners.borrow_mut().drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.name,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }

    /// Direct stats snapshot for the hosting shell
    pub fn stats(&self) -> GameStats {
        self.inner.state.borrow().stats()
    }

    fn listen(
        &self,
        target: &EventTarget,
        name: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            name,
            closure,
        });
    }

    fn attach_listeners(&self, window: &web_sys::Window) {
        let canvas_target: EventTarget = self.inner.canvas.clone().into();
        let window_target: EventTarget = window.clone().into();

        // Pointer position -> player target (idempotent overwrite, read by
        // the next tick)
        {
            let inner = self.inner.clone();
            self.listen(&canvas_target, "mousemove", move |event| {
                if let Some(ev) = event.dyn_ref::<MouseEvent>() {
                    inner.input.borrow_mut().target =
                        Some(Vec2::new(ev.offset_x() as f32, ev.offset_y() as f32));
                }
            });
        }

        // Click fires the hypernova
        {
            let inner = self.inner.clone();
            self.listen(&canvas_target, "mousedown", move |_event| {
                inner.input.borrow_mut().hypernova = true;
            });
        }

        // Touch drag -> player target
        {
            let inner = self.inner.clone();
            self.listen(&canvas_target, "touchmove", move |event| {
                if let Some(ev) = event.dyn_ref::<TouchEvent>() {
                    ev.prevent_default();
                    if let Some(touch) = ev.touches().get(0) {
                        inner.input.borrow_mut().target = Some(inner.touch_pos(&touch));
                    }
                }
            });
        }

        // Touch start: target update plus double-tap hypernova
        {
            let inner = self.inner.clone();
            self.listen(&canvas_target, "touchstart", move |event| {
                if let Some(ev) = event.dyn_ref::<TouchEvent>() {
                    ev.prevent_default();
                    if let Some(touch) = ev.touches().get(0) {
                        inner.input.borrow_mut().target = Some(inner.touch_pos(&touch));
                    }
                    let now = js_sys::Date::now();
                    if now - inner.last_tap_ms.get() <= DOUBLE_TAP_WINDOW_MS {
                        inner.input.borrow_mut().hypernova = true;
                    }
                    inner.last_tap_ms.set(now);
                }
            });
        }

        // Host viewport changes -> resize the backing surface
        {
            let inner = self.inner.clone();
            self.listen(&window_target, "resize", move |_event| {
                inner.resize_surface();
            });
        }
    }
}

impl Inner {
    /// Translate a touch point into canvas-local CSS pixels
    fn touch_pos(&self, touch: &web_sys::Touch) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        )
    }

    /// Re-query the available drawing area and resize the backing surface.
    /// The simulation works in CSS pixels; the context transform absorbs the
    /// device pixel ratio.
    fn resize_surface(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let dpr = window.device_pixel_ratio();
        let w = self.canvas.client_width();
        let h = self.canvas.client_height();
        self.canvas.set_width((w as f64 * dpr) as u32);
        self.canvas.set_height((h as f64 * dpr) as u32);
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        self.state.borrow_mut().view = Vec2::new(w as f32, h as f32);
    }

    fn schedule(inner: Rc<Inner>) {
        let Some(window) = web_sys::window() else {
            inner.armed.set(false);
            return;
        };
        let frame_inner = inner.clone();
        let closure = Closure::once(move |time: f64| Inner::frame(frame_inner, time));
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => inner.raf_handle.set(Some(handle)),
            Err(_) => inner.armed.set(false),
        }
        closure.forget();
    }

    fn frame(inner: Rc<Inner>, time: f64) {
        if !inner.armed.get() {
            return;
        }
        inner.raf_handle.set(None);

        let last = inner.last_time.replace(time);
        let dt = if last > 0.0 {
            (((time - last) / 1000.0) as f32).min(MAX_FRAME_DT)
        } else {
            FIRST_FRAME_DT
        };

        let (events, stats) = {
            let mut state = inner.state.borrow_mut();

            // The transition frame has already rendered; the loop
            // self-terminates on the next invocation
            if state.phase != GamePhase::Playing {
                inner.armed.set(false);
                return;
            }

            let input = {
                let mut input = inner.input.borrow_mut();
                let snapshot = input.clone();
                input.hypernova = false;
                snapshot
            };
            tick(&mut state, &input, dt);

            let events: Vec<GameEvent> = state.events.drain(..).collect();
            render::draw(&inner.ctx, &state);
            let stats = (state.phase == GamePhase::Playing).then(|| state.stats());
            (events, stats)
        };

        // No borrow is held past this point, so the host callbacks may safely
        // re-enter the engine (e.g. call `stats()`)
        for event in events {
            let GameEvent::GameOver { score } = event;
            if !inner.game_over_sent.replace(true) {
                (inner.on_game_over)(score);
            }
        }
        if let Some(stats) = stats {
            (inner.on_stats)(stats);
        }

        Self::schedule(inner);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.destroy();
    }
}
