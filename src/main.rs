//! Hypernova entry point
//!
//! The hosting shell: owns the canvas element and overlay DOM, renders HUD
//! text from stats snapshots, and starts/restarts the engine. All gameplay
//! lives in the library; this file is wiring only.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_shell {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use hypernova::engine::Engine;
    use hypernova::sim::GameStats;

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("failed to init logger");

        log::info!("Hypernova starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let engine = Engine::new(
            canvas,
            |stats| update_hud(&stats),
            |score| show_game_over(score),
        )
        .expect("canvas has no 2d context");
        let engine = Rc::new(engine);

        // Menu and game-over overlays both funnel into start()
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let engine = engine.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                hide_overlays();
                engine.start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // The engine lives for the whole page session
        std::mem::forget(engine);

        log::info!("Hypernova ready");
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn update_hud(stats: &GameStats) {
        let Some(document) = document() else {
            return;
        };
        set_text(&document, "#hud-score .hud-value", &format!("{:.0}", stats.score));
        set_text(&document, "#hud-level .hud-value", &stats.level.to_string());
        set_text(
            &document,
            "#hud-energy .hud-value",
            &format!("{:.0}/{:.0}", stats.energy, stats.max_energy),
        );
    }

    fn show_game_over(score: f32) {
        let Some(document) = document() else {
            return;
        };
        set_text(&document, "#final-score", &format!("{score:.0}"));
        if let Some(el) = document.get_element_by_id("game-over") {
            let _ = el.set_attribute("class", "");
        }
    }

    fn hide_overlays() {
        let Some(document) = document() else {
            return;
        };
        for id in ["menu", "game-over"] {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("class", "hidden");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_shell::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hypernova (native) starting...");
    log::info!("The game targets the browser - run with `trunk serve`");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
