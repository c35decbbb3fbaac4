//! Cloud Kingdom entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    use cloud_kingdom::audio::{AudioManager, cues_for};
    use cloud_kingdom::consts::*;
    use cloud_kingdom::persistence::{LocalStorageStore, MemoryStore, SaveStore};
    use cloud_kingdom::renderer::{CanvasSurface, dialog_text, hud_lines, render_frame};
    use cloud_kingdom::sim::{GameEvent, GamePhase, MapLibrary, TickInput, Wanderer};
    use cloud_kingdom::{Direction, Session};

    type Store = Box<dyn SaveStore>;

    /// Game instance holding all state
    struct Game {
        session: Session<Store>,
        surface: CanvasSurface,
        audio: AudioManager,
        last_time: f64,
        /// Attract mode driver, toggled with 'I'
        wanderer: Option<Wanderer>,
    }

    impl Game {
        /// Run simulation ticks and react to what happened
        fn update(&mut self, dt: f32) {
            if let Some(wanderer) = self.wanderer.as_mut() {
                let input = wanderer.next_input(self.session.state());
                self.session.queue(input);
            }

            let events = self.session.update(dt, js_sys::Date::now());
            for cue in cues_for(&events) {
                self.audio.play(cue);
            }
            for event in &events {
                match event {
                    GameEvent::MapLoadFailed { map_id, reason } => {
                        log::error!("Could not enter '{}': {}", map_id, reason);
                    }
                    GameEvent::AreaComplete { map_id, steps, .. } => {
                        if let Some(record) = self.session.last_record() {
                            if &record.map_id == map_id && record.steps == *steps {
                                log::info!("Rank #{} for '{}'", record.rank, map_id);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            render_frame(self.session.state(), &mut self.surface);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("hud") {
                let lines = if self.session.settings().show_quest_hud {
                    hud_lines(self.session.state())
                } else {
                    Vec::new()
                };
                el.set_text_content(Some(&lines.join("\n")));
            }
            if let Some(el) = document.get_element_by_id("dialog") {
                match dialog_text(self.session.state()) {
                    Some(text) => {
                        el.set_text_content(Some(&text));
                        let _ = el.set_attribute("class", "");
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        fn toggle_mute(&mut self) {
            let mut settings = self.session.settings().clone();
            settings.muted = !settings.muted;
            self.audio.apply_settings(&settings);
            self.session.update_settings(settings);
        }
    }

    fn open_store() -> Store {
        match LocalStorageStore::open() {
            Some(store) => Box::new(store),
            None => {
                log::warn!("LocalStorage unavailable - progress will not be saved");
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Cloud Kingdom starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let library = match MapLibrary::bundled() {
            Ok(library) => library,
            Err(err) => {
                log::error!("Bundled maps are broken: {}", err);
                return;
            }
        };
        let session = match Session::new(open_store(), library) {
            Ok(session) => session,
            Err(err) => {
                log::error!("Cannot start game: {}", err);
                return;
            }
        };

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Backing store at device resolution
        let dpr = window.device_pixel_ratio();
        let config = session.state().config();
        canvas.set_width((config.viewport_width as f64 * dpr) as u32);
        canvas.set_height((config.viewport_height as f64 * dpr) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let audio = AudioManager::new(session.settings());
        let game = Rc::new(RefCell::new(Game {
            session,
            surface: CanvasSurface::new(ctx, dpr),
            audio,
            last_time: 0.0,
            wanderer: None,
        }));

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Cloud Kingdom running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            // Browsers only allow audio after a gesture
            g.audio.resume();

            let key = event.key();
            if let Some(direction) = Direction::from_key(&key) {
                event.prevent_default();
                g.session.queue(TickInput::step(direction));
                return;
            }
            match key.as_str() {
                " " | "Enter" | "e" | "E" => {
                    event.prevent_default();
                    g.session.queue(TickInput::interact());
                }
                "Escape" | "p" | "P" => g.session.queue(TickInput::pause()),
                "r" | "R" => g.session.restart_area(),
                "m" | "M" => g.toggle_mute(),
                "n" | "N" => {
                    if let Err(err) = g.session.new_game() {
                        log::error!("Cannot start a new game: {}", err);
                    }
                }
                "i" | "I" => {
                    g.wanderer = match g.wanderer {
                        Some(_) => None,
                        None => Some(Wanderer::new(js_sys::Date::now() as u64)),
                    };
                    log::info!("Idle mode: {}", g.wanderer.is_some());
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.session.state().phase == GamePhase::Exploring {
                        g.session.queue(TickInput::pause());
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.session.settings().mute_on_blur {
                    let settings = g.session.settings().clone();
                    g.audio.set_muted(true, &settings);
                }
                if g.session.state().phase == GamePhase::Exploring {
                    g.session.queue(TickInput::pause());
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus back: restore the configured volume
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let settings = g.session.settings().clone();
                g.audio.apply_settings(&settings);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

/// Native attract mode: a seeded wanderer plays through the bundled maps
/// and the viewport is printed as text.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cloud_kingdom::Session;
    use cloud_kingdom::consts::SIM_DT;
    use cloud_kingdom::persistence::MemoryStore;
    use cloud_kingdom::renderer::{TextSurface, hud_lines, render_frame};
    use cloud_kingdom::sim::{GameEvent, GamePhase, MapLibrary, Wanderer};

    const MAX_TICKS: u64 = 60 * 60 * 10;

    env_logger::init();
    log::info!("Cloud Kingdom (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    let library = match MapLibrary::bundled() {
        Ok(library) => library,
        Err(err) => {
            log::error!("Bundled maps are broken: {}", err);
            std::process::exit(1);
        }
    };
    let mut session = match Session::new(MemoryStore::new(), library) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Cannot start game: {}", err);
            std::process::exit(1);
        }
    };
    let mut wanderer = Wanderer::new(seed);
    log::info!("Wandering with seed {}", seed);

    let print_frame = |session: &Session<MemoryStore>| {
        let config = session.state().config();
        let mut surface = TextSurface::new(config.viewport_width, config.viewport_height, config.tile_size);
        render_frame(session.state(), &mut surface);
        println!("{}", surface.to_text());
        for line in hud_lines(session.state()) {
            println!("  {}", line);
        }
        println!();
    };

    print_frame(&session);
    let mut ticks = 0u64;
    while ticks < MAX_TICKS && session.state().phase != GamePhase::Finished {
        let input = wanderer.next_input(session.state());
        let now_ms = ticks as f64 * SIM_DT as f64 * 1000.0;
        for event in session.step(&input, now_ms) {
            if let GameEvent::AreaComplete { .. } | GameEvent::GameFinished = event {
                print_frame(&session);
            }
            log::debug!("{:?}", event);
        }
        ticks += 1;
    }

    print_frame(&session);
    log::info!(
        "Stopped after {} ticks, {} areas completed",
        ticks,
        session.state().progress.areas_completed.len()
    );
}
