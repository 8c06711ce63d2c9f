use anyhow::{anyhow, Result};
use gloo_events::{EventListener, EventListenerOptions};
use web_sys::Window;
use winit::event_loop::EventLoopProxy;

use crate::app::UserEvent;

/// Forwards document scroll offsets and window sizes to the event loop.
pub struct PageListeners {
    _listeners: Vec<EventListener>,
}

impl PageListeners {
    pub fn attach(proxy: EventLoopProxy<UserEvent>) -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
        let mut listeners = Vec::new();

        {
            let target = window.clone();
            let proxy = proxy.clone();
            listeners.push(EventListener::new_with_options(
                &window,
                "scroll",
                EventListenerOptions::run_in_passive_mode(),
                move |_event| {
                    let offset = target.scroll_y().unwrap_or_default() as f32;
                    if proxy.send_event(UserEvent::Scroll(offset)).is_err() {
                        log::debug!("event loop closed; dropping scroll offset");
                    }
                },
            ));
        }

        {
            let target = window.clone();
            listeners.push(EventListener::new(&window, "resize", move |_event| {
                let Some(event) = Self::window_size(&target) else {
                    return;
                };
                if proxy.send_event(event).is_err() {
                    log::debug!("event loop closed; dropping resize");
                }
            }));
        }

        Ok(Self {
            _listeners: listeners,
        })
    }

    /// Current document scroll offset.
    pub fn current_offset() -> f32 {
        web_sys::window()
            .and_then(|window| window.scroll_y().ok())
            .unwrap_or_default() as f32
    }

    /// Resize request matching the window's inner size in CSS pixels.
    pub fn current_size() -> Option<UserEvent> {
        Self::window_size(&web_sys::window()?)
    }

    fn window_size(window: &Window) -> Option<UserEvent> {
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        UserEvent::resize(width, height)
    }
}
