//! Scripted renderer used by the crawler unit tests

use crate::crawler::renderer::{RenderSession, RenderTimeouts, RenderedPage, Renderer};
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What the next `open` of a URL does
#[derive(Debug, Clone)]
pub enum Script {
    Page(String),
    Redirected { final_url: String, html: String },
    Fail(String),
    Hang,
}

#[derive(Default)]
struct Inner {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    launch_error: Mutex<Option<String>>,
    render_delay: Mutex<Duration>,
    launched: AtomicUsize,
    closed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    admissions: Mutex<Vec<Instant>>,
}

#[derive(Clone, Default)]
pub struct ScriptedRenderer {
    inner: Arc<Inner>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues outcomes for successive opens of `url`; unscripted opens serve a stock page
    pub fn script(&self, url: &str, steps: Vec<Script>) {
        self.inner
            .scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), steps.into());
    }

    pub fn fail_launch(&self, message: &str) {
        *self.inner.launch_error.lock().unwrap() = Some(message.to_string());
    }

    /// Time every open spends "rendering"
    pub fn set_render_delay(&self, delay: Duration) {
        *self.inner.render_delay.lock().unwrap() = delay;
    }

    pub fn launched(&self) -> usize {
        self.inner.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    /// Start instants of every open, in call order
    pub fn admissions(&self) -> Vec<Instant> {
        self.inner.admissions.lock().unwrap().clone()
    }
}

pub fn stock_page(url: &str) -> String {
    format!(
        "<html><head><title>{url}</title></head><body><h1>Stock page</h1>\
         <p>This page was served for {url} by the scripted renderer used in tests. \
         It carries enough text to pass the default length check of the validator.</p>\
         </body></html>"
    )
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn launch(&self) -> RenderResult<Box<dyn RenderSession>> {
        if let Some(message) = self.inner.launch_error.lock().unwrap().clone() {
            return Err(RenderError::Launch(message));
        }
        self.inner.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            inner: self.inner.clone(),
        }))
    }
}

struct ScriptedSession {
    inner: Arc<Inner>,
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn open(&mut self, url: &str, _timeouts: &RenderTimeouts) -> RenderResult<RenderedPage> {
        self.inner.admissions.lock().unwrap().push(Instant::now());
        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let step = self
            .inner
            .scripts
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        let delay = *self.inner.render_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = match step.unwrap_or_else(|| Script::Page(stock_page(url))) {
            Script::Page(html) => Ok(RenderedPage {
                html,
                title: String::new(),
                final_url: url.to_string(),
            }),
            Script::Redirected { final_url, html } => Ok(RenderedPage {
                html,
                title: String::new(),
                final_url,
            }),
            Script::Fail(message) => Err(RenderError::Navigation {
                url: url.to_string(),
                message,
            }),
            Script::Hang => std::future::pending().await,
        };

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn close(&mut self) {
        self.inner.closed.fetch_add(1, Ordering::SeqCst);
    }
}
