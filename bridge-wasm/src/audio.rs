//! `HTMLAudioElement` implementation of the audio transport.
//!
//! Cached payloads are wrapped in a `Blob` and exposed to the element through
//! an object URL. The URL is revoked as soon as another source replaces it or
//! the transport is dropped.
//!
//! Signals come from three DOM listeners: `timeupdate` reports the position,
//! `loadedmetadata` the duration and `ended` the end of the source.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    playback::{AudioSource, AudioTransport, SignalHandler, TransportSignal},
};
use js_sys::{Array, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAudioElement, Url};

use crate::error::{describe_js_value, js_error, WasmError};

type SharedHandler = Rc<RefCell<Option<SignalHandler>>>;

struct Listener {
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

/// Audio transport backed by a detached `HTMLAudioElement`.
pub struct HtmlAudioTransport {
    element: HtmlAudioElement,
    handler: SharedHandler,
    object_url: RefCell<Option<String>>,
    listeners: Vec<Listener>,
}

impl HtmlAudioTransport {
    /// Create the element and attach the signal listeners.
    pub fn new() -> BridgeResult<Self> {
        let element = HtmlAudioElement::new().map_err(|err| js_error("create audio element", err))?;
        element.set_preload("auto");

        let handler: SharedHandler = Rc::new(RefCell::new(None));
        let mut transport = Self {
            element,
            handler,
            object_url: RefCell::new(None),
            listeners: Vec::new(),
        };

        transport.listen("timeupdate", |element| {
            Some(TransportSignal::PositionChanged(element.current_time()))
        })?;
        transport.listen("loadedmetadata", |element| {
            let duration = element.duration();
            duration
                .is_finite()
                .then_some(TransportSignal::DurationKnown(duration))
        })?;
        transport.listen("ended", |_| Some(TransportSignal::Ended))?;

        Ok(transport)
    }

    /// The underlying element, for hosts that want to attach it to the DOM.
    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    /// Object URL currently assigned to the element, if the source is a payload.
    pub fn object_url(&self) -> Option<String> {
        self.object_url.borrow().clone()
    }

    fn listen<F>(&mut self, event: &'static str, to_signal: F) -> BridgeResult<()>
    where
        F: Fn(&HtmlAudioElement) -> Option<TransportSignal> + 'static,
    {
        let element = self.element.clone();
        let handler = Rc::clone(&self.handler);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let Some(signal) = to_signal(&element) else {
                return;
            };
            let current = handler.borrow().clone();
            if let Some(handler) = current {
                handler(signal);
            }
        });

        self.element
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|err| js_error("add audio listener", err))?;
        self.listeners.push(Listener { event, callback });
        Ok(())
    }

    fn release_object_url(&self) {
        if let Some(url) = self.object_url.borrow_mut().take() {
            if let Err(err) = Url::revoke_object_url(&url) {
                warn!(error = %describe_js_value(&err), "Failed to revoke object URL");
            }
        }
    }

    fn payload_url(data: &[u8], mime_type: Option<&str>) -> Result<String, WasmError> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(data));

        let options = BlobPropertyBag::new();
        options.set_type(mime_type.unwrap_or("audio/mpeg"));

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        Ok(Url::create_object_url_with_blob(&blob)?)
    }
}

#[async_trait(?Send)]
impl AudioTransport for HtmlAudioTransport {
    fn set_source(&self, source: AudioSource) -> BridgeResult<()> {
        self.release_object_url();

        let src = match source {
            AudioSource::Remote { url } => url,
            AudioSource::Payload { data, mime_type } => {
                let url = Self::payload_url(&data, mime_type.as_deref())?;
                debug!(bytes = data.len(), "Created object URL for cached payload");
                *self.object_url.borrow_mut() = Some(url.clone());
                url
            }
        };

        self.element.set_src(&src);
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let promise = self
            .element
            .play()
            .map_err(|err| js_error("audio play", err))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| BridgeError::from(WasmError::Media(describe_js_value(&err))))
    }

    fn pause(&self) -> BridgeResult<()> {
        self.element
            .pause()
            .map_err(|err| js_error("audio pause", err))
    }

    fn set_position(&self, seconds: f64) -> BridgeResult<()> {
        self.element.set_current_time(seconds);
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.element.set_volume(f64::from(volume));
        Ok(())
    }

    fn set_signal_handler(&self, handler: SignalHandler) {
        *self.handler.borrow_mut() = Some(handler);
    }
}

impl Drop for HtmlAudioTransport {
    fn drop(&mut self) {
        let _ = self.element.pause();
        for listener in &self.listeners {
            let _ = self.element.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        self.release_object_url();
    }
}
