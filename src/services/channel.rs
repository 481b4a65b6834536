// ============================================================================
// CHANNEL TRANSPORT - Canal pub/sub entre pestañas del mismo origen
// ============================================================================
// Fire-and-forget: sin ACK, sin entrega a pestañas que no están abiertas,
// FIFO por emisor. El emisor nunca recibe sus propios mensajes.
// ============================================================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use crate::error::{DashboardError, DashboardResult};

/// Callback por mensaje recibido (payload JSON crudo)
pub type MessageHandler = Rc<dyn Fn(&str)>;

pub trait BroadcastTransport {
    fn name(&self) -> &str;

    /// Envía a todos los demás peers del canal. Sin confirmación.
    fn send(&self, payload: &str);

    /// Registra un handler; se invoca una vez por mensaje, en orden de llegada
    fn on_message(&self, handler: MessageHandler);

    /// Libera el canal. Idempotente.
    fn close(&self);

    fn is_open(&self) -> bool;
}

// ============================================================================
// HUB EN MEMORIA - mismo contrato que BroadcastChannel, dentro del proceso
// ============================================================================

struct PeerSlot {
    id: u64,
    channel: String,
    handlers: Vec<MessageHandler>,
}

struct Envelope {
    from: u64,
    channel: String,
    payload: String,
}

struct HubInner {
    available: bool,
    next_peer: u64,
    peers: Vec<PeerSlot>,
    queue: VecDeque<Envelope>,
    dispatching: bool,
}

/// Hub de canales en memoria. Cada `open` es un peer (una "pestaña").
/// Los envíos hechos desde un handler se encolan, no se anidan.
#[derive(Clone)]
pub struct LocalHub {
    inner: Rc<RefCell<HubInner>>,
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHub {
    pub fn new() -> Self {
        Self::with_availability(true)
    }

    /// Hub que simula un navegador sin BroadcastChannel
    pub fn unavailable() -> Self {
        Self::with_availability(false)
    }

    fn with_availability(available: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                available,
                next_peer: 1,
                peers: Vec::new(),
                queue: VecDeque::new(),
                dispatching: false,
            })),
        }
    }

    pub fn open(&self, name: &str) -> DashboardResult<LocalChannel> {
        let mut inner = self.inner.borrow_mut();
        if !inner.available {
            return Err(DashboardError::TransportUnavailable(format!(
                "BroadcastChannel is not supported (channel \"{}\")",
                name
            )));
        }

        let id = inner.next_peer;
        inner.next_peer += 1;
        inner.peers.push(PeerSlot {
            id,
            channel: name.to_string(),
            handlers: Vec::new(),
        });

        Ok(LocalChannel {
            hub: self.clone(),
            id,
            name: name.to_string(),
        })
    }

    /// Peers abiertos en un canal (los cerrados ya no están en el hub)
    pub fn peer_count(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .peers
            .iter()
            .filter(|p| p.channel == name)
            .count()
    }

    fn enqueue(&self, from: u64, channel: &str, payload: &str) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(Envelope {
                from,
                channel: channel.to_string(),
                payload: payload.to_string(),
            });
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }
        self.drain();
    }

    /// Entrega la cola sin mantener ningún borrow durante los handlers
    fn drain(&self) {
        loop {
            let next = self.inner.borrow_mut().queue.pop_front();
            let Some(envelope) = next else { break };

            let targets: Vec<MessageHandler> = self
                .inner
                .borrow()
                .peers
                .iter()
                .filter(|p| p.id != envelope.from && p.channel == envelope.channel)
                .flat_map(|p| p.handlers.iter().cloned())
                .collect();

            for handler in targets {
                handler(&envelope.payload);
            }
        }
        self.inner.borrow_mut().dispatching = false;
    }

    fn with_peer<R>(&self, id: u64, f: impl FnOnce(&mut PeerSlot) -> R) -> Option<R> {
        let mut inner = self.inner.borrow_mut();
        inner.peers.iter_mut().find(|p| p.id == id).map(f)
    }
}

/// Un peer del hub en memoria
pub struct LocalChannel {
    hub: LocalHub,
    id: u64,
    name: String,
}

impl BroadcastTransport for LocalChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, payload: &str) {
        if !self.is_open() {
            log::debug!("📪 [CHANNEL] send sobre canal cerrado ignorado");
            return;
        }
        self.hub.enqueue(self.id, &self.name, payload);
    }

    fn on_message(&self, handler: MessageHandler) {
        self.hub.with_peer(self.id, |peer| peer.handlers.push(handler));
    }

    /// Quita el slot del hub (con sus handlers)
    fn close(&self) {
        self.hub.inner.borrow_mut().peers.retain(|p| p.id != self.id);
    }

    fn is_open(&self) -> bool {
        self.hub.with_peer(self.id, |_| ()).is_some()
    }
}

impl Drop for LocalChannel {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// BROADCASTCHANNEL DEL NAVEGADOR
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserChannel;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use std::cell::Cell;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::MessageEvent;

    /// Wrapper de `web_sys::BroadcastChannel`. Los mensajes salen como objetos
    /// JS (JSON.parse del payload) para que las páginas JS los entiendan.
    pub struct BrowserChannel {
        name: String,
        channel: web_sys::BroadcastChannel,
        handlers: Rc<RefCell<Vec<MessageHandler>>>,
        open: Rc<Cell<bool>>,
        // Mantiene vivo el listener mientras viva el canal
        _listener: Closure<dyn FnMut(MessageEvent)>,
    }

    impl BrowserChannel {
        pub fn open(name: &str) -> DashboardResult<Self> {
            let channel = web_sys::BroadcastChannel::new(name)
                .map_err(|e| DashboardError::TransportUnavailable(format!("{:?}", e)))?;

            let handlers: Rc<RefCell<Vec<MessageHandler>>> = Rc::new(RefCell::new(Vec::new()));
            let open = Rc::new(Cell::new(true));

            let listener = Closure::wrap(Box::new({
                let handlers = handlers.clone();
                let open = open.clone();
                move |event: MessageEvent| {
                    if !open.get() {
                        return;
                    }
                    let data = event.data();
                    let raw = match data.as_string() {
                        Some(text) => text,
                        None => match js_sys::JSON::stringify(&data) {
                            Ok(json) => String::from(json),
                            Err(e) => {
                                log::warn!("⚠️ [CHANNEL] Mensaje no serializable descartado: {:?}", e);
                                return;
                            }
                        },
                    };
                    let current: Vec<MessageHandler> = handlers.borrow().clone();
                    for handler in current {
                        handler(&raw);
                    }
                }
            }) as Box<dyn FnMut(MessageEvent)>);

            channel.set_onmessage(Some(listener.as_ref().unchecked_ref()));
            log::info!("✅ [CHANNEL] BroadcastChannel \"{}\" abierto", name);

            Ok(Self {
                name: name.to_string(),
                channel,
                handlers,
                open,
                _listener: listener,
            })
        }
    }

    impl BroadcastTransport for BrowserChannel {
        fn name(&self) -> &str {
            &self.name
        }

        fn send(&self, payload: &str) {
            if !self.open.get() {
                return;
            }
            let message = js_sys::JSON::parse(payload).unwrap_or_else(|_| JsValue::from_str(payload));
            if let Err(e) = self.channel.post_message(&message) {
                log::error!("❌ [CHANNEL] postMessage falló: {:?}", e);
            }
        }

        fn on_message(&self, handler: MessageHandler) {
            if self.open.get() {
                self.handlers.borrow_mut().push(handler);
            }
        }

        fn close(&self) {
            if self.open.replace(false) {
                self.channel.set_onmessage(None);
                self.channel.close();
                self.handlers.borrow_mut().clear();
                log::info!("🧹 [CHANNEL] BroadcastChannel \"{}\" cerrado", self.name);
            }
        }

        fn is_open(&self) -> bool {
            self.open.get()
        }
    }

    impl Drop for BrowserChannel {
        fn drop(&mut self) {
            self.close();
        }
    }
}
