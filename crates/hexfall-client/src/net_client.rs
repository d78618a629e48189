use std::cell::RefCell;
use std::rc::Rc;

#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::*;

/// Reliable broadcast to every other peer in the room.
pub trait Transport {
    fn send(&mut self, data: &[u8]) -> Result<(), String>;
    /// Drain everything received since the last call.
    fn drain_messages(&mut self) -> Vec<Vec<u8>>;
}

/// Received frames waiting for the next [`Transport::drain_messages`].
#[derive(Default)]
struct MessageBuffer {
    messages: Vec<Vec<u8>>,
}

/// Lifecycle of the room socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
}

/// Socket state shared with the browser callbacks.
#[derive(Default)]
struct SocketShared {
    state: ConnectionState,
    inbox: MessageBuffer,
    /// Frames sent before the socket opened, flushed in order on open.
    outbox: Vec<Vec<u8>>,
}

impl SocketShared {
    fn opened(&mut self) -> Vec<Vec<u8>> {
        self.state = ConnectionState::Open;
        std::mem::take(&mut self.outbox)
    }

    fn received(&mut self, frame: Vec<u8>) {
        if self.state != ConnectionState::Closed {
            self.inbox.messages.push(frame);
        }
    }

    fn closed(&mut self) {
        self.state = ConnectionState::Closed;
        self.outbox.clear();
    }

    /// Queue a frame while connecting. Returns the frame back when it can be
    /// written right away.
    fn enqueue(&mut self, frame: &[u8]) -> Result<Option<Vec<u8>>, String> {
        match self.state {
            ConnectionState::Connecting => {
                self.outbox.push(frame.to_vec());
                Ok(None)
            },
            ConnectionState::Open => Ok(Some(frame.to_vec())),
            ConnectionState::Closed => Err("room connection closed".to_string()),
        }
    }
}

/// Binary WebSocket to the room relay. Shared state is `Rc<RefCell>` because
/// the browser callbacks run on the same thread as the frame loop.
pub struct RoomSocket {
    #[cfg(target_family = "wasm")]
    ws: web_sys::WebSocket,
    shared: Rc<RefCell<SocketShared>>,
}

impl RoomSocket {
    #[cfg(target_family = "wasm")]
    pub fn connect(url: &str) -> Result<Self, String> {
        let ws = web_sys::WebSocket::new(url).map_err(|e| format!("WebSocket error: {e:?}"))?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);
        let shared = Rc::new(RefCell::new(SocketShared::default()));

        let inbox = Rc::clone(&shared);
        let onmessage = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |evt: web_sys::MessageEvent| match evt.data().dyn_into::<js_sys::ArrayBuffer>() {
                Ok(buf) => inbox
                    .borrow_mut()
                    .received(js_sys::Uint8Array::new(&buf).to_vec()),
                Err(_) => tracing::debug!("Ignoring non-binary room frame"),
            },
        );
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let on_open_shared = Rc::clone(&shared);
        let on_open_ws = ws.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            let pending = on_open_shared.borrow_mut().opened();
            tracing::info!(queued = pending.len(), "Room connection open");
            for frame in pending {
                if let Err(e) = on_open_ws.send_with_u8_array(&frame) {
                    tracing::warn!(error = ?e, "Failed to flush queued frame");
                }
            }
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let on_close_shared = Rc::clone(&shared);
        let onclose =
            Closure::<dyn FnMut(web_sys::CloseEvent)>::new(move |evt: web_sys::CloseEvent| {
                on_close_shared.borrow_mut().closed();
                tracing::warn!(code = evt.code(), "Room connection closed");
            });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        Ok(Self { ws, shared })
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.borrow().state
    }
}

impl Transport for RoomSocket {
    fn send(&mut self, data: &[u8]) -> Result<(), String> {
        let Some(frame) = self.shared.borrow_mut().enqueue(data)? else {
            return Ok(());
        };
        #[cfg(target_family = "wasm")]
        {
            self.ws
                .send_with_u8_array(&frame)
                .map_err(|e| format!("Send error: {e:?}"))
        }
        #[cfg(not(target_family = "wasm"))]
        {
            drop(frame);
            Err("no socket on this target".to_string())
        }
    }

    fn drain_messages(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.shared.borrow_mut().inbox.messages)
    }
}

/// In-process room: every endpoint's sends land in every other endpoint's inbox.
#[derive(Default, Clone)]
pub struct LocalBus {
    inboxes: Rc<RefCell<Vec<MessageBuffer>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&self) -> LocalEndpoint {
        let mut inboxes = self.inboxes.borrow_mut();
        inboxes.push(MessageBuffer::default());
        LocalEndpoint {
            index: inboxes.len() - 1,
            inboxes: Rc::clone(&self.inboxes),
        }
    }
}

pub struct LocalEndpoint {
    index: usize,
    inboxes: Rc<RefCell<Vec<MessageBuffer>>>,
}

impl Transport for LocalEndpoint {
    fn send(&mut self, data: &[u8]) -> Result<(), String> {
        let mut inboxes = self.inboxes.borrow_mut();
        for (i, inbox) in inboxes.iter_mut().enumerate() {
            if i != self.index {
                inbox.messages.push(data.to_vec());
            }
        }
        Ok(())
    }

    fn drain_messages(&mut self) -> Vec<Vec<u8>> {
        let mut inboxes = self.inboxes.borrow_mut();
        match inboxes.get_mut(self.index) {
            Some(inbox) => std::mem::take(&mut inbox.messages),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_bus_skips_the_sender() {
        let bus = LocalBus::new();
        let mut a = bus.endpoint();
        let mut b = bus.endpoint();
        let mut c = bus.endpoint();
        a.send(&[1, 2]).unwrap();
        assert!(a.drain_messages().is_empty());
        assert_eq!(b.drain_messages(), vec![vec![1, 2]]);
        assert_eq!(c.drain_messages(), vec![vec![1, 2]]);
        assert!(b.drain_messages().is_empty());
    }

    #[test]
    fn frames_sent_while_connecting_flush_on_open() {
        let mut shared = SocketShared::default();
        assert_eq!(shared.enqueue(&[1]), Ok(None));
        assert_eq!(shared.enqueue(&[2]), Ok(None));
        assert_eq!(shared.opened(), vec![vec![1], vec![2]]);
        assert_eq!(shared.state, ConnectionState::Open);
        assert_eq!(shared.enqueue(&[3]), Ok(Some(vec![3])));
        assert!(shared.outbox.is_empty());
    }

    #[test]
    fn closed_socket_rejects_and_drops_frames() {
        let mut shared = SocketShared::default();
        shared.enqueue(&[1]).unwrap();
        shared.received(vec![9]);
        shared.closed();
        assert!(shared.outbox.is_empty());
        assert!(shared.enqueue(&[2]).is_err());
        shared.received(vec![10]);
        assert_eq!(shared.inbox.messages, vec![vec![9]]);
    }
}
