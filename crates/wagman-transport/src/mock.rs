use crate::{Connector, LineTransport, Result, TransportError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What a mock device does in answer to one request line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MockReply {
    /// Queue these raw lines; reads past the end see the remote hang up.
    Lines(Vec<String>),
    /// Say nothing; every read times out.
    Silent,
}

impl MockReply {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockReply::Lines(lines.into_iter().map(Into::into).collect())
    }
}

type Responder = Box<dyn FnMut(&str) -> MockReply + Send>;

struct MockState {
    responder: Responder,
    present: bool,
    requests: Vec<String>,
    opened: usize,
    closed: usize,
}

/// A scripted in-process device. Each `connect` hands out an independent [`MockLink`] that
/// shares the responder and the open/close bookkeeping.
#[derive(Clone)]
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&str) -> MockReply + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(MockState {
                responder: Box::new(responder),
                present: true,
                requests: Vec::new(),
                opened: 0,
                closed: 0,
            })),
        }
    }

    /// Simulate unplugging (or re-plugging) the device.
    pub fn set_present(&self, present: bool) {
        self.lock().present = present;
    }

    /// Request lines received so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    /// Links handed out and not yet dropped.
    pub fn open_links(&self) -> usize {
        let s = self.lock();
        s.opened - s.closed
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connector for MockDevice {
    type Link = MockLink;

    fn connect(&self) -> Result<MockLink> {
        let mut s = self.lock();
        if !s.present {
            return Err(TransportError::DeviceNotFound("mock0".to_string()));
        }
        s.opened += 1;
        Ok(MockLink {
            device: self.clone(),
            inbox: VecDeque::new(),
            silent: true,
        })
    }

    fn describe(&self) -> String {
        "mock0".to_string()
    }
}

/// One open connection to a [`MockDevice`].
pub struct MockLink {
    device: MockDevice,
    inbox: VecDeque<String>,
    silent: bool,
}

impl LineTransport for MockLink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        if line.contains('\n') {
            return Err(TransportError::Io("embedded newline in request".to_string()));
        }
        let reply = {
            let mut s = self.device.lock();
            s.requests.push(line.to_string());
            (s.responder)(line)
        };
        match reply {
            MockReply::Lines(lines) => {
                self.inbox.extend(lines);
                self.silent = false;
            }
            MockReply::Silent => self.silent = true,
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        match self.inbox.pop_front() {
            Some(line) => Ok(line),
            None if self.silent => Err(TransportError::Timeout),
            None => Err(TransportError::Disconnected),
        }
    }
}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.device.lock().closed += 1;
    }
}
