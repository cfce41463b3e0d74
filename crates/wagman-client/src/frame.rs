use crate::{ClientError, ProtocolError, Result};
use std::iter::FusedIterator;
use tracing::{debug, trace};
use wagman_transport::LineTransport;

/// Marks the first line of every reply.
pub const HEADER_PREFIX: &str = "<<<-";
/// Marks the last line of every reply. Never part of the body.
pub const FOOTER_PREFIX: &str = "->>>";

/// Trim and collapse every internal whitespace run to one space.
///
/// Idempotent: `compact(compact(s)) == compact(s)`.
pub fn compact(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lazy view over the body lines of one reply frame.
///
/// The frame owns the link it reads from. The link is dropped (and the port closed) as soon
/// as the footer is consumed or a read fails, and in any case when the frame itself is
/// dropped, so abandoning iteration early does not leak the connection.
pub struct Frame<L: LineTransport> {
    link: Option<L>,
    command: String,
    header: String,
    body_lines: usize,
}

impl<L: LineTransport> Frame<L> {
    /// Read the header line from a link whose request has already been written.
    pub fn open(mut link: L, command: &str) -> Result<Self> {
        let first = link.read_line().map_err(ClientError::from_read)?;
        let header = first.trim();
        if !header.starts_with(HEADER_PREFIX) {
            debug!(command, line = %header, "reply without header");
            return Err(ProtocolError::HeaderNotFound {
                line: header.to_string(),
            }
            .into());
        }
        trace!(command, header, "frame opened");
        Ok(Self {
            header: header.to_string(),
            link: Some(link),
            command: command.to_string(),
            body_lines: 0,
        })
    }

    /// The header line as received (prefix included).
    pub fn header(&self) -> &str {
        &self.header
    }

    /// True once the footer was read or the frame failed.
    pub fn is_finished(&self) -> bool {
        self.link.is_none()
    }

    fn close(&mut self) {
        if self.link.take().is_some() {
            trace!(command = %self.command, body_lines = self.body_lines, "frame closed");
        }
    }
}

impl<L: LineTransport> Iterator for Frame<L> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.link.as_mut()?;
        match link.read_line() {
            Ok(raw) => {
                let line = raw.trim();
                if line.starts_with(FOOTER_PREFIX) {
                    self.close();
                    return None;
                }
                self.body_lines += 1;
                Some(Ok(line.to_string()))
            }
            Err(e) => {
                self.close();
                Some(Err(ClientError::from_read(e)))
            }
        }
    }
}

impl<L: LineTransport> FusedIterator for Frame<L> {}

impl<L: LineTransport> Drop for Frame<L> {
    fn drop(&mut self) {
        if self.link.is_some() {
            debug!(command = %self.command, "frame abandoned before footer");
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::framed;
    use wagman_transport::{Connector, MockDevice, MockLink, MockReply};

    fn device_replying(lines: Vec<String>) -> MockDevice {
        MockDevice::new(move |_| MockReply::Lines(lines.clone()))
    }

    fn open(dev: &MockDevice, command: &str) -> Result<Frame<MockLink>> {
        let mut link = dev.connect()?;
        link.write_line(command)?;
        Frame::open(link, command)
    }

    #[test]
    fn yields_trimmed_body_lines_in_order() -> anyhow::Result<()> {
        let dev = device_replying(framed("hb", ["  1 2 3  ", "", "\tlast\r"]));
        let frame = open(&dev, "hb")?;
        assert!(frame.header().starts_with(HEADER_PREFIX));
        let body = frame.collect::<Result<Vec<_>>>()?;
        assert_eq!(body, vec!["1 2 3", "", "last"]);
        assert_eq!(dev.open_links(), 0);
        Ok(())
    }

    #[test]
    fn empty_body_is_well_formed() -> anyhow::Result<()> {
        let dev = device_replying(framed("stop", Vec::<String>::new()));
        let mut frame = open(&dev, "stop")?;
        assert!(frame.next().is_none());
        assert!(frame.is_finished());
        assert!(frame.next().is_none());
        Ok(())
    }

    #[test]
    fn footer_ends_the_frame_even_with_trailing_lines() -> anyhow::Result<()> {
        let mut lines = framed("cu", ["100"]);
        lines.push("stray".to_string());
        let dev = device_replying(lines);
        let body = open(&dev, "cu")?.collect::<Result<Vec<_>>>()?;
        assert_eq!(body, vec!["100"]);
        Ok(())
    }

    #[test]
    fn missing_header_fails_and_closes_link() {
        let dev = device_replying(vec![
            "WAGMAN01".to_string(),
            "more".to_string(),
            FOOTER_PREFIX.to_string(),
        ]);
        match open(&dev, "id") {
            Err(ClientError::Protocol(ProtocolError::HeaderNotFound { line })) => {
                assert_eq!(line, "WAGMAN01")
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("frame opened without header"),
        }
        assert_eq!(dev.opened(), 1);
        assert_eq!(dev.open_links(), 0);
    }

    #[test]
    fn eof_before_footer_is_a_disconnect() -> anyhow::Result<()> {
        let dev = device_replying(vec![format!("{HEADER_PREFIX} cmd=th"), "21.5".into()]);
        let mut frame = open(&dev, "th")?;
        assert_eq!(frame.next(), Some(Ok("21.5".to_string())));
        assert_eq!(
            frame.next(),
            Some(Err(ClientError::Protocol(ProtocolError::Disconnected)))
        );
        assert_eq!(dev.open_links(), 0);
        assert!(frame.next().is_none());
        Ok(())
    }

    #[test]
    fn silent_device_times_out_at_header() {
        let dev = MockDevice::new(|_| MockReply::Silent);
        let err = open(&dev, "up").err();
        assert_eq!(err, Some(ClientError::Protocol(ProtocolError::Timeout)));
        assert_eq!(dev.open_links(), 0);
    }

    #[test]
    fn abandoning_iteration_closes_link() -> anyhow::Result<()> {
        let dev = device_replying(framed("help", ["start", "stop", "info"]));
        {
            let mut frame = open(&dev, "help")?;
            assert_eq!(frame.next(), Some(Ok("start".to_string())));
            assert_eq!(dev.open_links(), 1);
        }
        assert_eq!(dev.open_links(), 0);
        assert_eq!(dev.closed(), 1);
        Ok(())
    }

    #[test]
    fn compact_collapses_whitespace() {
        assert_eq!(compact("  a   b\tc "), "a b c");
        assert_eq!(compact("a\nb"), "a b");
        assert_eq!(compact(""), "");
        for s in ["a b c", "  x\t\ty  ", "one"] {
            let once = compact(s);
            assert_eq!(compact(&once), once);
        }
    }
}
