use std::cell::RefCell;
use std::cmp::min;
use std::io::{Error, ErrorKind, Read, Result, Write};
use std::rc::Rc;

/// A scripted server: reads replay `read_buf`, writes are collected in a buffer that stays
/// reachable through [`MockStream::written`] after the stream has been moved into a client.
#[derive(Debug, Default)]
pub(crate) struct MockStream {
    read_buf: Vec<u8>,
    read_pos: usize,
    written_buf: Rc<RefCell<Vec<u8>>>,
    err_on_read: bool,
}

impl MockStream {
    pub(crate) fn new(read_buf: Vec<u8>) -> MockStream {
        MockStream {
            read_buf,
            ..MockStream::default()
        }
    }

    pub(crate) fn with_err(mut self) -> MockStream {
        self.err_on_read = true;
        self
    }

    /// A handle on everything written to this stream.
    pub(crate) fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.written_buf)
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.err_on_read {
            return Err(Error::new(ErrorKind::ConnectionReset, "MockStream Error"));
        }
        if self.read_pos >= self.read_buf.len() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "EOF"));
        }
        let write_len = min(buf.len(), self.read_buf.len() - self.read_pos);
        let max_pos = self.read_pos + write_len;
        buf[..write_len].copy_from_slice(&self.read_buf[self.read_pos..max_pos]);
        self.read_pos = max_pos;
        Ok(write_len)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.written_buf.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
