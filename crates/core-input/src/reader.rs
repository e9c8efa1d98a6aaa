//! Blocking codepoint and key readers over any byte source.

use crate::InputError;
use crate::decoder::Decoder;
use core_events::Key;
use std::io::{ErrorKind, Read};

/// Anything that can block until the next logical key is available.
pub trait KeySource {
    fn next_key(&mut self) -> Result<Key, InputError>;
}

/// Reads UTF-8 encoded codepoints one at a time. Malformed sequences decode
/// to `U+FFFD` instead of failing. A byte that breaks a sequence is not
/// consumed by it: it is decoded on its own by the next call.
pub struct CodepointReader<R: Read> {
    inner: R,
    pending: Option<u8>,
}

const fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

impl<R: Read> CodepointReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    fn read_byte(&mut self) -> Result<u8, InputError> {
        if let Some(byte) = self.pending.take() {
            return Ok(byte);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(InputError::StreamEnded),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(InputError::Read(e)),
            }
        }
    }

    pub fn next_char(&mut self) -> Result<char, InputError> {
        let lead = self.read_byte()?;
        let len = match lead {
            0x00..=0x7f => return Ok(char::from(lead)),
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };
        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(len).skip(1) {
            let byte = match self.read_byte() {
                Ok(byte) => byte,
                // Truncated sequence; the end of stream surfaces on the next call.
                Err(InputError::StreamEnded) => return Ok(char::REPLACEMENT_CHARACTER),
                Err(err) => return Err(err),
            };
            if !is_continuation(byte) {
                self.pending = Some(byte);
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            *slot = byte;
        }
        Ok(std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

/// Codepoint reader plus decoder: yields only completed keys.
pub struct KeyReader<R: Read> {
    chars: CodepointReader<R>,
    decoder: Decoder,
}

impl<R: Read> KeyReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            chars: CodepointReader::new(inner),
            decoder: Decoder::new(),
        }
    }
}

impl<R: Read> KeySource for KeyReader<R> {
    fn next_key(&mut self) -> Result<Key, InputError> {
        loop {
            let ch = self.chars.next_char()?;
            if let Some(key) = self.decoder.feed(ch)? {
                return Ok(key);
            }
        }
    }
}
