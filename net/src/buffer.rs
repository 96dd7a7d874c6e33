// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet buffer traits
//!
//! A translator rewrites datagrams in place: it strips one IP header from the
//! front of a message and prepends another.  The traits here capture exactly
//! the buffer capabilities that workflow needs, so the engine can run over
//! whatever buffer type the surrounding stack provides (an mbuf, a ring slot,
//! a plain `Vec` with reserved headroom).

use core::fmt::Debug;

/// Abstract read operations on a packet buffer.
///
/// `as_ref` yields the current datagram contents, headroom excluded.
pub trait PacketBuffer: AsRef<[u8]> + Headroom + Debug + 'static {}
impl<T> PacketBuffer for T where T: AsRef<[u8]> + Headroom + Debug + 'static {}

/// Abstract mutation operations on a packet buffer.
pub trait PacketBufferMut: PacketBuffer + AsMut<[u8]> + Prepend + TrimFromStart {}
impl<T> PacketBufferMut for T where T: PacketBuffer + AsMut<[u8]> + Prepend + TrimFromStart {}

/// Ability to report the unused headroom in front of the datagram.
pub trait Headroom {
    /// Get the (unused) headroom in the buffer.
    fn headroom(&self) -> u16;
}

/// Ability to grow the datagram at the front, consuming headroom.
pub trait Prepend {
    /// Error returned when the buffer cannot grow at the front.
    type Error: Debug + core::error::Error;

    /// Extend the datagram by `len` bytes at the front.
    ///
    /// On success the returned slice covers the whole datagram, with the
    /// first `len` bytes uninitialized by this call and the previous contents
    /// untouched behind them.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when less than `len` bytes of headroom remain.
    fn prepend(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Ability to shrink the datagram at the front, releasing bytes to headroom.
pub trait TrimFromStart {
    /// Error returned when the buffer cannot shrink at the front.
    type Error: Debug + core::error::Error;

    /// Remove `len` bytes from the front of the datagram.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the datagram holds fewer than `len` bytes.
    fn trim_from_start(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Error indicating that there is not enough headroom in a buffer for the
/// requested operation.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
#[error("not enough headroom in packet buffer")]
pub struct NotEnoughHeadRoom;

/// Error indicating that the datagram is shorter than the number of bytes the
/// requested operation would remove.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
#[error("packet buffer not long enough to trim the requested number of bytes")]
pub struct BufferTooShort;

#[cfg(any(test, feature = "test_buffer"))]
pub use test_buffer::TestBuffer;

#[cfg(any(test, feature = "test_buffer"))]
mod test_buffer {
    use super::{BufferTooShort, Headroom, NotEnoughHeadRoom, Prepend, TrimFromStart};

    /// Toy [`PacketBuffer`] implementation backing the test suites.
    ///
    /// Fakes the headroom mechanics of a real driver buffer without the need
    /// for a driver: a flat allocation with an adjustable data window.
    ///
    /// [`PacketBuffer`]: super::PacketBuffer
    #[derive(Debug)]
    pub struct TestBuffer {
        buffer: Vec<u8>,
        headroom: u16,
    }

    // Dropping is how a consumed buffer gets "freed".
    impl Drop for TestBuffer {
        fn drop(&mut self) {
            tracing::trace!("dropping TestBuffer ({} bytes)", self.as_ref().len());
        }
    }

    impl TestBuffer {
        /// Default headroom reserved in front of the datagram.
        pub const HEADROOM: u16 = 96;

        /// Create a buffer holding `data` with the default headroom.
        #[must_use]
        pub fn from_raw_data(data: &[u8]) -> TestBuffer {
            Self::with_headroom(Self::HEADROOM, data)
        }

        /// Create a buffer holding `data` with exactly `headroom` bytes of
        /// headroom in front of it.
        #[must_use]
        pub fn with_headroom(headroom: u16, data: &[u8]) -> TestBuffer {
            let mut buffer = Vec::with_capacity(usize::from(headroom) + data.len());
            buffer.resize(usize::from(headroom), 0);
            buffer.extend_from_slice(data);
            TestBuffer { buffer, headroom }
        }
    }

    impl AsRef<[u8]> for TestBuffer {
        fn as_ref(&self) -> &[u8] {
            &self.buffer.as_slice()[usize::from(self.headroom)..]
        }
    }

    impl AsMut<[u8]> for TestBuffer {
        fn as_mut(&mut self) -> &mut [u8] {
            &mut self.buffer.as_mut_slice()[usize::from(self.headroom)..]
        }
    }

    impl Headroom for TestBuffer {
        fn headroom(&self) -> u16 {
            self.headroom
        }
    }

    impl Prepend for TestBuffer {
        type Error = NotEnoughHeadRoom;
        fn prepend(&mut self, len: u16) -> Result<&mut [u8], Self::Error> {
            if self.headroom < len {
                return Err(NotEnoughHeadRoom);
            }
            self.headroom -= len;
            Ok(self.as_mut())
        }
    }

    impl TrimFromStart for TestBuffer {
        type Error = BufferTooShort;
        fn trim_from_start(&mut self, len: u16) -> Result<&mut [u8], Self::Error> {
            if self.as_ref().len() < usize::from(len) {
                return Err(BufferTooShort);
            }
            self.headroom += len;
            Ok(self.as_mut())
        }
    }
}
