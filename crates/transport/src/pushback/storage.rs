use std::io::IoSliceMut;

/// Bytes pushed back ahead of the inner stream together with a replay cursor.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReplayBuffer {
    pos: usize,
    bytes: Vec<u8>,
}

impl ReplayBuffer {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { pos: 0, bytes }
    }

    pub(crate) const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) const fn consumed(&self) -> usize {
        self.pos
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub(crate) const fn has_remaining(&self) -> bool {
        self.pos < self.bytes.len()
    }

    pub(crate) fn remaining_slice(&self) -> &[u8] {
        &self.bytes[self.pos..]
    }

    pub(crate) fn copy_into(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() || !self.has_remaining() {
            return 0;
        }

        let available = &self.bytes[self.pos..];
        let to_copy = available.len().min(buf.len());
        buf[..to_copy].copy_from_slice(&available[..to_copy]);
        self.pos += to_copy;
        self.release_if_drained();
        to_copy
    }

    pub(crate) fn copy_into_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> usize {
        let mut copied = 0;
        for target in bufs.iter_mut() {
            if !self.has_remaining() {
                break;
            }
            copied += self.copy_into(target);
        }
        copied
    }

    /// Marks `amt` bytes as consumed and returns how many exceeded the buffer.
    pub(crate) fn consume(&mut self, amt: usize) -> usize {
        if !self.has_remaining() {
            return amt;
        }

        let available = self.remaining();
        let excess = if amt < available {
            self.pos += amt;
            0
        } else {
            self.pos = self.bytes.len();
            amt - available
        };
        self.release_if_drained();
        excess
    }

    /// Returns the unread bytes, leaving the buffer empty.
    pub(crate) fn take_remaining(&mut self) -> Vec<u8> {
        let mut bytes = std::mem::take(&mut self.bytes);
        let start = std::mem::take(&mut self.pos).min(bytes.len());
        bytes.drain(..start);
        bytes
    }

    // The replay copy is the only one; free it as soon as it has been read.
    fn release_if_drained(&mut self) {
        if !self.has_remaining() && !self.bytes.is_empty() {
            self.bytes = Vec::new();
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== Construction ====

    #[test]
    fn new_starts_at_the_first_byte() {
        let buf = ReplayBuffer::new(vec![1, 2, 3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.consumed(), 0);
        assert_eq!(buf.remaining_slice(), &[1, 2, 3]);
    }

    #[test]
    fn default_is_empty() {
        let buf = ReplayBuffer::default();
        assert!(!buf.has_remaining());
        assert_eq!(buf.remaining(), 0);
    }

    // ==== copy_into ====

    #[test]
    fn copy_into_respects_target_length() {
        let mut buf = ReplayBuffer::new(vec![1, 2, 3, 4, 5]);
        let mut target = [0u8; 2];

        assert_eq!(buf.copy_into(&mut target), 2);
        assert_eq!(target, [1, 2]);
        assert_eq!(buf.remaining_slice(), &[3, 4, 5]);
    }

    #[test]
    fn copy_into_empty_target_is_noop() {
        let mut buf = ReplayBuffer::new(vec![1, 2]);
        assert_eq!(buf.copy_into(&mut []), 0);
        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn draining_releases_storage() {
        let mut buf = ReplayBuffer::new(vec![7; 4]);
        let mut target = [0u8; 8];

        assert_eq!(buf.copy_into(&mut target), 4);
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.copy_into(&mut target), 0);
    }

    #[test]
    fn copy_into_vectored_fills_slices_in_order() {
        let mut buf = ReplayBuffer::new(vec![1, 2, 3, 4, 5]);
        let mut first = [0u8; 2];
        let mut second = [0u8; 4];
        let mut slices = [IoSliceMut::new(&mut first), IoSliceMut::new(&mut second)];

        assert_eq!(buf.copy_into_vectored(&mut slices), 5);
        assert_eq!(first, [1, 2]);
        assert_eq!(&second[..3], &[3, 4, 5]);
    }

    // ==== consume ====

    #[test]
    fn consume_within_buffer_reports_no_excess() {
        let mut buf = ReplayBuffer::new(vec![1, 2, 3]);
        assert_eq!(buf.consume(2), 0);
        assert_eq!(buf.remaining_slice(), &[3]);
    }

    #[test]
    fn consume_past_buffer_reports_excess() {
        let mut buf = ReplayBuffer::new(vec![1, 2, 3]);
        assert_eq!(buf.consume(5), 2);
        assert!(!buf.has_remaining());
    }

    #[test]
    fn consume_on_empty_buffer_passes_everything_through() {
        let mut buf = ReplayBuffer::default();
        assert_eq!(buf.consume(4), 4);
    }

    // ==== take_remaining ====

    #[test]
    fn take_remaining_skips_consumed_prefix() {
        let mut buf = ReplayBuffer::new(vec![1, 2, 3, 4]);
        buf.consume(1);
        assert_eq!(buf.take_remaining(), vec![2, 3, 4]);
        assert!(!buf.has_remaining());
    }
}
