use std::fmt::{self, Write as _};
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Initial capacity of buffers used to assemble a whole record.
pub const LARGE_CAPACITY: usize = 1024;

/// Initial capacity of buffers used to stringify a single value.
pub const SMALL_CAPACITY: usize = 128;

/// Buffers that grew past `initial capacity * POOL_CEILING_FACTOR` are
/// dropped instead of being returned to their pool.
pub const POOL_CEILING_FACTOR: usize = 16;

const INDENT_UNIT: &[u8] = b"  ";

/// Append-only byte buffer with the typed writers the renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Buffer {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Reset the length to zero while keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Independent copy of the current contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    pub fn write_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    /// Append the contents of `other`; `other` is left untouched.
    pub fn append(&mut self, other: &Buffer) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    pub fn write_uint(&mut self, mut value: u64) {
        let mut digits = [0u8; 20];
        let mut pos = digits.len();
        loop {
            pos -= 1;
            digits[pos] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        self.bytes.extend_from_slice(&digits[pos..]);
    }

    pub fn write_int(&mut self, value: i64) {
        if value < 0 {
            self.bytes.push(b'-');
        }
        self.write_uint(value.unsigned_abs());
    }

    /// Write `value` in base 10 using at least `width` digits, left-padded
    /// with zeros. Values wider than `width` are written in full.
    pub fn write_padded(&mut self, width: usize, value: u64) {
        let mut digits = 1;
        let mut rest = value / 10;
        while rest > 0 {
            digits += 1;
            rest /= 10;
        }
        for _ in digits..width {
            self.bytes.push(b'0');
        }
        self.write_uint(value);
    }

    /// Indentation for nesting `depth`. Depth 0 is already one unit deep,
    /// since attributes always sit below their record's header line.
    pub fn write_indent(&mut self, depth: usize) {
        for _ in 0..=depth {
            self.bytes.extend_from_slice(INDENT_UNIT);
        }
    }

    /// Default stringification through `Display`.
    pub fn write_display(&mut self, value: &dyn fmt::Display) {
        self.write_fmt_infallible(format_args!("{value}"));
    }

    pub fn write_debug<T: fmt::Debug + ?Sized>(&mut self, value: &T) {
        self.write_fmt_infallible(format_args!("{value:?}"));
    }

    fn write_fmt_infallible(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a Vec cannot fail.
        let _ = self.write_fmt(args);
    }

    /// Write `text`, following every embedded newline with the indentation
    /// for `depth` so continuation lines stay inside their attribute.
    pub fn write_reindented(&mut self, text: &[u8], depth: usize) {
        let mut lines = text.split(|b| *b == b'\n');
        if let Some(first) = lines.next() {
            self.bytes.extend_from_slice(first);
        }
        for line in lines {
            self.bytes.push(b'\n');
            self.write_indent(depth);
            self.bytes.extend_from_slice(line);
        }
    }

    /// Write `text` wrapped in `color` and a reset, or bare when colors are
    /// disabled.
    pub fn write_colored(&mut self, color: &str, text: &str, colors: bool) {
        if colors && !color.is_empty() {
            self.write_str(color);
            self.write_str(text);
            self.write_str(crate::color::RESET);
        } else {
            self.write_str(text);
        }
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.bytes.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer { bytes }
    }
}

/// Size-tiered free list of [`Buffer`]s shared by every renderer.
#[derive(Debug)]
pub struct BufferPool {
    initial_capacity: usize,
    free: Mutex<Vec<Buffer>>,
}

static LARGE_POOL: BufferPool = BufferPool::new(LARGE_CAPACITY);
static SMALL_POOL: BufferPool = BufferPool::new(SMALL_CAPACITY);

impl BufferPool {
    pub const fn new(initial_capacity: usize) -> Self {
        BufferPool {
            initial_capacity,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Pool for per-record scratch buffers.
    pub fn large() -> &'static BufferPool {
        &LARGE_POOL
    }

    /// Pool for transient value stringification.
    pub fn small() -> &'static BufferPool {
        &SMALL_POOL
    }

    pub fn acquire(&self) -> PooledBuffer<'_> {
        let reused = match self.free.lock() {
            Ok(mut free) => free.pop(),
            Err(_) => None,
        };
        let mut buf = reused.unwrap_or_else(|| Buffer::with_capacity(self.initial_capacity));
        buf.clear();
        PooledBuffer {
            buf,
            pool: self,
        }
    }

    fn release(&self, buf: Buffer) {
        if buf.capacity() > self.initial_capacity * POOL_CEILING_FACTOR {
            return;
        }
        if let Ok(mut free) = self.free.lock() {
            free.push(buf);
        }
    }

    #[cfg(test)]
    fn idle(&self) -> usize {
        self.free.lock().map(|free| free.len()).unwrap_or(0)
    }
}

/// A [`Buffer`] on loan from a [`BufferPool`]; returned to it on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: Buffer,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Buffer {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer) -> &str {
        std::str::from_utf8(buf.as_bytes()).unwrap()
    }

    #[test]
    fn padded_fields_keep_their_width() {
        let mut buf = Buffer::new();
        buf.write_padded(2, 3);
        buf.write_byte(b':');
        buf.write_padded(2, 7);
        buf.write_byte(b':');
        buf.write_padded(2, 9);
        buf.write_byte(b' ');
        buf.write_padded(4, 45);
        buf.write_byte(b' ');
        buf.write_padded(2, 0);
        buf.write_byte(b' ');
        buf.write_padded(2, 12345);
        assert_eq!(text(&buf), "03:07:09 0045 00 12345");
    }

    #[test]
    fn integers() {
        let mut buf = Buffer::new();
        buf.write_int(-42);
        buf.write_byte(b' ');
        buf.write_int(i64::MIN);
        buf.write_byte(b' ');
        buf.write_uint(0);
        buf.write_byte(b' ');
        buf.write_uint(u64::MAX);
        assert_eq!(
            text(&buf),
            "-42 -9223372036854775808 0 18446744073709551615"
        );
    }

    #[test]
    fn indent_counts_depth_zero_as_one_unit() {
        let mut buf = Buffer::new();
        buf.write_indent(0);
        assert_eq!(text(&buf), "  ");
        buf.clear();
        buf.write_indent(2);
        assert_eq!(text(&buf), "      ");
    }

    #[test]
    fn display_and_debug_forms() {
        let mut buf = Buffer::new();
        buf.write_display(&1.5);
        buf.write_byte(b' ');
        buf.write_debug(&std::time::Duration::from_millis(1500));
        buf.write_byte(b' ');
        buf.write_debug("q");
        assert_eq!(text(&buf), "1.5 1.5s \"q\"");
    }

    #[test]
    fn reindent_continuation_lines() {
        let mut buf = Buffer::new();
        buf.write_reindented(b"first\nsecond\nthird", 1);
        assert_eq!(text(&buf), "first\n    second\n    third");
    }

    #[test]
    fn append_copies_source() {
        let mut a = Buffer::new();
        a.write_str("abc");
        let mut b = Buffer::new();
        b.write_str("x");
        b.append(&a);
        a.write_str("def");
        assert_eq!(text(&b), "xabc");
        assert_eq!(a.to_vec(), b"abcdef".to_vec());
    }

    #[test]
    fn pool_reuses_and_drops_oversized() {
        let pool = BufferPool::new(8);
        {
            let mut buf = pool.acquire();
            buf.write_str("hello");
        }
        assert_eq!(pool.idle(), 1);
        {
            let buf = pool.acquire();
            assert!(buf.is_empty());
            assert_eq!(pool.idle(), 0);
        }
        {
            let mut buf = pool.acquire();
            buf.write_bytes(&[b'x'; 8 * POOL_CEILING_FACTOR + 1]);
        }
        assert_eq!(pool.idle(), 0);
    }
}
