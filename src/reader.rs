use std::{
    fs::File,
    io::{self, ErrorKind},
    sync::Arc,
};

/// A byte source that can be read at arbitrary offsets without a shared
/// cursor.
///
/// Implementations must allow concurrent calls from several threads, since
/// random-access decoding reads grid points independently and performs no
/// locking around the source.
pub trait PositionedRead: Send + Sync {
    /// Reads exactly `buf.len()` bytes starting at `offset`.
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()>;

    /// Returns the total length of the source if it is known.
    fn len(&self) -> Option<u64> {
        None
    }
}

fn read_exact_from_slice(slice: &[u8], buf: &mut [u8], offset: u64) -> io::Result<()> {
    let start = usize::try_from(offset).map_err(|_| io::Error::from(ErrorKind::UnexpectedEof))?;
    let end = start
        .checked_add(buf.len())
        .filter(|end| *end <= slice.len())
        .ok_or_else(|| io::Error::from(ErrorKind::UnexpectedEof))?;
    buf.copy_from_slice(&slice[start..end]);
    Ok(())
}

impl PositionedRead for [u8] {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        read_exact_from_slice(self, buf, offset)
    }

    fn len(&self) -> Option<u64> {
        Some(<[u8]>::len(self) as u64)
    }
}

impl PositionedRead for Vec<u8> {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        read_exact_from_slice(self, buf, offset)
    }

    fn len(&self) -> Option<u64> {
        Some(Vec::len(self) as u64)
    }
}

impl PositionedRead for Box<[u8]> {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        read_exact_from_slice(self, buf, offset)
    }

    fn len(&self) -> Option<u64> {
        Some(<[u8]>::len(self) as u64)
    }
}

#[cfg(any(unix, windows))]
impl PositionedRead for File {
    #[cfg(unix)]
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        std::os::unix::fs::FileExt::read_exact_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_exact_at(&self, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
        use std::os::windows::fs::FileExt;

        while !buf.is_empty() {
            match self.seek_read(buf, offset) {
                Ok(0) => return Err(io::Error::from(ErrorKind::UnexpectedEof)),
                Ok(n) => {
                    buf = &mut buf[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        self.metadata().ok().map(|m| m.len())
    }
}

impl<R: PositionedRead + ?Sized> PositionedRead for &R {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        (**self).read_exact_at(buf, offset)
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}

impl<R: PositionedRead + ?Sized> PositionedRead for Arc<R> {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        (**self).read_exact_at(buf, offset)
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}

/// The `[start, end)` window of an underlying source, addressed from 0.
///
/// Reads that would cross the end of the window fail with
/// [`ErrorKind::UnexpectedEof`] even if the underlying source has more data.
#[derive(Debug, Clone)]
pub struct SectionReader<R> {
    inner: R,
    start: u64,
    len: u64,
}

impl<R> SectionReader<R> {
    pub fn new(inner: R, start: u64, end: u64) -> Self {
        Self {
            inner,
            start,
            len: end.saturating_sub(start),
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: PositionedRead> PositionedRead for SectionReader<R> {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        let in_window = offset
            .checked_add(buf.len() as u64)
            .is_some_and(|end| end <= self.len);
        if !in_window {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "{} bytes at offset {offset} exceed the section of {} bytes",
                    buf.len(),
                    self.len
                ),
            ));
        }
        self.inner.read_exact_at(buf, self.start + offset)
    }

    fn len(&self) -> Option<u64> {
        Some(self.len)
    }
}
