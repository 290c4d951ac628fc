use std::io::{self, Read, Write};

/// Working buffer for streaming payload copies.
pub const COPY_BUF_SIZE: usize = 1024 * 1024;

/// Copy exactly `len` bytes from `src` to `dst` through `buf`.
///
/// Fails with `UnexpectedEof` if the source runs dry first.
pub fn copy_exact<R, W>(src: &mut R, dst: &mut W, len: u64, buf: &mut [u8]) -> io::Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut left = len;
    while left > 0 {
        let want = buf.len().min(left as usize);
        let k = match src.read(&mut buf[..want]) {
            Ok(k) => k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if k == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended {left} bytes short of chunk end"),
            ));
        }
        dst.write_all(&buf[..k])?;
        left -= k as u64;
    }
    Ok(())
}

/// Write adapter that feeds everything passing through into a blake3 hasher.
pub struct HashingWriter<'a, W: Write> {
    inner: W,
    hasher: &'a mut blake3::Hasher,
    pub written: u64,
}

impl<'a, W: Write> HashingWriter<'a, W> {
    pub fn new(inner: W, hasher: &'a mut blake3::Hasher) -> Self {
        Self {
            inner,
            hasher,
            written: 0,
        }
    }
}

impl<'a, W: Write> Write for HashingWriter<'a, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
