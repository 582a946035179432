use std::io::{ErrorKind, Read};

/// Sequential little-endian reader with a sticky fault flag.
///
/// The first short read or IO error latches the fault and every read from
/// then on returns zero-filled data without touching the source again.
/// Callers check [`Reader::fault`] once per parsing phase instead of after
/// every field.
pub struct Reader<R> {
    src: R,
    fault: bool,
}

impl<R: Read> Reader<R> {
    pub fn new(src: R) -> Self {
        Reader { src, fault: false }
    }

    #[inline]
    pub fn fault(&self) -> bool {
        self.fault
    }

    fn fill(&mut self, buf: &mut [u8]) {
        if !self.fault {
            let mut done = 0;
            while done < buf.len() {
                match self.src.read(&mut buf[done..]) {
                    Ok(0) => {
                        self.fault = true;
                        break;
                    }
                    Ok(got) => done += got,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(_) => {
                        self.fault = true;
                        break;
                    }
                }
            }
            if !self.fault {
                return;
            }
        }
        buf.fill(0);
    }

    pub fn u16(&mut self) -> u16 {
        let mut buf = [0; 2];
        self.fill(&mut buf);
        u16::from_le_bytes(buf)
    }

    pub fn u32(&mut self) -> u32 {
        let mut buf = [0; 4];
        self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    pub fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0; N];
        self.fill(&mut buf);
        buf
    }

    pub fn read_into(&mut self, buf: &mut [u8]) {
        self.fill(buf);
    }

    /// Discards `count` bytes.
    pub fn skip(&mut self, count: u32) {
        let mut scratch = [0; 4096];
        let mut left = count as usize;
        while left > 0 && !self.fault {
            let step = left.min(scratch.len());
            self.fill(&mut scratch[..step]);
            left -= step;
        }
    }
}
