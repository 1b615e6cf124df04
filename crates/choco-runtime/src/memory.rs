//! Linear memory

use crate::error::Trap;

pub const PAGE_SIZE: usize = 64 * 1024;

/// Byte-addressed little-endian memory
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new(pages: u32) -> Self {
        Self {
            bytes: vec![0; pages as usize * PAGE_SIZE],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn range(&self, address: i32, offset: u32) -> Result<std::ops::Range<usize>, Trap> {
        // Addresses are unsigned on the wire
        let start = u64::from(address as u32) + u64::from(offset);
        let end = start + 4;
        if end > self.bytes.len() as u64 {
            return Err(Trap::MemoryOutOfBounds { address: start });
        }
        Ok(start as usize..end as usize)
    }

    pub fn load(&self, address: i32, offset: u32) -> Result<i32, Trap> {
        let range = self.range(address, offset)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[range]);
        Ok(i32::from_le_bytes(word))
    }

    pub fn store(&mut self, address: i32, offset: u32, value: i32) -> Result<(), Trap> {
        let range = self.range(address, offset)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}
