//! Windows minidump header parsing.
//!
//! Walks the stream directory to the SystemInfo stream and maps its
//! processor architecture code onto a pointer width. All header fields are
//! little-endian regardless of the capturing host.

use crate::{Backing, DumpError};

/// Minidump signature bytes ("MDMP").
pub(crate) const MAGIC: [u8; 4] = *b"MDMP";

const STREAM_SYSTEM_INFO: u32 = 7;
const DIRECTORY_ENTRY_SIZE: u64 = 12;

/// Upper bound on plausible stream counts; past this the header is garbage.
const MAX_STREAMS: u32 = 4096;

// MINIDUMP_SYSTEM_INFO processor architecture codes.
const ARCH_INTEL: u16 = 0;
const ARCH_ARM: u16 = 5;
const ARCH_IA64: u16 = 6;
const ARCH_AMD64: u16 = 9;
const ARCH_ARM64: u16 = 12;

fn read_u32(backing: &mut Backing, offset: u64) -> Result<u32, DumpError> {
    let mut buf = [0u8; 4];
    backing.read_at(offset, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u16(backing: &mut Backing, offset: u64) -> Result<u16, DumpError> {
    let mut buf = [0u8; 2];
    backing.read_at(offset, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Pointer size in bytes of the process captured in a minidump.
pub(crate) fn pointer_size(backing: &mut Backing) -> Result<u8, DumpError> {
    // MINIDUMP_HEADER: signature, version, NumberOfStreams, StreamDirectoryRva.
    let stream_count = read_u32(backing, 8)?;
    let directory_rva = u64::from(read_u32(backing, 12)?);

    if stream_count > MAX_STREAMS {
        return Err(DumpError::UnsupportedFormat {
            reason: format!("implausible minidump stream count {stream_count}"),
        });
    }

    for index in 0..u64::from(stream_count) {
        let entry = directory_rva + index * DIRECTORY_ENTRY_SIZE;
        let stream_type = read_u32(backing, entry)?;
        if stream_type != STREAM_SYSTEM_INFO {
            continue;
        }
        let rva = u64::from(read_u32(backing, entry + 8)?);
        // MINIDUMP_SYSTEM_INFO starts with ProcessorArchitecture.
        let arch = read_u16(backing, rva)?;
        return match arch {
            ARCH_INTEL | ARCH_ARM => Ok(4),
            ARCH_AMD64 | ARCH_ARM64 | ARCH_IA64 => Ok(8),
            code => Err(DumpError::UnsupportedArchitecture { code }),
        };
    }

    Err(DumpError::UnsupportedFormat {
        reason: "minidump has no SystemInfo stream".to_string(),
    })
}
