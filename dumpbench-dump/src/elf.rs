//! ELF core file header parsing.
//!
//! Only the identification bytes and the object type are inspected: the
//! `EI_CLASS` byte is the pointer width, and `e_type` must say `ET_CORE`.

use crate::{Backing, DumpError};

/// ELF magic bytes.
pub(crate) const MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;
const EV_CURRENT: u8 = 1;
const ET_CORE: u16 = 4;

/// Pointer size in bytes of the process captured in an ELF core file.
pub(crate) fn pointer_size(backing: &mut Backing) -> Result<u8, DumpError> {
    // e_ident (16 bytes) followed by e_type (u16) and e_machine (u16).
    let mut header = [0u8; 20];
    backing.read_at(0, &mut header)?;

    if header[6] != EV_CURRENT {
        return Err(DumpError::UnsupportedFormat {
            reason: format!("unknown ELF version {}", header[6]),
        });
    }

    let e_type = match header[5] {
        ELFDATA2LSB => u16::from_le_bytes([header[16], header[17]]),
        ELFDATA2MSB => u16::from_be_bytes([header[16], header[17]]),
        other => {
            return Err(DumpError::UnsupportedFormat {
                reason: format!("unknown ELF data encoding {other}"),
            })
        }
    };
    if e_type != ET_CORE {
        return Err(DumpError::UnsupportedFormat {
            reason: format!("ELF object type {e_type} is not a core file"),
        });
    }

    match header[4] {
        ELFCLASS32 => Ok(4),
        ELFCLASS64 => Ok(8),
        other => Err(DumpError::UnsupportedFormat {
            reason: format!("unknown ELF class {other}"),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal little-endian ELF header; `class` is the EI_CLASS byte and
    /// `core` controls whether e_type says ET_CORE.
    pub(crate) fn core_header(class: u8, core: bool) -> Vec<u8> {
        let mut bytes = vec![0u8; 64];
        bytes[..4].copy_from_slice(&MAGIC);
        bytes[4] = class;
        bytes[5] = ELFDATA2LSB;
        bytes[6] = EV_CURRENT;
        let e_type: u16 = if core { ET_CORE } else { 2 };
        bytes[16..18].copy_from_slice(&e_type.to_le_bytes());
        bytes[18..20].copy_from_slice(&62u16.to_le_bytes()); // EM_X86_64
        bytes
    }

    #[test]
    fn big_endian_core_is_accepted() {
        let mut bytes = core_header(ELFCLASS64, true);
        bytes[5] = ELFDATA2MSB;
        bytes[16..18].copy_from_slice(&ET_CORE.to_be_bytes());
        let mut backing = crate::tests_backing(&bytes);
        assert_eq!(pointer_size(&mut backing).unwrap(), 8);
    }

    #[test]
    fn unknown_class_is_rejected() {
        let bytes = core_header(3, true);
        let mut backing = crate::tests_backing(&bytes);
        assert!(matches!(
            pointer_size(&mut backing),
            Err(DumpError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn bad_version_is_rejected() {
        let mut bytes = core_header(ELFCLASS64, true);
        bytes[6] = 9;
        let mut backing = crate::tests_backing(&bytes);
        assert!(matches!(
            pointer_size(&mut backing),
            Err(DumpError::UnsupportedFormat { .. })
        ));
    }
}
