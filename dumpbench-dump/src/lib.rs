#![warn(missing_docs)]
//! Crash dump reader
//!
//! Opens a crash dump artifact and recovers the pointer width of the process
//! that produced it. Two formats are recognized: ELF core files and Windows
//! minidumps. Only the headers needed for the width are parsed; dump files
//! can be huge and nothing else in them matters here.

mod elf;
mod minidump;

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

/// Errors raised while loading a dump.
///
/// Dump files are static artifacts; none of these conditions can change
/// within a single invocation, so callers never retry.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The dump file does not exist.
    #[error("dump file not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file ended before a required header structure.
    #[error("dump file is truncated")]
    Truncated,

    /// The file is not a recognized dump format.
    #[error("unrecognized dump format: {reason}")]
    UnsupportedFormat {
        /// What was wrong with the header.
        reason: String,
    },

    /// The dump was captured on a processor architecture with no known
    /// pointer width.
    #[error("dump captured on unsupported processor architecture (code {code})")]
    UnsupportedArchitecture {
        /// Raw minidump processor architecture code.
        code: u16,
    },

    /// The file could not be read.
    #[error("failed to read dump file")]
    Io(#[from] std::io::Error),
}

/// Options controlling how the dump file is accessed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheOptions {
    /// When set, read the dump through a memory mapping instead of plain
    /// file reads. Behavior is identical; only the access path differs.
    pub use_os_memory_features: bool,
}

/// Recognized dump formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// ELF core file (Linux crash dumps).
    ElfCore,
    /// Windows minidump.
    Minidump,
}

/// File access used while parsing headers. Mapped when the caller asked for
/// OS memory features, seek-and-read otherwise.
enum Backing {
    Mapped(Mmap),
    Seek(File),
}

impl Backing {
    /// Read exactly `buf.len()` bytes at `offset`. A short file is reported
    /// as [`DumpError::Truncated`].
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), DumpError> {
        match self {
            Backing::Mapped(map) => {
                let start = usize::try_from(offset).map_err(|_| DumpError::Truncated)?;
                let end = start.checked_add(buf.len()).ok_or(DumpError::Truncated)?;
                let slice = map.get(start..end).ok_or(DumpError::Truncated)?;
                buf.copy_from_slice(slice);
                Ok(())
            }
            Backing::Seek(file) => {
                file.seek(SeekFrom::Start(offset))?;
                file.read_exact(buf).map_err(|e| {
                    if e.kind() == ErrorKind::UnexpectedEof {
                        DumpError::Truncated
                    } else {
                        DumpError::Io(e)
                    }
                })
            }
        }
    }
}

/// A loaded crash dump.
#[derive(Debug, Clone, Copy)]
pub struct Dump {
    format: DumpFormat,
    pointer_size: u8,
}

impl Dump {
    /// Open the dump at `path` and parse enough of it to know the captured
    /// process's pointer width.
    ///
    /// Loading is itself a validation step: a missing, truncated, or
    /// unrecognizable file fails here, not later in the run.
    pub fn load(path: impl AsRef<Path>, options: &CacheOptions) -> Result<Self, DumpError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                DumpError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DumpError::Io(e)
            }
        })?;

        let mut backing = if options.use_os_memory_features {
            // The mapping is read-only and the artifact is static; nothing
            // else writes to it while we hold the map.
            Backing::Mapped(unsafe { Mmap::map(&file)? })
        } else {
            Backing::Seek(file)
        };

        let mut magic = [0u8; 4];
        backing.read_at(0, &mut magic)?;

        let (format, pointer_size) = if magic == elf::MAGIC {
            (DumpFormat::ElfCore, elf::pointer_size(&mut backing)?)
        } else if magic == minidump::MAGIC {
            (DumpFormat::Minidump, minidump::pointer_size(&mut backing)?)
        } else {
            return Err(DumpError::UnsupportedFormat {
                reason: format!("unknown magic {magic:02x?}"),
            });
        };

        tracing::debug!(?format, pointer_size, path = %path.display(), "dump loaded");
        Ok(Self {
            format,
            pointer_size,
        })
    }

    /// The detected dump format.
    pub fn format(&self) -> DumpFormat {
        self.format
    }

    /// Pointer size in bytes of the captured process.
    pub fn pointer_size(&self) -> u8 {
        self.pointer_size
    }
}

/// Build a seek-backed [`Backing`] over raw bytes for header parser tests.
#[cfg(test)]
pub(crate) fn tests_backing(bytes: &[u8]) -> Backing {
    use std::io::Write;
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    Backing::Seek(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dump(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn load_both_ways(bytes: &[u8]) -> (Result<Dump, DumpError>, Result<Dump, DumpError>) {
        let file = write_dump(bytes);
        let plain = Dump::load(
            file.path(),
            &CacheOptions {
                use_os_memory_features: false,
            },
        );
        let mapped = Dump::load(
            file.path(),
            &CacheOptions {
                use_os_memory_features: true,
            },
        );
        (plain, mapped)
    }

    #[test]
    fn elf_core_64bit() {
        let (plain, mapped) = load_both_ways(&elf::tests::core_header(2, true));
        for dump in [plain.unwrap(), mapped.unwrap()] {
            assert_eq!(dump.format(), DumpFormat::ElfCore);
            assert_eq!(dump.pointer_size(), 8);
        }
    }

    #[test]
    fn elf_core_32bit() {
        let (plain, _) = load_both_ways(&elf::tests::core_header(1, true));
        assert_eq!(plain.unwrap().pointer_size(), 4);
    }

    #[test]
    fn elf_non_core_is_rejected() {
        let (plain, _) = load_both_ways(&elf::tests::core_header(2, false));
        assert!(matches!(plain, Err(DumpError::UnsupportedFormat { .. })));
    }

    #[test]
    fn minidump_amd64() {
        let (plain, mapped) = load_both_ways(&minidump::tests::minidump_bytes(9));
        for dump in [plain.unwrap(), mapped.unwrap()] {
            assert_eq!(dump.format(), DumpFormat::Minidump);
            assert_eq!(dump.pointer_size(), 8);
        }
    }

    #[test]
    fn minidump_x86() {
        let (plain, _) = load_both_ways(&minidump::tests::minidump_bytes(0));
        assert_eq!(plain.unwrap().pointer_size(), 4);
    }

    #[test]
    fn minidump_unknown_architecture() {
        let (plain, _) = load_both_ways(&minidump::tests::minidump_bytes(0xFFFF));
        assert!(matches!(
            plain,
            Err(DumpError::UnsupportedArchitecture { code: 0xFFFF })
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Dump::load("/no/such/dump.dmp", &CacheOptions::default()).unwrap_err();
        assert!(matches!(err, DumpError::NotFound { .. }));
    }

    #[test]
    fn truncated_file_is_reported() {
        let (plain, mapped) = load_both_ways(&elf::tests::core_header(2, true)[..10]);
        assert!(matches!(plain, Err(DumpError::Truncated)));
        assert!(matches!(mapped, Err(DumpError::Truncated)));
    }

    #[test]
    fn garbage_magic_is_unsupported() {
        let (plain, _) = load_both_ways(b"NOPEnope");
        assert!(matches!(plain, Err(DumpError::UnsupportedFormat { .. })));
    }
}
