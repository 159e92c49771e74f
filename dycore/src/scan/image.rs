//! Symbol tables of binary images
//!
//! An [`ImageReader`] turns the bytes of an image into the list of publicly
//! exported, section-defined symbols and the target architecture. Parsing of
//! object file formats lives outside of this crate; [`NmListingReader`] reads
//! the textual listing produced by `nm`.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumString};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIs, EnumString, Serialize,
    Deserialize,
)]
pub enum Architecture {
    #[strum(to_string = "x86_64", serialize = "x86-64", serialize = "amd64")]
    X86_64,
    #[strum(to_string = "arm64", serialize = "aarch64", serialize = "arm64e")]
    Arm64,
    #[strum(to_string = "i386", serialize = "x86")]
    I386,
    #[strum(to_string = "arm", serialize = "armv7")]
    Arm,
    #[default]
    #[strum(to_string = "unknown")]
    Unknown,
}

impl Architecture {
    /// Parse an architecture name, falling back to [`Architecture::Unknown`].
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or(Architecture::Unknown)
    }

    pub fn is_64_bit(&self) -> bool {
        matches!(self, Architecture::X86_64 | Architecture::Arm64)
    }

    /// Width of a machine pointer in bytes.
    pub fn pointer_size(&self) -> usize {
        if self.is_64_bit() { 8 } else { 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub offset: u64,
}

impl SymbolEntry {
    pub fn new(name: impl Into<String>, offset: u64) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// Exported symbols of an image in symbol table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolImage {
    pub architecture: Architecture,
    pub symbols: Vec<SymbolEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum ImageError {
    #[error("image is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub trait ImageReader {
    fn read(&self, bytes: &[u8]) -> Result<SymbolImage, ImageError>;
}

impl<T: ImageReader + ?Sized> ImageReader for &T {
    fn read(&self, bytes: &[u8]) -> Result<SymbolImage, ImageError> {
        (**self).read(bytes)
    }
}

/// Section letters of `nm` for symbols defined in text, data, bss or any
/// other section. Lowercase letters mark local symbols and are never kept.
const SECTION_DEFINED: [char; 4] = ['T', 'D', 'B', 'S'];

/// Reader for `nm` listings: one `<hex offset> <type> <name>` line per symbol.
///
/// Undefined symbols (no offset) and local symbols are dropped. For universal
/// binaries only the first `(for architecture <arch>):` slice is read and its
/// header decides the architecture.
#[derive(Debug, Clone, Default)]
pub struct NmListingReader {
    architecture: Architecture,
}

impl NmListingReader {
    pub fn new(architecture: Architecture) -> Self {
        Self { architecture }
    }

    fn slice_architecture(line: &str) -> Option<Architecture> {
        let (_, rest) = line.split_once("(for architecture ")?;
        let name = rest.strip_suffix("):")?;
        Some(Architecture::from_name(name))
    }

    fn parse_line(line: &str, index: usize) -> Result<Option<SymbolEntry>, ImageError> {
        let mut fields = line.split_whitespace();
        let (Some(offset), Some(kind), Some(name)) = (fields.next(), fields.next(), fields.next())
        else {
            return Ok(None);
        };

        let mut kind_chars = kind.chars();
        let (Some(kind), None) = (kind_chars.next(), kind_chars.next()) else {
            return Err(ImageError::Malformed {
                line: index + 1,
                reason: format!("expected a single symbol type letter, got `{}`", kind),
            });
        };
        if !SECTION_DEFINED.contains(&kind) {
            return Ok(None);
        }

        let offset = u64::from_str_radix(offset, 16).map_err(|err| ImageError::Malformed {
            line: index + 1,
            reason: format!("invalid offset `{}`: {}", offset, err),
        })?;
        Ok(Some(SymbolEntry::new(name, offset)))
    }
}

impl ImageReader for NmListingReader {
    fn read(&self, bytes: &[u8]) -> Result<SymbolImage, ImageError> {
        let text = std::str::from_utf8(bytes)?;
        let mut image = SymbolImage {
            architecture: self.architecture,
            symbols: Vec::new(),
        };

        let mut in_slice = false;
        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if let Some(architecture) = Self::slice_architecture(line) {
                if in_slice {
                    break;
                }
                in_slice = true;
                image.architecture = architecture;
                continue;
            }
            if let Some(symbol) = Self::parse_line(line, index)? {
                image.symbols.push(symbol);
            }
        }

        Ok(image)
    }
}
