//! Ingestion loop
//!
//! A [`Scanner`] walks the symbol table of an image, hands every entry point
//! to a [`SymbolDecoder`] and files the decoded declarations into a
//! [`ModuleInventory`]. Symbols that cannot be decoded are skipped and
//! recorded in the [`Diagnostics`] of the scan; the inventory stays usable.
use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use strum::EnumIs;
use thiserror::Error;

use crate::{
    decl::{Declaration, FunctionDecl},
    inventory::ModuleInventory,
    utils::{
        conf::ScanOptions,
        error::{DyError, DyResult},
    },
};

pub mod diagnostics;
pub mod image;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use image::{Architecture, ImageError, ImageReader, NmListingReader, SymbolEntry, SymbolImage};

/// Name of a language feature the decoder does not model, such as
/// `"opaque return type"`. The set is open: decoders name what they skip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnsupportedFeature(pub String);

impl UnsupportedFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum DecodeError {
    /// Recoverable: the symbol is valid but describes something not modeled.
    #[error("unsupported feature `{0}`")]
    Unsupported(UnsupportedFeature),

    #[error("malformed symbol: {reason}")]
    Malformed { reason: String },
}

pub trait SymbolDecoder {
    /// Decode one mangled name. `old_mangling` selects the older mangling
    /// scheme for the whole image.
    fn decode(
        &self,
        mangled: &str,
        old_mangling: bool,
        offset: u64,
    ) -> Result<Declaration, DecodeError>;
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for &T {
    fn decode(
        &self,
        mangled: &str,
        old_mangling: bool,
        offset: u64,
    ) -> Result<Declaration, DecodeError> {
        (**self).decode(mangled, old_mangling, offset)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub inventory: ModuleInventory,
    pub diagnostics: Diagnostics,
}

pub struct Scanner<R, D> {
    reader: R,
    decoder: D,
    options: ScanOptions,
}

impl<R: ImageReader, D: SymbolDecoder> Scanner<R, D> {
    pub fn new(reader: R, decoder: D) -> Self {
        Self::with_options(reader, decoder, ScanOptions::default())
    }

    pub fn with_options(reader: R, decoder: D, options: ScanOptions) -> Self {
        Self {
            reader,
            decoder,
            options,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan one image into a fresh inventory.
    pub fn scan(&self, bytes: &[u8], source_name: &str) -> DyResult<ScanOutcome> {
        let mut outcome = ScanOutcome::default();
        self.scan_into(&mut outcome.inventory, &mut outcome.diagnostics, bytes, source_name)?;
        Ok(outcome)
    }

    /// Scan one image, filing into an existing inventory.
    ///
    /// Returns an error only in strict mode, for an unreadable image or the
    /// first declaration the inventory rejects.
    pub fn scan_into(
        &self,
        inventory: &mut ModuleInventory,
        diagnostics: &mut Diagnostics,
        bytes: &[u8],
        source_name: &str,
    ) -> DyResult<()> {
        let image = match self.reader.read(bytes) {
            Ok(image) => image,
            Err(source) if self.options.strict => {
                return Err(DyError::ImageReadError {
                    source,
                    image: source_name.to_string(),
                });
            }
            Err(err) => {
                warn!("unable to read symbols of `{}`: {}", source_name, err);
                diagnostics.error(source_name, err.to_string());
                return Ok(());
            }
        };
        inventory.set_architecture(image.architecture);

        let old_mangling = self
            .options
            .uses_old_mangling(image.symbols.iter().map(|symbol| symbol.name.as_str()));
        if old_mangling {
            debug!("`{}` uses the older mangling scheme", source_name);
        }

        let mut filed = 0usize;
        let mut skipped = 0usize;
        for symbol in image
            .symbols
            .iter()
            .filter(|symbol| self.options.is_entry_point(&symbol.name))
        {
            let decl = match self.decoder.decode(&symbol.name, old_mangling, symbol.offset) {
                Ok(decl) => decl,
                Err(err) => {
                    warn!("skipping `{}`: {}", symbol.name, err);
                    match err {
                        DecodeError::Unsupported(_) => {
                            diagnostics.warn(&symbol.name, err.to_string())
                        }
                        DecodeError::Malformed { .. } => {
                            diagnostics.error(&symbol.name, err.to_string())
                        }
                    }
                    skipped += 1;
                    continue;
                }
            };

            if self.options.skip_privatized
                && decl.as_function().is_some_and(FunctionDecl::is_privatized)
            {
                debug!("skipping privatized `{}`", symbol.name);
                skipped += 1;
                continue;
            }

            match inventory.add(decl) {
                Ok(()) => filed += 1,
                Err(source) if self.options.strict => {
                    return Err(DyError::InventoryError {
                        source,
                        symbol: symbol.name.clone(),
                    });
                }
                Err(err) => {
                    warn!("unable to classify `{}`: {}", symbol.name, err);
                    diagnostics.error(&symbol.name, err.to_string());
                    skipped += 1;
                }
            }
        }

        info!(
            "{} ({}): {} declarations filed, {} symbols skipped out of {}",
            source_name,
            image.architecture,
            filed,
            skipped,
            image.symbols.len()
        );
        Ok(())
    }

    /// Scan independent images on scoped worker threads. Results are in the
    /// order of `images`.
    pub fn scan_many<'a>(
        &self,
        images: impl IntoIterator<Item = (&'a str, &'a [u8])>,
    ) -> Vec<DyResult<ScanOutcome>>
    where
        R: Sync,
        D: Sync,
    {
        let images: Vec<_> = images.into_iter().collect();

        crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = images
                .iter()
                .map(|&(name, bytes)| scope.spawn(move |_| self.scan(bytes, name)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        })
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
    }
}
