//! Deck assembly from screenshot files

use crate::deck::{write_deck, Deck, Slide, SlideImage, DEFAULT_TITLE};
use crate::error::{DeckError, Result};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

/// Summary of an assembled deck written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDeck {
    /// Where the package was written
    pub path: PathBuf,
    /// Number of content slides
    pub slide_count: usize,
    /// 1-based indices of slides whose image file was missing
    pub missing: Vec<usize>,
}

/// Builds decks from ordered screenshot paths
#[derive(Debug, Clone)]
pub struct DeckAssembler {
    title: String,
}

impl Default for DeckAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl DeckAssembler {
    /// Create an assembler with a custom title slide heading
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self { title: title.into() }
    }

    /// Build the in-memory deck.
    ///
    /// A path that does not exist yields a label-only slide and an error log
    /// line; any other read failure is returned.
    pub fn build<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Deck> {
        let mut slides = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let image = if path.exists() {
                Some(SlideImage::from_bytes(std::fs::read(path)?))
            } else {
                error!("Screenshot not found: {}", path.display());
                None
            };
            slides.push(Slide {
                label: format!("Slide {}", i + 1),
                image,
            });
        }
        Ok(Deck::new(self.title.clone(), slides))
    }

    /// Build and serialize to bytes
    pub fn to_bytes<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<u8>> {
        let deck = self.build(paths)?;
        Ok(write_deck(&deck, Cursor::new(Vec::new()))?.into_inner())
    }

    /// Build and write the deck to `output`, creating parent directories
    #[instrument(skip(self, paths), fields(slides = paths.len()))]
    pub fn assemble<P: AsRef<Path>>(&self, paths: &[P], output: &Path) -> Result<AssembledDeck> {
        if output.file_name().is_none() {
            return Err(DeckError::InvalidOutput(output.display().to_string()).into());
        }

        let deck = self.build(paths)?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(output)?);
        let mut writer = write_deck(&deck, writer)?;
        std::io::Write::flush(&mut writer)?;

        let missing = deck
            .slides
            .iter()
            .enumerate()
            .filter(|(_, s)| s.image.is_none())
            .map(|(i, _)| i + 1)
            .collect();

        info!("Presentation saved to {}", output.display());
        Ok(AssembledDeck {
            path: output.to_path_buf(),
            slide_count: deck.content_slide_count(),
            missing,
        })
    }
}
