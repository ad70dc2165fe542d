//! Slide deck model and `.pptx` output
//!
//! A [`Deck`] is one title slide followed by image slides, in input order.
//! [`DeckAssembler`] builds it from screenshot files; [`pptx`] serializes it.

pub mod assembler;
pub mod pptx;

pub use assembler::{AssembledDeck, DeckAssembler};
pub use pptx::{write_deck, PPTX_MIME_TYPE};

use image::ImageFormat;

/// Default title slide text
pub const DEFAULT_TITLE: &str = "Web Screenshots Presentation";

/// An ordered slide deck, ready to serialize
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    /// Title slide heading
    pub title: String,
    /// Title slide subtitle
    pub subtitle: String,
    /// Content slides, in presentation order
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create a deck with the standard subtitle for its slide count
    pub fn new<S: Into<String>>(title: S, slides: Vec<Slide>) -> Self {
        Self {
            title: title.into(),
            subtitle: format!("Generated with {} slides", slides.len()),
            slides,
        }
    }

    /// Number of content slides (the title slide is not counted)
    pub fn content_slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Iterator over embedded images, with their 1-based slide index
    pub fn images(&self) -> impl Iterator<Item = (usize, &SlideImage)> {
        self.slides
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.image.as_ref().map(|img| (i + 1, img)))
    }
}

/// One content slide
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// Text shown in the label box
    pub label: String,
    /// Picture, absent when the source file was missing
    pub image: Option<SlideImage>,
}

/// Raw image bytes plus their sniffed format
#[derive(Debug, Clone, PartialEq)]
pub struct SlideImage {
    /// Encoded file contents, embedded verbatim
    pub data: Vec<u8>,
    /// Media kind used for the part name and content type
    pub kind: ImageKind,
}

impl SlideImage {
    /// Wrap bytes, sniffing the format from their magic number
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let kind = ImageKind::sniff(&data);
        Self { data, kind }
    }
}

/// Image media types a presentation part can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKind {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
    /// BMP
    Bmp,
    /// TIFF
    Tiff,
    /// WebP
    Webp,
}

impl ImageKind {
    /// Guess from file contents; anything unrecognised is treated as PNG
    pub fn sniff(data: &[u8]) -> Self {
        match image::guess_format(data) {
            Ok(ImageFormat::Jpeg) => ImageKind::Jpeg,
            Ok(ImageFormat::Gif) => ImageKind::Gif,
            Ok(ImageFormat::Bmp) => ImageKind::Bmp,
            Ok(ImageFormat::Tiff) => ImageKind::Tiff,
            Ok(ImageFormat::WebP) => ImageKind::Webp,
            _ => ImageKind::Png,
        }
    }

    /// File extension for the media part
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Tiff => "tiff",
            ImageKind::Webp => "webp",
        }
    }

    /// MIME type for `[Content_Types].xml`
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
            ImageKind::Webp => "image/webp",
        }
    }
}
