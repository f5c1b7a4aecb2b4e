//! Image and reference corpus types.

use image::{imageops, DynamicImage, GrayImage, RgbImage};

use crate::error::{Error, Result};

/// An RGB image with the identifier it is known by.
///
/// For reference flags the identifier is the flag name, for queries it is
/// the path the image was loaded from.
#[derive(Debug, Clone)]
pub struct FlagImage {
    /// Flag name or query path.
    pub id: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded RGB samples.
    pub pixels: RgbImage,
}

impl FlagImage {
    /// Creates a flag image from any decoded image, converting to RGB.
    #[must_use]
    pub fn new(id: impl Into<String>, image: &DynamicImage) -> Self {
        Self::from_rgb(id, image.to_rgb8())
    }

    /// Creates a flag image from RGB samples.
    #[must_use]
    pub fn from_rgb(id: impl Into<String>, pixels: RgbImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            id: id.into(),
            width,
            height,
            pixels,
        }
    }

    /// Total number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns true if the image has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Grayscale copy of the image.
    #[must_use]
    pub fn to_luma8(&self) -> GrayImage {
        imageops::grayscale(&self.pixels)
    }

    /// Crops to the upper-left quadrant: rows `0..height/2`, cols `0..width/2`.
    ///
    /// The identifier is kept, so a cropped reference still answers to its flag name.
    #[must_use]
    pub fn upper_left_quadrant(&self) -> Self {
        let quadrant = imageops::crop_imm(&self.pixels, 0, 0, self.width / 2, self.height / 2);
        Self::from_rgb(self.id.clone(), quadrant.to_image())
    }
}

/// The reference flags a match engine is built from.
///
/// Identifiers are unique; insertion order is preserved and determines the
/// order of flags inside each index bucket.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    flags: Vec<FlagImage>,
}

impl ReferenceCorpus {
    /// Creates an empty corpus.
    #[must_use]
    pub const fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Builds a corpus from a list of flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlag`] if two flags share an identifier.
    pub fn from_flags(flags: impl IntoIterator<Item = FlagImage>) -> Result<Self> {
        let mut corpus = Self::new();
        for flag in flags {
            corpus.insert(flag)?;
        }
        Ok(corpus)
    }

    /// Adds a reference flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlag`] if the identifier is already present.
    pub fn insert(&mut self, flag: FlagImage) -> Result<()> {
        if self.contains(&flag.id) {
            return Err(Error::DuplicateFlag(flag.id));
        }
        self.flags.push(flag);
        Ok(())
    }

    /// Returns true if a flag with this identifier is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.flags.iter().any(|f| f.id == id)
    }

    /// Looks up a flag by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FlagImage> {
        self.flags.iter().find(|f| f.id == id)
    }

    /// Iterates flags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FlagImage> {
        self.flags.iter()
    }

    /// Number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if the corpus holds no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl IntoIterator for ReferenceCorpus {
    type Item = FlagImage;
    type IntoIter = std::vec::IntoIter<FlagImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.into_iter()
    }
}
