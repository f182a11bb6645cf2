//! Compression parameters and their validation.

use crate::config::ParameterDomain;
use crate::error::{Error, Result};

/// Tells the encoder what kind of data it is compressing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Generic,
    /// UTF-8 formatted text.
    Text,
    /// WOFF 2.0 font data.
    Font,
}

impl Mode {
    /// Returns the numeric value used at the C boundary.
    pub fn as_raw(self) -> i32 {
        match self {
            Mode::Generic => 0,
            Mode::Text => 1,
            Mode::Font => 2,
        }
    }
}

impl TryFrom<i32> for Mode {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(Mode::Generic),
            1 => Ok(Mode::Text),
            2 => Ok(Mode::Font),
            _ => Err(Error::InvalidParameter {
                param: "mode",
                value: raw as i64,
                expected: String::from("0 (generic), 1 (text) or 2 (font)"),
            }),
        }
    }
}

/// The settings of a single compression call. The values are checked against
/// a 'ParameterDomain' before the codec sees them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompressionParameters {
    mode: Mode,
    quality: i32,
    window_bits: i32,
    block_bits: i32,
}

impl Default for CompressionParameters {
    fn default() -> Self {
        Self {
            mode: Mode::Generic,
            quality: 11,
            window_bits: 22,
            block_bits: 0,
        }
    }
}

impl CompressionParameters {
    pub fn new(
        mode: Mode,
        quality: i32,
        window_bits: i32,
        block_bits: i32,
    ) -> Self {
        Self {
            mode,
            quality,
            window_bits,
            block_bits,
        }
    }

    /// Returns a copy with the mode replaced.
    pub fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }

    /// Returns a copy with the quality replaced.
    pub fn with_quality(self, quality: i32) -> Self {
        Self { quality, ..self }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn window_bits(&self) -> i32 {
        self.window_bits
    }

    pub fn block_bits(&self) -> i32 {
        self.block_bits
    }

    /// Check every field against 'domain' and report the first one that is
    /// out of range.
    pub fn validate(&self, domain: &ParameterDomain) -> Result<()> {
        if !domain.quality.contains(self.quality as i64) {
            return Err(Error::InvalidParameter {
                param: "quality",
                value: self.quality as i64,
                expected: format!("a value in {}", domain.quality),
            });
        }
        if !domain.window_bits.contains(self.window_bits as i64) {
            return Err(Error::InvalidParameter {
                param: "window bits",
                value: self.window_bits as i64,
                expected: format!("a value in {}", domain.window_bits),
            });
        }
        if self.block_bits != 0
            && !domain.block_bits.contains(self.block_bits as i64)
        {
            return Err(Error::InvalidParameter {
                param: "block bits",
                value: self.block_bits as i64,
                expected: format!("0 or a value in {}", domain.block_bits),
            });
        }
        Ok(())
    }
}
