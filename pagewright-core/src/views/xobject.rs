use super::StreamKind;
use crate::error::{PdfError, Result, StructureError};
use crate::objects::{Dictionary, Object, Stream};

/// An external object stream (`/Type /XObject`): an image or a form.
#[derive(Debug, Clone, Copy)]
pub struct XObject<'a> {
    stream: &'a Stream,
}

impl<'a> XObject<'a> {
    pub fn new(stream: &'a Stream) -> Self {
        Self { stream }
    }

    /// Builds an 8-bit image XObject stream, run-length encoded on output.
    pub fn image_stream(width: u32, height: u32, color_space: &str, samples: Vec<u8>) -> Stream {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("XObject"));
        dict.set("Subtype", Object::name("Image"));
        dict.set("Width", width);
        dict.set("Height", height);
        dict.set("ColorSpace", Object::name(color_space));
        dict.set("BitsPerComponent", 8);
        let mut stream = Stream::new(dict, samples);
        stream.set_filter("RunLengthDecode");
        stream.set_kind(StreamKind::XObject);
        stream
    }

    pub fn stream(&self) -> &'a Stream {
        self.stream
    }

    pub fn subtype(&self) -> std::result::Result<&'a str, StructureError> {
        match self.stream.dictionary().get("Subtype") {
            Some(Object::Name(name)) => Ok(name),
            Some(_) => Err(StructureError::wrong_kind("Subtype", "a name")),
            None => Err(StructureError::missing("Subtype")),
        }
    }

    pub fn is_image(&self) -> bool {
        self.subtype() == Ok("Image")
    }

    pub fn width(&self) -> Option<i64> {
        self.stream.dictionary().get_integer("Width")
    }

    pub fn height(&self) -> Option<i64> {
        self.stream.dictionary().get_integer("Height")
    }

    /// Decoded sample data.
    pub fn data(&self) -> &'a [u8] {
        self.stream.data()
    }
}

/// Layout of a pixel buffer, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Color space of the color channels, alpha excluded.
    pub fn color_space(&self) -> &'static str {
        match self {
            PixelFormat::Gray8 => "DeviceGray",
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => "DeviceRGB",
        }
    }
}

/// Decoded pixels ready to be stored as an image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Fails unless `pixels` holds exactly `width * height` pixels of `format`.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or_else(|| PdfError::InvalidImage(format!("{width}x{height} is too large")))?;
        if width == 0 || height == 0 {
            return Err(PdfError::InvalidImage(format!(
                "{width}x{height} has no pixels"
            )));
        }
        if pixels.len() != expected {
            return Err(PdfError::InvalidImage(format!(
                "expected {expected} bytes for {width}x{height} {format:?}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Separates color samples from alpha. The alpha plane is only returned
    /// when some pixel is not fully opaque.
    pub fn split_alpha(self) -> (Vec<u8>, Option<Vec<u8>>) {
        if self.format != PixelFormat::Rgba8 {
            return (self.pixels, None);
        }
        let count = self.pixels.len() / 4;
        let mut color = Vec::with_capacity(count * 3);
        let mut alpha = Vec::with_capacity(count);
        for pixel in self.pixels.chunks_exact(4) {
            color.extend_from_slice(&pixel[..3]);
            alpha.push(pixel[3]);
        }
        let translucent = alpha.iter().any(|&a| a != u8::MAX);
        (color, translucent.then_some(alpha))
    }
}
