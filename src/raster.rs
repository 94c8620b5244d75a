use crate::error::Error;
use crate::format::SourceFormat;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
const DIB_HEADER_LEN: u32 = 40;

//===========================================================================//

/// A decoded image: a row-major RGBA pixel buffer with non-premultiplied
/// alpha, stored top to bottom.
#[derive(Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl RasterImage {
    /// Creates a new image with the given dimensions and RGBA data.
    /// `rgba_data` must have `4 * width * height` bytes, in row-major order
    /// from top to bottom.  Panics if `rgba_data` is the wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> RasterImage {
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        RasterImage { width, height, rgba_data }
    }

    /// Decodes a source image of the given format into an RGBA raster.
    /// Returns an error if the bytes are malformed or can't be decoded.
    pub fn decode(
        bytes: &[u8],
        format: SourceFormat,
    ) -> Result<RasterImage, Error> {
        let decoded = match image::load_from_memory_with_format(
            bytes,
            format.image_format(),
        ) {
            Ok(decoded) => decoded,
            Err(error) => {
                invalid_input!(
                    "failed to decode {} image: {}",
                    format.name(),
                    error
                );
            }
        };
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(RasterImage::from_rgba_data(width, height, rgba.into_raw()))
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    /// True if any pixel has an alpha value below the maximum.
    fn has_alpha(&self) -> bool {
        self.rgba_data.chunks_exact(4).any(|pixel| pixel[3] != u8::MAX)
    }

    /// Encodes the image as a PNG stream.  Fully opaque images are written
    /// as 8-bit RGB to save the alpha channel's space; all others as 8-bit
    /// RGBA.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), Error> {
        match self.write_png_enc(writer) {
            Ok(()) => Ok(()),
            Err(png::EncodingError::IoError(error)) => Err(Error::Io(error)),
            Err(error) => encoding_error!("PNG encoding failed: {}", error),
        }
    }

    fn write_png_enc<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_depth(png::BitDepth::Eight);
        let has_alpha = self.has_alpha();
        if has_alpha {
            encoder.set_color(png::ColorType::Rgba);
        } else {
            encoder.set_color(png::ColorType::Rgb);
        }
        let mut writer = encoder.write_header()?;
        if has_alpha {
            writer.write_image_data(&self.rgba_data)?;
        } else {
            let mut rgb_data =
                Vec::<u8>::with_capacity((self.rgba_data.len() / 4) * 3);
            for pixel in self.rgba_data.chunks_exact(4) {
                rgb_data.extend_from_slice(&pixel[..3]);
            }
            writer.write_image_data(&rgb_data)?;
        }
        Ok(())
    }

    /// Decodes an image from a PNG stream.  Returns an error if the PNG
    /// data is malformed, or uses a color type other than 8-bit RGB/RGBA.
    pub fn read_png<R: Read>(reader: R) -> Result<RasterImage, Error> {
        let decoder = png::Decoder::new(reader);
        let mut png_reader = match decoder.read_info() {
            Ok(png_reader) => png_reader,
            Err(error) => invalid_input!("malformed PNG data: {}", error),
        };
        if png_reader.info().bit_depth != png::BitDepth::Eight {
            invalid_input!(
                "unsupported PNG bit depth: {:?}",
                png_reader.info().bit_depth
            );
        }
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        if let Err(error) = png_reader.next_frame(&mut buffer) {
            invalid_input!("malformed PNG data: {}", error);
        }
        let info = png_reader.info();
        let rgba_data = match info.color_type {
            png::ColorType::Rgba => buffer,
            png::ColorType::Rgb => {
                let num_pixels = buffer.len() / 3;
                let mut rgba = Vec::with_capacity(num_pixels * 4);
                for pixel in buffer.chunks_exact(3) {
                    rgba.extend_from_slice(pixel);
                    rgba.push(u8::MAX);
                }
                rgba
            }
            color_type => {
                invalid_input!("unsupported PNG color type: {:?}", color_type);
            }
        };
        Ok(RasterImage::from_rgba_data(info.width, info.height, rgba_data))
    }

    /// Encodes the image as a 32-bpp device-independent bitmap payload: a
    /// 40-byte info header followed by the pixel rows, stored bottom to top
    /// in BGRA order, with no mask and no scanline padding.
    pub fn write_dib(&self) -> Result<Vec<u8>, Error> {
        let pixel_data_len = self.rgba_data.len();
        let mut data =
            Vec::<u8>::with_capacity(DIB_HEADER_LEN as usize + pixel_data_len);
        data.write_u32::<LittleEndian>(DIB_HEADER_LEN)?;
        data.write_i32::<LittleEndian>(self.width as i32)?;
        // The height is stored doubled; readers subtract the rows that a
        // mask would occupy even when none is present.
        data.write_i32::<LittleEndian>(2 * self.height as i32)?;
        data.write_u16::<LittleEndian>(1)?; // planes
        data.write_u16::<LittleEndian>(32)?; // bits per pixel
        data.write_u32::<LittleEndian>(0)?; // compression
        data.write_u32::<LittleEndian>(pixel_data_len as u32)?;
        data.write_i32::<LittleEndian>(0)?; // horz ppm
        data.write_i32::<LittleEndian>(0)?; // vert ppm
        data.write_u32::<LittleEndian>(0)?; // colors used
        data.write_u32::<LittleEndian>(0)?; // colors important
        debug_assert_eq!(data.len(), DIB_HEADER_LEN as usize);
        for row in (0..self.height).rev() {
            let start = (4 * row * self.width) as usize;
            let row_data = &self.rgba_data[start..][..(4 * self.width) as usize];
            for pixel in row_data.chunks_exact(4) {
                data.push(pixel[2]);
                data.push(pixel[1]);
                data.push(pixel[0]);
                data.push(pixel[3]);
            }
        }
        Ok(data)
    }

    /// Decodes a 32-bpp device-independent bitmap payload produced by
    /// [`write_dib`](RasterImage::write_dib).
    pub fn read_dib<R: Read>(mut reader: R) -> Result<RasterImage, Error> {
        let header_len = reader.read_u32::<LittleEndian>()?;
        if header_len != DIB_HEADER_LEN {
            invalid_input!(
                "invalid bitmap header size (was {}, must be {})",
                header_len,
                DIB_HEADER_LEN
            );
        }
        let width = reader.read_i32::<LittleEndian>()?;
        if width < 0 {
            invalid_input!("invalid bitmap width ({})", width);
        }
        let width = width as u32;
        let doubled_height = reader.read_i32::<LittleEndian>()?;
        if doubled_height < 0 || doubled_height % 2 != 0 {
            invalid_input!(
                "invalid height field in bitmap header \
                 (was {}, but must be nonnegative and divisible by 2)",
                doubled_height
            );
        }
        let height = (doubled_height / 2) as u32;
        let _planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        if bits_per_pixel != 32 {
            invalid_input!(
                "unsupported bitmap bits-per-pixel ({})",
                bits_per_pixel
            );
        }
        let compression = reader.read_u32::<LittleEndian>()?;
        if compression != 0 {
            invalid_input!("unsupported bitmap compression ({})", compression);
        }
        let _image_size = reader.read_u32::<LittleEndian>()?;
        let _horz_ppm = reader.read_i32::<LittleEndian>()?;
        let _vert_ppm = reader.read_i32::<LittleEndian>()?;
        let _colors_used = reader.read_u32::<LittleEndian>()?;
        let _colors_important = reader.read_u32::<LittleEndian>()?;
        let num_pixels = match width.checked_mul(height) {
            Some(num) => num as usize,
            None => invalid_input!("width * height is too large"),
        };
        let mut rgba = vec![0u8; num_pixels * 4];
        let mut row_data = vec![0u8; (4 * width) as usize];
        for row in (0..height).rev() {
            reader.read_exact(&mut row_data)?;
            let start = (4 * row * width) as usize;
            for (src, dest) in row_data
                .chunks_exact(4)
                .zip(rgba[start..][..(4 * width) as usize].chunks_exact_mut(4))
            {
                dest[0] = src[2];
                dest[1] = src[1];
                dest[2] = src[0];
                dest[3] = src[3];
            }
        }
        Ok(RasterImage::from_rgba_data(width, height, rgba))
    }
}

//===========================================================================//


//===========================================================================//
