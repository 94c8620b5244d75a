use crate::error::Error;
use crate::format::SourceFormat;
use crate::raster::RasterImage;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, SeekFrom, Write};

//===========================================================================//

// The image type field value for icon resources.
const ICON_RESOURCE_TYPE: u16 = 1;

//===========================================================================//

/// How per-size payloads are serialized into the container.  The strategy
/// is a property of a deployment, selected once when the converter is
/// built, not per call.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum EncodingStrategy {
    /// Each entry embeds a compressed PNG stream.  Smaller files, compact
    /// transparency.  This is the default.
    PngEntries,
    /// Each entry embeds an uncompressed 32-bpp bitmap behind a legacy
    /// bitmap-info header.  Larger files, better backwards compatibility.
    RawBitmapEntries,
}

//===========================================================================//

/// A collection of icon images; the contents of a single ICO file.
#[derive(Clone)]
pub struct IconDir {
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Creates a new, empty collection of icons.
    pub fn new() -> IconDir {
        IconDir { entries: Vec::new() }
    }

    /// Returns the entries in this collection.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Adds an entry to the collection.  Directory order follows insertion
    /// order, and so does the payload order in the serialized file.
    pub fn add_entry(&mut self, entry: IconDirEntry) {
        self.entries.push(entry);
    }

    /// Reads an ICO file into memory.
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<IconDir, Error> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            invalid_input!(
                "invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        if restype != ICON_RESOURCE_TYPE {
            invalid_input!(
                "not an icon resource (image type was {}, but must be {})",
                restype,
                ICON_RESOURCE_TYPE
            );
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
        let mut spans = Vec::<(u32, u32)>::with_capacity(num_entries);
        for _ in 0..num_entries {
            let width_byte = reader.read_u8()?;
            let height_byte = reader.read_u8()?;
            let _num_colors = reader.read_u8()?;
            let reserved = reader.read_u8()?;
            if reserved != 0 {
                invalid_input!(
                    "invalid reserved field value in ICONDIRENTRY \
                     (was {}, but must be 0)",
                    reserved
                );
            }
            let color_planes = reader.read_u16::<LittleEndian>()?;
            let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
            let data_size = reader.read_u32::<LittleEndian>()?;
            let data_offset = reader.read_u32::<LittleEndian>()?;
            // A width/height byte of zero stands in for any size of 256 or
            // more; the true size comes from the payload.
            let width = if width_byte == 0 { 256 } else { width_byte as u32 };
            let height =
                if height_byte == 0 { 256 } else { height_byte as u32 };
            spans.push((data_offset, data_size));
            entries.push(IconDirEntry {
                width,
                height,
                color_planes,
                bits_per_pixel,
                data: Vec::new(),
            });
        }
        for (index, &(data_offset, data_size)) in spans.iter().enumerate() {
            reader.seek(SeekFrom::Start(data_offset as u64))?;
            let mut data = vec![0u8; data_size as usize];
            reader.read_exact(&mut data)?;
            entries[index].data = data;
        }
        Ok(IconDir { entries })
    }

    /// Writes an ICO file out to disk.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        if self.entries.len() > (u16::MAX as usize) {
            invalid_input!(
                "too many entries in IconDir (was {}, but max is {})",
                self.entries.len(),
                u16::MAX
            );
        }
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(ICON_RESOURCE_TYPE)?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut data_offset = 6 + 16 * (self.entries.len() as u32);
        for entry in self.entries.iter() {
            // A width/height byte of zero indicates a size of 256 or more.
            let width = if entry.width > 255 { 0 } else { entry.width as u8 };
            writer.write_u8(width)?;
            let height =
                if entry.height > 255 { 0 } else { entry.height as u8 };
            writer.write_u8(height)?;
            writer.write_u8(0)?; // color count
            writer.write_u8(0)?; // reserved
            writer.write_u16::<LittleEndian>(entry.color_planes)?;
            writer.write_u16::<LittleEndian>(entry.bits_per_pixel)?;
            let data_size = entry.data.len() as u32;
            writer.write_u32::<LittleEndian>(data_size)?;
            writer.write_u32::<LittleEndian>(data_offset)?;
            data_offset += data_size;
        }
        for entry in self.entries.iter() {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }
}

impl Default for IconDir {
    fn default() -> IconDir {
        IconDir::new()
    }
}

//===========================================================================//

/// One entry in an ICO file; a single image at one nominal size.
#[derive(Clone)]
pub struct IconDirEntry {
    width: u32,
    height: u32,
    color_planes: u16,
    bits_per_pixel: u16,
    data: Vec<u8>,
}

impl IconDirEntry {
    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bits-per-pixel field of the entry.  Zero for PNG
    /// payloads, where the field is ignored by convention.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns true if the payload is a PNG stream, or false if it is an
    /// uncompressed bitmap.
    pub fn is_png(&self) -> bool {
        matches!(SourceFormat::sniff(&self.data), Some(SourceFormat::Png))
    }

    /// Returns the raw, encoded payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Encodes an image in a new entry with a compressed PNG payload.  The
    /// planes and bit-count fields are written as zero, as ICO convention
    /// has readers ignore them for PNG payloads.
    pub fn encode_png(image: &RasterImage) -> Result<IconDirEntry, Error> {
        let mut data = Vec::new();
        image.write_png(&mut data)?;
        Ok(IconDirEntry {
            width: image.width(),
            height: image.height(),
            color_planes: 0,
            bits_per_pixel: 0,
            data,
        })
    }

    /// Encodes an image in a new entry with an uncompressed 32-bpp bitmap
    /// payload.
    pub fn encode_bmp(image: &RasterImage) -> Result<IconDirEntry, Error> {
        let data = image.write_dib()?;
        Ok(IconDirEntry {
            width: image.width(),
            height: image.height(),
            color_planes: 1,
            bits_per_pixel: 32,
            data,
        })
    }

    /// Decodes this entry's payload into an image.  Returns an error if
    /// the payload is malformed.
    pub fn decode(&self) -> Result<RasterImage, Error> {
        if self.is_png() {
            RasterImage::read_png(self.data.as_slice())
        } else {
            RasterImage::read_dib(self.data.as_slice())
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{IconDir, IconDirEntry};
    use crate::raster::RasterImage;
    use std::io::Cursor;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            rgba.extend_from_slice(&color);
        }
        RasterImage::from_rgba_data(width, height, rgba)
    }

    #[test]
    fn write_empty_icon_set() {
        let icondir = IconDir::new();
        let mut output = Vec::<u8>::new();
        icondir.write(&mut output).unwrap();
        let expected: &[u8] = b"\x00\x00\x01\x00\x00\x00";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn read_empty_icon_set() {
        let input = b"\x00\x00\x01\x00\x00\x00";
        let icondir = IconDir::read(Cursor::new(input)).unwrap();
        assert_eq!(icondir.entries().len(), 0);
    }

    #[test]
    fn read_rejects_cursor_resources() {
        let input = b"\x00\x00\x02\x00\x00\x00";
        assert!(IconDir::read(Cursor::new(input)).is_err());
    }

    #[test]
    fn read_rejects_bad_reserved_field() {
        let input = b"\x01\x00\x01\x00\x00\x00";
        assert!(IconDir::read(Cursor::new(input)).is_err());
    }

    #[test]
    fn png_entry_fields() {
        let entry =
            IconDirEntry::encode_png(&solid(4, 4, [9, 9, 9, 128])).unwrap();
        assert!(entry.is_png());
        assert_eq!(entry.width(), 4);
        assert_eq!(entry.height(), 4);
        assert_eq!(entry.bits_per_pixel(), 0);
    }

    #[test]
    fn bmp_entry_fields() {
        let entry =
            IconDirEntry::encode_bmp(&solid(4, 4, [9, 9, 9, 128])).unwrap();
        assert!(!entry.is_png());
        assert_eq!(entry.bits_per_pixel(), 32);
        assert_eq!(entry.data().len(), 40 + 4 * 4 * 4);
    }

    #[test]
    fn entry_payload_round_trip() {
        let image = solid(5, 5, [20, 40, 60, 200]);
        for entry in [
            IconDirEntry::encode_png(&image).unwrap(),
            IconDirEntry::encode_bmp(&image).unwrap(),
        ] {
            let decoded = entry.decode().unwrap();
            assert_eq!(decoded.width(), 5);
            assert_eq!(decoded.height(), 5);
            assert_eq!(decoded.rgba_data(), image.rgba_data());
        }
    }

    #[test]
    fn directory_round_trip() {
        let mut icondir = IconDir::new();
        icondir
            .add_entry(IconDirEntry::encode_png(&solid(3, 3, [1, 2, 3, 4])).unwrap());
        icondir
            .add_entry(IconDirEntry::encode_bmp(&solid(6, 6, [5, 6, 7, 8])).unwrap());
        let mut file = Vec::<u8>::new();
        icondir.write(&mut file).unwrap();
        let icondir = IconDir::read(Cursor::new(&file)).unwrap();
        assert_eq!(icondir.entries().len(), 2);
        assert_eq!(icondir.entries()[0].width(), 3);
        assert!(icondir.entries()[0].is_png());
        assert_eq!(icondir.entries()[1].width(), 6);
        assert!(!icondir.entries()[1].is_png());
        let decoded = icondir.entries()[1].decode().unwrap();
        assert_eq!(decoded.rgba_data()[0..4], [5, 6, 7, 8]);
    }

    #[test]
    fn size_255_is_written_literally() {
        let mut icondir = IconDir::new();
        icondir.add_entry(
            IconDirEntry::encode_bmp(&solid(255, 255, [0, 0, 0, 255])).unwrap(),
        );
        let mut file = Vec::<u8>::new();
        icondir.write(&mut file).unwrap();
        assert_eq!(file[6], 255);
        assert_eq!(file[7], 255);
    }

    #[test]
    fn size_256_and_up_is_written_as_zero() {
        for size in [256u32, 300] {
            let mut icondir = IconDir::new();
            icondir.add_entry(
                IconDirEntry::encode_bmp(&solid(size, size, [0, 0, 0, 255]))
                    .unwrap(),
            );
            let mut file = Vec::<u8>::new();
            icondir.write(&mut file).unwrap();
            assert_eq!(file[6], 0);
            assert_eq!(file[7], 0);
        }
    }

    #[test]
    fn read_maps_zero_size_byte_to_256() {
        let mut icondir = IconDir::new();
        icondir.add_entry(
            IconDirEntry::encode_png(&solid(256, 256, [0, 0, 0, 255])).unwrap(),
        );
        let mut file = Vec::<u8>::new();
        icondir.write(&mut file).unwrap();
        let icondir = IconDir::read(Cursor::new(&file)).unwrap();
        assert_eq!(icondir.entries()[0].width(), 256);
        assert_eq!(icondir.entries()[0].height(), 256);
    }
}

//===========================================================================//
