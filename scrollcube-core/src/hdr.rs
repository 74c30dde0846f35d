/// Radiance HDR (RGBE) decoder for the environment map.
///
/// Pixels stay in their packed RGBE form so they can be uploaded as an
/// RGBA8 texture and expanded in the shader.
use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_till1},
    character::complete::{line_ending, space1, u32 as decimal},
    multi::many0,
    number::complete::u8 as byte,
    sequence::{terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// Largest side length the scanline encoding can describe
const MAX_DIMENSION: u32 = 0x7fff;
/// Upper bound on decoded pixels (128 MiB of RGBE)
const MAX_PIXELS: usize = 1 << 25;

/// Decoded Radiance image, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    width: u32,
    height: u32,
    /// Product of all EXPOSURE header values
    exposure: f32,
    rgbe: Vec<u8>,
}

impl HdrImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    /// Packed RGBE bytes, four per pixel
    pub fn rgbe(&self) -> &[u8] {
        &self.rgbe
    }

    pub fn pixel_rgbe(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgbe[i], self.rgbe[i + 1], self.rgbe[i + 2], self.rgbe[i + 3]])
    }

    /// Linear radiance of one pixel
    pub fn pixel_rgb(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        self.pixel_rgbe(x, y).map(rgbe_to_rgb)
    }

    /// Mean Rec. 709 luminance over the whole image
    pub fn mean_luminance(&self) -> f32 {
        let pixels = self.rgbe.len() / 4;
        if pixels == 0 {
            return 0.0;
        }
        let total: f64 = self
            .rgbe
            .chunks_exact(4)
            .map(|p| {
                let [r, g, b] = rgbe_to_rgb([p[0], p[1], p[2], p[3]]);
                (0.2126 * r + 0.7152 * g + 0.0722 * b) as f64
            })
            .sum();
        (total / pixels as f64) as f32
    }
}

/// Expand one RGBE quadruplet; a zero exponent is black
pub fn rgbe_to_rgb(rgbe: [u8; 4]) -> [f32; 3] {
    if rgbe[3] == 0 {
        return [0.0; 3];
    }
    let scale = 2.0f32.powi(rgbe[3] as i32 - 136);
    [rgbe[0] as f32 * scale, rgbe[1] as f32 * scale, rgbe[2] as f32 * scale]
}

fn magic(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(alt((tag("#?RADIANCE"), tag("#?RGBE"))), line_ending)(input)
}

fn header_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_till1(|c: u8| c == b'\n' || c == b'\r'), line_ending)(input)
}

fn header(input: &[u8]) -> IResult<&[u8], Vec<&[u8]>> {
    let (input, _) = magic(input)?;
    let (input, lines) = many0(header_line)(input)?;
    let (input, _) = line_ending(input)?;
    Ok((input, lines))
}

/// Only the standard `-Y height +X width` orientation is accepted
fn resolution(input: &[u8]) -> IResult<&[u8], (u32, u32)> {
    let (input, (_, _, height, _, _, _, width, _)) = tuple((
        tag("-Y"),
        space1,
        decimal,
        space1,
        tag("+X"),
        space1,
        decimal,
        line_ending,
    ))(input)?;
    Ok((input, (width, height)))
}

fn truncated<E>(_: nom::Err<E>) -> Error {
    Error::Hdr("unexpected end of pixel data".to_string())
}

/// Apply the header variables; returns the accumulated exposure
fn read_variables(lines: &[&[u8]]) -> Result<f32> {
    let mut exposure = 1.0f32;
    for line in lines {
        let line = String::from_utf8_lossy(line);
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "FORMAT" if value.trim() != "32-bit_rle_rgbe" => {
                return Err(Error::Hdr(format!("unsupported pixel format {}", value.trim())));
            }
            "EXPOSURE" => {
                let value: f32 = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::Hdr(format!("bad EXPOSURE value {}", value.trim())))?;
                exposure *= value;
            }
            _ => {}
        }
    }
    Ok(exposure)
}

fn is_rle_scanline(input: &[u8], width: usize) -> bool {
    (8..=0x7fff).contains(&width)
        && input.len() >= 4
        && input[0] == 2
        && input[1] == 2
        && input[2] & 0x80 == 0
}

/// Decode one scanline into `row` (width * 4 bytes)
fn scanline<'a>(input: &'a [u8], width: usize, row: &mut [u8]) -> Result<&'a [u8]> {
    if !is_rle_scanline(input, width) {
        let (input, flat) = take::<_, _, nom::error::Error<&[u8]>>(width * 4)(input).map_err(truncated)?;
        row.copy_from_slice(flat);
        return Ok(input);
    }

    let encoded_width = ((input[2] as usize) << 8) | input[3] as usize;
    if encoded_width != width {
        return Err(Error::Hdr(format!(
            "scanline width {} does not match image width {}",
            encoded_width, width
        )));
    }
    let mut input = &input[4..];

    // Components are stored as four separate planes
    for channel in 0..4 {
        let mut x = 0;
        while x < width {
            let (rest, count) = byte::<_, nom::error::Error<&[u8]>>(input).map_err(truncated)?;
            input = rest;
            if count > 128 {
                let run = (count - 128) as usize;
                if x + run > width {
                    return Err(Error::Hdr("run overflows scanline".to_string()));
                }
                let (rest, value) = byte::<_, nom::error::Error<&[u8]>>(input).map_err(truncated)?;
                input = rest;
                for px in x..x + run {
                    row[px * 4 + channel] = value;
                }
                x += run;
            } else {
                let run = count as usize;
                if run == 0 || x + run > width {
                    return Err(Error::Hdr("bad literal run in scanline".to_string()));
                }
                let (rest, values) = take::<_, _, nom::error::Error<&[u8]>>(run)(input).map_err(truncated)?;
                input = rest;
                for (offset, &value) in values.iter().enumerate() {
                    row[(x + offset) * 4 + channel] = value;
                }
                x += run;
            }
        }
    }
    Ok(input)
}

/// Parse a Radiance `.hdr` file
pub fn parse_hdr(data: &[u8]) -> Result<HdrImage> {
    let (rest, lines) = header(data).map_err(|_| Error::Hdr("missing or malformed header".to_string()))?;
    let exposure = read_variables(&lines)?;
    let (mut rest, (width, height)) =
        resolution(rest).map_err(|_| Error::Hdr("unsupported or malformed resolution line".to_string()))?;
    if width == 0 || height == 0 {
        return Err(Error::Hdr(format!("empty image {}x{}", width, height)));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::Hdr(format!("image {}x{} exceeds {} per side", width, height, MAX_DIMENSION)));
    }
    let too_large = || Error::Hdr(format!("image {}x{} is too large", width, height));
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .filter(|&n| n <= MAX_PIXELS)
        .ok_or_else(too_large)?;
    let row_len = (width as usize).checked_mul(4).ok_or_else(too_large)?;
    let total = pixels.checked_mul(4).ok_or_else(too_large)?;

    let mut rgbe = vec![0u8; total];
    for row in rgbe.chunks_exact_mut(row_len) {
        rest = scanline(rest, width as usize, row)?;
    }

    Ok(HdrImage {
        width,
        height,
        exposure,
        rgbe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(header: &str, body: &[u8]) -> Vec<u8> {
        let mut data = header.as_bytes().to_vec();
        data.extend_from_slice(body);
        data
    }

    const HEADER_8X1: &str = "#?RADIANCE\n# made by hand\nFORMAT=32-bit_rle_rgbe\nEXPOSURE=2.0\n\n-Y 1 +X 8\n";

    fn pixels_8() -> Vec<[u8; 4]> {
        let greens = [0, 10, 20, 30, 40, 50, 60, 70];
        let blues = [10, 10, 10, 10, 1, 2, 3, 4];
        (0..8).map(|i| [100, greens[i], blues[i], 130]).collect()
    }

    fn rle_8() -> Vec<u8> {
        let mut body = vec![2, 2, 0, 8];
        body.extend_from_slice(&[128 + 8, 100]);
        body.extend_from_slice(&[8, 0, 10, 20, 30, 40, 50, 60, 70]);
        body.extend_from_slice(&[128 + 4, 10, 4, 1, 2, 3, 4]);
        body.extend_from_slice(&[128 + 8, 130]);
        body
    }

    #[test]
    fn test_flat_scanlines() {
        let body = [128, 64, 0, 129, 0, 0, 0, 0];
        let image = parse_hdr(&file("#?RGBE\n\n-Y 1 +X 2\n", &body)).unwrap();
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.exposure(), 1.0);
        assert_eq!(image.pixel_rgb(0, 0), Some([1.0, 0.5, 0.0]));
        assert_eq!(image.pixel_rgb(1, 0), Some([0.0, 0.0, 0.0]));
        assert_eq!(image.pixel_rgb(2, 0), None);
    }

    #[test]
    fn test_rle_matches_flat() {
        let rle = parse_hdr(&file(HEADER_8X1, &rle_8())).unwrap();
        let flat_body: Vec<u8> = pixels_8().into_iter().flatten().collect();
        let flat = parse_hdr(&file(HEADER_8X1, &flat_body)).unwrap();
        assert_eq!(rle, flat);
        assert_eq!(rle.exposure(), 2.0);
        assert_eq!(rle.pixel_rgbe(5, 0), Some([100, 50, 2, 130]));
    }

    #[test]
    fn test_truncated_rle() {
        let body = rle_8();
        let err = parse_hdr(&file(HEADER_8X1, &body[..body.len() - 1])).unwrap_err();
        assert!(matches!(err, Error::Hdr(_)));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_hdr(b"P6\n1 1\n255\n").is_err());
        assert!(parse_hdr(&file("#?RADIANCE\n\n+Y 1 +X 2\n", &[0; 8])).is_err());
        assert!(parse_hdr(&file("#?RADIANCE\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 2\n", &[0; 8])).is_err());
        assert!(parse_hdr(&file("#?RADIANCE\n\n-Y 0 +X 2\n", &[])).is_err());
    }

    #[test]
    fn test_rejects_oversized_resolution() {
        let huge = parse_hdr(&file("#?RADIANCE\n\n-Y 4294967295 +X 4294967295\n", &[0; 4]));
        assert!(matches!(huge, Err(Error::Hdr(_))));

        // Each side fits the scanline encoding, but the total does not fit the pixel budget
        let wide = parse_hdr(&file("#?RADIANCE\n\n-Y 32767 +X 32767\n", &[0; 4]));
        assert!(matches!(wide, Err(Error::Hdr(_))));

        let tall = parse_hdr(&file("#?RADIANCE\n\n-Y 65536 +X 1\n", &[0; 4]));
        assert!(matches!(tall, Err(Error::Hdr(_))));
    }

    #[test]
    fn test_mean_luminance() {
        // Single white pixel of radiance 1.0
        let image = parse_hdr(&file("#?RADIANCE\n\n-Y 1 +X 1\n", &[128, 128, 128, 129])).unwrap();
        assert!((image.mean_luminance() - 1.0).abs() < 1e-6);
    }
}
