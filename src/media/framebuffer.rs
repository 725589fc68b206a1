// SPDX-License-Identifier: MPL-2.0
//! Linux framebuffer device output.
//!
//! The device geometry is read from sysfs
//! (`/sys/class/graphics/<name>/{virtual_size,bits_per_pixel,stride}`) and
//! rows are written with positioned writes, so no mmap is needed.

use crate::error::{Error, PlaybackError, Result};
use crate::player::io::PixelSurface;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

/// Visible size and pixel layout of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbGeometry {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Bytes per row, including padding.
    pub stride: u32,
}

impl FbGeometry {
    fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Reads the geometry of `device` (e.g. `/dev/fb0`) from sysfs.
    pub fn from_sysfs(device: &Path) -> Result<Self> {
        let name = device
            .file_name()
            .ok_or_else(|| Error::Io(format!("{} is not a device path", device.display())))?;
        Self::from_sysfs_dir(&Path::new(SYSFS_GRAPHICS).join(name))
    }

    fn from_sysfs_dir(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<String> {
            let path: PathBuf = dir.join(file);
            fs::read_to_string(&path)
                .map_err(|e| Error::Io(format!("cannot read {}: {e}", path.display())))
        };

        let (width, height) = parse_pair(&read("virtual_size")?)
            .ok_or_else(|| Error::Io("malformed framebuffer virtual_size".into()))?;
        let bits_per_pixel = read("bits_per_pixel")?
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::Io(format!("malformed framebuffer bits_per_pixel: {e}")))?;
        if !matches!(bits_per_pixel, 16 | 24 | 32) {
            return Err(Error::Io(format!(
                "unsupported framebuffer depth {bits_per_pixel} bpp"
            )));
        }
        // Older kernels lack `stride`.
        let stride = read("stride")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(width * bits_per_pixel / 8);

        Ok(Self {
            width,
            height,
            bits_per_pixel,
            stride,
        })
    }
}

/// Parses sysfs `"<w>,<h>"`.
fn parse_pair(text: &str) -> Option<(u32, u32)> {
    let (w, h) = text.trim().split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// Packs an RGB triple for a framebuffer of the given depth.
///
/// 16 bpp is RGB565; 24 and 32 bpp are `0x00RRGGBB`, stored little-endian.
pub fn pack_rgb(bits_per_pixel: u32, r: u8, g: u8, b: u8) -> u32 {
    let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
    match bits_per_pixel {
        16 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
        _ => (r << 16) | (g << 8) | b,
    }
}

/// An opened framebuffer device.
pub struct Framebuffer {
    file: File,
    geometry: FbGeometry,
    bytes: Vec<u8>,
}

impl Framebuffer {
    pub fn open(device: &Path) -> Result<Self> {
        let geometry = FbGeometry::from_sysfs(device)?;
        let file = OpenOptions::new().write(true).open(device).map_err(|e| {
            PlaybackError::Startup(format!("cannot open {}: {e}", device.display()))
        })?;
        Ok(Self::with_geometry(file, geometry))
    }

    /// Wraps an already opened device file.
    pub fn with_geometry(file: File, geometry: FbGeometry) -> Self {
        Self {
            file,
            bytes: Vec::with_capacity(geometry.stride as usize),
            geometry,
        }
    }

    pub fn geometry(&self) -> FbGeometry {
        self.geometry
    }
}

impl PixelSurface for Framebuffer {
    fn rows(&self) -> usize {
        self.geometry.height as usize
    }

    fn cols(&self) -> usize {
        self.geometry.width as usize
    }

    fn pack_color(&self, r: u8, g: u8, b: u8) -> u32 {
        pack_rgb(self.geometry.bits_per_pixel, r, g, b)
    }

    fn write_row(&mut self, row: usize, col: usize, run: &[u32]) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Ok(());
        }
        let visible = run.len().min(self.cols() - col);
        let bpp = self.geometry.bytes_per_pixel();

        self.bytes.clear();
        for pixel in &run[..visible] {
            self.bytes.extend_from_slice(&pixel.to_le_bytes()[..bpp]);
        }
        let offset = row * self.geometry.stride as usize + col * bpp;
        self.file.write_all_at(&self.bytes, offset as u64)?;
        Ok(())
    }
}
