//! PNG snapshots of the vortex field, one file per step.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::DVec2;
use vortex_core::store::VortexStore;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const POSITIVE: [u8; 4] = [220, 30, 30, 255];
const NEGATIVE: [u8; 4] = [30, 60, 220, 255];

/// Rasterizes vortices into square RGBA frames and writes them as
/// `frame{index:08}.png` inside an output directory.
#[derive(Debug)]
pub struct FrameWriter {
    dir: PathBuf,
    size: u32,
    dot_radius: i32,
}

impl FrameWriter {
    /// Creates the output directory if it does not exist yet.
    pub fn create(dir: impl Into<PathBuf>, size: u32) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating frame directory {}", dir.display()))?;
        Ok(Self {
            dir,
            size: size.max(1),
            dot_radius: 2,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame{index:08}.png"))
    }

    /// Renders active vortices: positive in red, negative in blue.
    ///
    /// The domain `[0, domain)²` fills the frame with `y` pointing up.
    /// Returns a tightly packed RGBA buffer of `size * size` pixels.
    pub fn render(&self, store: &VortexStore, domain: f64) -> Vec<u8> {
        let n = self.size as usize;
        let mut buf = BACKGROUND.repeat(n * n);

        for (positions, color) in [
            (store.positive_positions().collect::<Vec<_>>(), POSITIVE),
            (store.negative_positions().collect::<Vec<_>>(), NEGATIVE),
        ] {
            for p in positions {
                let (cx, cy) = self.to_pixel(p, domain);
                self.stamp(&mut buf, cx, cy, color);
            }
        }
        buf
    }

    /// Renders and writes frame `index`.
    pub fn save(&self, store: &VortexStore, domain: f64, index: u64) -> Result<PathBuf> {
        let buf = self.render(store, domain);
        let path = self.frame_path(index);
        image::save_buffer_with_format(
            &path,
            &buf,
            self.size,
            self.size,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    fn to_pixel(&self, p: DVec2, domain: f64) -> (i32, i32) {
        let scale = self.size as f64 / domain;
        let x = (p.x * scale).floor() as i32;
        let y = self.size as i32 - 1 - (p.y * scale).floor() as i32;
        (x, y)
    }

    fn stamp(&self, buf: &mut [u8], cx: i32, cy: i32, color: [u8; 4]) {
        let size = self.size as i32;
        let r = self.dot_radius;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= size || y >= size {
                    continue;
                }
                let i = ((y * size + x) * 4) as usize;
                buf[i..i + 4].copy_from_slice(&color);
            }
        }
    }
}
