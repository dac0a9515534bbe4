use crate::config::NoiseSettings;
use crate::error::TerrainError;
use image::{ImageBuffer, Luma};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(all(feature = "parallel", not(feature = "wasm")))]
use rayon::prelude::*;
use serde::Serialize;

/// Двумерная карта высот: сырые значения diamond-square, строки подряд (row-major)
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

/// Сводка по высотам: минимум, максимум, среднее и середина диапазона
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct HeightStats {
    pub lowest: f32,
    pub highest: f32,
    pub mean: f32,
    pub midpoint: f32,
}

impl Heightmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize,
            "heightmap data does not match {width}x{height}"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Индекс клетки `(x, y)` в плоском массиве: `y * width + x`
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y as usize * self.width as usize + x as usize
    }

    /// Обратное к [`Self::index`]
    #[inline]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((idx % width) as u32, (idx / width) as u32)
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Первый проход классификации: минимум и максимум (плюс среднее для логов)
    pub fn stats(&self) -> HeightStats {
        if self.data.is_empty() {
            return HeightStats::default();
        }
        let mut lowest = f32::INFINITY;
        let mut highest = f32::NEG_INFINITY;
        let mut sum = 0.0_f64;
        for &h in &self.data {
            lowest = lowest.min(h);
            highest = highest.max(h);
            sum += f64::from(h);
        }
        HeightStats {
            lowest,
            highest,
            mean: (sum / self.data.len() as f64) as f32,
            midpoint: (lowest + highest) / 2.0,
        }
    }

    /// Нормализует высоты в `0..=255` относительно собственного диапазона
    pub fn to_grayscale_image(&self) -> Vec<u8> {
        let HeightStats {
            lowest, highest, ..
        } = self.stats();
        let range = highest - lowest;
        let to_byte = |&v: &f32| {
            if range > 0.0 {
                ((v - lowest) / range * 255.0) as u8
            } else {
                0
            }
        };

        #[cfg(all(feature = "parallel", not(feature = "wasm")))]
        let values = self.data.par_iter();
        #[cfg(not(all(feature = "parallel", not(feature = "wasm"))))]
        let values = self.data.iter();
        values.map(to_byte).collect()
    }

    pub fn save_as_png(&self, path: &str) -> Result<(), TerrainError> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image()).ok_or(
                TerrainError::ImageBuffer {
                    width: self.width,
                    height: self.height,
                },
            )?;
        img.save(path)?;
        Ok(())
    }
}

/// Прямоугольная область рекурсии `[left, right] × [top, bottom]` (границы включительно)
#[derive(Debug, Clone, Copy)]
struct Region {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

/// Состояние рекурсии: один общий буфер на всю глубину, без аллокаций на шаге
struct Displacer<'a> {
    data: &'a mut [f32],
    size: usize,
    settings: &'a NoiseSettings,
    decay: f32,
    rng: ChaCha8Rng,
}

impl Displacer<'_> {
    #[inline]
    fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.size + x]
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.size + x] = value;
    }

    fn jitter(&mut self, displacement: f32) -> f32 {
        let r: f32 = self.rng.gen_range(0.0..1.0);
        let offset = (r - 0.5) * displacement;
        if self.settings.integer_displacement {
            offset.floor()
        } else {
            offset
        }
    }

    fn on_pole(&self, y: usize) -> bool {
        self.settings.flatten_poles && (y == 0 || y == self.size - 1)
    }

    /// Середина ребра по горизонтали: прижата к нулю на полюсах
    fn horizontal_midpoint(&mut self, a: f32, b: f32, y: usize, displacement: f32) -> f32 {
        if self.on_pole(y) {
            0.0
        } else {
            ((a + b) / 2.0).floor() + self.jitter(displacement)
        }
    }

    fn displace(&mut self, region: Region, displacement: f32, root: bool) {
        let Region {
            left,
            top,
            right,
            bottom,
        } = region;
        if right - left < 2 || bottom - top < 2 {
            return;
        }

        let xc = (left + right) / 2;
        let yc = (top + bottom) / 2;

        let tl = self.at(left, top);
        let tr = self.at(right, top);
        let bl = self.at(left, bottom);
        let br = self.at(right, bottom);

        // Diamond: на корне углы ещё пусты, центр засевается базовой высотой
        let centre = if root {
            self.settings.base_elevation
        } else {
            ((tl + tr + bl + br) / 4.0).floor() + self.jitter(displacement)
        };
        self.put(xc, yc, centre);

        // Square
        let top_mid = self.horizontal_midpoint(tl, tr, top, displacement);
        self.put(xc, top, top_mid);
        let bottom_mid = self.horizontal_midpoint(bl, br, bottom, displacement);
        self.put(xc, bottom, bottom_mid);
        let left_mid = ((tl + bl) / 2.0).floor() + self.jitter(displacement);
        self.put(left, yc, left_mid);
        let right_mid = ((tr + br) / 2.0).floor() + self.jitter(displacement);
        self.put(right, yc, right_mid);

        if right - left > 2 {
            let next = displacement * self.decay;
            let quadrants = [
                Region { left, top, right: xc, bottom: yc },
                Region { left: xc, top, right, bottom: yc },
                Region { left, top: yc, right: xc, bottom },
                Region { left: xc, top: yc, right, bottom },
            ];
            for quadrant in quadrants {
                self.displace(quadrant, next, false);
            }
        }
    }
}

/// Генерирует карту высот методом diamond-square (рекурсивное смещение средней точки)
///
/// Синтез идёт в квадратной области `width × width`; возвращаются первые `height` строк.
/// Высота больше ширины прижимается к ширине.
/// Ширина должна иметь вид `2^n + 1`, иначе рекурсия не ляжет на целую сетку.
/// Одинаковые сид и параметры дают побитово одинаковый результат.
pub fn generate_heightmap(seed: u64, width: u32, height: u32, noise: &NoiseSettings) -> Heightmap {
    let height = if height > width {
        tracing::warn!(width, height, "height exceeds width, clamping height to width");
        width
    } else {
        height
    };
    debug_assert!(
        width > 1 && (width - 1).is_power_of_two(),
        "width {width} is not 2^n + 1"
    );

    let size = width as usize;
    let mut data = vec![0.0_f32; size * size];

    let mut displacer = Displacer {
        data: &mut data,
        size,
        settings: noise,
        decay: 2.0_f32.powf(-noise.roughness),
        rng: ChaCha8Rng::seed_from_u64(seed),
    };
    let root = Region {
        left: 0,
        top: 0,
        right: size - 1,
        bottom: size - 1,
    };
    displacer.displace(root, noise.base_displacement, true);

    data.truncate(size * height as usize);
    let heightmap = Heightmap::from_data(width, height, data);

    let stats = heightmap.stats();
    tracing::debug!(
        seed,
        width,
        height,
        lowest = stats.lowest,
        highest = stats.highest,
        mean = stats.mean,
        midpoint = stats.midpoint,
        "heightmap synthesized"
    );
    heightmap
}
