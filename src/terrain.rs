use crate::config::ClassificationSettings;
use crate::error::TerrainError;
use crate::heightmap::{HeightStats, Heightmap};
use serde::{Deserialize, Serialize};

/// Тип клетки (plot). Классификатор вычисляет `Water`, `Land`, `Coast` и высотные пояса
/// `Hill`/`Mountain`; остальные варианты зарезервированы под расширения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    Water,
    Land,
    Coast,
    Hill,
    Mountain,
    Forest,
    Desert,
    Tundra,
    Swamp,
    River,
}

impl TerrainType {
    pub const ALL: [TerrainType; 10] = [
        TerrainType::Water,
        TerrainType::Land,
        TerrainType::Coast,
        TerrainType::Hill,
        TerrainType::Mountain,
        TerrainType::Forest,
        TerrainType::Desert,
        TerrainType::Tundra,
        TerrainType::Swamp,
        TerrainType::River,
    ];

    /// Условная высота для рендера (не связана с сырой высотой карты)
    #[must_use]
    pub fn nominal_height(self) -> f32 {
        match self {
            TerrainType::Water | TerrainType::River => 0.0,
            TerrainType::Coast => 0.5,
            TerrainType::Swamp => 0.75,
            TerrainType::Land
            | TerrainType::Forest
            | TerrainType::Desert
            | TerrainType::Tundra => 1.0,
            TerrainType::Hill => 1.5,
            TerrainType::Mountain => 2.0,
        }
    }

    /// Клетка ниже уровня воды (вода, берег или река)
    #[must_use]
    pub fn is_submerged(self) -> bool {
        matches!(
            self,
            TerrainType::Water | TerrainType::Coast | TerrainType::River
        )
    }

    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            TerrainType::Water => [0, 64, 128],
            TerrainType::River => [40, 100, 200],
            TerrainType::Coast => [210, 200, 140],
            TerrainType::Land => [150, 200, 100],
            TerrainType::Hill => [120, 150, 80],
            TerrainType::Mountain => [150, 150, 150],
            TerrainType::Forest => [60, 120, 60],
            TerrainType::Desert => [200, 180, 120],
            TerrainType::Tundra => [200, 220, 180],
            TerrainType::Swamp => [80, 100, 60],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationGrid {
    pub width: u32,
    pub height: u32,
    pub data: Vec<TerrainType>,
}

impl ClassificationGrid {
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> TerrainType {
        self.data[self.index(x, y)]
    }

    /// Тип клетки по координатам, которые могут выйти за край: прижимаются к краю, без заворота
    pub fn get_clamped(&self, x: i64, y: i64) -> TerrainType {
        let cx = x.clamp(0, i64::from(self.width) - 1) as u32;
        let cy = y.clamp(0, i64::from(self.height) - 1) as u32;
        self.get(cx, cy)
    }

    /// Количество клеток каждого типа (типы с нулём опускаются)
    pub fn counts(&self) -> Vec<(TerrainType, usize)> {
        TerrainType::ALL
            .iter()
            .map(|&t| (t, self.data.iter().filter(|&&d| d == t).count()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    pub fn to_rgba_image(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|&t| {
                let rgb = t.to_rgb();
                [rgb[0], rgb[1], rgb[2], 255] // RGBA
            })
            .collect()
    }

    pub fn save_as_png(&self, path: &str) -> Result<(), TerrainError> {
        let img: image::ImageBuffer<image::Rgba<u8>, Vec<u8>> =
            image::ImageBuffer::from_raw(self.width, self.height, self.to_rgba_image()).ok_or(
                TerrainError::ImageBuffer {
                    width: self.width,
                    height: self.height,
                },
            )?;
        img.save(path)?;
        Ok(())
    }
}

/// Абсолютный порог воды: `percent / 100 * (highest - lowest) + lowest`
#[must_use]
pub fn water_threshold(stats: &HeightStats, percent: f32) -> f32 {
    percent / 100.0 * (stats.highest - stats.lowest) + stats.lowest
}

/// Классифицирует клетки карты высот
///
/// 1. Минимум и максимум высот.
/// 2. `Water` там, где высота `<=` порога, иначе `Land`.
/// 3. Вода с сушей среди 8 соседей становится `Coast`. Читается результат шага 2,
///    пишется отдельный буфер, поэтому берег не распространяется дальше одной клетки.
/// 4. Необязательные высотные пояса переводят сушу в `Hill`/`Mountain`.
pub fn classify_terrain(
    heightmap: &Heightmap,
    settings: &ClassificationSettings,
) -> ClassificationGrid {
    let stats = heightmap.stats();
    let threshold = water_threshold(&stats, settings.water_level_percent);

    let base = ClassificationGrid {
        width: heightmap.width,
        height: heightmap.height,
        data: heightmap
            .data
            .iter()
            .map(|&h| {
                if h <= threshold {
                    TerrainType::Water
                } else {
                    TerrainType::Land
                }
            })
            .collect(),
    };

    let mut data = base.data.clone();
    for y in 0..base.height {
        for x in 0..base.width {
            let idx = base.index(x, y);
            if base.data[idx] == TerrainType::Water && touches_land(&base, x, y) {
                data[idx] = TerrainType::Coast;
            }
        }
    }

    let hill = settings
        .hill_level_percent
        .map(|p| water_threshold(&stats, p));
    let mountain = settings
        .mountain_level_percent
        .map(|p| water_threshold(&stats, p));
    if hill.is_some() || mountain.is_some() {
        for (t, &h) in data.iter_mut().zip(&heightmap.data) {
            if *t != TerrainType::Land {
                continue;
            }
            if mountain.is_some_and(|m| h > m) {
                *t = TerrainType::Mountain;
            } else if hill.is_some_and(|m| h > m) {
                *t = TerrainType::Hill;
            }
        }
    }

    let grid = ClassificationGrid {
        width: base.width,
        height: base.height,
        data,
    };
    tracing::debug!(threshold, counts = ?grid.counts(), "terrain classified");
    grid
}

fn touches_land(grid: &ClassificationGrid, x: u32, y: u32) -> bool {
    let (x, y) = (i64::from(x), i64::from(y));
    (-1..=1).any(|dy| {
        (-1..=1).any(|dx| {
            (dx != 0 || dy != 0) && grid.get_clamped(x + dx, y + dy) == TerrainType::Land
        })
    })
}
