// src/config.rs
//! Конфигурация генерации рельефа
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размеры сетки и чанков
//! - Параметры diamond-square (смещение, шероховатость, сплющенные полюса)
//! - Уровень воды и высотные пояса классификации
//! - Настройки построения мешей
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use crate::error::{ConfigError, TerrainError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Параметры синтеза карты высот (diamond-square)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseSettings {
    /// Начальная амплитуда случайного смещения
    #[serde(default = "default_base_displacement")]
    pub base_displacement: f32,

    /// Показатель затухания `k`: на каждом уровне рекурсии смещение умножается на `2^-k`.
    /// - `<0.75` → шероховатый рельеф,
    /// - `>0.9` → гладкий рельеф.
    #[serde(default = "default_roughness")]
    pub roughness: f32,

    /// Высота, которой засевается центр карты на корневом шаге
    #[serde(default = "default_base_elevation")]
    pub base_elevation: f32,

    /// Прижимать середины верхнего и нижнего края карты к нулю (плоские полюса)
    #[serde(default = "default_flatten_poles")]
    pub flatten_poles: bool,

    /// Округлять смещение вниз до целого (ступенчатый рельеф)
    #[serde(default)]
    pub integer_displacement: bool,
}

fn default_base_displacement() -> f32 {
    64.0
}
fn default_roughness() -> f32 {
    0.8
}
fn default_base_elevation() -> f32 {
    32.0
}
fn default_flatten_poles() -> bool {
    true
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            base_displacement: 64.0,
            roughness: 0.8,
            base_elevation: 32.0,
            flatten_poles: true,
            integer_displacement: false,
        }
    }
}

/// Параметры классификации клеток
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationSettings {
    /// Уровень воды в процентах от диапазона высот (0 = только минимумы, 100 = всё под водой)
    #[serde(default = "default_water_level_percent")]
    pub water_level_percent: f32,

    /// Суша выше этого процента становится холмами (`None` = без холмов)
    #[serde(default)]
    pub hill_level_percent: Option<f32>,

    /// Суша выше этого процента становится горами (`None` = без гор)
    #[serde(default)]
    pub mountain_level_percent: Option<f32>,
}

fn default_water_level_percent() -> f32 {
    50.0
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            water_level_percent: 50.0,
            hill_level_percent: None,
            mountain_level_percent: None,
        }
    }
}

/// Параметры построения мешей чанков
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeshSettings {
    /// Размер чанка в клетках (чанк `chunk_size × chunk_size`)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Строить ли геометрию для воды (`false` — водные клетки пропускаются)
    #[serde(default = "default_render_water")]
    pub render_water: bool,

    /// Число вершин по стороне береговой ячейки (сетка `N × N`)
    #[serde(default = "default_coast_subdivisions")]
    pub coast_subdivisions: usize,
}

fn default_chunk_size() -> u32 {
    13
}
fn default_render_water() -> bool {
    true
}
fn default_coast_subdivisions() -> usize {
    15
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            chunk_size: 13,
            render_water: true,
            coast_subdivisions: 15,
        }
    }
}

/// Основные параметры генерации рельефа
///
/// Полная конфигурация для одного прохода генерации. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationParameters {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Ширина сетки в клетках, вида `2^n + 1` (по умолчанию 65)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота сетки в клетках, не больше ширины (по умолчанию 65)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Параметры diamond-square
    #[serde(default)]
    pub noise: NoiseSettings,

    /// Параметры классификации
    #[serde(default)]
    pub classification: ClassificationSettings,

    /// Параметры мешей
    #[serde(default)]
    pub mesh: MeshSettings,
}

impl GenerationParameters {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # terrain.toml
    /// seed = 42
    /// width = 33
    /// height = 33
    ///
    /// [mesh]
    /// chunk_size = 11
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, TerrainError> {
        let params: Self = toml::from_str(contents)?;
        Ok(params)
    }

    /// Нормализует параметры: высота не может превышать ширину.
    ///
    /// Синтез работает в квадратной области `width × width`, поэтому лишние строки
    /// отбрасываются. Это шаг нормализации, а не ошибка; факт обрезки логируется.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.height > self.width {
            tracing::warn!(
                width = self.width,
                height = self.height,
                "height exceeds width, clamping height to width"
            );
            self.height = self.width;
        }
        self
    }

    /// Проверяет параметры. Вызывать после [`Self::normalized`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::NonPositive { name: "width" });
        }
        if self.height == 0 {
            return Err(ConfigError::NonPositive { name: "height" });
        }
        let chunk_size = self.mesh.chunk_size;
        if chunk_size == 0 {
            return Err(ConfigError::NonPositive { name: "chunk_size" });
        }
        if !(self.width - 1).is_power_of_two() {
            return Err(ConfigError::WidthNotPowerOfTwoPlusOne(self.width));
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value % chunk_size != 0 {
                return Err(ConfigError::ChunkSizeMismatch {
                    name,
                    value,
                    chunk_size,
                });
            }
        }

        let percents = [
            ("water_level_percent", Some(self.classification.water_level_percent)),
            ("hill_level_percent", self.classification.hill_level_percent),
            ("mountain_level_percent", self.classification.mountain_level_percent),
        ];
        for (name, value) in percents {
            match value {
                Some(value) if !(0.0..=100.0).contains(&value) => {
                    return Err(ConfigError::PercentOutOfRange { name, value });
                }
                _ => {}
            }
        }

        if self.mesh.coast_subdivisions < 2 {
            return Err(ConfigError::CoastSubdivisions(self.mesh.coast_subdivisions));
        }
        Ok(())
    }
}

fn default_seed() -> u64 {
    1337
}
fn default_width() -> u32 {
    65
}
fn default_height() -> u32 {
    65
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            seed: 1337,
            width: 65,
            height: 65,
            noise: NoiseSettings::default(),
            classification: ClassificationSettings::default(),
            mesh: MeshSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GenerationParameters {
        GenerationParameters {
            width: 9,
            height: 9,
            mesh: MeshSettings {
                chunk_size: 3,
                ..MeshSettings::default()
            },
            ..GenerationParameters::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(GenerationParameters::default().validate(), Ok(()));
        assert_eq!(small().validate(), Ok(()));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let params = GenerationParameters::from_toml_str(
            "seed = 42\nwidth = 33\nheight = 11\n\n[mesh]\nchunk_size = 11\nrender_water = false\n",
        )
        .unwrap();
        assert_eq!(params.seed, 42);
        assert_eq!(params.height, 11);
        assert_eq!(params.mesh.chunk_size, 11);
        assert!(!params.mesh.render_water);
        assert_eq!(params.mesh.coast_subdivisions, 15);
        assert_eq!(params.noise, NoiseSettings::default());
        assert_eq!(params.classification.water_level_percent, 50.0);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_height_is_clamped_to_width() {
        let params = GenerationParameters {
            height: 18,
            ..small()
        }
        .normalized();
        assert_eq!(params.height, 9);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let zero_chunk = GenerationParameters {
            mesh: MeshSettings {
                chunk_size: 0,
                ..MeshSettings::default()
            },
            ..small()
        };
        assert_eq!(
            zero_chunk.validate(),
            Err(ConfigError::NonPositive { name: "chunk_size" })
        );

        let bad_width = GenerationParameters {
            width: 12,
            height: 12,
            ..small()
        };
        assert_eq!(
            bad_width.validate(),
            Err(ConfigError::WidthNotPowerOfTwoPlusOne(12))
        );

        let bad_height = GenerationParameters {
            height: 4,
            ..small()
        };
        assert_eq!(
            bad_height.validate(),
            Err(ConfigError::ChunkSizeMismatch {
                name: "height",
                value: 4,
                chunk_size: 3
            })
        );

        let mut flooded = small();
        flooded.classification.water_level_percent = 120.0;
        assert!(matches!(
            flooded.validate(),
            Err(ConfigError::PercentOutOfRange { .. })
        ));
    }
}
