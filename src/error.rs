//! Ошибки генератора рельефа
//!
//! `ConfigError` описывает недопустимые параметры генерации и исправляется вызывающей
//! стороной до повторного вызова `regenerate()`. `TerrainError` объединяет ошибки
//! ввода-вывода вокруг ядра: чтение конфигурации и отладочный экспорт.

use thiserror::Error;

/// Недопустимые параметры генерации.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Нулевой размер сетки или чанка.
    #[error("{name} must be positive")]
    NonPositive {
        /// Имя параметра (`width`, `height`, `chunk_size`).
        name: &'static str,
    },

    /// Размер чанка не делит размер сетки нацело.
    #[error("chunk_size {chunk_size} does not divide {name} {value}")]
    ChunkSizeMismatch {
        /// Имя измерения сетки.
        name: &'static str,
        /// Значение измерения.
        value: u32,
        /// Размер чанка.
        chunk_size: u32,
    },

    /// Ширина не имеет вида `2^n + 1`, diamond-square не сойдётся на целых координатах.
    #[error("width {0} is not of the form 2^n + 1")]
    WidthNotPowerOfTwoPlusOne(u32),

    /// Уровень воды вне диапазона `[0, 100]`.
    #[error("{name} {value} is outside [0, 100]")]
    PercentOutOfRange {
        /// Имя параметра.
        name: &'static str,
        /// Значение.
        value: f32,
    },

    /// Число подразбиений береговой ячейки меньше 2.
    #[error("coast_subdivisions must be at least 2, got {0}")]
    CoastSubdivisions(usize),
}

/// Ошибки окружения ядра: файлы конфигурации и экспорт.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// Недопустимые параметры.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Ошибка файловой системы.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Некорректный TOML.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Ошибка кодирования изображения.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Ошибка сериализации мешей.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Буфер пикселей не совпал с размерами изображения.
    #[error("failed to create image buffer {width}x{height}")]
    ImageBuffer {
        /// Ширина.
        width: u32,
        /// Высота.
        height: u32,
    },
}
