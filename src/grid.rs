//! Оркестратор генерации
//!
//! `TerrainGrid` владеет картой высот, классификацией и мешами чанков. Каждый вызов
//! [`TerrainGrid::regenerate`] полностью перестраивает мир и подменяет старый снимок
//! новым одним присваиванием, так что читатели не видят полупостроенного состояния.

use crate::config::GenerationParameters;
use crate::error::ConfigError;
use crate::heightmap::{HeightStats, Heightmap, generate_heightmap};
use crate::mesh::{ChunkMesh, build_chunk_meshes, build_chunk_meshes_if_ready};
use crate::terrain::{ClassificationGrid, classify_terrain};

/// Результат одного прохода генерации
#[derive(Debug, Clone)]
pub struct TerrainSnapshot {
    pub heightmap: Heightmap,
    pub classification: ClassificationGrid,
    pub chunks: Vec<ChunkMesh>,
    pub stats: HeightStats,
    /// Параметры, с которыми снимок построен (уже нормализованные)
    pub params: GenerationParameters,
}

#[derive(Debug, Clone, Default)]
pub enum GridState {
    #[default]
    Uninitialized,
    Ready(Box<TerrainSnapshot>),
}

#[derive(Debug, Clone, Default)]
pub struct TerrainGrid {
    params: GenerationParameters,
    state: GridState,
    generation: u64,
}

impl TerrainGrid {
    pub fn new(params: GenerationParameters) -> Self {
        Self {
            params,
            state: GridState::Uninitialized,
            generation: 0,
        }
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.params
    }

    /// Новые параметры вступают в силу со следующего [`Self::regenerate`]
    pub fn set_parameters(&mut self, params: GenerationParameters) {
        self.params = params;
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GridState::Ready(_))
    }

    /// Сколько раз мир был сгенерирован
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Option<&TerrainSnapshot> {
        match &self.state {
            GridState::Ready(snapshot) => Some(&**snapshot),
            GridState::Uninitialized => None,
        }
    }

    pub fn heightmap(&self) -> Option<&Heightmap> {
        self.snapshot().map(|s| &s.heightmap)
    }

    pub fn classification(&self) -> Option<&ClassificationGrid> {
        self.snapshot().map(|s| &s.classification)
    }

    pub fn chunks(&self) -> &[ChunkMesh] {
        self.snapshot().map_or(&[], |s| s.chunks.as_slice())
    }

    /// Ширина опубликованных массивов; до первой генерации — ширина из параметров
    fn published_width(&self) -> u32 {
        self.heightmap().map_or(self.params.width, |h| h.width)
    }

    /// Индекс клетки `(x, y)` в опубликованных карте высот и классификации.
    /// Параметры, заданные после последней генерации, на индексацию не влияют.
    pub fn index(&self, x: u32, y: u32) -> usize {
        match self.heightmap() {
            Some(heightmap) => heightmap.index(x, y),
            None => y as usize * self.params.width as usize + x as usize,
        }
    }

    /// Обратное к [`Self::index`]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let width = self.published_width() as usize;
        ((idx % width) as u32, (idx / width) as u32)
    }

    /// Полная перегенерация: нормализация и проверка параметров, синтез, классификация, меши.
    ///
    /// При ошибке параметров прежний снимок остаётся нетронутым.
    pub fn regenerate(&mut self) -> Result<&TerrainSnapshot, ConfigError> {
        let params = self.params.clone().normalized();
        params.validate()?;
        self.params = params.clone();

        let heightmap = generate_heightmap(params.seed, params.width, params.height, &params.noise);
        let stats = heightmap.stats();
        let classification = classify_terrain(&heightmap, &params.classification);
        let chunks = build_chunk_meshes(&classification, &heightmap, &params.mesh);

        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            seed = params.seed,
            width = params.width,
            height = params.height,
            chunks = chunks.len(),
            "terrain regenerated"
        );

        let snapshot = Box::new(TerrainSnapshot {
            heightmap,
            classification,
            chunks,
            stats,
            params,
        });
        self.state = GridState::Ready(snapshot);
        let GridState::Ready(snapshot) = &self.state else {
            unreachable!("state was just set to ready")
        };
        Ok(&**snapshot)
    }

    /// Перестраивает только меши текущего снимка с текущими настройками `mesh`
    /// (например, после переключения `render_water`).
    ///
    /// Без сгенерированного мира ничего не делает и возвращает `Ok(None)`.
    pub fn rebuild_meshes(&mut self) -> Result<Option<&[ChunkMesh]>, ConfigError> {
        let mesh = self.params.mesh.clone();
        let GridState::Ready(snapshot) = &mut self.state else {
            tracing::warn!("tried to build terrain meshes, but no heightmap has been generated");
            return Ok(None);
        };

        let mut params = snapshot.params.clone();
        params.mesh = mesh;
        params.validate()?;

        let chunks = build_chunk_meshes_if_ready(
            Some(&snapshot.classification),
            Some(&snapshot.heightmap),
            &params.mesh,
        );
        if let Some(chunks) = chunks {
            snapshot.chunks = chunks;
            snapshot.params = params;
        }
        Ok(Some(snapshot.chunks.as_slice()))
    }
}
