//! Построение мешей по чанкам
//!
//! Карта режется на квадратные чанки `chunk_size × chunk_size`. Каждая клетка чанка
//! превращается в геометрию по своему типу: плоский квад для суши и воды, сглаженная
//! сетка для берега. Вершины между чанками не делятся, индексы локальны для чанка.

pub mod coast;
pub mod json;

use crate::config::MeshSettings;
use crate::heightmap::Heightmap;
use crate::terrain::{ClassificationGrid, TerrainType};
use serde::Serialize;

/// Меш одного чанка, готовый к передаче рендеру
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkMesh {
    pub chunk_x: u32,
    pub chunk_y: u32,
    /// Положение чанка в мире: `(chunk_x * chunk_size, 0, chunk_y * chunk_size)`
    pub world_offset: [f32; 3],
    /// Вершины в локальных координатах чанка
    pub vertices: Vec<[f32; 3]>,
    /// Индексы треугольников, относительно начала `vertices` этого чанка
    pub indices: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    /// Отладочный цвет: `(chunk_x / chunks_x, chunk_y / chunks_y, 0, 1)`
    pub tint: [f32; 4],
    /// Минимум и максимум сырой высоты внутри чанка
    pub elevation_range: (f32, f32),
}

impl ChunkMesh {
    /// Подпись вида `[x,y]`
    pub fn label(&self) -> String {
        format!("[{},{}]", self.chunk_x, self.chunk_y)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Где брать текстурные координаты плоского квада
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvSpace {
    /// От абсолютной позиции на карте: соседние чанки стыкуются без шва
    Absolute,
    /// От позиции внутри чанка
    Local,
}

/// Способ построения геометрии клетки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellGeometry {
    Skip,
    FlatQuad { height: f32, uv: UvSpace },
    CoastRamp,
}

impl CellGeometry {
    pub fn for_terrain(terrain: TerrainType, render_water: bool) -> Self {
        match terrain {
            TerrainType::Water | TerrainType::River if !render_water => CellGeometry::Skip,
            TerrainType::Water | TerrainType::River => CellGeometry::FlatQuad {
                height: terrain.nominal_height(),
                uv: UvSpace::Local,
            },
            TerrainType::Coast => CellGeometry::CoastRamp,
            TerrainType::Land
            | TerrainType::Hill
            | TerrainType::Mountain
            | TerrainType::Forest
            | TerrainType::Desert
            | TerrainType::Tundra
            | TerrainType::Swamp => CellGeometry::FlatQuad {
                height: terrain.nominal_height(),
                uv: UvSpace::Absolute,
            },
        }
    }
}

/// Буферы одного чанка; счётчик вершин локальный
#[derive(Debug, Default)]
pub(crate) struct ChunkBuilder {
    vertices: Vec<[f32; 3]>,
    indices: Vec<u32>,
    uvs: Vec<[f32; 2]>,
}

impl ChunkBuilder {
    fn next_index(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Плоский квад: вершины `(x,y) (x,y+1) (x+1,y+1) (x+1,y)`, треугольники `(0,1,2) (2,3,0)`
    fn push_quad(&mut self, x: f32, y: f32, height: f32, u: f32, v: f32) {
        let i = self.next_index();

        self.vertices.push([x, height, y]);
        self.vertices.push([x, height, y + 1.0]);
        self.vertices.push([x + 1.0, height, y + 1.0]);
        self.vertices.push([x + 1.0, height, y]);

        self.uvs.push([u, v + 1.0]);
        self.uvs.push([u, v]);
        self.uvs.push([u + 1.0, v]);
        self.uvs.push([u + 1.0, v + 1.0]);

        self.indices.extend_from_slice(&[i, i + 1, i + 2, i + 2, i + 3, i]);
    }
}

/// Строит меши всех чанков, по строкам чанков
///
/// # Panics
/// Если размеры классификации и карты высот различаются или `chunk_size` не делит их.
/// Параметры проверяются в [`crate::GenerationParameters::validate`].
pub fn build_chunk_meshes(
    classification: &ClassificationGrid,
    heightmap: &Heightmap,
    settings: &MeshSettings,
) -> Vec<ChunkMesh> {
    let (width, height) = (classification.width, classification.height);
    assert_eq!(
        (width, height),
        (heightmap.width, heightmap.height),
        "classification and heightmap sizes differ"
    );
    let chunk_size = settings.chunk_size;
    assert!(
        chunk_size > 0 && width % chunk_size == 0 && height % chunk_size == 0,
        "chunk size {chunk_size} does not tile {width}x{height}"
    );

    let chunks_x = width / chunk_size;
    let chunks_y = height / chunk_size;
    let mut chunks = Vec::with_capacity((chunks_x * chunks_y) as usize);

    for chunk_y in 0..chunks_y {
        for chunk_x in 0..chunks_x {
            let offset_x = chunk_x * chunk_size;
            let offset_y = chunk_y * chunk_size;
            let mut builder = ChunkBuilder::default();
            let mut lowest = f32::INFINITY;
            let mut highest = f32::NEG_INFINITY;

            for y in 0..chunk_size {
                for x in 0..chunk_size {
                    let abs_x = x + offset_x;
                    let abs_y = y + offset_y;

                    let elevation = heightmap.get(abs_x, abs_y);
                    lowest = lowest.min(elevation);
                    highest = highest.max(elevation);

                    let terrain = classification.get(abs_x, abs_y);
                    match CellGeometry::for_terrain(terrain, settings.render_water) {
                        CellGeometry::Skip => {}
                        CellGeometry::FlatQuad { height: h, uv } => {
                            let (u, v) = match uv {
                                UvSpace::Absolute => (abs_x, abs_y),
                                UvSpace::Local => (x, y),
                            };
                            builder.push_quad(x as f32, y as f32, h, u as f32, v as f32);
                        }
                        CellGeometry::CoastRamp => coast::push_coast_ramp(
                            &mut builder,
                            classification,
                            (x, y),
                            (abs_x, abs_y),
                            settings.coast_subdivisions,
                        ),
                    }
                }
            }

            chunks.push(ChunkMesh {
                chunk_x,
                chunk_y,
                world_offset: [offset_x as f32, 0.0, offset_y as f32],
                vertices: builder.vertices,
                indices: builder.indices,
                uvs: builder.uvs,
                tint: [
                    chunk_x as f32 / chunks_x as f32,
                    chunk_y as f32 / chunks_y as f32,
                    0.0,
                    1.0,
                ],
                elevation_range: (lowest, highest),
            });
        }
    }

    tracing::debug!(
        chunks = chunks.len(),
        vertices = chunks.iter().map(|c| c.vertices.len()).sum::<usize>(),
        triangles = chunks.iter().map(ChunkMesh::triangle_count).sum::<usize>(),
        "chunk meshes built"
    );
    chunks
}

/// Как [`build_chunk_meshes`], но без карты высот или классификации ничего не делает
///
/// Отсутствие данных не ошибка: пишется предупреждение и возвращается `None`.
pub fn build_chunk_meshes_if_ready(
    classification: Option<&ClassificationGrid>,
    heightmap: Option<&Heightmap>,
    settings: &MeshSettings,
) -> Option<Vec<ChunkMesh>> {
    match (classification, heightmap) {
        (Some(classification), Some(heightmap)) => {
            Some(build_chunk_meshes(classification, heightmap, settings))
        }
        _ => {
            tracing::warn!("tried to build terrain meshes, but no heightmap has been generated");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(width: u32, height: u32, data: Vec<TerrainType>) -> ClassificationGrid {
        ClassificationGrid {
            width,
            height,
            data,
        }
    }

    fn mesh_settings(chunk_size: u32, render_water: bool) -> MeshSettings {
        MeshSettings {
            chunk_size,
            render_water,
            coast_subdivisions: 4,
        }
    }

    #[test]
    fn test_chunk_count_and_offsets() {
        let grid = grid_of(6, 4, vec![TerrainType::Land; 24]);
        let heights = Heightmap::new(6, 4);
        let chunks = build_chunk_meshes(&grid, &heights, &mesh_settings(2, true));
        assert_eq!(chunks.len(), 6);

        let last = &chunks[5];
        assert_eq!((last.chunk_x, last.chunk_y), (2, 1));
        assert_eq!(last.world_offset, [4.0, 0.0, 2.0]);
        assert_eq!(last.label(), "[2,1]");
        assert_eq!(chunks[4].tint, [1.0 / 3.0, 0.5, 0.0, 1.0]);

        for chunk in &chunks {
            assert_eq!(chunk.vertices.len(), 16);
            assert_eq!(chunk.uvs.len(), 16);
            assert_eq!(chunk.indices.len(), 24);
        }
    }

    #[test]
    fn test_land_quad_layout() {
        let grid = grid_of(2, 2, vec![TerrainType::Land; 4]);
        let heights = Heightmap::new(2, 2);
        let chunks = build_chunk_meshes(&grid, &heights, &mesh_settings(1, true));
        let chunk = &chunks[3];

        assert_eq!(
            chunk.vertices,
            vec![
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [1.0, 1.0, 0.0]
            ]
        );
        assert_eq!(chunk.indices, vec![0, 1, 2, 2, 3, 0]);
        // UV суши от абсолютной позиции (1, 1)
        assert_eq!(
            chunk.uvs,
            vec![[1.0, 2.0], [1.0, 1.0], [2.0, 1.0], [2.0, 2.0]]
        );
    }

    #[test]
    fn test_water_uses_local_uvs_or_is_skipped() {
        let grid = grid_of(2, 2, vec![TerrainType::Water; 4]);
        let heights = Heightmap::new(2, 2);

        let shown = build_chunk_meshes(&grid, &heights, &mesh_settings(1, true));
        assert_eq!(shown[3].vertices[0], [0.0, 0.0, 0.0]);
        assert_eq!(shown[3].uvs[0], [0.0, 1.0]);

        let hidden = build_chunk_meshes(&grid, &heights, &mesh_settings(1, false));
        assert_eq!(hidden.len(), 4);
        assert!(hidden.iter().all(ChunkMesh::is_empty));
        assert!(hidden.iter().all(|c| c.indices.is_empty()));
    }

    #[test]
    fn test_indices_are_chunk_local() {
        use TerrainType::*;
        let grid = grid_of(4, 2, vec![Land, Water, Land, Land, Water, Land, Land, Water]);
        let heights = Heightmap::new(4, 2);
        let chunks = build_chunk_meshes(&grid, &heights, &mesh_settings(2, false));
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            let max = chunk.indices.iter().copied().max().unwrap_or(0) as usize;
            assert!(max < chunk.vertices.len());
            assert_eq!(chunk.indices.len() % 3, 0);
        }
        assert_eq!(chunks[0].vertices.len(), 8);
        assert_eq!(chunks[1].vertices.len(), 12);
    }

    #[test]
    fn test_elevation_range_per_chunk() {
        let heights = Heightmap::from_data(2, 1, vec![-2.0, 5.0]);
        let grid = grid_of(2, 1, vec![TerrainType::Land; 2]);
        let chunks = build_chunk_meshes(&grid, &heights, &mesh_settings(1, true));
        assert_eq!(chunks[0].elevation_range, (-2.0, -2.0));
        assert_eq!(chunks[1].elevation_range, (5.0, 5.0));
    }

    #[test]
    fn test_missing_input_is_nothing_to_do() {
        let grid = grid_of(1, 1, vec![TerrainType::Land]);
        assert!(build_chunk_meshes_if_ready(Some(&grid), None, &mesh_settings(1, true)).is_none());
        assert!(build_chunk_meshes_if_ready(None, None, &mesh_settings(1, true)).is_none());

        let heights = Heightmap::new(1, 1);
        let built =
            build_chunk_meshes_if_ready(Some(&grid), Some(&heights), &mesh_settings(1, true));
        assert_eq!(built.map(|c| c.len()), Some(1));
    }

    #[test]
    #[should_panic(expected = "does not tile")]
    fn test_non_dividing_chunk_size_panics() {
        let grid = grid_of(3, 3, vec![TerrainType::Land; 9]);
        let heights = Heightmap::new(3, 3);
        build_chunk_meshes(&grid, &heights, &mesh_settings(2, true));
    }
}
