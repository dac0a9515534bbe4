pub mod config;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod mesh;
pub mod terrain;

pub use config::{ClassificationSettings, GenerationParameters, MeshSettings, NoiseSettings};
pub use error::{ConfigError, TerrainError};
pub use grid::{GridState, TerrainGrid, TerrainSnapshot};
pub use heightmap::{HeightStats, Heightmap, generate_heightmap};
pub use mesh::{CellGeometry, ChunkMesh, UvSpace, build_chunk_meshes};
pub use terrain::{ClassificationGrid, TerrainType, classify_terrain};
