use super::ChunkMesh;
use crate::error::TerrainError;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Сохраняет меши чанков в JSON (массив объектов `ChunkMesh`)
pub fn save_meshes_as_json(chunks: &[ChunkMesh], path: &str) -> Result<(), TerrainError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, chunks)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_serializes_with_field_names() {
        let chunk = ChunkMesh {
            chunk_x: 1,
            chunk_y: 0,
            world_offset: [3.0, 0.0, 0.0],
            vertices: vec![[0.0, 1.0, 0.0]],
            indices: vec![0, 0, 0],
            uvs: vec![[0.0, 0.0]],
            tint: [0.5, 0.0, 0.0, 1.0],
            elevation_range: (0.0, 2.0),
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["chunk_x"], 1);
        assert_eq!(value["world_offset"][0], 3.0);
        assert_eq!(value["indices"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["elevation_range"][1], 2.0);
    }

    #[test]
    fn test_save_meshes_as_json() {
        let path = std::env::temp_dir().join(format!("terragen-meshes-{}.json", std::process::id()));
        let path = path.to_str().unwrap().to_owned();
        save_meshes_as_json(&[], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "[]");
        std::fs::remove_file(&path).unwrap();
    }
}
