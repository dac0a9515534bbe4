use super::ChunkBuilder;
use crate::terrain::ClassificationGrid;

/// Кубический smoothstep на `[0, 1]`
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Высоты соседей слева и справа от береговой клетки.
///
/// За краем карты берётся сама клетка (координата прижимается), поэтому у края
/// склон начинается с высоты берега.
pub fn ramp_endpoints(grid: &ClassificationGrid, abs_x: u32, abs_y: u32) -> (f32, f32) {
    let (x, y) = (i64::from(abs_x), i64::from(abs_y));
    (
        grid.get_clamped(x - 1, y).nominal_height(),
        grid.get_clamped(x + 1, y).nominal_height(),
    )
}

/// Береговая клетка: сетка `n × n` вершин, высота плавно идёт от левого соседа к правому.
/// Каждая ячейка сетки получает те же два треугольника `(0,1,2) (2,3,0)`, что и плоский квад.
pub(crate) fn push_coast_ramp(
    builder: &mut ChunkBuilder,
    grid: &ClassificationGrid,
    (x, y): (u32, u32),
    (abs_x, abs_y): (u32, u32),
    n: usize,
) {
    debug_assert!(n >= 2, "coast sub-grid needs at least 2 vertices per side");
    let (left, right) = ramp_endpoints(grid, abs_x, abs_y);
    let base = builder.next_index();
    let last = (n - 1) as f32;

    for j in 0..n {
        let s = j as f32 / last;
        for i in 0..n {
            let t = i as f32 / last;
            let h = left + (right - left) * smoothstep(t);
            builder.vertices.push([x as f32 + t, h, y as f32 + s]);
            builder.uvs.push([abs_x as f32 + t, abs_y as f32 + s]);
        }
    }

    let n = n as u32;
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = base + j * n + i;
            let b = a + n;
            let c = b + 1;
            let d = a + 1;
            builder.indices.extend_from_slice(&[a, b, c, c, d, a]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ChunkMesh, build_chunk_meshes};
    use super::*;
    use crate::config::MeshSettings;
    use crate::heightmap::Heightmap;
    use crate::terrain::TerrainType;

    fn single_row(data: Vec<TerrainType>) -> ClassificationGrid {
        ClassificationGrid {
            width: data.len() as u32,
            height: 1,
            data,
        }
    }

    fn mesh_row(grid: &ClassificationGrid, n: usize) -> Vec<ChunkMesh> {
        let heights = Heightmap::new(grid.width, grid.height);
        build_chunk_meshes(
            grid,
            &heights,
            &MeshSettings {
                chunk_size: 1,
                render_water: false,
                coast_subdivisions: n,
            },
        )
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn test_ramp_descends_from_land_to_water() {
        use TerrainType::*;
        let grid = single_row(vec![Land, Coast, Water]);
        let chunks = mesh_row(&grid, 15);
        let coast = &chunks[1];

        assert_eq!(coast.vertices.len(), 15 * 15);
        assert_eq!(coast.indices.len(), 6 * 14 * 14);
        for row in coast.vertices.chunks(15) {
            assert_eq!(row[0][1], 1.0);
            assert_eq!(row[14][1], 0.0);
            assert!(row.windows(2).all(|w| w[1][1] <= w[0][1]));
        }
        assert_eq!(coast.vertices[224], [1.0, 0.0, 1.0]);
        assert_eq!(coast.uvs[224], [2.0, 1.0]);
    }

    #[test]
    fn test_sub_grid_winding_matches_quad() {
        use TerrainType::*;
        let grid = single_row(vec![Water, Coast, Water]);
        let chunks = mesh_row(&grid, 2);
        let coast = &chunks[1];
        assert!(chunks[0].is_empty());
        assert_eq!(coast.indices, vec![0, 2, 3, 3, 1, 0]);
        // Вершины 0, 2, 3, 1 совпадают с порядком плоского квада
        assert_eq!(coast.vertices[0], [0.0, 0.0, 0.0]);
        assert_eq!(coast.vertices[2], [0.0, 0.0, 1.0]);
        assert_eq!(coast.vertices[3], [1.0, 0.0, 1.0]);
        assert_eq!(coast.vertices[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_map_edge_clamps_to_own_height() {
        use TerrainType::*;
        let grid = single_row(vec![Coast, Land]);
        assert_eq!(ramp_endpoints(&grid, 0, 0), (0.5, 1.0));
        let grid = single_row(vec![Water, Coast]);
        assert_eq!(ramp_endpoints(&grid, 1, 0), (0.0, 0.5));
    }
}
