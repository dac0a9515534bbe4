use clap::Parser;
use std::path::PathBuf;
use terragen::mesh::json::save_meshes_as_json;
use terragen::{GenerationParameters, TerrainGrid};

/// Генератор рельефа: карта высот, классификация клеток и меши чанков
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию встроенные параметры)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Переопределить сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Путь для сохранения height.png
    #[arg(long, default_value = "height.png")]
    height_output: PathBuf,

    /// Путь для сохранения terrain.png (классификация клеток)
    #[arg(long, default_value = "terrain.png")]
    terrain_output: PathBuf,

    /// Путь для сохранения мешей чанков в JSON
    #[arg(long)]
    meshes: Option<PathBuf>,

    /// Сколько раз перегенерировать мир (как повторное нажатие клавиши)
    #[arg(long, default_value_t = 1)]
    regenerations: u32,
}

fn path_str(path: &std::path::Path) -> Result<&str, Box<dyn std::error::Error>> {
    path.to_str()
        .ok_or_else(|| format!("path is not valid UTF-8: {}", path.display()).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let mut params = match &cli.config {
        Some(path) => GenerationParameters::from_toml_file(path)?,
        None => GenerationParameters::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }

    println!(
        "Генерация рельефа (размер: {}×{}, чанк: {}, сид: {})...",
        params.width, params.height, params.mesh.chunk_size, params.seed
    );
    let mut grid = TerrainGrid::new(params);
    for _ in 0..cli.regenerations.max(1) {
        grid.regenerate()?;
    }
    let snapshot = grid
        .snapshot()
        .ok_or("terrain was not generated")?;

    println!(
        "Высоты: {:.2}..{:.2}, среднее {:.2}, середина {:.2}",
        snapshot.stats.lowest, snapshot.stats.highest, snapshot.stats.mean, snapshot.stats.midpoint
    );
    for (terrain, count) in snapshot.classification.counts() {
        println!("  {terrain:?}: {count}");
    }
    let vertices: usize = snapshot.chunks.iter().map(|c| c.vertices.len()).sum();
    println!(
        "Чанков: {}, вершин: {}, поколение: {}",
        snapshot.chunks.len(),
        vertices,
        grid.generation()
    );

    println!("Сохранение в {:?}", cli.height_output);
    snapshot.heightmap.save_as_png(path_str(&cli.height_output)?)?;

    println!("Сохранение в {:?}", cli.terrain_output);
    snapshot
        .classification
        .save_as_png(path_str(&cli.terrain_output)?)?;

    if let Some(path) = &cli.meshes {
        println!("Сохранение мешей в {path:?}");
        save_meshes_as_json(&snapshot.chunks, path_str(path)?)?;
    }

    println!("\nГотово! Рельеф сохранён.");
    Ok(())
}
