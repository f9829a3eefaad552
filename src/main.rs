use eyre::WrapErr;
use libmetro::classify::MapData;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter("libmetro=debug")
        .init();

    let input = std::env::args().nth(1).unwrap_or_else(|| "map.json".to_string());
    let output = std::env::args().nth(2).unwrap_or_else(|| "map.svg".to_string());
    let line_size = std::env::args()
        .nth(3)
        .map(|raw| {
            raw.parse()
                .wrap_err_with(|| format!("invalid line size {raw:?}"))
        })
        .transpose()?
        .unwrap_or(1.0);

    let file = std::fs::File::open(&input).wrap_err_with(|| format!("opening {input}"))?;
    let map: MapData = serde_json::from_reader(file).wrap_err("parsing map data")?;

    let svg = std::fs::File::create(&output).wrap_err_with(|| format!("creating {output}"))?;
    libmetro::map2svg_styled(map, svg, line_size)?;

    Ok(())
}
