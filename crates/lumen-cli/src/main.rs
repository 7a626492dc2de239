mod io;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lumen_core::{EdgePolicy, GaussianParams, Image2D, LumenConfig, Vec2, VolumeFilter};
use lumen_fx::{render, GaussianBlurKernel, RadialBlurKernel};

#[derive(Parser)]
#[command(
    name = "lumen",
    version,
    about = "Lumen - Gaussian and light-shaft post-process passes for still images"
)]
struct Cli {
    /// TOML or JSON file with pass parameters; flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EdgeArg {
    Clamp,
    Transparent,
}

impl From<EdgeArg> for EdgePolicy {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Clamp => EdgePolicy::ClampToEdge,
            EdgeArg::Transparent => EdgePolicy::Transparent,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Directional Gaussian blur
    Gauss {
        /// Source image
        input: PathBuf,
        /// Destination image (format from extension)
        output: PathBuf,

        /// Blur direction as "x,y" (default from config, else 1,0)
        #[arg(long, value_parser = parse_vec2)]
        direction: Option<Vec2>,

        /// Tap offset multiplier
        #[arg(long)]
        radius: Option<f32>,

        /// Run a horizontal pass followed by a vertical pass
        #[arg(long)]
        separable: bool,

        /// Destination size relative to the source
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        #[arg(long, value_enum)]
        edge: Option<EdgeArg>,
    },

    /// Radial light shafts with occluder separation and color grading
    Radial {
        /// Source image; alpha > 0 marks light, alpha 0 marks occluders
        input: PathBuf,
        /// Destination image (format from extension)
        output: PathBuf,

        /// Focal point as normalized "x,y"
        #[arg(long, value_parser = parse_vec2)]
        center: Option<Vec2>,

        #[arg(long)]
        density: Option<f32>,

        #[arg(long)]
        positive_weight: Option<f32>,

        #[arg(long)]
        negative_weight: Option<f32>,

        #[arg(long)]
        decay: Option<f32>,

        /// Adobe .cube grading LUT (identity volume if omitted)
        #[arg(long)]
        lut: Option<PathBuf>,

        /// Sample the grading volume without interpolation
        #[arg(long)]
        nearest: bool,

        /// Destination size relative to the source
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        #[arg(long, value_enum)]
        edge: Option<EdgeArg>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{}\"", s))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Vec2::new(x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Gauss {
            input,
            output,
            direction,
            radius,
            separable,
            scale,
            edge,
        } => {
            let g = &mut config.gaussian;
            if let Some(direction) = direction {
                g.direction = direction;
            }
            if let Some(radius) = radius {
                g.radius = radius;
            }
            if let Some(edge) = edge {
                g.edge = edge.into();
            }
            config.validate()?;
            cmd_gauss(&config, &input, &output, separable, scale)
        }
        Commands::Radial {
            input,
            output,
            center,
            density,
            positive_weight,
            negative_weight,
            decay,
            lut,
            nearest,
            scale,
            edge,
        } => {
            let r = &mut config.radial;
            if let Some(center) = center {
                r.center = center;
            }
            if let Some(density) = density {
                r.density = density;
            }
            if let Some(w) = positive_weight {
                r.positive_weight = w;
            }
            if let Some(w) = negative_weight {
                r.negative_weight = w;
            }
            if let Some(decay) = decay {
                r.decay = decay;
            }
            if let Some(edge) = edge {
                r.edge = edge.into();
            }
            if lut.is_some() {
                config.grading.lut = lut;
            }
            if nearest {
                config.grading.filter = VolumeFilter::Nearest;
            }
            config.validate()?;
            cmd_radial(&config, &input, &output, scale)
        }
        Commands::Config { output } => cmd_config(&config, output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<LumenConfig> {
    match path {
        Some(path) => {
            let config = LumenConfig::load_from_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?;
            tracing::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(LumenConfig::default()),
    }
}

fn check_scale(scale: f32) -> Result<()> {
    if !(scale.is_finite() && scale > 0.0) {
        anyhow::bail!("--scale must be a positive number, got {}", scale);
    }
    Ok(())
}

fn load_source(input: &Path) -> Result<Image2D> {
    let src = io::load_image(input)?;
    if src.is_empty() {
        anyhow::bail!("{} has no pixels", input.display());
    }
    tracing::info!("Loaded {} ({}x{})", input.display(), src.width, src.height);
    Ok(src)
}

fn cmd_gauss(
    config: &LumenConfig,
    input: &Path,
    output: &Path,
    separable: bool,
    scale: f32,
) -> Result<()> {
    check_scale(scale)?;
    let src = load_source(input)?;
    let (width, height) = io::scaled_extent(src.width, src.height, scale);
    let start = Instant::now();

    let params = config.gaussian;
    let dst = if separable {
        // The first pass resamples to the destination size; the second
        // runs at that size.
        let h = GaussianBlurKernel::new(GaussianParams {
            direction: Vec2::new(params.direction.length(), 0.0),
            ..params
        });
        let v = GaussianBlurKernel::new(GaussianParams {
            direction: Vec2::new(0.0, params.direction.length()),
            ..params
        });
        let tmp = render(&h, &src, width, height);
        render(&v, &tmp, width, height)
    } else {
        render(&GaussianBlurKernel::new(params), &src, width, height)
    };

    tracing::info!(
        "Gaussian pass {}x{} -> {}x{} in {:.1} ms",
        src.width,
        src.height,
        width,
        height,
        start.elapsed().as_secs_f64() * 1000.0
    );

    io::save_image(&dst, output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn cmd_radial(config: &LumenConfig, input: &Path, output: &Path, scale: f32) -> Result<()> {
    check_scale(scale)?;
    let volume = config
        .grading
        .build_volume()
        .context("failed to build grading volume")?;
    match &config.grading.lut {
        Some(path) => tracing::info!(
            "Loaded grading LUT {} ({}^3)",
            path.display(),
            volume.size()
        ),
        None => tracing::debug!("Using identity grading volume ({}^3)", volume.size()),
    }

    let src = load_source(input)?;
    let (width, height) = io::scaled_extent(src.width, src.height, scale);
    let start = Instant::now();

    let kernel = RadialBlurKernel::new(config.radial, &volume);
    let dst = render(&kernel, &src, width, height);

    tracing::info!(
        "Radial pass {}x{} -> {}x{} in {:.1} ms",
        src.width,
        src.height,
        width,
        height,
        start.elapsed().as_secs_f64() * 1000.0
    );

    io::save_image(&dst, output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn cmd_config(config: &LumenConfig, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            config
                .save_to_file(path)
                .with_context(|| format!("failed to write config: {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec2() {
        assert_eq!(parse_vec2("0.5, 0.25").unwrap(), Vec2::new(0.5, 0.25));
        assert_eq!(parse_vec2("-1,0").unwrap(), Vec2::new(-1.0, 0.0));
        assert!(parse_vec2("1").is_err());
        assert!(parse_vec2("a,b").is_err());
    }

    #[test]
    fn test_check_scale() {
        assert!(check_scale(0.5).is_ok());
        assert!(check_scale(0.0).is_err());
        assert!(check_scale(f32::NAN).is_err());
    }

    #[test]
    fn test_cli_parses_radial_flags() {
        let cli = Cli::try_parse_from([
            "lumen",
            "radial",
            "in.png",
            "out.png",
            "--center",
            "0.5,0.5",
            "--decay",
            "0.8",
            "--nearest",
            "--edge",
            "transparent",
        ])
        .unwrap();
        match cli.command {
            Commands::Radial {
                center,
                decay,
                nearest,
                edge,
                ..
            } => {
                assert_eq!(center, Some(Vec2::new(0.5, 0.5)));
                assert_eq!(decay, Some(0.8));
                assert!(nearest);
                assert!(matches!(edge, Some(EdgeArg::Transparent)));
            }
            _ => panic!("expected radial command"),
        }
    }

    #[test]
    fn test_gauss_end_to_end() {
        let dir = std::env::temp_dir();
        let input = dir.join("lumen_cli_gauss_in.png");
        let output = dir.join("lumen_cli_gauss_out.png");
        io::save_image(&Image2D::solid(8, 8, lumen_core::Color::WHITE), &input).unwrap();

        cmd_gauss(&LumenConfig::default(), &input, &output, true, 0.5).unwrap();

        let out = io::load_image(&output).unwrap();
        assert_eq!((out.width, out.height), (4, 4));
        assert!(out.data.iter().all(|c| c.to_rgba8() == [255, 255, 255, 255]));
        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
    }
}
