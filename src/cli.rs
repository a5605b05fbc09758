//! Command-line argument parsing.

use clap::Parser;

use crate::params::{NoiseConfig, NoiseKind, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Terramarch")]
#[command(about = "Procedural voxel terrain demo", long_about = None)]
pub struct Args {
    /// Density field noise seed
    #[arg(long, default_value_t = 24)]
    pub seed: u32,

    /// Density field noise frequency
    #[arg(long, default_value_t = 0.2)]
    pub frequency: f64,

    /// Noise variant: fractal-simplex (default) or perlin
    #[arg(long, value_name = "KIND", default_value = "fractal-simplex")]
    pub noise_kind: String,

    /// Enable the land and box draw passes
    #[arg(long)]
    pub show_scenery: bool,

    /// Enable the animated water draw pass
    #[arg(long)]
    pub show_water: bool,
}

impl Args {
    pub fn noise_config(&self) -> NoiseConfig {
        let kind = match self.noise_kind.to_lowercase().as_str() {
            "fractal-simplex" => NoiseKind::FractalSimplex,
            "perlin" => NoiseKind::Perlin,
            other => {
                log::warn!("unknown noise kind '{}', using fractal-simplex", other);
                NoiseKind::FractalSimplex
            }
        };
        NoiseConfig {
            seed: self.seed,
            frequency: self.frequency,
            kind,
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            draw_scenery: self.show_scenery,
            draw_water: self.show_water,
            ..RenderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["terramarch"]);
        let noise = args.noise_config();
        assert_eq!(noise.seed, 24);
        assert_eq!(noise.frequency, 0.2);
        assert_eq!(noise.kind, NoiseKind::FractalSimplex);

        let render = args.render_config();
        assert!(!render.draw_scenery);
        assert!(!render.draw_water);
    }

    #[test]
    fn test_noise_kind_parsing() {
        let args = Args::parse_from(["terramarch", "--noise-kind", "perlin"]);
        assert_eq!(args.noise_config().kind, NoiseKind::Perlin);

        let args = Args::parse_from(["terramarch", "--noise-kind", "bogus"]);
        assert_eq!(args.noise_config().kind, NoiseKind::FractalSimplex);
    }

    #[test]
    fn test_pass_toggles() {
        let args = Args::parse_from(["terramarch", "--show-water", "--show-scenery"]);
        let render = args.render_config();
        assert!(render.draw_scenery);
        assert!(render.draw_water);
    }
}
