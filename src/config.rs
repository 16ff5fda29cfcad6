//! Scene configuration.
//!
//! Every value has a built-in default, so the scene runs without any config
//! file. Native builds layer the following sources (lowest to highest):
//! 1. built-in defaults
//! 2. `config/default.toml`
//! 3. `config/user.toml`
//! 4. environment variables (`SCROLL_FLOW_SECTION__KEY`)
//!
//! Web builds always use the defaults.

use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `SCROLL_FLOW_CAMERA__FOV=50`.
pub const ENV_PREFIX: &str = "SCROLL_FLOW_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub scene: LayoutConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub panel: PanelConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl SceneConfig {
    /// Load from `config/` relative to the working directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config")
    }

    pub fn load_from<P: AsRef<std::path::Path>>(config_dir: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let config_dir = config_dir.as_ref();
        let mut figment = Figment::from(Serialized::defaults(SceneConfig::default()));
        for file in ["default.toml", "user.toml"] {
            let path = config_dir.join(file);
            if path.exists() {
                log::debug!("Reading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment
            .extract()
            .with_context(|| format!("Invalid scene config in {}", config_dir.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "scroll-flow".to_string(),
        }
    }
}

/// Asset paths, relative to the `assets/` directory (or URL prefix on the web).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub bally: String,
    pub planet: String,
    pub gradient: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            bally: "models/bally/Bally_Male.glb".to_string(),
            planet: "models/planet/planet.glb".to_string(),
            gradient: "textures/gradients/3.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical world distance between two scroll sections.
    pub objects_distance: f32,
    pub particle_count: usize,
    pub particle_size: f32,
    /// The section meshes are tween targets either way; this only decides if they are drawn.
    pub show_section_meshes: bool,
    pub clear_colour: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            objects_distance: 4.0,
            particle_count: 200,
            particle_size: 0.03,
            show_section_meshes: false,
            clear_colour: "#1e1a20".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Distance of the camera from its rig along +z.
    pub distance: f32,
    pub parallax_amplitude: f32,
    /// Exponential smoothing rate of the rig towards its parallax target (1/s).
    pub parallax_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 35.0,
            near: 0.1,
            far: 100.0,
            distance: 6.0,
            parallax_amplitude: 0.5,
            parallax_rate: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Bound for the tangent term of the figure's trajectory.
    pub tan_limit: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { tan_limit: 4.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pixels scrolled per wheel line.
    pub line_height: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { line_height: 40.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub initial: String,
    pub swatches: Vec<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            initial: "#ffeded".to_string(),
            swatches: ["#ffeded", "#e4572e", "#17bebb", "#ffc914", "#76b041"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_describe_the_four_sections() {
        let config = SceneConfig::default();
        assert_eq!(config.scene.particle_count, 200);
        assert_eq!(config.scene.objects_distance, 4.0);
        assert_eq!(config.camera.fov, 35.0);
        assert!(!config.scene.show_section_meshes);
        assert_eq!(config.panel.initial, "#ffeded");
    }

    #[test]
    fn missing_directory_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let config = SceneConfig::load_from("does-not-exist").unwrap();
            assert_eq!(config.scroll.line_height, 40.0);
            Ok(())
        });
    }

    #[test]
    fn user_file_overrides_default_file_and_env_overrides_both() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/default.toml",
                "[camera]\nfov = 40.0\nparallax_rate = 2.0\n",
            )?;
            jail.create_file("config/user.toml", "[camera]\nfov = 50.0\n")?;
            jail.set_env("SCROLL_FLOW_SCENE__SHOW_SECTION_MESHES", "true");

            let config = SceneConfig::load_from("config").unwrap();
            assert_eq!(config.camera.fov, 50.0);
            assert_eq!(config.camera.parallax_rate, 2.0);
            // untouched keys in a partially overridden section keep their defaults
            assert_eq!(config.camera.distance, 6.0);
            assert!(config.scene.show_section_meshes);
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/default.toml", "[scene]\nparticle_count = \"many\"\n")?;
            assert!(SceneConfig::load_from("config").is_err());
            Ok(())
        });
    }
}
