use include_dir::{include_dir, Dir};
use ratatui::style::Color;
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

use crate::util::cell_noise;

static SCENE_DIR: Dir = include_dir!("src/scenes");

/// A backdrop the target hides in. `name` is the background identifier.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Scene {
    pub name: String,
    pub glyphs: Vec<String>,
    pub palette: Vec<[u8; 3]>,
    /// Fraction of cells that carry a glyph
    pub density: f64,
}

impl Scene {
    /// Every embedded scene, ordered by file name
    pub fn all() -> Result<Vec<Scene>, Box<dyn Error>> {
        let mut files: Vec<_> = SCENE_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));

        let scenes = files
            .into_iter()
            .map(|f| {
                let contents = f
                    .contents_utf8()
                    .ok_or_else(|| format!("scene {} is not valid utf-8", f.path().display()))?;
                Scene::parse(contents)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if scenes.is_empty() {
            return Err("no scenes bundled".into());
        }
        Ok(scenes)
    }

    pub fn parse(json: &str) -> Result<Scene, Box<dyn Error>> {
        let scene: Scene = from_str(json)?;
        if scene.glyphs.is_empty() {
            return Err(format!("scene '{}' has no glyphs", scene.name).into());
        }
        if scene.palette.is_empty() {
            return Err(format!("scene '{}' has an empty palette", scene.name).into());
        }
        if !(0.0..=1.0).contains(&scene.density) {
            return Err(format!("scene '{}' density must be within [0, 1]", scene.name).into());
        }
        Ok(scene)
    }

    fn salt(&self) -> u32 {
        self.name
            .bytes()
            .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
    }

    /// Glyph and colour for a cell, or `None` for bare ground.
    /// Stable for a given scene and position.
    pub fn glyph_at(&self, x: u16, y: u16) -> Option<(&str, Color)> {
        let noise = cell_noise(x, y, self.salt());
        if (noise % 1000) as f64 / 1000.0 >= self.density {
            return None;
        }
        let glyph = &self.glyphs[(noise >> 10) as usize % self.glyphs.len()];
        let [r, g, b] = self.palette[(noise >> 20) as usize % self.palette.len()];
        Some((glyph.as_str(), Color::Rgb(r, g, b)))
    }
}
