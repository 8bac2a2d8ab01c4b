/// Asset loading: scenery, layout and avatar images.
///
/// ## Fallbacks
///
///   - Scenery missing or undecodable → blank 1500x1200 canvas, all AIR.
///   - Layout missing or undecodable  → the scenery is classified instead.
///   - Avatar missing or undecodable  → solid red square.
///
/// Each fallback logs a warning. The only fatal case is a layout image
/// whose dimensions differ from the scenery's.

use std::path::Path;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::config::AssetConfig;
use crate::domain::layout::{Classifier, Label, LayoutGrid};
use crate::error::{Error, Result};

pub const BLANK_SIZE: (u32, u32) = (1500, 1200);
pub const BLANK_COLOR: Rgb<u8> = Rgb([225, 225, 225]);
pub const AVATAR_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

pub struct Assets {
    pub scenery: RgbImage,
    pub layout: LayoutGrid,
    pub avatar: RgbaImage,
}

pub fn load_assets(cfg: &AssetConfig, classifier: &Classifier) -> Result<Assets> {
    let scenery = cfg.scenery.as_deref().and_then(|p| decode_or_warn(p, "scenery"));
    let layout_img = cfg.layout.as_deref().and_then(|p| decode_or_warn(p, "layout"));

    let (scenery, layout) = match scenery {
        Some(img) => {
            let scenery = img.to_rgb8();
            let layout = match layout_img {
                Some(layout_img) => {
                    let layout = layout_img.to_rgb8();
                    check_dimensions(&scenery, &layout)?;
                    classifier.classify_image(&layout)?
                }
                None => classifier.classify_image(&scenery)?,
            };
            (scenery, layout)
        }
        None => {
            let (w, h) = BLANK_SIZE;
            if let Some(layout_img) = layout_img {
                // A layout without its scenery still has to line up with
                // what is drawn: the blank canvas.
                let blank = RgbImage::from_pixel(w, h, BLANK_COLOR);
                let layout = layout_img.to_rgb8();
                check_dimensions(&blank, &layout)?;
                (blank, classifier.classify_image(&layout)?)
            } else {
                (RgbImage::from_pixel(w, h, BLANK_COLOR), LayoutGrid::all_air(w, h))
            }
        }
    };

    log::info!(
        "layout {}x{}: {} air, {} wall",
        layout.width(), layout.height(),
        layout.count(Label::Air), layout.count(Label::Wall),
    );

    let avatar = cfg.avatar.as_deref()
        .and_then(|p| decode_or_warn(p, "avatar"))
        .map(|img| img.to_rgba8())
        .unwrap_or_else(|| default_avatar(cfg.avatar_diameter));

    Ok(Assets { scenery, layout, avatar })
}

pub fn default_avatar(diameter: u32) -> RgbaImage {
    RgbaImage::from_pixel(diameter.max(1), diameter.max(1), AVATAR_COLOR)
}

fn check_dimensions(scenery: &RgbImage, layout: &RgbImage) -> Result<()> {
    if scenery.dimensions() != layout.dimensions() {
        return Err(Error::DimensionMismatch {
            scenery_w: scenery.width(),
            scenery_h: scenery.height(),
            layout_w: layout.width(),
            layout_h: layout.height(),
        });
    }
    Ok(())
}

fn decode_or_warn(path: &Path, what: &str) -> Option<image::DynamicImage> {
    match decode(path) {
        Ok(img) => {
            log::debug!("{what} loaded from {} ({}x{})", path.display(), img.width(), img.height());
            Some(img)
        }
        Err(e) => {
            log::warn!("{what} {}: {e}; using default", path.display());
            None
        }
    }
}

fn decode(path: &Path) -> Result<image::DynamicImage> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_png(name: &str, img: &RgbImage) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("labyrinth-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn cfg() -> AssetConfig {
        AssetConfig {
            scenery: None,
            layout: None,
            avatar: None,
            start: None,
            avatar_diameter: 30,
        }
    }

    #[test]
    fn nothing_configured_gives_blank_canvas() {
        let assets = load_assets(&cfg(), &Classifier::default()).unwrap();
        assert_eq!(assets.scenery.dimensions(), BLANK_SIZE);
        assert_eq!(*assets.scenery.get_pixel(0, 0), BLANK_COLOR);
        assert_eq!(assets.layout.count(Label::Air), 1500 * 1200);
        assert_eq!(assets.avatar.dimensions(), (30, 30));
        assert_eq!(*assets.avatar.get_pixel(15, 15), AVATAR_COLOR);
    }

    #[test]
    fn missing_files_fall_back() {
        let mut c = cfg();
        c.scenery = Some(PathBuf::from("/nonexistent/scenery.png"));
        c.avatar = Some(PathBuf::from("/nonexistent/avatar.png"));
        let assets = load_assets(&c, &Classifier::default()).unwrap();
        assert_eq!(assets.scenery.dimensions(), BLANK_SIZE);
        assert_eq!(assets.avatar.dimensions(), (30, 30));
    }

    #[test]
    fn scenery_classified_when_no_layout() {
        let mut img = RgbImage::from_pixel(6, 4, Rgb([255, 255, 255]));
        img.put_pixel(2, 1, Rgb([0, 0, 0]));
        let mut c = cfg();
        c.scenery = Some(temp_png("self-classified.png", &img));
        let assets = load_assets(&c, &Classifier::default()).unwrap();
        assert_eq!(assets.layout.width(), 6);
        assert_eq!(assets.layout.label(2, 1), Label::Wall);
        assert_eq!(assets.layout.count(Label::Wall), 1);
    }

    #[test]
    fn separate_layout_is_used() {
        let scenery = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        let layout = RgbImage::from_pixel(5, 5, Rgb([255, 255, 255]));
        let mut c = cfg();
        c.scenery = Some(temp_png("dark-scenery.png", &scenery));
        c.layout = Some(temp_png("light-layout.png", &layout));
        let assets = load_assets(&c, &Classifier::default()).unwrap();
        assert_eq!(assets.layout.count(Label::Air), 25);
        assert_eq!(*assets.scenery.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn layout_size_mismatch_is_fatal() {
        let mut c = cfg();
        c.scenery = Some(temp_png("mismatch-scenery.png", &RgbImage::new(5, 5)));
        c.layout = Some(temp_png("mismatch-layout.png", &RgbImage::new(4, 5)));
        let err = load_assets(&c, &Classifier::default()).err().unwrap();
        assert!(matches!(err, Error::DimensionMismatch { scenery_w: 5, layout_w: 4, .. }));
    }

    #[test]
    fn unreadable_layout_falls_back_to_scenery() {
        let mut c = cfg();
        c.scenery = Some(temp_png("fallback-scenery.png", &RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))));
        c.layout = Some(PathBuf::from("/nonexistent/layout.png"));
        let assets = load_assets(&c, &Classifier::default()).unwrap();
        assert_eq!(assets.layout.count(Label::Air), 16);
    }

    #[test]
    fn avatar_sprite_loaded() {
        let mut c = cfg();
        c.avatar = Some(temp_png("avatar.png", &RgbImage::from_pixel(8, 12, Rgb([0, 0, 255]))));
        let assets = load_assets(&c, &Classifier::default()).unwrap();
        assert_eq!(assets.avatar.dimensions(), (8, 12));
        assert_eq!(*assets.avatar.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }
}
