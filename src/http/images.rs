//! Preview images for the frame host.
//!
//! Three fixed layouts drawn as plain shapes: app icon, splash screen and the
//! social preview card. Rendering is CPU-bound and runs on the blocking pool.

use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use image::{ImageFormat, Rgb, RgbImage};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Icon,
    Splash,
    Preview,
}

impl ImageKind {
    /// Unknown or missing types fall back to the preview card.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("icon") => ImageKind::Icon,
            Some("splash") => ImageKind::Splash,
            _ => ImageKind::Preview,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageKind::Icon | ImageKind::Splash => (512, 512),
            ImageKind::Preview => (1200, 630),
        }
    }

    /// PNG bytes.
    pub fn render(&self) -> Result<Vec<u8>, image::ImageError> {
        let (width, height) = self.dimensions();
        let mut img = RgbImage::new(width, height);

        match self {
            ImageKind::Icon => {
                diagonal_gradient(&mut img, &[BLUE, CYAN]);
                let (w, h) = (width * 7 / 10, height / 2);
                rounded_rect(&mut img, (width - w) / 2, (height - h) / 2, w, h, h / 5, WHITE);
            }
            ImageKind::Splash => {
                fill(&mut img, NAVY);
                rounded_rect(&mut img, (width - 200) / 2, 131, 200, 150, 30, WHITE);
                rounded_rect(&mut img, (width - 240) / 2, 311, 240, 36, 18, WHITE);
                rounded_rect(&mut img, (width - 200) / 2, 361, 200, 16, 8, LIGHT_BLUE);
            }
            ImageKind::Preview => {
                diagonal_gradient(&mut img, &[SLATE, NAVY, SLATE]);
                rounded_rect(&mut img, 60, 180, 100, 100, 20, WHITE);
                rounded_rect(&mut img, 190, 190, 380, 56, 12, WHITE);
                rounded_rect(&mut img, 190, 258, 420, 20, 10, LIGHT_BLUE);
                for i in 0..3 {
                    rounded_rect(&mut img, 60 + i * 180, 340, 140, 24, 12, WHITE);
                }
                rounded_rect(&mut img, 60, 410, 200, 48, 20, CYAN);
            }
        }

        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

const BLUE: Rgb<u8> = Rgb([0x3B, 0x82, 0xF6]);
const CYAN: Rgb<u8> = Rgb([0x06, 0xB6, 0xD4]);
const NAVY: Rgb<u8> = Rgb([0x1E, 0x3A, 0x8A]);
const SLATE: Rgb<u8> = Rgb([0x0F, 0x17, 0x2A]);
const LIGHT_BLUE: Rgb<u8> = Rgb([0x93, 0xC5, 0xFD]);
const WHITE: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

fn fill(img: &mut RgbImage, color: Rgb<u8>) {
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
}

fn lerp(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

/// 135° gradient through evenly spaced `stops`.
fn diagonal_gradient(img: &mut RgbImage, stops: &[Rgb<u8>]) {
    let (width, height) = img.dimensions();
    let span = (width + height).saturating_sub(2).max(1) as f32;
    let segments = stops.len().saturating_sub(1).max(1) as f32;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let t = (x + y) as f32 / span * segments;
        let idx = (t.floor() as usize).min(stops.len().saturating_sub(2));
        *pixel = match stops {
            [] => WHITE,
            [only] => *only,
            _ => lerp(stops[idx], stops[idx + 1], t - idx as f32),
        };
    }
}

fn rounded_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, radius: u32, color: Rgb<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    let (width, height) = img.dimensions();
    let r = radius.min((w - 1) / 2).min((h - 1) / 2) as i64;

    for y in y0..(y0 + h).min(height) {
        for x in x0..(x0 + w).min(width) {
            let (lx, ly) = ((x - x0) as i64, (y - y0) as i64);
            let cx = lx.clamp(r, w as i64 - 1 - r);
            let cy = ly.clamp(r, h as i64 - 1 - r);
            let (dx, dy) = (lx - cx, ly - cy);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x, y, color);
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `GET /api/og?type=icon|splash|preview`
pub async fn og_image(Query(query): Query<ImageQuery>) -> Response {
    render_response(ImageKind::from_query(query.kind.as_deref())).await
}

pub async fn icon_png() -> Response {
    render_response(ImageKind::Icon).await
}

pub async fn splash_png() -> Response {
    render_response(ImageKind::Splash).await
}

pub async fn preview_png() -> Response {
    render_response(ImageKind::Preview).await
}

async fn render_response(kind: ImageKind) -> Response {
    match tokio::task::spawn_blocking(move || kind.render()).await {
        Ok(Ok(png)) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            png,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(kind = ?kind, error = %e, "Image rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Image rendering failed").into_response()
        }
        Err(e) => {
            tracing::error!(kind = ?kind, error = %e, "Image task panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "Image rendering failed").into_response()
        }
    }
}
