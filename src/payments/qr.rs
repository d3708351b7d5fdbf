//! QR rendering of payment URIs.

use image::Luma;
use qrcode::render::{svg, unicode};
use qrcode::QrCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR generation failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFormat {
    Png,
    Svg,
    Terminal,
}

#[derive(Debug, Clone)]
pub struct QrOptions {
    /// Minimum edge in pixels (PNG and SVG).
    pub size: u32,
    pub quiet_zone: bool,
    pub format: QrFormat,
    pub dark_color: String,
    pub light_color: String,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 256,
            quiet_zone: true,
            format: QrFormat::Svg,
            dark_color: "#000000".to_string(),
            light_color: "#FFFFFF".to_string(),
        }
    }
}

impl QrOptions {
    pub fn png(size: u32) -> Self {
        Self {
            size,
            format: QrFormat::Png,
            ..Self::default()
        }
    }

    pub fn svg() -> Self {
        Self::default()
    }

    pub fn terminal() -> Self {
        Self {
            format: QrFormat::Terminal,
            ..Self::default()
        }
    }
}

/// Render `data` in the requested format.
pub fn render(data: &str, options: &QrOptions) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    match options.format {
        QrFormat::Png => render_png(&code, options),
        QrFormat::Svg => Ok(render_svg(&code, options).into_bytes()),
        QrFormat::Terminal => Ok(render_terminal(&code).into_bytes()),
    }
}

/// SVG document for `data`.
pub fn render_svg_string(data: &str, options: &QrOptions) -> Result<String, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    Ok(render_svg(&code, options))
}

/// Half-block text for `data`, for printing to a terminal.
pub fn render_terminal_string(data: &str) -> Result<String, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    Ok(render_terminal(&code))
}

fn render_png(code: &QrCode, options: &QrOptions) -> Result<Vec<u8>, QrError> {
    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(options.quiet_zone)
        .min_dimensions(options.size, options.size)
        .build();

    let mut bytes = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

fn render_svg(code: &QrCode, options: &QrOptions) -> String {
    code.render()
        .quiet_zone(options.quiet_zone)
        .min_dimensions(options.size, options.size)
        .dark_color(svg::Color(&options.dark_color))
        .light_color(svg::Color(&options.light_color))
        .build()
}

fn render_terminal(code: &QrCode) -> String {
    code.render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "ethereum:0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266@8453?value=1000";

    #[test]
    fn test_png_magic() {
        let png = render(URI, &QrOptions::png(128)).unwrap();
        assert!(png.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_svg_document() {
        let svg = render_svg_string(URI, &QrOptions::svg()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
    }

    #[test]
    fn test_terminal_output() {
        let text = render_terminal_string(URI).unwrap();
        assert!(text.lines().count() > 10);
    }
}
