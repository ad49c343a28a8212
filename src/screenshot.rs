// screen-translator/src/screenshot.rs

// ============================================================================
// MÓDULO SCREENSHOT - Captura de tela e pré-processamento para OCR
// ============================================================================

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage, Rgba};
use screenshots::Screen;

// ============================================================================
// CAPTURA EM MEMÓRIA
// ============================================================================

/// Captura a tela inteira do monitor principal (em memória)
///
/// # Retorna
/// * `Result<DynamicImage>` - Imagem capturada (pixels físicos)
pub fn capture_primary_screen() -> Result<DynamicImage> {
    info!("📸 Capturando tela inteira (memória)...");

    let screens = Screen::all().context("Falha ao listar monitores")?;

    // Pega o monitor principal (índice 0)
    let screen = screens.first().context("Nenhum monitor encontrado")?;

    info!(
        "   Monitor: {}x{}",
        screen.display_info.width, screen.display_info.height
    );

    let buffer = screen.capture().context("Falha ao capturar tela")?;
    let img = buffer_to_image(&buffer)?;

    info!("✅ Screenshot capturada: {}x{}", img.width(), img.height());

    Ok(img)
}

/// Converte o buffer da screenshot para DynamicImage
fn buffer_to_image(buffer: &screenshots::Image) -> Result<DynamicImage> {
    let width = buffer.width();
    let height = buffer.height();
    let rgba = buffer.rgba();

    let img_buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width as u32, height as u32, rgba.to_vec())
            .context("Buffer da screenshot com tamanho inconsistente")?;

    Ok(DynamicImage::ImageRgba8(img_buffer))
}

// ============================================================================
// PRÉ-PROCESSAMENTO PARA OCR
// ============================================================================

/// Parâmetros de pré-processamento de cada backend de OCR
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessProfile {
    /// Lado mínimo: imagens menores são ampliadas
    pub min_dimension: u32,
    /// Lado máximo: imagens maiores são reduzidas (None = sem limite)
    pub max_dimension: Option<u32>,
    /// Limite do fator de ampliação (None = sem limite)
    pub max_upscale: Option<f32>,
    /// Fator de contraste (1.0 = sem mudança)
    pub contrast: f32,
    /// Clareia a imagem quando a luminância média fica abaixo deste valor
    pub brighten_below: Option<f32>,
}

/// Tesseract: amplia até 600px, contraste 1.5
pub const TESSERACT_PROFILE: PreprocessProfile = PreprocessProfile {
    min_dimension: 600,
    max_dimension: None,
    max_upscale: None,
    contrast: 1.5,
    brighten_below: None,
};

/// Windows OCR: amplia até 800px (máx 2.5x, teto de 4000px), contraste 1.8
/// e clareia imagens escuras
pub const WINDOWS_OCR_PROFILE: PreprocessProfile = PreprocessProfile {
    min_dimension: 800,
    max_dimension: Some(4000),
    max_upscale: Some(2.5),
    contrast: 1.8,
    brighten_below: Some(100.0),
};

/// Fator aplicado no brilho de imagens escuras
const DARK_IMAGE_BRIGHTNESS: f32 = 1.3;

/// Kernel de nitidez leve (o mesmo do filtro SHARPEN clássico, soma 16)
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Pré-processa uma imagem antes do OCR. A ordem importa:
/// 1. Converte para RGB
/// 2. Reduz (teto) / amplia (piso) mantendo a proporção, com Lanczos3
/// 3. Nitidez leve
/// 4. Aumenta contraste
/// 5. Clareia se estiver escura (só no perfil do Windows)
pub fn preprocess_for_ocr(image: &DynamicImage, profile: &PreprocessProfile) -> DynamicImage {
    let mut processed = DynamicImage::ImageRgb8(image.to_rgb8());

    let (w, h) = (processed.width(), processed.height());
    if w == 0 || h == 0 {
        return processed;
    }

    if let Some((new_w, new_h)) = target_size(w, h, profile) {
        // Lanczos3 preserva bordas nítidas (perfeito para texto)
        processed = processed.resize_exact(new_w, new_h, FilterType::Lanczos3);
        debug!("   🔍 Redimensionado: {}x{} → {}x{}", w, h, new_w, new_h);
    }

    let mut rgb = sharpen(&processed.to_rgb8());
    enhance_contrast(&mut rgb, profile.contrast);

    if let Some(limit) = profile.brighten_below {
        let brightness = mean_luminance(&rgb);
        if brightness < limit {
            debug!("   💡 Imagem escura (média {:.0}), clareando", brightness);
            enhance_brightness(&mut rgb, DARK_IMAGE_BRIGHTNESS);
        }
    }

    DynamicImage::ImageRgb8(rgb)
}

/// Calcula o novo tamanho (se houver) respeitando o perfil
fn target_size(width: u32, height: u32, profile: &PreprocessProfile) -> Option<(u32, u32)> {
    let (mut w, mut h) = (width as f32, height as f32);
    let mut changed = false;

    // Teto primeiro: evita erros de "imagem grande demais"
    if let Some(max) = profile.max_dimension {
        let max = max as f32;
        if w > max || h > max {
            let scale = (max / w).min(max / h);
            w = (w * scale).floor();
            h = (h * scale).floor();
            changed = true;
        }
    }

    let min = profile.min_dimension as f32;
    if w < min || h < min {
        let scale = match profile.max_upscale {
            // Perfil com limite: fator que leva o menor lado ao piso, limitado
            Some(limit) => (min / w).min(min / h).min(limit),
            // Sem limite: garante que os dois lados passem do piso
            None => (min / w).max(min / h),
        };

        if scale > 1.0 {
            let (new_w, new_h) = ((w * scale).floor(), (h * scale).floor());
            let fits = profile
                .max_dimension
                .map_or(true, |max| new_w <= max as f32 && new_h <= max as f32);

            if fits {
                w = new_w;
                h = new_h;
                changed = true;
            }
        }
    }

    let size = ((w as u32).max(1), (h as u32).max(1));
    (changed && size != (width, height)).then_some(size)
}

/// Convolução 3x3 com o kernel de nitidez.
/// As bordas repetem o pixel vizinho (não escurece a moldura da imagem).
fn sharpen(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let weight: f32 = SHARPEN_KERNEL.iter().sum();

    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0.0f32; 3];

        for (i, k) in SHARPEN_KERNEL.iter().enumerate() {
            let dx = (i % 3) as i64 - 1;
            let dy = (i / 3) as i64 - 1;
            let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
            let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
            let pixel = image.get_pixel(sx, sy);

            for (c, value) in acc.iter_mut().enumerate() {
                *value += pixel[c] as f32 * k;
            }
        }

        Rgb(acc.map(|v| (v / weight).round().clamp(0.0, 255.0) as u8))
    })
}

/// Luminância média (0-255) da imagem
pub fn mean_luminance(image: &RgbImage) -> f32 {
    let count = image.width() as f64 * image.height() as f64;
    if count == 0.0 {
        return 0.0;
    }

    let total: f64 = image.pixels().map(|p| luma(p) as f64).sum();
    (total / count) as f32
}

fn luma(pixel: &Rgb<u8>) -> f32 {
    0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
}

/// Contraste em torno da luminância média: p' = média + (p - média) * fator
fn enhance_contrast(image: &mut RgbImage, factor: f32) {
    if (factor - 1.0).abs() < f32::EPSILON {
        return;
    }

    let mean = mean_luminance(image).round();
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let value = mean + (*channel as f32 - mean) * factor;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Brilho multiplicativo: p' = p * fator
fn enhance_brightness(image: &mut RgbImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (*channel as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}
