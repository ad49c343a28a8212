// screen-translator/src/ocr/tesseract.rs

// ============================================================================
// BACKEND TESSERACT
// ============================================================================
//
// Usa o binário `tesseract` instalado no sistema (via rusty-tesseract).
// A imagem pré-processada é salva num PNG temporário e entregue ao binário.
//
// ============================================================================

use super::{find_language, OcrError};
use image::{DynamicImage, ImageFormat};
use rusty_tesseract::{Args, Image};

/// Idiomas usados no modo automático
pub const AUTO_LANGUAGES: &str = "eng+jpn+kor+chi_sim+vie+tha+rus+deu+fra+spa+por+ita";

/// Page segmentation mode 6: um único bloco uniforme de texto
const PSM_SINGLE_BLOCK: i32 = 6;

const NOT_INSTALLED_MESSAGE: &str = "Tesseract não encontrado.\n\n\
    Instale o Tesseract OCR e os dados de idioma:\n\
    - Windows: https://github.com/UB-Mannheim/tesseract/wiki\n\
    - Linux: sudo apt install tesseract-ocr tesseract-ocr-jpn ...\n\
    - macOS: brew install tesseract tesseract-lang\n\n\
    Depois confira se `tesseract` está no PATH.";

/// String de idiomas passada ao Tesseract (`-l`)
pub fn language_arg(requested: Option<&str>) -> String {
    match requested {
        None => AUTO_LANGUAGES.to_string(),
        Some(code) => match find_language(code) {
            Some(lang) => lang.tesseract.to_string(),
            None => {
                warn!("⚠️  Idioma de OCR desconhecido '{}', usando modo automático", code);
                AUTO_LANGUAGES.to_string()
            }
        },
    }
}

/// Verifica se o binário do Tesseract responde
pub fn is_available() -> bool {
    rusty_tesseract::get_tesseract_version().is_ok()
}

/// Reconhece o texto de uma imagem (já pré-processada)
pub fn recognize(image: &DynamicImage, requested: Option<&str>) -> Result<String, OcrError> {
    if !is_available() {
        return Err(OcrError::Unavailable(NOT_INSTALLED_MESSAGE.to_string()));
    }

    let args = Args {
        lang: language_arg(requested),
        psm: Some(PSM_SINGLE_BLOCK),
        ..Default::default()
    };

    debug!("   🔤 tesseract -l {} --psm {}", args.lang, PSM_SINGLE_BLOCK);

    // O arquivo some quando `file` sai de escopo
    let file = tempfile::Builder::new()
        .prefix("screen-translator-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| OcrError::Image(e.to_string()))?;

    image
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|e| OcrError::Image(e.to_string()))?;

    let input = Image::from_path(file.path()).map_err(|e| OcrError::Image(e.to_string()))?;

    rusty_tesseract::image_to_string(&input, &args).map_err(|e| OcrError::Engine(e.to_string()))
}
