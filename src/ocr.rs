// screen-translator/src/ocr.rs

// ============================================================================
// MÓDULO OCR - Extração de texto da região capturada
// ============================================================================
//
// Dois backends:
//
// 1. TESSERACT - binário local (multiplataforma), via rusty-tesseract
// 2. WINDOWS OCR - API nativa do Windows 10/11 (Windows.Media.Ocr)
//
// Fluxo: pré-processa a imagem (perfil do backend) → reconhece → limpa o
// texto. Toda falha do motor vira um OcrError tipado.
//
// ============================================================================

pub mod cleanup;
pub mod tesseract;
pub mod windows_ocr;

use crate::config::{AppConfig, OcrBackend};
use crate::screenshot::{self, TESSERACT_PROFILE, WINDOWS_OCR_PROFILE};
use cleanup::{clean_ocr_text, count_meaningful};
use image::DynamicImage;
use thiserror::Error;

// ============================================================================
// ERROS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OcrError {
    /// Backend não instalado / não suportado nesta máquina
    #[error("{0}")]
    Unavailable(String),

    #[error("Idioma de OCR não suportado: {0}")]
    LanguageNotSupported(String),

    #[error(
        "Nenhum texto detectado. Para japonês/coreano/chinês:\n\n\
         1. Instale o pacote de idioma do Windows:\n   \
         Configurações → Hora e Idioma → Idioma e Região\n   \
         → Adicionar idioma → Japonês/Coreano/Chinês\n   \
         → Baixar e instalar\n\n\
         2. Ou troque para o Tesseract nas configurações"
    )]
    LanguagePackMissing,

    #[error("Erro no OCR: {0}")]
    Engine(String),

    #[error("Falha ao preparar a imagem para o OCR: {0}")]
    Image(String),

    #[error("Nenhum texto detectado na região selecionada")]
    NoTextDetected,
}

impl OcrError {
    /// Erro causado por idioma/pacote de idioma ausente?
    pub fn is_language_pack_problem(&self) -> bool {
        match self {
            OcrError::LanguageNotSupported(_) | OcrError::LanguagePackMissing => true,
            OcrError::Engine(message) => {
                let message = message.to_lowercase();
                ["language", "not installed", "not available"]
                    .iter()
                    .any(|hint| message.contains(hint))
            }
            _ => false,
        }
    }
}

// ============================================================================
// TABELA DE IDIOMAS
// ============================================================================

/// Idioma de OCR: código ISO → código do Tesseract → tag BCP-47 (Windows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrLanguage {
    pub code: &'static str,
    pub name: &'static str,
    pub tesseract: &'static str,
    pub bcp47: &'static str,
}

pub const OCR_LANGUAGES: &[OcrLanguage] = &[
    OcrLanguage { code: "en", name: "English", tesseract: "eng", bcp47: "en-US" },
    OcrLanguage { code: "ja", name: "Japanese", tesseract: "jpn", bcp47: "ja-JP" },
    OcrLanguage { code: "ko", name: "Korean", tesseract: "kor", bcp47: "ko-KR" },
    OcrLanguage { code: "zh", name: "Chinese (Simplified)", tesseract: "chi_sim", bcp47: "zh-CN" },
    OcrLanguage { code: "zh-tw", name: "Chinese (Traditional)", tesseract: "chi_tra", bcp47: "zh-TW" },
    OcrLanguage { code: "vi", name: "Vietnamese", tesseract: "vie", bcp47: "vi-VN" },
    OcrLanguage { code: "th", name: "Thai", tesseract: "tha", bcp47: "th-TH" },
    OcrLanguage { code: "ru", name: "Russian", tesseract: "rus", bcp47: "ru-RU" },
    OcrLanguage { code: "de", name: "German", tesseract: "deu", bcp47: "de-DE" },
    OcrLanguage { code: "fr", name: "French", tesseract: "fra", bcp47: "fr-FR" },
    OcrLanguage { code: "es", name: "Spanish", tesseract: "spa", bcp47: "es-ES" },
    OcrLanguage { code: "pt", name: "Portuguese", tesseract: "por", bcp47: "pt-BR" },
    OcrLanguage { code: "it", name: "Italian", tesseract: "ita", bcp47: "it-IT" },
    OcrLanguage { code: "ar", name: "Arabic", tesseract: "ara", bcp47: "ar-SA" },
    OcrLanguage { code: "hi", name: "Hindi", tesseract: "hin", bcp47: "hi-IN" },
    OcrLanguage { code: "nl", name: "Dutch", tesseract: "nld", bcp47: "nl-NL" },
    OcrLanguage { code: "pl", name: "Polish", tesseract: "pol", bcp47: "pl-PL" },
    OcrLanguage { code: "tr", name: "Turkish", tesseract: "tur", bcp47: "tr-TR" },
];

/// Procura um idioma pelo código ISO (sem diferenciar maiúsculas)
pub fn find_language(code: &str) -> Option<&'static OcrLanguage> {
    OCR_LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code.trim()))
}

// ============================================================================
// CONTRATO DO EXTRATOR
// ============================================================================

/// Extrai texto de uma imagem. Devolve o texto já limpo (pode ser vazio).
pub trait TextExtraction: Send + Sync {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Extrator configurado a partir do snapshot da configuração
#[derive(Debug, Clone)]
pub struct TextExtractor {
    backend: OcrBackend,
    language: Option<String>,
}

impl TextExtractor {
    pub fn new(backend: OcrBackend, language: Option<String>) -> Self {
        TextExtractor { backend, language }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ocr_backend, config.ocr_language().map(str::to_string))
    }

    pub fn backend(&self) -> OcrBackend {
        self.backend
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let language = self.language.as_deref();

        // Código fora da tabela: nenhum dos motores saberia o que carregar
        if let Some(code) = language {
            if find_language(code).is_none() {
                return Err(OcrError::LanguageNotSupported(code.to_string()));
            }
        }

        match self.backend {
            OcrBackend::Tesseract => {
                let processed = screenshot::preprocess_for_ocr(image, &TESSERACT_PROFILE);
                tesseract::recognize(&processed, language)
            }
            OcrBackend::Windows => {
                if !windows_ocr::is_available() {
                    return Err(OcrError::Unavailable(windows_ocr::UNAVAILABLE_MESSAGE.to_string()));
                }

                let processed = screenshot::preprocess_for_ocr(image, &WINDOWS_OCR_PROFILE);
                recognize_best(language, |tag| windows_ocr::recognize(&processed, tag))
            }
        }
    }
}

impl TextExtraction for TextExtractor {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        info!(
            "🔍 Executando {} ({}x{})...",
            self.backend.label(),
            image.width(),
            image.height()
        );

        let raw = self.recognize(image)?;
        let cleaned = clean_ocr_text(&raw);

        info!(
            "✅ OCR completo: {} caracteres ({} antes da limpeza)",
            cleaned.chars().count(),
            raw.chars().count()
        );

        Ok(cleaned)
    }
}

// ============================================================================
// ESTRATÉGIA MULTI-IDIOMA (WINDOWS OCR)
// ============================================================================

/// Idiomas testados em ordem no modo multi-idioma
pub const WINDOWS_CANDIDATE_TAGS: [&str; 5] = ["ja-JP", "en-US", "ko-KR", "zh-CN", "zh-TW"];

/// Pontuação mínima (exclusiva) para aceitar o melhor candidato
const MIN_CANDIDATE_SCORE: usize = 5;

/// Pontuação de um resultado: tamanho do texto + 2 por caractere útil
pub fn score_candidate(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    trimmed.chars().count() + 2 * count_meaningful(text)
}

/// Reconhece com cada idioma candidato e fica com o melhor resultado.
///
/// Sem resultado bom, tenta o idioma pedido (se não for inglês). Se a última
/// falha foi de pacote de idioma, devolve `LanguagePackMissing`.
pub fn recognize_best<F>(requested: Option<&str>, mut recognize: F) -> Result<String, OcrError>
where
    F: FnMut(&str) -> Result<String, OcrError>,
{
    let mut best: Option<(usize, String)> = None;
    let mut last_error: Option<OcrError> = None;

    for tag in WINDOWS_CANDIDATE_TAGS {
        match recognize(tag) {
            Ok(text) => {
                let score = score_candidate(&text);
                debug!("   🌐 {}: pontuação {}", tag, score);

                let is_better = best.as_ref().map_or(true, |(best_score, _)| score > *best_score);
                if score > 0 && is_better {
                    best = Some((score, text));
                }
            }
            Err(e) => {
                debug!("   🌐 {}: {}", tag, e);
                last_error = Some(e);
            }
        }
    }

    if let Some((score, text)) = best {
        if score > MIN_CANDIDATE_SCORE {
            return Ok(text);
        }
    }

    if let Some(lang) = requested.filter(|lang| !lang.eq_ignore_ascii_case("en")) {
        let tag = find_language(lang).map_or("en-US", |l| l.bcp47);
        info!("   🌐 Tentando idioma configurado: {}", tag);

        match recognize(tag) {
            Ok(text) => return Ok(text),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) if e.is_language_pack_problem() => {
            warn!("⚠️  Falha de pacote de idioma: {}", e);
            Err(OcrError::LanguagePackMissing)
        }
        Some(e) => Err(e),
        None => Err(OcrError::NoTextDetected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fake_engine(
        results: HashMap<&'static str, Result<String, OcrError>>,
    ) -> impl FnMut(&str) -> Result<String, OcrError> {
        move |tag| {
            results
                .get(tag)
                .cloned()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[test]
    fn score_counts_length_and_meaningful_chars() {
        assert_eq!(score_candidate("  "), 0);
        // 5 caracteres + 2 * 4 úteis
        assert_eq!(score_candidate(" ab-cd "), 5 + 8);
        assert_eq!(score_candidate("日本"), 2 + 4);
    }

    #[test]
    fn picks_the_highest_scoring_language() {
        let engine = fake_engine(HashMap::from([
            ("ja-JP", Ok("ab".to_string())),
            ("en-US", Ok("Hello world".to_string())),
            ("ko-KR", Ok("Hel".to_string())),
        ]));

        assert_eq!(recognize_best(None, engine).unwrap(), "Hello world");
    }

    #[test]
    fn low_scores_fall_back_to_the_requested_language() {
        let mut calls = Vec::new();
        let result = recognize_best(Some("vi"), |tag| {
            calls.push(tag.to_string());
            if tag == "vi-VN" {
                Ok("Xin chào".to_string())
            } else {
                Ok("a".to_string())
            }
        });

        assert_eq!(result.unwrap(), "Xin chào");
        assert_eq!(calls.last().map(String::as_str), Some("vi-VN"));
        assert_eq!(calls.len(), WINDOWS_CANDIDATE_TAGS.len() + 1);
    }

    #[test]
    fn english_request_has_no_extra_attempt() {
        let mut calls = 0;
        let result = recognize_best(Some("en"), |_| {
            calls += 1;
            Ok(String::new())
        });

        assert_eq!(result, Err(OcrError::NoTextDetected));
        assert_eq!(calls, WINDOWS_CANDIDATE_TAGS.len());
    }

    #[test]
    fn unknown_requested_language_uses_english_tag() {
        let mut last = String::new();
        let _ = recognize_best(Some("xx"), |tag| {
            last = tag.to_string();
            Ok(String::new())
        });

        assert_eq!(last, "en-US");
    }

    #[test]
    fn unknown_language_code_is_rejected_before_any_engine_runs() {
        let image = DynamicImage::new_rgb8(20, 20);

        for backend in [OcrBackend::Tesseract, OcrBackend::Windows] {
            let extractor = TextExtractor::new(backend, Some("klingon".to_string()));
            assert_eq!(extractor.backend(), backend);
            assert_eq!(
                extractor.extract_text(&image),
                Err(OcrError::LanguageNotSupported("klingon".to_string()))
            );
        }
    }

    #[test]
    fn language_pack_failures_become_guidance() {
        let result = recognize_best(None, |tag| {
            Err(OcrError::LanguageNotSupported(tag.to_string()))
        });
        assert_eq!(result, Err(OcrError::LanguagePackMissing));

        let result = recognize_best(None, |_| {
            Err(OcrError::Engine("Language pack not installed".to_string()))
        });
        assert_eq!(result, Err(OcrError::LanguagePackMissing));
    }

    #[test]
    fn other_failures_propagate() {
        let result = recognize_best(None, |_| Err(OcrError::Engine("decoder crashed".to_string())));
        assert_eq!(result, Err(OcrError::Engine("decoder crashed".to_string())));
    }

    #[test]
    fn a_good_candidate_wins_over_earlier_failures() {
        let engine = fake_engine(HashMap::from([
            ("ja-JP", Err(OcrError::LanguageNotSupported("ja-JP".to_string()))),
            ("en-US", Ok("Press start".to_string())),
        ]));

        assert_eq!(recognize_best(Some("ja"), engine).unwrap(), "Press start");
    }

    #[test]
    fn language_table_lookup_ignores_case() {
        assert_eq!(find_language("JA").map(|l| l.tesseract), Some("jpn"));
        assert_eq!(find_language("zh-TW").map(|l| l.bcp47), Some("zh-TW"));
        assert!(find_language("klingon").is_none());
    }

    #[test]
    fn extractor_follows_the_config() {
        let config = AppConfig {
            ocr_backend: OcrBackend::Tesseract,
            ocr_language: "ko".to_string(),
            ..AppConfig::default()
        };

        let extractor = TextExtractor::from_config(&config);
        assert_eq!(extractor.backend(), OcrBackend::Tesseract);
        assert_eq!(extractor.language.as_deref(), Some("ko"));
    }

    #[cfg(not(windows))]
    #[test]
    fn windows_backend_is_unavailable_elsewhere() {
        let extractor = TextExtractor::new(OcrBackend::Windows, None);
        let image = DynamicImage::new_rgb8(50, 50);

        match extractor.extract_text(&image) {
            Err(OcrError::Unavailable(message)) => assert!(message.contains("Windows")),
            other => panic!("esperava Unavailable, veio {:?}", other),
        }
    }
}
