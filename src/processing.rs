// screen-translator/src/processing.rs

// ============================================================================
// MÓDULO PROCESSING - Pipeline de tradução
// ============================================================================
// Contém o pipeline completo de uma captura:
// região selecionada → OCR → tradução (com cache) → relatório para a UI
//
// Cada execução roda numa thread própria, com um snapshot imutável da
// configuração. A UI acompanha o progresso pelos PipelineEvent do canal.
// ============================================================================

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use image::DynamicImage;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

use crate::cache::TranslationCache;
use crate::config::AppConfig;
use crate::ocr::{OcrError, TextExtraction, TextExtractor};
use crate::translator::{TranslationError, TranslationService, Translator};

// ============================================================================
// ESTADOS E EVENTOS
// ============================================================================

/// Resultado final de uma execução
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Succeeded,
    /// Motivo curto (vai para a barra de status)
    Failed(String),
}

/// Estados do pipeline:
///
/// ```text
/// Idle ──captura──▶ AwaitingSelection ──cancelou──▶ Idle
///                   ──selecionou──▶ Extracting ──texto──▶ Translating ──▶ Done
///                                   ──erro/vazio──▶ Done(Failed)
/// Done ──próxima captura──▶ AwaitingSelection
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    AwaitingSelection,
    Extracting,
    Translating,
    Done(PipelineOutcome),
}

impl PipelineState {
    /// Enquanto ocupado, o botão/hotkey de captura fica desativado
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::AwaitingSelection | PipelineState::Extracting | PipelineState::Translating
        )
    }

    pub fn status_message(&self) -> String {
        match self {
            PipelineState::Idle => "Pronto".to_string(),
            PipelineState::AwaitingSelection => "Selecione a área da tela...".to_string(),
            PipelineState::Extracting => "Extraindo texto...".to_string(),
            PipelineState::Translating => "Traduzindo...".to_string(),
            PipelineState::Done(PipelineOutcome::Succeeded) => "✓ Tradução concluída!".to_string(),
            PipelineState::Done(PipelineOutcome::Failed(reason)) => format!("✗ {}", reason),
        }
    }
}

/// Texto exibido na janela ao fim de uma execução
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub original: String,
    pub translated: String,
    pub outcome: PipelineOutcome,
}

/// Mensagens da thread de processamento para a UI
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    Finished(PipelineReport),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Falha no OCR")]
    Extraction(#[source] OcrError),

    #[error("Nenhum texto detectado")]
    NoText,

    #[error("Falha na tradução")]
    Translation(#[source] TranslationError),

    #[error("Falha ao iniciar o runtime assíncrono: {0}")]
    Runtime(String),
}

impl PipelineError {
    /// Texto completo (com orientação) mostrado nos painéis
    pub fn details(&self) -> String {
        match self {
            PipelineError::Extraction(e) => e.to_string(),
            PipelineError::NoText => OcrError::NoTextDetected.to_string(),
            PipelineError::Translation(e) => e.to_string(),
            PipelineError::Runtime(_) => self.to_string(),
        }
    }
}

impl PipelineReport {
    fn failed(original: String, translated: String, error: &PipelineError) -> Self {
        PipelineReport {
            original,
            translated,
            outcome: PipelineOutcome::Failed(error.to_string()),
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Executa OCR + tradução sobre a imagem capturada.
///
/// `on_state` recebe as transições intermediárias (Extracting, Translating).
/// Erro ou texto vazio no OCR encerra sem chamar o tradutor.
pub fn run_pipeline(
    image: &DynamicImage,
    config: &AppConfig,
    extractor: &dyn TextExtraction,
    translator: &dyn TranslationService,
    cache: &TranslationCache,
    on_state: &mut dyn FnMut(PipelineState),
) -> PipelineReport {
    // === OCR ===
    on_state(PipelineState::Extracting);
    info!("🔍 [1/2] Executando OCR...");

    let original = match extract(image, extractor) {
        Ok(text) => text,
        Err(e) => {
            error!("❌ {}: {}", e, e.details());
            return PipelineReport::failed(e.details(), String::new(), &e);
        }
    };

    info!("   📝 Texto: {:?}", original);

    // === TRADUÇÃO ===
    on_state(PipelineState::Translating);

    let backend = config.translation_backend.id();
    let target = config.target_language.as_str();

    if let Some(cached) = cache.get(backend, target, &original) {
        info!("🌐 [2/2] Tradução encontrada no cache");
        return PipelineReport {
            original,
            translated: cached,
            outcome: PipelineOutcome::Succeeded,
        };
    }

    info!("🌐 [2/2] Traduzindo → {} ({})...", target, config.translation_backend.label());

    match translate(translator, &original, target) {
        Ok(translated) => {
            cache.set(backend, target, &original, &translated);
            info!("✅ Pipeline concluído! ({} entradas no cache)", cache.len());

            PipelineReport {
                original,
                translated,
                outcome: PipelineOutcome::Succeeded,
            }
        }
        Err(e) => {
            error!("❌ {}: {}", e, e.details());
            // O erro aparece no painel da tradução; o original continua visível
            PipelineReport::failed(original, e.details(), &e)
        }
    }
}

fn extract(image: &DynamicImage, extractor: &dyn TextExtraction) -> Result<String, PipelineError> {
    let text = extractor
        .extract_text(image)
        .map_err(PipelineError::Extraction)?;

    if text.trim().is_empty() {
        warn!("⚠️  Nenhum texto detectado!");
        return Err(PipelineError::NoText);
    }

    Ok(text)
}

/// Chama o tradutor assíncrono num runtime local desta thread
fn translate(
    translator: &dyn TranslationService,
    text: &str,
    target: &str,
) -> Result<String, PipelineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PipelineError::Runtime(e.to_string()))?;

    runtime
        .block_on(translator.translate(text, target))
        .map_err(PipelineError::Translation)
}

// ============================================================================
// THREAD DE PROCESSAMENTO
// ============================================================================

/// Dispara uma execução do pipeline numa thread nova.
///
/// A imagem e o snapshot da configuração são movidos para a thread; a UI
/// recebe `StateChanged` a cada transição e um `Finished` no final.
pub fn spawn_worker(
    image: DynamicImage,
    config: Arc<AppConfig>,
    cache: TranslationCache,
    events: Sender<PipelineEvent>,
    ctx: egui::Context,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("pipeline".to_string())
        .spawn(move || {
            let extractor = TextExtractor::from_config(&config);
            let translator = Translator::from_config(&config);

            info!(
                "   🔍 OCR: {} | 🌐 Tradução: {} → {}",
                extractor.backend().label(),
                translator.backend().label(),
                config.target_language
            );

            let mut notify = |state: PipelineState| {
                let _ = events.send(PipelineEvent::StateChanged(state));
                ctx.request_repaint();
            };

            let report = run_pipeline(&image, &config, &extractor, &translator, &cache, &mut notify);

            if events.send(PipelineEvent::Finished(report)).is_err() {
                warn!("⚠️  UI encerrada antes do fim do processamento");
            }
            ctx.request_repaint();
        })
        .context("Falha ao criar thread de processamento")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::cleanup::clean_ocr_text;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// OCR falso que devolve sempre o mesmo resultado (já limpo)
    struct FixedOcr(Result<String, OcrError>);

    impl TextExtraction for FixedOcr {
        fn extract_text(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.0.clone().map(|raw| clean_ocr_text(&raw))
        }
    }

    /// Tradutor falso que conta as chamadas
    struct CountingTranslator {
        calls: AtomicUsize,
        result: Result<String, TranslationError>,
    }

    impl CountingTranslator {
        fn new(result: Result<String, TranslationError>) -> Self {
            CountingTranslator {
                calls: AtomicUsize::new(0),
                result,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationService for CountingTranslator {
        async fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn white_bitmap() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([255, 255, 255])))
    }

    fn run(
        ocr: &FixedOcr,
        translator: &CountingTranslator,
        cache: &TranslationCache,
    ) -> (PipelineReport, Vec<PipelineState>) {
        let mut states = Vec::new();
        let report = run_pipeline(
            &white_bitmap(),
            &AppConfig::default(),
            ocr,
            translator,
            cache,
            &mut |state: PipelineState| states.push(state),
        );
        (report, states)
    }

    #[test]
    fn noise_only_ocr_fails_without_translating() {
        let ocr = FixedOcr(Ok("│ ■ ║\n-- ~~\n\u{200B}".to_string()));
        let translator = CountingTranslator::new(Ok("never".to_string()));

        let (report, states) = run(&ocr, &translator, &TranslationCache::new());

        assert_eq!(report.outcome, PipelineOutcome::Failed("Nenhum texto detectado".to_string()));
        assert_eq!(translator.calls(), 0);
        assert_eq!(states, vec![PipelineState::Extracting]);
    }

    #[test]
    fn ocr_errors_show_guidance_and_skip_translation() {
        let ocr = FixedOcr(Err(OcrError::LanguagePackMissing));
        let translator = CountingTranslator::new(Ok("never".to_string()));

        let (report, _) = run(&ocr, &translator, &TranslationCache::new());

        assert_eq!(report.original, OcrError::LanguagePackMissing.to_string());
        assert_eq!(report.translated, "");
        assert!(matches!(report.outcome, PipelineOutcome::Failed(_)));
        assert_eq!(translator.calls(), 0);
    }

    #[test]
    fn successful_run_reports_both_texts() {
        let ocr = FixedOcr(Ok("Hello world".to_string()));
        let translator = CountingTranslator::new(Ok("Bonjour le monde".to_string()));

        let (report, states) = run(&ocr, &translator, &TranslationCache::new());

        assert_eq!(
            report,
            PipelineReport {
                original: "Hello world".to_string(),
                translated: "Bonjour le monde".to_string(),
                outcome: PipelineOutcome::Succeeded,
            }
        );
        assert_eq!(states, vec![PipelineState::Extracting, PipelineState::Translating]);
    }

    #[test]
    fn repeated_text_comes_from_the_cache() {
        let ocr = FixedOcr(Ok("Hello world".to_string()));
        let translator = CountingTranslator::new(Ok("Olá mundo".to_string()));
        let cache = TranslationCache::new();

        let (first, _) = run(&ocr, &translator, &cache);
        let (second, _) = run(&ocr, &translator, &cache);

        assert_eq!(first, second);
        assert_eq!(translator.calls(), 1);
    }

    #[test]
    fn translation_errors_show_in_the_translation_pane() {
        let ocr = FixedOcr(Ok("Hello world".to_string()));
        let translator = CountingTranslator::new(Err(TranslationError::Timeout));
        let cache = TranslationCache::new();

        let (report, _) = run(&ocr, &translator, &cache);

        assert_eq!(report.original, "Hello world");
        assert_eq!(report.translated, TranslationError::Timeout.to_string());
        assert_eq!(report.outcome, PipelineOutcome::Failed("Falha na tradução".to_string()));
        // Falhas não entram no cache
        assert!(cache.is_empty());
    }

    #[test]
    fn busy_states_block_new_captures() {
        assert!(!PipelineState::Idle.is_busy());
        assert!(PipelineState::AwaitingSelection.is_busy());
        assert!(PipelineState::Extracting.is_busy());
        assert!(PipelineState::Translating.is_busy());
        assert!(!PipelineState::Done(PipelineOutcome::Succeeded).is_busy());
        assert!(!PipelineState::Done(PipelineOutcome::Failed("x".to_string())).is_busy());
    }

    #[test]
    fn failed_status_shows_the_reason() {
        let state = PipelineState::Done(PipelineOutcome::Failed("Falha no OCR".to_string()));
        assert_eq!(state.status_message(), "✗ Falha no OCR");
    }
}
