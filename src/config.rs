// screen-translator/src/config.rs

// ============================================================================
// MÓDULO CONFIG - Configurações da aplicação
// ============================================================================
//
// O config.json é um objeto JSON "plano" (sem seções aninhadas).
// - Chaves ausentes recebem o valor padrão
// - Na inicialização, arquivo ausente ou inválido = configuração padrão
//   (só loga um aviso); num reload, mantém a configuração atual
// - Chaves desconhecidas são preservadas ao salvar, mas ignoradas
//
// Só a thread da UI escreve na configuração. Cada execução do pipeline
// recebe um snapshot imutável (Arc<AppConfig>) tirado no início da execução.
//
// ============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arquivo de configuração padrão (no diretório de trabalho)
pub const CONFIG_FILE: &str = "config.json";

/// Backend de OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Tesseract (binário local, multiplataforma)
    Tesseract,
    /// OCR nativo do Windows 10/11
    Windows,
}

impl OcrBackend {
    pub fn label(&self) -> &'static str {
        match self {
            OcrBackend::Tesseract => "Tesseract",
            OcrBackend::Windows => "Windows OCR",
        }
    }
}

impl Default for OcrBackend {
    fn default() -> Self {
        // O OCR do Windows só existe no Windows
        if cfg!(windows) {
            OcrBackend::Windows
        } else {
            OcrBackend::Tesseract
        }
    }
}

/// Backend de tradução
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationBackend {
    /// LLM local via Ollama (offline)
    #[default]
    Ollama,
    /// Google Translate (precisa de internet)
    Google,
}

impl TranslationBackend {
    pub fn label(&self) -> &'static str {
        match self {
            TranslationBackend::Ollama => "Ollama (offline)",
            TranslationBackend::Google => "Google Translate",
        }
    }

    /// Identificador curto (usado na chave do cache)
    pub fn id(&self) -> &'static str {
        match self {
            TranslationBackend::Ollama => "ollama",
            TranslationBackend::Google => "google",
        }
    }
}

/// Estrutura principal de configuração (espelha o config.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ocr_backend: OcrBackend,
    /// Idioma do OCR: "auto" ou código ISO (ex: "ja")
    pub ocr_language: String,
    /// Idioma de destino (código ISO-639-1, ex: "en", "pt")
    pub target_language: String,
    pub translation_backend: TranslationBackend,
    /// API key do Google Cloud Translation (vazia = endpoint público)
    pub google_api_key: String,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Opacidade da janela principal (0.3 - 1.0)
    pub window_opacity: f32,
    /// Tamanho da fonte do texto traduzido
    pub result_font_size: u32,
    /// Tecla global que inicia a captura (ex: "F9", "NumpadAdd")
    pub capture_hotkey: String,
    /// Chaves que a aplicação não conhece (preservadas ao salvar)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            ocr_backend: OcrBackend::default(),
            ocr_language: "auto".to_string(),
            target_language: "en".to_string(),
            translation_backend: TranslationBackend::Ollama,
            google_api_key: String::new(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            window_opacity: 0.9,
            result_font_size: 14,
            capture_hotkey: "F9".to_string(),
            extra: serde_json::Map::new(),
        }
    }
}

impl AppConfig {
    /// Lê a configuração de um arquivo.
    ///
    /// Nunca falha: arquivo ausente ou JSON inválido resultam na
    /// configuração padrão.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            warn!("⚠️  {:?} não encontrado, usando configuração padrão", path);
            return AppConfig::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("✅ Configurações carregadas de {:?}", path);
                config
            }
            Err(e) => {
                warn!("⚠️  Erro ao ler {:?}: {:#}", path, e);
                warn!("   Usando configuração padrão");
                AppConfig::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("Falha ao ler config.json")?;
        let config = serde_json::from_str(&contents).context("Falha ao parsear config.json")?;
        Ok(config)
    }

    /// Salva a configuração no arquivo (JSON indentado)
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Falha ao serializar configurações")?;

        fs::write(path, json).context("Falha ao escrever config.json")?;

        debug!("💾 Configurações salvas em {:?}", path);
        Ok(())
    }

    /// Idioma do OCR como Option (None = detecção automática)
    pub fn ocr_language(&self) -> Option<&str> {
        match self.ocr_language.trim() {
            "" | "auto" => None,
            lang => Some(lang),
        }
    }
}

/// Configuração carregada + caminho do arquivo onde ela é persistida.
///
/// Vive na thread da UI. Toda alteração é salva imediatamente.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    pub app_config: AppConfig,
}

impl Config {
    /// Carrega o config.json do diretório de trabalho
    pub fn load() -> Self {
        Self::load_from(PathBuf::from(CONFIG_FILE))
    }

    /// Carrega de um caminho específico
    pub fn load_from(path: PathBuf) -> Self {
        info!("📋 Carregando configurações...");

        let app_config = AppConfig::load_or_default(&path);

        info!(
            "   🔍 OCR: {} | 🌐 Tradução: {} → {}",
            app_config.ocr_backend.label(),
            app_config.translation_backend.label(),
            app_config.target_language
        );

        Config { path, app_config }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Salva no arquivo
    pub fn save(&self) -> Result<()> {
        self.app_config.save(&self.path)
    }

    /// Aplica uma alteração e salva imediatamente
    pub fn update<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        change(&mut self.app_config);
        self.save()
    }

    /// Volta tudo para o padrão e salva (chaves desconhecidas também somem)
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        info!("🔄 Restaurando configurações padrão...");
        self.app_config = AppConfig::default();
        self.save()
    }

    /// Recarrega do disco (usado quando o arquivo é editado por fora).
    ///
    /// Diferente do carregamento inicial: se o arquivo estiver ilegível
    /// (ex: editor ainda gravando), mantém a configuração atual.
    pub fn reload(&mut self) -> Result<()> {
        let app_config = AppConfig::read(&self.path)?;
        self.app_config = app_config;
        Ok(())
    }

    /// Snapshot imutável para uma execução do pipeline.
    ///
    /// API key vazia cai para a variável de ambiente GOOGLE_API_KEY.
    pub fn snapshot(&self) -> Arc<AppConfig> {
        let mut snapshot = self.app_config.clone();

        if snapshot.google_api_key.is_empty() {
            if let Ok(key) = env::var("GOOGLE_API_KEY") {
                snapshot.google_api_key = key;
            }
        }

        Arc::new(snapshot)
    }
}
