// screen-translator/src/translator.rs

// ============================================================================
// MÓDULO TRANSLATOR - Tradução usando múltiplos provedores
// ============================================================================
//
// Provedores suportados:
// - Ollama (LLM local, offline)
// - Google Translate (API oficial com API key, ou endpoint público sem key)
//
// O idioma de origem é sempre detectado automaticamente.
//
// ============================================================================

use crate::config::{AppConfig, TranslationBackend};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Timeout da geração (o modelo pode estar carregando)
const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout das consultas de status (/api/tags)
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout da geração de teste ("Hi")
const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(30);

const GOOGLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Temperatura baixa = tradução mais literal
const TEMPERATURE: f32 = 0.3;

/// Quantos caracteres do corpo de erro HTTP são mostrados
const ERROR_BODY_LIMIT: usize = 200;

// ============================================================================
// ERROS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("Erro: não foi possível conectar ao Ollama em {url}. Ele está rodando?")]
    CannotConnect { url: String },

    #[error(
        "Erro: a requisição ao Ollama expirou. \
         O modelo pode estar carregando ou o texto é longo demais."
    )]
    Timeout,

    #[error("{}", model_not_found_message(.model, .available))]
    ModelNotFound {
        model: String,
        /// Modelos instalados (None se a listagem também falhou)
        available: Option<Vec<String>>,
    },

    #[error("Erro do Ollama: HTTP {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Resposta inválida do servidor: {0}")]
    Parse(String),

    #[error("Erro do Google Translate: {0}")]
    Google(String),

    #[error("Erro na requisição: {0}")]
    Request(String),
}

fn model_not_found_message(model: &str, available: &Option<Vec<String>>) -> String {
    match available {
        Some(models) => format!(
            "Erro do Ollama: modelo '{}' não encontrado.\n\n\
             Modelos disponíveis: {}\n\n\
             Atualize o nome do modelo nas configurações.",
            model,
            models.join(", ")
        ),
        None => format!(
            "Erro do Ollama: modelo '{}' não encontrado (HTTP 404).\n\n\
             Confira o nome do modelo nas configurações ou rode: ollama pull {}",
            model, model
        ),
    }
}

impl TranslationError {
    /// Converte um erro do reqwest (chamadas ao Ollama)
    fn from_reqwest(e: reqwest::Error, base_url: &str) -> Self {
        if e.is_timeout() {
            TranslationError::Timeout
        } else if e.is_connect() {
            TranslationError::CannotConnect {
                url: base_url.to_string(),
            }
        } else if e.is_decode() {
            TranslationError::Parse(e.to_string())
        } else {
            TranslationError::Request(e.to_string())
        }
    }
}

// ============================================================================
// CONTRATO DO TRADUTOR
// ============================================================================

/// Traduz texto para o idioma de destino (código ISO-639-1).
///
/// Texto vazio ou só com espaços devolve `""` sem chamar a rede.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError>;
}

/// Tradutor configurado a partir do snapshot da configuração
pub struct Translator {
    backend: TranslationBackend,
    service: Box<dyn TranslationService>,
}

impl Translator {
    pub fn from_config(config: &AppConfig) -> Self {
        let service: Box<dyn TranslationService> = match config.translation_backend {
            TranslationBackend::Ollama => Box::new(OllamaTranslator::new(
                &config.ollama_url,
                &config.ollama_model,
            )),
            TranslationBackend::Google => {
                Box::new(GoogleTranslator::new(Some(config.google_api_key.clone())))
            }
        };

        Translator {
            backend: config.translation_backend,
            service,
        }
    }

    pub fn backend(&self) -> TranslationBackend {
        self.backend
    }
}

#[async_trait]
impl TranslationService for Translator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.service.translate(text, target_lang).await
    }
}

// ============================================================================
// ESTRUTURAS DE DADOS - Ollama
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

// ============================================================================
// OLLAMA TRADUTOR
// ============================================================================

/// Nome completo do idioma (usado no prompt). Código desconhecido = o próprio código.
pub fn language_name(code: &str) -> &str {
    match code.to_lowercase().as_str() {
        "es" => "Spanish",
        "en" => "English",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "vi" => "Vietnamese",
        "th" => "Thai",
        _ => code,
    }
}

/// Monta o prompt de tradução
pub fn build_prompt(text: &str, target_lang: &str) -> String {
    format!(
        "Translate the following text to {}. \
         Detect the source language automatically. \
         Return only the translation, no explanations or additional text:\n\n{}",
        language_name(target_lang),
        text
    )
}

/// Limpa a resposta do modelo: remove um rótulo "Translation:" e uma camada
/// de aspas em volta do texto
pub fn clean_model_response(raw: &str) -> String {
    const LABEL: &str = "translation:";
    const QUOTES: [(&str, &str); 4] = [("\"", "\""), ("'", "'"), ("“", "”"), ("「", "」")];

    let mut text = raw.trim();

    let has_label = text
        .get(..LABEL.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(LABEL));
    if has_label {
        text = text[LABEL.len()..].trim_start();
    }

    for (open, close) in QUOTES {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            text = inner.trim();
            break;
        }
    }

    text.to_string()
}

/// Corta o texto em `limit` caracteres (sem quebrar UTF-8)
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Cliente do servidor Ollama
#[derive(Debug, Clone)]
pub struct OllamaTranslator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaTranslator {
    pub fn new(base_url: &str, model: &str) -> Self {
        OllamaTranslator {
            client: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            model: model.trim().to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request_error(&self, e: reqwest::Error) -> TranslationError {
        TranslationError::from_reqwest(e, &self.base_url)
    }

    /// Lista os modelos instalados (GET /api/tags)
    pub async fn list_models(&self) -> Result<Vec<String>, TranslationError> {
        let response = self
            .client
            .get(self.endpoint("/api/tags"))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_LIMIT),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Testa servidor + modelo: lista os modelos, confere se o configurado
    /// existe e faz uma geração mínima. Devolve os modelos instalados.
    pub async fn test_connection(&self) -> Result<Vec<String>, TranslationError> {
        info!("🔌 Testando conexão com Ollama em {}...", self.base_url);

        let models = self.list_models().await?;

        // Nome vazio "casaria" com qualquer modelo instalado
        let model = self.model.trim();
        let model_exists = !model.is_empty()
            && models
                .iter()
                .any(|name| name.contains(model) || model.contains(name.as_str()));

        if !model_exists {
            warn!("⚠️  Modelo '{}' não encontrado no servidor", self.model);
            return Err(TranslationError::ModelNotFound {
                model: self.model.clone(),
                available: Some(models),
            });
        }

        let warmup = GenerateRequest {
            model: &self.model,
            prompt: "Hi",
            stream: false,
            options: None,
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .timeout(CONNECTION_TEST_TIMEOUT)
            .json(&warmup)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_LIMIT),
            });
        }

        info!("✅ Ollama OK ({} modelos instalados)", models.len());
        Ok(models)
    }
}

#[async_trait]
impl TranslationService for OllamaTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        info!(
            "🌐 [Ollama] Traduzindo {} caracteres com '{}' → {}",
            text.chars().count(),
            self.model,
            target_lang
        );

        let prompt = build_prompt(text, target_lang);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
            options: Some(GenerateOptions {
                temperature: TEMPERATURE,
            }),
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .timeout(GENERATE_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            // Modelo não existe: tenta listar os disponíveis para ajudar
            let available = match self.list_models().await {
                Ok(models) => Some(models),
                Err(e) => {
                    debug!("   Falha ao listar modelos: {}", e);
                    None
                }
            };

            error!("❌ Modelo '{}' não encontrado no Ollama", self.model);
            return Err(TranslationError::ModelNotFound {
                model: self.model.clone(),
                available,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Ollama erro: {} - {}", status, body);
            return Err(TranslationError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_LIMIT),
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        let translated = clean_model_response(&generated.response);

        info!("✅ [Ollama] Tradução concluída!");
        Ok(translated)
    }
}

/// Lista os modelos de um servidor Ollama (usado pelas configurações)
pub async fn list_models(base_url: &str) -> Result<Vec<String>, TranslationError> {
    OllamaTranslator::new(base_url, "").list_models().await
}

/// Testa o servidor Ollama + modelo (usado pelas configurações)
pub async fn test_connection(base_url: &str, model: &str) -> Result<Vec<String>, TranslationError> {
    OllamaTranslator::new(base_url, model).test_connection().await
}

// ============================================================================
// GOOGLE TRANSLATE
// ============================================================================

const GOOGLE_CLOUD_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const GOOGLE_PUBLIC_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Serialize)]
struct CloudTranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct CloudTranslateResponse {
    data: CloudTranslateData,
}

#[derive(Debug, Deserialize)]
struct CloudTranslateData {
    translations: Vec<CloudTranslation>,
}

#[derive(Debug, Deserialize)]
struct CloudTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Google Translate: API oficial (com key) ou endpoint público (sem key)
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GoogleTranslator {
    pub fn new(api_key: Option<String>) -> Self {
        GoogleTranslator {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    async fn translate_cloud(
        &self,
        key: &str,
        text: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        info!("🌐 [Google] Enviando para Cloud Translation API...");

        let response = self
            .client
            .post(GOOGLE_CLOUD_URL)
            .query(&[("key", key)])
            .timeout(GOOGLE_TIMEOUT)
            .json(&CloudTranslateRequest {
                q: text,
                target,
                format: "text",
            })
            .send()
            .await
            .map_err(|e| TranslationError::Google(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Google Translate erro: {}", status);
            return Err(TranslationError::Google(format!(
                "HTTP {} - {}",
                status.as_u16(),
                truncate_chars(&body, ERROR_BODY_LIMIT)
            )));
        }

        let parsed: CloudTranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Google(e.to_string()))?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| TranslationError::Google("Resposta sem tradução".to_string()))
    }

    async fn translate_public(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        info!("🌐 [Google] Enviando para Google Translate (público)...");

        let url = format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            GOOGLE_PUBLIC_URL,
            target,
            urlencoding::encode(text)
        );

        let response = self
            .client
            .get(&url)
            .header(
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )
            .timeout(GOOGLE_TIMEOUT)
            .send()
            .await
            .map_err(|e| TranslationError::Google(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ Google Translate erro: {}", status);
            return Err(TranslationError::Google(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::Google(e.to_string()))?;

        parse_google_response(&body)
    }
}

#[async_trait]
impl TranslationService for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let target = convert_lang_code_to_google(target_lang);

        let translated = match &self.api_key {
            Some(key) => self.translate_cloud(key, text, &target).await?,
            None => self.translate_public(text, &target).await?,
        };

        info!("✅ [Google] Tradução concluída!");
        Ok(translated.trim().to_string())
    }
}

/// Parseia a resposta do endpoint público do Google.
/// O formato é um array aninhado: [[["tradução","original",...],...],...]
fn parse_google_response(response: &str) -> Result<String, TranslationError> {
    let json: serde_json::Value = serde_json::from_str(response)
        .map_err(|e| TranslationError::Google(format!("Falha ao parsear resposta: {}", e)))?;

    let translated: String = json
        .get(0)
        .and_then(|sentences| sentences.as_array())
        .map(|sentences| {
            sentences
                .iter()
                .filter_map(|sentence| sentence.get(0).and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if translated.is_empty() {
        return Err(TranslationError::Google(
            "Não foi possível extrair tradução da resposta".to_string(),
        ));
    }

    Ok(translated)
}

/// Converte códigos de idioma para o formato do Google
fn convert_lang_code_to_google(lang: &str) -> String {
    match lang.trim().to_lowercase().as_str() {
        "zh" | "zh-cn" => "zh-CN".to_string(),
        "zh-tw" => "zh-TW".to_string(),
        "pt-br" | "pt-pt" => "pt".to_string(),
        "en-us" | "en-gb" => "en".to_string(),
        code => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    // ========================================================================
    // SERVIDOR OLLAMA FALSO
    // ========================================================================

    /// Rota do servidor falso: caminho → (status, corpo)
    type Route = (&'static str, u16, String);

    /// Sobe um servidor HTTP mínimo em 127.0.0.1 e devolve a URL base e o
    /// contador de requisições recebidas
    async fn fake_ollama(routes: Vec<Route>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let routes = routes.clone();
                tokio::spawn(async move { respond(stream, &routes).await });
            }
        });

        (url, hits)
    }

    async fn respond(mut stream: TcpStream, routes: &[Route]) {
        let request = read_request(&mut stream).await;
        let path = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/")
            .to_string();

        let (status, body) = routes
            .iter()
            .find(|(route, _, _)| *route == path)
            .map(|(_, status, body)| (*status, body.clone()))
            .unwrap_or((404, r#"{"error":"not found"}"#.to_string()));

        let response = format!(
            "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    /// Lê cabeçalhos + corpo (Content-Length)
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);

                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&data).to_string()
    }

    fn tags_body(names: &[&str]) -> String {
        let models: Vec<_> = names
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        serde_json::json!({ "models": models }).to_string()
    }

    /// Porta onde ninguém escuta
    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    // ========================================================================
    // OLLAMA
    // ========================================================================

    #[tokio::test]
    async fn translates_and_cleans_the_model_response() {
        let body = serde_json::json!({ "response": "Translation: \"Bonjour le monde\"" }).to_string();
        let (url, _) = fake_ollama(vec![("/api/generate", 200, body)]).await;

        let translator = OllamaTranslator::new(&url, "llama3");
        let translated = translator.translate("Hello world", "fr").await.unwrap();

        assert_eq!(translated, "Bonjour le monde");
    }

    #[tokio::test]
    async fn blank_input_never_reaches_the_server() {
        let (url, hits) = fake_ollama(vec![]).await;
        let translator = OllamaTranslator::new(&url, "llama3");

        assert_eq!(translator.translate("", "fr").await.unwrap(), "");
        assert_eq!(translator.translate("  \n\t ", "fr").await.unwrap(), "");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_input_works_even_without_a_server() {
        let config = AppConfig {
            ollama_url: closed_port_url().await,
            ..AppConfig::default()
        };

        let translator = Translator::from_config(&config);
        assert_eq!(translator.translate("   ", "en").await.unwrap(), "");
    }

    #[tokio::test]
    async fn missing_model_lists_the_available_ones() {
        let (url, _) = fake_ollama(vec![
            ("/api/generate", 404, r#"{"error":"model 'llama3' not found"}"#.to_string()),
            ("/api/tags", 200, tags_body(&["gemma:2b", "mistral:latest"])),
        ])
        .await;

        let err = OllamaTranslator::new(&url, "llama3")
            .translate("Hello", "fr")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TranslationError::ModelNotFound {
                model: "llama3".to_string(),
                available: Some(vec!["gemma:2b".to_string(), "mistral:latest".to_string()]),
            }
        );

        let message = err.to_string();
        assert!(message.contains("llama3"));
        assert!(message.contains("gemma:2b, mistral:latest"));
    }

    #[tokio::test]
    async fn missing_model_without_tags_suggests_a_pull() {
        let (url, _) = fake_ollama(vec![("/api/generate", 404, "{}".to_string())]).await;

        let err = OllamaTranslator::new(&url, "qwen2")
            .translate("Hello", "fr")
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::ModelNotFound { available: None, .. }));
        assert!(err.to_string().contains("ollama pull qwen2"));
    }

    #[tokio::test]
    async fn other_http_errors_keep_a_short_body() {
        let long_body = "x".repeat(500);
        let (url, _) = fake_ollama(vec![("/api/generate", 500, long_body)]).await;

        let err = OllamaTranslator::new(&url, "llama3")
            .translate("Hello", "fr")
            .await
            .unwrap_err();

        match err {
            TranslationError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), ERROR_BODY_LIMIT);
            }
            other => panic!("esperava Http, veio {:?}", other),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_reported() {
        let url = closed_port_url().await;

        let err = OllamaTranslator::new(&url, "llama3")
            .translate("Hello", "fr")
            .await
            .unwrap_err();

        assert_eq!(err, TranslationError::CannotConnect { url });
    }

    #[tokio::test]
    async fn connection_test_accepts_partial_model_names() {
        let (url, _) = fake_ollama(vec![
            ("/api/tags", 200, tags_body(&["llama3:latest", "gemma:2b"])),
            ("/api/generate", 200, r#"{"response":"Hello!"}"#.to_string()),
        ])
        .await;

        let models = test_connection(&url, "llama3").await.unwrap();
        assert_eq!(models, vec!["llama3:latest", "gemma:2b"]);
    }

    #[tokio::test]
    async fn connection_test_reports_a_missing_model() {
        let (url, hits) = fake_ollama(vec![("/api/tags", 200, tags_body(&["gemma:2b"]))]).await;

        let err = test_connection(&url, "mistral").await.unwrap_err();

        assert!(matches!(err, TranslationError::ModelNotFound { .. }));
        // Só a listagem, sem geração de teste
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connection_test_rejects_a_blank_model_name() {
        let (url, hits) = fake_ollama(vec![
            ("/api/tags", 200, tags_body(&["llama3:latest"])),
            ("/api/generate", 200, r#"{"response":"Hello!"}"#.to_string()),
        ])
        .await;

        for blank in ["", "   "] {
            let err = test_connection(&url, blank).await.unwrap_err();
            assert!(matches!(
                err,
                TranslationError::ModelNotFound { available: Some(ref models), .. }
                    if models == &vec!["llama3:latest".to_string()]
            ));
        }
        // Nenhuma geração de teste foi feita
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn lists_models_for_the_settings_picker() {
        let (url, _) = fake_ollama(vec![("/api/tags", 200, tags_body(&["a", "b"]))]).await;

        assert_eq!(list_models(&format!("{}/", url)).await.unwrap(), vec!["a", "b"]);
    }

    // ========================================================================
    // FUNÇÕES PURAS
    // ========================================================================

    #[test]
    fn cleans_labels_and_one_layer_of_quotes() {
        assert_eq!(clean_model_response("  Olá mundo \n"), "Olá mundo");
        assert_eq!(clean_model_response("TRANSLATION: Hola"), "Hola");
        assert_eq!(clean_model_response("“Guten Tag”"), "Guten Tag");
        assert_eq!(clean_model_response("「こんにちは」"), "こんにちは");
        assert_eq!(clean_model_response("'\"nested\"'"), "\"nested\"");
        assert_eq!(clean_model_response("\""), "\"");
    }

    #[test]
    fn prompt_names_the_target_language() {
        let prompt = build_prompt("こんにちは", "vi");
        assert!(prompt.contains("to Vietnamese"));
        assert!(prompt.ends_with("\n\nこんにちは"));

        assert!(build_prompt("hi", "sw").contains("to sw."));
    }

    #[test]
    fn parses_the_public_google_format() {
        let body = r#"[[["Olá ","Hello ",null],["mundo","world",null]],null,"en"]"#;
        assert_eq!(parse_google_response(body).unwrap(), "Olá mundo");

        assert!(matches!(parse_google_response("[]"), Err(TranslationError::Google(_))));
    }

    #[test]
    fn google_language_codes() {
        assert_eq!(convert_lang_code_to_google("zh"), "zh-CN");
        assert_eq!(convert_lang_code_to_google("PT-BR"), "pt");
        assert_eq!(convert_lang_code_to_google("ja"), "ja");
    }

    #[test]
    fn empty_api_key_uses_the_public_endpoint() {
        assert!(GoogleTranslator::new(Some("  ".to_string())).api_key.is_none());
        assert!(GoogleTranslator::new(Some("abc".to_string())).api_key.is_some());
    }

    #[test]
    fn translator_follows_the_config() {
        let config = AppConfig {
            translation_backend: TranslationBackend::Google,
            ..AppConfig::default()
        };
        assert_eq!(Translator::from_config(&config).backend(), TranslationBackend::Google);
    }
}
