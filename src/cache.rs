// screen-translator/src/cache.rs

// ============================================================================
// MÓDULO CACHE - Cache de traduções para evitar chamadas repetidas à API
// ============================================================================
//
// Guarda em memória as traduções já feitas nesta sessão. Capturar de novo o
// mesmo texto (ex: o mesmo balão de diálogo) não chama a rede outra vez.
// Só traduções bem-sucedidas entram; nada é gravado em disco.
//
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache de traduções (clonar compartilha o mesmo mapa)
#[derive(Debug, Clone, Default)]
pub struct TranslationCache {
    /// HashMap: chave = "backend:idioma_destino:texto_original"
    /// valor = texto traduzido
    cache: Arc<Mutex<HashMap<String, String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gera a chave única para um texto
    fn make_key(backend: &str, target_lang: &str, text: &str) -> String {
        format!("{}:{}:{}", backend, target_lang, text)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Um pânico no meio de um insert não deixa o mapa inconsistente
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Busca uma tradução no cache
    pub fn get(&self, backend: &str, target_lang: &str, text: &str) -> Option<String> {
        let key = Self::make_key(backend, target_lang, text);
        self.entries().get(&key).cloned()
    }

    /// Adiciona uma tradução ao cache
    pub fn set(&self, backend: &str, target_lang: &str, original: &str, translated: &str) {
        let key = Self::make_key(backend, target_lang, original);
        self.entries().insert(key, translated.to_string());
    }

    /// Quantidade de entradas
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Limpa o cache
    pub fn clear(&self) {
        if self.is_empty() {
            return;
        }

        self.entries().clear();
        info!("🗑️  Cache limpo!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_finds_translations() {
        let cache = TranslationCache::new();
        assert_eq!(cache.get("ollama", "pt", "Hello"), None);

        cache.set("ollama", "pt", "Hello", "Olá");
        assert_eq!(cache.get("ollama", "pt", "Hello").as_deref(), Some("Olá"));
    }

    #[test]
    fn key_includes_backend_and_target() {
        let cache = TranslationCache::new();
        cache.set("ollama", "pt", "Hello", "Olá");

        assert_eq!(cache.get("google", "pt", "Hello"), None);
        assert_eq!(cache.get("ollama", "fr", "Hello"), None);
    }

    #[test]
    fn clones_share_the_same_entries() {
        let cache = TranslationCache::new();
        let other = cache.clone();

        other.set("google", "ja", "cat", "猫");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(other.is_empty());
    }
}
