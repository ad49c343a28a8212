// screen-translator/src/runtime.rs

// ============================================================================
// THREADS DE FUNDO (hotkey global e monitoramento do config.json)
// ============================================================================

pub mod config_watcher;
pub mod hotkeys;
