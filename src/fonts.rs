// screen-translator/src/fonts.rs

// ============================================================================
// FONTES - Fallback para CJK / tailandês / árabe
// ============================================================================
//
// As fontes embutidas do egui só cobrem latim. Texto japonês, chinês ou
// coreano saído do OCR apareceria como quadradinhos, então procuramos
// fontes do sistema e as adicionamos como fallback.
//
// ============================================================================

use std::path::Path;

/// Fontes procuradas (a primeira encontrada de cada grupo basta)
const SYSTEM_FONT_CANDIDATES: &[&[&str]] = &[
    // CJK
    &[
        "C:\\Windows\\Fonts\\msyh.ttc",
        "C:\\Windows\\Fonts\\YuGothM.ttc",
        "C:\\Windows\\Fonts\\meiryo.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
        "/System/Library/Fonts/Hiragino Sans GB.ttc",
    ],
    // Coreano
    &[
        "C:\\Windows\\Fonts\\malgun.ttf",
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    ],
    // Tailandês
    &[
        "C:\\Windows\\Fonts\\tahoma.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansThai-Regular.ttf",
    ],
];

/// Registra `data` como fallback (depois das fontes padrão) nas famílias
/// proporcional e monoespaçada
fn add_fallback(fonts: &mut egui::FontDefinitions, name: &str, data: Vec<u8>) {
    fonts
        .font_data
        .insert(name.to_owned(), egui::FontData::from_owned(data));

    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(name.to_owned());
    }
}

/// Carrega as fontes de fallback encontradas no sistema
pub fn install_fallback_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    let mut loaded = 0;

    for (group, candidates) in SYSTEM_FONT_CANDIDATES.iter().enumerate() {
        let Some(path) = candidates.iter().map(Path::new).find(|p| p.exists()) else {
            continue;
        };

        match std::fs::read(path) {
            Ok(data) => {
                add_fallback(&mut fonts, &format!("fallback_{}", group), data);
                info!("🔤 Fonte de fallback: {}", path.display());
                loaded += 1;
            }
            Err(e) => warn!("⚠️  Erro ao carregar fonte {}: {}", path.display(), e),
        }
    }

    if loaded == 0 {
        warn!("⚠️  Nenhuma fonte CJK encontrada; texto asiático pode não aparecer");
    }

    ctx.set_fonts(fonts);
}
