// screen-translator/src/region_selector.rs

// ============================================================================
// MÓDULO REGION SELECTOR - Seleção visual de região
// ============================================================================
//
// Fluxo:
// 1. start_capture() tira um screenshot da tela inteira (congela a tela)
// 2. show() abre um viewport em tela cheia com o screenshot de fundo
// 3. O usuário arrasta um retângulo (ESC cancela)
// 4. Ao soltar, o screenshot é recortado e o viewport some
//
// As operações de ponteiro recebem coordenadas em PIXELS do screenshot;
// show() converte os pontos do egui usando pixels_per_point.
//
// ============================================================================

use anyhow::Result;
use eframe::egui;
use image::DynamicImage;

use crate::screenshot;

/// Seleções com largura ou altura até este valor são ignoradas
pub const MIN_SELECTION_SIZE: u32 = 10;

/// Coordenadas da região selecionada (pixels, origem no canto superior esquerdo)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SelectedRegion {
    /// Normaliza dois cantos quaisquer (o arraste pode ir em qualquer direção)
    pub fn from_corners(a: egui::Pos2, b: egui::Pos2) -> Self {
        let left = a.x.min(b.x).max(0.0).round();
        let top = a.y.min(b.y).max(0.0).round();
        let right = a.x.max(b.x).max(0.0).round();
        let bottom = a.y.max(b.y).max(0.0).round();

        SelectedRegion {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        }
    }

    pub fn is_large_enough(&self) -> bool {
        self.width > MIN_SELECTION_SIZE && self.height > MIN_SELECTION_SIZE
    }

    /// Limita a região aos limites da imagem (None se ficar vazia)
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<SelectedRegion> {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let clamped = SelectedRegion {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        };

        (clamped.width > 0 && clamped.height > 0).then_some(clamped)
    }
}

/// Seletor de região (vive na thread da UI)
#[derive(Default)]
pub struct RegionSelector {
    /// Screenshot congelado da tela
    snapshot: Option<DynamicImage>,
    /// Screenshot como textura do egui (criada sob demanda)
    texture: Option<egui::TextureHandle>,
    /// Início do arraste (pixels)
    drag_start: Option<egui::Pos2>,
    /// Posição atual do arraste (pixels)
    drag_current: Option<egui::Pos2>,
    /// Recorte da seleção concluída
    selected: Option<DynamicImage>,
    visible: bool,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captura a tela inteira e mostra o seletor
    pub fn start_capture(&mut self) -> Result<()> {
        info!("🎯 Abrindo seletor de região...");
        let snapshot = screenshot::capture_primary_screen()?;
        self.begin_with_snapshot(snapshot);
        Ok(())
    }

    /// Mostra o seletor sobre uma imagem já capturada
    pub fn begin_with_snapshot(&mut self, snapshot: DynamicImage) {
        self.snapshot = Some(snapshot);
        self.texture = None;
        self.drag_start = None;
        self.drag_current = None;
        self.selected = None;
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Mouse pressionado - inicia seleção
    pub fn pointer_down(&mut self, pos: egui::Pos2) {
        if !self.visible {
            return;
        }

        self.drag_start = Some(pos);
        self.drag_current = Some(pos);
        debug!("🖱️  Início da seleção: ({:.0}, {:.0})", pos.x, pos.y);
    }

    /// Mouse sendo arrastado - atualiza seleção
    pub fn pointer_move(&mut self, pos: egui::Pos2) {
        if self.drag_start.is_some() {
            self.drag_current = Some(pos);
        }
    }

    /// Mouse solto - finaliza seleção
    pub fn pointer_up(&mut self, pos: egui::Pos2) {
        let Some(start) = self.drag_start.take() else {
            return;
        };
        self.drag_current = None;

        let region = SelectedRegion::from_corners(start, pos);
        self.selected = self.crop(&region);

        match &self.selected {
            Some(image) => info!(
                "✅ Região selecionada: {}x{} na posição ({}, {})",
                image.width(),
                image.height(),
                region.x,
                region.y
            ),
            None => info!(
                "⚠️  Seleção pequena demais ({}x{}), ignorada",
                region.width, region.height
            ),
        }

        self.close();
    }

    /// ESC - cancela sem resultado
    pub fn cancel(&mut self) {
        info!("❌ Seleção cancelada");
        self.drag_start = None;
        self.drag_current = None;
        self.selected = None;
        self.close();
    }

    /// Recorte da última seleção (consome o resultado)
    pub fn take_selected_bitmap(&mut self) -> Option<DynamicImage> {
        self.selected.take()
    }

    /// Retângulo sendo arrastado (pixels)
    pub fn current_region(&self) -> Option<SelectedRegion> {
        Some(SelectedRegion::from_corners(
            self.drag_start?,
            self.drag_current?,
        ))
    }

    fn crop(&self, region: &SelectedRegion) -> Option<DynamicImage> {
        let snapshot = self.snapshot.as_ref()?;
        // O mínimo vale para a área realmente recortada
        let r = region
            .clamp_to(snapshot.width(), snapshot.height())
            .filter(SelectedRegion::is_large_enough)?;
        Some(snapshot.crop_imm(r.x, r.y, r.width, r.height))
    }

    fn close(&mut self) {
        self.visible = false;
        self.snapshot = None;
        self.texture = None;
    }

    // ========================================================================
    // RENDERIZAÇÃO
    // ========================================================================

    /// Desenha o seletor num viewport próprio (tela cheia, sempre no topo,
    /// sem bordas). Não faz nada se o seletor estiver fechado.
    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.visible {
            return;
        }

        self.ensure_texture(ctx);

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("region_selector"),
            egui::ViewportBuilder::default()
                .with_title("Seleção de Região")
                .with_fullscreen(true)
                .with_always_on_top()
                .with_decorations(false)
                .with_resizable(false),
            |ctx, _class| self.render(ctx),
        );
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }

        if let Some(snapshot) = &self.snapshot {
            let rgba = snapshot.to_rgba8();
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [rgba.width() as usize, rgba.height() as usize],
                rgba.as_raw(),
            );
            self.texture =
                Some(ctx.load_texture("region_snapshot", image, egui::TextureOptions::LINEAR));
        }
    }

    fn render(&mut self, ctx: &egui::Context) {
        let cancelled =
            ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.viewport().close_requested());
        if cancelled {
            self.cancel();
            return;
        }

        let ppp = ctx.pixels_per_point();

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let screen = ui.max_rect();
                let to_pixels = |pos: egui::Pos2| {
                    egui::pos2((pos.x - screen.min.x) * ppp, (pos.y - screen.min.y) * ppp)
                };

                // ============================================================
                // DETECTA INTERAÇÃO DO MOUSE
                // ============================================================
                let response = ui.interact(
                    screen,
                    egui::Id::new("region_selector_drag"),
                    egui::Sense::click_and_drag(),
                );

                if response.drag_started() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.pointer_down(to_pixels(pos));
                    }
                }

                if response.dragged() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.pointer_move(to_pixels(pos));
                        ctx.request_repaint();
                    }
                }

                if response.drag_stopped() {
                    let end = response
                        .interact_pointer_pos()
                        .map(to_pixels)
                        .or(self.drag_current);
                    if let Some(end) = end {
                        self.pointer_up(end);
                    }
                    return;
                }

                // ============================================================
                // DESENHA O FUNDO (Screenshot) + ESCURECIMENTO
                // ============================================================
                let painter = ui.painter();

                if let Some(texture) = &self.texture {
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    painter.image(texture.id(), screen, uv, egui::Color32::WHITE);
                }

                let selection = self.current_region();
                let selection_rect = selection.map(|r| {
                    egui::Rect::from_min_size(
                        screen.min + egui::vec2(r.x as f32, r.y as f32) / ppp,
                        egui::vec2(r.width as f32, r.height as f32) / ppp,
                    )
                });

                let dim = egui::Color32::from_rgba_unmultiplied(0, 0, 0, 100);
                for rect in outside_rects(screen, selection_rect) {
                    painter.rect_filled(rect, 0.0, dim);
                }

                // ============================================================
                // INSTRUÇÕES
                // ============================================================
                painter.text(
                    screen.min + egui::vec2(20.0, 30.0),
                    egui::Align2::LEFT_TOP,
                    "Clique e arraste para selecionar a área do texto",
                    egui::FontId::proportional(18.0),
                    egui::Color32::WHITE,
                );

                painter.text(
                    screen.min + egui::vec2(20.0, 56.0),
                    egui::Align2::LEFT_TOP,
                    "Pressione ESC para cancelar",
                    egui::FontId::proportional(14.0),
                    egui::Color32::LIGHT_GRAY,
                );

                // ============================================================
                // DESENHA O RETÂNGULO DE SELEÇÃO
                // ============================================================
                if let (Some(region), Some(rect)) = (selection, selection_rect) {
                    painter.rect_stroke(
                        rect,
                        0.0,
                        egui::Stroke::new(2.0, egui::Color32::from_rgb(0, 255, 0)),
                    );

                    painter.text(
                        rect.left_top() + egui::vec2(0.0, -4.0),
                        egui::Align2::LEFT_BOTTOM,
                        format!("{}x{}", region.width, region.height),
                        egui::FontId::proportional(16.0),
                        egui::Color32::from_rgb(0, 255, 0),
                    );
                }
            });
    }
}

/// Retângulos que cobrem a tela toda menos a seleção
fn outside_rects(screen: egui::Rect, selection: Option<egui::Rect>) -> Vec<egui::Rect> {
    let Some(sel) = selection.map(|s| s.intersect(screen)).filter(|s| s.is_positive()) else {
        return vec![screen];
    };

    vec![
        // Acima
        egui::Rect::from_min_max(screen.min, egui::pos2(screen.max.x, sel.min.y)),
        // Abaixo
        egui::Rect::from_min_max(egui::pos2(screen.min.x, sel.max.y), screen.max),
        // Esquerda
        egui::Rect::from_min_max(
            egui::pos2(screen.min.x, sel.min.y),
            egui::pos2(sel.min.x, sel.max.y),
        ),
        // Direita
        egui::Rect::from_min_max(
            egui::pos2(sel.max.x, sel.min.y),
            egui::pos2(screen.max.x, sel.max.y),
        ),
    ]
}
