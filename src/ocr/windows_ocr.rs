// screen-translator/src/ocr/windows_ocr.rs

// ============================================================================
// BACKEND WINDOWS OCR (API nativa do Windows 10/11)
// ============================================================================
//
// Processa a imagem direto da RAM: PNG em memória → stream WinRT →
// SoftwareBitmap → OcrEngine do idioma pedido.
// Fora do Windows o backend simplesmente não está disponível.
//
// ============================================================================

use super::OcrError;
use image::DynamicImage;

pub const UNAVAILABLE_MESSAGE: &str = "Windows OCR indisponível.\n\n\
    Ele só existe no Windows 10/11 e precisa de pelo menos um pacote de idioma com OCR:\n\
    1. Configurações → Hora e Idioma → Idioma e Região\n\
    2. Adicione o idioma (ex: Japonês)\n\
    3. Baixe o pacote de idioma (inclui o OCR)\n\n\
    Alternativamente, use o Tesseract nas configurações.";

/// Disponível só no Windows com pelo menos um idioma de OCR instalado
pub fn is_available() -> bool {
    !installed_languages().is_empty()
}

/// Tags BCP-47 dos idiomas de OCR instalados
#[cfg(windows)]
pub fn installed_languages() -> Vec<String> {
    match imp::installed_languages() {
        Ok(tags) => tags,
        Err(e) => {
            warn!("⚠️  Falha ao listar idiomas do Windows OCR: {:#}", e);
            Vec::new()
        }
    }
}

#[cfg(not(windows))]
pub fn installed_languages() -> Vec<String> {
    Vec::new()
}

/// Reconhece o texto da imagem com o idioma `tag` (ex: "ja-JP")
#[cfg(windows)]
pub fn recognize(image: &DynamicImage, tag: &str) -> Result<String, OcrError> {
    imp::recognize(image, tag)
}

#[cfg(not(windows))]
pub fn recognize(_image: &DynamicImage, _tag: &str) -> Result<String, OcrError> {
    Err(OcrError::Unavailable(UNAVAILABLE_MESSAGE.to_string()))
}

#[cfg(windows)]
mod imp {
    use super::OcrError;
    use anyhow::{Context, Result};
    use image::DynamicImage;
    use std::io::Cursor;
    use windows::{
        core::HSTRING,
        Globalization::Language,
        Graphics::Imaging::{BitmapDecoder, SoftwareBitmap},
        Media::Ocr::OcrEngine,
        Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
    };

    pub fn installed_languages() -> Result<Vec<String>> {
        let languages = OcrEngine::AvailableRecognizerLanguages()
            .context("Falha ao listar idiomas do OCR")?;

        let mut tags = Vec::new();
        for i in 0..languages.Size()? {
            tags.push(languages.GetAt(i)?.LanguageTag()?.to_string_lossy());
        }

        Ok(tags)
    }

    pub fn recognize(image: &DynamicImage, tag: &str) -> Result<String, OcrError> {
        let language = Language::CreateLanguage(&HSTRING::from(tag))
            .map_err(|_| OcrError::LanguageNotSupported(tag.to_string()))?;

        let supported = OcrEngine::IsLanguageSupported(&language).unwrap_or(false);
        if !supported {
            return Err(OcrError::LanguageNotSupported(tag.to_string()));
        }

        let bitmap = to_software_bitmap(image).map_err(|e| OcrError::Image(format!("{:#}", e)))?;

        run_engine(&language, &bitmap).map_err(|e| OcrError::Engine(format!("{:#}", e)))
    }

    /// Converte a imagem para um SoftwareBitmap (via PNG em memória)
    fn to_software_bitmap(image: &DynamicImage) -> Result<SoftwareBitmap> {
        // ====================================================================
        // PASSO 1: Converter imagem para PNG em memória (bytes)
        // ====================================================================
        let mut png_bytes: Vec<u8> = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .context("Falha ao converter imagem para PNG")?;

        // ====================================================================
        // PASSO 2: Criar stream de memória para o Windows
        // ====================================================================
        let stream =
            InMemoryRandomAccessStream::new().context("Falha ao criar stream em memória")?;

        {
            let writer =
                DataWriter::CreateDataWriter(&stream).context("Falha ao criar DataWriter")?;

            writer
                .WriteBytes(&png_bytes)
                .context("Falha ao escrever bytes")?;

            writer
                .StoreAsync()
                .context("Falha ao iniciar store")?
                .get()
                .context("Falha ao armazenar bytes")?;

            writer.DetachStream().context("Falha ao desanexar stream")?;
        }

        stream
            .Seek(0)
            .context("Falha ao voltar ao início do stream")?;

        // ====================================================================
        // PASSO 3: Decodificar
        // ====================================================================
        let decoder = BitmapDecoder::CreateAsync(&stream)
            .context("Falha ao criar decoder")?
            .get()
            .context("Falha ao decodificar imagem")?;

        decoder
            .GetSoftwareBitmapAsync()
            .context("Falha ao criar bitmap")?
            .get()
            .context("Falha ao obter bitmap")
    }

    fn run_engine(language: &Language, bitmap: &SoftwareBitmap) -> Result<String> {
        let engine = OcrEngine::TryCreateFromLanguage(language)
            .context("Falha ao criar engine OCR para o idioma")?;

        let result = engine
            .RecognizeAsync(bitmap)
            .context("Falha ao executar OCR")?
            .get()
            .context("Falha ao obter resultado OCR")?;

        Ok(result
            .Text()
            .context("Falha ao obter texto")?
            .to_string_lossy())
    }
}
