// screen-translator/src/ocr/cleanup.rs

// ============================================================================
// LIMPEZA DO TEXTO DO OCR
// ============================================================================
//
// Remove o "lixo" típico do OCR antes de traduzir:
// - caracteres de desenho de caixa, formas, controle e largura zero
// - pontuação repetida demais ("......" → "...")
// - linhas que são quase só ruído
// - espaços e linhas em branco em excesso
//
// A limpeza é idempotente: limpar de novo não muda nada.
//
// ============================================================================

/// Caracteres de desenho de caixa (bordas de balões confundidas com texto)
const BOX_DRAWING: &[char] = &['│', '┃', '┆', '┇', '┊', '┋', '╎', '╏', '║'];

/// Formas que aparecem como ruído
const NOISE_SHAPES: &[char] = &[
    '◆', '◇', '○', '●', '□', '■', '△', '▲', '▽', '▼', '◎', '★', '☆',
];

/// Soft hyphen, largura zero, marcas de direção e BOM
const INVISIBLE: &[char] = &[
    '\u{00AD}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{200E}', '\u{200F}', '\u{FEFF}',
];

/// Proporção mínima de caracteres úteis para manter uma linha
const MIN_MEANINGFUL_RATIO: f32 = 0.3;

/// Com pelo menos isso de caracteres úteis a linha sempre fica
const MIN_MEANINGFUL_CHARS: usize = 2;

/// Limpa texto do OCR
pub fn clean_ocr_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text.chars().filter(|c| !is_noise(*c)).collect();
    let collapsed = collapse_punctuation(&stripped);

    let lines: Vec<String> = collapsed
        .split('\n')
        .filter_map(|line| {
            if line.trim().is_empty() {
                // Linha em branco = separador de parágrafo
                return Some(String::new());
            }
            keep_line(line).then(|| collapse_spaces(line))
        })
        .collect();

    collapse_blank_lines(&lines.join("\n")).trim().to_string()
}

/// Caractere "útil": letra, número, '_' ou CJK (o alfanumérico do Rust já
/// cobre hiragana, katakana, kanji e hangul)
pub fn is_meaningful(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Quantidade de caracteres úteis no texto
pub fn count_meaningful(text: &str) -> usize {
    text.chars().filter(|c| is_meaningful(*c)).count()
}

fn is_noise(c: char) -> bool {
    BOX_DRAWING.contains(&c) || NOISE_SHAPES.contains(&c) || INVISIBLE.contains(&c) || {
        // Controle ASCII, exceto \t \n \r
        ((c as u32) < 0x20 || c == '\u{7F}') && !matches!(c, '\t' | '\n' | '\r')
    }
}

fn keep_line(line: &str) -> bool {
    let total = line.trim().chars().count();
    let meaningful = count_meaningful(line);

    meaningful >= MIN_MEANINGFUL_CHARS || meaningful as f32 / total as f32 > MIN_MEANINGFUL_RATIO
}

/// "...." → "...", "!!!" → "!!", "???" → "??"
fn collapse_punctuation(text: &str) -> String {
    collapse_runs(text, |c| match c {
        '.' => Some((4, 3)),
        '!' | '?' => Some((3, 2)),
        _ => None,
    })
}

/// 3+ espaços/tabs viram 2 espaços
fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut run = String::new();

    for c in line.chars() {
        if c == ' ' || c == '\t' {
            run.push(c);
            continue;
        }
        flush_spaces(&mut out, &mut run);
        out.push(c);
    }
    flush_spaces(&mut out, &mut run);

    out
}

fn flush_spaces(out: &mut String, run: &mut String) {
    if run.chars().count() >= 3 {
        out.push_str("  ");
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// 3+ quebras de linha viram uma linha em branco
fn collapse_blank_lines(text: &str) -> String {
    collapse_runs(text, |c| (c == '\n').then_some((3, 2)))
}

/// Reduz sequências do mesmo caractere: `rule(c)` devolve
/// (tamanho a partir do qual reduz, tamanho final)
fn collapse_runs<F>(text: &str, rule: F) -> String
where
    F: Fn(char) -> Option<(usize, usize)>,
{
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }

        let keep = match rule(c) {
            Some((limit, target)) if run >= limit => target,
            _ => run,
        };
        out.extend(std::iter::repeat(c).take(keep));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_ocr_text(""), "");
    }

    #[test]
    fn strips_box_drawing_and_invisible_characters() {
        let raw = "║Hello\u{200B} world│\u{0007}";
        assert_eq!(clean_ocr_text(raw), "Hello world");
    }

    #[test]
    fn collapses_repeated_punctuation() {
        assert_eq!(clean_ocr_text("Wait...... what!!!! why?????"), "Wait... what!! why??");
    }

    #[test]
    fn keeps_short_runs_of_punctuation() {
        assert_eq!(clean_ocr_text("Hmm... ok!! sure??"), "Hmm... ok!! sure??");
    }

    #[test]
    fn drops_lines_that_are_mostly_noise() {
        let raw = "こんにちは\n- ~ = ; : a\n-- --";
        assert_eq!(clean_ocr_text(raw), "こんにちは");
    }

    #[test]
    fn keeps_lines_with_two_meaningful_chars() {
        assert_eq!(clean_ocr_text("## -- ok -- ##"), "## -- ok -- ##");
    }

    #[test]
    fn keeps_short_lines_with_high_ratio() {
        assert_eq!(clean_ocr_text("A."), "A.");
    }

    #[test]
    fn collapses_whitespace_and_blank_lines() {
        let raw = "first     line\n\n\n\n\nsecond\tline";
        assert_eq!(clean_ocr_text(raw), "first  line\n\nsecond\tline");
    }

    #[test]
    fn noise_only_text_cleans_to_empty() {
        assert_eq!(clean_ocr_text("│ ║ ■\n--\n  \u{200B}"), "");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "║Hello\u{200B} world│",
            "Wait...... what!!!! why?????",
            "こんにちは\n- ~ = ; : a\n-- --",
            "first     line\n\n\n\n\nsecond\tline",
            "  .. │ ..  \n\n\n\n x  .  y \n ! \n",
            "안녕하세요 ★ 世界\r\n\r\n\r\n\r\nline\t\t\t\tend....",
            "a\n\n \n\n \n\nb",
        ];

        for sample in samples {
            let once = clean_ocr_text(sample);
            let twice = clean_ocr_text(&once);
            assert_eq!(once, twice, "não idempotente para {:?}", sample);
        }
    }

    #[test]
    fn cjk_counts_as_meaningful() {
        assert_eq!(count_meaningful("日本語テキスト"), 7);
        assert_eq!(count_meaningful("한국어"), 3);
        assert_eq!(count_meaningful("-- !!"), 0);
    }
}
