// src/report/layout.rs
//! Modelo de documento paginado (A4, medidas en milímetros).

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const BOTTOM_MARGIN_MM: f32 = 20.0;
/// Altura donde empieza el contenido de cada página nueva.
pub const PAGE_TOP_MM: f32 = 20.0;
pub const SIDE_MARGIN_MM: f32 = 20.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * SIDE_MARGIN_MM;

pub const HEADER_SPACE_MM: f32 = 15.0;
const HEADER_ADVANCE_MM: f32 = 10.0;
const FIELD_LINE_MM: f32 = 4.0;
const TABLE_HEAD_MM: f32 = 7.0;
const TABLE_LINE_MM: f32 = 3.0;
const TABLE_PADDING_MM: f32 = 2.0;

// Caracteres que caben por milímetro con la fuente de cada bloque
const FIELD_CHARS_PER_MM: f32 = 0.6;
const TABLE_CHARS_PER_MM: f32 = 0.8;

pub const MISSING: &str = "---";

pub const NARROW_FIELD_MM: f32 = 65.0;
pub const WIDE_FIELD_MM: f32 = 130.0;

/// Texto a mostrar; vacío se convierte en `---`.
pub fn or_missing(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

fn max_chars(width_mm: f32, chars_per_mm: f32) -> usize {
    ((width_mm * chars_per_mm).floor() as usize).max(1)
}

/// Reparte el texto en líneas de como mucho `width_chars` caracteres,
/// cortando por palabras; una palabra más larga que la línea se parte.
pub fn wrap_text(text: &str, width_chars: usize) -> Vec<String> {
    let width_chars = width_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        if current_len > 0 {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub lines: Vec<String>,
    pub width_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: &'static str,
    pub width_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    /// Filas ya partidas en líneas, celda por celda.
    pub rows: Vec<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Subtitle(String),
    Section(String),
    Field(Field),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub top_mm: f32,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: usize,
    pub blocks: Vec<Placed>,
}

/// Cursor vertical que va llenando páginas.
#[derive(Debug)]
pub struct Layout {
    pages: Vec<Page>,
    y: f32,
}

impl Layout {
    pub fn new(start_y: f32) -> Self {
        Layout {
            pages: vec![Page { number: 1, blocks: Vec::new() }],
            y: start_y,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page { number, blocks: Vec::new() });
        self.y = PAGE_TOP_MM;
    }

    /// Abre página nueva si `needed_mm` no cabe en lo que queda.
    /// Devuelve `true` cuando hubo salto.
    pub fn ensure_space(&mut self, needed_mm: f32) -> bool {
        if self.y + needed_mm > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.new_page();
            return true;
        }
        false
    }

    fn place(&mut self, block: Block) {
        let top_mm = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(Placed { top_mm, block });
        }
    }

    pub fn gap(&mut self, mm: f32) {
        self.y += mm;
    }

    pub fn title(&mut self, text: &str, height_mm: f32) {
        self.ensure_space(height_mm);
        self.place(Block::Title(text.to_string()));
        self.y += height_mm;
    }

    pub fn subtitle(&mut self, text: &str, height_mm: f32) {
        self.ensure_space(height_mm);
        self.place(Block::Subtitle(text.to_string()));
        self.y += height_mm;
    }

    pub fn section(&mut self, text: &str) {
        self.ensure_space(HEADER_SPACE_MM);
        self.place(Block::Section(text.to_string()));
        self.y += HEADER_ADVANCE_MM;
    }

    /// Campo etiquetado: ocupa `líneas * 4 + 1` mm.
    pub fn field(&mut self, label: &str, value: &str, width_mm: f32) {
        let lines = wrap_text(&or_missing(value), max_chars(width_mm, FIELD_CHARS_PER_MM));
        let height = lines.len() as f32 * FIELD_LINE_MM + 1.0;
        self.ensure_space(height);
        self.place(Block::Field(Field { label: label.to_string(), lines, width_mm }));
        self.y += height;
    }

    /// Tabla que continúa en páginas siguientes, repitiendo el encabezado.
    pub fn table(&mut self, columns: &[Column], rows: &[Vec<String>]) {
        let mut chunk = Table { columns: columns.to_vec(), rows: Vec::new() };
        let mut chunk_top = self.y;
        let mut chunk_height = TABLE_HEAD_MM;

        if self.ensure_space(TABLE_HEAD_MM) {
            chunk_top = self.y;
        }

        for row in rows {
            let cells: Vec<Vec<String>> = columns
                .iter()
                .zip(row.iter())
                .map(|(col, cell)| wrap_text(&or_missing(cell), max_chars(col.width_mm, TABLE_CHARS_PER_MM)))
                .collect();
            let widest = cells.iter().map(Vec::len).max().unwrap_or(1);
            let row_height = widest as f32 * TABLE_LINE_MM + TABLE_PADDING_MM;

            if chunk_top + chunk_height + row_height > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
                if !chunk.rows.is_empty() {
                    self.y = chunk_top;
                    self.place(Block::Table(std::mem::replace(
                        &mut chunk,
                        Table { columns: columns.to_vec(), rows: Vec::new() },
                    )));
                }
                self.new_page();
                chunk_top = self.y;
                chunk_height = TABLE_HEAD_MM;
            }
            chunk.rows.push(cells);
            chunk_height += row_height;
        }

        self.y = chunk_top;
        self.place(Block::Table(chunk));
        self.y = chunk_top + chunk_height;
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_by_words_and_splits_long_words() {
        assert_eq!(wrap_text("uno dos tres", 7), vec!["uno dos", "tres"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("línea uno\nlínea dos", 20), vec!["línea uno", "línea dos"]);
    }

    #[test]
    fn field_height_follows_line_count() {
        let mut layout = Layout::new(20.0);
        layout.field("EPS", "Sanitas", NARROW_FIELD_MM);
        assert_eq!(layout.y(), 25.0);

        // 39 caracteres por línea en 65 mm: 100 caracteres ocupan 3 líneas
        let long = "x".repeat(100);
        layout.field("Condiciones", &long, NARROW_FIELD_MM);
        assert_eq!(layout.y(), 25.0 + 3.0 * 4.0 + 1.0);
    }

    #[test]
    fn overflowing_block_starts_a_new_page_at_the_top() {
        let mut layout = Layout::new(270.0);
        layout.section("2. SALUD");
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.y(), PAGE_TOP_MM + 10.0);

        let pages = layout.finish();
        assert!(pages[0].blocks.is_empty());
        assert_eq!(pages[1].blocks[0].top_mm, PAGE_TOP_MM);
        assert_eq!(pages[1].number, 2);
    }

    #[test]
    fn block_that_fits_exactly_stays_on_the_page() {
        let mut layout = Layout::new(PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM - 5.0);
        layout.field("EPS", "Sanitas", NARROW_FIELD_MM);
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn long_table_continues_on_next_pages_with_header() {
        let columns = [Column { label: "Fecha", width_mm: 30.0 }, Column { label: "Observación", width_mm: 140.0 }];
        let rows: Vec<Vec<String>> = (0..120)
            .map(|n| vec![format!("2024-03-{:02}", n % 28 + 1), "Llegada tarde".to_string()])
            .collect();

        let mut layout = Layout::new(200.0);
        layout.table(&columns, &rows);
        let pages = layout.finish();
        assert!(pages.len() >= 3);

        let total_rows: usize = pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .map(|placed| match &placed.block {
                Block::Table(table) => table.rows.len(),
                _ => 0,
            })
            .sum();
        assert_eq!(total_rows, 120);
        for page in &pages[1..] {
            assert_eq!(page.blocks[0].top_mm, PAGE_TOP_MM);
        }
    }

    #[test]
    fn empty_cells_render_as_missing() {
        let columns = [Column { label: "Docente", width_mm: 40.0 }];
        let mut layout = Layout::new(20.0);
        layout.table(&columns, &[vec![String::new()]]);
        let pages = layout.finish();
        match &pages[0].blocks[0].block {
            Block::Table(table) => assert_eq!(table.rows[0][0], vec![MISSING.to_string()]),
            other => panic!("bloque inesperado: {:?}", other),
        }
    }
}
