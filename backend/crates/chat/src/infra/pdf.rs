//! PDF Export Renderer
//!
//! Lays out a conversation on A4 pages using the builtin Helvetica fonts.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use crate::domain::entities::{Conversation, Message};
use crate::domain::export::ExportRenderer;
use crate::error::{ChatError, ChatResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const FOOTER_Y: f32 = 10.0;
/// Lowest baseline for body text; below it a new page starts
const BOTTOM_LIMIT: f32 = 25.0;

const TITLE_SIZE: f32 = 16.0;
const HEADER_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const LINE_HEIGHT: f32 = 5.0;

/// Characters per body line at `BODY_SIZE` within the margins
const BODY_LINE_CHARS: usize = 95;

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Renders conversations as PDF documents
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    footer: String,
}

impl PdfRenderer {
    pub fn new(footer: impl Into<String>) -> Self {
        Self {
            footer: footer.into(),
        }
    }
}

impl ExportRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, conversation: &Conversation, messages: &[Message]) -> ChatResult<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            conversation.title.as_str(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_error)?;

        let first_layer = doc.get_page(page).get_layer(layer);
        let mut pen = Pen {
            doc: &doc,
            layer: first_layer,
            y: PAGE_HEIGHT - MARGIN,
            footer: &self.footer,
            footer_font: &regular,
        };
        pen.draw_footer();

        pen.line(&conversation.title, TITLE_SIZE, &bold, 0.0);
        pen.advance(LINE_HEIGHT * 2.0);
        pen.line(
            &format!("Creado: {}", conversation.created_at.format(DATE_FORMAT)),
            BODY_SIZE,
            &regular,
            0.4,
        );
        pen.advance(LINE_HEIGHT * 2.0);

        for message in messages {
            pen.ensure_room(LINE_HEIGHT * 3.0);
            let header = format!(
                "{} - {}",
                message.role.label(),
                message.created_at.format(DATE_FORMAT)
            );
            pen.line(&header, HEADER_SIZE, &bold, 0.0);
            pen.advance(LINE_HEIGHT * 1.4);

            for text_line in wrap_text(&message.content, BODY_LINE_CHARS) {
                pen.ensure_room(LINE_HEIGHT);
                pen.line(&text_line, BODY_SIZE, &regular, 0.0);
                pen.advance(LINE_HEIGHT);
            }
            pen.advance(LINE_HEIGHT);
        }

        doc.save_to_bytes().map_err(render_error)
    }
}

/// Cursor over the current page
struct Pen<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    footer: &'a str,
    footer_font: &'a IndirectFontRef,
}

impl Pen<'_> {
    fn line(&self, text: &str, size: f32, font: &IndirectFontRef, gray: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_LIMIT {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
            self.draw_footer();
        }
    }

    fn draw_footer(&self) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
        self.layer.use_text(
            self.footer,
            FOOTER_SIZE,
            Mm(MARGIN),
            Mm(FOOTER_Y),
            self.footer_font,
        );
    }
}

fn render_error(e: impl std::fmt::Display) -> ChatError {
    ChatError::Render(e.to_string())
}

/// Break text into lines of at most `max_chars` characters
///
/// Existing line breaks are kept, words are never split unless a single
/// word is longer than a line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_chars).peekable();
                while let Some(chunk) = chunks.next() {
                    let piece: String = chunk.iter().collect();
                    if chunks.peek().is_some() {
                        lines.push(piece);
                    } else {
                        current_len = piece.chars().count();
                        current = piece;
                    }
                }
                continue;
            }

            let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Attachment, MessageRole};
    use chrono::Utc;
    use kernel::id::{ConversationId, MessageId, UserId};

    fn conversation() -> Conversation {
        Conversation {
            id: ConversationId::new(),
            user_id: UserId::new(),
            title: "Revision de incidente".to_string(),
            chat_type: "control_fatalidad_tx".to_string(),
            thread_id: Some("thread_1".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn message(conversation_id: ConversationId, role: MessageRole, content: &str) -> Message {
        Message {
            id: MessageId::new(),
            conversation_id,
            role,
            content: content.to_string(),
            attachments: Vec::<Attachment>::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("uno dos tres cuatro cinco", 9);
        assert_eq!(lines, vec!["uno dos", "tres", "cuatro", "cinco"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 9));
    }

    #[test]
    fn test_wrap_text_keeps_paragraphs() {
        let lines = wrap_text("hola\n\nadios", 20);
        assert_eq!(lines, vec!["hola", "", "adios"]);
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        let lines = wrap_text("abcdefghij xy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_wrap_text_counts_characters_not_bytes() {
        let lines = wrap_text("canción añadida", 7);
        assert_eq!(lines, vec!["canción", "añadida"]);
    }

    #[test]
    fn test_render_produces_pdf() {
        let conversation = conversation();
        let messages = vec![
            message(conversation.id, MessageRole::User, "hola"),
            message(conversation.id, MessageRole::Assistant, "Buenos dias"),
        ];

        let bytes = PdfRenderer::new("pie")
            .render(&conversation, &messages)
            .unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_long_conversation_spans_pages() {
        let conversation = conversation();
        let long = "palabra ".repeat(2000);
        let messages = vec![message(conversation.id, MessageRole::Assistant, &long)];

        let short = PdfRenderer::new("pie").render(&conversation, &[]).unwrap();
        let bytes = PdfRenderer::new("pie")
            .render(&conversation, &messages)
            .unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > short.len());
    }
}
