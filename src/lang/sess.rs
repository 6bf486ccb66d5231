use std::sync::Arc;

use annotate_snippets::display_list::{DisplayList, FormatOptions};
use annotate_snippets::snippet::*;
use codemap::File;
use proc_macro2::{LineColumn, Span};

use crate::load::lex::{mask_comments, Masked};

/// A compilation session: the source file being compiled and output options.
#[derive(Debug)]
pub struct Sess {
    pub file: Arc<File>,
    pub color: bool,
    /// Spans point into the comment-masked text, not into `file`.
    masked: Option<Masked>,
}

impl Sess {
    pub fn new(file: &Arc<File>, color: bool) -> Sess {
        Sess {
            file: file.clone(),
            color,
            masked: mask_comments(file.source()).ok(),
        }
    }
}

impl Sess {
    /// Character position in the source file of a span boundary.
    fn pos(self: &Self, lc: LineColumn) -> usize {
        let source = self.file.source();
        // Spans not attached to the file (e.g. end of input) report line 0.
        if lc.line == 0 {
            return self.char_pos(source.len()).saturating_sub(1);
        }
        let offset = match &self.masked {
            Some(masked) => masked.original_offset(masked.offset(lc)),
            None => {
                let line = (lc.line - 1).min(self.file.num_lines().saturating_sub(1));
                let line_start = (self.file.line_span(line).low() - self.file.span.low()) as usize;
                line_start + lc.column
            }
        };
        self.char_pos(offset)
    }

    /// Converts a byte offset into the character offset annotations use, within bounds.
    fn char_pos(self: &Self, offset: usize) -> usize {
        let source = self.file.source();
        let mut end = offset.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        source[..end].chars().count()
    }

    pub fn offset_ann<'a>(self: &'a Self, label: &'a str, offset: usize) -> SourceAnnotation<'a> {
        let len = self.char_pos(self.file.source().len());
        let start = self.char_pos(offset).min(len.saturating_sub(1));
        SourceAnnotation {
            annotation_type: AnnotationType::Error,
            label,
            range: (start, (start + 2).min(len)),
        }
    }

    pub fn error_ann<'a>(self: &'a Self, label: &'a str, span: Span) -> SourceAnnotation<'a> {
        SourceAnnotation {
            annotation_type: AnnotationType::Error,
            label,
            range: (self.pos(span.start()), self.pos(span.end())),
        }
    }

    pub fn warning_ann<'a>(self: &'a Self, label: &'a str, span: Span) -> SourceAnnotation<'a> {
        SourceAnnotation {
            annotation_type: AnnotationType::Warning,
            label,
            range: (self.pos(span.start()), self.pos(span.end())),
        }
    }

    pub fn help_ann<'a>(self: &'a Self, label: &'a str, span: Span) -> SourceAnnotation<'a> {
        SourceAnnotation {
            annotation_type: AnnotationType::Info,
            label,
            range: (self.pos(span.start()), self.pos(span.end())),
        }
    }

    pub fn error(self: &Self, message: &str, annotations: Vec<SourceAnnotation>) -> String {
        self.snippet(AnnotationType::Error, message, annotations)
    }

    pub fn warning(self: &Self, message: &str, annotations: Vec<SourceAnnotation>) -> String {
        self.snippet(AnnotationType::Warning, message, annotations)
    }

    fn snippet(
        self: &Self,
        annotation_type: AnnotationType,
        message: &str,
        annotations: Vec<SourceAnnotation>,
    ) -> String {
        let snippet = Snippet {
            title: Some(Annotation {
                id: None,
                label: Some(message),
                annotation_type,
            }),
            footer: vec![],
            slices: vec![Slice {
                source: self.file.source(),
                line_start: 1,
                origin: Some(self.file.name()),
                fold: false,
                annotations,
            }],
            opt: FormatOptions {
                color: self.color,
                ..Default::default()
            },
        };

        DisplayList::from(snippet).to_string()
    }
}
