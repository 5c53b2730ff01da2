// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Document rendering collaborator.
//!
//! The engine builds the structured data for a document and hands it to a
//! `DocumentRenderer`; it never lays out documents itself.

use carehome_domain::ShiftKind;
use serde::Serialize;
use thiserror::Error;

/// Templates the engine asks a renderer to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// The locked record of one shift.
    ShiftLog,
}

impl TemplateKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftLog => "shift_log",
        }
    }
}

/// Errors a renderer may report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer has no template of this kind.
    #[error("Template '{0}' is not available")]
    UnknownTemplate(String),

    /// The structured data does not fit the template.
    #[error("Document data is malformed: {0}")]
    InvalidData(String),

    /// The renderer itself failed.
    #[error("Renderer failed: {0}")]
    Failed(String),
}

/// Converts structured data into document bytes.
///
/// Rendering is a blocking call made inside the lock transaction.
pub trait DocumentRenderer: Send + Sync {
    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    /// File extension used when naming stored documents.
    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    /// Renders `data` using the `template`.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` if the document cannot be produced.
    fn render(
        &self,
        template: TemplateKind,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>, RenderError>;
}

/// One time slot as it appears in a shift log document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    /// `HH:MM`.
    pub time_slot: String,
    pub content: String,
}

/// The data handed to the renderer when a shift log is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftLogDocument {
    pub shift_log_id: i64,
    pub carehome_id: i64,
    pub service_user_id: i64,
    pub staff_name: String,
    pub staff_initials: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub day_of_week: String,
    pub shift: ShiftKind,
    /// Entries in shift order.
    pub entries: Vec<DocumentEntry>,
}

impl ShiftLogDocument {
    /// Renders this document with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidData` if the document cannot be
    /// serialized, or whatever the renderer reports.
    pub fn render(&self, renderer: &dyn DocumentRenderer) -> Result<Vec<u8>, RenderError> {
        let data: serde_json::Value =
            serde_json::to_value(self).map_err(|e| RenderError::InvalidData(e.to_string()))?;
        renderer.render(TemplateKind::ShiftLog, &data)
    }
}
