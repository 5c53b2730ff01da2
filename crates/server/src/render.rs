// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Plain-text rendering of locked shift logs.
//!
//! `TextRenderer` is a placeholder for an external PDF renderer. The
//! `DocumentRenderer` defaults are `application/pdf` and `.pdf`; this one
//! overrides both, so stored names end in `.txt` until a PDF backend is
//! plugged into `AppState`.

use carehome::{DocumentRenderer, RenderError, TemplateKind};
use serde_json::Value;

/// Stand-in renderer producing plain text, one line per time slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, template: TemplateKind, data: &Value) -> Result<Vec<u8>, RenderError> {
        match template {
            TemplateKind::ShiftLog => render_shift_log(data).map(String::into_bytes),
        }
    }
}

fn text_field<'a>(data: &'a Value, name: &str) -> Result<&'a str, RenderError> {
    data.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::InvalidData(format!("missing text field '{name}'")))
}

fn number_field(data: &Value, name: &str) -> Result<i64, RenderError> {
    data.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| RenderError::InvalidData(format!("missing number field '{name}'")))
}

fn render_shift_log(data: &Value) -> Result<String, RenderError> {
    let entries: &Vec<Value> = data
        .get("entries")
        .and_then(Value::as_array)
        .ok_or_else(|| RenderError::InvalidData(String::from("missing entries")))?;

    let mut out: String = format!(
        "Shift log {}\nService user: {}\nDate: {} ({})\nShift: {}\nStaff: {} ({})\n\n",
        number_field(data, "shift_log_id")?,
        number_field(data, "service_user_id")?,
        text_field(data, "date")?,
        text_field(data, "day_of_week")?,
        text_field(data, "shift")?,
        text_field(data, "staff_name")?,
        text_field(data, "staff_initials")?,
    );
    for entry in entries {
        out.push_str(text_field(entry, "time_slot")?);
        out.push_str("  ");
        out.push_str(text_field(entry, "content")?);
        out.push('\n');
    }
    Ok(out)
}
