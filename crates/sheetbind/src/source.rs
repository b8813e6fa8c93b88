//! Format dispatch and the stream plumbing shared by the writers.

use crate::error::{SheetError, StreamRole};
use sheetbind_engine::{SheetFormat, Workbook};
use std::io::{Read, Write};
use std::path::Path;

/// Engine format for `file_name`, checked before any I/O happens.
pub fn format_of(file_name: &str) -> Result<SheetFormat, SheetError> {
    SheetFormat::from_file_name(file_name)
        .ok_or_else(|| SheetError::UnsupportedFormat(file_name.to_string()))
}

pub(crate) fn path_format(path: &Path) -> Result<SheetFormat, SheetError> {
    format_of(&path.to_string_lossy())
}

/// Caller-supplied template and output streams for a write.
///
/// Both are required; a missing one fails with
/// [`SheetError::MissingStream`] before the template is read.
pub struct TemplateStreams<R, W> {
    template: Option<R>,
    output: Option<W>,
}

impl<R, W> Default for TemplateStreams<R, W> {
    fn default() -> Self {
        Self {
            template: None,
            output: None,
        }
    }
}

impl<R: Read, W: Write> TemplateStreams<R, W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(mut self, template: R) -> Self {
        self.template = Some(template);
        self
    }

    pub fn output(mut self, output: W) -> Self {
        self.output = Some(output);
        self
    }

    pub(crate) fn into_parts(self) -> Result<(R, W), SheetError> {
        let template = self
            .template
            .ok_or(SheetError::MissingStream(StreamRole::Template))?;
        let output = self
            .output
            .ok_or(SheetError::MissingStream(StreamRole::Output))?;
        Ok((template, output))
    }
}

/// Open `template`, let `fill` edit it, then serialize the whole workbook to
/// memory. Nothing reaches an output until this returns `Ok`.
pub(crate) fn render<R: Read>(
    format: SheetFormat,
    template: R,
    fill: impl FnOnce(&mut dyn Workbook) -> Result<(), SheetError>,
) -> Result<Vec<u8>, SheetError> {
    let mut wb = sheetbind_engine::open_reader(format, template)?;
    fill(wb.as_mut())?;
    Ok(wb.save_to_bytes()?)
}

pub(crate) fn emit<W: Write>(mut output: W, bytes: &[u8]) -> Result<(), SheetError> {
    output.write_all(bytes)?;
    output.flush()?;
    Ok(())
}
