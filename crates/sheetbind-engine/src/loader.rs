use crate::traits::Workbook;
use crate::{EngineError, SheetFormat};
use std::io::Read;

/// Open a workbook from its serialized bytes with the adapter for `format`.
pub fn open_workbook(format: SheetFormat, bytes: Vec<u8>) -> Result<Box<dyn Workbook>, EngineError> {
    match format {
        #[cfg(feature = "umya")]
        SheetFormat::Xlsx => Ok(Box::new(crate::backends::UmyaWorkbook::from_bytes(bytes)?)),
        #[cfg(feature = "calamine")]
        SheetFormat::Xls => Ok(Box::new(crate::backends::CalamineWorkbook::from_bytes(bytes)?)),
        #[allow(unreachable_patterns)]
        other => {
            let _ = bytes;
            Err(EngineError::BackendUnavailable(other))
        }
    }
}

/// Drain `reader` and open the result. The reader is consumed and dropped
/// before parsing starts.
pub fn open_reader<R: Read>(format: SheetFormat, mut reader: R) -> Result<Box<dyn Workbook>, EngineError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    drop(reader);
    open_workbook(format, bytes)
}
