use image::ImageError;
use rayon::ThreadPoolBuildError;
use rusqlite::Error as SqliteError;

use std::error::Error;
use std::fmt;
use std::io::Error as IOError;

#[derive(Debug)]
pub struct LprError(LprErrorKind);

#[derive(Debug)]
pub enum LprErrorKind {
    IOError(IOError),
    ImageError(ImageError),
    SqliteError(SqliteError),
    /// the ocr engine failed or returned something unusable
    OcrError(String),
    Config(String),
    /// a region fell outside the raster it was cut from
    Crop(String),
    ThreadPool(ThreadPoolBuildError),
}

impl LprError {
    pub fn kind(&self) -> &LprErrorKind {
        &self.0
    }

    pub fn ocr(msg: impl Into<String>) -> Self {
        Self(LprErrorKind::OcrError(msg.into()))
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self(LprErrorKind::Config(msg.into()))
    }

    pub fn crop(msg: impl Into<String>) -> Self {
        Self(LprErrorKind::Crop(msg.into()))
    }

    /// connection or transaction failure, fatal to the current storage call
    pub fn is_storage(&self) -> bool {
        matches!(self.kind(), LprErrorKind::SqliteError(_))
    }
}

impl<T> From<T> for LprError
where T: Into<LprErrorKind>
{
    fn from(e: T) -> Self {
        Self(e.into())
    }
}

impl fmt::Display for LprError {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            LprErrorKind::IOError(e) => e.fmt(f),
            LprErrorKind::ImageError(e) => e.fmt(f),
            LprErrorKind::SqliteError(e) => write!(f, "storage error: {}", e),
            LprErrorKind::OcrError(msg) => write!(f, "ocr error: {}", msg),
            LprErrorKind::Config(msg) => write!(f, "invalid config: {}", msg),
            LprErrorKind::Crop(msg) => write!(f, "crop failed: {}", msg),
            LprErrorKind::ThreadPool(e) => e.fmt(f),
        }
    }
}

impl Error for LprError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.kind() {
            LprErrorKind::IOError(e) => Some(e),
            LprErrorKind::ImageError(e) => Some(e),
            LprErrorKind::SqliteError(e) => Some(e),
            LprErrorKind::ThreadPool(e) => Some(e),
            LprErrorKind::OcrError(_) | LprErrorKind::Config(_) | LprErrorKind::Crop(_) => None,
        }
    }
}

impl From<IOError> for LprErrorKind {
    fn from(e: IOError) -> Self {
        Self::IOError(e)
    }
}

impl From<ImageError> for LprErrorKind {
    fn from(e: ImageError) -> Self {
        Self::ImageError(e)
    }
}

impl From<SqliteError> for LprErrorKind {
    fn from(e: SqliteError) -> Self {
        Self::SqliteError(e)
    }
}

impl From<ThreadPoolBuildError> for LprErrorKind {
    fn from(e: ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}
