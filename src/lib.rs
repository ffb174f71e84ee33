use log::debug;

use error::LprError;
use config::{ OcrConfig, PipelineConfig };
use localize::PlateLocalizer;
use ocr::OcrEngine;
use preprocess::Preprocessor;
use raster::{ BoundingBox, Raster };
use recognize::TextRecognizer;

pub mod utils;
pub mod error;
pub mod config;
pub mod raster;
pub mod preprocess;
pub mod geometry;
pub mod localize;
pub mod ocr;
pub mod recognize;
pub mod batch;
pub mod store;
pub mod report;

pub use batch::{ BatchRunner, DetectionStatus, ImageRecord, RecognitionResult };
pub use report::BatchSummary;
pub use store::{ RecordSource, ResultPersister, SqliteStore };


/// Where the plate is and what it says
#[derive(Debug, Clone, PartialEq)]
pub struct PlateReading {
    pub bbox: BoundingBox,
    pub text: String,
}

/// preprocess -> localize -> crop -> recognize for one image
pub struct Lpr<E> {
    preprocessor: Preprocessor,
    localizer: PlateLocalizer,
    recognizer: TextRecognizer<E>,
}

impl<E: OcrEngine> Lpr<E> {

    pub fn new(config: &PipelineConfig, ocr_config: &OcrConfig, engine: E) -> Result<Self, LprError> {
        config.validate()?;
        Ok(Lpr {
            preprocessor: Preprocessor::new(config),
            localizer: PlateLocalizer::new(config),
            recognizer: TextRecognizer::new(engine, ocr_config),
        })
    }

    /// Default thresholds and ocr settings around `engine`
    pub fn with_engine(engine: E) -> Self {
        Lpr {
            preprocessor: Preprocessor::default(),
            localizer: PlateLocalizer::default(),
            recognizer: TextRecognizer::new(engine, &OcrConfig::default()),
        }
    }

    pub fn locate(&self, img: &Raster) -> Option<BoundingBox> {
        let gray = self.preprocessor.preprocess(img);
        self.localizer.locate(&gray)
    }

    /// Read one image. `Ok(None)` when no plate shaped region exists.
    /// The text is read from the original colour pixels, not the
    /// preprocessed working copy.
    pub fn read_plate(&self, img: &Raster) -> Result<Option<PlateReading>, LprError> {
        let bbox = match self.locate(img) {
            Some(bbox) => bbox,
            None => return Ok(None),
        };
        debug!("plate candidate at {}", bbox);
        let plate = img.crop(&bbox)?;
        let text = self.recognizer.recognize(&plate)?;
        Ok(Some(PlateReading { bbox, text }))
    }
}
