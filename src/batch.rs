use log::{ info, warn };
use rayon::prelude::*;

use std::panic::{ self, AssertUnwindSafe };
use std::time::{ Duration, Instant };

use crate::error::LprError;
use crate::ocr::OcrEngine;
use crate::raster::{ BoundingBox, Raster };
use crate::{ Lpr, PlateReading };

/// One stored photo
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: i64,
    pub image: Vec<u8>,
    pub ground_truth: Option<String>,
}

impl ImageRecord {
    pub fn new(id: i64, image: Vec<u8>, ground_truth: Option<&str>) -> Self {
        Self { id, image, ground_truth: ground_truth.map(str::to_string) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStatus {
    Detected,
    NoPlateFound,
    DecodeError,
    RecognitionError,
}

/// Outcome for one record, one per input record whatever happened
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub id: i64,
    pub status: DetectionStatus,
    pub recognized: String,
    pub ground_truth: Option<String>,
    /// case insensitive equality, false without ground truth
    pub is_match: bool,
    /// (width, height) of the decoded image, absent when decoding failed
    pub image_size: Option<(u32, u32)>,
    pub bbox: Option<BoundingBox>,
    pub elapsed: Duration,
}

impl RecognitionResult {

    fn failed(record: &ImageRecord, status: DetectionStatus, image_size: Option<(u32, u32)>, elapsed: Duration) -> Self {
        Self {
            id: record.id,
            status,
            recognized: String::new(),
            ground_truth: record.ground_truth.clone(),
            is_match: false,
            image_size,
            bbox: None,
            elapsed,
        }
    }

    fn detected(record: &ImageRecord, reading: PlateReading, image_size: (u32, u32), elapsed: Duration) -> Self {
        let is_match = record.ground_truth.as_ref()
            .map(|truth| truth.to_uppercase() == reading.text.to_uppercase())
            .unwrap_or(false);
        Self {
            id: record.id,
            status: DetectionStatus::Detected,
            recognized: reading.text,
            ground_truth: record.ground_truth.clone(),
            is_match,
            image_size: Some(image_size),
            bbox: Some(reading.bbox),
            elapsed,
        }
    }

    /// Only readings go to the result table
    pub fn should_persist(&self) -> bool {
        self.status == DetectionStatus::Detected || !self.recognized.is_empty()
    }
}

/// Drives every record through the pipeline, isolating failures per record
pub struct BatchRunner<E> {
    lpr: Lpr<E>,
}

impl<E: OcrEngine> BatchRunner<E> {

    pub fn new(lpr: Lpr<E>) -> Self {
        Self { lpr }
    }

    /// Sequential, results in input order
    pub fn run(&self, records: &[ImageRecord]) -> Vec<RecognitionResult> {
        let results: Vec<RecognitionResult> = records.iter().fold(Vec::with_capacity(records.len()), |mut results, record| {
            results.push(self.process_record(record));
            results
        });
        info!("processed {} records", results.len());
        results
    }

    /// Same as `run` on a fixed size pool, results still in input order
    pub fn run_parallel(&self, records: &[ImageRecord], workers: usize) -> Result<Vec<RecognitionResult>, LprError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers.max(1)).build()?;
        let results: Vec<RecognitionResult> = pool.install(|| {
            records.par_iter().map(|record| self.process_record(record)).collect()
        });
        info!("processed {} records on {} workers", results.len(), workers.max(1));
        Ok(results)
    }

    pub fn process_record(&self, record: &ImageRecord) -> RecognitionResult {
        let started = Instant::now();
        let img = match Raster::decode(&record.image) {
            Ok(img) => img,
            Err(e) => {
                warn!("record {}: cannot decode image: {}", record.id, e);
                return RecognitionResult::failed(record, DetectionStatus::DecodeError, None, started.elapsed());
            }
        };
        let size = img.dimensions();

        // a panic inside one image must not take the batch down
        let reading = panic::catch_unwind(AssertUnwindSafe(|| self.lpr.read_plate(&img)));
        match reading {
            Ok(Ok(Some(reading))) => RecognitionResult::detected(record, reading, size, started.elapsed()),
            Ok(Ok(None)) => RecognitionResult::failed(record, DetectionStatus::NoPlateFound, Some(size), started.elapsed()),
            Ok(Err(e)) => {
                warn!("record {}: recognition failed: {}", record.id, e);
                RecognitionResult::failed(record, DetectionStatus::RecognitionError, Some(size), started.elapsed())
            }
            Err(_) => {
                warn!("record {}: pipeline panicked", record.id);
                RecognitionResult::failed(record, DetectionStatus::RecognitionError, Some(size), started.elapsed())
            }
        }
    }
}
