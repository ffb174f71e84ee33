use std::fmt;

use crate::batch::{ DetectionStatus, RecognitionResult };

impl fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DetectionStatus::Detected => "detected",
            DetectionStatus::NoPlateFound => "no plate detected",
            DetectionStatus::DecodeError => "image could not be decoded",
            DetectionStatus::RecognitionError => "recognition failed",
        };
        f.write_str(text)
    }
}

impl fmt::Display for RecognitionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == DetectionStatus::Detected {
            write!(f, "ID: {} | actual: {} | recognized: {} | match: {}",
                self.id,
                self.ground_truth.as_deref().unwrap_or("N/A"),
                self.recognized,
                if self.is_match { "yes" } else { "no" })
        } else {
            write!(f, "ID: {} | status: {}", self.id, self.status)?;
            if let Some((width, height)) = self.image_size {
                write!(f, " | size: {}x{}", width, height)?;
            }
            Ok(())
        }
    }
}

/// Counts over one batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub detected: usize,
    pub matched: usize,
    /// detected records that carried ground truth
    pub comparable: usize,
    pub no_plate: usize,
    pub decode_errors: usize,
    pub recognition_errors: usize,
    pub average_millis: u128,
}

impl BatchSummary {

    pub fn from_results(results: &[RecognitionResult]) -> Self {
        let mut summary = results.iter().fold(Self::default(), |mut summary, result| {
            summary.total += 1;
            summary.average_millis += result.elapsed.as_millis();
            match result.status {
                DetectionStatus::Detected => {
                    summary.detected += 1;
                    if result.ground_truth.is_some() {
                        summary.comparable += 1;
                    }
                    if result.is_match {
                        summary.matched += 1;
                    }
                }
                DetectionStatus::NoPlateFound => summary.no_plate += 1,
                DetectionStatus::DecodeError => summary.decode_errors += 1,
                DetectionStatus::RecognitionError => summary.recognition_errors += 1,
            }
            summary
        });
        if summary.total > 0 {
            summary.average_millis /= summary.total as u128;
        }
        summary
    }

    /// matched / detected-with-ground-truth, None when nothing is comparable
    pub fn accuracy(&self) -> Option<f64> {
        if self.comparable == 0 {
            None
        } else {
            Some(self.matched as f64 / self.comparable as f64)
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total: {}, detected: {}, matched: {}, no plate: {}, decode errors: {}, recognition errors: {}, average ms: {}",
            self.total, self.detected, self.matched, self.no_plate, self.decode_errors, self.recognition_errors, self.average_millis)?;
        if let Some(accuracy) = self.accuracy() {
            write!(f, ", accuracy: {:.1}%", accuracy * 100.0)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod test {

    use std::time::Duration;

    use super::BatchSummary;
    use crate::batch::{ DetectionStatus, RecognitionResult };
    use crate::raster::BoundingBox;

    fn result(id: i64, status: DetectionStatus, truth: Option<&str>, text: &str, is_match: bool) -> RecognitionResult {
        RecognitionResult {
            id,
            status,
            recognized: text.to_string(),
            ground_truth: truth.map(str::to_string),
            is_match,
            image_size: Some((640, 480)),
            bbox: if status == DetectionStatus::Detected { Some(BoundingBox::new(1, 2, 90, 30)) } else { None },
            elapsed: Duration::from_millis(10 * id as u64),
        }
    }

    #[test]
    fn one_line_reports() {
        let hit = result(1, DetectionStatus::Detected, Some("ABC1234"), "ABC1234", true);
        assert_eq!(hit.to_string(), "ID: 1 | actual: ABC1234 | recognized: ABC1234 | match: yes");

        let miss = result(3, DetectionStatus::NoPlateFound, None, "", false);
        assert_eq!(miss.to_string(), "ID: 3 | status: no plate detected | size: 640x480");

        let mut broken = result(2, DetectionStatus::DecodeError, None, "", false);
        broken.image_size = None;
        assert_eq!(broken.to_string(), "ID: 2 | status: image could not be decoded");
    }

    #[test]
    fn summary_counts() {
        let results = vec![
            result(1, DetectionStatus::Detected, Some("ABC1234"), "ABC1234", true),
            result(2, DetectionStatus::Detected, Some("XYZ"), "XY2", false),
            result(3, DetectionStatus::Detected, None, "Q1", false),
            result(4, DetectionStatus::NoPlateFound, None, "", false),
            result(5, DetectionStatus::DecodeError, None, "", false),
            result(6, DetectionStatus::RecognitionError, Some("K9"), "", false),
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.detected, 3);
        assert_eq!(summary.comparable, 2);
        assert_eq!(summary.matched, 1);
        assert_eq!((summary.no_plate, summary.decode_errors, summary.recognition_errors), (1, 1, 1));
        assert_eq!(summary.average_millis, 35);
        assert_eq!(summary.accuracy(), Some(0.5));
    }

    #[test]
    fn empty_batch() {
        let summary = BatchSummary::from_results(&[]);
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(summary.accuracy(), None);
    }
}
