/// Readers for the IDX binary files used by MNIST and its derivatives.
///
/// # IDX1 label file layout
/// ```text
/// bytes  0-3:   0x00000801  (magic, big-endian)
/// bytes  4-7:   N           (number of labels, big-endian u32)
/// bytes  8..:   N bytes, each a class index
/// ```
///
/// # IDX3 image file layout
/// ```text
/// bytes  0-3:   0x00000803  (magic, big-endian)
/// bytes  4-7:   N           (number of images, big-endian u32)
/// bytes  8-11:  rows        (image height in pixels, big-endian u32)
/// bytes 12-15:  cols        (image width in pixels, big-endian u32)
/// bytes 16..:   N * rows * cols bytes, row-major, uint8
/// ```
use std::path::Path;

use tracing::debug;

use crate::errors::NnError;

pub const LABEL_MAGIC: u32 = 0x0000_0801;
pub const IMAGE_MAGIC: u32 = 0x0000_0803;

/// Raw 8-bit images as stored in an IDX3 file.
#[derive(Debug, Clone, PartialEq)]
pub struct IdxImages {
    pub width: usize,
    pub height: usize,
    pub images: Vec<Vec<u8>>,
}

fn read_u32(bytes: &[u8], offset: usize, what: &str) -> Result<u32, NnError> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| {
            NnError::Idx(format!(
                "{what} file too short: header needs {} bytes, got {}",
                offset + 4,
                bytes.len()
            ))
        })
}

fn check_magic(bytes: &[u8], expected: u32, what: &str) -> Result<(), NnError> {
    let magic = read_u32(bytes, 0, what)?;
    if magic != expected {
        return Err(NnError::Idx(format!(
            "{what} file magic number mismatch: expected {expected:#010x}, got {magic:#010x}"
        )));
    }
    Ok(())
}

/// Parses an IDX1 label file.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>, NnError> {
    check_magic(bytes, LABEL_MAGIC, "label")?;
    let n = read_u32(bytes, 4, "label")? as usize;

    let data = bytes.get(8..8 + n).ok_or_else(|| {
        NnError::Idx(format!(
            "label file too short: header declares {} labels but only {} data bytes follow",
            n,
            bytes.len().saturating_sub(8)
        ))
    })?;
    Ok(data.to_vec())
}

/// Parses an IDX3 image file.
pub fn parse_images(bytes: &[u8]) -> Result<IdxImages, NnError> {
    check_magic(bytes, IMAGE_MAGIC, "image")?;
    let n = read_u32(bytes, 4, "image")? as usize;
    let height = read_u32(bytes, 8, "image")? as usize;
    let width = read_u32(bytes, 12, "image")? as usize;

    let n_pixels = width
        .checked_mul(height)
        .ok_or_else(|| NnError::Idx(format!("image size overflows: {width}×{height}")))?;
    let data_len = n
        .checked_mul(n_pixels)
        .filter(|len| *len <= usize::MAX - 16)
        .ok_or_else(|| NnError::Idx(format!("image data size overflows: {n} × {n_pixels}")))?;

    let data = bytes.get(16..16 + data_len).ok_or_else(|| {
        NnError::Idx(format!(
            "image file too short: header declares {} images of {}×{} pixels \
             ({} data bytes), but only {} data bytes follow",
            n,
            width,
            height,
            data_len,
            bytes.len().saturating_sub(16)
        ))
    })?;

    let images = if n_pixels == 0 {
        vec![Vec::new(); n]
    } else {
        data.chunks_exact(n_pixels).map(|c| c.to_vec()).collect()
    };

    Ok(IdxImages {
        width,
        height,
        images,
    })
}

/// Maps 8-bit pixel intensities into `[0, 1]`.
pub fn normalize(pixels: &[u8]) -> Vec<f64> {
    pixels.iter().map(|&p| p as f64 / 255.0).collect()
}

/// `1.0` at `label`, `0.0` elsewhere; `None` if `label` is not below `n_classes`.
pub fn one_hot(label: usize, n_classes: usize) -> Option<Vec<f64>> {
    if label >= n_classes {
        return None;
    }
    let mut v = vec![0.0; n_classes];
    v[label] = 1.0;
    Some(v)
}

/// Normalized inputs paired with one-hot targets, plus the raw class labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Dataset {
    /// Builds a dataset from the contents of an image file and a label file.
    pub fn from_idx_bytes(
        image_bytes: &[u8],
        label_bytes: &[u8],
        n_classes: usize,
    ) -> Result<Dataset, NnError> {
        let images = parse_images(image_bytes)?;
        let labels = parse_labels(label_bytes)?;

        if images.images.len() != labels.len() {
            return Err(NnError::DimensionMismatch {
                what: "label count",
                expected: images.images.len(),
                actual: labels.len(),
            });
        }

        let mut targets = Vec::with_capacity(labels.len());
        for (index, &label) in labels.iter().enumerate() {
            let label = label as usize;
            let target = one_hot(label, n_classes).ok_or(NnError::LabelOutOfRange {
                index,
                label,
                n_classes,
            })?;
            targets.push(target);
        }

        let inputs = images.images.iter().map(|img| normalize(img)).collect();

        Ok(Dataset {
            inputs,
            targets,
            labels,
            width: images.width,
            height: images.height,
        })
    }

    /// Reads and parses an image file and a label file from disk.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        images_path: P,
        labels_path: Q,
        n_classes: usize,
    ) -> Result<Dataset, NnError> {
        let image_bytes = std::fs::read(images_path.as_ref())?;
        let label_bytes = std::fs::read(labels_path.as_ref())?;
        let dataset = Dataset::from_idx_bytes(&image_bytes, &label_bytes, n_classes)?;
        debug!(
            images = %images_path.as_ref().display(),
            samples = dataset.len(),
            width = dataset.width,
            height = dataset.height,
            "loaded IDX dataset"
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
